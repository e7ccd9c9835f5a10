use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::document::{Assignment, GenedSelection, GradeScale, Material};

/// Writable document fields, named as they appear in drafts.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FieldName {
    Objectives,
    ConfirmedGeneds,
    GradeScale,
    CustomGradeScale,
    Assignments,
    AttendancePolicy,
    AdditionalMaterials,
    CustomStatements,
    Materials,
    IncludeDiversityStatement,
    IncludeComplianceStatement,
}

impl FieldName {
    pub const ALL: &'static [FieldName] = &[
        FieldName::Objectives,
        FieldName::ConfirmedGeneds,
        FieldName::GradeScale,
        FieldName::CustomGradeScale,
        FieldName::Assignments,
        FieldName::AttendancePolicy,
        FieldName::AdditionalMaterials,
        FieldName::CustomStatements,
        FieldName::Materials,
        FieldName::IncludeDiversityStatement,
        FieldName::IncludeComplianceStatement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Objectives => "objectives",
            FieldName::ConfirmedGeneds => "confirmedGeneds",
            FieldName::GradeScale => "gradeScale",
            FieldName::CustomGradeScale => "customGradeScale",
            FieldName::Assignments => "assignments",
            FieldName::AttendancePolicy => "attendancePolicy",
            FieldName::AdditionalMaterials => "additionalMaterials",
            FieldName::CustomStatements => "customStatements",
            FieldName::Materials => "materials",
            FieldName::IncludeDiversityStatement => "includeDiversityStatement",
            FieldName::IncludeComplianceStatement => "includeComplianceStatement",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldName {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == value)
            .ok_or(())
    }
}

/// A single typed write to the document.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldUpdate {
    Objectives(Vec<String>),
    ConfirmedGeneds(GenedSelection),
    GradeScale(GradeScale),
    CustomGradeScale(String),
    Assignments(Vec<Assignment>),
    AttendancePolicy(String),
    AdditionalMaterials(String),
    CustomStatements(String),
    Materials(Vec<Material>),
    IncludeDiversityStatement(bool),
    IncludeComplianceStatement(bool),
}

impl FieldUpdate {
    pub fn field(&self) -> FieldName {
        match self {
            FieldUpdate::Objectives(_) => FieldName::Objectives,
            FieldUpdate::ConfirmedGeneds(_) => FieldName::ConfirmedGeneds,
            FieldUpdate::GradeScale(_) => FieldName::GradeScale,
            FieldUpdate::CustomGradeScale(_) => FieldName::CustomGradeScale,
            FieldUpdate::Assignments(_) => FieldName::Assignments,
            FieldUpdate::AttendancePolicy(_) => FieldName::AttendancePolicy,
            FieldUpdate::AdditionalMaterials(_) => FieldName::AdditionalMaterials,
            FieldUpdate::CustomStatements(_) => FieldName::CustomStatements,
            FieldUpdate::Materials(_) => FieldName::Materials,
            FieldUpdate::IncludeDiversityStatement(_) => FieldName::IncludeDiversityStatement,
            FieldUpdate::IncludeComplianceStatement(_) => FieldName::IncludeComplianceStatement,
        }
    }

    /// Decodes an untyped `(name, value)` pair, as found in drafts and on
    /// the command line. Returns `None` for unknown names or values of the
    /// wrong shape.
    pub fn from_json(name: &str, value: Value) -> Option<Self> {
        let Ok(field) = name.parse::<FieldName>() else {
            debug!(field = name, "ignoring write to unknown field");
            return None;
        };

        match field {
            FieldName::Objectives => decode(field, value).map(FieldUpdate::Objectives),
            FieldName::ConfirmedGeneds => decode::<SelectionValue>(field, value)
                .map(SelectionValue::into_selection)
                .map(FieldUpdate::ConfirmedGeneds),
            FieldName::GradeScale => decode(field, value).map(FieldUpdate::GradeScale),
            FieldName::CustomGradeScale => decode(field, value).map(FieldUpdate::CustomGradeScale),
            FieldName::Assignments => decode(field, value).map(FieldUpdate::Assignments),
            FieldName::AttendancePolicy => decode(field, value).map(FieldUpdate::AttendancePolicy),
            FieldName::AdditionalMaterials => {
                decode(field, value).map(FieldUpdate::AdditionalMaterials)
            }
            FieldName::CustomStatements => decode(field, value).map(FieldUpdate::CustomStatements),
            FieldName::Materials => decode(field, value).map(FieldUpdate::Materials),
            FieldName::IncludeDiversityStatement => {
                decode(field, value).map(FieldUpdate::IncludeDiversityStatement)
            }
            FieldName::IncludeComplianceStatement => {
                decode(field, value).map(FieldUpdate::IncludeComplianceStatement)
            }
        }
    }
}

fn decode<T: DeserializeOwned>(field: FieldName, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            debug!(%field, error = %err, "ignoring malformed field value");
            None
        }
    }
}

/// Confirmation accepts the tagged form or a bare list of codes.
#[derive(Deserialize)]
#[serde(untagged)]
enum SelectionValue {
    Tagged(GenedSelection),
    Codes(Vec<String>),
}

impl SelectionValue {
    fn into_selection(self) -> GenedSelection {
        match self {
            SelectionValue::Tagged(GenedSelection::Confirmed(codes))
            | SelectionValue::Codes(codes) => GenedSelection::confirmed(codes),
            SelectionValue::Tagged(other) => other,
        }
    }
}
