use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::field::FieldUpdate;

/// Gen-ed requirement resolved against the catalog at selection time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenedDetail {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub outcomes: Vec<String>,
}

/// Catalog course as attached to a document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub prefix: String,
    pub number: String,
    pub title: String,
    pub credits: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub geneds: Vec<String>,
    #[serde(default)]
    pub gened_details: Vec<GenedDetail>,
}

impl Course {
    /// Display code such as `COMP 110`.
    pub fn code(&self) -> String {
        format!("{} {}", self.prefix, self.number)
    }

    /// Document title line such as `COMP 110: Intro to Programming`.
    pub fn heading(&self) -> String {
        format!("{}: {}", self.code(), self.title)
    }
}

/// Grading scale selection. `Custom` uses the document's override text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeScale {
    #[default]
    Standard,
    Letter,
    Custom,
}

impl GradeScale {
    pub fn as_str(self) -> &'static str {
        match self {
            GradeScale::Standard => "standard",
            GradeScale::Letter => "letter",
            GradeScale::Custom => "custom",
        }
    }
}

impl std::str::FromStr for GradeScale {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "standard" => Ok(GradeScale::Standard),
            "letter" => Ok(GradeScale::Letter),
            "custom" => Ok(GradeScale::Custom),
            _ => Err(()),
        }
    }
}

/// One weighted row of the grade breakdown.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub percentage: f64,
}

impl Assignment {
    pub fn new(name: impl Into<String>, percentage: f64) -> Self {
        Self {
            name: name.into(),
            percentage,
        }
    }

    /// Neither a name nor a weight; dropped on update.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.percentage == 0.0
    }

    /// False for NaN and infinite weights, which JSON cannot carry.
    pub fn has_finite_weight(&self) -> bool {
        self.percentage.is_finite()
    }

    /// Both a name and a non-zero weight; the only rows rendered.
    pub fn is_listed(&self) -> bool {
        !self.name.trim().is_empty() && self.percentage != 0.0 && self.has_finite_weight()
    }
}

/// Bibliographic record for a course material. Only titled records render.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub edition: String,
    #[serde(default, alias = "identifier")]
    pub isbn: String,
}

impl Material {
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Which of the course's gen-eds the instructor kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "codes", rename_all = "lowercase")]
pub enum GenedSelection {
    /// No decision yet: every gen-ed is included.
    #[default]
    Unset,
    /// Only the listed codes are included.
    Confirmed(Vec<String>),
    /// The instructor deselected every gen-ed.
    Declined,
}

impl GenedSelection {
    /// Builds a confirmed selection. An empty list means no decision yet.
    pub fn confirmed<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        if codes.is_empty() {
            GenedSelection::Unset
        } else {
            GenedSelection::Confirmed(codes)
        }
    }

    /// Picks the records to render from `all`, in their original order.
    ///
    /// A confirmed selection matching none of `all` falls back to every
    /// record, the same as an unset one.
    pub fn resolve<'a>(&self, all: &'a [GenedDetail]) -> Vec<&'a GenedDetail> {
        match self {
            GenedSelection::Unset => all.iter().collect(),
            GenedSelection::Declined => Vec::new(),
            GenedSelection::Confirmed(codes) => {
                let chosen: Vec<&GenedDetail> = all
                    .iter()
                    .filter(|detail| codes.iter().any(|code| code == &detail.code))
                    .collect();
                if chosen.is_empty() {
                    all.iter().collect()
                } else {
                    chosen
                }
            }
        }
    }
}

/// Snapshot of everything a syllabus is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyllabusDocument {
    pub course: Option<Course>,
    pub objectives: Vec<String>,
    pub gened_outcomes: Vec<GenedDetail>,
    pub confirmed_geneds: GenedSelection,
    pub grade_scale: GradeScale,
    pub custom_grade_scale: String,
    pub assignments: Vec<Assignment>,
    pub attendance_policy: String,
    pub additional_materials: String,
    pub custom_statements: String,
    pub materials: Vec<Material>,
    pub include_diversity_statement: bool,
    pub include_compliance_statement: bool,
}

impl Default for SyllabusDocument {
    fn default() -> Self {
        Self {
            course: None,
            objectives: Vec::new(),
            gened_outcomes: Vec::new(),
            confirmed_geneds: GenedSelection::Unset,
            grade_scale: GradeScale::Standard,
            custom_grade_scale: String::new(),
            assignments: Vec::new(),
            attendance_policy: String::new(),
            additional_materials: String::new(),
            custom_statements: String::new(),
            materials: Vec::new(),
            include_diversity_statement: true,
            include_compliance_statement: false,
        }
    }
}

impl SyllabusDocument {
    /// Gen-ed records the renderers should list.
    pub fn selected_geneds(&self) -> Vec<&GenedDetail> {
        self.confirmed_geneds.resolve(&self.gened_outcomes)
    }

    /// Sum of all assignment weights, for display next to the breakdown.
    pub fn total_percentage(&self) -> f64 {
        self.assignments.iter().map(|a| a.percentage).sum()
    }
}

/// Owner of the document being edited. All writes go through
/// [`DocumentModel::set_course`] and [`DocumentModel::update`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentModel {
    state: SyllabusDocument,
}

impl DocumentModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the course and snapshots its gen-ed details.
    ///
    /// The gen-ed confirmation is left as is; callers selecting a new course
    /// reset it explicitly.
    pub fn set_course(&mut self, course: Course) {
        debug!(course = %course.code(), "course selected");
        self.state.gened_outcomes = course.gened_details.clone();
        self.state.course = Some(course);
    }

    pub fn clear_course(&mut self) {
        self.state.course = None;
        self.state.gened_outcomes.clear();
    }

    pub fn update(&mut self, update: FieldUpdate) {
        let state = &mut self.state;
        match update {
            FieldUpdate::Objectives(objectives) => {
                state.objectives = objectives
                    .into_iter()
                    .filter(|objective| !objective.trim().is_empty())
                    .collect();
            }
            FieldUpdate::ConfirmedGeneds(selection) => {
                state.confirmed_geneds = match selection {
                    GenedSelection::Confirmed(codes) => GenedSelection::confirmed(codes),
                    other => other,
                };
            }
            FieldUpdate::GradeScale(scale) => state.grade_scale = scale,
            FieldUpdate::CustomGradeScale(text) => state.custom_grade_scale = text,
            FieldUpdate::Assignments(rows) => {
                state.assignments = rows
                    .into_iter()
                    .filter(|row| row.has_finite_weight() && !row.is_blank())
                    .collect();
            }
            FieldUpdate::AttendancePolicy(text) => state.attendance_policy = text,
            FieldUpdate::AdditionalMaterials(text) => state.additional_materials = text,
            FieldUpdate::CustomStatements(text) => state.custom_statements = text,
            FieldUpdate::Materials(materials) => state.materials = materials,
            FieldUpdate::IncludeDiversityStatement(flag) => {
                state.include_diversity_statement = flag
            }
            FieldUpdate::IncludeComplianceStatement(flag) => {
                state.include_compliance_statement = flag
            }
        }
    }

    /// Name-addressed write for untyped callers. Unknown names and
    /// wrong-shaped values leave the document untouched.
    pub fn update_field(&mut self, name: &str, value: serde_json::Value) -> bool {
        match FieldUpdate::from_json(name, value) {
            Some(update) => {
                self.update(update);
                true
            }
            None => false,
        }
    }

    /// Read access for renderers.
    pub fn document(&self) -> &SyllabusDocument {
        &self.state
    }

    /// Independent copy of the current state.
    pub fn snapshot(&self) -> SyllabusDocument {
        self.state.clone()
    }

    pub fn reset(&mut self) {
        self.state = SyllabusDocument::default();
    }
}
