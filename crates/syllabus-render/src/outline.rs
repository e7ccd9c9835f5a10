//! Inclusion decisions shared by every output format.
//!
//! [`Outline::build`] resolves what a syllabus contains; the format modules
//! only choose markup for it.

use syllabus_model::{GenedDetail, GradeScale, Material, SyllabusDocument};

pub const NO_COURSE_SELECTED: &str = "No course selected.";
pub const NO_MATERIALS_REQUIRED: &str =
    "Students are not required to purchase any course materials.";
pub const CUSTOM_SCALE_PLACEHOLDER: &str = "[Custom grading scale not specified]";

pub const STANDARD_SCALE: &[(&str, u32)] = &[
    ("A", 93),
    ("A-", 90),
    ("B+", 87),
    ("B", 83),
    ("B-", 80),
    ("C+", 77),
    ("C", 73),
    ("C-", 70),
    ("D+", 67),
    ("D", 60),
    ("F", 0),
];

pub const LETTER_SCALE: &[(&str, u32)] = &[("A", 90), ("B", 80), ("C", 70), ("D", 60), ("F", 0)];

const DIVERSITY_STATEMENT: &str = "The University is committed to an inclusive learning \
environment in which every student is welcomed and respected. Diverse backgrounds and \
perspectives strengthen our discussions, and all members of this class are expected to \
contribute to a climate where everyone can learn.";

const COMPLIANCE_STATEMENT: &str = "This course follows all University policies on \
accessibility and academic integrity. Students who need accommodations should contact \
Accessibility Resources and Service as early in the semester as possible so that \
arrangements can be made in time.";

/// Boilerplate paragraphs appended after the course content.
#[derive(Clone, Debug, PartialEq)]
pub struct Statements {
    pub diversity: String,
    pub compliance: String,
}

impl Default for Statements {
    fn default() -> Self {
        Self {
            diversity: DIVERSITY_STATEMENT.to_owned(),
            compliance: COMPLIANCE_STATEMENT.to_owned(),
        }
    }
}

/// Section titles, identical in every format.
pub mod titles {
    pub const DESCRIPTION: &str = "Course Description";
    pub const OBJECTIVES: &str = "Learning Objectives";
    pub const GENEDS: &str = "General Education Outcomes";
    pub const GRADING: &str = "Grading";
    pub const GRADE_SCALE: &str = "Grade Scale";
    pub const GRADE_BREAKDOWN: &str = "Grade Breakdown";
    pub const MATERIALS: &str = "Required Materials";
    pub const ATTENDANCE: &str = "Attendance Policy";
    pub const CUSTOM_STATEMENTS: &str = "Additional Policies";
    pub const DIVERSITY: &str = "Diversity & Inclusion";
    pub const COMPLIANCE: &str = "Policy Compliance";
    pub const BREAKDOWN_HEADER: [&str; 2] = ["Assignment", "Weight"];
}

/// Text of the selected grade scale, e.g. `A: 90+, B: 80+, C: 70+, D: 60+, F: 0`.
pub fn grade_scale_text(scale: GradeScale, custom: &str) -> String {
    let tiers = match scale {
        GradeScale::Standard => STANDARD_SCALE,
        GradeScale::Letter => LETTER_SCALE,
        GradeScale::Custom => {
            let custom = custom.trim();
            return if custom.is_empty() {
                CUSTOM_SCALE_PLACEHOLDER.to_owned()
            } else {
                custom.to_owned()
            };
        }
    };

    tiers
        .iter()
        .map(|(grade, min)| {
            if *min == 0 {
                format!("{grade}: 0")
            } else {
                format!("{grade}: {min}+")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `100` for whole numbers, `12.5` otherwise.
pub fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}%", value as i64)
    } else {
        format!("{value}%")
    }
}

/// Parts of a material citation; formats decide emphasis.
#[derive(Clone, Debug, PartialEq)]
pub struct Citation<'a> {
    pub title: &'a str,
    /// Everything after the title: author, publication and ISBN.
    pub details: String,
}

impl Citation<'_> {
    pub fn plain(&self) -> String {
        format!("{}{}", self.title, self.details)
    }
}

/// `Title by Author (Publisher, Edition) ISBN: 123`, skipping absent parts.
pub fn cite(material: &Material) -> Citation<'_> {
    let mut details = String::new();

    let author = material.author.trim();
    if !author.is_empty() {
        details.push_str(" by ");
        details.push_str(author);
    }

    let publication: Vec<&str> = [material.publisher.trim(), material.edition.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    if !publication.is_empty() {
        details.push_str(" (");
        details.push_str(&publication.join(", "));
        details.push(')');
    }

    let isbn = material.isbn.trim();
    if !isbn.is_empty() {
        details.push_str(" ISBN: ");
        details.push_str(isbn);
    }

    Citation {
        title: material.title.trim(),
        details,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BreakdownRow<'a> {
    pub name: &'a str,
    pub weight: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MaterialsSection<'a> {
    Required {
        citations: Vec<Citation<'a>>,
        additional: Option<&'a str>,
    },
    NoneRequired,
}

/// Everything a syllabus shows, in display order.
#[derive(Clone, Debug, PartialEq)]
pub struct Outline<'a> {
    pub heading: String,
    pub credits: u32,
    pub description: Option<&'a str>,
    pub objectives: Vec<&'a str>,
    pub geneds: Vec<&'a GenedDetail>,
    pub grade_scale: String,
    /// `None` when no assignments exist; rows exclude unnamed or zero-weight
    /// entries.
    pub breakdown: Option<Vec<BreakdownRow<'a>>>,
    pub materials: MaterialsSection<'a>,
    pub attendance: Option<&'a str>,
    pub custom_statements: Option<&'a str>,
    pub diversity: Option<&'a str>,
    pub compliance: Option<&'a str>,
}

impl<'a> Outline<'a> {
    /// `None` when no course is selected.
    pub fn build(doc: &'a SyllabusDocument, statements: &'a Statements) -> Option<Self> {
        let course = doc.course.as_ref()?;

        let objectives = doc
            .objectives
            .iter()
            .map(|objective| objective.trim())
            .filter(|objective| !objective.is_empty())
            .collect();

        let breakdown = (!doc.assignments.is_empty()).then(|| {
            doc.assignments
                .iter()
                .filter(|row| row.is_listed())
                .map(|row| BreakdownRow {
                    name: row.name.trim(),
                    weight: format_percentage(row.percentage),
                })
                .collect()
        });

        let citations: Vec<Citation<'a>> = doc
            .materials
            .iter()
            .filter(|material| material.has_title())
            .map(cite)
            .collect();
        let additional = non_empty(&doc.additional_materials);
        let materials = if citations.is_empty() && additional.is_none() {
            MaterialsSection::NoneRequired
        } else {
            MaterialsSection::Required {
                citations,
                additional,
            }
        };

        Some(Outline {
            heading: course.heading(),
            credits: course.credits,
            description: non_empty(&course.description),
            objectives,
            geneds: doc.selected_geneds(),
            grade_scale: grade_scale_text(doc.grade_scale, &doc.custom_grade_scale),
            breakdown,
            materials,
            attendance: non_empty(&doc.attendance_policy),
            custom_statements: non_empty(&doc.custom_statements),
            diversity: doc
                .include_diversity_statement
                .then_some(statements.diversity.as_str()),
            compliance: doc
                .include_compliance_statement
                .then_some(statements.compliance.as_str()),
        })
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
