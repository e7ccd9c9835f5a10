//! Shared fixtures for syllabus-builder tests.

use syllabus_model::{
    Assignment, Course, DocumentModel, FieldUpdate, GenedDetail, GradeScale, SyllabusDocument,
};

/// The intro programming course with no gen-eds attached.
pub fn comp110() -> Course {
    Course {
        prefix: "COMP".into(),
        number: "110".into(),
        title: "Intro to Programming".into(),
        credits: 3,
        description: "An introduction to programming and computer science.".into(),
        geneds: Vec::new(),
        gened_details: Vec::new(),
    }
}

pub fn gened(code: &str, name: &str, outcomes: &[&str]) -> GenedDetail {
    GenedDetail {
        code: code.into(),
        name: name.into(),
        outcomes: outcomes.iter().map(|o| (*o).to_owned()).collect(),
    }
}

/// A history course carrying three gen-eds.
pub fn hist128() -> Course {
    let gened_details = vec![
        gened(
            "FC-PAST",
            "Ways of Knowing the Past",
            &["Interpret primary sources", "Explain historical change"],
        ),
        gened("FC-POWER", "Power, Difference, and Inequality", &["Analyze power"]),
        gened("FC-GLOBAL", "Global Understanding", &["Compare societies"]),
    ];
    Course {
        prefix: "HIST".into(),
        number: "128".into(),
        title: "American History".into(),
        credits: 3,
        description: "Survey of American history.".into(),
        geneds: gened_details.iter().map(|g| g.code.clone()).collect(),
        gened_details,
    }
}

/// The COMP 110 document: one objective, letter scale, a single exam.
pub fn comp110_document() -> SyllabusDocument {
    let mut model = DocumentModel::new();
    model.set_course(comp110());
    model.update(FieldUpdate::Objectives(vec!["Write basic programs".into()]));
    model.update(FieldUpdate::GradeScale(GradeScale::Letter));
    model.update(FieldUpdate::Assignments(vec![Assignment::new("Exam", 100.0)]));
    model.snapshot()
}

/// Course catalog tables in the on-disk JSON layout.
pub const COURSES_JSON: &str = r#"{
  "COMP110": {
    "prefix": "COMP",
    "number": "110",
    "title": "Intro to Programming",
    "credits": 3,
    "description": "An introduction to programming and computer science.",
    "geneds": ["FY-DATA"]
  },
  "HIST128": {
    "prefix": "HIST",
    "number": "128",
    "title": "American History",
    "credits": 3,
    "description": "Survey of American history.",
    "geneds": ["FC-PAST", "FC-POWER"]
  }
}
"#;

pub const GENEDS_JSON: &str = r#"{
  "FY-DATA": { "name": "Data Literacy", "outcomes": ["Summarize data", "Question data sources"] },
  "FC-PAST": { "name": "Ways of Knowing the Past", "outcomes": ["Interpret primary sources"] },
  "FC-POWER": { "name": "Power, Difference, and Inequality", "outcomes": ["Analyze power"] }
}
"#;
