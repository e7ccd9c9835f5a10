use serde_json::json;
use syllabus_model::{
    Assignment, DocumentModel, FieldName, FieldUpdate, GradeScale, Material, SyllabusDocument,
};

fn writes() -> Vec<(&'static str, serde_json::Value)> {
    vec![
        ("objectives", json!(["Write basic programs"])),
        ("gradeScale", json!("custom")),
        ("customGradeScale", json!("Pass: 70+")),
        ("attendancePolicy", json!("Attend every lab.")),
        ("objectives", json!(["Debug programs", "Test programs"])),
        ("materials", json!([{ "title": "Think Python", "author": "Downey" }])),
        ("gradeScale", json!("letter")),
        ("includeDiversityStatement", json!(false)),
    ]
}

#[test]
fn last_write_per_field_wins_and_others_keep_defaults() {
    let mut model = DocumentModel::new();
    for (name, value) in writes() {
        assert!(model.update_field(name, value), "{name} should be accepted");
    }

    let snapshot = model.snapshot();
    let defaults = SyllabusDocument::default();

    assert_eq!(
        snapshot.objectives,
        vec!["Debug programs".to_string(), "Test programs".to_string()]
    );
    assert_eq!(snapshot.grade_scale, GradeScale::Letter);
    assert_eq!(snapshot.custom_grade_scale, "Pass: 70+");
    assert_eq!(snapshot.attendance_policy, "Attend every lab.");
    assert_eq!(
        snapshot.materials,
        vec![Material {
            title: "Think Python".into(),
            author: "Downey".into(),
            ..Material::default()
        }]
    );
    assert!(!snapshot.include_diversity_statement);

    assert_eq!(snapshot.course, defaults.course);
    assert_eq!(snapshot.assignments, defaults.assignments);
    assert_eq!(snapshot.additional_materials, defaults.additional_materials);
    assert_eq!(snapshot.custom_statements, defaults.custom_statements);
    assert_eq!(snapshot.confirmed_geneds, defaults.confirmed_geneds);
    assert_eq!(
        snapshot.include_compliance_statement,
        defaults.include_compliance_statement
    );
}

#[test]
fn unknown_field_writes_leave_state_unchanged() {
    let mut model = DocumentModel::new();
    model.update(FieldUpdate::Assignments(vec![Assignment::new("Exam", 40.0)]));
    let before = model.snapshot();

    for name in ["course", "genedOutcomes", "instructor", "", "Objectives"] {
        assert!(!model.update_field(name, json!(["anything"])));
        assert_eq!(model.snapshot(), before, "write to {name:?} changed state");
    }
}

#[test]
fn every_known_field_name_is_accepted_with_a_valid_value() {
    let samples = [
        (FieldName::Objectives, json!(["a"])),
        (FieldName::ConfirmedGeneds, json!(["FC-PAST"])),
        (FieldName::GradeScale, json!("standard")),
        (FieldName::CustomGradeScale, json!("x")),
        (FieldName::Assignments, json!([{ "name": "Quiz", "percentage": 5 }])),
        (FieldName::AttendancePolicy, json!("x")),
        (FieldName::AdditionalMaterials, json!("x")),
        (FieldName::CustomStatements, json!("x")),
        (FieldName::Materials, json!([])),
        (FieldName::IncludeDiversityStatement, json!(true)),
        (FieldName::IncludeComplianceStatement, json!(true)),
    ];
    assert_eq!(samples.len(), FieldName::ALL.len());

    for (field, value) in samples {
        let update = FieldUpdate::from_json(field.as_str(), value).expect("decodes");
        assert_eq!(update.field(), field);
    }
}
