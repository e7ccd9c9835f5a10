use pretty_assertions::assert_eq;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};
use syllabus_model::{
    Assignment, DocumentModel, FieldUpdate, GenedSelection, Material, SyllabusDocument,
};
use syllabus_render::{
    render_blocks, render_html, render_markdown, Block, Format, Renderer, Statements,
    NO_COURSE_SELECTED, NO_MATERIALS_REQUIRED,
};
use syllabus_test_support::{comp110, comp110_document, hist128};

fn all_formats(doc: &SyllabusDocument) -> Vec<(&'static str, String)> {
    let renderer = Renderer::default();
    vec![
        ("markdown", renderer.markdown(doc)),
        ("html", renderer.html(doc)),
        (
            "blocks",
            renderer
                .blocks(doc)
                .iter()
                .map(Block::text_content)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
    ]
}

fn markdown_h3_headings(markdown: &str) -> Vec<String> {
    let mut headings = Vec::new();
    let mut current: Option<String> = None;
    for event in Parser::new_ext(markdown, Options::ENABLE_TABLES) {
        match event {
            Event::Start(Tag::Heading(HeadingLevel::H3, _, _)) => current = Some(String::new()),
            Event::Text(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.push_str(&text);
                }
            }
            Event::End(Tag::Heading(HeadingLevel::H3, _, _)) => {
                headings.extend(current.take());
            }
            _ => {}
        }
    }
    headings
}

fn with_geneds(selection: GenedSelection) -> SyllabusDocument {
    let mut model = DocumentModel::new();
    model.set_course(hist128());
    model.update(FieldUpdate::ConfirmedGeneds(selection));
    model.snapshot()
}

fn gened_count(doc: &SyllabusDocument) -> [usize; 3] {
    let names: Vec<&str> = doc.gened_outcomes.iter().map(|g| g.name.as_str()).collect();

    let markdown = markdown_h3_headings(&render_markdown(doc))
        .iter()
        .filter(|heading| names.contains(&heading.as_str()))
        .count();
    let html = render_html(doc).matches("<section class=\"gened\">").count();
    let blocks = render_blocks(doc)
        .iter()
        .filter(|block| {
            matches!(block, Block::Paragraph { .. })
                && names.contains(&block.text_content().as_str())
        })
        .count();
    [markdown, html, blocks]
}

#[test]
fn comp110_markdown_matches_expected_layout() {
    let doc = comp110_document();
    let diversity = Statements::default().diversity;

    let expected = format!(
        "# COMP 110: Intro to Programming\n\
         \n\
         **Credits:** 3\n\
         \n\
         ## Course Description\n\
         \n\
         An introduction to programming and computer science.\n\
         \n\
         ## Learning Objectives\n\
         \n\
         - Write basic programs\n\
         \n\
         ## Grading\n\
         \n\
         ### Grade Scale\n\
         \n\
         A: 90+, B: 80+, C: 70+, D: 60+, F: 0\n\
         \n\
         ### Grade Breakdown\n\
         \n\
         | Assignment | Weight |\n\
         |---|---|\n\
         | Exam | 100% |\n\
         \n\
         ## Required Materials\n\
         \n\
         {NO_MATERIALS_REQUIRED}\n\
         \n\
         ---\n\
         \n\
         ## Diversity & Inclusion\n\
         \n\
         {diversity}\n"
    );

    assert_eq!(render_markdown(&doc), expected);
}

#[test]
fn comp110_markdown_table_parses_as_table() {
    let markdown = render_markdown(&comp110_document());
    let tables = Parser::new_ext(&markdown, Options::ENABLE_TABLES)
        .filter(|event| matches!(event, Event::Start(Tag::Table(_))))
        .count();
    assert_eq!(tables, 1);
}

#[test]
fn comp110_appears_in_every_format() {
    for (format, output) in all_formats(&comp110_document()) {
        assert!(
            output.contains("COMP 110: Intro to Programming"),
            "{format}: {output}"
        );
        assert!(output.contains("Write basic programs"), "{format}");
        assert!(
            output.contains("A: 90+, B: 80+, C: 70+, D: 60+, F: 0"),
            "{format}"
        );
        assert!(output.contains("Exam"), "{format}");
        assert!(output.contains("100%"), "{format}");
    }
}

#[test]
fn missing_course_renders_placeholders() {
    let doc = SyllabusDocument::default();
    assert_eq!(render_markdown(&doc), format!("{NO_COURSE_SELECTED}\n"));
    assert!(render_html(&doc).contains(NO_COURSE_SELECTED));
    assert_eq!(render_blocks(&doc).len(), 1);
    assert_eq!(render_blocks(&doc)[0].text_content(), NO_COURSE_SELECTED);
}

#[test]
fn rendering_is_idempotent() {
    let mut doc = with_geneds(GenedSelection::Unset);
    doc.materials.push(Material {
        title: "A People's History".into(),
        author: "Howard Zinn".into(),
        ..Material::default()
    });
    doc.attendance_policy = "Attend every session.\nTwo absences allowed.".into();
    doc.include_compliance_statement = true;

    let renderer = Renderer::default();
    for format in [Format::Markdown, Format::Html, Format::Blocks] {
        let first = renderer.render(format, &doc).unwrap();
        let second = renderer.render(format, &doc).unwrap();
        assert_eq!(first, second, "{format:?}");
    }
}

#[test]
fn blank_and_partial_assignment_rows_are_never_rendered() {
    let mut doc = SyllabusDocument {
        course: Some(comp110()),
        ..SyllabusDocument::default()
    };
    doc.assignments = vec![
        Assignment::new("Exam", 60.0),
        Assignment::new("", 0.0),
        Assignment::new("Participation", 0.0),
        Assignment::new("", 40.0),
    ];

    let markdown = render_markdown(&doc);
    let rows: Vec<&str> = markdown
        .lines()
        .filter(|line| line.starts_with("| ") && !line.starts_with("| Assignment"))
        .collect();
    assert_eq!(rows, vec!["| Exam | 60% |"]);

    let html = render_html(&doc);
    assert_eq!(html.matches("<tr><td>").count(), 1);
    assert!(!html.contains("Participation"));

    let table_rows = render_blocks(&doc)
        .into_iter()
        .find_map(|block| match block {
            Block::Table { rows, .. } => Some(rows),
            _ => None,
        })
        .expect("breakdown table");
    assert_eq!(table_rows, vec![["Exam".to_string(), "60%".to_string()]]);
}

#[test]
fn multiline_assignment_names_stay_in_one_table_row() {
    let mut doc = comp110_document();
    doc.assignments = vec![
        Assignment::new("Final\r\nExam", 60.0),
        Assignment::new("Labs", 40.0),
    ];

    let markdown = render_markdown(&doc);
    assert!(markdown.contains("| Final Exam | 60% |\n| Labs | 40% |"));

    let mut cells = Vec::new();
    let mut in_cell = false;
    for event in Parser::new_ext(&markdown, Options::ENABLE_TABLES) {
        match event {
            Event::Start(Tag::TableCell) => {
                in_cell = true;
                cells.push(String::new());
            }
            Event::End(Tag::TableCell) => in_cell = false,
            Event::Text(text) if in_cell => {
                if let Some(cell) = cells.last_mut() {
                    cell.push_str(&text);
                }
            }
            _ => {}
        }
    }
    assert_eq!(
        cells,
        vec!["Assignment", "Weight", "Final Exam", "60%", "Labs", "40%"]
    );
}

#[test]
fn unlisted_assignments_still_emit_the_table_header() {
    let mut doc = comp110_document();
    doc.assignments = vec![Assignment::new("Participation", 0.0)];

    for (format, output) in all_formats(&doc) {
        assert!(output.contains("Grade Breakdown"), "{format}");
        assert!(output.contains("Assignment"), "{format}");
        assert!(output.contains("Weight"), "{format}");
        assert!(!output.contains("Participation"), "{format}");
    }

    let markdown = render_markdown(&doc);
    assert!(markdown.contains("| Assignment | Weight |\n|---|---|\n"));
    assert!(!markdown.contains("| Participation"));

    let html = render_html(&doc);
    assert!(html.contains("<thead><tr><th>Assignment</th><th>Weight</th></tr></thead>"));
    assert_eq!(html.matches("<tr><td>").count(), 0);

    let table_rows = render_blocks(&doc)
        .into_iter()
        .find_map(|block| match block {
            Block::Table { rows, .. } => Some(rows),
            _ => None,
        })
        .expect("breakdown table");
    assert!(table_rows.is_empty());
}

#[test]
fn breakdown_is_omitted_without_assignments() {
    let mut doc = comp110_document();
    doc.assignments.clear();

    for (format, output) in all_formats(&doc) {
        assert!(!output.contains("Grade Breakdown"), "{format}");
    }
}

#[test]
fn unset_confirmation_lists_every_gened() {
    assert_eq!(gened_count(&with_geneds(GenedSelection::Unset)), [3, 3, 3]);
}

#[test]
fn confirmed_subset_lists_only_confirmed_geneds() {
    let doc = with_geneds(GenedSelection::confirmed(["FC-PAST", "FC-GLOBAL"]));
    assert_eq!(gened_count(&doc), [2, 2, 2]);

    let markdown = render_markdown(&doc);
    assert!(markdown.contains("### Ways of Knowing the Past"));
    assert!(!markdown.contains("Power, Difference"));
    let past = markdown.find("Interpret primary sources").unwrap();
    let change = markdown.find("Explain historical change").unwrap();
    assert!(past < change, "outcomes keep their order");
}

#[test]
fn declined_geneds_drop_the_section() {
    let doc = with_geneds(GenedSelection::Declined);
    assert_eq!(gened_count(&doc), [0, 0, 0]);
    for (format, output) in all_formats(&doc) {
        assert!(!output.contains("General Education Outcomes"), "{format}");
    }
}

#[test]
fn untitled_materials_and_empty_notes_mean_nothing_required() {
    let mut doc = comp110_document();
    doc.materials = vec![Material {
        author: "Anonymous".into(),
        isbn: "123".into(),
        ..Material::default()
    }];
    doc.additional_materials = String::new();

    for (format, output) in all_formats(&doc) {
        assert!(output.contains(NO_MATERIALS_REQUIRED), "{format}");
        assert!(!output.contains("Anonymous"), "{format}");
    }

    doc.additional_materials = "Bring a laptop.".into();
    for (format, output) in all_formats(&doc) {
        assert!(!output.contains(NO_MATERIALS_REQUIRED), "{format}");
        assert!(output.contains("Bring a laptop."), "{format}");
    }
}

#[test]
fn titled_materials_render_full_citations() {
    let mut doc = comp110_document();
    doc.materials = vec![Material {
        title: "Think Python".into(),
        author: "Allen Downey".into(),
        publisher: "Green Tea Press".into(),
        edition: "2nd".into(),
        isbn: "978-1491939369".into(),
    }];

    assert!(render_markdown(&doc)
        .contains("- *Think Python* by Allen Downey (Green Tea Press, 2nd) ISBN: 978-1491939369"));
    assert!(render_html(&doc).contains(
        "<li><em>Think Python</em> by Allen Downey (Green Tea Press, 2nd) ISBN: 978-1491939369</li>"
    ));
}

#[test]
fn diversity_without_compliance_across_field_values() {
    let statements = Statements::default();
    let variants = [
        comp110_document(),
        with_geneds(GenedSelection::Unset),
        SyllabusDocument {
            course: Some(comp110()),
            custom_statements: "Late work loses 10% per day.".into(),
            ..SyllabusDocument::default()
        },
    ];

    for mut doc in variants {
        doc.include_diversity_statement = true;
        doc.include_compliance_statement = false;
        for (format, output) in all_formats(&doc) {
            assert!(output.contains(&statements.diversity), "{format}");
            assert!(!output.contains(&statements.compliance), "{format}");
        }
    }
}

#[test]
fn statements_come_last_with_diversity_first() {
    let mut doc = comp110_document();
    doc.include_compliance_statement = true;
    doc.attendance_policy = "Attendance is required.".into();

    let statements = Statements::default();
    for (format, output) in all_formats(&doc) {
        let attendance = output.find("Attendance is required.").unwrap();
        let diversity = output.find(&statements.diversity).unwrap();
        let compliance = output.find(&statements.compliance).unwrap();
        assert!(attendance < diversity && diversity < compliance, "{format}");
    }

    let markdown = render_markdown(&doc);
    let rule = markdown.find("\n---\n").unwrap();
    assert!(rule < markdown.find(&statements.diversity).unwrap());
}

#[test]
fn custom_statements_replace_builtin_text() {
    let renderer = Renderer::new(Statements {
        diversity: "Everyone belongs here.".into(),
        compliance: "Follow the honor code.".into(),
    });
    let mut doc = comp110_document();
    doc.include_compliance_statement = true;

    let markdown = renderer.markdown(&doc);
    assert!(markdown.contains("Everyone belongs here."));
    assert!(markdown.contains("Follow the honor code."));
    assert!(!markdown.contains(&Statements::default().diversity));
}

#[test]
fn html_free_text_is_escaped_and_line_broken() {
    let mut doc = comp110_document();
    doc.attendance_policy = "\u{e2}\u{20ac}\u{a2} Arrive <on time>\n\u{e2}\u{20ac}\u{a2} Sign in".into();

    let html = render_html(&doc);
    assert!(html.contains("<p>\u{2022} Arrive &lt;on time&gt;<br>\n\u{2022} Sign in</p>"));

    let markdown = render_markdown(&doc);
    assert!(markdown.contains("\u{e2}\u{20ac}\u{a2} Arrive <on time>\n"));
}

#[test]
fn custom_scale_placeholder_is_shared() {
    let mut model = DocumentModel::new();
    model.set_course(comp110());
    model.update(FieldUpdate::GradeScale(syllabus_model::GradeScale::Custom));
    let doc = model.snapshot();

    for (format, output) in all_formats(&doc) {
        assert!(
            output.contains(syllabus_render::CUSTOM_SCALE_PLACEHOLDER),
            "{format}"
        );
    }
}
