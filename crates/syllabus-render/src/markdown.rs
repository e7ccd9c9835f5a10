use crate::outline::{titles, MaterialsSection, Outline, NO_COURSE_SELECTED, NO_MATERIALS_REQUIRED};

pub(crate) fn render(outline: Option<&Outline<'_>>) -> String {
    let Some(outline) = outline else {
        return format!("{NO_COURSE_SELECTED}\n");
    };

    let mut out = MarkdownWriter::default();
    out.heading(1, &outline.heading);
    out.paragraph(&format!("**Credits:** {}", outline.credits));

    if let Some(description) = outline.description {
        out.heading(2, titles::DESCRIPTION);
        out.paragraph(description);
    }

    if !outline.objectives.is_empty() {
        out.heading(2, titles::OBJECTIVES);
        out.bullets(outline.objectives.iter().copied());
    }

    if !outline.geneds.is_empty() {
        out.heading(2, titles::GENEDS);
        for gened in &outline.geneds {
            out.heading(3, &gened.name);
            out.bullets(gened.outcomes.iter().map(String::as_str));
        }
    }

    out.heading(2, titles::GRADING);
    out.heading(3, titles::GRADE_SCALE);
    out.paragraph(&outline.grade_scale);

    if let Some(rows) = &outline.breakdown {
        out.heading(3, titles::GRADE_BREAKDOWN);
        let [name, weight] = titles::BREAKDOWN_HEADER;
        out.line(&format!("| {name} | {weight} |"));
        out.line("|---|---|");
        for row in rows {
            out.line(&format!("| {} | {} |", table_cell(row.name), row.weight));
        }
        out.blank();
    }

    out.heading(2, titles::MATERIALS);
    match &outline.materials {
        MaterialsSection::Required {
            citations,
            additional,
        } => {
            if !citations.is_empty() {
                out.bullets(
                    citations
                        .iter()
                        .map(|citation| format!("*{}*{}", citation.title, citation.details)),
                );
            }
            if let Some(additional) = additional {
                out.paragraph(additional);
            }
        }
        MaterialsSection::NoneRequired => out.paragraph(NO_MATERIALS_REQUIRED),
    }

    if let Some(attendance) = outline.attendance {
        out.heading(2, titles::ATTENDANCE);
        out.paragraph(attendance);
    }

    if let Some(custom) = outline.custom_statements {
        out.heading(2, titles::CUSTOM_STATEMENTS);
        out.paragraph(custom);
    }

    if let Some(diversity) = outline.diversity {
        out.line("---");
        out.blank();
        out.heading(2, titles::DIVERSITY);
        out.paragraph(diversity);
    }

    if let Some(compliance) = outline.compliance {
        out.heading(2, titles::COMPLIANCE);
        out.paragraph(compliance);
    }

    out.finish()
}

/// Pipe tables hold one line per row; line breaks become spaces.
fn table_cell(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

#[derive(Default)]
struct MarkdownWriter {
    buf: String,
}

impl MarkdownWriter {
    fn heading(&mut self, level: usize, text: &str) {
        self.buf
            .push_str(&format!("{} {}\n", "#".repeat(level), text.trim()));
        self.blank();
    }

    fn paragraph(&mut self, text: &str) {
        self.line(text.trim_end());
        self.blank();
    }

    fn bullets<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in items {
            self.buf.push_str(&format!("- {}\n", item.as_ref()));
        }
        self.blank();
    }

    fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn finish(mut self) -> String {
        while self.buf.ends_with("\n\n") {
            self.buf.pop();
        }
        self.buf
    }
}
