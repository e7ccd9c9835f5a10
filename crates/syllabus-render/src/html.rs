use pulldown_cmark::escape::escape_html;

use crate::outline::{titles, MaterialsSection, Outline, NO_COURSE_SELECTED, NO_MATERIALS_REQUIRED};

/// UTF-8 bullet bytes decoded as Windows-1252.
const MOJIBAKE_BULLET: &str = "\u{e2}\u{20ac}\u{a2}";

pub(crate) fn render(outline: Option<&Outline<'_>>) -> String {
    let Some(outline) = outline else {
        return format!("<p class=\"placeholder\"><em>{NO_COURSE_SELECTED}</em></p>\n");
    };

    let mut out = HtmlWriter::default();
    out.raw("<article class=\"syllabus\">\n");
    out.element("h1", &outline.heading);
    out.raw(&format!(
        "<p><strong>Credits:</strong> {}</p>\n",
        outline.credits
    ));

    if let Some(description) = outline.description {
        out.element("h2", titles::DESCRIPTION);
        out.free_text(description);
    }

    if !outline.objectives.is_empty() {
        out.element("h2", titles::OBJECTIVES);
        out.list(outline.objectives.iter().copied());
    }

    if !outline.geneds.is_empty() {
        out.element("h2", titles::GENEDS);
        for gened in &outline.geneds {
            out.raw("<section class=\"gened\">\n");
            out.element("h3", &gened.name);
            out.list(gened.outcomes.iter().map(String::as_str));
            out.raw("</section>\n");
        }
    }

    out.element("h2", titles::GRADING);
    out.element("h3", titles::GRADE_SCALE);
    out.element("p", &outline.grade_scale);

    if let Some(rows) = &outline.breakdown {
        out.element("h3", titles::GRADE_BREAKDOWN);
        let [name, weight] = titles::BREAKDOWN_HEADER;
        out.raw("<table class=\"grade-breakdown\">\n<thead><tr>");
        out.inline("th", name);
        out.inline("th", weight);
        out.raw("</tr></thead>\n<tbody>\n");
        for row in rows {
            out.raw("<tr>");
            out.inline("td", row.name);
            out.inline("td", &row.weight);
            out.raw("</tr>\n");
        }
        out.raw("</tbody>\n</table>\n");
    }

    out.element("h2", titles::MATERIALS);
    match &outline.materials {
        MaterialsSection::Required {
            citations,
            additional,
        } => {
            if !citations.is_empty() {
                out.raw("<ul>\n");
                for citation in citations {
                    out.raw("<li>");
                    out.inline("em", citation.title);
                    out.text(&citation.details);
                    out.raw("</li>\n");
                }
                out.raw("</ul>\n");
            }
            if let Some(additional) = additional {
                out.free_text(additional);
            }
        }
        MaterialsSection::NoneRequired => out.element("p", NO_MATERIALS_REQUIRED),
    }

    if let Some(attendance) = outline.attendance {
        out.element("h2", titles::ATTENDANCE);
        out.free_text(attendance);
    }

    if let Some(custom) = outline.custom_statements {
        out.element("h2", titles::CUSTOM_STATEMENTS);
        out.free_text(custom);
    }

    if let Some(diversity) = outline.diversity {
        out.raw("<hr>\n");
        out.element("h2", titles::DIVERSITY);
        out.element("p", diversity);
    }

    if let Some(compliance) = outline.compliance {
        out.element("h2", titles::COMPLIANCE);
        out.element("p", compliance);
    }

    out.raw("</article>\n");
    out.buf
}

/// Repairs mis-encoded bullets, escapes markup and turns newlines into
/// `<br>` so user text keeps its line structure.
pub(crate) fn free_text_html(text: &str) -> String {
    let repaired = text
        .replace(MOJIBAKE_BULLET, "\u{2022}")
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    escape(repaired.trim_end()).replace('\n', "<br>\n")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut escaped, text);
    escaped
}

#[derive(Default)]
struct HtmlWriter {
    buf: String,
}

impl HtmlWriter {
    fn raw(&mut self, markup: &str) {
        self.buf.push_str(markup);
    }

    fn text(&mut self, text: &str) {
        self.buf.push_str(&escape(text));
    }

    fn inline(&mut self, tag: &str, text: &str) {
        self.buf.push_str(&format!("<{tag}>{}</{tag}>", escape(text)));
    }

    fn element(&mut self, tag: &str, text: &str) {
        self.inline(tag, text.trim());
        self.buf.push('\n');
    }

    fn free_text(&mut self, text: &str) {
        self.buf
            .push_str(&format!("<p>{}</p>\n", free_text_html(text)));
    }

    fn list<'s>(&mut self, items: impl IntoIterator<Item = &'s str>) {
        self.buf.push_str("<ul>\n");
        for item in items {
            self.inline("li", item);
            self.buf.push('\n');
        }
        self.buf.push_str("</ul>\n");
    }
}
