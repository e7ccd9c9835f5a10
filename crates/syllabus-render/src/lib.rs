//! Output formatters for syllabus documents.
//!
//! All formats are pure functions of a [`SyllabusDocument`] snapshot. What a
//! syllabus contains is decided once in [`outline`]; the Markdown, HTML and
//! block renderers only differ in markup.

mod blocks;
mod html;
mod markdown;
pub mod outline;

pub use blocks::{Block, Run};
pub use outline::{
    grade_scale_text, Statements, CUSTOM_SCALE_PLACEHOLDER, NO_COURSE_SELECTED,
    NO_MATERIALS_REQUIRED,
};

use outline::Outline;
use syllabus_model::SyllabusDocument;

/// Supported renderer outputs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Markdown,
    Html,
    Blocks,
}

/// Renderer configured with the boilerplate statements to append.
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    statements: Statements,
}

impl Renderer {
    pub fn new(statements: Statements) -> Self {
        Self { statements }
    }

    pub fn statements(&self) -> &Statements {
        &self.statements
    }

    pub fn markdown(&self, doc: &SyllabusDocument) -> String {
        markdown::render(Outline::build(doc, &self.statements).as_ref())
    }

    /// HTML preview fragment rooted at `<article class="syllabus">`.
    pub fn html(&self, doc: &SyllabusDocument) -> String {
        html::render(Outline::build(doc, &self.statements).as_ref())
    }

    pub fn blocks(&self, doc: &SyllabusDocument) -> Vec<Block> {
        blocks::render(Outline::build(doc, &self.statements).as_ref())
    }

    /// Renders `doc` as text; blocks are emitted as pretty JSON.
    pub fn render(&self, format: Format, doc: &SyllabusDocument) -> serde_json::Result<String> {
        match format {
            Format::Markdown => Ok(self.markdown(doc)),
            Format::Html => Ok(self.html(doc)),
            Format::Blocks => {
                let mut json = serde_json::to_string_pretty(&self.blocks(doc))?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

/// Markdown with the built-in statements.
pub fn render_markdown(doc: &SyllabusDocument) -> String {
    Renderer::default().markdown(doc)
}

/// HTML with the built-in statements.
pub fn render_html(doc: &SyllabusDocument) -> String {
    Renderer::default().html(doc)
}

/// Blocks with the built-in statements.
pub fn render_blocks(doc: &SyllabusDocument) -> Vec<Block> {
    Renderer::default().blocks(doc)
}
