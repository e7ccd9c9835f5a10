//! Structural blocks handed to a word-processor backend.
//!
//! The backend only sees two heading levels, paragraphs made of styled runs,
//! bulleted paragraphs and a two-column table; page layout is its concern.

use serde::Serialize;

use crate::outline::{titles, MaterialsSection, Outline, NO_COURSE_SELECTED, NO_MATERIALS_REQUIRED};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Run {
    pub text: String,
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    /// Level 1 is the document title, level 2 a section.
    Heading { level: u8, text: String },
    Paragraph { runs: Vec<Run> },
    Bullet { runs: Vec<Run> },
    Table {
        header: [String; 2],
        rows: Vec<[String; 2]>,
    },
}

impl Block {
    fn title(text: &str) -> Self {
        Block::Heading {
            level: 1,
            text: text.to_owned(),
        }
    }

    fn section(text: &str) -> Self {
        Block::Heading {
            level: 2,
            text: text.to_owned(),
        }
    }

    fn text(text: &str) -> Self {
        Block::Paragraph {
            runs: vec![Run::plain(text.trim())],
        }
    }

    fn label(text: &str) -> Self {
        Block::Paragraph {
            runs: vec![Run::bold(text.trim())],
        }
    }

    fn bullet(text: &str) -> Self {
        Block::Bullet {
            runs: vec![Run::plain(text.trim())],
        }
    }

    /// Plain text of all runs, for searching and tests.
    pub fn text_content(&self) -> String {
        match self {
            Block::Heading { text, .. } => text.clone(),
            Block::Paragraph { runs } | Block::Bullet { runs } => {
                runs.iter().map(|run| run.text.as_str()).collect()
            }
            Block::Table { header, rows } => std::iter::once(header)
                .chain(rows.iter())
                .map(|row| row.join(" | "))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// One paragraph per non-empty line of user text.
fn free_text(blocks: &mut Vec<Block>, text: &str) {
    blocks.extend(
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(Block::text),
    );
}

pub(crate) fn render(outline: Option<&Outline<'_>>) -> Vec<Block> {
    let Some(outline) = outline else {
        return vec![Block::Paragraph {
            runs: vec![Run::italic(NO_COURSE_SELECTED)],
        }];
    };

    let mut blocks = vec![
        Block::title(&outline.heading),
        Block::Paragraph {
            runs: vec![Run::bold("Credits: "), Run::plain(outline.credits.to_string())],
        },
    ];

    if let Some(description) = outline.description {
        blocks.push(Block::section(titles::DESCRIPTION));
        free_text(&mut blocks, description);
    }

    if !outline.objectives.is_empty() {
        blocks.push(Block::section(titles::OBJECTIVES));
        blocks.extend(outline.objectives.iter().map(|objective| Block::bullet(objective)));
    }

    if !outline.geneds.is_empty() {
        blocks.push(Block::section(titles::GENEDS));
        for gened in &outline.geneds {
            blocks.push(Block::label(&gened.name));
            blocks.extend(gened.outcomes.iter().map(|outcome| Block::bullet(outcome)));
        }
    }

    blocks.push(Block::section(titles::GRADING));
    blocks.push(Block::label(titles::GRADE_SCALE));
    blocks.push(Block::text(&outline.grade_scale));

    if let Some(rows) = &outline.breakdown {
        blocks.push(Block::label(titles::GRADE_BREAKDOWN));
        let [name, weight] = titles::BREAKDOWN_HEADER;
        blocks.push(Block::Table {
            header: [name.to_owned(), weight.to_owned()],
            rows: rows
                .iter()
                .map(|row| [row.name.to_owned(), row.weight.clone()])
                .collect(),
        });
    }

    blocks.push(Block::section(titles::MATERIALS));
    match &outline.materials {
        MaterialsSection::Required {
            citations,
            additional,
        } => {
            blocks.extend(citations.iter().map(|citation| Block::Bullet {
                runs: vec![
                    Run::italic(citation.title),
                    Run::plain(citation.details.clone()),
                ],
            }));
            if let Some(additional) = additional {
                free_text(&mut blocks, additional);
            }
        }
        MaterialsSection::NoneRequired => blocks.push(Block::text(NO_MATERIALS_REQUIRED)),
    }

    if let Some(attendance) = outline.attendance {
        blocks.push(Block::section(titles::ATTENDANCE));
        free_text(&mut blocks, attendance);
    }

    if let Some(custom) = outline.custom_statements {
        blocks.push(Block::section(titles::CUSTOM_STATEMENTS));
        free_text(&mut blocks, custom);
    }

    if let Some(diversity) = outline.diversity {
        blocks.push(Block::section(titles::DIVERSITY));
        blocks.push(Block::text(diversity));
    }

    if let Some(compliance) = outline.compliance {
        blocks.push(Block::section(titles::COMPLIANCE));
        blocks.push(Block::text(compliance));
    }

    blocks
}
