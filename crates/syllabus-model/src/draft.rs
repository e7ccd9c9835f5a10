//! Draft cache: the wizard position plus a document snapshot, stored under a
//! fixed key inside a JSON file.
//!
//! Loading never fails. A missing file, malformed JSON, a missing key or
//! individual wrong-shaped fields all fall back to defaults, and fields are
//! rehydrated through the same typed gate as interactive writes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::document::{Course, DocumentModel};
use crate::error::DraftError;
use crate::field::FieldUpdate;
use crate::fs::atomic_write;
use crate::navigator::StepNavigator;

/// What survives between sessions.
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    pub step: usize,
    pub document: DocumentModel,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            step: 1,
            document: DocumentModel::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DraftStore {
    path: PathBuf,
    key: String,
}

impl DraftStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored draft, or the defaults when there is nothing usable.
    pub fn load(&self) -> Draft {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no draft found; starting fresh");
                return Draft::default();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable draft");
                return Draft::default();
            }
        };

        let root: Value = match serde_json::from_str(&contents) {
            Ok(root) => root,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring malformed draft");
                return Draft::default();
            }
        };

        match root.get(&self.key) {
            Some(entry) => restore(entry),
            None => {
                debug!(key = %self.key, "draft file has no entry for key");
                Draft::default()
            }
        }
    }

    /// Writes `draft` under the store key, keeping any other keys already in
    /// the file.
    pub fn save(&self, draft: &Draft) -> Result<(), DraftError> {
        let mut root = fs::read_to_string(&self.path)
            .ok()
            .and_then(|contents| serde_json::from_str::<Map<String, Value>>(&contents).ok())
            .unwrap_or_default();

        let entry = json!({
            "step": draft.step,
            "fields": serde_json::to_value(draft.document.document())?,
        });
        root.insert(self.key.clone(), entry);

        let rendered = serde_json::to_string_pretty(&Value::Object(root))?;
        atomic_write(&self.path, &rendered).map_err(|source| DraftError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn restore(entry: &Value) -> Draft {
    let mut draft = Draft::default();

    if let Some(step) = entry.get("step").and_then(Value::as_u64) {
        let step = usize::try_from(step).unwrap_or(usize::MAX);
        draft.step = StepNavigator::wizard().resume_at(step).current();
    }

    let Some(fields) = entry.get("fields").and_then(Value::as_object) else {
        warn!("draft entry has no field map; using defaults");
        return draft;
    };

    if let Some(course) = fields.get("course").filter(|value| !value.is_null()) {
        match serde_json::from_value::<Course>(course.clone()) {
            Ok(course) => draft.document.set_course(course),
            Err(err) => warn!(error = %err, "discarding malformed course in draft"),
        }
    }

    for (name, value) in fields {
        if name == "course" || name == "genedOutcomes" {
            continue;
        }
        if !draft.document.update_field(name, value.clone()) {
            warn!(field = %name, "discarding unusable draft field");
        }
    }

    draft
}
