//! Document model for the syllabus builder.
//!
//! The crate owns the single mutable aggregate a wizard session edits
//! ([`DocumentModel`]), the typed field updates that are the only way to
//! change it ([`FieldUpdate`]), the step sequencer driving the wizard
//! ([`StepNavigator`]), the catalog join that produces selectable courses,
//! and the on-disk draft cache.

pub mod catalog;
pub mod document;
pub mod draft;
pub mod error;
pub mod field;
pub mod fs;
pub mod navigator;

pub use catalog::{normalize_key, Catalog, CourseSummary, GenedRecord};
pub use document::{
    Assignment, Course, DocumentModel, GenedDetail, GenedSelection, GradeScale, Material,
    SyllabusDocument,
};
pub use draft::{Draft, DraftStore};
pub use error::{CatalogError, DraftError};
pub use field::{FieldName, FieldUpdate};
pub use navigator::{StepNavigator, Transition, WizardStep};
