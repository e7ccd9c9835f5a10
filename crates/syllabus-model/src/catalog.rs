//! Read-only course and gen-ed lookup tables.
//!
//! `courses.json` maps a key such as `COMP110` to a course record listing
//! gen-ed codes; `geneds.json` maps each code to its name and outcomes. A
//! selected course carries the two tables joined together.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::document::{Course, GenedDetail};
use crate::error::CatalogError;

#[derive(Clone, Debug, Deserialize)]
struct CourseRecord {
    prefix: String,
    number: String,
    title: String,
    credits: u32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    geneds: Vec<String>,
}

/// Gen-ed table entry.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GenedRecord {
    pub name: String,
    #[serde(default)]
    pub outcomes: Vec<String>,
}

/// One search hit.
#[derive(Clone, Debug, PartialEq)]
pub struct CourseSummary {
    pub key: String,
    pub title: String,
    pub credits: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    courses: BTreeMap<String, CourseRecord>,
    geneds: BTreeMap<String, GenedRecord>,
}

impl Catalog {
    pub fn load(courses: &Path, geneds: &Path) -> Result<Self, CatalogError> {
        let courses = read_table(courses)?;
        let geneds = read_table(geneds)?;
        debug!(
            courses = courses.len(),
            geneds = geneds.len(),
            "catalog loaded"
        );
        Ok(Self { courses, geneds })
    }

    /// Builds a catalog from in-memory JSON tables.
    pub fn from_json(courses: &str, geneds: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            courses: serde_json::from_str(courses)?,
            geneds: serde_json::from_str(geneds)?,
        })
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Looks up `key` (in any spacing or case) and joins its gen-ed details.
    /// Codes missing from the gen-ed table are skipped.
    pub fn course(&self, key: &str) -> Option<Course> {
        let key = normalize_key(key)?;
        let record = self.courses.get(&key)?;

        let gened_details = record
            .geneds
            .iter()
            .filter_map(|code| {
                let gened = self.geneds.get(code);
                if gened.is_none() {
                    debug!(%key, %code, "course lists unknown gen-ed code");
                }
                gened.map(|gened| GenedDetail {
                    code: code.clone(),
                    name: gened.name.clone(),
                    outcomes: gened.outcomes.clone(),
                })
            })
            .collect();

        Some(Course {
            prefix: record.prefix.clone(),
            number: record.number.clone(),
            title: record.title.clone(),
            credits: record.credits,
            description: record.description.clone(),
            geneds: record.geneds.clone(),
            gened_details,
        })
    }

    /// Case-insensitive match on key, code and title, ordered by key.
    pub fn search(&self, query: &str, limit: usize) -> Vec<CourseSummary> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let compact: String = needle.split_whitespace().collect();

        self.courses
            .iter()
            .filter(|(key, record)| {
                key.to_lowercase().contains(&compact)
                    || record.title.to_lowercase().contains(&needle)
            })
            .take(limit)
            .map(|(key, record)| CourseSummary {
                key: key.clone(),
                title: record.title.clone(),
                credits: record.credits,
            })
            .collect()
    }
}

fn read_table<T>(path: &Path) -> Result<BTreeMap<String, T>, CatalogError>
where
    T: for<'de> Deserialize<'de>,
{
    let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.into(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
        path: path.into(),
        source,
    })
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z]+)\s*(\d+[A-Za-z]?)\s*$").expect("course key pattern is valid")
    })
}

/// Normalises user input such as `comp 110` into the catalog key `COMP110`.
pub fn normalize_key(input: &str) -> Option<String> {
    let captures = key_pattern().captures(input)?;
    Some(format!(
        "{}{}",
        captures[1].to_uppercase(),
        captures[2].to_uppercase()
    ))
}
