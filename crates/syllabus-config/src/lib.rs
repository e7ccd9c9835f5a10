//! Layered `.syllabus.toml` settings for the syllabus builder.
//!
//! Lowest to highest precedence: built-in defaults, the repository root, the
//! working directory, then an explicit `--config` file. Every layer becomes a
//! partial config whose fields remember the file that set them; merging
//! keeps the last value per field and validation reports all problems at once.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = ".syllabus.toml";

/// Storage key the draft snapshot lives under inside the draft file.
pub const DEFAULT_DRAFT_KEY: &str = "syllabusBuilderDraft";

/// Typed settings after all layers are merged.
#[derive(Clone, Debug)]
pub struct Config {
    pub draft: DraftSettings,
    pub catalog: CatalogSettings,
    pub render: RenderSettings,
    pub statements: StatementSettings,
    pub sources: ConfigSources,
}

/// Where the in-progress draft is cached between invocations.
#[derive(Clone, Debug)]
pub struct DraftSettings {
    pub path: PathBuf,
    pub key: String,
}

/// Locations of the read-only catalog lookup tables.
#[derive(Clone, Debug)]
pub struct CatalogSettings {
    pub courses: PathBuf,
    pub geneds: PathBuf,
}

#[derive(Clone, Debug)]
pub struct RenderSettings {
    pub format: OutputFormat,
}

/// Institution overrides for the boilerplate statements. `None` keeps the
/// built-in text.
#[derive(Clone, Debug, Default)]
pub struct StatementSettings {
    pub diversity: Option<String>,
    pub compliance: Option<String>,
}

/// Output formats the render command can produce.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Markdown,
    Html,
    Blocks,
}

impl OutputFormat {
    pub const ALL: &'static [OutputFormat] =
        &[OutputFormat::Markdown, OutputFormat::Html, OutputFormat::Blocks];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Blocks => "blocks",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, ()> {
        match name {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            "blocks" | "docx" => Ok(OutputFormat::Blocks),
            _ => Err(()),
        }
    }
}

/// The layers that contributed to a [`Config`], lowest precedence first.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// One configuration layer. Relative paths it sets resolve against
/// `base_dir`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn builtin(base_dir: PathBuf) -> Self {
        Self {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = match path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        Self {
            kind,
            path: Some(path),
            base_dir,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} {}", self.kind, path.display()),
            None => f.write_str("built-in defaults"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "repository config",
            ConfigSourceKind::Local => "working-directory config",
            ConfigSourceKind::Override => "--config file",
        })
    }
}

/// Inputs to [`Config::load`]. Both fields default to the process
/// environment.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            override_path: Some(path.into()),
            ..self
        }
    }

    pub fn with_working_dir(self, path: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(path.into()),
            ..self
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot use {attempted} as working directory: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("config file {path} does not exist")]
    OverrideNotFound { path: PathBuf },
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Reads every applicable `.syllabus.toml` and merges it over the
    /// defaults.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;

        let override_file = match options.override_path {
            Some(path) => {
                let path = if path.is_absolute() {
                    path
                } else {
                    working_dir.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::OverrideNotFound { path });
                }
                Some(path)
            }
            None => None,
        };

        let builtin = ConfigSource::builtin(working_dir.clone());
        let mut merged = defaults_layer(builtin.clone());
        let mut layers = vec![builtin];

        for (kind, path) in layer_files(&working_dir, override_file) {
            let source = ConfigSource::file(kind, path.clone());
            merged.merge(load_layer(&path, &source)?);
            layers.push(source);
        }

        merged
            .finalize(working_dir, layers)
            .map_err(ConfigError::Validation)
    }

    /// Built-in defaults rooted at `working_dir`, without touching the disk.
    pub fn defaults(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Config {
            draft: DraftSettings {
                path: working_dir.join(".syllabus-draft.json"),
                key: DEFAULT_DRAFT_KEY.to_owned(),
            },
            catalog: CatalogSettings {
                courses: working_dir.join("data/courses.json"),
                geneds: working_dir.join("data/geneds.json"),
            },
            render: RenderSettings {
                format: OutputFormat::Markdown,
            },
            statements: StatementSettings::default(),
            sources: ConfigSources {
                layers: vec![ConfigSource::builtin(working_dir.clone())],
                working_directory: working_dir,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::defaults(".")
    }
}

fn resolve_working_dir(requested: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let resolved = match &requested {
        Some(path) => fs::canonicalize(path),
        None => env::current_dir(),
    };
    resolved.map_err(|source| ConfigError::WorkingDirectory {
        attempted: requested.unwrap_or_else(|| PathBuf::from(".")),
        source,
    })
}

/// Config files to merge, lowest precedence first. The repository file is
/// skipped when it is the working-directory file, and neither is read twice
/// when it is also the `--config` file.
fn layer_files(
    working_dir: &Path,
    override_file: Option<PathBuf>,
) -> Vec<(ConfigSourceKind, PathBuf)> {
    let local = working_dir.join(CONFIG_FILE_NAME);
    let repository = working_dir
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(|root| root.join(CONFIG_FILE_NAME))
        .filter(|path| *path != local);

    let mut files: Vec<(ConfigSourceKind, PathBuf)> = repository
        .map(|path| (ConfigSourceKind::GitRoot, path))
        .into_iter()
        .chain([(ConfigSourceKind::Local, local)])
        .filter(|(_, path)| path.exists() && Some(path) != override_file.as_ref())
        .collect();

    if let Some(path) = override_file {
        files.push((ConfigSourceKind::Override, path));
    }
    files
}

fn load_layer(path: &Path, source: &ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        source: err,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    let at = |value| Located::new(value, source.clone());
    PartialConfig {
        draft_path: Some(at(PathBuf::from(".syllabus-draft.json"))),
        draft_key: Some(Located::new(DEFAULT_DRAFT_KEY.to_owned(), source.clone())),
        courses: Some(at(PathBuf::from("data/courses.json"))),
        geneds: Some(at(PathBuf::from("data/geneds.json"))),
        format: Some(Located::new("markdown".to_owned(), source.clone())),
        diversity: None,
        compliance: None,
    }
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    draft_path: Option<Located<PathBuf>>,
    draft_key: Option<Located<String>>,
    courses: Option<Located<PathBuf>>,
    geneds: Option<Located<PathBuf>>,
    format: Option<Located<String>>,
    diversity: Option<Located<String>>,
    compliance: Option<Located<String>>,
}

impl PartialConfig {
    /// Overlays every field `other` sets.
    fn merge(&mut self, other: PartialConfig) {
        fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        overlay(&mut self.draft_path, other.draft_path);
        overlay(&mut self.draft_key, other.draft_key);
        overlay(&mut self.courses, other.courses);
        overlay(&mut self.geneds, other.geneds);
        overlay(&mut self.format, other.format);
        overlay(&mut self.diversity, other.diversity);
        overlay(&mut self.compliance, other.compliance);
    }

    fn finalize(
        self,
        working_dir: PathBuf,
        layers: Vec<ConfigSource>,
    ) -> Result<Config, ConfigValidationErrors> {
        let mut errors = Vec::new();
        let fallback = || ConfigSource::builtin(working_dir.clone());

        let draft_path = self
            .draft_path
            .unwrap_or_else(|| Located::new(PathBuf::from(".syllabus-draft.json"), fallback()));
        let draft_key = self
            .draft_key
            .unwrap_or_else(|| Located::new(DEFAULT_DRAFT_KEY.to_owned(), fallback()));
        if draft_key.value.trim().is_empty() {
            errors.push(
                ConfigValidationError::new(
                    Some(draft_key.source.clone()),
                    "storage key cannot be empty".into(),
                )
                .with_context("draft.key"),
            );
        }

        let courses = self
            .courses
            .unwrap_or_else(|| Located::new(PathBuf::from("data/courses.json"), fallback()));
        let geneds = self
            .geneds
            .unwrap_or_else(|| Located::new(PathBuf::from("data/geneds.json"), fallback()));

        let format_loc = self
            .format
            .unwrap_or_else(|| Located::new("markdown".to_owned(), fallback()));
        let format = match format_loc.value.parse::<OutputFormat>() {
            Ok(format) => format,
            Err(()) => {
                errors.push(
                    ConfigValidationError::new(
                        Some(format_loc.source.clone()),
                        format!(
                            "unknown output format '{}' (expected one of: {})",
                            format_loc.value,
                            OutputFormat::ALL
                                .iter()
                                .map(|f| f.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    )
                    .with_context("render.format"),
                );
                OutputFormat::Markdown
            }
        };

        let diversity = non_empty_statement(self.diversity, "statements.diversity", &mut errors);
        let compliance =
            non_empty_statement(self.compliance, "statements.compliance", &mut errors);

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(Config {
            draft: DraftSettings {
                path: resolve_path(&draft_path),
                key: draft_key.value,
            },
            catalog: CatalogSettings {
                courses: resolve_path(&courses),
                geneds: resolve_path(&geneds),
            },
            render: RenderSettings { format },
            statements: StatementSettings {
                diversity,
                compliance,
            },
            sources: ConfigSources {
                working_directory: working_dir,
                layers,
            },
        })
    }
}

fn non_empty_statement(
    located: Option<Located<String>>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Option<String> {
    let located = located?;
    if located.value.trim().is_empty() {
        errors.push(
            ConfigValidationError::new(
                Some(located.source),
                "statement text cannot be empty; remove the key to use the built-in text".into(),
            )
            .with_context(context),
        );
        return None;
    }
    Some(located.value)
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    let path = &located.value;
    if path.is_absolute() {
        path.clone()
    } else {
        located.source.base_dir.join(path)
    }
}

/// Every problem found while finalizing, one per line.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.iter().map(|err| format!("  - {err}")).collect();
        f.write_str(&lines.join("\n"))
    }
}

/// A rejected setting, keyed by its TOML path (`render.format`).
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        Self {
            source,
            message,
            context: None,
        }
    }

    fn with_context(self, key: impl Into<String>) -> Self {
        Self {
            context: Some(key.into()),
            ..self
        }
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(key) => write!(f, "{key}: {}", self.message)?,
            None => f.write_str(&self.message)?,
        }
        match &self.source {
            Some(source) => write!(f, " (set by {source})"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    draft: Option<RawDraft>,
    #[serde(default)]
    catalog: Option<RawCatalog>,
    #[serde(default)]
    render: Option<RawRender>,
    #[serde(default)]
    statements: Option<RawStatements>,
}

impl RawConfig {
    fn into_partial(self, source: &ConfigSource) -> PartialConfig {
        let mut partial = PartialConfig::default();
        let located = |value| Located::new(value, source.clone());

        if let Some(draft) = self.draft {
            partial.draft_path = draft.path.map(located);
            partial.draft_key = draft.key.map(|key| Located::new(key, source.clone()));
        }
        if let Some(catalog) = self.catalog {
            partial.courses = catalog.courses.map(located);
            partial.geneds = catalog.geneds.map(located);
        }
        if let Some(render) = self.render {
            partial.format = render.format.map(|value| Located::new(value, source.clone()));
        }
        if let Some(statements) = self.statements {
            partial.diversity = statements
                .diversity
                .map(|value| Located::new(value, source.clone()));
            partial.compliance = statements
                .compliance
                .map(|value| Located::new(value, source.clone()));
        }
        partial
    }
}

#[derive(Debug, Deserialize)]
struct RawDraft {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    courses: Option<PathBuf>,
    #[serde(default)]
    geneds: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawRender {
    #[serde(default)]
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStatements {
    #[serde(default)]
    diversity: Option<String>,
    #[serde(default)]
    compliance: Option<String>,
}
