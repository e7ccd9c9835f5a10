use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use similar::TextDiff;
use syllabus_config::{Config, LoadOptions, OutputFormat};
use syllabus_model::{
    fs::atomic_write, Assignment, Catalog, CatalogError, Draft, DraftError, DraftStore,
    FieldUpdate, GenedSelection, Material, StepNavigator, WizardStep,
};
use syllabus_render::{outline::format_percentage, Format, Renderer, Statements};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "SYLLABUS_LOG";

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut options = LoadOptions::default();
    if let Some(path) = &cli.config {
        options = options.with_override_path(path.clone());
    }
    let config = Config::load(options)?;
    let mut session = Session::open(config);

    match cli.command {
        Command::Status => handle_status(&session),
        Command::Search(args) => handle_search(&session, args),
        Command::Course(args) => handle_course(&mut session, args),
        Command::Set(args) => handle_set(&mut session, args),
        Command::Objectives(args) => {
            session.apply(FieldUpdate::Objectives(args.objectives));
            session.save()
        }
        Command::Assignments(args) => handle_assignments(&mut session, args),
        Command::Material(args) => handle_material(&mut session, args),
        Command::Geneds(action) => handle_geneds(&mut session, action),
        Command::Step(action) => handle_step(&mut session, action),
        Command::Render(args) => handle_render(&session, args),
        Command::Reset => {
            session.draft = Draft::default();
            let code = session.save()?;
            if code == 0 {
                println!("Draft reset.");
            }
            Ok(code)
        }
    }
}

/// Installs the stderr subscriber. `SYLLABUS_LOG` holds the filter and
/// `--verbose` forces debug output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A second init only happens when embedded in tests; keep the first.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init();
}

/// Loaded configuration plus the draft being edited.
struct Session {
    config: Config,
    store: DraftStore,
    draft: Draft,
}

impl Session {
    fn open(config: Config) -> Self {
        let store = DraftStore::new(config.draft.path.clone(), config.draft.key.clone());
        let draft = store.load();
        Self {
            config,
            store,
            draft,
        }
    }

    fn apply(&mut self, update: FieldUpdate) {
        self.draft.document.update(update);
    }

    /// Persists the draft; I/O failures map to exit code 4.
    fn save(&self) -> Result<i32> {
        match self.store.save(&self.draft) {
            Ok(()) => Ok(0),
            Err(DraftError::Io { path, source }) => {
                eprintln!("I/O error on {}: {}", path.display(), source);
                Ok(4)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Loads the catalog, reporting unreadable tables on stderr.
    fn catalog(&self) -> Result<Option<Catalog>> {
        let settings = &self.config.catalog;
        match Catalog::load(&settings.courses, &settings.geneds) {
            Ok(catalog) => Ok(Some(catalog)),
            Err(CatalogError::Io { path, source }) => {
                eprintln!("I/O error on {}: {}", path.display(), source);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn renderer(&self) -> Renderer {
        let builtin = Statements::default();
        let overrides = &self.config.statements;
        Renderer::new(Statements {
            diversity: overrides
                .diversity
                .clone()
                .unwrap_or(builtin.diversity),
            compliance: overrides
                .compliance
                .clone()
                .unwrap_or(builtin.compliance),
        })
    }
}

fn handle_status(session: &Session) -> Result<i32> {
    let doc = session.draft.document.document();
    let current = StepNavigator::wizard()
        .resume_at(session.draft.step)
        .current();
    let step = WizardStep::from_number(current).unwrap_or(WizardStep::Course);

    println!(
        "Step {}/{}: {}",
        step.number(),
        WizardStep::ALL.len(),
        step.title()
    );
    match &doc.course {
        Some(course) => println!("Course: {}", course.heading()),
        None => println!("Course: none selected"),
    }
    println!("Objectives: {}", doc.objectives.len());
    println!(
        "Assignments: {} ({} total)",
        doc.assignments.len(),
        format_percentage(doc.total_percentage())
    );
    Ok(0)
}

fn handle_search(session: &Session, args: SearchArgs) -> Result<i32> {
    let SearchArgs { query, limit } = args;
    let Some(catalog) = session.catalog()? else {
        return Ok(4);
    };

    let hits = catalog.search(&query, limit);
    if hits.is_empty() {
        println!("No courses match '{query}'.");
        return Ok(1);
    }
    for hit in hits {
        println!("{}\t{} ({} credits)", hit.key, hit.title, hit.credits);
    }
    Ok(0)
}

fn handle_course(session: &mut Session, args: CourseArgs) -> Result<i32> {
    let Some(catalog) = session.catalog()? else {
        return Ok(4);
    };
    let Some(course) = catalog.course(&args.key) else {
        eprintln!("course '{}' not found in catalog", args.key);
        return Ok(1);
    };

    println!("Selected {}", course.heading());
    let model = &mut session.draft.document;
    model.set_course(course);
    model.update(FieldUpdate::ConfirmedGeneds(GenedSelection::Unset));
    session.save()
}

fn handle_set(session: &mut Session, args: SetArgs) -> Result<i32> {
    let SetArgs { field, value } = args;
    let value: serde_json::Value = match serde_json::from_str(&value) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("value for '{field}' is not valid JSON: {err}");
            return Ok(1);
        }
    };

    if !session.draft.document.update_field(&field, value) {
        warn!(%field, "write ignored");
        eprintln!("ignored write to unknown or malformed field '{field}'");
        return Ok(0);
    }
    session.save()
}

fn handle_assignments(session: &mut Session, args: AssignmentsArgs) -> Result<i32> {
    let mut assignments = Vec::with_capacity(args.rows.len());
    for row in &args.rows {
        match parse_assignment(row) {
            Some(assignment) => assignments.push(assignment),
            None => {
                eprintln!("expected NAME=PERCENT with a finite weight, got '{row}'");
                return Ok(1);
            }
        }
    }

    session.apply(FieldUpdate::Assignments(assignments));
    let total = session.draft.document.document().total_percentage();
    println!("Weights total {}", format_percentage(total));
    session.save()
}

fn parse_assignment(row: &str) -> Option<Assignment> {
    let (name, percentage) = row.rsplit_once('=')?;
    let percentage = percentage.trim().trim_end_matches('%');
    let percentage = if percentage.is_empty() {
        0.0
    } else {
        percentage
            .parse::<f64>()
            .ok()
            .filter(|weight| weight.is_finite())?
    };
    Some(Assignment::new(name.trim(), percentage))
}

fn handle_material(session: &mut Session, args: MaterialArgs) -> Result<i32> {
    let MaterialArgs {
        title,
        author,
        publisher,
        edition,
        isbn,
    } = args;

    let mut materials = session.draft.document.document().materials.clone();
    materials.push(Material {
        title,
        author: author.unwrap_or_default(),
        publisher: publisher.unwrap_or_default(),
        edition: edition.unwrap_or_default(),
        isbn: isbn.unwrap_or_default(),
    });
    session.apply(FieldUpdate::Materials(materials));
    session.save()
}

fn handle_geneds(session: &mut Session, action: GenedsAction) -> Result<i32> {
    let doc = session.draft.document.document();
    let selection = match action {
        GenedsAction::Exclude => GenedSelection::Declined,
        GenedsAction::All => {
            GenedSelection::confirmed(doc.gened_outcomes.iter().map(|gened| gened.code.clone()))
        }
        GenedsAction::Confirm { codes } => {
            if doc.course.is_none() {
                eprintln!("select a course before confirming gen-eds");
                return Ok(1);
            }
            let mut confirmed = Vec::with_capacity(codes.len());
            for code in &codes {
                let known = doc
                    .gened_outcomes
                    .iter()
                    .find(|gened| gened.code.eq_ignore_ascii_case(code));
                match known {
                    Some(gened) => confirmed.push(gened.code.clone()),
                    None => {
                        eprintln!("course has no gen-ed '{code}'");
                        return Ok(1);
                    }
                }
            }
            GenedSelection::confirmed(confirmed)
        }
    };

    session.apply(FieldUpdate::ConfirmedGeneds(selection));
    session.save()
}

fn handle_step(session: &mut Session, action: StepAction) -> Result<i32> {
    let reached_end = Rc::new(Cell::new(false));
    let mut navigator = StepNavigator::wizard().resume_at(session.draft.step);
    let last = navigator.total();
    navigator.on_transition({
        let reached_end = Rc::clone(&reached_end);
        move |transition| {
            info!(from = transition.from, to = transition.to, "step changed");
            reached_end.set(transition.to == last);
        }
    });

    let moved = match action {
        StepAction::Next => navigator.advance(),
        StepAction::Back => navigator.retreat(),
        StepAction::Goto { step } => navigator.go_to(step),
    };

    let step = WizardStep::from_number(navigator.current()).unwrap_or(WizardStep::Course);
    println!("Step {}/{}: {}", step.number(), last, step.title());
    if moved.is_none() {
        return Ok(0);
    }

    session.draft.step = navigator.current();
    let code = session.save()?;
    if code == 0 && reached_end.get() {
        emit(&session.renderer().markdown(session.draft.document.document()))?;
    }
    Ok(code)
}

fn handle_render(session: &Session, args: RenderArgs) -> Result<i32> {
    let RenderArgs {
        format,
        output,
        diff,
    } = args;

    let format = match format {
        Some(value) => value.into(),
        None => render_format(session.config.render.format),
    };
    let rendered = session
        .renderer()
        .render(format, session.draft.document.document())
        .context("serializing document blocks")?;

    let Some(path) = output else {
        emit(&rendered)?;
        return Ok(0);
    };

    if diff {
        let existing = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => {
                eprintln!("I/O error on {}: {}", path.display(), err);
                return Ok(4);
            }
        };
        return match build_unified_diff(&existing, &rendered, &path) {
            Some(diff) => {
                emit(&diff)?;
                Ok(2)
            }
            None => {
                println!("{} is up to date", path.display());
                Ok(0)
            }
        };
    }

    if let Err(err) = atomic_write(&path, &rendered) {
        eprintln!("I/O error on {}: {}", path.display(), err);
        return Ok(4);
    }
    info!(path = %path.display(), ?format, "exported syllabus");
    println!("Wrote {}", path.display());
    Ok(0)
}

fn build_unified_diff(original: &str, modified: &str, path: &Path) -> Option<String> {
    if original == modified {
        return None;
    }

    let diff = TextDiff::from_lines(original, modified);
    let header_old = format!("a/{}", path.display());
    let header_new = format!("b/{}", path.display());
    Some(
        diff.unified_diff()
            .header(&header_old, &header_new)
            .to_string(),
    )
}

fn render_format(format: OutputFormat) -> Format {
    match format {
        OutputFormat::Markdown => Format::Markdown,
        OutputFormat::Html => Format::Html,
        OutputFormat::Blocks => Format::Blocks,
    }
}

fn emit(content: &str) -> Result<()> {
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Step-by-step course syllabus builder",
    propagate_version = true
)]
struct Cli {
    /// Use this configuration file instead of `.syllabus.toml` discovery
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current step and a summary of the draft
    Status,
    /// Search the course catalog
    Search(SearchArgs),
    /// Select a course from the catalog
    Course(CourseArgs),
    /// Write a document field from a JSON value
    Set(SetArgs),
    /// Replace the learning objectives
    Objectives(ObjectivesArgs),
    /// Replace the graded assignments
    Assignments(AssignmentsArgs),
    /// Add a required material
    Material(MaterialArgs),
    /// Choose which gen-ed outcomes to include
    #[command(subcommand)]
    Geneds(GenedsAction),
    /// Move through the wizard steps
    #[command(subcommand)]
    Step(StepAction),
    /// Render the syllabus
    Render(RenderArgs),
    /// Discard the draft and start over
    Reset,
}

#[derive(Args)]
struct SearchArgs {
    /// Course key or title fragment
    query: String,
    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[derive(Args)]
struct CourseArgs {
    /// Catalog key such as `COMP110` or `comp 110`
    key: String,
}

#[derive(Args)]
struct SetArgs {
    /// Field name, e.g. `gradeScale` or `attendancePolicy`
    field: String,
    /// JSON value for the field
    value: String,
}

#[derive(Args)]
struct ObjectivesArgs {
    #[arg(value_name = "TEXT", action = ArgAction::Append)]
    objectives: Vec<String>,
}

#[derive(Args)]
struct AssignmentsArgs {
    /// Rows written as NAME=PERCENT
    #[arg(value_name = "NAME=PERCENT", action = ArgAction::Append)]
    rows: Vec<String>,
}

#[derive(Args)]
struct MaterialArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    publisher: Option<String>,
    #[arg(long)]
    edition: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
}

#[derive(Subcommand)]
enum GenedsAction {
    /// Include every gen-ed of the selected course
    All,
    /// Include no gen-ed outcomes
    #[command(name = "none")]
    Exclude,
    /// Include only the listed gen-ed codes
    Confirm {
        #[arg(value_name = "CODE", required = true)]
        codes: Vec<String>,
    },
}

#[derive(Subcommand)]
enum StepAction {
    Next,
    Back,
    /// Jump back to an earlier step
    Goto { step: usize },
}

#[derive(Args)]
struct RenderArgs {
    /// Output format (defaults to `render.format` from configuration)
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
    /// Write to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Print a unified diff against the existing output file instead of writing
    #[arg(long, requires = "output")]
    diff: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatValue {
    Markdown,
    Html,
    Blocks,
}

impl From<FormatValue> for Format {
    fn from(value: FormatValue) -> Self {
        match value {
            FormatValue::Markdown => Format::Markdown,
            FormatValue::Html => Format::Html,
            FormatValue::Blocks => Format::Blocks,
        }
    }
}
