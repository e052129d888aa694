//! Form file tools.
//!
//! Provides the `formkit` binary with subcommands over persisted forms:
//! `check` loads a form and reports problems, `upgrade` re-saves it in the
//! current format, `inspect` prints a JSON summary of the loaded model.
//!
//! Exit codes: 0 = clean, 1 = loaded with non-fatal errors, 2 = fatal error.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use formkit_core::{FormModel, LayoutState, SymbolTable};
use formkit_persist::{CodeMode, FormPersistence, LoadedForm, NonFatalError, PersistConfig};

/// Environment variable selecting the code mode of saved layout code.
const CODE_MODE_ENV: &str = "FORMKIT_CODE_MODE";

/// Visual form persistence tools.
#[derive(Parser)]
#[command(name = "formkit", about = "Visual form persistence tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args)]
struct LoadArgs {
    /// Path to the form file.
    file: PathBuf,

    /// JSON configuration file with load/save options and extra classes.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base class of the form, overriding the document's form type.
    #[arg(long)]
    base_class: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Load a form and report every problem found.
    Check {
        #[command(flatten)]
        load: LoadArgs,
    },

    /// Load a form and save it in the current format.
    Upgrade {
        #[command(flatten)]
        load: LoadArgs,

        /// Output file (default: overwrite the input).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write layout code as static structure instead of code flow.
        #[arg(long)]
        static_code: bool,
    },

    /// Print a JSON summary of a loaded form.
    Inspect {
        #[command(flatten)]
        load: LoadArgs,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Check { load } => run_check(&load),
        Commands::Upgrade {
            load,
            output,
            static_code,
        } => run_upgrade(&load, output, static_code),
        Commands::Inspect { load } => run_inspect(&load),
    };
    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Read the config file and apply the environment and flag overrides.
fn load_config(args: &LoadArgs, static_code: bool) -> Result<PersistConfig, String> {
    let mut config = match &args.config {
        Some(path) => PersistConfig::from_file(path)
            .map_err(|e| format!("failed to read config '{}': {}", path.display(), e))?,
        None => PersistConfig::default(),
    };
    if let Ok(mode) = std::env::var(CODE_MODE_ENV) {
        config.save.code_mode = mode
            .parse()
            .map_err(|e| format!("invalid {}: {}", CODE_MODE_ENV, e))?;
    }
    if static_code {
        config.save.code_mode = CodeMode::Static;
    }
    if let Some(base_class) = &args.base_class {
        config.load.base_class = Some(base_class.clone());
    }
    debug!(
        mode = ?config.save.code_mode,
        base_class = ?config.load.base_class,
        extra_classes = config.extra_classes.len(),
        "resolved configuration"
    );
    Ok(config)
}

fn persistence(config: PersistConfig) -> FormPersistence<SymbolTable> {
    let symbols = config.symbol_table();
    FormPersistence::new(symbols).with_options(config.load, config.save)
}

/// Load the file named by `args`, printing the fatal error if any.
fn open(
    args: &LoadArgs,
    static_code: bool,
) -> Result<(FormPersistence<SymbolTable>, LoadedForm), i32> {
    let config = load_config(args, static_code).map_err(|msg| {
        eprintln!("Error: {}", msg);
        2
    })?;
    let persistence = persistence(config);
    match persistence.load_file(&args.file) {
        Ok(loaded) => Ok((persistence, loaded)),
        Err(e) => {
            eprintln!("Error: failed to load '{}': {}", args.file.display(), e);
            Err(2)
        }
    }
}

fn report(file: &Path, errors: &[NonFatalError]) -> i32 {
    if errors.is_empty() {
        return 0;
    }
    eprintln!("{}: {} problem(s):", file.display(), errors.len());
    for err in errors {
        eprintln!("  - {}", err);
    }
    1
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

/// Execute the check subcommand.
fn run_check(args: &LoadArgs) -> i32 {
    let (_, loaded) = match open(args, false) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    let code = report(&args.file, &loaded.errors);
    if code == 0 {
        println!("{}: ok (version {})", args.file.display(), loaded.form.version.current());
    }
    code
}

/// Execute the upgrade subcommand. A form with non-fatal errors is still
/// saved; the skipped parts are lost.
fn run_upgrade(args: &LoadArgs, output: Option<PathBuf>, static_code: bool) -> i32 {
    let (persistence, mut loaded) = match open(args, static_code) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    let code = report(&args.file, &loaded.errors);

    let target = output.unwrap_or_else(|| args.file.clone());
    if let Err(e) = persistence.save_file(&mut loaded.form, &target) {
        eprintln!("Error: failed to save '{}': {}", target.display(), e);
        return 2;
    }
    println!(
        "{} -> {} (version {})",
        args.file.display(),
        target.display(),
        loaded.form.version.current()
    );
    code
}

/// Execute the inspect subcommand.
fn run_inspect(args: &LoadArgs) -> i32 {
    let (_, loaded) = match open(args, false) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    let summary = FormSummary::new(&loaded.form, &loaded.errors);
    let json = serde_json::to_string_pretty(&summary)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize summary: {}\"}}", e));
    println!("{}", json);
    if loaded.errors.is_empty() {
        0
    } else {
        1
    }
}

// ---------------------------------------------------------------------------
// Inspect output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct FormSummary<'a> {
    name: &'a str,
    base_class: &'a str,
    version: &'static str,
    max_version: &'static str,
    components: Vec<ComponentSummary<'a>>,
    expressions: usize,
    statements: usize,
    errors: &'a [NonFatalError],
}

#[derive(Serialize)]
struct ComponentSummary<'a> {
    name: &'a str,
    class: &'a str,
    parent: Option<&'a str>,
    properties: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<LayoutState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout_statements: Option<usize>,
}

impl<'a> FormSummary<'a> {
    fn new(form: &'a FormModel, errors: &'a [NonFatalError]) -> Self {
        let components = form
            .components
            .iter()
            .map(|component| ComponentSummary {
                name: &component.name,
                class: component.class.as_str(),
                parent: component
                    .parent
                    .and_then(|parent| form.component(parent).ok())
                    .map(|parent| parent.name.as_str()),
                properties: component.properties.keys().map(String::as_str).collect(),
                layout: component.container.as_ref().map(|c| c.layout),
                layout_statements: component.container.as_ref().map(|c| c.layout_code.len()),
            })
            .collect();
        FormSummary {
            name: &form.name,
            base_class: form.base_class.as_str(),
            version: form.version.current().token(),
            max_version: form.version.max().token(),
            components,
            expressions: form.code.expression_count(),
            statements: form.code.statement_count(),
            errors,
        }
    }
}
