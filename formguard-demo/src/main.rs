mod form_spec;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use formguard::dom::Document;
use formguard::submit::SubmitOutcome;
use formguard::{FieldValidator, ValidatorConfig};
use log::LevelFilter;
use simplelog::{Config, SimpleLogger, WriteLogger};

use form_spec::FormSpec;

/// Fill in a form, submit it, and print what the validator reports.
#[derive(Debug, Parser)]
#[command(name = "formguard-demo", version)]
struct Cli {
    /// JSON form description. Defaults to a contact form.
    #[arg(long)]
    form: Option<PathBuf>,

    /// Field value as `name=value`. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    values: Vec<(String, String)>,

    /// JSON validator config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stdout.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Reset the form right after an accepted submit.
    #[arg(long)]
    no_delay: bool,
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid form description: {0}")]
    Form(#[from] serde_json::Error),
    #[error(transparent)]
    Validator(#[from] formguard::Error),
    #[error("failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("form has no field named '{0}'")]
    UnknownField(String),
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}

fn init_logging(level: LevelFilter, path: Option<&Path>) -> Result<(), DemoError> {
    match path {
        Some(path) => WriteLogger::init(level, Config::default(), File::create(path)?)?,
        None => SimpleLogger::init(level, Config::default())?,
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ValidatorConfig, DemoError> {
    let mut config = match &cli.config {
        Some(path) => ValidatorConfig::from_json(&fs::read_to_string(path)?)?,
        None => ValidatorConfig::default(),
    };
    if cli.no_delay {
        config = config.with_submit_delay(Duration::ZERO);
    }
    Ok(config)
}

/// Print every toast currently on the page.
fn print_toasts(document: &Document) {
    for node in document.descendants(document.body()) {
        if !document.has_class(node, "toast") {
            continue;
        }
        let kind = if document.has_class(node, "toast-error") {
            "error"
        } else {
            "success"
        };
        let message = document
            .children(node)
            .into_iter()
            .find(|child| document.has_class(*child, "toast-body"))
            .map(|body| document.text(body))
            .unwrap_or_default();
        println!("[{kind}] {message}");
    }
}

async fn run(cli: Cli) -> Result<(), DemoError> {
    let spec = match &cli.form {
        Some(path) => FormSpec::load(path)?,
        None => FormSpec::contact(),
    };
    let config = load_config(&cli)?;

    let document = Document::new();
    let form = spec.mount(&document);
    let validator = FieldValidator::initialize(&document, [form], config)?;

    let fields = document.form_fields(form);
    for (name, value) in &cli.values {
        let field = fields
            .iter()
            .copied()
            .find(|field| document.attribute(*field, "name").as_deref() == Some(name.as_str()))
            .ok_or_else(|| DemoError::UnknownField(name.clone()))?;
        document.type_into(field, value.as_str());
        document.blur(field);
        if let Some(message) = validator.field_error(field) {
            log::debug!("field '{name}' rejected on blur: {message}");
        }
    }

    match validator.submit_form(form) {
        SubmitOutcome::Rejected { result, .. } => {
            for failure in result.failures() {
                let name = failure.name.as_deref().unwrap_or("<unnamed>");
                println!("{name}: {}", failure.error);
            }
        }
        SubmitOutcome::Accepted { payload, task } => {
            println!("payload: {}", payload.to_json());
            task.wait().await;
        }
        SubmitOutcome::Pending(task) => {
            task.wait().await;
        }
    }
    print_toasts(&document);

    validator.dispose();
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level, cli.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
