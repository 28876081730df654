//! regwizard - Main entry point
//!
//! Headless front end for the registration wizard: validates working values,
//! scores passwords, manages the persisted draft and runs full scripted
//! registrations.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use regwizard::cli::{Cli, Commands, DraftCommands};
use regwizard::script::{self, ScriptOutcome};
use regwizard::{
    AppConfig, ConfirmationSummary, DraftStore, Field, FieldValue, PersistEvent,
    RegistrationRecord, STEPS, Step, ValidationErrors, WizardController, WizardError,
    password_strength, validate,
};

/// Initialize tracing; `RUST_LOG` overrides the configured filter.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Resolve configuration: file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &cli.store_dir {
        config.store_dir = dir.clone();
    }
    if let Some(key) = &cli.storage_key {
        config.storage_key = key.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse_args();
    let config = load_config(&cli)?;
    init_tracing(&config.log_filter);
    debug!(?config, "Configuration resolved");

    match cli.command {
        Commands::Steps => {
            list_steps();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { step, values } => check_values(step, &values),
        Commands::Strength => {
            show_strength()?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Draft { action } => {
            manage_draft(&config, action)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { script } => run_script(&config, &script),
    }
}

fn list_steps() {
    for def in &STEPS {
        let fields: Vec<String> = Field::for_step(def.step)
            .into_iter()
            .map(|f| f.to_string())
            .collect();
        println!(
            "{}. {:<14} {:>3}%  {}",
            def.step.number(),
            def.title,
            def.step.progress_percent(),
            if fields.is_empty() {
                "(no fields)".to_string()
            } else {
                fields.join(", ")
            }
        );
    }
}

fn read_record(path: &Path) -> regwizard::error::Result<RegistrationRecord> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_errors(errors: &ValidationErrors) {
    for error in errors.iter() {
        eprintln!("  ✗ {}: {}", error.field, error.message);
    }
}

fn check_values(step: usize, values: &Path) -> Result<ExitCode> {
    let step = Step::from_number(step).ok_or_else(|| {
        WizardError::input(format!(
            "step must be between 1 and {}, got {}",
            Step::TOTAL_STEPS,
            step
        ))
    })?;
    let record = read_record(values)
        .with_context(|| format!("Failed to load working values from {:?}", values))?;

    match validate(step, &record) {
        Ok(()) => {
            println!("✓ {} values are valid", step);
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            eprintln!("✗ {} has {} invalid field(s):", step, errors.len());
            print_errors(&errors);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn show_strength() -> Result<()> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\n', '\r']);

    let strength = password_strength(password);
    println!("{} ({}/5)", strength.label, strength.score);
    Ok(())
}

fn manage_draft(config: &AppConfig, action: DraftCommands) -> regwizard::error::Result<()> {
    let mut store = config.draft_store();
    match action {
        DraftCommands::Show => match store.load() {
            Some(record) => {
                for (key, value) in record.iter() {
                    let secret = Field::from_str(key).is_ok_and(Field::is_secret);
                    println!("{}: {}", key, display_value(value, secret));
                }
            }
            None => println!("No saved draft"),
        },
        DraftCommands::Clear => {
            store.clear()?;
            info!("Draft cleared");
            println!("✓ Draft cleared");
        }
    }
    Ok(())
}

fn display_value(value: &FieldValue, secret: bool) -> String {
    match value {
        _ if secret => "********".to_string(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Flag(b) => b.to_string(),
        FieldValue::List(items) => format!("[{}]", items.join(", ")),
    }
}

fn run_script(config: &AppConfig, script: &Path) -> Result<ExitCode> {
    let pages = script::load_pages(script)
        .with_context(|| format!("Failed to load script from {:?}", script))?;

    let mut wizard = WizardController::new(config.draft_store());
    wizard.on_persist(|event| match event {
        PersistEvent::Saved => eprintln!("  · Changes saved"),
        PersistEvent::Cleared => debug!("Draft removed"),
        PersistEvent::Failed(reason) => eprintln!("  ! Could not save changes: {}", reason),
    });
    if !wizard.record().is_empty() {
        println!("Resuming saved draft ({} fields)", wizard.record().len());
    }

    let outcome = script::run_pages(&mut wizard, pages, |step| {
        println!("{} - {}", step.counter(), step)
    })?;

    match outcome {
        ScriptOutcome::Submitted => {}
        ScriptOutcome::Paused(step) => {
            println!(
                "Draft saved at {}; rerun with {{}} for completed steps to finish",
                step.counter()
            );
            return Ok(ExitCode::SUCCESS);
        }
        ScriptOutcome::Rejected { step, errors } => {
            eprintln!("✗ {} has {} invalid field(s):", step, errors.len());
            print_errors(&errors);
            return Ok(ExitCode::FAILURE);
        }
    }

    print!("{}", ConfirmationSummary::from_record(wizard.record()));
    println!("\n✓ Registration complete!");
    for next in regwizard::summary::NEXT_STEPS {
        println!("  • {}", next);
    }
    Ok(ExitCode::SUCCESS)
}
