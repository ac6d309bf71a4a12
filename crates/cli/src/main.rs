//! Hookdesk CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: load `hookdesk.toml` (defaults when absent).
//! 2. **Wire logging**: `tracing-subscriber` with an `EnvFilter` and a text or
//!    JSON formatter, writing to stderr so stdout carries only command output.
//! 3. **Construct infrastructure**: a [`storage::JsonFileBackend`] behind a
//!    [`webhook::ConfigStore`], and a [`webhook::CapabilityRegistry`] extended
//!    with the capabilities declared in the config file.
//! 4. **Drive the form**: each subcommand is one render or submit cycle of
//!    [`form::WebhookFormController`].

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use form::{FormFields, SubmitOutcome, WebhookFormController};
use storage::JsonFileBackend;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use webhook::{CapabilityCategory, CapabilityRegistry, ConfigStore, WebhookId};

use crate::config::{CliConfig, LogFormat};

/// Manage webhook configuration records.
#[derive(Parser)]
#[command(name = "hookdesk")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "hookdesk.toml", global = true)]
    config: PathBuf,

    /// Webhook store file; overrides `store_path` from the config file
    #[arg(long, env = "HOOKDESK_STORE", global = true)]
    store: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every webhook in order
    List,

    /// Show the form values for a webhook (empty if it does not exist)
    Show {
        /// Webhook id
        id: WebhookId,
    },

    /// List the choices for `processors` or `handlers`
    Options {
        /// `processors` or `handlers`
        category: CapabilityCategory,
    },

    /// Create a webhook
    Add {
        #[command(flatten)]
        input: WebhookInput,
    },

    /// Edit a webhook; omitted values keep their current setting
    Edit {
        /// Webhook id
        id: WebhookId,

        #[command(flatten)]
        input: WebhookInput,
    },
}

#[derive(Args, Debug, Default)]
struct WebhookInput {
    /// Webhook name
    #[arg(long)]
    name: Option<String>,

    /// Dispatch selector; must be unique
    #[arg(long)]
    selector: Option<String>,

    /// Processor capability name
    #[arg(long)]
    processor: Option<String>,

    /// Handler capability name
    #[arg(long)]
    handler: Option<String>,

    /// Description
    #[arg(long)]
    description: Option<String>,
}

impl WebhookInput {
    /// Overwrites `fields` with every value given on the command line.
    fn apply_to(self, fields: &mut FormFields) {
        let targets = [
            (self.name, &mut fields.name),
            (self.selector, &mut fields.selector),
            (self.processor, &mut fields.processor),
            (self.handler, &mut fields.handler),
            (self.description, &mut fields.description),
        ];
        for (value, target) in targets {
            if let Some(value) = value {
                *target = value;
            }
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = CliConfig::load(&cli.config)?;
    init_tracing(config.log_format);

    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path.clone());
    debug!(config = %cli.config.display(), store = %store_path.display(), "Starting");

    let mut registry = CapabilityRegistry::with_builtins();
    registry.extend_with(&config);

    let controller = WebhookFormController::new(
        ConfigStore::new(JsonFileBackend::new(&store_path)),
        registry,
    );
    controller
        .prepare()
        .await
        .with_context(|| format!("cannot load webhook store '{}'", store_path.display()))?;

    let succeeded = run(cli.command, cli.json, &controller).await?;
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Executes one subcommand; `false` means a submission was rejected.
async fn run(
    command: Commands,
    json: bool,
    controller: &WebhookFormController<JsonFileBackend>,
) -> anyhow::Result<bool> {
    match command {
        Commands::List => {
            let webhooks = controller.store().webhooks();
            if json {
                println!("{}", serde_json::to_string_pretty(&webhooks)?);
            } else {
                for hook in &webhooks {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        hook.id, hook.selector, hook.name, hook.processor, hook.handler
                    );
                }
            }
        }
        Commands::Show { id } => {
            let fields = controller.populate_defaults(Some(id));
            if json {
                println!("{}", serde_json::to_string_pretty(&fields)?);
            } else {
                print_fields(&fields);
            }
        }
        Commands::Options { category } => {
            let options = controller.list_options(category);
            if json {
                println!("{}", serde_json::to_string_pretty(&options)?);
            } else {
                for option in &options {
                    println!("{}\t{}", option.value, option.label);
                }
            }
        }
        Commands::Add { input } => {
            let mut fields = FormFields::default();
            input.apply_to(&mut fields);
            let outcome = controller.submit(fields).await;
            return report(&outcome, json);
        }
        Commands::Edit { id, input } => {
            let mut fields = controller.populate_defaults(Some(id));
            fields.id = Some(id);
            input.apply_to(&mut fields);
            let outcome = controller.submit(fields).await;
            return report(&outcome, json);
        }
    }
    Ok(true)
}

fn print_fields(fields: &FormFields) {
    if let Some(id) = fields.id {
        println!("id: {id}");
    }
    for (key, label) in form::REQUIRED_FIELDS {
        println!("{label}: {}", fields.value(key).unwrap_or_default());
    }
}

fn report(outcome: &SubmitOutcome, json: bool) -> anyhow::Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else if outcome.is_success() {
        println!("{}", outcome.message);
    } else {
        eprintln!("{}", outcome.message);
        for field_error in &outcome.field_errors {
            eprintln!("  {}: {}", field_error.field, field_error.message);
        }
    }
    Ok(outcome.is_success())
}
