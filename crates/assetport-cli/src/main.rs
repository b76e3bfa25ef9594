//! assetport CLI
//!
//! Validate, convert and upload custom asset files

use std::path::{Path, PathBuf};

use assetport_api::ImportTask;
use assetport_client::{
    CustomAssets, CustomIntegrations, CustomIntegrationsAdmin, IntegrationRef, Tasks,
    encode_assets,
};
use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use eyre::{WrapErr, eyre};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod config;
mod input;

use config::Config;
use input::InputArgs;

#[derive(Parser, Debug)]
#[command(name = "assetport", version, about = "Import custom asset data into runZero")]
struct Cli {
    /// Config file (default: ./assetport.toml, then the user config dir)
    #[arg(long, global = true, env = "ASSETPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level, overriding the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that every record in a file is a valid import asset
    Validate(InputArgs),

    /// Write the gzip-compressed NDJSON upload payload for a file
    Convert {
        #[command(flatten)]
        input: InputArgs,

        /// Output file
        #[arg(short, long, default_value = "asset_data.jsonl.gz")]
        output: PathBuf,
    },

    /// Upload a file as a new import task
    Upload(UploadArgs),

    /// Show an import task
    Task {
        /// Organization id
        #[arg(long)]
        org: Uuid,

        /// Task id
        id: Uuid,
    },

    /// List custom integrations
    Integrations {
        /// Organization id (default: every integration in the account)
        #[arg(long)]
        org: Option<Uuid>,
    },
}

#[derive(Args, Debug)]
struct UploadArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Organization id
    #[arg(long)]
    org: Uuid,

    /// Site id
    #[arg(long)]
    site: Uuid,

    #[command(flatten)]
    target: TargetArgs,

    /// Task name
    #[arg(long)]
    name: Option<String>,

    /// Task description
    #[arg(long)]
    description: Option<String>,

    /// Task tag; repeat for several
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Ask the server to ignore fields it does not recognize
    #[arg(long)]
    exclude_unknown: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// Built-in integration source id
    #[arg(long)]
    source: Option<Uuid>,

    /// Custom integration id
    #[arg(long)]
    integration: Option<Uuid>,

    /// Custom integration name
    #[arg(long)]
    integration_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = Config::load_default(cli.config.as_deref())?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_tracing(level, cli.log_json)?;
    match &config.source {
        Some(path) => debug!(path = %path.display(), "loaded config"),
        None => debug!("no config file found, using defaults"),
    }

    match cli.command {
        Commands::Validate(input) => validate(&input),
        Commands::Convert { input, output } => convert(&input, &output),
        Commands::Upload(args) => upload(&config, args).await,
        Commands::Task { org, id } => show_task(&config, org, id).await,
        Commands::Integrations { org } => list_integrations(&config, org).await,
    }
}

/// Install the subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()?;
    }
    Ok(())
}

fn validate(input: &InputArgs) -> Result<()> {
    let assets = input
        .read_assets()
        .wrap_err_with(|| format!("{} is not valid", input.file.display()))?;
    println!("{}: {} valid records", input.file.display(), assets.len());
    Ok(())
}

fn convert(input: &InputArgs, output: &Path) -> Result<()> {
    let assets = input.read_assets()?;
    let payload = encode_assets(&assets)?;
    std::fs::write(output, &payload)
        .wrap_err_with(|| format!("failed to write {}", output.display()))?;
    println!(
        "wrote {} records ({} bytes) to {}",
        assets.len(),
        payload.len(),
        output.display()
    );
    Ok(())
}

async fn upload(config: &Config, args: UploadArgs) -> Result<()> {
    let assets = args.input.read_assets()?;
    let client = config.http_client(config.credentials()?)?;

    let target = args.target;
    let integration = match (target.source, target.integration, target.integration_name) {
        (Some(id), _, _) => IntegrationRef::Source(id),
        (None, Some(id), _) => IntegrationRef::Custom(id),
        (None, None, Some(name)) => {
            let found = CustomIntegrations::new(client.clone())
                .get(args.org, None, Some(&name))
                .await?
                .ok_or_else(|| eyre!("no custom integration named {name:?}"))?;
            IntegrationRef::Custom(found.id)
        }
        (None, None, None) => return Err(eyre!("an integration source is required")),
    };

    let mut task = ImportTask::new(args.name.unwrap_or_default());
    if let Some(description) = args.description {
        task = task.with_description(description);
    }
    for tag in args.tags {
        task = task.with_tag(tag);
    }
    if args.exclude_unknown {
        task = task.with_exclude_unknown(true);
    }

    let created = CustomAssets::new(client.clone())
        .upload_assets(args.org, args.site, integration, &assets, Some(task))
        .await?;
    info!(task_id = %created.id, "upload accepted");
    if let Some(usage) = client.last_rate_limit() {
        debug!(%usage, "API usage");
    }

    println!("{}", serde_json::to_string_pretty(&created)?);
    Ok(())
}

async fn show_task(config: &Config, org: Uuid, id: Uuid) -> Result<()> {
    let client = config.http_client(config.credentials()?)?;
    let task = Tasks::new(client)
        .get(org, Some(id), None)
        .await?
        .ok_or_else(|| eyre!("task {id} not found"))?;
    println!("{}", serde_json::to_string_pretty(&task)?);
    Ok(())
}

async fn list_integrations(config: &Config, org: Option<Uuid>) -> Result<()> {
    let integrations = match org {
        Some(org) => {
            let client = config.http_client(config.credentials()?)?;
            CustomIntegrations::new(client).list(org).await?
        }
        None => {
            let client = config.http_client(config.account_credentials()?)?;
            CustomIntegrationsAdmin::new(client).list().await?
        }
    };

    for integration in &integrations {
        println!(
            "{}  {}  {}",
            integration.id,
            integration.name,
            integration.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_requires_one_target() {
        let org = Uuid::new_v4().to_string();
        let site = Uuid::new_v4().to_string();
        let id = Uuid::new_v4().to_string();

        let base = ["assetport", "upload", "hosts.csv", "--org", &org, "--site", &site];
        assert!(Cli::try_parse_from(base).is_err());

        let both: Vec<&str> = base
            .iter()
            .copied()
            .chain(["--source", &id, "--integration", &id])
            .collect();
        assert!(Cli::try_parse_from(both).is_err());

        let one: Vec<&str> = base
            .iter()
            .copied()
            .chain(["--integration", &id, "--tag", "a", "--tag", "b"])
            .collect();
        let cli = Cli::try_parse_from(one).unwrap();
        match cli.command {
            Commands::Upload(args) => {
                assert_eq!(args.target.integration.map(|u| u.to_string()), Some(id));
                assert_eq!(args.tags, vec!["a", "b"]);
                assert!(!args.exclude_unknown);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_validate_collects_map_args() {
        let cli = Cli::try_parse_from([
            "assetport",
            "validate",
            "hosts.csv",
            "--map",
            "id=asset_id",
            "--map",
            "os=platform",
            "--format",
            "csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Validate(input) => {
                assert_eq!(input.map, vec!["id=asset_id", "os=platform"]);
                assert_eq!(input.format, Some(crate::input::InputFormat::Csv));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
