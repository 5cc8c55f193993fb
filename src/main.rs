use clap::{Parser, Subcommand};
use iiif_records::actions::Actions;
use iiif_records::builders::{Params, record};
use iiif_records::config::{self, CONFIG_FILE, ServiceConfig};
use iiif_records::registry::{BuilderRegistry, RegistryBuilder};
use iiif_records::server::{self, AppState, UNKNOWN_IDENTIFIER};
use iiif_records::{output, store::DirectoryStore};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iiif-records")]
#[command(about = "Serve IIIF manifests for dataset records")]
#[command(long_about = "\
Serve IIIF manifests for dataset records

Every record of a resource with an image field is published as a IIIF
Presentation v3 manifest at /iiif/resource/<resource_id>/record/<record_id>.

Store layout:

  data/
  └── <resource_id>/
      ├── resource.toml            # title_field, image_field, image_delimiter, image_licence
      └── records/
          └── <record_id>.json     # one JSON object per record, with an _id field

Run 'iiif-records gen-config' to generate a documented iiif.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional; stock defaults apply when it doesn't exist)
    #[arg(long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the IIIF and action routes over HTTP
    Serve,
    /// Build one IIIF document and print it
    Manifest {
        identifier: String,
        /// Print an outline instead of JSON
        #[arg(long)]
        summary: bool,
    },
    /// Print the identifier a builder answers to for the given parameters
    Identifier {
        #[arg(long, default_value = record::BUILDER_ID)]
        builder: String,
        /// Named parameter as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Print a stock iiif.toml with all options documented
    GenConfig,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {s:?}"))
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_registry(config: &ServiceConfig) -> BuilderRegistry {
    let store = DirectoryStore::new(&config.store.path);
    RegistryBuilder::with_defaults(Arc::new(store), config.build_context()).freeze()
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let config = config::load_config(&cli.config)?;
    let registry = build_registry(&config);
    info!(
        store = %config.store.path.display(),
        builders = ?registry.keys().collect::<Vec<_>>(),
        "registry ready"
    );
    let actions = Actions::new(Arc::new(registry));

    match cli.command {
        Command::Serve => {
            let addr = config.bind_addr()?;
            server::serve(addr, server::router(AppState { actions })).await?;
        }
        Command::Manifest {
            identifier,
            summary,
        } => match actions.build_iiif_resource(&identifier)? {
            Some(doc) if summary => output::print_manifest_summary(&doc),
            Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
            None => {
                eprintln!("{UNKNOWN_IDENTIFIER}: {identifier}");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Identifier { builder, params } => {
            let params: Params = params
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            match actions.build_iiif_identifier(&builder, &params)? {
                Some(identifier) => println!("{identifier}"),
                None => {
                    eprintln!("Unknown IIIF builder: {builder}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::GenConfig => {}
    }

    Ok(ExitCode::SUCCESS)
}
