use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use panchi_catalog::config::Config;
use panchi_catalog::constants::FURNITURE_TYPE;
use panchi_catalog::content::in_memory::parse_documents;
use panchi_catalog::content::{ContentSource, InMemoryContent, SanityClient};
use panchi_catalog::export::export_site;
use panchi_catalog::logging;
use panchi_catalog::schema::{furniture_schema, DocumentValidator, Severity};
use panchi_catalog::server::start_server;
use panchi_catalog::site::Site;
use panchi_catalog::state::AppState;

#[derive(Parser)]
#[command(name = "panchi_catalog")]
#[command(about = "Catálogo web de Carpintería Panchi")]
#[command(version)]
struct Cli {
    /// Configuration file (optional; environment variables override it)
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the catalog and the revalidation webhook
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
        /// Read content from a dataset export instead of the content platform
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
    /// Write every page as static HTML
    Export {
        /// Output directory
        #[arg(long, default_value = "dist")]
        out: PathBuf,
        /// Read content from a dataset export instead of the content platform
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
    /// Print the furniture content type declaration as JSON
    Schema {
        /// Print the derived JSON Schema instead
        #[arg(long)]
        json_schema: bool,
    },
    /// Validate a dataset export (JSON array or NDJSON) against the content type
    Check {
        path: PathBuf,
    },
}

fn content_source(config: &Config, fixtures: Option<&Path>) -> Result<Arc<dyn ContentSource>> {
    match fixtures {
        Some(path) => {
            info!(path = %path.display(), "using local fixtures");
            let content = InMemoryContent::from_file(path)
                .with_context(|| format!("Failed to load fixtures from {}", path.display()))?;
            Ok(Arc::new(content))
        }
        None => {
            let client = SanityClient::new(&config.sanity);
            info!(endpoint = client.endpoint(), "using content platform");
            Ok(Arc::new(client))
        }
    }
}

fn check_dataset(path: &Path) -> Result<bool> {
    let data = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let docs: Vec<_> = parse_documents(&data)?
        .into_iter()
        .filter(|d| d.get("_type").and_then(|t| t.as_str()).map_or(true, |t| t == FURNITURE_TYPE))
        .collect();

    let validator = DocumentValidator::new()?;
    let issues = validator.validate_all(&docs);

    let mut errors = 0;
    for issue in &issues {
        if issue.severity == Severity::Error {
            errors += 1;
        }
        println!("{}", issue);
    }
    println!("{} documents checked, {} errors, {} warnings", docs.len(), errors, issues.len() - errors);
    Ok(errors == 0)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config).context("Failed to load configuration")?;
    let _guard = logging::init_logging(config.server.log_dir.as_deref());

    match cli.command {
        Commands::Serve { port, fixtures } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if config.revalidate_secret.is_none() {
                warn!("REVALIDATE_SECRET is not set; every revalidation request will be rejected");
            }
            let content = content_source(&config, fixtures.as_deref())?;
            let site = Site::new(content, &config);
            let port = config.server.port;
            start_server(AppState::new(site, config), port)
                .await
                .context("Server failed")?;
        }
        Commands::Export { out, fixtures } => {
            let content = content_source(&config, fixtures.as_deref())?;
            let site = Site::new(content, &config);
            let summary = export_site(&site, &out, Some(config.site.static_dir.as_path())).await?;
            println!(
                "Exported {} pages to {} ({} skipped, {} assets)",
                summary.pages_written,
                out.display(),
                summary.skipped.len(),
                summary.assets_copied
            );
        }
        Commands::Schema { json_schema } => {
            let schema = furniture_schema();
            let value = if json_schema {
                schema.to_json_schema()
            } else {
                serde_json::to_value(&schema)?
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Check { path } => {
            if !check_dataset(&path)? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
