//! Command line front end for the navigator.
//!
//! ```text
//! fhir-navigator --config navigator.toml parse  --repository R --reference REF
//! fhir-navigator --config navigator.toml get    --repository R --type T --id ID
//! fhir-navigator --config navigator.toml search --repository R --type T [--param k=v]... [--pages N]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use fhir_navigator::config::load_config;
use fhir_navigator::model::SearchParams;
use fhir_navigator::observability::logging::init_logging;
use fhir_navigator::reference::canonical_resource_type;
use fhir_navigator::{NavigatorError, NavigatorFactory};

#[derive(Parser)]
#[command(name = "fhir-navigator")]
#[command(about = "Resolve references, read and search FHIR repositories", long_about = None)]
struct Cli {
    /// Path to the TOML configuration.
    #[arg(short, long, default_value = "navigator.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a reference against a repository and print its parts
    Parse {
        #[arg(short, long)]
        repository: String,
        #[arg(long)]
        reference: String,
    },
    /// Read one resource by type and id
    Get {
        #[arg(short, long)]
        repository: String,
        #[arg(short = 't', long = "type")]
        resource_type: String,
        #[arg(long)]
        id: String,
    },
    /// Page through a search and report progress
    Search {
        #[arg(short, long)]
        repository: String,
        #[arg(short = 't', long = "type")]
        resource_type: String,
        /// Search parameter as name=value; repeatable
        #[arg(short, long = "param")]
        params: Vec<String>,
        /// Maximum pages to fetch; 0 for all
        #[arg(long, default_value_t = 0)]
        pages: i32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.observability.log_level);
    tracing::info!(
        config = %cli.config.display(),
        repositories = config.repositories.len(),
        "Configuration loaded"
    );

    let factory = NavigatorFactory::new(Arc::new(config))?;

    match cli.command {
        Commands::Parse { repository, reference } => {
            let parsed = factory
                .resolver()
                .get_required(&repository, Some(reference.as_str()), "command line")?;
            println!("{}", parsed);
            println!("  kind:         {}", parsed.kind());
            println!("  type:         {}", parsed.resource_name.as_deref().unwrap_or("-"));
            println!("  id:           {}", parsed.resource_id.as_deref().unwrap_or("-"));
            println!("  version:      {}", parsed.version_id.as_deref().unwrap_or("-"));
            println!("  remote root:  {}", parsed.remote_root.as_deref().unwrap_or("-"));
            if let Some(relative) = parsed.relative_reference() {
                println!("  relative:     {}", relative);
            }
        }
        Commands::Get {
            repository,
            resource_type,
            id,
        } => {
            let resource_type = known_type(&resource_type)?;
            let mut navigator = factory.navigator(&repository)?;
            match navigator.get_by_type(resource_type, &id).await? {
                Some(resource) => println!("{}", serde_json::to_string_pretty(resource.as_json())?),
                None => {
                    eprintln!("{}/{} not found in {}", resource_type, id, repository);
                    std::process::exit(1);
                }
            }
        }
        Commands::Search {
            repository,
            resource_type,
            params,
            pages,
        } => {
            let resource_type = known_type(&resource_type)?;
            let mut query = SearchParams::new();
            for pair in &params {
                query.add_pair(pair);
            }

            let mut navigator = factory.navigator(&repository)?;
            let progress = navigator.search_by_type(resource_type, &query, Some(pages)).await?;

            println!("pages fetched:   {}", progress.pages);
            println!("resources:       {}", progress.resource_total);
            match progress.bundle_total {
                Some(total) => println!("server total:    {}", total),
                None => println!("server total:    -"),
            }
            println!("more available:  {}", progress.has_next_page);
            for cached in navigator.cache().resource_types() {
                println!("  {:<24} {}", cached, navigator.cache().count_of_type(cached));
            }
        }
    }

    Ok(())
}

fn known_type(name: &str) -> Result<&'static str, NavigatorError> {
    canonical_resource_type(name)
        .ok_or_else(|| NavigatorError::Configuration(format!("'{}' is not a known resource type", name)))
}
