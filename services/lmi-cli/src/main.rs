//! `lmi`: search the catalog, inspect entities and work with tiles and styles.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lmi_client::{
    ClientConfig, CollectionQuery, Dataset, Geometry, Layer, Lmi, ReqwestTransport, ToHtml, Widget,
};
use lmi_common::BoundingBox;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use lmi_cli::{ImageActions, Output};

#[derive(Parser, Debug)]
#[command(name = "lmi")]
#[command(about = "Client for a geospatial catalog API", long_about = None)]
struct Cli {
    /// Catalog server
    #[arg(long, global = true, env = "LMI_SERVER")]
    server: Option<String>,

    /// API token
    #[arg(long, global = true, env = "LMI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "LMI_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Log level
    #[arg(long, global = true, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search datasets or layers by name and description
    Search {
        /// Search terms, e.g. "forest loss"
        search: String,

        /// Applications to search
        #[arg(short, long = "app", default_values_t = ["gfw".to_string(), "rw".to_string()])]
        apps: Vec<String>,

        #[arg(long, default_value = "production")]
        env: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "1000")]
        limit: usize,

        /// Search layers instead of datasets
        #[arg(long)]
        layers: bool,

        /// Extra catalog filter as key=value
        #[arg(short, long = "filter", value_parser = lmi_cli::parse_key_value)]
        filters: Vec<(String, String)>,

        /// Print HTML cards instead of text
        #[arg(long)]
        html: bool,
    },

    /// Show one catalog entity
    Show {
        #[arg(value_enum)]
        kind: EntityKind,

        id: String,

        /// Print an HTML card instead of JSON attributes
        #[arg(long)]
        html: bool,
    },

    /// Load an image from a search hit JSON file
    Image {
        hit: PathBuf,

        /// Imagery server
        #[arg(long, env = "LMI_IMAGE_SERVER")]
        image_server: Option<String>,

        /// Classify with the random forest classifier
        #[arg(long)]
        classify: bool,

        /// Print the map description
        #[arg(long)]
        map: bool,

        #[arg(long)]
        html: bool,
    },

    /// List Web Mercator tiles covering a bbox or a GeoJSON geometry
    Tiles {
        /// minx,miny,maxx,maxy in degrees
        #[arg(long, required_unless_present = "geometry")]
        bbox: Option<String>,

        /// GeoJSON geometry or feature file
        #[arg(long)]
        geometry: Option<PathBuf>,

        #[arg(short, long)]
        zoom: u32,
    },

    /// Convert between SLD fragments and JSON styles
    Sld {
        #[command(subcommand)]
        action: SldAction,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EntityKind {
    Dataset,
    Layer,
    Widget,
    Geometry,
}

#[derive(Subcommand, Debug)]
enum SldAction {
    /// SLD fragment to JSON
    Parse { file: PathBuf },
    /// JSON style to SLD fragment
    Dump { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::from_env();
    if let Some(server) = &cli.server {
        config.server = server.trim_end_matches('/').to_string();
    }
    if let Some(token) = &cli.token {
        config.token = Some(token.clone());
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    config.validate()?;
    info!(server = %config.server, "Using catalog server");

    let output = run(cli.command, config).await?;
    print!("{output}");
    Ok(())
}

async fn run(command: Commands, config: ClientConfig) -> Result<String> {
    match command {
        Commands::Search {
            search,
            apps,
            env,
            limit,
            layers,
            filters,
            html,
        } => {
            let lmi = Lmi::new(config)?;
            let query = CollectionQuery {
                search,
                apps,
                env,
                limit,
                object_types: vec![if layers { "layer" } else { "dataset" }.to_string()],
                filters,
                ..CollectionQuery::default()
            };
            let output = if html { Output::Html } else { Output::Text };
            lmi_cli::search(&lmi, &query, output).await
        }
        Commands::Show { kind, id, html } => {
            let transport = ReqwestTransport::new(&config)?;
            let server = config.server.as_str();
            let (card, attributes) = match kind {
                EntityKind::Dataset => {
                    let dataset = Dataset::fetch(&transport, &id, server).await?;
                    (dataset.to_html(), serde_json::to_value(&dataset.attributes)?)
                }
                EntityKind::Layer => {
                    let layer = Layer::fetch(&transport, &id, server).await?;
                    (layer.to_html(), serde_json::to_value(&layer.attributes)?)
                }
                EntityKind::Widget => {
                    let widget = Widget::fetch(&transport, &id, server).await?;
                    (widget.to_html(), serde_json::to_value(&widget.attributes)?)
                }
                EntityKind::Geometry => {
                    let geometry = Geometry::fetch(&transport, &id, server).await?;
                    (geometry.to_html(), serde_json::to_value(&geometry.attributes)?)
                }
            };
            if html {
                Ok(format!("{card}\n"))
            } else {
                Ok(format!("{}\n", serde_json::to_string_pretty(&attributes)?))
            }
        }
        Commands::Image {
            hit,
            image_server,
            classify,
            map,
            html,
        } => {
            let transport = ReqwestTransport::new(&config)?;
            let actions = ImageActions { classify, map, html };
            lmi_cli::image(&transport, &hit, image_server.as_deref(), actions).await
        }
        Commands::Tiles {
            bbox,
            geometry,
            zoom,
        } => {
            let bbox = bbox
                .map(|s| BoundingBox::from_csv(&s))
                .transpose()
                .context("Invalid --bbox")?;
            let geometry = geometry
                .map(|path| lmi_cli::read_geometry(&path))
                .transpose()?;
            let tiles = lmi_cli::tiles(bbox.as_ref(), geometry.as_ref(), zoom)?;
            Ok(lmi_cli::render_tiles(&tiles))
        }
        Commands::Sld { action } => match action {
            SldAction::Parse { file } => Ok(format!("{}\n", lmi_cli::sld_to_json(&file)?)),
            SldAction::Dump { file } => Ok(format!("{}\n", lmi_cli::json_to_sld(&file)?)),
        },
    }
}
