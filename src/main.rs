use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use woolocat_core::{labels, AppError, Config, Dashboard};
use woolocat_geo::{
    EnrichmentPipeline, GoogleMapsClient, LayerCanvas, MapSession, MapsProvider, ViewMode,
};
use woolocat_orders::{group_by_address, OrderModal, ShopOrder};
use woolocat_weather::{
    server, HttpRelayClient, OpenWeatherClient, RelayTransport, WeatherAnnotator, WeatherRelay,
};

#[derive(Parser, Debug)]
#[command(name = "woolocat", version, about = "Shipping-address analytics for a shop")]
struct Cli {
    /// Config file (defaults to <config dir>/woolocat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the location table and map from an order export
    Enrich {
        /// JSON array of orders
        #[arg(long)]
        orders: PathBuf,

        /// Overrides store.address
        #[arg(long)]
        store_address: Option<String>,

        /// map, heatmap or clusters
        #[arg(long, default_value = "map")]
        view: ViewMode,
    },
    /// Show the order detail table for one address
    Orders {
        #[arg(long)]
        orders: PathBuf,

        /// Full shipping address as shown in the location table
        #[arg(long)]
        address: String,
    },
    /// Serve the weather relay over HTTP
    Relay {
        /// Overrides relay.bind
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Validate the configuration and print the result
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    woolocat_core::init()?;
    let cli = Cli::parse();

    let (config, validation) = Config::load_validated(cli.config.as_deref())?;

    match cli.command {
        Command::Enrich {
            orders,
            store_address,
            view,
        } => {
            let store = store_address.unwrap_or_else(|| config.store.address.clone());
            enrich(&config, &orders, &store, view).await
        }
        Command::Orders { orders, address } => show_orders(&config, &orders, &address),
        Command::Relay { bind } => {
            config.require_relay_nonce().map_err(AppError::from)?;
            let addr = match bind {
                Some(addr) => addr,
                None => config
                    .relay
                    .bind
                    .parse()
                    .with_context(|| format!("Invalid relay.bind '{}'", config.relay.bind))?,
            };
            server::serve(Arc::new(build_relay(&config)), addr).await;
            Ok(())
        }
        Command::Config => {
            for warning in &validation.warnings {
                println!("warning: {}", warning);
            }
            println!("Configuration OK");
            Ok(())
        }
    }
}

fn read_orders(path: &Path) -> Result<Vec<ShopOrder>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read orders from {}", path.display()))?;
    serde_json::from_str(&raw).context("Failed to parse order export")
}

fn maps_provider(config: &Config) -> Option<Arc<dyn MapsProvider>> {
    let key = config.require_maps_key().ok()?;
    Some(Arc::new(GoogleMapsClient::with_base_url(key, &config.maps.base_url)))
}

fn build_relay(config: &Config) -> WeatherRelay {
    let weather = (!config.weather.api_key.is_empty()).then(|| {
        OpenWeatherClient::with_base_url(
            &config.weather.api_key,
            &config.weather.units,
            &config.weather.base_url,
        )
    });
    WeatherRelay::new(maps_provider(config), weather, &config.relay.nonce)
}

fn weather_transport(config: &Config) -> Arc<dyn RelayTransport> {
    match &config.relay.url {
        Some(url) => Arc::new(HttpRelayClient::new(url, &config.relay.nonce)),
        None => Arc::new(build_relay(config)),
    }
}

async fn enrich(config: &Config, orders: &Path, store: &str, view: ViewMode) -> Result<()> {
    let orders = read_orders(orders)?;
    let rows = group_by_address(&orders, &config.admin.currency_symbol);
    tracing::info!("Loaded {} orders across {} addresses", orders.len(), rows.len());

    let mut dashboard = Dashboard::new(store, rows);
    let mut weather_view = dashboard.clone();
    let mut session = MapSession::new(LayerCanvas::new());
    let annotator = WeatherAnnotator::new(weather_transport(config));

    match config.require_maps_key() {
        Ok(key) => {
            let pipeline = EnrichmentPipeline::new(Arc::new(GoogleMapsClient::with_base_url(
                key,
                &config.maps.base_url,
            )));
            let (report, weather) = tokio::join!(
                pipeline.run(&mut dashboard, &mut session),
                annotator.annotate(&mut weather_view)
            );
            tracing::info!(
                "Routes: {} driving, {} estimated, {} unresolved; weather: {} labelled",
                report.driving,
                report.estimated,
                report.unresolved,
                weather.labelled
            );
        }
        Err(e) => {
            let e = AppError::from(e);
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            dashboard.fail_all_routes(labels::API_ERROR);
            annotator.annotate(&mut weather_view).await;
        }
    }

    for (row, annotated) in dashboard.rows.iter_mut().zip(weather_view.rows) {
        row.weather = annotated.weather;
    }

    session.switch_view(view);

    print!("{}", dashboard.render_table());
    println!();
    println!("{}: {}", view.label(), session.canvas().describe());
    Ok(())
}

fn show_orders(config: &Config, orders: &Path, address: &str) -> Result<()> {
    let orders = read_orders(orders)?;
    let rows = group_by_address(&orders, &config.admin.currency_symbol);
    let row = rows
        .iter()
        .find(|r| r.address == address)
        .ok_or_else(|| AppError::Service(format!("No orders shipped to '{}'", address)))?;

    let mut modal = OrderModal::new(&config.admin.base_url);
    if let Err(e) = modal.open(&row.orders_json) {
        eprintln!("{}", e.user_message());
        return Ok(());
    }
    print!("{}", modal.render());
    Ok(())
}
