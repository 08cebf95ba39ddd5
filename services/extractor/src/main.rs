//! Satellite raster extraction CLI.
//!
//! Two run modes:
//! - `train`: sample every band of each catalog item at ground-truth station
//!   points, join SNOTEL snow depth, append labeled rows to a parquet table.
//! - `infer`: clip every band of each item to a geographic region, merge and
//!   reproject, write the flattened pixel rows as JSON.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geo::{polygon, Polygon};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use catalog::CatalogItemView;
use extraction::ExtractionManager;
use ground_truth::SnotelProvider;
use raster::{HttpRasterStore, HttpStoreConfig, ObjectRasterStore, RasterStore};
use snow_common::BandMapping;

#[derive(Parser, Debug)]
#[command(name = "extractor")]
#[command(about = "Extract satellite raster datasets at points or over regions")]
struct Args {
    /// JSON file holding an array of catalog items
    #[arg(long, global = true, default_value = "items.json")]
    items: PathBuf,

    /// S3 bucket to read rasters from (default: fetch over HTTP)
    #[arg(long, global = true, env = "RASTER_BUCKET")]
    s3_bucket: Option<String>,

    /// Concurrent catalog items processed
    #[arg(long, global = true, default_value = "4")]
    concurrency: usize,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract labeled training points and append them to a parquet table
    Train {
        /// JSON file with station metadata (triplet, coordinates, elevation)
        #[arg(long)]
        station: PathBuf,

        /// Extra `lat,lon` points; the station coordinate is always included
        #[arg(long = "point", value_parser = config::parse_point)]
        points: Vec<(f64, f64)>,

        /// Parquet table to append to (created if absent)
        #[arg(long, default_value = "training.parquet")]
        output: PathBuf,

        /// Keep points whose snow-depth lookup found no measurement
        #[arg(long)]
        keep_unlabeled: bool,
    },

    /// Extract merged pixel rows over a region and write them as JSON
    Infer {
        /// Region as `min_lon,min_lat,max_lon,max_lat`
        #[arg(long, value_parser = config::parse_region)]
        region: (f64, f64, f64, f64),

        /// Output JSON file
        #[arg(long, default_value = "rows.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let store = build_store(args.s3_bucket.as_deref())?;
    let items = config::load_items(&args.items)?;
    anyhow::ensure!(!items.is_empty(), "No usable catalog items loaded");

    match args.command {
        Command::Train {
            station,
            points,
            output,
            keep_unlabeled,
        } => {
            run_train(
                store,
                &items,
                &station,
                points,
                &output,
                keep_unlabeled,
                args.concurrency,
            )
            .await
        }
        Command::Infer { region, output } => run_infer(store, &items, region, &output).await,
    }
}

fn build_store(s3_bucket: Option<&str>) -> Result<Arc<dyn RasterStore>> {
    match s3_bucket {
        Some(bucket) => {
            let s3 = object_store::aws::AmazonS3Builder::from_env()
                .with_bucket_name(bucket)
                .build()
                .context("Failed to build S3 store")?;
            info!(bucket, "Reading rasters from S3");
            Ok(Arc::new(ObjectRasterStore::new(Arc::new(s3), bucket)))
        }
        None => {
            let store = HttpRasterStore::new(HttpStoreConfig::default())
                .context("Failed to build HTTP store")?;
            Ok(Arc::new(store))
        }
    }
}

async fn run_train(
    store: Arc<dyn RasterStore>,
    items: &[catalog::CatalogItem],
    station_path: &std::path::Path,
    extra_points: Vec<(f64, f64)>,
    output: &std::path::Path,
    keep_unlabeled: bool,
    concurrency: usize,
) -> Result<()> {
    let station = config::load_station(station_path)?;

    let mut points = vec![(station.latitude, station.longitude)];
    points.extend(extra_points);

    let client = reqwest::Client::new();
    let provider = Arc::new(SnotelProvider::new(client, station));

    let manager = ExtractionManager::new(store, BandMapping::landsat())
        .with_ground_truth(provider)
        .with_batch_concurrency(concurrency);

    let views: Vec<&dyn CatalogItemView> = items.iter().map(|i| i as &dyn CatalogItemView).collect();
    let results = manager.extract_training_batch(&views, &points).await;

    let mut extracted = Vec::new();
    for (item, result) in items.iter().zip(results) {
        match result {
            Ok(points) => extracted.extend(points),
            Err(e) => warn!(item_id = %item.item_id(), error = %e, "Item extraction failed"),
        }
    }

    let rows = if keep_unlabeled {
        extracted
    } else {
        ExtractionManager::filter_valid_training_data(extracted)
    };
    anyhow::ensure!(!rows.is_empty(), "No training rows extracted");

    let written = training_data::append_to_file(output, &rows)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(rows = written, output = %output.display(), "Training extraction complete");
    Ok(())
}

async fn run_infer(
    store: Arc<dyn RasterStore>,
    items: &[catalog::CatalogItem],
    region: (f64, f64, f64, f64),
    output: &std::path::Path,
) -> Result<()> {
    let (min_lon, min_lat, max_lon, max_lat) = region;
    let region: Polygon<f64> = polygon![
        (x: min_lon, y: min_lat),
        (x: max_lon, y: min_lat),
        (x: max_lon, y: max_lat),
        (x: min_lon, y: max_lat),
        (x: min_lon, y: min_lat),
    ];

    let manager = ExtractionManager::new(store, BandMapping::landsat());

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for item in items {
        match manager.extract_inference_data(item, &region).await {
            Ok(Some(merged)) => rows.extend(merged.rows().into_iter().map(|row| {
                serde_json::json!({
                    "item_id": merged.item_id,
                    "time": row.time,
                    "latitude": row.lat,
                    "longitude": row.lon,
                    "bands": row.values,
                })
            })),
            Ok(None) => {
                info!(item_id = %item.item_id(), "Item does not fully cover the region, skipped");
                skipped += 1;
            }
            Err(e) => warn!(item_id = %item.item_id(), error = %e, "Item extraction failed"),
        }
    }

    let json = serde_json::to_string_pretty(&rows)?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        rows = rows.len(),
        skipped,
        output = %output.display(),
        "Inference extraction complete"
    );
    Ok(())
}
