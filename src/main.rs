mod aggregator;
mod config;
mod filter;
mod loader;
mod matcher;
mod model;
mod normalizer;
mod summary;

use config::load_config;
use filter::FilterSpec;
use loader::load_dataset;
use normalizer::{MaterialNormalizer, MaterialTable};
use std::process::ExitCode;
use summary::DashboardSummary;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("config load error ({config_path}): {e}");
            return ExitCode::FAILURE;
        }
    };

    let table = match MaterialTable::from_file(&config.material_table_path) {
        Ok(table) => table,
        Err(e) => {
            error!("material table error ({}): {e}", config.material_table_path);
            return ExitCode::FAILURE;
        }
    };
    info!("loaded material table with {} entries", table.len());
    let normalizer = MaterialNormalizer::new(table);

    let dataset = match load_dataset(&config.dataset_path, &normalizer) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("dataset load error ({}): {e}", config.dataset_path);
            return ExitCode::FAILURE;
        }
    };
    if dataset.skipped_rows > 0 {
        warn!("{} malformed rows were skipped", dataset.skipped_rows);
    }

    // One synchronous recomputation over the default (select-all) filter
    // state; the presentation layer re-runs this per interaction.
    let spec = FilterSpec::select_all(&dataset);
    match DashboardSummary::build(&dataset, &spec) {
        Ok(summary) => {
            info!(
                "{} records after filtering; price match {:.2}%",
                summary.record_count, summary.match_percentages.price
            );
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    error!("failed to serialize summary: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        // A recoverable user-input state, not a failure: surface the prompt
        // and emit nothing else.
        Err(empty) => warn!("nothing to aggregate: {empty}"),
    }

    ExitCode::SUCCESS
}
