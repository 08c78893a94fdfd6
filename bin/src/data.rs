//! Data loading utilities for the hurdle CLI.

use std::path::Path;

use anyhow::Context;
use hurdle::MarketData;
use polars::prelude::*;

/// Load long-format market data from a CSV file.
///
/// The file must carry a header row with at least `date` (`MM/DD/YYYY`
/// text), `ticker_exchange`, and `price` columns, plus whatever fundamental
/// columns the metric expressions reference. Dates stay textual here; the
/// library parses and validates them during the pivot.
pub(crate) fn load_market_data(path: &Path) -> anyhow::Result<MarketData> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("failed to read {}", path.display()))?;

    Ok(MarketData::new(df))
}
