//! Common types used throughout the hurdle library.
//!
//! This module defines the input data container and the column names the
//! screening computation expects to find in it.

use polars::prelude::*;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// Name of the observation-date column.
pub const DATE_COLUMN: &str = "date";

/// Name of the price column.
pub const PRICE_COLUMN: &str = "price";

/// Name of the instrument-identifier column.
pub const TICKER_COLUMN: &str = "ticker_exchange";

/// The textual format of the date column (`MM/DD/YYYY`).
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Container for long-format market data.
///
/// `MarketData` wraps a Polars DataFrame holding one row per
/// (date, ticker) observation: a textual `date` (`MM/DD/YYYY`), a
/// `ticker_exchange` identifier, a positive `price`, and an open set of
/// numeric fundamental columns (`epsNtm`, `entrVal`, `roe`, …) that metric
/// expressions may reference. Fundamental values may be missing; missing
/// cells propagate as NaN through the screening arithmetic rather than
/// erroring.
///
/// Dates need not be aligned across tickers; the screening pivot aligns them.
///
/// # Example
///
/// ```no_run
/// use hurdle::MarketData;
/// use polars::prelude::*;
///
/// let df = df! {
///     "date" => &["01/31/2015", "01/31/2015"],
///     "ticker_exchange" => &["AAPL-US", "MSFT-US"],
///     "price" => &[117.16, 40.40],
///     "epsNtm" => &[8.65, 2.60],
/// }.unwrap();
///
/// let data = MarketData::new(df);
/// ```
#[derive(Debug, Clone)]
pub struct MarketData {
    /// The underlying DataFrame containing market data.
    data: DataFrame,
}

impl MarketData {
    /// Creates a new `MarketData` instance from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of observation rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the market data is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the column names in the market data.
    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Checks if a column exists in the market data.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_data_new() {
        let df = DataFrame::default();
        let data = MarketData::new(df);
        assert!(data.is_empty());
    }

    #[test]
    fn test_market_data_from_dataframe() {
        let df = df! {
            "date" => &["01/31/2015", "02/28/2015"],
            "ticker_exchange" => &["AAPL-US", "AAPL-US"],
            "price" => &[117.16, 128.46],
        }
        .unwrap();

        let data = MarketData::from(df);
        assert_eq!(data.len(), 2);
        assert!(data.has_column("date"));
        assert!(data.has_column("price"));
        assert!(data.has_column("ticker_exchange"));
        assert!(!data.has_column("epsNtm"));
    }

    #[test]
    fn test_market_data_columns() {
        let df = df! {
            "date" => &["01/31/2015"],
            "ticker_exchange" => &["AAPL-US"],
            "price" => &[117.16],
            "roe" => &[36.9],
        }
        .unwrap();

        let data = MarketData::new(df);
        let columns = data.columns();
        assert_eq!(columns.len(), 4);
        assert!(columns.contains(&"roe".to_string()));
    }

    #[test]
    fn test_market_data_into_inner() {
        let df = df! {
            "price" => &[150.0],
        }
        .unwrap();

        let data = MarketData::new(df);
        let inner = data.into_inner();
        assert_eq!(inner.height(), 1);
    }

    #[test]
    fn test_date_format() {
        let date = Date::parse_from_str("03/31/2016", DATE_FORMAT).unwrap();
        use chrono::Datelike;
        assert_eq!(date.year(), 2016);
        assert_eq!(date.month(), 3);
        assert_eq!(date.day(), 31);
    }
}
