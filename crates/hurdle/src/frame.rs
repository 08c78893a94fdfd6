//! Wide pivot of long-format observations and forward-return computation.
//!
//! The screening arithmetic needs the metric snapshot at date `d` aligned
//! with the price return realized over `[d, d + timeframe]` for the same
//! ticker. Long-format rows are pivoted into a dense date × ticker matrix
//! (sorted unique dates as rows, sorted unique tickers as columns) with two
//! parallel layers, `price` and `metric`, so the horizon shift can run down
//! each ticker column independently with no cross-ticker contamination.
//! Cells the source never observed stay NaN and propagate as absent.

use std::collections::HashMap;

use ndarray::Array2;
use polars::prelude::*;

use crate::error::{HurdleError, Result};
use crate::metric::MetricSpec;
use crate::types::{DATE_COLUMN, DATE_FORMAT, Date, MarketData, PRICE_COLUMN, TICKER_COLUMN};

/// A date × ticker matrix with parallel `price` and `metric` layers.
#[derive(Debug, Clone)]
pub struct WideFrame {
    dates: Vec<Date>,
    tickers: Vec<String>,
    price: Array2<f64>,
    metric: Array2<f64>,
}

impl WideFrame {
    /// Pivot long-format market data into a wide frame, evaluating the
    /// metric expression per source row along the way.
    ///
    /// Fails on an empty input, a missing required or referenced column, an
    /// unparseable date, or a duplicate (date, ticker) observation (the
    /// pivot would be ambiguous).
    pub fn build(data: &MarketData, metric: &MetricSpec) -> Result<Self> {
        if data.is_empty() {
            return Err(HurdleError::InvalidData(
                "input data has no rows".to_string(),
            ));
        }

        for col in [DATE_COLUMN, TICKER_COLUMN, PRICE_COLUMN] {
            if !data.has_column(col) {
                return Err(HurdleError::MissingColumn(col.to_string()));
            }
        }
        for col in metric.fields() {
            if !data.has_column(col) {
                return Err(HurdleError::MissingColumn(col.to_string()));
            }
        }

        let df = data.data();

        let dates = parse_dates(df)?;
        let tickers = extract_tickers(df)?;
        let prices = extract_numeric(df, PRICE_COLUMN)?;

        let field_values: Vec<Vec<f64>> = metric
            .fields()
            .into_iter()
            .map(|f| extract_numeric(df, f))
            .collect::<Result<_>>()?;

        let metric_values: Vec<f64> = (0..df.height())
            .map(|i| {
                let row: Vec<f64> = field_values.iter().map(|col| col[i]).collect();
                metric.evaluate(&row)
            })
            .collect();

        let mut unique_dates = dates.clone();
        unique_dates.sort_unstable();
        unique_dates.dedup();

        let mut unique_tickers = tickers.clone();
        unique_tickers.sort_unstable();
        unique_tickers.dedup();

        let date_index: HashMap<Date, usize> = unique_dates
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, i))
            .collect();
        let ticker_index: HashMap<&str, usize> = unique_tickers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let shape = (unique_dates.len(), unique_tickers.len());
        let mut price = Array2::from_elem(shape, f64::NAN);
        let mut metric_layer = Array2::from_elem(shape, f64::NAN);
        let mut seen = vec![false; shape.0 * shape.1];

        for i in 0..df.height() {
            let r = date_index[&dates[i]];
            let c = ticker_index[tickers[i].as_str()];
            if seen[r * shape.1 + c] {
                return Err(HurdleError::InvalidData(format!(
                    "duplicate observation for {} on {}",
                    tickers[i], dates[i]
                )));
            }
            seen[r * shape.1 + c] = true;
            price[[r, c]] = prices[i];
            metric_layer[[r, c]] = metric_values[i];
        }

        Ok(Self {
            dates: unique_dates,
            tickers: unique_tickers,
            price,
            metric: metric_layer,
        })
    }

    /// Sorted unique observation dates (the row index).
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Sorted unique tickers (the column index).
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// The price layer.
    pub const fn price(&self) -> &Array2<f64> {
        &self.price
    }

    /// The metric layer.
    pub const fn metric(&self) -> &Array2<f64> {
        &self.metric
    }

    /// Percentage price change `timeframe` periods ahead, indexed at the
    /// originating date: `fwd[d, t] = (price[d + timeframe, t] - price[d, t])
    /// / price[d, t]`. Computed independently per ticker column; cells whose
    /// horizon end is missing or out of range stay NaN.
    pub fn forward_returns(&self, timeframe: usize) -> Result<Array2<f64>> {
        if timeframe == 0 {
            return Err(HurdleError::InvalidData(
                "timeframe must be a positive number of periods".to_string(),
            ));
        }

        let (n_dates, n_tickers) = self.price.dim();
        let mut fwd = Array2::from_elem((n_dates, n_tickers), f64::NAN);

        for c in 0..n_tickers {
            for r in 0..n_dates.saturating_sub(timeframe) {
                let now = self.price[[r, c]];
                let ahead = self.price[[r + timeframe, c]];
                if now.is_finite() && ahead.is_finite() {
                    fwd[[r, c]] = (ahead - now) / now;
                }
            }
        }

        Ok(fwd)
    }
}

/// Flatten a layer row-major (date-major), so two layers flattened over the
/// same frame align element-for-element by (date, ticker) position.
pub(crate) fn flatten(layer: &Array2<f64>) -> Vec<f64> {
    layer.iter().copied().collect()
}

fn parse_dates(df: &DataFrame) -> Result<Vec<Date>> {
    df.column(DATE_COLUMN)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|d| {
            let d = d.ok_or_else(|| HurdleError::DateParse("<null>".to_string()))?;
            Date::parse_from_str(d, DATE_FORMAT)
                .map_err(|_| HurdleError::DateParse(d.to_string()))
        })
        .collect()
}

fn extract_tickers(df: &DataFrame) -> Result<Vec<String>> {
    df.column(TICKER_COLUMN)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|t| {
            t.map(|t| t.to_string()).ok_or_else(|| {
                HurdleError::InvalidData(format!("null value in {} column", TICKER_COLUMN))
            })
        })
        .collect()
}

/// Extract a numeric column as f64, mapping missing cells to NaN. Columns
/// that inferred as integers (a CSV column of whole numbers) are cast first.
fn extract_numeric(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_ticker_data() -> MarketData {
        // B's 02/28 row is deliberately missing.
        let df = df! {
            "date" => &["01/31/2015", "02/28/2015", "03/31/2015", "01/31/2015", "03/31/2015"],
            "ticker_exchange" => &["A-US", "A-US", "A-US", "B-US", "B-US"],
            "price" => &[100.0, 110.0, 121.0, 50.0, 45.0],
            "epsNtm" => &[5.0, 5.5, 6.0, 2.0, 1.8],
        }
        .unwrap();
        MarketData::new(df)
    }

    #[test]
    fn test_build_shapes_and_order() {
        let data = two_ticker_data();
        let metric: MetricSpec = "epsNtm".parse().unwrap();
        let frame = WideFrame::build(&data, &metric).unwrap();

        assert_eq!(frame.dates().len(), 3);
        assert_eq!(frame.tickers(), &["A-US".to_string(), "B-US".to_string()]);
        assert!(frame.dates().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(frame.price().dim(), (3, 2));
    }

    #[test]
    fn test_build_missing_cell_is_nan() {
        let data = two_ticker_data();
        let metric: MetricSpec = "epsNtm".parse().unwrap();
        let frame = WideFrame::build(&data, &metric).unwrap();

        // B has no 02/28 observation.
        assert!(frame.price()[[1, 1]].is_nan());
        assert!(frame.metric()[[1, 1]].is_nan());
        assert_relative_eq!(frame.price()[[1, 0]], 110.0);
    }

    #[test]
    fn test_build_ratio_metric() {
        let data = two_ticker_data();
        let metric: MetricSpec = "price/epsNtm".parse().unwrap();
        let frame = WideFrame::build(&data, &metric).unwrap();

        assert_relative_eq!(frame.metric()[[0, 0]], 100.0 / 5.0);
        assert_relative_eq!(frame.metric()[[2, 1]], 45.0 / 1.8);
    }

    #[test]
    fn test_build_missing_column() {
        let data = two_ticker_data();
        let metric: MetricSpec = "salesNtm".parse().unwrap();
        let err = WideFrame::build(&data, &metric).unwrap_err();
        assert!(matches!(err, HurdleError::MissingColumn(c) if c == "salesNtm"));
    }

    #[test]
    fn test_build_bad_date_is_fatal() {
        let df = df! {
            "date" => &["2015-01-31"],
            "ticker_exchange" => &["A-US"],
            "price" => &[100.0],
        }
        .unwrap();
        let metric: MetricSpec = "price".parse().unwrap();
        let err = WideFrame::build(&MarketData::new(df), &metric).unwrap_err();
        assert!(matches!(err, HurdleError::DateParse(v) if v == "2015-01-31"));
    }

    #[test]
    fn test_build_duplicate_observation_is_fatal() {
        let df = df! {
            "date" => &["01/31/2015", "01/31/2015"],
            "ticker_exchange" => &["A-US", "A-US"],
            "price" => &[100.0, 101.0],
        }
        .unwrap();
        let metric: MetricSpec = "price".parse().unwrap();
        let err = WideFrame::build(&MarketData::new(df), &metric).unwrap_err();
        assert!(matches!(err, HurdleError::InvalidData(_)));
    }

    #[test]
    fn test_build_empty_input_is_fatal() {
        let data = MarketData::new(DataFrame::default());
        let metric: MetricSpec = "price".parse().unwrap();
        assert!(WideFrame::build(&data, &metric).is_err());
    }

    #[test]
    fn test_forward_returns_hand_computed() {
        let data = two_ticker_data();
        let metric: MetricSpec = "epsNtm".parse().unwrap();
        let frame = WideFrame::build(&data, &metric).unwrap();
        let fwd = frame.forward_returns(1).unwrap();

        // A: 100 -> 110 -> 121.
        assert_relative_eq!(fwd[[0, 0]], 0.1);
        assert_relative_eq!(fwd[[1, 0]], 0.1);
        // Last row has no horizon end.
        assert!(fwd[[2, 0]].is_nan());
        // B is missing its middle observation, so neither leg is computable.
        assert!(fwd[[0, 1]].is_nan());
        assert!(fwd[[1, 1]].is_nan());
    }

    #[test]
    fn test_forward_returns_longer_horizon() {
        let data = two_ticker_data();
        let metric: MetricSpec = "epsNtm".parse().unwrap();
        let frame = WideFrame::build(&data, &metric).unwrap();
        let fwd = frame.forward_returns(2).unwrap();

        assert_relative_eq!(fwd[[0, 0]], 0.21);
        assert!(fwd[[1, 0]].is_nan());
        // B: 50 -> 45 across the two-period horizon.
        assert_relative_eq!(fwd[[0, 1]], -0.1);
    }

    #[test]
    fn test_forward_returns_no_cross_ticker_leakage() {
        // Two tickers with wildly different prices; a horizon longer than
        // either series must produce no value at all.
        let data = two_ticker_data();
        let metric: MetricSpec = "epsNtm".parse().unwrap();
        let frame = WideFrame::build(&data, &metric).unwrap();
        let fwd = frame.forward_returns(5).unwrap();
        assert!(fwd.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_forward_returns_zero_timeframe_is_fatal() {
        let data = two_ticker_data();
        let metric: MetricSpec = "epsNtm".parse().unwrap();
        let frame = WideFrame::build(&data, &metric).unwrap();
        assert!(frame.forward_returns(0).is_err());
    }

    #[test]
    fn test_flatten_is_date_major() {
        let data = two_ticker_data();
        let metric: MetricSpec = "epsNtm".parse().unwrap();
        let frame = WideFrame::build(&data, &metric).unwrap();
        let flat = flatten(frame.price());

        assert_eq!(flat.len(), 6);
        assert_relative_eq!(flat[0], 100.0); // (01/31, A)
        assert_relative_eq!(flat[1], 50.0); // (01/31, B)
        assert_relative_eq!(flat[2], 110.0); // (02/28, A)
        assert!(flat[3].is_nan()); // (02/28, B) missing
    }

    #[test]
    fn test_integer_price_column_is_cast() {
        let df = df! {
            "date" => &["01/31/2015", "02/28/2015"],
            "ticker_exchange" => &["A-US", "A-US"],
            "price" => &[100i64, 110i64],
        }
        .unwrap();
        let metric: MetricSpec = "price".parse().unwrap();
        let frame = WideFrame::build(&MarketData::new(df), &metric).unwrap();
        assert_relative_eq!(frame.price()[[0, 0]], 100.0);
    }
}
