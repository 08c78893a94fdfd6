//! The forward-return screening computation.
//!
//! One operation: evaluate a metric expression per observation, pivot the
//! history wide, compute forward returns per ticker, keep (date, ticker)
//! positions whose metric clears the threshold, and bin the surviving
//! forward returns. The input data is never mutated; identical inputs yield
//! bit-identical output.

use serde::Serialize;

use crate::error::Result;
use crate::frame::{WideFrame, flatten};
use crate::histogram::{BinSpec, BinnedHistogram};
use crate::metric::MetricSpec;
use crate::render::HistogramRender;
use crate::types::MarketData;

/// Parameters of a screening run.
///
/// The defaults match the reference run: screen for metric values above 30
/// and measure returns twelve snapshot periods ahead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenConfig {
    /// Equity-dates are retained only where the metric is strictly greater
    /// than this value. Positions with a NaN metric never pass: an equity
    /// whose metric cannot be measured is excluded from the screen.
    pub threshold: f64,

    /// Forward-return horizon, counted in snapshot periods of the date
    /// column (monthly snapshots in the reference dataset). Must be
    /// positive.
    pub timeframe: usize,

    /// Histogram bin specification.
    pub bins: BinSpec,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            threshold: 30.0,
            timeframe: 12,
            bins: BinSpec::Auto,
        }
    }
}

/// A configured forward-return screen.
///
/// # Example
///
/// ```no_run
/// use hurdle::{BinSpec, ForwardReturnScreen, MarketData, ScreenConfig};
/// # fn run(data: &MarketData) -> hurdle::Result<()> {
/// let screen = ForwardReturnScreen::new(
///     "price/epsNtm",
///     ScreenConfig { threshold: 30.0, timeframe: 12, bins: BinSpec::Count(50) },
/// )?;
/// let result = screen.run(data)?;
/// for (frequency, right_edge) in result.histogram.rows() {
///     println!("{frequency:>6}  {right_edge:.4}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ForwardReturnScreen {
    metric: MetricSpec,
    config: ScreenConfig,
}

/// Output of a screening run: the binned frequency table and the matching
/// render description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenResult {
    /// Frequencies by bin, labelled by right edge.
    pub histogram: BinnedHistogram,
    /// Title, axis labels, and bin geometry for plotting.
    pub render: HistogramRender,
}

impl ForwardReturnScreen {
    /// Parse the metric expression and build a screen.
    ///
    /// A malformed expression fails here, before any data processing.
    pub fn new(metric_expr: &str, config: ScreenConfig) -> Result<Self> {
        Ok(Self {
            metric: metric_expr.parse()?,
            config,
        })
    }

    /// The parsed metric.
    pub const fn metric(&self) -> &MetricSpec {
        &self.metric
    }

    /// The run parameters.
    pub const fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Run the screen over the given market data.
    ///
    /// Fatal errors: missing required/referenced columns, unparseable dates,
    /// duplicate (date, ticker) observations, empty input, zero timeframe.
    /// A filter that removes *every* observation is not fatal: the result
    /// carries an empty (zero-bin) histogram.
    pub fn run(&self, data: &MarketData) -> Result<ScreenResult> {
        let frame = WideFrame::build(data, &self.metric)?;
        let fwd = frame.forward_returns(self.config.timeframe)?;

        let metric_flat = flatten(frame.metric());
        let fwd_flat = flatten(&fwd);

        // NaN metrics compare false against the threshold and drop out;
        // returns without a defined horizon end drop out afterwards.
        let survivors: Vec<f64> = metric_flat
            .iter()
            .zip(fwd_flat.iter())
            .filter(|(m, _)| **m > self.config.threshold)
            .map(|(_, r)| *r)
            .filter(|r| r.is_finite())
            .collect();

        let histogram = BinnedHistogram::from_values(&survivors, self.config.bins)?;
        let render = HistogramRender::new(
            &histogram,
            &self.metric.to_string(),
            self.config.threshold,
            self.config.timeframe,
        );

        Ok(ScreenResult { histogram, render })
    }
}
