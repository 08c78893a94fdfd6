//! Histogram binning for filtered forward returns.
//!
//! Bins are equal-width and span the observed value range. The automatic
//! bin-count rule is the larger of the Sturges estimate and the
//! Freedman–Diaconis estimate, making `auto` a deterministic function of the
//! value distribution alone. Each bin is labelled by its *right* edge; a
//! consumer mapping a frequency back to a return range must use that
//! convention.

use std::fmt;
use std::str::FromStr;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{HurdleError, Result};

/// How many bins to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinSpec {
    /// Automatic bin count: `max(Sturges, Freedman–Diaconis)` over the
    /// observed values.
    #[default]
    Auto,
    /// A fixed, positive number of bins.
    Count(usize),
}

impl FromStr for BinSpec {
    type Err = HurdleError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Self::Count(n)),
            _ => Err(HurdleError::InvalidData(format!(
                "bin spec must be 'auto' or a positive integer, got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for BinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Count(n) => write!(f, "{}", n),
        }
    }
}

/// An ordered sequence of equal-width bins with their frequencies.
///
/// `edges` holds `len() + 1` boundary values; `counts[i]` is the number of
/// observations falling in `[edges[i], edges[i + 1])`, with the final bin
/// closed on the right so the maximum lands inside it. An empty histogram
/// (zero bins) is the valid, degenerate output of a screen that filtered
/// away every observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedHistogram {
    edges: Vec<f64>,
    counts: Vec<u64>,
}

impl BinnedHistogram {
    /// Bin the given finite values.
    ///
    /// All values are assumed finite; NaN filtering happens upstream. When
    /// every value is identical the range degenerates and a unit-width span
    /// centered on the value is binned instead.
    pub fn from_values(values: &[f64], bins: BinSpec) -> Result<Self> {
        if values.is_empty() {
            return Ok(Self {
                edges: Vec::new(),
                counts: Vec::new(),
            });
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }

        // Degenerate range: bin a unit-width span centered on the value.
        let (lo, hi) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };

        let n_bins = match bins {
            BinSpec::Count(0) => {
                return Err(HurdleError::InvalidData(
                    "bin count must be positive".to_string(),
                ));
            }
            BinSpec::Count(n) => n,
            BinSpec::Auto => auto_bin_count(values, hi - lo),
        };

        let span = hi - lo;
        let mut edges = Vec::with_capacity(n_bins + 1);
        for i in 0..=n_bins {
            edges.push(lo + span * i as f64 / n_bins as f64);
        }
        edges[n_bins] = hi;

        let mut counts = vec![0u64; n_bins];
        for &v in values {
            let idx = (((v - lo) / span) * n_bins as f64).floor() as usize;
            counts[idx.min(n_bins - 1)] += 1;
        }

        Ok(Self { edges, counts })
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the histogram has zero bins.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// All bin boundaries, ascending (`len() + 1` values, empty when the
    /// histogram is empty).
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Per-bin frequencies in ascending-edge order.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// The right edge of each bin, ascending.
    pub fn right_edges(&self) -> &[f64] {
        if self.edges.is_empty() {
            &[]
        } else {
            &self.edges[1..]
        }
    }

    /// Total frequency across all bins.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Iterate `(frequency, right_edge)` pairs in ascending-edge order.
    pub fn rows(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.counts
            .iter()
            .copied()
            .zip(self.right_edges().iter().copied())
    }

    /// The frequency table as a DataFrame with `Frequency` and
    /// `Binned_Return` columns, one row per bin in ascending-edge order.
    pub fn table(&self) -> Result<DataFrame> {
        let df = df! {
            "Frequency" => self.counts.clone(),
            "Binned_Return" => self.right_edges().to_vec(),
        }?;
        Ok(df)
    }
}

/// numpy-style `bins='auto'`: the larger of the Sturges and
/// Freedman–Diaconis bin-count estimates.
fn auto_bin_count(values: &[f64], span: f64) -> usize {
    let n = values.len();
    let sturges = (n as f64).log2().ceil() as usize + 1;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let iqr = percentile(&sorted, 75.0) - percentile(&sorted, 25.0);
    if iqr <= 0.0 || span <= 0.0 {
        return sturges.max(1);
    }

    let fd_width = 2.0 * iqr / (n as f64).cbrt();
    let fd = (span / fd_width).ceil() as usize;
    sturges.max(fd).max(1)
}

/// Linear-interpolation percentile of pre-sorted values.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = pct / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
