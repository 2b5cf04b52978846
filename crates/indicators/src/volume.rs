use crate::{ensure_non_empty, IndicatorError};
use serde::{Deserialize, Serialize};

/// Number of bars spanned by the short-term volume comparison. The latest bar
/// is compared against the bar `VOLUME_LOOKBACK - 1` positions earlier, so a
/// window of exactly this many bars compares the last bar with the first.
pub const VOLUME_LOOKBACK: usize = 5;

/// A bar is a spike when its volume exceeds this multiple of the average.
pub const SPIKE_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTrend {
    Up,
    Down,
}

/// Summary statistics over a window of volumes.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeStats {
    pub latest: f64,
    /// Mean volume over the whole window.
    pub average: f64,
    pub spike: bool,
    /// `None` when the window is shorter than [`VOLUME_LOOKBACK`].
    pub trend: Option<VolumeTrend>,
    /// Percent change against the reference bar; `None` when the window is
    /// too short or the reference volume is zero.
    pub rate_of_change: Option<f64>,
    /// `latest / average`; `None` when the average is zero.
    pub recent_ratio: Option<f64>,
}

/// Compute [`VolumeStats`] for a volume column.
pub fn volume_stats(volumes: &[f64]) -> Result<VolumeStats, IndicatorError> {
    ensure_non_empty(volumes)?;

    let n = volumes.len();
    let latest = volumes[n - 1];
    let average = volumes.iter().sum::<f64>() / n as f64;

    let reference = n
        .checked_sub(VOLUME_LOOKBACK)
        .map(|index| volumes[index]);

    let trend = reference.map(|prior| {
        if latest > prior {
            VolumeTrend::Up
        } else {
            VolumeTrend::Down
        }
    });
    let rate_of_change = reference
        .filter(|prior| *prior != 0.0)
        .map(|prior| (latest / prior - 1.0) * 100.0);

    let recent_ratio = (average != 0.0).then(|| latest / average);

    Ok(VolumeStats {
        latest,
        average,
        spike: latest > SPIKE_MULTIPLIER * average,
        trend,
        rate_of_change,
        recent_ratio,
    })
}
