// Ordinary least squares over the point index (0..n-1), projected forward
// month by month with a band of ±1.5 × mean absolute error.
//
// The x-axis is the index, not the calendar: a skipped month in the history
// is treated as if it were adjacent.

use log::debug;

use crate::error::{CalcError, EngineResult};
use crate::period::Period;
use crate::types::{ConfidenceBand, Prediction, TimeSeriesPoint, TrendDirection, TrendForecast};

/// Half-width of the confidence band in units of mean absolute error.
pub const BAND_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    #[inline]
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits y against its index. Fails when the line is undefined.
pub fn fit_line(ys: &[f64]) -> EngineResult<LinearFit> {
    let n = ys.len();
    if n < 2 {
        return Err(CalcError::InsufficientData { points: n });
    }

    let nf = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denom = nf * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return Err(CalcError::InsufficientData { points: n });
    }

    let slope = (nf * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / nf;
    Ok(LinearFit { slope, intercept })
}

pub fn direction_of(slope: f64) -> TrendDirection {
    if slope > 0.0 {
        TrendDirection::Increasing
    } else if slope < 0.0 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Projects `horizon` months past the last historical period. Predictions and
/// the lower band never go below zero.
pub fn forecast(history: &[TimeSeriesPoint], horizon: u32) -> EngineResult<TrendForecast> {
    if horizon == 0 {
        return Err(CalcError::validation("horizon", "must be at least 1 period"));
    }
    if let Some(bad) = history.iter().find(|p| !p.total_kg_co2e.is_finite()) {
        return Err(CalcError::validation(
            "history",
            format!("non-finite total {} in period {}", bad.total_kg_co2e, bad.period),
        ));
    }

    let ys: Vec<f64> = history.iter().map(|p| p.total_kg_co2e).collect();
    let fit = fit_line(&ys)?;
    let n = ys.len();

    let last = match history.last() {
        Some(p) => Period::parse_label(&p.period)?,
        None => return Err(CalcError::InsufficientData { points: 0 }),
    };

    let trend_line: Vec<f64> = (0..n).map(|i| fit.at(i as f64)).collect();

    let predictions = (1..=horizon)
        .map(|k| {
            Ok(Prediction {
                period: last.plus_months(k)?.to_string(),
                value: fit.at((n + k as usize - 1) as f64).max(0.0),
            })
        })
        .collect::<EngineResult<Vec<Prediction>>>()?;

    // mean absolute error of the fit over the history
    let avg_error = ys
        .iter()
        .zip(trend_line.iter())
        .map(|(y, t)| (y - t).abs())
        .sum::<f64>()
        / n as f64;

    let margin = BAND_MULTIPLIER * avg_error;
    let banded = trend_line.iter().copied().chain(predictions.iter().map(|p| p.value));
    let (upper, lower): (Vec<f64>, Vec<f64>) = banded.map(|v| (v + margin, (v - margin).max(0.0))).unzip();

    debug!(
        "forecast n={} horizon={} slope={} intercept={} mae={}",
        n, horizon, fit.slope, fit.intercept, avg_error
    );

    Ok(TrendForecast {
        historical: history.to_vec(),
        trend_line,
        predictions,
        slope: fit.slope,
        intercept: fit.intercept,
        direction: direction_of(fit.slope),
        avg_error,
        confidence_band: ConfidenceBand { upper, lower },
    })
}
