//! Chart series derived from a company's risk history.
//!
//! Everything here is a pure function of its inputs: nothing is cached, and calling it
//! again with the same history yields the same series.

use crate::RiskResult;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub label: String,
    pub urgency: f64,
    pub sentiment_magnitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarPoint {
    pub label: String,
    pub magnitude: f64,
}

/// Read-only lens over a history ordered by ascending fiscal year.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsView<'a> {
    history: &'a [RiskResult],
}

impl<'a> AnalyticsView<'a> {
    pub fn new(history: &'a [RiskResult]) -> Self {
        Self { history }
    }

    pub fn latest(&self) -> Option<&'a RiskResult> {
        self.history.last()
    }

    pub fn trend_series(&self) -> Vec<TrendPoint> {
        self.history
            .iter()
            .map(|result| TrendPoint {
                label: format!("FY{}", result.fiscal_year),
                urgency: result.urgency_score,
                sentiment_magnitude: result.sentiment_delta.unwrap_or(0.0).abs(),
            })
            .collect()
    }

    /// Radar series of the latest result.
    pub fn latest_radar(&self) -> Vec<RadarPoint> {
        radar_series(self.latest())
    }
}

pub fn radar_series(result: Option<&RiskResult>) -> Vec<RadarPoint> {
    let Some(result) = result else {
        return Vec::new();
    };
    result
        .risk_categories
        .iter()
        .map(|(category, score)| RadarPoint {
            label: normalize_category(category),
            magnitude: score.abs(),
        })
        .collect()
}

/// `operational_risk` -> `OPERATIONAL RISK`.
pub fn normalize_category(category: &str) -> String {
    category.replace('_', " ").to_uppercase()
}
