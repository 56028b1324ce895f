//! Rolling-window summary of recent readings.
//!
//! Reduces the most recent N readings to mean/min/max per metric and renders
//! the fixed text block that the advisory prompt embeds as its context.

use crate::logging::{self, Component};
use crate::model::{Metric, Reading};
use crate::store::{DEFAULT_RECENT_LIMIT, ReadingStore, StoreError};

/// Returned instead of a summary when the window is empty.
pub const NO_DATA_CONTEXT: &str = "No sensor data available currently.";

/// Default number of recent readings summarized.
pub const DEFAULT_WINDOW: u32 = DEFAULT_RECENT_LIMIT;

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

/// Statistics over the non-NaN values of one metric. All three fields are
/// NaN when the window holds no usable value for the metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    /// Arithmetic mean, rounded to 2 decimal places.
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricSummary {
    const MISSING: MetricSummary = MetricSummary { mean: f64::NAN, min: f64::NAN, max: f64::NAN };

    pub fn has_values(&self) -> bool {
        !self.mean.is_nan()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub sample_count: usize,
    pub temperature: MetricSummary,
    pub ph: MetricSummary,
    pub dissolved_oxygen: MetricSummary,
}

impl Summary {
    pub fn metric(&self, metric: Metric) -> &MetricSummary {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Ph => &self.ph,
            Metric::DissolvedOxygen => &self.dissolved_oxygen,
        }
    }

    /// Render the context block: an average line and a range line per metric.
    pub fn render(&self) -> String {
        let mut out = String::from("\nLatest Water Quality Summary:\n");
        for metric in Metric::ALL {
            let stats = self.metric(metric);
            let unit = metric.unit();
            if !stats.has_values() {
                out.push_str(&format!("- Average {}: n/a\n", metric.label()));
                out.push_str(&format!("- {} Range: n/a\n", metric.label()));
                continue;
            }
            out.push_str(&format!("- Average {}: {}{}\n", metric.label(), stats.mean, unit));
            out.push_str(&format!(
                "- {} Range: {}–{}{}\n",
                metric.label(),
                stats.min,
                stats.max,
                unit
            ));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

/// Round to 2 decimal places, exact halves to even (7.125 → 7.12).
pub fn round_to_2dp(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// NaN values (missing measurements) are left out of every statistic.
fn summarize_metric(readings: &[Reading], metric: Metric) -> MetricSummary {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for value in readings.iter().map(|r| r.value(metric)).filter(|v| !v.is_nan()) {
        count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }

    if count == 0 {
        return MetricSummary::MISSING;
    }

    MetricSummary {
        mean: round_to_2dp(sum / count as f64),
        min,
        max,
    }
}

/// Mean/min/max per metric over `readings`; `None` when there are none.
pub fn summarize(readings: &[Reading]) -> Option<Summary> {
    if readings.is_empty() {
        return None;
    }
    Some(Summary {
        sample_count: readings.len(),
        temperature: summarize_metric(readings, Metric::Temperature),
        ph: summarize_metric(readings, Metric::Ph),
        dissolved_oxygen: summarize_metric(readings, Metric::DissolvedOxygen),
    })
}

/// Context text for a window of readings, or the no-data sentinel.
pub fn render_context(readings: &[Reading]) -> String {
    match summarize(readings) {
        Some(summary) => summary.render(),
        None => NO_DATA_CONTEXT.to_string(),
    }
}

/// Fetch the `limit` most recent readings and render their context block.
///
/// Store failures propagate; an empty store is not a failure.
pub fn prepare_context(store: &dyn ReadingStore, limit: u32) -> Result<String, StoreError> {
    let readings = store.fetch_recent(limit)?;
    logging::debug(Component::Summary, &format!("summarizing {} of up to {} readings", readings.len(), limit));
    Ok(render_context(&readings))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(id: i64, temperature: f64, ph: f64, dissolved_oxygen: f64) -> Reading {
        Reading {
            id,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, id as u32, 0).unwrap(),
            temperature,
            ph,
            dissolved_oxygen,
        }
    }

    #[test]
    fn test_empty_window_has_no_summary() {
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn test_empty_window_renders_sentinel() {
        assert_eq!(render_context(&[]), NO_DATA_CONTEXT);
    }

    #[test]
    fn test_single_reading_summary_is_that_reading() {
        let summary = summarize(&[reading(1, 25.0, 7.0, 6.0)]).expect("one reading should summarize");
        assert_eq!(summary.sample_count, 1);
        assert_eq!(summary.temperature, MetricSummary { mean: 25.0, min: 25.0, max: 25.0 });
        assert_eq!(summary.ph, MetricSummary { mean: 7.0, min: 7.0, max: 7.0 });
        assert_eq!(summary.dissolved_oxygen, MetricSummary { mean: 6.0, min: 6.0, max: 6.0 });
    }

    #[test]
    fn test_mean_is_rounded_but_range_is_not() {
        let readings = [
            reading(1, 20.111, 7.0, 5.0),
            reading(2, 21.222, 7.5, 6.0),
            reading(3, 22.333, 8.0, 10.0),
        ];
        let summary = summarize(&readings).expect("window should summarize");

        // (20.111 + 21.222 + 22.333) / 3 = 21.222 → 21.22
        assert_eq!(summary.temperature.mean, 21.22);
        assert_eq!(summary.temperature.min, 20.111);
        assert_eq!(summary.temperature.max, 22.333);

        assert_eq!(summary.ph.mean, 7.5);
        // (5 + 6 + 10) / 3 = 7.0
        assert_eq!(summary.dissolved_oxygen.mean, 7.0);
        assert_eq!(summary.dissolved_oxygen.min, 5.0);
        assert_eq!(summary.dissolved_oxygen.max, 10.0);
    }

    #[test]
    fn test_order_of_window_does_not_matter() {
        let forward = [reading(1, 18.5, 6.1, 3.2), reading(2, 34.9, 8.9, 9.7)];
        let backward = [reading(2, 34.9, 8.9, 9.7), reading(1, 18.5, 6.1, 3.2)];
        let a = summarize(&forward).expect("window should summarize");
        let b = summarize(&backward).expect("window should summarize");
        assert_eq!(a.temperature, b.temperature);
        assert_eq!(a.ph, b.ph);
        assert_eq!(a.dissolved_oxygen, b.dissolved_oxygen);
    }

    #[test]
    fn test_render_embeds_every_value() {
        let readings = [reading(1, 24.0, 7.0, 6.0), reading(2, 26.0, 8.0, 8.0)];
        let text = render_context(&readings);

        assert!(text.contains("Latest Water Quality Summary:"));
        assert!(text.contains("- Average Temperature: 25°C"));
        assert!(text.contains("- Temperature Range: 24–26°C"));
        assert!(text.contains("- Average pH: 7.5"));
        assert!(text.contains("- pH Range: 7–8"));
        assert!(text.contains("- Average Dissolved Oxygen: 7 mg/L"));
        assert!(text.contains("- Dissolved Oxygen Range: 6–8 mg/L"));
    }

    #[test]
    fn test_round_to_2dp() {
        assert_eq!(round_to_2dp(7.456), 7.46);
        assert_eq!(round_to_2dp(7.454), 7.45);
        assert_eq!(round_to_2dp(-3.333), -3.33);
        assert_eq!(round_to_2dp(10.0), 10.0);
    }

    #[test]
    fn test_exact_halves_round_to_even() {
        assert_eq!(round_to_2dp(7.125), 7.12);
        assert_eq!(round_to_2dp(7.375), 7.38);
        assert_eq!(round_to_2dp(0.625), 0.62);
    }

    #[test]
    fn test_mean_of_half_way_window_rounds_to_even() {
        let summary = summarize(&[reading(1, 25.0, 7.0, 6.0), reading(2, 25.0, 7.25, 6.0)])
            .expect("window should summarize");
        // (7.0 + 7.25) / 2 = 7.125
        assert_eq!(summary.ph.mean, 7.12);
        assert!(render_context(&[reading(1, 25.0, 7.0, 6.0), reading(2, 25.0, 7.25, 6.0)])
            .contains("- Average pH: 7.12\n"));
    }

    #[test]
    fn test_nan_values_are_left_out_of_statistics() {
        let readings = [
            reading(1, 24.0, 7.0, 6.0),
            reading(2, f64::NAN, 8.0, 8.0),
            reading(3, 26.0, f64::NAN, 7.0),
        ];
        let summary = summarize(&readings).expect("window should summarize");

        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.temperature, MetricSummary { mean: 25.0, min: 24.0, max: 26.0 });
        assert_eq!(summary.ph, MetricSummary { mean: 7.5, min: 7.0, max: 8.0 });
        assert_eq!(summary.dissolved_oxygen, MetricSummary { mean: 7.0, min: 6.0, max: 8.0 });

        let text = summary.render();
        assert!(text.contains("- Average Temperature: 25°C"), "{}", text);
        assert!(!text.contains("NaN"), "{}", text);
    }

    #[test]
    fn test_metric_without_values_renders_as_unavailable() {
        let readings = [reading(1, f64::NAN, 7.0, 6.0), reading(2, f64::NAN, 7.5, 6.5)];
        let summary = summarize(&readings).expect("window should summarize");

        assert!(!summary.temperature.has_values());
        assert!(summary.ph.has_values());

        let text = summary.render();
        assert!(text.contains("- Average Temperature: n/a\n"), "{}", text);
        assert!(text.contains("- Temperature Range: n/a\n"), "{}", text);
        assert!(text.contains("- Average pH: 7.25\n"), "{}", text);
    }
}
