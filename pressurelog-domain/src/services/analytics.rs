//! Statistics engine over a user's blood pressure readings.
//!
//! Every operation takes an already-materialized slice of readings for one
//! user and computes pure results; persistence and transport live elsewhere.
//! Input order is not assumed: each entry point sorts by timestamp ascending
//! before computing. All timestamps are UTC; calendar keys and time-of-day
//! bands derive from the UTC timestamp.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, Timelike};
use serde::{Deserialize, Serialize};

use crate::entities::category::ReadingCategory;
use crate::entities::reading::Reading;

/// Minimum readings required before pattern analysis produces buckets.
/// Preserved from the product rules; clinical derivation unverified.
pub const MIN_READINGS_FOR_PATTERNS: usize = 7;

/// Minimum readings in a window before split-half trends are computed
pub const MIN_READINGS_FOR_SPLIT_TREND: usize = 4;

/// Minimum readings before goal progress classifies a direction
pub const MIN_READINGS_FOR_GOAL_TREND: usize = 14;

/// Deadband around "stable" for the goal-progress trend, in mmHg
pub const GOAL_TREND_DEADBAND_MMHG: f64 = 2.0;

/// Temporal grouping granularity for trend series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Bucket by calendar day
    Day,
    /// Bucket by ISO week, keyed by that week's Monday
    Week,
    /// Bucket by calendar month
    Month,
}

/// Per-field arithmetic means, rounded to 1 decimal place
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldAverages {
    pub systolic: f64,
    pub diastolic: f64,
    pub pulse: f64,
}

/// Min/max observed values for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: i32,
    pub max: i32,
}

/// Min/max per measured field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranges {
    pub systolic: FieldRange,
    pub diastolic: FieldRange,
    pub pulse: FieldRange,
}

/// Signed per-field deltas between two aggregate means
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendDeltas {
    pub systolic_change: f64,
    pub diastolic_change: f64,
    pub pulse_change: f64,
}

/// Aggregate summary over a reading window
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_readings: usize,
    pub period_days: u32,
    /// Absent when there are no readings in the window
    pub averages: Option<FieldAverages>,
    /// Absent when there are no readings in the window
    pub ranges: Option<Ranges>,
    /// Count of readings per category; only categories present appear
    pub category_distribution: BTreeMap<ReadingCategory, usize>,
    pub trends: TrendDeltas,
}

/// One bucket of a temporal trend series
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    /// Bucket key: "YYYY-MM-DD" for day/week (week = its Monday), "YYYY-MM" for month
    pub period: String,
    pub count: usize,
    pub averages: FieldAverages,
}

/// Per-bucket averages and count for pattern analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketStats {
    pub systolic: f64,
    pub diastolic: f64,
    pub pulse: f64,
    pub count: usize,
}

/// A derived insight over pattern buckets
#[derive(Debug, Clone, Serialize)]
pub struct PatternInsight {
    #[serde(rename = "type")]
    pub insight_type: String,
    pub message: String,
}

/// Day-of-week and time-of-day pattern analysis.
///
/// `InsufficientData` is a distinguished empty result, not an error; callers
/// render it as "not enough data".
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PatternReport {
    InsufficientData {
        message: String,
    },
    Patterns {
        day_of_week: BTreeMap<String, BucketStats>,
        time_of_day: BTreeMap<String, BucketStats>,
        insights: Vec<PatternInsight>,
        analysis_period_days: u32,
        total_readings_analyzed: usize,
    },
}

/// Target blood pressure values for goal tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTargets {
    pub systolic: i32,
    pub diastolic: i32,
}

impl Default for GoalTargets {
    fn default() -> Self {
        Self {
            systolic: 120,
            diastolic: 80,
        }
    }
}

/// Direction of goal progress over the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalTrend {
    Improving,
    Worsening,
    Stable,
}

/// Systolic/diastolic value pair used for goal averages and gaps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressurePair {
    pub systolic: f64,
    pub diastolic: f64,
}

/// Goal progress over a reading window
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GoalReport {
    NoData { message: String },
    Progress(GoalProgress),
}

/// Computed goal-progress figures
#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    pub targets: GoalTargets,
    pub current_averages: PressurePair,
    /// How far each average sits above its target, floored at zero
    pub improvement_needed: PressurePair,
    pub within_target_percentage: f64,
    pub readings_within_target: usize,
    pub total_readings: usize,
    pub progress_trend: GoalTrend,
    pub period_days: u32,
}

/// Interpolated rank percentiles for one field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentiles {
    #[serde(rename = "25th")]
    pub p25: f64,
    #[serde(rename = "75th")]
    pub p75: f64,
    #[serde(rename = "90th")]
    pub p90: f64,
    #[serde(rename = "95th")]
    pub p95: f64,
}

/// Descriptive statistics for one measured field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStatistics {
    pub mean: f64,
    pub median: f64,
    pub min: i32,
    pub max: i32,
    pub std_dev: f64,
    pub percentiles: Percentiles,
}

/// Cross-field correlations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlations {
    pub systolic_diastolic: f64,
}

/// How often readings were taken over the window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadingFrequency {
    pub readings_per_day: f64,
    pub days_with_readings: usize,
}

/// Detailed statistical analysis over a reading window
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StatisticsReport {
    NoData { message: String },
    Statistics(DetailedStatistics),
}

/// The full per-field statistics plus correlations and frequency
#[derive(Debug, Clone, Serialize)]
pub struct DetailedStatistics {
    pub systolic: FieldStatistics,
    pub diastolic: FieldStatistics,
    pub pulse: FieldStatistics,
    pub correlations: Correlations,
    pub total_readings: usize,
    pub period_days: u32,
    pub reading_frequency: ReadingFrequency,
}

/// Compute the aggregate summary for a window of readings.
///
/// An empty window yields zero counts and empty structures, never an error.
pub fn summary(readings: &[Reading], period_days: u32) -> Summary {
    let ordered = in_time_order(readings);

    if ordered.is_empty() {
        return Summary {
            total_readings: 0,
            period_days,
            averages: None,
            ranges: None,
            category_distribution: BTreeMap::new(),
            trends: TrendDeltas::default(),
        };
    }

    let systolic = values(&ordered, |r| r.systolic);
    let diastolic = values(&ordered, |r| r.diastolic);
    let pulse = values(&ordered, |r| r.pulse);

    let mut category_distribution = BTreeMap::new();
    for reading in &ordered {
        *category_distribution.entry(reading.category).or_insert(0) += 1;
    }

    Summary {
        total_readings: ordered.len(),
        period_days,
        averages: Some(FieldAverages {
            systolic: round1(mean(&systolic)),
            diastolic: round1(mean(&diastolic)),
            pulse: round1(mean(&pulse)),
        }),
        ranges: Some(Ranges {
            systolic: field_range(&ordered, |r| r.systolic),
            diastolic: field_range(&ordered, |r| r.diastolic),
            pulse: field_range(&ordered, |r| r.pulse),
        }),
        category_distribution,
        trends: split_half_deltas(&ordered),
    }
}

/// Two-endpoint trend: newest value minus oldest value per field.
/// All deltas are zero with fewer than two readings.
pub fn simple_trend(readings: &[Reading]) -> TrendDeltas {
    let ordered = in_time_order(readings);
    if ordered.len() < 2 {
        return TrendDeltas::default();
    }

    let oldest = ordered[0];
    let newest = ordered[ordered.len() - 1];

    TrendDeltas {
        systolic_change: (newest.systolic - oldest.systolic) as f64,
        diastolic_change: (newest.diastolic - oldest.diastolic) as f64,
        pulse_change: (newest.pulse - oldest.pulse) as f64,
    }
}

/// Split-half trend: mean of the second half minus mean of the first half
/// per field, rounded to 1 decimal. All deltas are zero with fewer than
/// four readings.
pub fn split_half_trend(readings: &[Reading]) -> TrendDeltas {
    split_half_deltas(&in_time_order(readings))
}

fn split_half_deltas(ordered: &[&Reading]) -> TrendDeltas {
    if ordered.len() < MIN_READINGS_FOR_SPLIT_TREND {
        return TrendDeltas::default();
    }

    // First half takes the smaller share on odd counts
    let mid_point = ordered.len() / 2;
    let (first, second) = ordered.split_at(mid_point);

    let delta = |field: fn(&Reading) -> i32| {
        let first_avg = mean(&values(first, field));
        let second_avg = mean(&values(second, field));
        round1(second_avg - first_avg)
    };

    TrendDeltas {
        systolic_change: delta(|r| r.systolic),
        diastolic_change: delta(|r| r.diastolic),
        pulse_change: delta(|r| r.pulse),
    }
}

/// Bucket readings by day, week, or month and average each bucket.
/// Buckets are emitted sorted by key ascending.
pub fn trend_series(readings: &[Reading], granularity: Granularity) -> Vec<TrendPoint> {
    let ordered = in_time_order(readings);

    let mut grouped: BTreeMap<String, Vec<&Reading>> = BTreeMap::new();
    for reading in ordered {
        let date = reading.timestamp.date_naive();
        let key = match granularity {
            Granularity::Day => date.format("%Y-%m-%d").to_string(),
            Granularity::Week => {
                let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
                monday.format("%Y-%m-%d").to_string()
            }
            Granularity::Month => date.format("%Y-%m").to_string(),
        };
        grouped.entry(key).or_default().push(reading);
    }

    grouped
        .into_iter()
        .map(|(period, bucket)| TrendPoint {
            period,
            count: bucket.len(),
            averages: bucket_averages(&bucket),
        })
        .collect()
}

// Fixed iteration orders used for deterministic insight tie-breaking
const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const TIME_BAND_ORDER: [&str; 4] = ["Morning", "Afternoon", "Evening", "Night"];

/// Analyze day-of-week and time-of-day patterns over a reading window.
///
/// Requires at least [`MIN_READINGS_FOR_PATTERNS`] readings; below that an
/// insufficient-data result is returned instead of buckets.
pub fn patterns(readings: &[Reading], period_days: u32) -> PatternReport {
    let ordered = in_time_order(readings);

    if ordered.len() < MIN_READINGS_FOR_PATTERNS {
        return PatternReport::InsufficientData {
            message: format!(
                "Need at least {} readings for pattern analysis",
                MIN_READINGS_FOR_PATTERNS
            ),
        };
    }

    let mut day_buckets: BTreeMap<String, Vec<&Reading>> = BTreeMap::new();
    let mut time_buckets: BTreeMap<String, Vec<&Reading>> = BTreeMap::new();
    for reading in &ordered {
        let day_name = weekday_name(reading).to_string();
        day_buckets.entry(day_name).or_default().push(reading);

        let band = time_band(reading.timestamp.hour()).to_string();
        time_buckets.entry(band).or_default().push(reading);
    }

    let day_of_week: BTreeMap<String, BucketStats> = day_buckets
        .into_iter()
        .map(|(day, bucket)| (day, bucket_stats(&bucket)))
        .collect();
    let time_of_day: BTreeMap<String, BucketStats> = time_buckets
        .into_iter()
        .map(|(band, bucket)| (band, bucket_stats(&bucket)))
        .collect();

    let mut insights = Vec::new();

    if let Some((best, worst)) = extreme_buckets(&WEEKDAY_ORDER, &day_of_week) {
        insights.push(PatternInsight {
            insight_type: "day_of_week".to_string(),
            message: format!(
                "Lowest average systolic on {} ({} mmHg), highest on {} ({} mmHg)",
                best,
                day_of_week[best].systolic,
                worst,
                day_of_week[worst].systolic
            ),
        });
    }

    if let Some((best, worst)) = extreme_buckets(&TIME_BAND_ORDER, &time_of_day) {
        insights.push(PatternInsight {
            insight_type: "time_of_day".to_string(),
            message: format!(
                "Lowest average systolic in {} ({} mmHg), highest in {} ({} mmHg)",
                best,
                time_of_day[best].systolic,
                worst,
                time_of_day[worst].systolic
            ),
        });
    }

    PatternReport::Patterns {
        day_of_week,
        time_of_day,
        insights,
        analysis_period_days: period_days,
        total_readings_analyzed: ordered.len(),
    }
}

/// Compute goal progress against target systolic/diastolic values.
pub fn goal_progress(readings: &[Reading], targets: GoalTargets, period_days: u32) -> GoalReport {
    let ordered = in_time_order(readings);

    if ordered.is_empty() {
        return GoalReport::NoData {
            message: "No readings found for the specified period".to_string(),
        };
    }

    let avg_systolic = mean(&values(&ordered, |r| r.systolic));
    let avg_diastolic = mean(&values(&ordered, |r| r.diastolic));

    // Compliance compares unrounded integer values against the targets
    let readings_within_target = ordered
        .iter()
        .filter(|r| r.systolic <= targets.systolic && r.diastolic <= targets.diastolic)
        .count();
    let within_target_percentage = (readings_within_target as f64 / ordered.len() as f64) * 100.0;

    let mut progress_trend = GoalTrend::Stable;
    if ordered.len() >= MIN_READINGS_FOR_GOAL_TREND {
        // First window: readings within 7 days of the oldest reading.
        // Last window: the final 7 readings.
        let window_end = ordered[0].timestamp + Duration::days(7);
        let first_window: Vec<f64> = ordered
            .iter()
            .filter(|r| r.timestamp <= window_end)
            .map(|r| r.systolic as f64)
            .collect();
        let last_window = &ordered[ordered.len() - 7..];
        let last_values = values(last_window, |r| r.systolic);

        let first_avg = mean(&first_window);
        let last_avg = mean(&last_values);

        if last_avg < first_avg - GOAL_TREND_DEADBAND_MMHG {
            progress_trend = GoalTrend::Improving;
        } else if last_avg > first_avg + GOAL_TREND_DEADBAND_MMHG {
            progress_trend = GoalTrend::Worsening;
        }
    }

    GoalReport::Progress(GoalProgress {
        targets,
        current_averages: PressurePair {
            systolic: round1(avg_systolic),
            diastolic: round1(avg_diastolic),
        },
        improvement_needed: PressurePair {
            systolic: round1((avg_systolic - targets.systolic as f64).max(0.0)),
            diastolic: round1((avg_diastolic - targets.diastolic as f64).max(0.0)),
        },
        within_target_percentage: round1(within_target_percentage),
        readings_within_target,
        total_readings: ordered.len(),
        progress_trend,
        period_days,
    })
}

/// Detailed statistical analysis over a reading window
pub fn statistics(readings: &[Reading], period_days: u32) -> StatisticsReport {
    let ordered = in_time_order(readings);

    if ordered.is_empty() {
        return StatisticsReport::NoData {
            message: "No readings found for the specified period".to_string(),
        };
    }

    let systolic = values(&ordered, |r| r.systolic);
    let diastolic = values(&ordered, |r| r.diastolic);
    let pulse = values(&ordered, |r| r.pulse);

    let days_with_readings: HashSet<_> = ordered
        .iter()
        .map(|r| r.timestamp.date_naive())
        .collect();

    StatisticsReport::Statistics(DetailedStatistics {
        systolic: field_statistics(&systolic),
        diastolic: field_statistics(&diastolic),
        pulse: field_statistics(&pulse),
        correlations: Correlations {
            systolic_diastolic: round3(pearson_correlation(&systolic, &diastolic)),
        },
        total_readings: ordered.len(),
        period_days,
        reading_frequency: ReadingFrequency {
            readings_per_day: round1(ordered.len() as f64 / period_days.max(1) as f64),
            days_with_readings: days_with_readings.len(),
        },
    })
}

/// Interpolated rank percentile over an ascending-sorted series.
///
/// Fractional index `p/100 * (n-1)`; an integral index returns that element,
/// otherwise the floor and ceiling elements are linearly interpolated. This is
/// the single source of truth for the median (`p = 50`). An empty series
/// yields 0.0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let index = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * (index - lower as f64)
    }
}

/// Population standard deviation (sum of squared deviations over n)
pub fn std_dev(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let m = mean(series);
    let variance = series.iter().map(|x| (x - m).powi(2)).sum::<f64>() / series.len() as f64;
    variance.sqrt()
}

/// Pearson correlation coefficient between two equal-length series.
/// Returns 0 when n < 2 or either series has zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }

    let mean_x = mean(&x[..n]);
    let mean_y = mean(&y[..n]);

    let numerator: f64 = (0..n).map(|i| (x[i] - mean_x) * (y[i] - mean_y)).sum();
    let sum_sq_x: f64 = x[..n].iter().map(|v| (v - mean_x).powi(2)).sum();
    let sum_sq_y: f64 = y[..n].iter().map(|v| (v - mean_y).powi(2)).sum();

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    numerator / denominator
}

fn field_statistics(series: &[f64]) -> FieldStatistics {
    let mut sorted = series.to_vec();
    sorted.sort_by(f64::total_cmp);

    FieldStatistics {
        mean: round1(mean(series)),
        median: round1(percentile(&sorted, 50.0)),
        min: sorted.first().copied().unwrap_or(0.0) as i32,
        max: sorted.last().copied().unwrap_or(0.0) as i32,
        std_dev: round1(std_dev(series)),
        percentiles: Percentiles {
            p25: round1(percentile(&sorted, 25.0)),
            p75: round1(percentile(&sorted, 75.0)),
            p90: round1(percentile(&sorted, 90.0)),
            p95: round1(percentile(&sorted, 95.0)),
        },
    }
}

/// Sort readings by clinical timestamp ascending without cloning entities
fn in_time_order(readings: &[Reading]) -> Vec<&Reading> {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);
    ordered
}

fn values(readings: &[&Reading], field: fn(&Reading) -> i32) -> Vec<f64> {
    readings.iter().map(|r| field(r) as f64).collect()
}

fn field_range(readings: &[&Reading], field: fn(&Reading) -> i32) -> FieldRange {
    let min = readings.iter().map(|r| field(r)).min().unwrap_or(0);
    let max = readings.iter().map(|r| field(r)).max().unwrap_or(0);
    FieldRange { min, max }
}

fn bucket_averages(bucket: &[&Reading]) -> FieldAverages {
    FieldAverages {
        systolic: round1(mean(&values(bucket, |r| r.systolic))),
        diastolic: round1(mean(&values(bucket, |r| r.diastolic))),
        pulse: round1(mean(&values(bucket, |r| r.pulse))),
    }
}

fn bucket_stats(bucket: &[&Reading]) -> BucketStats {
    let averages = bucket_averages(bucket);
    BucketStats {
        systolic: averages.systolic,
        diastolic: averages.diastolic,
        pulse: averages.pulse,
        count: bucket.len(),
    }
}

/// Find the buckets with the lowest and highest average systolic, walking the
/// fixed bucket order so ties resolve deterministically to the earlier bucket.
fn extreme_buckets<'a>(
    order: &[&'a str],
    stats: &BTreeMap<String, BucketStats>,
) -> Option<(&'a str, &'a str)> {
    let mut best: Option<(&str, f64)> = None;
    let mut worst: Option<(&str, f64)> = None;

    for &key in order {
        let Some(bucket) = stats.get(key) else {
            continue;
        };
        if best.map_or(true, |(_, v)| bucket.systolic < v) {
            best = Some((key, bucket.systolic));
        }
        if worst.map_or(true, |(_, v)| bucket.systolic > v) {
            worst = Some((key, bucket.systolic));
        }
    }

    match (best, worst) {
        (Some((b, _)), Some((w, _))) => Some((b, w)),
        _ => None,
    }
}

fn weekday_name(reading: &Reading) -> &'static str {
    match reading.timestamp.weekday() {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    }
}

/// Fixed time-of-day bands over the UTC hour:
/// Morning [5,12), Afternoon [12,17), Evening [17,22), Night [22,5)
fn time_band(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Morning",
        12..=16 => "Afternoon",
        17..=21 => "Evening",
        _ => "Night",
    }
}

fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

fn round3(value: f64) -> f64 {
    round_to(value, 3)
}
