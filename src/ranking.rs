use std::cmp::Ordering;

use clap::ValueEnum;
use serde::Serialize;

use crate::metrics::mean_morning_rate;
use crate::models::PhysicianStats;

pub const EXCELLENT_RATE: f64 = 50.0;
pub const GOOD_RATE: f64 = 40.0;
/// Distance from the mean rate, in percentage points, before a physician stands out.
const INDICATOR_BAND: f64 = 5.0;

/// Metrics a physician table or chart can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    MorningRate,
    TotalDischarges,
    AvgTime,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisDomain {
    Fixed(f64, f64),
    /// From zero up to the largest value in the data.
    DataMax,
    Categorical,
}

impl MetricKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::MorningRate => "Morning Rate %",
            Self::TotalDischarges => "Total Discharges",
            Self::AvgTime => "Avg Discharge Time",
            Self::Name => "Physician",
        }
    }

    /// Best-first direction: high morning rates and volumes, early average times.
    pub fn descending(self) -> bool {
        matches!(self, Self::MorningRate | Self::TotalDischarges)
    }

    pub fn domain(self) -> AxisDomain {
        match self {
            Self::MorningRate => AxisDomain::Fixed(0.0, 100.0),
            Self::AvgTime => AxisDomain::Fixed(0.0, 24.0),
            Self::TotalDischarges => AxisDomain::DataMax,
            Self::Name => AxisDomain::Categorical,
        }
    }

    pub fn value(self, physician: &PhysicianStats) -> Option<f64> {
        match self {
            Self::MorningRate => Some(physician.percent_before_noon),
            Self::TotalDischarges => Some(physician.total as f64),
            Self::AvgTime => Some(physician.average_discharge_time),
            Self::Name => None,
        }
    }

    pub fn compare(self, a: &PhysicianStats, b: &PhysicianStats) -> Ordering {
        let ordering = match (self.value(a), self.value(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        };
        if self.descending() {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PerformanceFilter {
    #[default]
    All,
    HighPerformers,
    NeedsImprovement,
}

#[derive(Debug, Clone, Default)]
pub struct TableQuery {
    pub search: Option<String>,
    pub filter: PerformanceFilter,
    pub sort: Option<MetricKey>,
}

/// Applies search, filter, and a stable sort. The filter threshold is the
/// mean morning rate of the full dataset, not of the search results.
pub fn select<'a>(physicians: &'a [PhysicianStats], query: &TableQuery) -> Vec<&'a PhysicianStats> {
    let mean_rate = mean_morning_rate(physicians);
    let needle = query.search.as_deref().map(str::to_lowercase);

    let mut selected: Vec<&PhysicianStats> = physicians
        .iter()
        .filter(|phy| match &needle {
            Some(needle) => phy.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .filter(|phy| match query.filter {
            PerformanceFilter::All => true,
            PerformanceFilter::HighPerformers => phy.percent_before_noon > mean_rate,
            PerformanceFilter::NeedsImprovement => phy.percent_before_noon < mean_rate,
        })
        .collect();

    if let Some(key) = query.sort {
        selected.sort_by(|a, b| key.compare(a, b));
    }
    selected
}

/// Top `limit` physicians by morning rate; ties keep input order.
pub fn top_performers(physicians: &[PhysicianStats], limit: usize) -> Vec<&PhysicianStats> {
    let mut ranked: Vec<&PhysicianStats> = physicians.iter().collect();
    ranked.sort_by(|a, b| MetricKey::MorningRate.compare(a, b));
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    NeedsFocus,
}

impl PerformanceTier {
    pub fn of(physician: &PhysicianStats) -> Self {
        if physician.percent_before_noon >= EXCELLENT_RATE {
            Self::Excellent
        } else if physician.percent_before_noon >= GOOD_RATE {
            Self::Good
        } else {
            Self::NeedsFocus
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent (50%+)",
            Self::Good => "Good (40-49%)",
            Self::NeedsFocus => "Needs Focus (<40%)",
        }
    }
}

#[derive(Debug, Default)]
pub struct TierBreakdown<'a> {
    pub excellent: Vec<&'a PhysicianStats>,
    pub good: Vec<&'a PhysicianStats>,
    /// Lowest rate first.
    pub needs_focus: Vec<&'a PhysicianStats>,
}

impl TierBreakdown<'_> {
    /// Extra morning discharges if every physician below 40% reached it.
    pub fn potential_gain(&self) -> f64 {
        self.needs_focus
            .iter()
            .map(|phy| phy.total as f64 * (GOOD_RATE - phy.percent_before_noon) / 100.0)
            .sum()
    }
}

pub fn tier_breakdown(physicians: &[PhysicianStats]) -> TierBreakdown<'_> {
    let mut breakdown = TierBreakdown::default();
    for phy in top_performers(physicians, physicians.len()) {
        match PerformanceTier::of(phy) {
            PerformanceTier::Excellent => breakdown.excellent.push(phy),
            PerformanceTier::Good => breakdown.good.push(phy),
            PerformanceTier::NeedsFocus => breakdown.needs_focus.push(phy),
        }
    }
    breakdown.needs_focus.sort_by(|a, b| {
        a.percent_before_noon
            .partial_cmp(&b.percent_before_noon)
            .unwrap_or(Ordering::Equal)
    });
    breakdown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Indicator {
    AboveAverage,
    Average,
    BelowAverage,
}

impl Indicator {
    pub fn relative_to(rate: f64, mean_rate: f64) -> Self {
        if rate > mean_rate + INDICATOR_BAND {
            Self::AboveAverage
        } else if rate < mean_rate - INDICATOR_BAND {
            Self::BelowAverage
        } else {
            Self::Average
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AboveAverage => "Above Average",
            Self::Average => "Average",
            Self::BelowAverage => "Below Average",
        }
    }
}
