use std::fmt;

use serde::Serialize;

use crate::models::{HospitalMetrics, PhysicianStats};
use crate::ranking::top_performers;

pub const TOP_PERFORMER_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPhysician {
    pub name: String,
    pub morning_rate: f64,
}

/// Bounded summary handed to the chat collaborator. Holds no hourly arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDigest {
    pub physician_count: usize,
    pub total_discharges: u64,
    pub avg_morning_rate: f64,
    pub peak_hour: usize,
    pub top_performers: Vec<RankedPhysician>,
}

pub fn build_context(physicians: &[PhysicianStats], metrics: &HospitalMetrics) -> ContextDigest {
    ContextDigest {
        physician_count: physicians.len(),
        total_discharges: metrics.total_discharges,
        avg_morning_rate: metrics.percent_before_noon,
        peak_hour: metrics.peak_hour,
        top_performers: top_performers(physicians, TOP_PERFORMER_LIMIT)
            .into_iter()
            .map(|phy| RankedPhysician {
                name: phy.name.clone(),
                morning_rate: phy.percent_before_noon,
            })
            .collect(),
    }
}

impl ContextDigest {
    pub fn top_performer_lines(&self) -> String {
        self.top_performers
            .iter()
            .map(|p| format!("- {}: {:.1}%", p.name, p.morning_rate))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ContextDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Context")?;
        writeln!(f, "- Physicians: {}", self.physician_count)?;
        writeln!(
            f,
            "- Total discharges: {}",
            group_thousands(self.total_discharges)
        )?;
        writeln!(f, "- Avg morning discharge rate: {:.1}%", self.avg_morning_rate)?;
        writeln!(f, "- Peak discharge hour: {}:00", self.peak_hour)?;
        write!(f, "- Top performers:")?;
        if !self.top_performers.is_empty() {
            write!(f, "\n{}", self.top_performer_lines())?;
        }
        Ok(())
    }
}

/// `12345` becomes `12,345`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
