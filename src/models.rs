use serde::Serialize;

pub const HOURS_PER_DAY: usize = 24;
/// Hours `[0, NOON)` count as morning discharges.
pub const NOON: usize = 12;
/// Reporting convention for the target discharge window, `[8, 12)`.
pub const OPTIMAL_WINDOW: std::ops::Range<usize> = 8..12;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("physician {name:?} has {len} hourly values, expected 24")]
    WrongLength { name: String, len: usize },
    #[error("physician {name:?} has invalid count {value:?} at hour {hour}")]
    InvalidCount {
        name: String,
        hour: usize,
        value: String,
    },
}

/// Raw per-physician discharge counts, one slot per hour of the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyDischargeRecord {
    pub name: String,
    pub discharges: [u32; HOURS_PER_DAY],
}

impl HourlyDischargeRecord {
    pub fn new(name: impl Into<String>, discharges: Vec<u32>) -> Result<Self, RecordError> {
        let name = name.into();
        let len = discharges.len();
        let discharges: [u32; HOURS_PER_DAY] = discharges
            .try_into()
            .map_err(|_| RecordError::WrongLength {
                name: name.clone(),
                len,
            })?;
        Ok(Self { name, discharges })
    }

    /// Builds a record from signed counts, rejecting negatives.
    pub fn from_signed(name: impl Into<String>, counts: &[i64]) -> Result<Self, RecordError> {
        let name = name.into();
        let mut discharges = Vec::with_capacity(counts.len());
        for (hour, value) in counts.iter().enumerate() {
            let count = u32::try_from(*value).map_err(|_| RecordError::InvalidCount {
                name: name.clone(),
                hour,
                value: value.to_string(),
            })?;
            discharges.push(count);
        }
        Self::new(name, discharges)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicianStats {
    pub name: String,
    pub discharges: [u32; HOURS_PER_DAY],
    pub total: u64,
    /// Midpoint-weighted mean hour. Zero when `total == 0`, which does not mean midnight.
    pub average_discharge_time: f64,
    pub peak_hour: usize,
    pub discharges_before_noon: u64,
    pub percent_before_noon: f64,
}

impl PhysicianStats {
    pub fn discharges_after_noon(&self) -> u64 {
        self.total - self.discharges_before_noon
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalMetrics {
    pub total_discharges: u64,
    pub avg_discharge_time: f64,
    pub percent_before_noon: f64,
    pub peak_hour: usize,
    pub hourly_totals: [u64; HOURS_PER_DAY],
}
