use crate::models::{HospitalMetrics, HourlyDischargeRecord, PhysicianStats, HOURS_PER_DAY, NOON};

pub fn derive_physician_stats(record: &HourlyDischargeRecord) -> PhysicianStats {
    let total: u64 = record.discharges.iter().map(|&count| u64::from(count)).sum();
    let weighted_sum: f64 = record
        .discharges
        .iter()
        .enumerate()
        .map(|(hour, &count)| f64::from(count) * (hour as f64 + 0.5))
        .sum();
    let discharges_before_noon: u64 = record.discharges[..NOON]
        .iter()
        .map(|&count| u64::from(count))
        .sum();

    PhysicianStats {
        name: record.name.clone(),
        discharges: record.discharges,
        total,
        average_discharge_time: ratio(weighted_sum, total),
        peak_hour: peak_index(&record.discharges),
        discharges_before_noon,
        percent_before_noon: ratio(discharges_before_noon as f64, total) * 100.0,
    }
}

/// Derives stats for every record, keeping input order and duplicate names.
pub fn process_physicians(records: &[HourlyDischargeRecord]) -> Vec<PhysicianStats> {
    records.iter().map(derive_physician_stats).collect()
}

pub fn calculate_overall_metrics(physicians: &[PhysicianStats]) -> HospitalMetrics {
    let total_discharges: u64 = physicians.iter().map(|phy| phy.total).sum();
    let weighted_time: f64 = physicians
        .iter()
        .map(|phy| phy.average_discharge_time * phy.total as f64)
        .sum();
    let total_before_noon: u64 = physicians.iter().map(|phy| phy.discharges_before_noon).sum();

    let mut hourly_totals = [0u64; HOURS_PER_DAY];
    for phy in physicians {
        for (slot, &count) in hourly_totals.iter_mut().zip(phy.discharges.iter()) {
            *slot += u64::from(count);
        }
    }

    HospitalMetrics {
        total_discharges,
        avg_discharge_time: ratio(weighted_time, total_discharges),
        percent_before_noon: ratio(total_before_noon as f64, total_discharges) * 100.0,
        peak_hour: peak_index(&hourly_totals),
        hourly_totals,
    }
}

/// Index of the first maximum; an all-zero or empty slice yields 0.
pub fn peak_index<T: PartialOrd + Copy>(values: &[T]) -> usize {
    let mut peak = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[peak] {
            peak = index;
        }
    }
    peak
}

/// Share of hospital discharges falling in `[start, end)`, as a percentage.
pub fn window_rate(metrics: &HospitalMetrics, window: std::ops::Range<usize>) -> f64 {
    let in_window: u64 = metrics.hourly_totals[window].iter().sum();
    ratio(in_window as f64, metrics.total_discharges) * 100.0
}

/// Unweighted mean of per-physician morning rates, as the dashboard table shows it.
pub fn mean_morning_rate(physicians: &[PhysicianStats]) -> f64 {
    if physicians.is_empty() {
        return 0.0;
    }
    physicians.iter().map(|phy| phy.percent_before_noon).sum::<f64>() / physicians.len() as f64
}

/// Renders a decimal hour as `H:MM`.
pub fn format_hour(hour: f64) -> String {
    let mut whole = hour.floor() as u32;
    let mut minutes = ((hour - hour.floor()) * 60.0).round() as u32;
    if minutes == 60 {
        whole += 1;
        minutes = 0;
    }
    format!("{whole}:{minutes:02}")
}

fn ratio(numerator: f64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}
