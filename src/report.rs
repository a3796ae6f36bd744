use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::context::{group_thousands, TOP_PERFORMER_LIMIT};
use crate::metrics::{format_hour, mean_morning_rate, window_rate};
use crate::models::{HospitalMetrics, PhysicianStats, OPTIMAL_WINDOW};
use crate::ranking::{tier_breakdown, top_performers, Indicator, PerformanceTier};

/// Hours `[6, 12)` count toward the early discharge rate.
const EARLY_WINDOW: std::ops::Range<usize> = 6..12;

pub fn build_report(
    source: &str,
    generated_at: DateTime<Utc>,
    physicians: &[PhysicianStats],
    metrics: &HospitalMetrics,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Physician Discharge Timing Report");
    let _ = writeln!(
        output,
        "Generated from {} at {}",
        source,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Hospital Overview");

    if physicians.is_empty() {
        let _ = writeln!(output, "No physicians in this dataset.");
        return output;
    }

    let _ = writeln!(output, "- Physicians: {}", physicians.len());
    let _ = writeln!(
        output,
        "- Total discharges: {}",
        group_thousands(metrics.total_discharges)
    );
    let _ = writeln!(
        output,
        "- Discharged before noon: {:.1}%",
        metrics.percent_before_noon
    );
    let _ = writeln!(
        output,
        "- Early discharges (6:00-12:00): {:.1}%",
        window_rate(metrics, EARLY_WINDOW)
    );
    let _ = writeln!(
        output,
        "- Average discharge time: {}",
        format_hour(metrics.avg_discharge_time)
    );
    let _ = writeln!(output, "- Peak hour: {}:00", metrics.peak_hour);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Hourly Distribution");
    let _ = writeln!(output, "| Hour | Discharges | Optimal window |");
    let _ = writeln!(output, "|---|---:|:---:|");
    for (hour, total) in metrics.hourly_totals.iter().enumerate() {
        let marker = if OPTIMAL_WINDOW.contains(&hour) { "yes" } else { "" };
        let _ = writeln!(output, "| {hour}:00 | {total} | {marker} |");
    }

    let tiers = tier_breakdown(physicians);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Performance Tiers");
    for (tier, members) in [
        (PerformanceTier::Excellent, &tiers.excellent),
        (PerformanceTier::Good, &tiers.good),
        (PerformanceTier::NeedsFocus, &tiers.needs_focus),
    ] {
        let _ = writeln!(output, "- {}: {} physicians", tier.label(), members.len());
    }
    let _ = writeln!(
        output,
        "- Potential gain if all reach 40%: {:.0} morning discharges",
        tiers.potential_gain()
    );

    let mean_rate = mean_morning_rate(physicians);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Performers");
    for phy in top_performers(physicians, TOP_PERFORMER_LIMIT) {
        let _ = writeln!(
            output,
            "- {}: {:.1}% before noon across {} discharges (avg {}, peak {}:00, {})",
            phy.name,
            phy.percent_before_noon,
            phy.total,
            format_hour(phy.average_discharge_time),
            phy.peak_hour,
            Indicator::relative_to(phy.percent_before_noon, mean_rate).label()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Needs Focus");
    if tiers.needs_focus.is_empty() {
        let _ = writeln!(output, "Every physician discharges at least 40% before noon.");
    } else {
        for phy in &tiers.needs_focus {
            let _ = writeln!(
                output,
                "- {}: {:.1}% ({} morning / {} afternoon)",
                phy.name,
                phy.percent_before_noon,
                phy.discharges_before_noon,
                phy.discharges_after_noon()
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{calculate_overall_metrics, process_physicians};
    use crate::models::HourlyDischargeRecord;
    use chrono::TimeZone;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn report_covers_all_sections() {
        let mut early = vec![0u32; 24];
        early[7] = 2;
        early[8] = 3;
        let mut late = vec![0u32; 24];
        late[15] = 5;
        let physicians = process_physicians(&[
            HourlyDischargeRecord::new("Dr. Early", early).unwrap(),
            HourlyDischargeRecord::new("Dr. Late", late).unwrap(),
        ]);
        let metrics = calculate_overall_metrics(&physicians);
        let report = build_report("seed.csv", generated_at(), &physicians, &metrics);

        assert!(report.contains("Generated from seed.csv at 2026-02-02 09:30 UTC"));
        assert!(report.contains("- Total discharges: 10"));
        assert!(report.contains("- Discharged before noon: 50.0%"));
        assert!(report.contains("- Early discharges (6:00-12:00): 50.0%"));
        assert!(report.contains("| 8:00 | 3 | yes |"));
        assert!(report.contains("| 15:00 | 5 |  |"));
        assert!(report.contains("- Excellent (50%+): 1 physicians"));
        assert!(report.contains("- Potential gain if all reach 40%: 2 morning discharges"));
        assert!(report.contains("- Dr. Early: 100.0% before noon"));
        assert!(report.contains("- Dr. Late: 0.0% (0 morning / 5 afternoon)"));
    }

    #[test]
    fn empty_dataset_report() {
        let metrics = calculate_overall_metrics(&[]);
        let report = build_report("postgres", generated_at(), &[], &metrics);
        assert!(report.ends_with("No physicians in this dataset.\n"));
    }
}
