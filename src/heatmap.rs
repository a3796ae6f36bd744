use std::fmt::Write;

use serde::Serialize;

use crate::intensity::{ColorPair, IntensityTier};
use crate::models::{PhysicianStats, HOURS_PER_DAY, OPTIMAL_WINDOW};
use crate::ranking::top_performers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
    pub hour: usize,
    pub value: u32,
    pub tier: IntensityTier,
    pub colors: ColorPair,
    pub optimal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapRow {
    pub name: String,
    pub percent_before_noon: f64,
    pub cells: Vec<HeatmapCell>,
}

/// Scale ceiling shared by every cell: the single busiest physician-hour.
pub fn scale_max(physicians: &[PhysicianStats]) -> u64 {
    physicians
        .iter()
        .flat_map(|phy| phy.discharges.iter())
        .map(|&count| u64::from(count))
        .max()
        .unwrap_or(0)
}

/// Rows ordered by morning rate, best first.
pub fn build_heatmap(physicians: &[PhysicianStats]) -> Vec<HeatmapRow> {
    let max_value = scale_max(physicians);
    top_performers(physicians, physicians.len())
        .into_iter()
        .map(|phy| HeatmapRow {
            name: phy.name.clone(),
            percent_before_noon: phy.percent_before_noon,
            cells: phy
                .discharges
                .iter()
                .enumerate()
                .map(|(hour, &value)| {
                    let tier = IntensityTier::classify(u64::from(value), max_value);
                    HeatmapCell {
                        hour,
                        value,
                        tier,
                        colors: tier.colors(),
                        optimal: OPTIMAL_WINDOW.contains(&hour),
                    }
                })
                .collect(),
        })
        .collect()
}

pub fn render_heatmap(rows: &[HeatmapRow]) -> String {
    let width = rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Physician".len());
    let mut out = String::new();

    let _ = write!(out, "{:<width$} ", "Physician");
    for hour in 0..HOURS_PER_DAY {
        let _ = write!(out, "{:>2}", hour % 10);
    }
    let _ = writeln!(out, "  AM%");

    let _ = write!(out, "{:<width$} ", "");
    for hour in 0..HOURS_PER_DAY {
        let marker = if OPTIMAL_WINDOW.contains(&hour) { '^' } else { ' ' };
        let _ = write!(out, " {marker}");
    }
    let _ = writeln!(out);

    for row in rows {
        let _ = write!(out, "{:<width$} ", row.name);
        for cell in &row.cells {
            let _ = write!(out, " {}", cell.tier.glyph());
        }
        let _ = writeln!(out, "  {:.1}", row.percent_before_noon);
    }

    let _ = writeln!(
        out,
        "\nLegend: . none  ░ faint  ▒ light  ▓ medium  █ strong  # peak   ^ optimal window 8-12"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::process_physicians;
    use crate::models::HourlyDischargeRecord;

    fn physicians() -> Vec<PhysicianStats> {
        let mut late = vec![0u32; 24];
        late[15] = 16;
        late[16] = 1;
        let mut early = vec![0u32; 24];
        early[9] = 4;
        process_physicians(&[
            HourlyDischargeRecord::new("Dr. Late", late).unwrap(),
            HourlyDischargeRecord::new("Dr. Early", early).unwrap(),
        ])
    }

    #[test]
    fn cells_share_one_scale() {
        let rows = build_heatmap(&physicians());
        assert_eq!(rows[0].name, "Dr. Early");
        // sqrt(4 / 16) = 0.5
        assert_eq!(rows[0].cells[9].tier, IntensityTier::Medium);
        assert!(rows[0].cells[9].optimal);
        assert_eq!(rows[0].cells[0].tier, IntensityTier::Zero);
        assert_eq!(rows[1].cells[15].tier, IntensityTier::Peak);
        assert_eq!(rows[1].cells[15].colors.background, "#0f766e");
        // sqrt(1 / 16) = 0.25
        assert_eq!(rows[1].cells[16].tier, IntensityTier::Light);
    }

    #[test]
    fn empty_dataset_has_zero_scale() {
        assert_eq!(scale_max(&[]), 0);
        assert!(build_heatmap(&[]).is_empty());
    }

    #[test]
    fn renders_one_line_per_physician() {
        let text = render_heatmap(&build_heatmap(&physicians()));
        let early = text.lines().find(|l| l.starts_with("Dr. Early")).unwrap();
        assert!(early.contains('▓'));
        assert!(early.trim_end().ends_with("100.0"));
        assert!(text.contains("Legend"));
    }
}
