use std::io::Write;

use crate::models::{PhysicianStats, HOURS_PER_DAY};

pub const DEFAULT_EXPORT_NAME: &str = "physician_performance.csv";

/// Writes one row per physician: name, `h0..h23`, total, morning rate, and
/// average hour. Text fields are always quoted, numbers never are.
pub fn write_csv<W: Write>(physicians: &[PhysicianStats], out: W) -> anyhow::Result<()> {
    // Text cells arrive already quoted by `quote_text`.
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(out);

    let mut header = vec![quote_text("physician")];
    header.extend((0..HOURS_PER_DAY).map(|hour| quote_text(&format!("h{hour}"))));
    header.extend(
        ["total", "percentBeforeNoon", "averageDischargeHour"]
            .iter()
            .map(|s| quote_text(s)),
    );
    writer.write_record(&header)?;

    for phy in physicians {
        let mut row = Vec::with_capacity(HOURS_PER_DAY + 4);
        row.push(quote_text(&phy.name));
        row.extend(phy.discharges.iter().map(u32::to_string));
        row.push(phy.total.to_string());
        row.push(two_decimals(phy.percent_before_noon));
        row.push(two_decimals(phy.average_discharge_time));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Wraps a text cell in quotes and doubles any embedded quote.
fn quote_text(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Rounds to two places and drops trailing zeros (`66.666` -> `66.67`, `100.0` -> `100`).
fn two_decimals(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::read_csv;
    use crate::metrics::process_physicians;
    use crate::models::HourlyDischargeRecord;

    fn to_csv_string(physicians: &[PhysicianStats]) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        write_csv(physicians, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn physicians() -> Vec<PhysicianStats> {
        let mut discharges = vec![0u32; 24];
        discharges[9] = 2;
        discharges[14] = 1;
        process_physicians(&[HourlyDischargeRecord::new("Dr. \"Doc\" Ames", discharges).unwrap()])
    }

    #[test]
    fn header_lists_every_hour() {
        let csv = to_csv_string(&[]).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.starts_with("\"physician\",\"h0\",\"h1\""));
        assert!(header.ends_with("\"h23\",\"total\",\"percentBeforeNoon\",\"averageDischargeHour\""));
        assert_eq!(header.split(',').count(), 28);
    }

    #[test]
    fn escapes_quotes_and_rounds_numbers() {
        let csv = to_csv_string(&physicians()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"Dr. \"\"Doc\"\" Ames\",0,0"));
        // total 3, 66.666..% before noon, (2 * 9.5 + 14.5) / 3 = 11.1666..
        assert!(row.ends_with(",3,66.67,11.17"));
    }

    #[test]
    fn digit_only_names_stay_quoted() {
        let mut discharges = vec![0u32; 24];
        discharges[10] = 1;
        let physicians =
            process_physicians(&[HourlyDischargeRecord::new("12345", discharges).unwrap()]);
        let csv = to_csv_string(&physicians).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"12345\",0,"));
        assert!(row.ends_with(",1,100,10.5"));
        assert_eq!(read_csv(csv.as_bytes()).unwrap()[0].name, "12345");
    }

    #[test]
    fn whole_numbers_drop_decimals() {
        assert_eq!(two_decimals(100.0), "100");
        assert_eq!(two_decimals(7.8), "7.8");
        assert_eq!(two_decimals(0.0), "0");
    }

    #[test]
    fn exported_file_reads_back() {
        let exported = physicians();
        let csv = to_csv_string(&exported).unwrap();
        let records = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(records[0].name, exported[0].name);
        assert_eq!(records[0].discharges, exported[0].discharges);
    }
}
