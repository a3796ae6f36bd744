use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use tracing::info;

use crate::models::{HourlyDischargeRecord, HOURS_PER_DAY};

/// Columns an exported file carries after `h23`. `read_csv` skips them.
const EXPORT_TRAILER: [&str; 3] = ["total", "percentBeforeNoon", "averageDischargeHour"];

/// Reads `physician,h0..h23` rows. The export's trailing summary columns are
/// accepted and ignored. Any other extra column is an error, and a row whose
/// hour count is not 24 fails with `RecordError::WrongLength`.
pub fn read_csv<R: Read>(reader: R) -> anyhow::Result<Vec<HourlyDischargeRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("failed to read CSV header")?.clone();
    let hour_columns = headers
        .iter()
        .skip(1)
        .enumerate()
        .take_while(|(hour, field)| *field == format!("h{hour}"))
        .count();
    let trailing: Vec<&str> = headers.iter().skip(1 + hour_columns).collect();
    if !EXPORT_TRAILER.starts_with(&trailing) {
        bail!(
            "unexpected CSV columns after h{}: {trailing:?}",
            hour_columns.saturating_sub(1)
        );
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("malformed CSV row {}", index + 2))?;
        let name = row.get(0).unwrap_or_default().to_string();
        // Rows wider than the header count every extra field as an hour.
        let hours = if row.len() > headers.len() {
            row.len() - 1 - trailing.len()
        } else {
            row.len().saturating_sub(1).min(hour_columns)
        };
        let counts = row
            .iter()
            .skip(1)
            .take(hours)
            .enumerate()
            .map(|(hour, field)| {
                field.parse::<i64>().with_context(|| {
                    format!("physician {name:?} hour {hour}: {field:?} is not a whole number")
                })
            })
            .collect::<anyhow::Result<Vec<i64>>>()?;
        records.push(HourlyDischargeRecord::from_signed(name, &counts)?);
    }

    Ok(records)
}

pub fn load_csv(path: &Path) -> anyhow::Result<Vec<HourlyDischargeRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?;
    let records = read_csv(file)?;
    info!(path = %path.display(), physicians = records.len(), "loaded dataset");
    Ok(records)
}

/// Small demonstration roster used by `seed`.
pub fn seed_records() -> Vec<(&'static str, HourlyDischargeRecord)> {
    const ROSTER: [(&str, &str, [u32; HOURS_PER_DAY]); 6] = [
        (
            "seed-001",
            "Dr. Avery Lee",
            [0, 0, 0, 0, 0, 0, 1, 3, 6, 8, 7, 5, 4, 3, 2, 2, 1, 1, 0, 0, 0, 0, 0, 0],
        ),
        (
            "seed-002",
            "Dr. Jules Moreno",
            [0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 6, 5, 3, 2, 1, 0, 0, 0, 0, 0],
        ),
        (
            "seed-003",
            "Dr. Kiara Patel",
            [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 2, 3, 5, 8, 9, 7, 4, 2, 1, 1, 0, 0, 0, 0],
        ),
        (
            "seed-004",
            "Dr. Noor Haddad",
            [1, 0, 0, 0, 0, 0, 2, 5, 9, 9, 6, 3, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0],
        ),
        (
            "seed-005",
            "Dr. Tomas \"Tom\" Reyes",
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 3, 4, 4, 5, 5, 6, 5, 3, 2, 1, 1, 0, 0, 0],
        ),
        (
            "seed-006",
            "Dr. Mei Tanaka",
            [0, 0, 0, 0, 0, 0, 0, 1, 4, 5, 5, 4, 3, 3, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0],
        ),
    ];

    ROSTER
        .iter()
        .map(|(key, name, discharges)| {
            (
                *key,
                HourlyDischargeRecord {
                    name: name.to_string(),
                    discharges: *discharges,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn header() -> String {
        let hours: Vec<String> = (0..HOURS_PER_DAY).map(|h| format!("h{h}")).collect();
        format!("physician,{}\n", hours.join(","))
    }

    fn row(name: &str, fill: u32) -> String {
        let counts: Vec<String> = (0..HOURS_PER_DAY).map(|_| fill.to_string()).collect();
        format!("{name},{}\n", counts.join(","))
    }

    #[test]
    fn reads_rows_in_order_with_duplicates() {
        let data = format!("{}{}{}{}", header(), row("Dr. A", 1), row("Dr. B", 0), row("Dr. A", 2));
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Dr. A");
        assert_eq!(records[2].discharges[0], 2);
    }

    #[test]
    fn ignores_trailing_export_columns() {
        let header = header().replace('\n', ",total,percentBeforeNoon,averageDischargeHour\n");
        let data = format!("{header}{}", row("\"Dr. \"\"Q\"\"\"", 1).replace('\n', ",24,0,12.5\n"));
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].name, "Dr. \"Q\"");
        assert_eq!(records[0].discharges.iter().sum::<u32>(), 24);
    }

    #[test]
    fn rejects_twenty_five_hour_rows() {
        let hours: Vec<String> = (0..25).map(|h| format!("h{h}")).collect();
        let ones = vec!["1"; 25].join(",");
        let data = format!("physician,{}\nDr. Long,{ones}\n", hours.join(","));
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("25 hourly values"));

        // Same row under a 24-hour header.
        let data = format!("{}Dr. Long,{ones}\n", header());
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("25 hourly values"));
    }

    #[test]
    fn rejects_unknown_trailing_columns() {
        let header = header().replace('\n', ",notes\n");
        let data = format!("{header}{}", row("Dr. A", 1).replace('\n', ",late\n"));
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("notes"));
    }

    #[test]
    fn rejects_short_rows() {
        let data = format!("{}Dr. Short,1,2,3\n", header());
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("3 hourly values"));
    }

    #[test]
    fn rejects_negative_and_non_numeric_counts() {
        let negative = format!("{}{}", header(), row("Dr. N", 1).replacen(",1", ",-1", 1));
        assert!(read_csv(negative.as_bytes()).is_err());
        let text = format!("{}{}", header(), row("Dr. T", 1).replacen(",1", ",x", 1));
        assert!(read_csv(text.as_bytes()).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}{}", header(), row("Dr. File", 3)).unwrap();
        let records = load_csv(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].discharges[23], 3);
    }

    #[test]
    fn seed_roster_is_well_formed() {
        let seeds = seed_records();
        assert_eq!(seeds.len(), 6);
        assert!(seeds.iter().all(|(_, r)| r.discharges.iter().sum::<u32>() > 0));
    }
}
