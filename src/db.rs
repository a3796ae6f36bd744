use anyhow::Context;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::dataset;
use crate::models::HourlyDischargeRecord;

pub async fn connect(max_connections: u32) -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set, or pass --dataset to read a CSV file")?;

    sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<u64> {
    let mut inserted = 0;
    for (source_key, record) in dataset::seed_records() {
        inserted += insert_record(pool, source_key, &record).await?;
    }
    Ok(inserted)
}

/// Imports every row of a CSV file. Repeated names become separate rows.
pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<u64> {
    let records = dataset::load_csv(csv_path)?;
    let batch = Utc::now().format("%Y%m%d%H%M%S").to_string();
    let mut inserted = 0;

    for (index, record) in records.iter().enumerate() {
        let source_key = format!("import-{batch}-{index}-{}", Uuid::new_v4());
        inserted += insert_record(pool, &source_key, record).await?;
    }

    info!(path = %csv_path.display(), inserted, "imported physicians");
    Ok(inserted)
}

async fn insert_record(
    pool: &PgPool,
    source_key: &str,
    record: &HourlyDischargeRecord,
) -> anyhow::Result<u64> {
    let discharges = record
        .discharges
        .iter()
        .map(|&count| i32::try_from(count))
        .collect::<Result<Vec<i32>, _>>()
        .with_context(|| format!("discharge count too large for {:?}", record.name))?;

    let result = sqlx::query(
        r#"
        INSERT INTO discharge_insights.physician_hours
        (id, source_key, name, discharges, imported_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(source_key)
    .bind(&record.name)
    .bind(discharges)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    debug!(source_key, rows = result.rows_affected(), "insert physician");
    Ok(result.rows_affected())
}

/// Loads all physicians in insertion order.
pub async fn fetch_records(pool: &PgPool) -> anyhow::Result<Vec<HourlyDischargeRecord>> {
    let rows = sqlx::query(
        "SELECT name, discharges FROM discharge_insights.physician_hours ORDER BY position",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let name: String = row.get("name");
        let discharges: Vec<i32> = row.get("discharges");
        let counts: Vec<i64> = discharges.into_iter().map(i64::from).collect();
        records.push(HourlyDischargeRecord::from_signed(name, &counts)?);
    }

    info!(physicians = records.len(), "loaded dataset from Postgres");
    Ok(records)
}
