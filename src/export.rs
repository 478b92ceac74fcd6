//! Writing scraped listings to disk.

use crate::models::ListingRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::ValueEnum;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
const FILE_PREFIX: &str = "airbnb_listings";
const SHEET_NAME: &str = "Listings";

/// Column order shared by the CSV header and the spreadsheet
pub const COLUMNS: [&str; 6] = [
    "name",
    "price",
    "original_price",
    "location",
    "url",
    "city",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
    /// CSV and spreadsheet
    Both,
    /// CSV, spreadsheet and JSON
    All,
}

impl ExportFormat {
    fn extensions(self) -> &'static [&'static str] {
        match self {
            ExportFormat::Csv => &["csv"],
            ExportFormat::Xlsx => &["xlsx"],
            ExportFormat::Json => &["json"],
            ExportFormat::Both => &["csv", "xlsx"],
            ExportFormat::All => &["csv", "xlsx", "json"],
        }
    }
}

/// `airbnb_listings_20240131_142501.csv` style name for a run finished at `now`
pub fn timestamped_filename(extension: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.{}", FILE_PREFIX, now.format("%Y%m%d_%H%M%S"), extension)
}

pub fn to_csv(records: &[ListingRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV output: {}", e.error()))
}

/// Single-sheet workbook with a bold header row.
///
/// A missing original price is left as a blank cell.
pub fn to_xlsx(records: &[ListingRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet().set_name(SHEET_NAME)?;

    for (col, title) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, title, &header)?;
    }
    for (row, record) in (1u32..).zip(records) {
        let cells = [
            Some(&record.name),
            Some(&record.price),
            record.original_price.as_ref(),
            Some(&record.location),
            Some(&record.url),
            Some(&record.city),
        ];
        for (col, cell) in (0u16..).zip(cells) {
            if let Some(value) = cell {
                sheet.write_string(row, col, value.as_str())?;
            }
        }
    }
    sheet.autofit();

    workbook
        .save_to_buffer()
        .context("Failed to build spreadsheet")
}

pub async fn write_csv(records: &[ListingRecord], path: &Path) -> Result<()> {
    let bytes = to_csv(records)?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Saved {} listings to {}", records.len(), path.display());
    Ok(())
}

pub async fn write_json(records: &[ListingRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Saved {} listings to {}", records.len(), path.display());
    Ok(())
}

pub async fn write_xlsx(records: &[ListingRecord], path: &Path) -> Result<()> {
    let bytes = to_xlsx(records)?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Saved {} listings to {}", records.len(), path.display());
    Ok(())
}

/// Write `records` in every requested format.
///
/// With `stem` the files are `stem.csv`, `stem.xlsx` and so on; otherwise timestamped
/// names under `dir`. Returns the paths written.
pub async fn export(
    records: &[ListingRecord],
    format: ExportFormat,
    dir: &Path,
    stem: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let now = Local::now();
    let mut written = Vec::new();

    for extension in format.extensions() {
        let path = match stem {
            Some(stem) => stem.with_extension(extension),
            None => dir.join(timestamped_filename(extension, now)),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        match *extension {
            "csv" => write_csv(records, &path).await?,
            "xlsx" => write_xlsx(records, &path).await?,
            _ => write_json(records, &path).await?,
        }
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Reader, Xlsx};
    use chrono::TimeZone;

    fn records() -> Vec<ListingRecord> {
        vec![
            ListingRecord {
                name: "Loft — Downtown, near park".to_string(),
                price: "£95".to_string(),
                original_price: Some("£120".to_string()),
                location: "Austin".to_string(),
                url: "https://www.airbnb.com/rooms/1".to_string(),
                city: "Austin, TX".to_string(),
            },
            ListingRecord {
                name: "Bungalow".to_string(),
                price: "$80".to_string(),
                original_price: None,
                location: "Austin, TX".to_string(),
                url: "N/A".to_string(),
                city: "Austin, TX".to_string(),
            },
        ]
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stay-scout-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_timestamped_filename() {
        let now = Local.with_ymd_and_hms(2024, 1, 31, 14, 25, 1).unwrap();
        assert_eq!(
            timestamped_filename("csv", now),
            "airbnb_listings_20240131_142501.csv"
        );
    }

    #[test]
    fn test_to_csv() {
        let csv = String::from_utf8(to_csv(&records()).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(COLUMNS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("\"Loft — Downtown, near park\",£95,£120,Austin,https://www.airbnb.com/rooms/1,\"Austin, TX\"")
        );
        assert_eq!(lines.next(), Some("Bungalow,$80,,\"Austin, TX\",N/A,\"Austin, TX\""));
    }

    #[tokio::test]
    async fn test_export_both_formats() {
        let dir = scratch_dir("both");
        let written = export(&records(), ExportFormat::Both, &dir, None)
            .await
            .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(written[0].extension().unwrap(), "csv");
        assert_eq!(written[1].extension().unwrap(), "xlsx");
        assert!(written.iter().all(|p| p.exists()));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_export_all_formats_round_trip_json() {
        let dir = scratch_dir("all");
        let written = export(&records(), ExportFormat::All, &dir, None)
            .await
            .unwrap();

        let extensions: Vec<_> = written
            .iter()
            .map(|p| p.extension().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(extensions, vec!["csv", "xlsx", "json"]);

        let json = std::fs::read_to_string(&written[2]).unwrap();
        let parsed: Vec<ListingRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_xlsx_matches_csv_layout() {
        let dir = scratch_dir("xlsx");
        let path = dir.join("listings.xlsx");
        std::fs::create_dir_all(&dir).unwrap();
        write_xlsx(&records(), &path).await.unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], COLUMNS);
        assert_eq!(
            rows[1],
            vec![
                "Loft — Downtown, near park",
                "£95",
                "£120",
                "Austin",
                "https://www.airbnb.com/rooms/1",
                "Austin, TX",
            ]
        );
        assert_eq!(
            rows[2],
            vec!["Bungalow", "$80", "", "Austin, TX", "N/A", "Austin, TX"]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_export_to_explicit_stem() {
        let dir = scratch_dir("stem");
        let stem = dir.join("nested").join("my_run");
        let written = export(
            &records(),
            ExportFormat::Csv,
            Path::new("unused"),
            Some(stem.as_path()),
        )
        .await
        .unwrap();

        assert_eq!(written, vec![dir.join("nested").join("my_run.csv")]);
        assert!(written[0].exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
