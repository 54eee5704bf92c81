use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::FeedbackRecord;

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    id: String,
    review_score: i64,
    network_type: String,
    ratings_count: u32,
}

/// The ten-record dataset the portal ships with.
pub fn sample_records() -> Vec<FeedbackRecord> {
    let rows: [(&str, i64, &str, u32); 10] = [
        ("1", 5, "WiFi", 24),
        ("2", 2, "5G", 8),
        ("3", 4, "LTE", 15),
        ("4", 3, "WiFi", 12),
        ("5", 1, "5G", 6),
        ("6", 5, "LTE", 31),
        ("7", 4, "WiFi", 19),
        ("8", 2, "LTE", 7),
        ("9", 5, "5G", 28),
        ("10", 3, "WiFi", 11),
    ];

    rows.into_iter()
        .filter_map(|(id, score, network, ratings)| {
            FeedbackRecord::new(id, score, network, ratings).ok()
        })
        .collect()
}

/// Reads records from a CSV file with an
/// `id,review_score,network_type,ratings_count` header. Any row with a score
/// outside 1-5 fails the whole load.
pub fn load_csv(csv_path: &Path) -> Result<Vec<FeedbackRecord>> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut records = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        records.push(FeedbackRecord::new(
            row.id,
            row.review_score,
            row.network_type,
            row.ratings_count,
        )?);
    }

    info!(path = %csv_path.display(), count = records.len(), "loaded feedback records");
    Ok(records)
}

pub fn write_csv(csv_path: &Path, records: &[FeedbackRecord]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(csv_path)?;

    for record in records {
        writer.serialize(CsvRow {
            id: record.id().to_string(),
            review_score: i64::from(record.review_score()),
            network_type: record.network_type().to_string(),
            ratings_count: record.ratings_count(),
        })?;
    }
    writer.flush()?;

    debug!(path = %csv_path.display(), count = records.len(), "wrote feedback records");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::io::Write;

    #[test]
    fn sample_has_ten_valid_records() {
        let records = sample_records();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].id(), "1");
        assert_eq!(records[9].network_type(), "WiFi");
    }

    #[test]
    fn csv_written_by_seed_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let written = write_csv(&path, &sample_records()).unwrap();
        assert_eq!(written, 10);
        assert_eq!(load_csv(&path).unwrap(), sample_records());
    }

    #[test]
    fn invalid_score_rejects_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,review_score,network_type,ratings_count").unwrap();
        writeln!(file, "1,4,WiFi,3").unwrap();
        writeln!(file, "2,9,LTE,1").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            load_csv(file.path()),
            Err(EngineError::InvalidScore(9))
        ));
    }
}
