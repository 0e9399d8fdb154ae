//! Year Partitioning Service
//!
//! Splits a vacancy dataset into one CSV per publication year
//! (`chunk_{year}.csv`). The partitions are the work queue of the year tasks.

use crate::constants::{csv_column, PARTITION_COLUMNS, PARTITION_FILE_PREFIX};
use crate::error::{Error, Result};
use crate::models::{parse_year, RowPolicy};
use crate::services::dataset::RawDataset;
use csv::StringRecord;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Files written by one partitioning run
#[derive(Debug, Clone, Default)]
pub struct PartitionSummary {
    /// Year -> partition file
    pub files: BTreeMap<i32, PathBuf>,
    /// Year -> rows written
    pub row_counts: BTreeMap<i32, usize>,
    /// Rows rejected by the row policy while reading the source
    pub dropped: usize,
}

impl PartitionSummary {
    pub fn total_rows(&self) -> usize {
        self.row_counts.values().sum()
    }
}

/// Partition file path for a year
pub fn partition_path(dir: &Path, year: i32) -> PathBuf {
    dir.join(format!("{}{}.csv", PARTITION_FILE_PREFIX, year))
}

/// Read `source` and write its year partitions into `out_dir`
pub fn partition_file(source: &Path, out_dir: &Path, policy: RowPolicy) -> Result<PartitionSummary> {
    let dataset = RawDataset::read(source, policy)?;
    write_partitions(&dataset, out_dir)
}

/// Write one CSV per publication year, keeping only the leading columns
///
/// Rows keep their input order within a year. Existing partition files are
/// overwritten. A malformed publication date aborts before anything is written.
pub fn write_partitions(dataset: &RawDataset, out_dir: &Path) -> Result<PartitionSummary> {
    let date_idx = dataset.column(csv_column::PUBLISHED_AT)?;

    let mut by_year: BTreeMap<i32, Vec<&StringRecord>> = BTreeMap::new();
    for row in &dataset.rows {
        let year = parse_year(row.get(date_idx).unwrap_or(""))?;
        by_year.entry(year).or_default().push(row);
    }

    fs::create_dir_all(out_dir)
        .map_err(|e| Error::Io(format!("Failed to create {}: {}", out_dir.display(), e)))?;

    let header = leading_columns(&dataset.headers);
    let mut summary = PartitionSummary {
        dropped: dataset.dropped,
        ..PartitionSummary::default()
    };

    for (year, rows) in by_year {
        let path = partition_path(out_dir, year);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&header)?;
        for row in &rows {
            writer.write_record(&leading_columns(row))?;
        }
        writer.flush()?;

        info!(year, rows = rows.len(), path = %path.display(), "Wrote year partition");
        summary.row_counts.insert(year, rows.len());
        summary.files.insert(year, path);
    }

    Ok(summary)
}

/// Discover existing `chunk_{year}.csv` files in a directory
pub fn list_partitions(dir: &Path) -> Result<BTreeMap<i32, PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| Error::NotFound(format!("Partition directory {}: {}", dir.display(), e)))?;

    let mut partitions = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::Io(format!("Failed to read entry: {}", e)))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let year = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(PARTITION_FILE_PREFIX))
            .and_then(|n| n.strip_suffix(".csv"))
            .and_then(|n| n.parse::<i32>().ok());

        if let Some(year) = year {
            partitions.insert(year, path);
        }
    }

    Ok(partitions)
}

fn leading_columns(record: &StringRecord) -> Vec<&str> {
    record.iter().take(PARTITION_COLUMNS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SOURCE: &str = "\
name,salary_from,salary_to,salary_currency,area_name,published_at,extra
Developer,10000,20000,RUR,Moscow,2021-03-01T10:00:00+0300,x
Tester,20000,30000,RUR,Kazan,2022-03-01T10:00:00+0300,y
Analyst,30000,40000,RUR,Moscow,2021-05-01T10:00:00+0300,z
Short,1,2
";

    fn source_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_partitions_round_trip_row_set() {
        let source = source_file(SOURCE);
        let out = tempfile::tempdir().unwrap();

        let summary = partition_file(source.path(), out.path(), RowPolicy::Lenient).unwrap();
        assert_eq!(summary.files.keys().copied().collect::<Vec<_>>(), vec![2021, 2022]);
        assert_eq!(summary.total_rows(), 3);
        assert_eq!(summary.dropped, 1);

        let mut rebuilt: Vec<Vec<String>> = summary
            .files
            .values()
            .flat_map(|path| read_rows(path))
            .collect();
        rebuilt.sort();

        let mut original: Vec<Vec<String>> = read_rows_flexible(source.path())
            .into_iter()
            .filter(|row| row.len() == 7)
            .map(|row| row.into_iter().take(PARTITION_COLUMNS).collect())
            .collect();
        original.sort();

        assert_eq!(rebuilt, original);
    }

    fn read_rows_flexible(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path).unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_partition_keeps_six_columns_and_order() {
        let source = source_file(SOURCE);
        let out = tempfile::tempdir().unwrap();
        partition_file(source.path(), out.path(), RowPolicy::Lenient).unwrap();

        let path = partition_path(out.path(), 2021);
        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), PARTITION_COLUMNS);

        let rows = read_rows(&path);
        assert_eq!(rows[0][0], "Developer");
        assert_eq!(rows[1][0], "Analyst");
    }

    #[test]
    fn test_malformed_date_aborts() {
        let source = source_file(
            "name,salary_from,salary_to,salary_currency,area_name,published_at\n\
             Developer,1,2,RUR,Moscow,unknown\n",
        );
        let out = tempfile::tempdir().unwrap();

        let result = partition_file(source.path(), out.path(), RowPolicy::Lenient);
        assert!(matches!(result, Err(Error::Parse(_))));
        assert!(list_partitions(out.path()).unwrap().is_empty());
    }

    #[test]
    fn test_list_partitions_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("chunk_2019.csv"), "h\n").unwrap();
        fs::write(dir.path().join("chunk_2020.csv"), "h\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("chunk_abc.csv"), "").unwrap();

        let partitions = list_partitions(dir.path()).unwrap();
        assert_eq!(partitions.keys().copied().collect::<Vec<_>>(), vec![2019, 2020]);
    }
}
