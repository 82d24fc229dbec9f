use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::expenses::entry::Entry;
use crate::expenses::LedgerError;

/// Header of the ledger file. `Ammount` is kept as spelled by existing files.
pub const HEADER: [&str; 4] = ["Ammount", "Date", "Category", "Notes"];

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryRecord {
    #[serde(rename = "Ammount", with = "amount_format")]
    pub amount: Decimal,
    #[serde(rename = "Date", with = "timestamp_format")]
    pub date: NaiveDateTime,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Notes", default)]
    pub notes: String,
}

impl From<&Entry> for EntryRecord {
    fn from(entry: &Entry) -> Self {
        EntryRecord {
            amount: *entry.amount(),
            date: *entry.timestamp(),
            category: entry.category().clone(),
            notes: entry.notes().clone(),
        }
    }
}

impl From<EntryRecord> for Entry {
    fn from(record: EntryRecord) -> Self {
        Entry::new(record.amount, record.date, record.category, record.notes)
    }
}

/// Reads the amount from its text so no digits or trailing zeros are lost.
mod amount_format {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let text = String::deserialize(deserializer)?;
        Decimal::from_str(text.trim()).map_err(de::Error::custom)
    }
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::expenses::entry::{parse_timestamp, TIMESTAMP_FORMAT};

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(&text).map_err(de::Error::custom)
    }
}

/// Reads a whole ledger file. Any malformed row fails the entire load so a
/// partially parsed file never passes for a complete one.
pub fn load_csv(path: &Path) -> Result<Vec<Entry>, LedgerError> {
    let file = File::open(path)?;
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(file);

    let headers = csv_reader.headers()?;
    if !headers.iter().eq(HEADER) {
        return Err(LedgerError::SchemaMismatch(headers.iter().map(String::from).collect()));
    }

    let mut entries = Vec::new();
    for record in csv_reader.deserialize::<EntryRecord>() {
        entries.push(record?.into());
    }

    Ok(entries)
}

/// Writes the ledger to a sibling temp file, syncs it, then renames it over
/// `path`. The previous file stays intact if any step fails.
pub fn export_csv(path: &Path, entries: &[Entry]) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("csv.tmp");
    if let Err(err) = write_csv(&temp_path, entries) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    debug!("replaced ledger file, path={}", path.display());

    Ok(())
}

fn write_csv(path: &Path, entries: &[Entry]) -> Result<(), LedgerError> {
    let file = File::create(path)?;
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(BufWriter::new(file));

    // Written by hand so an empty ledger still carries its columns.
    csv_writer.write_record(HEADER)?;
    for entry in entries {
        let record: EntryRecord = entry.into();
        csv_writer.serialize(record)?;
    }

    let mut writer = csv_writer.into_inner().map_err(|err| err.into_error())?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    Ok(())
}

/// Writes a `Category,Total` summary.
pub fn export_summary<W: Write>(summary: &[(&str, Decimal)], writer: W) -> Result<(), LedgerError> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(["Category", "Total"])?;
    for (category, total) in summary {
        csv_writer.write_record([category.to_string(), total.to_string()])?;
    }

    csv_writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use super::*;
    use crate::expenses::entry::parse_timestamp;

    fn entry(amount: Decimal, date: &str, category: &str, notes: &str) -> Result<Entry> {
        Ok(Entry::new(amount, parse_timestamp(date)?, category, notes))
    }

    #[test]
    fn test_export_writes_header_and_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");

        export_csv(&path, &[entry(dec!(50.0), "2024-01-01 10:00:00", "Food", "lunch")?])?;

        assert_eq!(
            fs::read_to_string(&path)?,
            "Ammount,Date,Category,Notes\n50.0,2024-01-01 10:00:00,Food,lunch\n"
        );

        Ok(())
    }

    #[test]
    fn test_export_empty_ledger_keeps_header() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");

        export_csv(&path, &[])?;

        assert_eq!(fs::read_to_string(&path)?, "Ammount,Date,Category,Notes\n");
        assert_eq!(load_csv(&path)?.len(), 0);

        Ok(())
    }

    #[test]
    fn test_export_quotes_delimiters() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");
        let original = entry(dec!(12.5), "2024-03-04 05:06:07", "Food, drinks", "said \"hi\"\nthen left")?;

        export_csv(&path, std::slice::from_ref(&original))?;

        assert_eq!(load_csv(&path)?, vec![original]);

        Ok(())
    }

    #[test]
    fn test_export_leaves_no_temp_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");

        export_csv(&path, &[entry(dec!(1), "2024-01-01", "Other", "")?])?;

        assert!(path.exists());
        assert!(!dir.path().join("data.csv.tmp").exists());

        Ok(())
    }

    #[test]
    fn test_export_creates_parent_directories() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("ledger").join("data.csv");

        export_csv(&path, &[])?;

        assert!(path.exists());

        Ok(())
    }

    #[test]
    fn test_export_into_directory_fails() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("taken");
        fs::create_dir(&path)?;

        assert!(export_csv(&path, &[]).is_err());

        Ok(())
    }

    #[test]
    fn test_failed_export_keeps_previous_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");
        export_csv(&path, &[entry(dec!(50.0), "2024-01-01 10:00:00", "Food", "lunch")?])?;
        let before = fs::read_to_string(&path)?;

        fs::create_dir(dir.path().join("data.csv.tmp"))?;
        let result = export_csv(&path, &[entry(dec!(20.0), "2024-01-02 09:00:00", "Transport", "")?]);

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path)?, before);

        Ok(())
    }

    #[test]
    fn test_amounts_keep_precision_and_scale() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");
        let amounts = [dec!(1234567890.123456789), dec!(99999999999999.99), dec!(12.30)];
        let entries = amounts
            .iter()
            .map(|amount| entry(*amount, "2024-01-01 10:00:00", "Food", ""))
            .collect::<Result<Vec<_>>>()?;

        export_csv(&path, &entries)?;
        let loaded = load_csv(&path)?;

        let loaded_amounts: Vec<String> = loaded.iter().map(|entry| entry.amount().to_string()).collect();
        assert_eq!(loaded_amounts, vec!["1234567890.123456789", "99999999999999.99", "12.30"]);
        assert_eq!(
            loaded.iter().map(|entry| *entry.amount()).sum::<Decimal>(),
            amounts.iter().copied().sum::<Decimal>()
        );

        Ok(())
    }

    #[test]
    fn test_load_rejects_non_numeric_amount() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");
        fs::write(&path, "Ammount,Date,Category,Notes\n$12,2024-01-02 09:00:00,Transport,\n")?;

        assert!(load_csv(&path).is_err());

        Ok(())
    }

    #[test]
    fn test_load_keeps_whitespace_in_fields() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");
        fs::write(&path, "Ammount,Date,Category,Notes\n7.25,2024-02-02 08:30:00,Transport, bus fare \n")?;

        let entries = load_csv(&path)?;

        assert_eq!(entries, vec![entry(dec!(7.25), "2024-02-02 08:30:00", "Transport", " bus fare ")?]);

        Ok(())
    }

    #[test]
    fn test_load_accepts_missing_notes() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");
        fs::write(&path, "Ammount,Date,Category,Notes\n20.0,2024-01-02 09:00:00,Transport,\n")?;

        let entries = load_csv(&path)?;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].notes(), "");

        Ok(())
    }

    #[test]
    fn test_load_rejects_unknown_header() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");
        fs::write(&path, "Amount,Date,Category,Notes\n20.0,2024-01-02 09:00:00,Transport,\n")?;

        match load_csv(&path) {
            Err(LedgerError::SchemaMismatch(columns)) => assert_eq!(columns[0], "Amount"),
            other => panic!("expected schema mismatch, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_load_rejects_bad_row() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("data.csv");
        fs::write(
            &path,
            "Ammount,Date,Category,Notes\n20.0,2024-01-02 09:00:00,Transport,\nabc,yesterday,Food,\n",
        )?;

        assert!(load_csv(&path).is_err());

        Ok(())
    }

    #[test]
    fn test_summary_output() -> Result<()> {
        let mut out = Vec::new();

        export_summary(&[("Food", dec!(50.0)), ("Transport", dec!(20))], &mut out)?;

        assert_eq!(String::from_utf8(out)?, "Category,Total\nFood,50.0\nTransport,20\n");

        Ok(())
    }
}
