//! CSV reading and writing for outbreak tables.
//!
//! Both the upstream CDC feed and the local snapshot use the same column
//! layout. Headers are matched after trimming; extra columns are ignored.
//! A row that cannot be decoded at all is logged and skipped, while
//! malformed cells inside a decodable row fall back to the defaults in
//! [`flu_finder_outbreak_models`].

use std::io::{Read, Write};

use flu_finder_outbreak_models::{
    COL_COUNTY, COL_FLOCK_SIZE, COL_FLOCK_TYPE, COL_LATITUDE, COL_LONGITUDE, COL_OUTBREAK_DATE,
    COL_STATE, OutbreakRecord, OutbreakTable, REQUIRED_COLUMNS, RawOutbreakRow,
};

use crate::StoreError;

/// Column order used when writing a snapshot.
const SNAPSHOT_COLUMNS: &[&str] = &[
    COL_OUTBREAK_DATE,
    COL_STATE,
    COL_COUNTY,
    COL_FLOCK_SIZE,
    COL_FLOCK_TYPE,
    COL_LATITUDE,
    COL_LONGITUDE,
];

/// Parses an outbreak table from CSV bytes.
///
/// # Errors
///
/// Returns [`StoreError::MissingColumns`] if a required column is absent,
/// or [`StoreError::Csv`] if the header row cannot be read.
pub fn parse_outbreak_csv(bytes: &[u8]) -> Result<OutbreakTable, StoreError> {
    parse_outbreak_reader(bytes)
}

/// Parses an outbreak table from any CSV reader.
///
/// # Errors
///
/// Returns [`StoreError::MissingColumns`] if a required column is absent,
/// or [`StoreError::Csv`] if the header row cannot be read.
pub fn parse_outbreak_reader<R: Read>(reader: R) -> Result<OutbreakTable, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    check_columns(&headers)?;

    let mut records = Vec::new();
    let mut skipped = 0_usize;

    for (index, result) in reader.deserialize::<RawOutbreakRow>().enumerate() {
        match result {
            Ok(raw) => records.push(OutbreakRecord::from(raw)),
            Err(e) => {
                // +2: one for the header row, one for 1-based line numbers
                log::warn!("Skipping undecodable CSV row {}: {e}", index + 2);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} undecodable row(s)");
    }
    log::debug!("Parsed {} outbreak records", records.len());

    Ok(OutbreakTable::new(records))
}

/// Verifies that every required column is present in `headers`.
///
/// # Errors
///
/// Returns [`StoreError::MissingColumns`] listing the absent columns.
pub fn check_columns<S: AsRef<str>>(headers: &[S]) -> Result<(), StoreError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h.as_ref() == **required))
        .map(|c| (*c).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::MissingColumns { columns: missing })
    }
}

/// Writes `table` as CSV in snapshot column order.
///
/// The header row is always written, even for an empty table.
///
/// # Errors
///
/// Returns [`StoreError`] if serialization or the underlying write fails.
pub fn write_outbreak_csv<W: Write>(table: &OutbreakTable, writer: W) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(SNAPSHOT_COLUMNS)?;
    for record in table {
        let raw = RawOutbreakRow::from(record);
        writer.write_record([
            raw.outbreak_date.unwrap_or_default(),
            raw.state.unwrap_or_default(),
            raw.county.unwrap_or_default(),
            raw.flock_size.unwrap_or_default(),
            raw.flock_type.unwrap_or_default(),
            raw.latitude.unwrap_or_default(),
            raw.longitude.unwrap_or_default(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FEED: &str = "\
Outbreak Date,State,County,Flock Size,Flock Type
02-08-2022,Indiana,Dubois,29000,WOAH Poultry
02-09-2022, Kentucky , Fulton ,240000,Commercial Broiler Production
pending,Georgia,Elbert,abc,
";

    #[test]
    fn parses_feed_rows() {
        let table = parse_outbreak_csv(FEED.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);

        let first = &table.records()[0];
        assert_eq!(first.outbreak_date, NaiveDate::from_ymd_opt(2022, 2, 8));
        assert_eq!(first.state, "Indiana");
        assert_eq!(first.flock_size, 29_000);

        let second = &table.records()[1];
        assert_eq!(second.state, "Kentucky");
        assert_eq!(second.county, "Fulton");
    }

    #[test]
    fn malformed_cells_use_defaults() {
        let table = parse_outbreak_csv(FEED.as_bytes()).unwrap();
        let third = &table.records()[2];
        assert_eq!(third.outbreak_date, None);
        assert_eq!(third.flock_size, 0);
        assert_eq!(third.flock_type, "Unknown");
    }

    #[test]
    fn short_rows_are_kept() {
        let csv = "Outbreak Date,State,County,Flock Size,Flock Type\n03-01-2023,Iowa\n";
        let table = parse_outbreak_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].county, "Unknown");
    }

    #[test]
    fn reports_missing_columns() {
        let csv = "Outbreak Date,State,Flock Size\n02-08-2022,Indiana,10\n";
        let err = parse_outbreak_csv(csv.as_bytes()).unwrap_err();
        match err {
            StoreError::MissingColumns { columns } => {
                assert_eq!(columns, ["County", "Flock Type"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn snapshot_written_then_read_matches() {
        let table = parse_outbreak_csv(FEED.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write_outbreak_csv(&table, &mut buffer).unwrap();
        let reread = parse_outbreak_csv(&buffer).unwrap();
        assert_eq!(reread, table);
    }

    #[test]
    fn empty_table_still_has_header() {
        let mut buffer = Vec::new();
        write_outbreak_csv(&OutbreakTable::default(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("Outbreak Date,State,County,Flock Size,Flock Type"));
        assert!(parse_outbreak_csv(text.as_bytes()).unwrap().is_empty());
    }
}
