use crate::domain::model::RawRecord;
use crate::utils::error::{IntakeError, Result};
use csv::{ByteRecord, ByteRecordsIntoIter, ReaderBuilder};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Single-pass CSV row source. Each data row becomes a [`RawRecord`] keyed by
/// the header line; short rows simply lack the trailing columns. Cells that are
/// not valid UTF-8 are decoded lossily, so the row fails validation instead of
/// aborting the read.
pub struct CsvSource<R: Read> {
    headers: Vec<String>,
    records: ByteRecordsIntoIter<R>,
}

impl CsvSource<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IntakeError::InputNotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Reading CSV from: {}", path.display());
        Self::from_reader(File::open(path)?)
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = decode(reader.byte_headers()?).collect();

        Ok(Self {
            headers,
            records: reader.into_byte_records(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for CsvSource<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        Some(Ok(self.headers.iter().zip(decode(&record)).collect()))
    }
}

fn decode(record: &ByteRecord) -> impl Iterator<Item = String> + '_ {
    record
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reads_rows_keyed_by_header() {
        let data = "first_name,last_name,email,phone,eir_code\n\
                    John,Doe,j@x.com,0871234567,1A2B3C\n\
                    Mary,Ann,m@x.com,0861234567,2B3C4D\n";
        let rows: Vec<RawRecord> = CsvSource::from_reader(data.as_bytes())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("last_name"), "Doe");
        assert_eq!(rows[1].text("eir_code"), "2B3C4D");
    }

    #[test]
    fn test_short_row_leaves_fields_missing() {
        let data = "first_name,last_name,email,phone,eir_code\nJohn,Doe\n";
        let rows: Vec<RawRecord> = CsvSource::from_reader(data.as_bytes())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows[0].text("first_name"), "John");
        assert!(!rows[0].data.contains_key("phone"));
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let data = "first_name,last_name,email,phone,eir_code\n";
        let source = CsvSource::from_reader(data.as_bytes()).unwrap();

        assert_eq!(source.headers().len(), 5);
        assert_eq!(source.count(), 0);
    }

    #[test]
    fn test_invalid_utf8_cell_is_decoded_lossily() {
        let data: &[u8] = b"first_name,last_name,email,phone,eir_code\n\
                            Se\xe1n,Doe,s@x.com,0871234567,1A2B3C\n";
        let rows: Vec<RawRecord> = CsvSource::from_reader(data)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("first_name"), "Se\u{fffd}n");
        assert_eq!(rows[0].text("last_name"), "Doe");
    }

    #[test]
    fn test_open_missing_file() {
        let err = CsvSource::open("/definitely/not/here.csv").err().unwrap();
        assert!(matches!(err, IntakeError::InputNotFound { .. }));
    }

    #[test]
    fn test_open_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "first_name,last_name,email,phone,eir_code").unwrap();
        writeln!(file, "John,Doe,j@x.com,0871234567,1A2B3C").unwrap();

        let rows: Vec<RawRecord> = CsvSource::open(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("email"), "j@x.com");
    }
}
