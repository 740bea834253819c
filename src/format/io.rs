//! CSV reading and atomic CSV writing.
//!
//! Writers stage their output in a temporary file next to the destination and
//! only move it into place on [`AtomicCsvWriter::commit`]. A run that fails
//! part-way drops the temporary file and leaves the destination untouched.
//! Several outputs of one run are flushed with [`AtomicCsvWriter::finish`] and
//! published together with [`persist_all`].

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use ndarray::Array2;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

use super::Table;

/// Read a numeric table from a CSV file with a header row.
///
/// # Errors
///
/// Returns an error if the file cannot be read, rows have differing lengths,
/// or a cell is not a number.
pub fn read_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    debug!("reading table from {}", path.display());
    read_table_from(File::open(path)?)
}

/// Read a numeric table from any CSV source with a header row.
///
/// Surrounding whitespace in cells is ignored.
///
/// # Errors
///
/// Returns an error if rows have differing lengths or a cell is not a number.
pub fn read_table_from<R: Read>(source: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let header: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let width = header.len();

    let mut values = Vec::new();
    let mut rows = 0;
    for record in reader.records() {
        let record = record?;
        rows += 1;
        for (col, cell) in record.iter().enumerate() {
            let value = cell.parse::<f64>().map_err(|_| Error::MalformedCell {
                row: rows,
                column: header[col].clone(),
                value: cell.to_owned(),
            })?;
            values.push(value);
        }
    }

    let data = Array2::from_shape_vec((rows, width), values).map_err(|e| {
        Error::DimensionMismatch {
            expected: format!("{rows} rows of {width} values"),
            actual: e.to_string(),
        }
    })?;
    Table::new(header, data)
}

/// Write a table to a CSV file atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_table(path: impl AsRef<Path>, table: &Table) -> Result<()> {
    let mut writer = AtomicCsvWriter::create(path)?;
    writer.write_table(table)?;
    writer.commit()?;
    Ok(())
}

/// Write a table as CSV to any sink.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_table_to<W: Write>(sink: W, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    write_rows(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

fn write_rows<W: Write>(writer: &mut csv::Writer<W>, table: &Table) -> Result<()> {
    writer.write_record(table.header())?;
    for row in table.data().rows() {
        writer.write_record(row.iter().map(|&v| format_value(v)))?;
    }
    Ok(())
}

/// Format a value the way design tools expect: integers without a decimal point.
#[must_use]
pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        // Also normalises negative zero
        return "0".to_owned();
    }
    value.to_string()
}

/// A CSV writer that only publishes its file on success.
#[derive(Debug)]
pub struct AtomicCsvWriter {
    writer: csv::Writer<NamedTempFile>,
    path: PathBuf,
    rows: u64,
}

impl AtomicCsvWriter {
    /// Stage a new CSV file for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file = NamedTempFile::new_in(dir)?;
        Ok(Self {
            writer: csv::Writer::from_writer(file),
            path,
            rows: 0,
        })
    }

    /// Destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far, header included.
    #[must_use]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Write one record.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(record)?;
        self.rows += 1;
        Ok(())
    }

    /// Write a whole table, header first.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        write_rows(&mut self.writer, table)?;
        self.rows += table.nrows() as u64 + 1;
        Ok(())
    }

    /// Flush every buffered record into the staged file without publishing it.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn finish(self) -> Result<StagedCsv> {
        let file = self
            .writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        Ok(StagedCsv {
            file,
            path: self.path,
            rows: self.rows,
        })
    }

    /// Flush and move the staged file to its destination.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing or renaming fails.
    pub fn commit(self) -> Result<PathBuf> {
        self.finish()?.persist()
    }
}

/// A fully written CSV waiting to be moved into place.
///
/// Dropping it removes the temporary file.
#[derive(Debug)]
pub struct StagedCsv {
    file: NamedTempFile,
    path: PathBuf,
    rows: u64,
}

impl StagedCsv {
    /// Destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the file to its destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails.
    pub fn persist(self) -> Result<PathBuf> {
        self.file
            .persist(&self.path)
            .map_err(|e| Error::Io(e.error))?;
        debug!("wrote {} records to {}", self.rows, self.path.display());
        Ok(self.path)
    }
}

/// Publish staged files in order, all or none.
///
/// If one rename fails, the files already published by this call are removed
/// again and the remaining temporaries are discarded.
///
/// # Errors
///
/// Returns the error of the first rename that fails.
pub fn persist_all(staged: Vec<StagedCsv>) -> Result<Vec<PathBuf>> {
    let mut published = Vec::with_capacity(staged.len());
    for file in staged {
        match file.persist() {
            Ok(path) => published.push(path),
            Err(err) => {
                for path in &published {
                    if let Err(remove) = std::fs::remove_file(path) {
                        warn!("could not remove {}: {remove}", path.display());
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table_from() {
        let csv = "no.choice.cte, wa ,cost\n0,10,250\n1,0,0\n0,30.5,50\n";
        let table = read_table_from(csv.as_bytes()).unwrap();
        assert_eq!(table.header(), &["no.choice.cte", "wa", "cost"]);
        assert_eq!(table.nrows(), 3);
        assert_eq!(table.get(2, 1), 30.5);
    }

    #[test]
    fn test_read_malformed_cell() {
        let csv = "a,b\n1,2\n3,x\n";
        let err = read_table_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedCell { row: 2, ref column, ref value } if column == "b" && value == "x"
        ));
    }

    #[test]
    fn test_read_ragged_rows() {
        let csv = "a,b\n1,2\n3\n";
        assert!(matches!(read_table_from(csv.as_bytes()), Err(Error::Csv(_))));
    }

    #[test]
    fn test_write_table_to() {
        let table = Table::from_rows(
            vec!["choice situation".into(), "alt1.c".into()],
            &[vec![1.0, 250.0], vec![2.0, -0.0]],
        )
        .unwrap();
        let mut out = Vec::new();
        write_table_to(&mut out, &table).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "choice situation,alt1.c\n1,250\n2,0\n"
        );
    }

    #[test]
    fn test_atomic_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut writer = AtomicCsvWriter::create(&path).unwrap();
        writer.write_record(["a", "b"]).unwrap();
        writer.write_record(["1", "2"]).unwrap();
        assert!(!path.exists());
        assert_eq!(writer.rows(), 2);

        writer.commit().unwrap();
        let table = read_table(&path).unwrap();
        assert_eq!(table.nrows(), 1);
        assert_eq!(table.get(0, 1), 2.0);
    }

    #[test]
    fn test_atomic_drop_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        {
            let mut writer = AtomicCsvWriter::create(&path).unwrap();
            writer.write_record(["a"]).unwrap();
        }
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_persist_all() {
        let dir = tempfile::tempdir().unwrap();
        let paths = [dir.path().join("a.csv"), dir.path().join("b.csv")];

        let staged = paths
            .iter()
            .map(|path| {
                let mut writer = AtomicCsvWriter::create(path).unwrap();
                writer.write_record(["x"]).unwrap();
                writer.finish().unwrap()
            })
            .collect();
        assert!(paths.iter().all(|path| !path.exists()));

        let published = persist_all(staged).unwrap();
        assert_eq!(published, paths.to_vec());
        assert!(paths.iter().all(|path| path.exists()));
    }

    #[test]
    fn test_persist_all_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.csv");
        // A non-empty directory cannot be replaced by a file
        let blocked = dir.path().join("blocked");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), "").unwrap();

        let mut staged = Vec::new();
        for path in [&first, &blocked] {
            let mut writer = AtomicCsvWriter::create(path).unwrap();
            writer.write_record(["x"]).unwrap();
            staged.push(writer.finish().unwrap());
        }

        assert!(persist_all(staged).is_err());
        assert!(!first.exists());
        assert!(blocked.is_dir());
        // Only the blocking directory is left, no temporaries
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
