//! Destinations for streamed choice sets.
//!
//! The pair enumerator pushes every accepted choice set into a
//! [`ChoiceSetSink`] as soon as its block is merged, so the full candidate
//! set never has to live in memory unless the caller asks for it.
//!
//! | Sink | Effect |
//! |------|--------|
//! | `Vec<ChoiceSet>`, [`Design`] | collect in memory |
//! | [`WideCsvSink`] | stream wide rows to an atomically written CSV |
//! | [`LongCsvSink`] | stream long idefix rows (three per situation) |
//! | [`ReservoirSampler`](crate::sample::ReservoirSampler) | keep a bounded uniform sample |
//! | `(A, B)` | feed both sinks |
//! | `Option<S>` | feed `S` if present |

use std::path::{Path, PathBuf};

use crate::design::{wide_header, ChoiceSet, Design, IdColumn};
use crate::error::Result;
use crate::format::{AtomicCsvWriter, StagedCsv};
use crate::space::Attribute;

/// Something that consumes choice sets in emission order.
pub trait ChoiceSetSink {
    /// Consume the next choice set.
    ///
    /// # Errors
    ///
    /// An error aborts the enumeration that is feeding this sink.
    fn accept(&mut self, choice_set: ChoiceSet) -> Result<()>;
}

impl ChoiceSetSink for Vec<ChoiceSet> {
    fn accept(&mut self, choice_set: ChoiceSet) -> Result<()> {
        self.push(choice_set);
        Ok(())
    }
}

impl ChoiceSetSink for Design {
    fn accept(&mut self, choice_set: ChoiceSet) -> Result<()> {
        self.push(choice_set.alt1, choice_set.alt2);
        Ok(())
    }
}

impl<S: ChoiceSetSink + ?Sized> ChoiceSetSink for &mut S {
    fn accept(&mut self, choice_set: ChoiceSet) -> Result<()> {
        (**self).accept(choice_set)
    }
}

impl<S: ChoiceSetSink + ?Sized> ChoiceSetSink for Box<S> {
    fn accept(&mut self, choice_set: ChoiceSet) -> Result<()> {
        (**self).accept(choice_set)
    }
}

impl<S: ChoiceSetSink> ChoiceSetSink for Option<S> {
    fn accept(&mut self, choice_set: ChoiceSet) -> Result<()> {
        match self {
            Some(sink) => sink.accept(choice_set),
            None => Ok(()),
        }
    }
}

impl<A: ChoiceSetSink, B: ChoiceSetSink> ChoiceSetSink for (A, B) {
    fn accept(&mut self, choice_set: ChoiceSet) -> Result<()> {
        self.0.accept(choice_set)?;
        self.1.accept(choice_set)
    }
}

/// Streams choice sets to a wide candidate CSV.
#[derive(Debug)]
pub struct WideCsvSink {
    writer: AtomicCsvWriter,
}

impl WideCsvSink {
    /// Stage a wide CSV at `path` and write its header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: impl AsRef<Path>, id: IdColumn) -> Result<Self> {
        let mut writer = AtomicCsvWriter::create(path)?;
        writer.write_record(wide_header(id))?;
        Ok(Self { writer })
    }

    /// Flush the file without publishing it, see [`persist_all`](crate::format::persist_all).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be flushed.
    pub fn finish(self) -> Result<StagedCsv> {
        self.writer.finish()
    }

    /// Publish the file. Dropping the sink without committing discards it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be flushed or moved into place.
    pub fn commit(self) -> Result<PathBuf> {
        self.writer.commit()
    }
}

impl ChoiceSetSink for WideCsvSink {
    fn accept(&mut self, choice_set: ChoiceSet) -> Result<()> {
        self.writer
            .write_record(choice_set.wide_row().iter().map(i64::to_string))
    }
}

/// Streams choice sets to a long idefix CSV.
#[derive(Debug)]
pub struct LongCsvSink {
    writer: AtomicCsvWriter,
}

impl LongCsvSink {
    /// Stage a long CSV at `path` and write its header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let mut writer = AtomicCsvWriter::create(path)?;
        writer.write_record(Attribute::ALL.iter().map(|attr| attr.code()))?;
        Ok(Self { writer })
    }

    /// Flush the file without publishing it, see [`persist_all`](crate::format::persist_all).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be flushed.
    pub fn finish(self) -> Result<StagedCsv> {
        self.writer.finish()
    }

    /// Publish the file. Dropping the sink without committing discards it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be flushed or moved into place.
    pub fn commit(self) -> Result<PathBuf> {
        self.writer.commit()
    }
}

impl ChoiceSetSink for LongCsvSink {
    fn accept(&mut self, choice_set: ChoiceSet) -> Result<()> {
        for alt in [choice_set.alt1, choice_set.alt2] {
            self.writer
                .write_record(alt.levels().iter().map(i32::to_string))?;
        }
        self.writer
            .write_record(std::iter::repeat("0").take(Attribute::ALL.len()))
    }
}

/// Write a design as a wide CSV, atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_wide_csv(path: impl AsRef<Path>, design: &Design, id: IdColumn) -> Result<PathBuf> {
    let mut sink = WideCsvSink::create(path, id)?;
    for &choice_set in design {
        sink.accept(choice_set)?;
    }
    sink.commit()
}

/// Write a design as a long idefix CSV, atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_long_csv(path: impl AsRef<Path>, design: &Design) -> Result<PathBuf> {
    let mut sink = LongCsvSink::create(path)?;
    for &choice_set in design {
        sink.accept(choice_set)?;
    }
    sink.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{read_table, wide_to_long};
    use crate::space::Profile;

    fn design() -> Design {
        let mut design = Design::new();
        design.push(
            Profile::new([30, 30, 30, 2, 2, 50, 2, 2, 250]),
            Profile::new([30, 30, 50, 1, 2, 30, 2, 1, 1250]),
        );
        design.push(
            Profile::new([50, 80, 0, 0, 0, 80, 1, 1, 100]),
            Profile::new([50, 80, 30, 2, 1, 0, 0, 0, 3500]),
        );
        design
    }

    #[test]
    fn test_collecting_sinks() {
        let mut sets: Vec<ChoiceSet> = Vec::new();
        let mut collected = Design::new();
        {
            let mut tee = (&mut sets, &mut collected);
            for &cs in &design() {
                tee.accept(cs).unwrap();
            }
        }
        assert_eq!(sets.len(), 2);
        assert_eq!(collected, design());

        let mut nothing: Option<Vec<ChoiceSet>> = None;
        nothing.accept(sets[0]).unwrap();
        assert!(nothing.is_none());
    }

    #[test]
    fn test_wide_csv_matches_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.csv");

        write_wide_csv(&path, &design(), IdColumn::ChoiceSetId).unwrap();
        let table = read_table(&path).unwrap();
        assert_eq!(table, design().to_wide_table(IdColumn::ChoiceSetId));
    }

    #[test]
    fn test_long_csv_matches_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.csv");

        write_long_csv(&path, &design()).unwrap();
        let table = read_table(&path).unwrap();
        let expected = wide_to_long(&design().to_wide_table(IdColumn::ChoiceSituation)).unwrap();
        assert_eq!(table, expected);
    }

    #[test]
    fn test_uncommitted_sink_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.csv");
        {
            let mut sink = WideCsvSink::create(&path, IdColumn::ChoiceSituation).unwrap();
            sink.accept(design().choice_sets()[0]).unwrap();
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_finished_sinks_publish_together() {
        let dir = tempfile::tempdir().unwrap();
        let wide_path = dir.path().join("candidates.csv");
        let long_path = dir.path().join("long.csv");

        let mut wide = WideCsvSink::create(&wide_path, IdColumn::ChoiceSituation).unwrap();
        let mut long = LongCsvSink::create(&long_path).unwrap();
        for &cs in &design() {
            (&mut wide, &mut long).accept(cs).unwrap();
        }

        let staged = vec![wide.finish().unwrap(), long.finish().unwrap()];
        assert!(!wide_path.exists() && !long_path.exists());

        crate::format::persist_all(staged).unwrap();
        assert_eq!(read_table(&wide_path).unwrap().nrows(), 2);
        assert_eq!(read_table(&long_path).unwrap().nrows(), 6);
    }
}
