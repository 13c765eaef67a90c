//! Output file assembly: one fixed-format file per store/series, quoted
//! comma-joined rows, flushed per line.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::model::SalesRow;
use crate::normalize;
use crate::series::SeriesMap;

/// An open interchange file. Append-only for the duration of a run.
#[derive(Debug)]
pub struct OutputFile {
    path: PathBuf,
    file: File,
    lines: usize,
}

impl OutputFile {
    fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file,
            lines: 0,
        })
    }

    /// Quotes every field, joins with commas and writes one line, flushed
    /// so a crash mid-run leaves at worst a truncated file. Fields are
    /// assumed not to contain the quote character.
    pub fn append(&mut self, fields: &[&str]) -> Result<()> {
        let line = fields
            .iter()
            .map(|f| format!("\"{f}\""))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        self.lines += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> usize {
        self.lines
    }
}

/// The run's output files, keyed by store code. Aggregation and routing
/// always go through this explicit map; there is no name matching.
#[derive(Debug)]
pub struct FileSet {
    by_store: BTreeMap<String, OutputFile>,
}

impl FileSet {
    /// One file per resolved store, created empty and named
    /// `<store>_000_<salesdate:YYMMDD>_<time:HHMM>.TXT`.
    pub fn create(
        sales: &[SalesRow],
        map: &SeriesMap,
        target: &Path,
        now: NaiveDateTime,
    ) -> Result<Self> {
        std::fs::create_dir_all(target)?;
        let date_tag = sales
            .first()
            .and_then(|row| normalize::parse_date(&row.date))
            .map(|d| d.format("%y%m%d").to_string())
            .unwrap_or_else(|| now.format("%y%m%d").to_string());
        let time_tag = now.format("%H%M").to_string();

        let mut by_store = BTreeMap::new();
        for (store, _) in map.stores() {
            let name = format!("{store}_000_{date_tag}_{time_tag}.TXT");
            by_store.insert(store.to_string(), OutputFile::create(target.join(name))?);
        }
        Ok(Self { by_store })
    }

    pub fn for_store(&mut self, store: &str) -> Option<&mut OutputFile> {
        self.by_store.get_mut(store.trim())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut OutputFile)> {
        self.by_store.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.by_store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_store.is_empty()
    }
}
