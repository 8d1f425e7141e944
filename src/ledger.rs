use crate::error::CrawlerError;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const LEDGER_FILE: &str = "image_urls_processed.csv";

#[derive(Debug, Serialize)]
struct LedgerRow<'a> {
    image_url: &'a str,
    image_name: &'a str,
}

/// Completed downloads, as `image url <TAB> file name` lines without a header.
///
/// Existing lines are loaded once; new ones are only ever appended, each
/// flushed before `record` returns, so an interrupted run leaves whole lines.
pub struct DownloadLedger {
    path: PathBuf,
    entries: HashMap<String, String>,
    writer: csv::Writer<File>,
}

impl DownloadLedger {
    pub fn open(folder: &Path) -> Result<DownloadLedger, CrawlerError> {
        let path = folder.join(LEDGER_FILE);
        let entries = if path.is_file() {
            load_entries(&path)?
        } else {
            HashMap::new()
        };
        debug!("Loaded {} ledger entries from {}", entries.len(), path.display());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(CrawlerError::io(&path))?;
        if !ends_with_newline(&path)? {
            file.write_all(b"\n").map_err(CrawlerError::io(&path))?;
        }
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(file);

        Ok(DownloadLedger {
            path,
            entries,
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, image_url: &str) -> bool {
        self.entries.contains_key(image_url)
    }

    pub fn file_name(&self, image_url: &str) -> Option<&str> {
        self.entries.get(image_url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends one entry. URLs already present are left alone.
    pub fn record(&mut self, image_url: &str, image_name: &str) -> Result<(), CrawlerError> {
        if self.contains(image_url) {
            return Ok(());
        }
        self.writer.serialize(LedgerRow {
            image_url,
            image_name,
        })?;
        self.writer.flush().map_err(CrawlerError::io(&self.path))?;
        self.entries
            .insert(image_url.to_string(), image_name.to_string());
        Ok(())
    }
}

/// An empty file counts as terminated.
fn ends_with_newline(path: &Path) -> Result<bool, CrawlerError> {
    let content = fs::read(path).map_err(CrawlerError::io(path))?;
    Ok(content.last().map_or(true, |&b| b == b'\n'))
}

fn load_entries(path: &Path) -> Result<HashMap<String, String>, CrawlerError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut entries = HashMap::new();
    for row in reader.records() {
        let row = row?;
        match (row.get(0), row.get(1)) {
            (Some(url), Some(name)) if !url.trim().is_empty() => {
                entries.insert(url.trim().to_string(), name.trim().to_string());
            }
            _ => warn!("Skipping malformed ledger line {:?} in {}", row, path.display()),
        }
    }
    Ok(entries)
}
