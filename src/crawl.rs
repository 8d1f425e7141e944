use crate::artifacts;
use crate::config::CrawlSettings;
use crate::error::{CrawlerError, FetchError};
use crate::extract::{Extractor, ImageRecord, WordCountFilter};
use crate::fetcher::{Fetcher, Throttle};
use crate::shutdown::Shutdown;
use itertools::Itertools;
use scraper::Html;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Image records keyed by image URL. The first record seen for a URL is kept
/// and later ones are dropped.
#[derive(Debug, Default)]
pub struct ImageTable {
    records: Vec<ImageRecord>,
    index: HashMap<String, usize>,
}

impl ImageTable {
    /// Returns `false` when the URL is already present.
    pub fn insert(&mut self, record: ImageRecord) -> bool {
        match self.index.entry(record.image_url.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(self.records.len());
                self.records.push(record);
                true
            }
        }
    }

    pub fn contains(&self, image_url: &str) -> bool {
        self.index.contains_key(image_url)
    }

    pub fn get(&self, image_url: &str) -> Option<&ImageRecord> {
        self.index.get(image_url).map(|&i| &self.records[i])
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[ImageRecord] {
        self.records.as_slice()
    }

    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.image_url.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct CrawlReport {
    pub table: ImageTable,
    pub failed_pages: Vec<String>,
    pub interrupted: bool,
}

/// Reads one page URL per line. Blank lines and repeats are dropped.
pub fn read_page_urls(path: &Path) -> Result<Vec<String>, CrawlerError> {
    let content = fs::read_to_string(path).map_err(CrawlerError::io(path))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unique()
        .map(ToString::to_string)
        .collect())
}

pub fn build_extractor(settings: &CrawlSettings) -> Result<Extractor, CrawlerError> {
    let filter = WordCountFilter::new(settings.min_words).with_patterns(&settings.noise_patterns)?;
    Ok(Extractor::new(filter, settings.url_resolution))
}

/// Fetches each page in turn and merges its images into one table.
/// A page that cannot be fetched is logged and contributes nothing.
pub async fn crawl_pages<F>(
    fetcher: &F,
    extractor: &Extractor,
    page_urls: &[String],
    settings: &CrawlSettings,
    shutdown: &Shutdown,
) -> CrawlReport
where
    F: Fetcher + ?Sized,
{
    let mut report = CrawlReport::default();
    let mut throttle = Throttle::new(settings.request_delay);
    let total = page_urls.len();

    for (i, url) in page_urls.iter().enumerate() {
        if shutdown.is_triggered() {
            report.interrupted = true;
            break;
        }

        info!("[{}/{}] Scraping {}", i + 1, total, url);
        throttle.wait().await;
        let body: Result<String, FetchError> = tokio::select! {
            _ = shutdown.wait() => {
                report.interrupted = true;
                break;
            }
            body = fetcher.fetch_text(url) => body,
        };

        let html = match body {
            Ok(html) => html,
            Err(err) => {
                warn!("Page {} was not retrieved: {}", url, err);
                report.failed_pages.push(url.clone());
                continue;
            }
        };

        let records = {
            let doc = Html::parse_document(&html);
            extractor.extract(&doc, url)
        };

        let found = records.len();
        let mut added = 0;
        for record in records {
            if report.table.insert(record) {
                added += 1;
            }
        }
        debug!("{}: {} images, {} new", url, found, added);
    }

    if report.interrupted {
        warn!("Crawl interrupted, keeping {} images", report.table.len());
    }
    report
}

/// Crawls `page_urls` and writes the image list and context tables into
/// `output_folder`, creating it when missing.
pub async fn crawl<F>(
    fetcher: &F,
    page_urls: &[String],
    output_folder: &Path,
    settings: &CrawlSettings,
    shutdown: &Shutdown,
) -> Result<CrawlReport, CrawlerError>
where
    F: Fetcher + ?Sized,
{
    fs::create_dir_all(output_folder).map_err(CrawlerError::io(output_folder))?;
    let extractor = build_extractor(settings)?;

    info!("Processing {} page urls", page_urls.len());
    let report = crawl_pages(fetcher, &extractor, page_urls, settings, shutdown).await;
    artifacts::write_artifacts(output_folder, &report.table)?;

    info!(
        "Crawled {} pages ({} failed), {} unique images",
        page_urls.len(),
        report.failed_pages.len(),
        report.table.len()
    );
    Ok(report)
}
