pub mod artifacts;
pub mod config;
pub mod crawl;
pub mod document;
pub mod download;
pub mod extract;
pub mod fetcher;
pub mod ledger;
pub mod shutdown;

mod error;
mod utils;

pub use crawl::{crawl, CrawlReport, ImageTable};
pub use download::{download_images, DownloadReport};
pub use error::{CrawlerError, FetchError};
pub use extract::{ContentFilter, Extractor, ImageRecord, UrlResolution, WordCountFilter};
pub use fetcher::{Fetcher, HttpFetcher};
pub use shutdown::Shutdown;
pub use utils::init_tracing;
