use crate::extract::UrlResolution;
use tokio::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_MIN_WORDS: usize = 3;

/// Settings for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub request_timeout: Duration,
    /// Minimum spacing between two page requests.
    pub request_delay: Duration,
    /// Blocks with fewer words are skipped during the context search.
    pub min_words: usize,
    /// Extra noise regexes, on top of the built-in ones.
    pub noise_patterns: Vec<String>,
    pub url_resolution: UrlResolution,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        CrawlSettings {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            request_delay: DEFAULT_REQUEST_DELAY,
            min_words: DEFAULT_MIN_WORDS,
            noise_patterns: vec![],
            url_resolution: UrlResolution::Join,
        }
    }
}

/// Settings for one download run.
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub request_timeout: Duration,
    pub request_delay: Duration,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        DownloadSettings {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}
