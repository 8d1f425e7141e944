use crate::config::DownloadSettings;
use crate::error::{CrawlerError, FetchError};
use crate::fetcher::{Fetcher, Throttle};
use crate::ledger::DownloadLedger;
use crate::shutdown::Shutdown;
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const IMAGE_EXTENSIONS: [&str; 11] = [
    "jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico", "avif", "tif", "tiff",
];
const FALLBACK_EXTENSION: &str = "img";

#[derive(Debug, Default)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: Vec<String>,
    pub interrupted: bool,
}

/// Local file name for an image URL: the SHA-256 of the URL plus the
/// extension of its path when that is a known image type.
pub fn image_file_name(image_url: &str) -> String {
    let digest = hex::encode(Sha256::digest(image_url.as_bytes()));
    format!("{}.{}", digest, image_extension(image_url))
}

fn image_extension(image_url: &str) -> String {
    Url::parse(image_url)
        .ok()
        .and_then(|url| {
            let segment = url.path_segments()?.last()?.to_string();
            let (_, ext) = segment.rsplit_once('.')?;
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Downloads every URL without a ledger entry into `folder`, recording each
/// success in the ledger. Failed URLs get no entry and are retried next run.
pub async fn download_images<F>(
    fetcher: &F,
    image_urls: &[String],
    folder: &Path,
    settings: &DownloadSettings,
    shutdown: &Shutdown,
) -> Result<DownloadReport, CrawlerError>
where
    F: Fetcher + ?Sized,
{
    fs::create_dir_all(folder).map_err(CrawlerError::io(folder))?;
    let mut ledger = DownloadLedger::open(folder)?;
    let mut throttle = Throttle::new(settings.request_delay);
    let mut report = DownloadReport::default();
    let total = image_urls.len();

    info!(
        "Downloading {} images into {} ({} already done)",
        total,
        folder.display(),
        ledger.len()
    );

    for (i, url) in image_urls.iter().enumerate() {
        if ledger.contains(url) {
            debug!("Already downloaded {}", url);
            report.skipped += 1;
            continue;
        }
        if shutdown.is_triggered() {
            report.interrupted = true;
            break;
        }

        info!("[{}/{}] Downloading {}", i + 1, total, url);
        throttle.wait().await;
        let bytes: Result<Vec<u8>, FetchError> = tokio::select! {
            _ = shutdown.wait() => {
                report.interrupted = true;
                break;
            }
            bytes = fetcher.fetch_bytes(url) => bytes,
        };

        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Image {} was not downloaded: {}", url, err);
                report.failed.push(url.clone());
                continue;
            }
        };

        let name = image_file_name(url);
        let path = folder.join(&name);
        fs::write(&path, &bytes).map_err(CrawlerError::io(&path))?;
        ledger.record(url, &name)?;
        report.downloaded += 1;
    }

    if report.interrupted {
        warn!("Download interrupted, ledger is at {}", ledger.path().display());
    }
    info!(
        "Downloaded {} images, skipped {}, failed {}",
        report.downloaded,
        report.skipped,
        report.failed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::mock::MockFetcher;
    use crate::ledger::LEDGER_FILE;
    use pretty_assertions::assert_eq;
    use tokio::time::Duration;

    fn settings() -> DownloadSettings {
        DownloadSettings {
            request_delay: Duration::ZERO,
            ..DownloadSettings::default()
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn file_names_are_stable() {
        let a = image_file_name("https://a.com/img/Shot.PNG?w=200");
        assert_eq!(a, image_file_name("https://a.com/img/Shot.PNG?w=200"));
        assert!(a.ends_with(".png"));
        assert_eq!(a.len(), 64 + ".png".len());
        assert_ne!(a, image_file_name("https://a.com/img/Shot.PNG?w=400"));

        assert!(image_file_name("https://a.com/picture").ends_with(".img"));
        assert!(image_file_name("https://a.com/page.html").ends_with(".img"));
        assert!(image_file_name("not a url").ends_with(".img"));
    }

    #[tokio::test]
    async fn downloads_and_records_each_image() {
        let fetcher = MockFetcher::default()
            .with("https://a.com/1.png", "one")
            .with("https://a.com/2.jpg", "two");
        let dir = tempfile::tempdir().unwrap();
        let list = urls(&["https://a.com/1.png", "https://a.com/2.jpg"]);

        let report = download_images(&fetcher, &list, dir.path(), &settings(), &Shutdown::new())
            .await
            .unwrap();

        assert_eq!(report.downloaded, 2);
        let name = image_file_name("https://a.com/1.png");
        assert_eq!(fs::read_to_string(dir.path().join(&name)).unwrap(), "one");
        assert_eq!(
            fs::read_to_string(dir.path().join(LEDGER_FILE)).unwrap(),
            format!(
                "https://a.com/1.png\t{}\nhttps://a.com/2.jpg\t{}\n",
                name,
                image_file_name("https://a.com/2.jpg")
            )
        );
    }

    #[tokio::test]
    async fn resumed_run_downloads_nothing_twice() {
        let fetcher = MockFetcher::default()
            .with("https://a.com/1.png", "one")
            .with("https://a.com/2.png", "two");
        let dir = tempfile::tempdir().unwrap();
        let list = urls(&["https://a.com/1.png", "https://a.com/2.png"]);
        fs::write(dir.path().join(LEDGER_FILE), "https://a.com/1.png\tkept.png\n").unwrap();

        let first = download_images(&fetcher, &list, dir.path(), &settings(), &Shutdown::new())
            .await
            .unwrap();
        assert_eq!((first.downloaded, first.skipped), (1, 1));
        assert_eq!(fetcher.requested(), vec!["https://a.com/2.png"]);
        let ledger = fs::read_to_string(dir.path().join(LEDGER_FILE)).unwrap();

        let second = download_images(&fetcher, &list, dir.path(), &settings(), &Shutdown::new())
            .await
            .unwrap();
        assert_eq!((second.downloaded, second.skipped), (0, 2));
        assert_eq!(fetcher.requested().len(), 1);
        assert_eq!(fs::read_to_string(dir.path().join(LEDGER_FILE)).unwrap(), ledger);
        assert!(ledger.starts_with("https://a.com/1.png\tkept.png\n"));
    }

    #[tokio::test]
    async fn failed_download_gets_no_ledger_entry() {
        let fetcher = MockFetcher::default().with("https://a.com/ok.png", "ok");
        let dir = tempfile::tempdir().unwrap();
        let list = urls(&["https://a.com/missing.png", "https://a.com/ok.png"]);

        let report = download_images(&fetcher, &list, dir.path(), &settings(), &Shutdown::new())
            .await
            .unwrap();

        assert_eq!(report.failed, vec!["https://a.com/missing.png"]);
        assert_eq!(report.downloaded, 1);
        let ledger = DownloadLedger::open(dir.path()).unwrap();
        assert!(!ledger.contains("https://a.com/missing.png"));
        assert!(ledger.contains("https://a.com/ok.png"));
    }

    #[tokio::test]
    async fn repeated_url_in_one_run_is_fetched_once() {
        let fetcher = MockFetcher::default().with("https://a.com/1.png", "one");
        let dir = tempfile::tempdir().unwrap();
        let list = urls(&["https://a.com/1.png", "https://a.com/1.png"]);

        let report = download_images(&fetcher, &list, dir.path(), &settings(), &Shutdown::new())
            .await
            .unwrap();
        assert_eq!((report.downloaded, report.skipped), (1, 1));
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[tokio::test]
    async fn interrupted_run_stops_before_the_next_request() {
        let fetcher = MockFetcher::default().with("https://a.com/1.png", "one");
        let dir = tempfile::tempdir().unwrap();
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let report = download_images(
            &fetcher,
            &urls(&["https://a.com/1.png"]),
            dir.path(),
            &settings(),
            &shutdown,
        )
        .await
        .unwrap();
        assert!(report.interrupted);
        assert!(fetcher.requested().is_empty());
        assert!(DownloadLedger::open(dir.path()).unwrap().is_empty());
    }
}
