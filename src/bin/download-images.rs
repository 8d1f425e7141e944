use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::time::Duration;
use ui_caption_crawler::artifacts::read_image_url_list;
use ui_caption_crawler::config::{self, DownloadSettings};
use ui_caption_crawler::{download_images, HttpFetcher, Shutdown};

/// Downloads the images listed by a crawl, resuming from the ledger next to
/// the list.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Image URL list written by the crawler (ui_images.p)
    #[arg(long = "i", value_name = "IMAGE_URL_FILE")]
    input: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Minimum delay between two downloads in milliseconds
    #[arg(long, default_value_t = config::DEFAULT_REQUEST_DELAY.as_millis() as u64)]
    delay_ms: u64,

    /// Stop the run after this many seconds
    #[arg(long)]
    run_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ui_caption_crawler::init_tracing();
    let args = Args::parse();

    let settings = DownloadSettings {
        request_timeout: Duration::from_secs(args.timeout_secs),
        request_delay: Duration::from_millis(args.delay_ms),
    };

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();
    if let Some(secs) = args.run_timeout_secs {
        shutdown.trigger_after(Duration::from_secs(secs));
    }

    let folder = args
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let image_urls = read_image_url_list(&args.input)?;
    let fetcher = HttpFetcher::new(settings.request_timeout)?;

    download_images(&fetcher, &image_urls, &folder, &settings, &shutdown).await?;
    Ok(())
}
