use clap::Parser;
use std::path::PathBuf;
use tokio::time::Duration;
use tracing::info;
use ui_caption_crawler::config::{self, CrawlSettings};
use ui_caption_crawler::{crawl, HttpFetcher, Shutdown, UrlResolution};

/// Crawls web pages for images and the text around them.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Output data folder, created when missing
    #[arg(long = "o", value_name = "OUTPUT_FOLDER")]
    output: PathBuf,

    /// Text file with one page URL per line
    #[arg(long = "i", value_name = "URL_FILE")]
    input: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Minimum delay between two page requests in milliseconds
    #[arg(long, default_value_t = config::DEFAULT_REQUEST_DELAY.as_millis() as u64)]
    delay_ms: u64,

    /// Blocks with fewer words are not used as image context
    #[arg(long, default_value_t = config::DEFAULT_MIN_WORDS)]
    min_words: usize,

    /// Extra regex marking boilerplate text (repeatable)
    #[arg(long = "noise-pattern", value_name = "REGEX")]
    noise_patterns: Vec<String>,

    /// Glue relative image paths onto the page URL instead of resolving them
    #[arg(long, default_value_t = false)]
    concat_relative_urls: bool,

    /// Stop the run after this many seconds
    #[arg(long)]
    run_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ui_caption_crawler::init_tracing();
    let args = Args::parse();

    let settings = CrawlSettings {
        request_timeout: Duration::from_secs(args.timeout_secs),
        request_delay: Duration::from_millis(args.delay_ms),
        min_words: args.min_words,
        noise_patterns: args.noise_patterns,
        url_resolution: if args.concat_relative_urls {
            UrlResolution::Concatenate
        } else {
            UrlResolution::Join
        },
    };

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();
    if let Some(secs) = args.run_timeout_secs {
        shutdown.trigger_after(Duration::from_secs(secs));
    }

    info!("Reading the url file {}", args.input.display());
    let page_urls = ui_caption_crawler::crawl::read_page_urls(&args.input)?;
    let fetcher = HttpFetcher::new(settings.request_timeout)?;

    crawl(&fetcher, &page_urls, &args.output, &settings, &shutdown).await?;
    Ok(())
}
