use crate::error::{CrawlerError, FetchError};
use tokio::time::{Duration, Instant};
use tracing::debug;

/// Retrieves remote resources. One call, one physical request.
#[async_trait::async_trait]
pub trait Fetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<HttpFetcher, CrawlerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpFetcher { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let bytes = self.get(url).await?.bytes().await?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(bytes.to_vec())
    }
}

/// Keeps at least `delay` between the starts of two consecutive requests.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last_request: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Throttle {
        Throttle {
            delay,
            last_request: None,
        }
    }

    pub async fn wait(&mut self) {
        if let Some(last_request) = self.last_request.take() {
            let elapsed = Instant::now().duration_since(last_request);
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        self.last_request.replace(Instant::now());
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_url_is_a_fetch_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1)).unwrap();
        let res = fetcher.fetch_text("not a url").await;
        assert!(matches!(res, Err(FetchError::Request(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_spaces_requests() {
        let mut throttle = Throttle::new(Duration::from_millis(1000));
        let start = Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() < Duration::from_millis(1000));
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn zero_delay_throttle_does_not_sleep() {
        let mut throttle = Throttle::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..3 {
            throttle.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
