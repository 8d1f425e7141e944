use crate::document::{Direction, DocumentOrder, Node};
use crate::error::CrawlerError;
use itertools::Itertools;
use lazy_regex::{regex, Regex};
use lazy_static::lazy_static;
use reqwest::Url;
use scraper::{ElementRef, Html};
use tracing::debug;

/// Tags whose text may serve as the context of an image.
pub const BLOCK_TAGS: [&str; 4] = ["p", "div", "ul", "li"];

const E: &str = "Invalid noise pattern";
lazy_static! {
    static ref DEFAULT_NOISE: Vec<Regex> = vec![
        Regex::new(r"(?i)^(advertisement|advertisements|sponsored|sponsored content|ad)$").expect(E),
        Regex::new(r"(?i)\bskip to (main )?content\b").expect(E),
        Regex::new(r"(?i)\b(accept|allow) (all )?cookies\b").expect(E),
        Regex::new(r"(?i)\bsubscribe to (our|the) newsletter\b").expect(E),
        Regex::new(r"(?i)^(home|menu|search|log ?in|sign ?in|sign ?up|share|previous|next)( [|/>»] .*)?$").expect(E),
        Regex::new(r"(?i)(©|\(c\)|copyright) .*all rights reserved").expect(E),
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub image_url: String,
    pub alt_text: String,
    pub class_name: String,
    pub text_above: String,
    pub text_below: String,
}

/// How a relative `src` is turned into an absolute image URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlResolution {
    /// RFC 3986 reference resolution against the page URL.
    Join,
    /// Page URL and `src` glued together whenever `src` lacks "http".
    /// Matches datasets produced by earlier crawls.
    Concatenate,
}

/// Absolute URL for an image `src`. In `Join` mode only http(s) URLs come
/// out; `data:` placeholders and other schemes give `None`.
pub fn resolve_image_url(page_url: &str, src: &str, resolution: UrlResolution) -> Option<String> {
    match resolution {
        UrlResolution::Concatenate => {
            if src.contains("http") {
                Some(src.to_string())
            } else {
                Some(format!("{}{}", page_url, src))
            }
        }
        UrlResolution::Join => {
            let src = src.trim();
            let url = match Url::parse(src) {
                Ok(url) => url,
                Err(_) => match Url::parse(page_url).and_then(|base| base.join(src)) {
                    Ok(url) => url,
                    Err(err) => {
                        debug!("Cannot join {} onto {}: {}", src, page_url, err);
                        return Some(format!("{}{}", page_url, src));
                    }
                },
            };
            if matches!(url.scheme(), "http" | "https") {
                Some(url.to_string())
            } else {
                debug!("Skipping {} image on {}", url.scheme(), page_url);
                None
            }
        }
    }
}

/// Collapses every whitespace run into one space and trims the ends.
pub fn clean_text(text: &str) -> String {
    regex!(r"\s+").replace_all(text, " ").trim().to_string()
}

/// Decides whether a candidate block is unusable as image context.
pub trait ContentFilter {
    fn rejects(&self, text: &str) -> bool;
}

/// Rejects text shorter than `min_words` or matching a noise pattern.
#[derive(Debug, Clone)]
pub struct WordCountFilter {
    min_words: usize,
    noise: Vec<Regex>,
}

impl WordCountFilter {
    pub fn new(min_words: usize) -> WordCountFilter {
        WordCountFilter {
            min_words,
            noise: DEFAULT_NOISE.clone(),
        }
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Result<WordCountFilter, CrawlerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for p in patterns {
            self.noise.push(Regex::new(p.as_ref())?);
        }
        Ok(self)
    }
}

impl ContentFilter for WordCountFilter {
    fn rejects(&self, text: &str) -> bool {
        text.split_whitespace().count() < self.min_words
            || self.noise.iter().any(|re| re.is_match(text))
    }
}

pub struct Extractor {
    filter: Box<dyn ContentFilter + Send + Sync>,
    resolution: UrlResolution,
}

impl Extractor {
    pub fn new<F>(filter: F, resolution: UrlResolution) -> Extractor
    where
        F: ContentFilter + Send + Sync + 'static,
    {
        Extractor {
            filter: Box::new(filter),
            resolution,
        }
    }

    /// One record per `<img>` carrying both `src` and `alt` whose source resolves,
    /// in document order.
    pub fn extract(&self, doc: &Html, page_url: &str) -> Vec<ImageRecord> {
        let order = DocumentOrder::new(doc);
        order
            .iter()
            .filter_map(|(i, node)| {
                let el = node.element()?;
                if el.value().name() != "img" {
                    return None;
                }
                let src = el.value().attr("src")?;
                let alt = el.value().attr("alt")?;
                let image_url = resolve_image_url(page_url, src, self.resolution)?;
                Some(ImageRecord {
                    image_url,
                    alt_text: alt.to_string(),
                    class_name: el
                        .value()
                        .attr("class")
                        .map(|c| c.split_whitespace().join(" "))
                        .unwrap_or_default(),
                    text_above: self
                        .nearest_block_text(&order, i, Direction::Backward)
                        .unwrap_or_default(),
                    text_below: self
                        .nearest_block_text(&order, i, Direction::Forward)
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Cleaned text of the closest block in `direction` that the filter
    /// accepts. Rejected blocks are stepped over, so a short paragraph gives
    /// way to a longer enclosing or more distant block.
    pub fn nearest_block_text(
        &self,
        order: &DocumentOrder,
        from: usize,
        direction: Direction,
    ) -> Option<String> {
        order.walk(from, direction).find_map(|i| {
            let el = order.get(i).and_then(Node::element)?;
            if !BLOCK_TAGS.contains(&el.value().name()) {
                return None;
            }
            let text = block_text(el);
            if self.filter.rejects(&text) {
                None
            } else {
                Some(text)
            }
        })
    }
}

fn block_text(el: ElementRef) -> String {
    clean_text(&el.text().collect::<String>())
}
