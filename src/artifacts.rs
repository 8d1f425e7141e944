use crate::crawl::ImageTable;
use crate::error::CrawlerError;
use crate::extract::ImageRecord;
use reqwest::Url;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const IMAGE_LIST_FILE: &str = "ui_images.p";
pub const ALT_TEXTS_FILE: &str = "ui_alt_texts.csv";
pub const TEXT_ABOVE_FILE: &str = "ui_instructions_preceding.csv";
pub const TEXT_BELOW_FILE: &str = "ui_instructions_succeeding.csv";
pub const CLASS_NAMES_FILE: &str = "ui_image_url_to_image_class_names.csv";

type Column = (&'static str, &'static str, fn(&ImageRecord) -> &str);

const MAPPINGS: [Column; 4] = [
    (ALT_TEXTS_FILE, "Image_Alt_Text", alt_text),
    (TEXT_ABOVE_FILE, "Text_Above", text_above),
    (TEXT_BELOW_FILE, "Text_Below", text_below),
    (CLASS_NAMES_FILE, "Class_Name", class_name),
];

fn alt_text(r: &ImageRecord) -> &str {
    &r.alt_text
}

fn text_above(r: &ImageRecord) -> &str {
    &r.text_above
}

fn text_below(r: &ImageRecord) -> &str {
    &r.text_below
}

fn class_name(r: &ImageRecord) -> &str {
    &r.class_name
}

/// Writes the image list and the four `Image_Url,<value>` tables.
pub fn write_artifacts(folder: &Path, table: &ImageTable) -> Result<Vec<PathBuf>, CrawlerError> {
    let mut written = vec![];

    let list_path = folder.join(IMAGE_LIST_FILE);
    write_image_list(&list_path, table.image_urls())?;
    written.push(list_path);

    for (file_name, column, value) in MAPPINGS {
        let path = folder.join(file_name);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["Image_Url", column])?;
        for record in table.records() {
            writer.write_record([record.image_url.as_str(), value(record)])?;
        }
        writer.flush().map_err(CrawlerError::io(&path))?;
        written.push(path);
    }

    info!(
        "Wrote {} image records to {}",
        table.len(),
        folder.display()
    );
    Ok(written)
}

pub fn write_image_list<'a, I>(path: &Path, urls: I) -> Result<(), CrawlerError>
where
    I: IntoIterator<Item = &'a str>,
{
    let urls: Vec<&str> = urls.into_iter().collect();
    let file = File::create(path).map_err(CrawlerError::io(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &urls)?;
    writer.flush().map_err(CrawlerError::io(path))
}

/// Reads an image URL list written by the crawler, or a plain text file with
/// one URL per line, and repairs URLs that were wrapped across lines.
pub fn read_image_url_list(path: &Path) -> Result<Vec<String>, CrawlerError> {
    let content = fs::read_to_string(path).map_err(CrawlerError::io(path))?;
    let lines: Vec<String> = match serde_json::from_str(&content) {
        Ok(lines) => lines,
        Err(_) => content.lines().map(ToString::to_string).collect(),
    };
    Ok(reassemble_wrapped_urls(lines))
}

/// A line with an absolute URL prefix starts a new URL; any other line
/// continues the previous one. Lines holding a complete URL of another
/// scheme (`data:`, `javascript:`, ...) are not images and are dropped.
pub fn reassemble_wrapped_urls<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut urls: Vec<String> = vec![];
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("http://") || line.starts_with("https://") {
            urls.push(line.to_string());
        } else if let Ok(url) = Url::parse(line) {
            warn!("Dropping non-http {} URL: {}", url.scheme(), line);
        } else if let Some(last) = urls.last_mut() {
            last.push_str(line);
        } else {
            warn!("Dropping fragment with no preceding URL: {}", line);
        }
    }
    urls
}
