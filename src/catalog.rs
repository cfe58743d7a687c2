//! Product catalog export built from the sidecar metadata next to each image.
//!
//! `.json` sidecars are what the shopping crawler writes (`title`, `price`,
//! `category`, `pet_type`, ...). `.txt` sidecars are free text with a
//! `최저가: <price>` line.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Component, Path};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::Error;
use crate::files::{collect_pairs, has_extension, FilePair};
use crate::scanner;

const LOWEST_PRICE_MARKER: &str = "최저가";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub price: i64,
    pub img_url: String,
    pub category: String,
    pub pet_type: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListingMetadata {
    title: Option<String>,
    price: Option<i64>,
    category: Option<String>,
    pet_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CatalogFormat {
    Json,
    Csv,
}

/// Price from the last `최저가: N` line of a text sidecar.
fn price_from_text(text: &str) -> Result<Option<i64>, String> {
    let mut price = None;
    for line in text.lines() {
        if !line.contains(LOWEST_PRICE_MARKER) {
            continue;
        }
        let Some((_, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        price = Some(
            value
                .parse::<i64>()
                .map_err(|e| format!("bad price '{}': {}", value, e))?,
        );
    }
    Ok(price)
}

fn read_metadata(sidecar: &Path) -> Result<ListingMetadata, String> {
    let text = fs::read_to_string(sidecar).map_err(|e| e.to_string())?;
    if has_extension(sidecar, &["json".to_string()]) {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    } else {
        Ok(ListingMetadata {
            price: price_from_text(&text)?,
            ..Default::default()
        })
    }
}

fn relative_url(prefix: &str, root: &Path, image: &Path) -> String {
    let relative = image.strip_prefix(root).unwrap_or(image);
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    format!("{}{}", prefix, parts.join("/"))
}

fn entry_for(pair: &FilePair, root: &Path, config: &AppConfig) -> Option<CatalogEntry> {
    let sidecar = pair.sidecars.first()?;
    let metadata = match read_metadata(sidecar) {
        Ok(metadata) => metadata,
        Err(err) => {
            warn!("Could not read {}: {}", sidecar.display(), err);
            return None;
        }
    };

    let dir = pair.image.parent().unwrap_or(root);
    let dir_name = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let section = dir
        .strip_prefix(root)
        .ok()
        .and_then(|rel| rel.components().next())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_else(|| dir_name(root));

    Some(CatalogEntry {
        title: metadata.title.unwrap_or_else(|| pair.stem.clone()),
        price: metadata.price.unwrap_or(0),
        img_url: relative_url(&config.catalog.image_url_prefix, root, &pair.image),
        category: metadata.category.unwrap_or_else(|| dir_name(dir)),
        pet_type: metadata.pet_type.unwrap_or(section),
    })
}

/// Catalog entries for every image with a sidecar under the configured roots.
pub fn build_catalog(config: &AppConfig) -> Result<Vec<CatalogEntry>, Error> {
    let mut entries = Vec::new();

    for root in &config.root_paths {
        let root = fs::canonicalize(root)?;
        let dirs = scanner::find_listing_directories(
            &[root.to_string_lossy().into_owned()],
            &config.overflow_dir_names(),
            &config.ignore_patterns,
            &config.image_extensions,
        );

        for dir in dirs {
            let pairs = collect_pairs(&dir, &config.image_extensions, &config.sidecar_extensions)?;
            for pair in &pairs {
                match entry_for(pair, &root, config) {
                    Some(entry) => entries.push(entry),
                    None => debug!("No metadata for {}", pair.image.display()),
                }
            }
        }
    }

    Ok(entries)
}

pub fn write_catalog(
    entries: &[CatalogEntry],
    path: &Path,
    format: CatalogFormat,
) -> Result<(), Error> {
    match format {
        CatalogFormat::Json => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, entries)?;
        }
        CatalogFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)?;
            for entry in entries {
                writer.serialize(entry)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_from_text_uses_last_marker_line() {
        let text = "상품명: 츄르\n최저가: 12000\n배송: 무료\n최저가: 9900\n";
        assert_eq!(price_from_text(text), Ok(Some(9900)));
        assert_eq!(price_from_text("최저가:\n"), Ok(None));
        assert!(price_from_text("최저가: 만원").is_err());
    }

    #[test]
    fn test_relative_url_uses_forward_slashes() {
        let url = relative_url(
            "/static/",
            Path::new("/data/crawl"),
            Path::new("/data/crawl/dog/간식/껌 100g.jpg"),
        );
        assert_eq!(url, "/static/dog/간식/껌 100g.jpg");
    }
}
