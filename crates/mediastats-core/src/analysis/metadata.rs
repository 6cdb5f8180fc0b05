/// Model-name and image-size extraction from generation metadata.
///
/// Metadata text comes in two shapes: the flat `Key: value` parameter
/// listing and JSON blobs. Extraction tries the flat form first, then the
/// JSON form, then (for sizes) a bare `WxH` token anywhere in the text.
/// At most one model and one size occurrence is counted per image.
use crate::model::MetadataSummary;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Entries kept per mapping (models, sizes).
pub const TOP_METADATA: usize = 10;

static MODEL_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)model:\s*([^\n,]+)").unwrap());
static MODEL_JSON: Lazy<Regex> = Lazy::new(|| Regex::new(r#""model":\s*"([^"]+)""#).unwrap());

static SIZE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)size:\s*(\d+x\d+)").unwrap());
static SIZE_JSON: Lazy<Regex> = Lazy::new(|| Regex::new(r#""size":\s*"(\d+x\d+)""#).unwrap());
static SIZE_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{3,5}x\d{3,5})").unwrap());

/// The model name recorded in `text`, if any.
pub fn extract_model(text: &str) -> Option<String> {
    for pattern in [&MODEL_KEY, &MODEL_JSON] {
        if let Some(caps) = pattern.captures(text) {
            let value = caps[1].trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// The `WxH` size recorded in `text`, if any.
///
/// The bare fallback requires 3 to 5 digits per side so stray small numbers
/// (step counts, CFG values) do not read as sizes.
pub fn extract_size(text: &str) -> Option<String> {
    for pattern in [&SIZE_KEY, &SIZE_JSON, &SIZE_BARE] {
        if let Some(caps) = pattern.captures(text) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Frequency mappings of models and sizes across the analyzed subset.
///
/// Each mapping keeps the [`TOP_METADATA`] most frequent entries, ties
/// resolved by name ascending.
pub fn summarise_metadata<'a, I>(texts: I) -> MetadataSummary
where
    I: IntoIterator<Item = &'a str>,
{
    let mut models: HashMap<String, u64> = HashMap::new();
    let mut sizes: HashMap<String, u64> = HashMap::new();

    for text in texts {
        if let Some(model) = extract_model(text) {
            *models.entry(model).or_insert(0) += 1;
        }
        if let Some(size) = extract_size(text) {
            *sizes.entry(size).or_insert(0) += 1;
        }
    }

    MetadataSummary {
        models: cap_by_count(models),
        sizes: cap_by_count(sizes),
    }
}

fn cap_by_count(counts: HashMap<String, u64>) -> std::collections::BTreeMap<String, u64> {
    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(TOP_METADATA);
    ranked.into_iter().collect()
}
