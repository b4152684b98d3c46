//! Gallery images of content records.
//!
//! Stored `images` column holds a JSON list of image references, but older
//! rows may contain a single plain reference (or a JSON string). On read we
//! always hand out a list:
//!
//! 1. a list is kept as is,
//! 2. a single value becomes one element list,
//! 3. with no images the cover image is used,
//! 4. otherwise the list is empty.

use serde_json::Value;

/// Interprets raw content of the `images` column
pub fn parse_stored(raw: Option<&str>) -> Option<Value> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(raw.to_string())),
    }
}

/// Value for the `images` column, `None` stores NULL
pub fn to_stored(images: Option<&[String]>) -> Result<Option<String>, serde_json::Error> {
    images.map(serde_json::to_string).transpose()
}

pub fn normalize_images(images: Option<&Value>, cover_image: Option<&str>) -> Vec<String> {
    match images {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_ref).collect(),
        Some(value) => match scalar_ref(value) {
            Some(image) => vec![image],
            None => cover_fallback(cover_image),
        },
        None => cover_fallback(cover_image),
    }
}

fn scalar_ref(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn cover_fallback(cover_image: Option<&str>) -> Vec<String> {
    cover_image
        .filter(|c| !c.trim().is_empty())
        .map(|c| vec![c.to_string()])
        .unwrap_or_default()
}
