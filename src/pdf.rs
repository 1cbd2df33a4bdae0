//! Metadata extraction from PDF documents.
//!
//! Reads the six recognized keys from a PDF's document information
//! dictionary. Pure and stateless; the stores never call into this module.

use std::path::Path;

use lopdf::{Dictionary, Object};
use time::macros::format_description;
use time::{Date, Month};

use crate::{MetadataKey, MetadataMap};

/// Opens a PDF, returning `None` if the file is missing or not a readable PDF.
pub fn open(path: impl AsRef<Path>) -> Option<lopdf::Document> {
    let path = path.as_ref();
    match lopdf::Document::load(path) {
        Ok(document) => Some(document),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "not a readable PDF");
            None
        }
    }
}

/// Opens `path` and reads its metadata in one step.
pub fn preview(path: impl AsRef<Path>) -> Option<MetadataMap> {
    open(path).map(|document| read_metadata(&document))
}

/// Reads the recognized metadata keys from an opened PDF.
///
/// Keys whose attribute is absent, or is not a string, are omitted. Date
/// attributes are rendered as a medium-style date without time.
pub fn read_metadata(document: &lopdf::Document) -> MetadataMap {
    let mut map = MetadataMap::new();
    let Some(info) = info_dictionary(document) else {
        return map;
    };

    for key in MetadataKey::ALL {
        let Some(value) = info
            .get(key.as_str().as_bytes())
            .ok()
            .and_then(|object| resolve(document, object))
        else {
            continue;
        };

        let Some(text) = text_value(value) else {
            continue;
        };

        let text = if key.is_date() {
            format_pdf_date(&text).unwrap_or(text)
        } else {
            text
        };
        map.insert(key, text);
    }

    map
}

/// Converts a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`) to "Jan 5, 2024".
///
/// Only the date part is used; month and day default to 1 when omitted, as
/// the PDF date syntax allows. Returns `None` if the string is not a PDF date.
pub fn format_pdf_date(raw: &str) -> Option<String> {
    let date = parse_pdf_date(raw)?;
    date.format(format_description!(
        "[month repr:short] [day padding:none], [year]"
    ))
    .ok()
}

fn parse_pdf_date(raw: &str) -> Option<Date> {
    let digits = raw.trim().strip_prefix("D:").unwrap_or(raw.trim());

    let field = |range: std::ops::Range<usize>, default: u8| -> Option<u32> {
        match digits.get(range.clone()) {
            Some(part) if part.bytes().all(|b| b.is_ascii_digit()) => part.parse().ok(),
            Some(_) => None,
            // Omitted fields take the default; a truncated one is malformed.
            None if digits.len() <= range.start => Some(u32::from(default)),
            None => None,
        }
    };

    let year = digits.get(0..4)?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month = Month::try_from(u8::try_from(field(4..6, 1)?).ok()?).ok()?;
    let day = u8::try_from(field(6..8, 1)?).ok()?;

    Date::from_calendar_date(year, month, day).ok()
}

fn info_dictionary(document: &lopdf::Document) -> Option<&Dictionary> {
    let info = document.trailer.get(b"Info").ok()?;
    resolve(document, info)?.as_dict().ok()
}

fn resolve<'a>(document: &'a lopdf::Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn text_value(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

/// Decodes a PDF text string: UTF-16BE or UTF-8 when BOM-prefixed, otherwise
/// PDFDocEncoding (treated as Latin-1).
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}
