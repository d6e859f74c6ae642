//! Field cleaning for raw item records

use crate::etl::EtlError;
use crate::model::ItemRecord;
use serde::Serialize;

/// Currency sign and the stray byte left by a mis-decoded pound sign
const PRICE_NOISE: &[char] = &['£', 'Â'];

/// Marker character of UTF-8 text that was decoded as CP-1252 or Latin-1
const MOJIBAKE_MARKER: char = 'â';

/// A record ready for the tabular output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRecord {
    pub title: String,
    pub category: String,
    pub price: f64,
    /// Star rating 1 to 5; `None` when the raw word was not recognised
    pub rating: Option<u8>,
}

/// Parses a raw price such as `"£51.77"`
pub fn clean_price(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_matches(|c: char| PRICE_NOISE.contains(&c) || c.is_whitespace())
        .parse()
        .ok()
}

/// Maps a rating word to its number of stars
pub fn rating_to_number(word: &str) -> Option<u8> {
    match word {
        "One" => Some(1),
        "Two" => Some(2),
        "Three" => Some(3),
        "Four" => Some(4),
        "Five" => Some(5),
        _ => None,
    }
}

/// Byte a CP-1252 decoder maps to `c`, for the 0x80..0x9F range
fn cp1252_byte(c: char) -> Option<u8> {
    let byte = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Undoes UTF-8 text that was decoded one byte per character
///
/// Only titles containing `â` are touched. Each character is mapped back to
/// the byte it was decoded from and the bytes are re-read as UTF-8; if that
/// fails at any step the title is returned unchanged.
pub fn repair_title(title: &str) -> String {
    if !title.contains(MOJIBAKE_MARKER) {
        return title.to_string();
    }

    let bytes: Option<Vec<u8>> = title
        .chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(byte) => Some(byte),
            Err(_) => cp1252_byte(c),
        })
        .collect();

    bytes
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| title.to_string())
}

/// Cleans one raw record
pub fn clean_record(record: &ItemRecord) -> Result<CleanRecord, EtlError> {
    let price = clean_price(&record.price).ok_or_else(|| EtlError::Price {
        title: record.title.clone(),
        value: record.price.clone(),
    })?;

    let rating = rating_to_number(&record.rating);
    if rating.is_none() {
        tracing::warn!(
            "Unknown rating '{}' for '{}', leaving it empty",
            record.rating,
            record.title
        );
    }

    Ok(CleanRecord {
        title: repair_title(&record.title),
        category: record.category.clone(),
        price,
        rating,
    })
}

/// Cleans every record, stopping at the first unparseable price
pub fn transform(records: &[ItemRecord]) -> Result<Vec<CleanRecord>, EtlError> {
    records.iter().map(clean_record).collect()
}
