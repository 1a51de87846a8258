//! Publication record model.
//!
//! One row of a Scopus result set, in the column layout of the Scopus CSV
//! export. Rows are read-only inputs to the aggregator: the numeric fields
//! tolerate missing or malformed source data (they deserialize to `None`)
//! so a bad cell skips one aggregate instead of failing the whole set.

use serde::{Deserialize, Deserializer, Serialize};

/// A single publication returned by a Scopus search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Article title
    #[serde(rename = "Title", default)]
    pub title: String,
    /// Author list as given by Scopus
    #[serde(rename = "Authors", default)]
    pub authors: String,
    /// Publication year; `None` when missing or non-numeric
    #[serde(rename = "Year", default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    /// Journal or other source title
    #[serde(rename = "Source title", default)]
    pub source_title: String,
    /// Document type (Article, Review, ...)
    #[serde(rename = "Document Type", default)]
    pub document_type: String,
    /// Citation count; `None` when missing or non-numeric
    #[serde(rename = "Cited by", default, deserialize_with = "lenient_count")]
    pub cited_by: Option<u64>,
    /// Digital Object Identifier
    #[serde(rename = "DOI", default)]
    pub doi: String,
}

/// Numeric cell as it arrives from JSON or CSV: a number, a string, or null
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    fn as_i64(&self) -> Option<i64> {
        match self {
            RawNumber::Int(n) => Some(*n),
            RawNumber::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            RawNumber::Float(_) => None,
            RawNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Year column: accept int, numeric string, or garbage (-> `None`)
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|r| r.as_i64())
        .and_then(|n| i32::try_from(n).ok()))
}

/// Cited-by column: accept int, numeric string, or garbage; negatives are invalid
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.as_i64()).and_then(|n| u64::try_from(n).ok()))
}
