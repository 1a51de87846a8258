//! Result aggregation.
//!
//! Computes the three derived summaries behind the result charts: document
//! type frequencies, a publications-per-year histogram over a fixed range,
//! and the top-10 cited-source ranking. Pure functions over a borrowed
//! result set; input rows are never mutated and an empty set produces an
//! empty report, not an error.
//!
//! Malformed cells are handled per aggregate: a record with no usable year
//! is dropped from the histogram (and reported via `skipped_records`) but
//! still counts toward document types and the citation ranking.

use crate::record::PublicationRecord;
use serde::Serialize;
use std::collections::HashMap;

/// Default number of equal-width histogram bins
pub const DEFAULT_BIN_COUNT: usize = 20;

/// Closed year range covered by the histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self { min: 2000, max: 2025 }
    }
}

impl YearRange {
    /// Construct a validated range; `min` must not exceed `max`.
    pub fn new(min: i32, max: i32) -> crate::error::Result<Self> {
        if min > max {
            return Err(crate::error::ScopusError::Config(format!(
                "Invalid year range: {} is after {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }
}

/// Occurrence count for one document type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub document_type: String,
    pub count: usize,
}

/// One histogram bin; `start` inclusive, `end` exclusive except for the last bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Publications-per-year histogram over a fixed range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearHistogram {
    pub range: YearRange,
    pub bins: Vec<HistogramBin>,
    /// Records whose year fell outside the range (dropped, not an error)
    pub out_of_range: usize,
}

/// Total citations accumulated by one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCitations {
    pub source_title: String,
    pub total_cited_by: u64,
}

/// The three derived aggregates plus the diagnostic skip count
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub type_counts: Vec<TypeCount>,
    pub year_histogram: YearHistogram,
    pub citation_ranking: Vec<SourceCitations>,
    /// Records with a missing or non-numeric year (non-fatal warning)
    pub skipped_records: usize,
}

/// Count occurrences per document type, sorted by descending count.
///
/// Ties keep first-seen input order (stable sort). Records with a blank
/// document type are skipped.
pub fn type_counts(records: &[PublicationRecord]) -> Vec<TypeCount> {
    let mut counts: Vec<TypeCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let doc_type = record.document_type.trim();
        if doc_type.is_empty() {
            continue;
        }
        match index.get(doc_type) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(doc_type, counts.len());
                counts.push(TypeCount {
                    document_type: doc_type.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Bucket records by year into `bin_count` equal-width bins across `range`.
///
/// Years outside the range are excluded and counted in `out_of_range`;
/// records without a usable year are ignored here (the caller reports them
/// as skipped). The last bin includes the range maximum.
pub fn year_histogram(
    records: &[PublicationRecord],
    range: YearRange,
    bin_count: usize,
) -> YearHistogram {
    let bin_count = bin_count.max(1);
    let span = f64::from(range.max) - f64::from(range.min);
    let width = span / bin_count as f64;

    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            start: f64::from(range.min) + i as f64 * width,
            end: f64::from(range.min) + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    let mut out_of_range = 0usize;
    for record in records {
        let Some(year) = record.year else { continue };
        if !range.contains(year) {
            out_of_range += 1;
            continue;
        }
        let idx = if width > 0.0 {
            (((f64::from(year) - f64::from(range.min)) / width) as usize).min(bin_count - 1)
        } else {
            0
        };
        bins[idx].count += 1;
    }

    YearHistogram { range, bins, out_of_range }
}

/// Sum citations per source title and rank the top 10.
///
/// Missing cited-by counts as zero; blank source titles are skipped.
/// Sorting is stable, so sources with equal totals keep first-seen order.
pub fn citation_ranking(records: &[PublicationRecord]) -> Vec<SourceCitations> {
    let mut totals: Vec<SourceCitations> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let source = record.source_title.trim();
        if source.is_empty() {
            continue;
        }
        let cited = record.cited_by.unwrap_or(0);
        match index.get(source) {
            Some(&i) => totals[i].total_cited_by += cited,
            None => {
                index.insert(source, totals.len());
                totals.push(SourceCitations {
                    source_title: source.to_string(),
                    total_cited_by: cited,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total_cited_by.cmp(&a.total_cited_by));
    totals.truncate(10);
    totals
}

/// Compute the full report over a borrowed result set.
///
/// The year range only filters the histogram; type counts and the citation
/// ranking see every record.
pub fn aggregate(records: &[PublicationRecord], range: YearRange) -> AggregateReport {
    aggregate_with_bins(records, range, DEFAULT_BIN_COUNT)
}

/// Like [`aggregate`], with an explicit histogram bin count.
pub fn aggregate_with_bins(
    records: &[PublicationRecord],
    range: YearRange,
    bin_count: usize,
) -> AggregateReport {
    let skipped_records = records.iter().filter(|r| r.year.is_none()).count();

    AggregateReport {
        type_counts: type_counts(records),
        year_histogram: year_histogram(records, range, bin_count),
        citation_ranking: citation_ranking(records),
        skipped_records,
    }
}
