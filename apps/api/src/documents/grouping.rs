//! Monthly document timeline. Buckets are sparse: a month with no documents
//! produces no bucket.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::document::Document;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentGroup {
    /// e.g. "September 2025"
    pub month_year: String,
    /// 1–12
    pub month: u32,
    pub year: i32,
    pub documents: Vec<Document>,
}

pub fn format_month_year(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Sorts newest-first, then buckets by (year, month) in first-seen order,
/// so buckets come out newest-first as well.
pub fn group_documents_by_month(documents: &[Document]) -> Vec<DocumentGroup> {
    let mut sorted = documents.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut groups: Vec<DocumentGroup> = Vec::new();
    let mut index: HashMap<(i32, u32), usize> = HashMap::new();

    for doc in sorted {
        let key = (doc.date.year(), doc.date.month());
        match index.get(&key) {
            Some(&i) => groups[i].documents.push(doc),
            None => {
                index.insert(key, groups.len());
                groups.push(DocumentGroup {
                    month_year: format_month_year(doc.date),
                    month: key.1,
                    year: key.0,
                    documents: vec![doc],
                });
            }
        }
    }

    groups
}
