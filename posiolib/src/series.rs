//! Store-code to series mapping and canonical series rewriting.

use std::collections::BTreeMap;

use crate::model::SalesRow;

/// Rewrites an alternate "AV"-prefixed series value into canonical form:
/// the prefix becomes "T" and a zero is inserted after the leading digit,
/// so "AV312" becomes "T3012". Everything else passes through unchanged.
pub fn canonical_series(raw: &str) -> String {
    let t = raw.trim();
    if let Some(rest) = t.strip_prefix("AV") {
        let mut chars = rest.chars();
        if let Some(first) = chars.next() {
            if first.is_ascii_digit() {
                return format!("T{first}0{}", chars.as_str());
            }
        }
    }
    t.to_string()
}

/// The per-run mapping between store codes and series values, built once
/// from the sales table and read-only afterwards.
#[derive(Debug, Default)]
pub struct SeriesMap {
    by_store: BTreeMap<String, String>,
    by_series: BTreeMap<String, String>,
}

impl SeriesMap {
    /// A store code seen twice keeps the last series value. Duplicates are
    /// an upstream ambiguity, not an error.
    pub fn build(sales: &[SalesRow]) -> Self {
        let mut by_store = BTreeMap::new();
        for row in sales {
            let store = row.store.trim();
            let serie = row.serie.trim();
            if store.is_empty() || serie.is_empty() {
                continue;
            }
            by_store.insert(store.to_string(), serie.to_string());
        }
        let by_series = by_store
            .iter()
            .map(|(store, serie)| (serie.clone(), store.clone()))
            .collect();
        Self { by_store, by_series }
    }

    /// Store codes with their series, in store order.
    pub fn stores(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_store.iter().map(|(s, v)| (s.as_str(), v.as_str()))
    }

    pub fn series_for_store(&self, store: &str) -> Option<&str> {
        self.by_store.get(store.trim()).map(String::as_str)
    }

    /// Reverse lookup after canonical rewriting. `None` means the row
    /// cannot be routed to any output file and must be skipped.
    pub fn store_for_series(&self, raw: &str) -> Option<&str> {
        self.by_series
            .get(canonical_series(raw).as_str())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_store.is_empty()
    }
}
