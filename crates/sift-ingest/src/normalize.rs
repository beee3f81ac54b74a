//! Row normalization: raw positional cells into pending content records.

use chrono::{DateTime, Utc};
use sift_core::{ContentId, ContentRecord, MappedField};

use crate::columns::MappingSet;

/// Category assigned to sheet rows with no mapped category column.
pub const GENERAL_CATEGORY: &str = "general";

/// Normalizes one spreadsheet row into a content record.
///
/// Returns `None` when the row has no usable title or body after mapping;
/// such rows are dropped silently so one garbage row never blocks the rest
/// of the batch. Sheet rows have no natural identifier, so each normalized
/// record gets a fresh id and the sync timestamp as its origin.
pub fn normalize_row(
    row: &[String],
    mapping: &MappingSet,
    now: DateTime<Utc>,
) -> Option<ContentRecord> {
    let title = mapping.value(row, MappedField::Title)?;
    let body = mapping.value(row, MappedField::Body)?;

    let image_ref = mapping.value(row, MappedField::ImageRef).map(str::to_string);
    let category = mapping
        .value(row, MappedField::Category)
        .unwrap_or(GENERAL_CATEGORY)
        .to_string();

    Some(ContentRecord::new(
        ContentId::new(),
        title.to_string(),
        body.to_string(),
        image_ref,
        category,
        None,
        now,
    ))
}

#[cfg(test)]
mod tests {
    use sift_core::ContentKind;

    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn full_row_normalizes_with_mixed_kind() {
        let record = normalize_row(
            &row(&["headline", "body", "sports", "https://cdn.example/a.jpg"]),
            &MappingSet::default_mapping(),
            Utc::now(),
        )
        .expect("normalized");

        assert_eq!(record.title, "headline");
        assert_eq!(record.body, "body");
        assert_eq!(record.category, "sports");
        assert_eq!(record.kind, ContentKind::Mixed);
    }

    #[test]
    fn text_only_row_gets_text_kind_and_default_category() {
        let record = normalize_row(
            &row(&["headline", "body"]),
            &MappingSet::default_mapping(),
            Utc::now(),
        )
        .expect("normalized");

        assert_eq!(record.kind, ContentKind::Text);
        assert_eq!(record.category, GENERAL_CATEGORY);
        assert!(record.image_ref.is_none());
    }

    #[test]
    fn image_only_row_is_dropped() {
        // Image without title/body fails the required-field policy.
        let dropped = normalize_row(
            &row(&["", "", "", "https://cdn.example/a.jpg"]),
            &MappingSet::default_mapping(),
            Utc::now(),
        );
        assert!(dropped.is_none());
    }

    #[test]
    fn missing_body_is_dropped() {
        let dropped =
            normalize_row(&row(&["headline only"]), &MappingSet::default_mapping(), Utc::now());
        assert!(dropped.is_none());
    }

    #[test]
    fn fresh_ids_per_row() {
        let mapping = MappingSet::default_mapping();
        let cells = row(&["t", "b"]);
        let a = normalize_row(&cells, &mapping, Utc::now()).expect("a");
        let b = normalize_row(&cells, &mapping, Utc::now()).expect("b");
        assert_ne!(a.id, b.id);
    }
}
