//! Property-based tests for ingestion's pure logic.
//!
//! Deterministic, in-memory checks of column addressing and the
//! normalization policy; no database involved.

use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use sift_core::ContentKind;
use sift_ingest::{column_index, MappingSet};

/// Deterministic property test configuration for CI stability.
fn proptest_config() -> ProptestConfig {
    ProptestConfig { cases: 256, fork: false, failure_persistence: None, ..ProptestConfig::default() }
}

/// Inverse of `column_index`, for round-trip checking.
fn letters_for(mut index: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + u8::try_from(index % 26).expect("mod 26 fits"));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).expect("ascii letters")
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Letter addressing round-trips for any reasonable column position.
    #[test]
    fn column_letters_round_trip(index in 0usize..100_000) {
        let letters = letters_for(index);
        prop_assert_eq!(column_index(&letters), Some(index));
    }

    /// Case never changes which column a letter addresses.
    #[test]
    fn column_letters_are_case_insensitive(index in 0usize..10_000) {
        let upper = letters_for(index);
        let lower = upper.to_ascii_lowercase();
        prop_assert_eq!(column_index(&upper), column_index(&lower));
    }

    /// Kind derivation depends only on the presence of body and image.
    #[test]
    fn kind_matches_payload_shape(
        body in prop::string::string_regex("[a-zA-Z0-9 ]{0,40}").unwrap(),
        image in prop::option::of(prop::string::string_regex("[a-z]{1,20}\\.png").unwrap()),
    ) {
        let kind = ContentKind::derive(&body, image.as_deref());
        let has_body = !body.is_empty();
        let has_image = image.as_deref().is_some_and(|i| !i.is_empty());

        let expected = match (has_body, has_image) {
            (true, true) => ContentKind::Mixed,
            (false, true) => ContentKind::Image,
            _ => ContentKind::Text,
        };
        prop_assert_eq!(kind, expected);
    }

    /// A row missing title or body never normalizes, whatever else it has.
    #[test]
    fn incomplete_rows_always_drop(
        title in prop::option::of(prop::string::string_regex("[a-z ]{1,20}").unwrap()),
        body in prop::option::of(prop::string::string_regex("[a-z ]{1,20}").unwrap()),
        image in prop::string::string_regex("[a-z]{1,10}\\.jpg").unwrap(),
    ) {
        let row = vec![
            title.clone().unwrap_or_default(),
            body.clone().unwrap_or_default(),
            String::new(),
            image,
        ];
        let normalized = sift_ingest::normalize::normalize_row(
            &row,
            &MappingSet::default_mapping(),
            chrono::Utc::now(),
        );

        let complete = title.is_some_and(|t| !t.trim().is_empty())
            && body.is_some_and(|b| !b.trim().is_empty());
        prop_assert_eq!(normalized.is_some(), complete);
    }
}
