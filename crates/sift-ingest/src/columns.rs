//! Spreadsheet column addressing and mapping application.

use sift_core::{ColumnMapping, CoreError, MappedField, Result};

/// Translates a spreadsheet column letter to a zero-based index.
///
/// Base-26 letters: A=0, B=1, ..., Z=25, AA=26, AB=27. Case-insensitive.
/// Returns `None` for empty input or non-alphabetic characters.
pub fn column_index(letter: &str) -> Option<usize> {
    if letter.is_empty() {
        return None;
    }

    let mut index: usize = 0;
    for c in letter.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        index = index * 26 + (c as usize - 'A' as usize + 1);
    }

    Some(index - 1)
}

/// A resolved set of column mappings ready to apply to raw rows.
#[derive(Debug, Clone)]
pub struct MappingSet {
    mappings: Vec<(usize, MappedField)>,
}

impl MappingSet {
    /// Resolves configured mappings into positional lookups.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unparseable column letter.
    pub fn from_mappings(mappings: &[ColumnMapping]) -> Result<Self> {
        let mut resolved = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let index = column_index(&mapping.letter).ok_or_else(|| {
                CoreError::InvalidInput(format!("bad column letter: {:?}", mapping.letter))
            })?;
            resolved.push((index, mapping.field));
        }

        Ok(Self { mappings: resolved })
    }

    /// The mapping used when none is configured: A=title, B=body,
    /// C=category, D=image. Matches the source sheet's column order.
    pub fn default_mapping() -> Self {
        Self {
            mappings: vec![
                (0, MappedField::Title),
                (1, MappedField::Body),
                (2, MappedField::Category),
                (3, MappedField::ImageRef),
            ],
        }
    }

    /// Extracts the value mapped to `field` from a raw row.
    ///
    /// Returns `None` when no column maps to the field or the row is too
    /// short; whitespace-only cells count as absent.
    pub fn value<'a>(&self, row: &'a [String], field: MappedField) -> Option<&'a str> {
        self.mappings
            .iter()
            .filter(|(_, f)| *f == field)
            .find_map(|(index, _)| row.get(*index))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
    }
}
