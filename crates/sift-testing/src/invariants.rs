//! Invariant checks shared by integration tests.

use anyhow::Result;
use sift_core::{ContentId, Partition, Storage};

/// Returns the partitions currently holding the given id.
///
/// # Errors
///
/// Returns an error if a partition lookup fails.
pub async fn partitions_holding(storage: &Storage, id: ContentId) -> Result<Vec<Partition>> {
    let mut holding = Vec::new();
    for partition in Partition::ALL {
        if storage.content.find(partition, id).await?.is_some() {
            holding.push(partition);
        }
    }
    Ok(holding)
}

/// Asserts a record lives in exactly the expected partition.
///
/// This is the partition exclusivity invariant: never zero partitions,
/// never more than one.
///
/// # Errors
///
/// Returns an error if a lookup fails.
///
/// # Panics
///
/// Panics if the id is absent, duplicated, or in the wrong partition.
pub async fn assert_in_exactly(storage: &Storage, id: ContentId, expected: Partition) -> Result<()> {
    let holding = partitions_holding(storage, id).await?;
    assert_eq!(
        holding,
        vec![expected],
        "content {id} expected only in {expected}, found in {holding:?}"
    );
    Ok(())
}
