//! Merge-for-read.

use fieldlog_types::{Record, RecordId};
use std::collections::HashSet;

/// Merges a remote listing with the local collection into one view.
///
/// Every remote record is included first, then every local record that is
/// still pending and whose identity the remote listing does not already
/// carry. Local records the ledger has acknowledged are stale shadows and
/// never shown; a later drain purges them.
#[must_use]
pub fn merge_view(remote: Vec<Record>, local: Vec<Record>) -> Vec<Record> {
    let remote_ids: HashSet<RecordId> = remote.iter().filter_map(|record| record.id).collect();

    let mut view = remote;
    for record in local {
        if !record.is_pending() {
            continue;
        }
        if let Some(id) = record.id {
            if remote_ids.contains(&id) {
                continue;
            }
        }
        view.push(record);
    }
    view
}
