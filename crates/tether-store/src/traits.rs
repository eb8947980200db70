use tether_types::Record;

use crate::error::StoreResult;

/// Writes serialized content into the live store.
pub trait Materializer: Send + Sync {
    /// Write `serialized` into the live store and return the live record as
    /// it now exists.
    ///
    /// With `overwrite_children == false` only this record's own content is
    /// written; live descendants are left alone. With `true` the backend may
    /// also replace the record's subtree.
    ///
    /// Backend failures are returned unchanged.
    fn deserialize(&self, serialized: &Record, overwrite_children: bool) -> StoreResult<Record>;
}

/// Removes live records.
pub trait Recycler: Send + Sync {
    /// Remove `live` from the store.
    fn recycle(&self, live: &Record) -> StoreResult<()>;
}
