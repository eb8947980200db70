use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;
use tether_types::{Record, RecordId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{Materializer, Recycler};

/// A mutation applied to an [`InMemoryLiveStore`], in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreOperation {
    Deserialize {
        id: RecordId,
        overwrite_children: bool,
    },
    Recycle {
        id: RecordId,
        /// Records removed along with it (its descendants).
        cascaded: usize,
    },
}

/// In-memory, HashMap-based live store.
///
/// Intended for tests, dry runs and embedding. Records are held behind a
/// `RwLock` and cloned on read and write. Every successful mutation is
/// appended to a journal readable through [`Self::operations`].
pub struct InMemoryLiveStore {
    records: RwLock<HashMap<RecordId, Record>>,
    journal: RwLock<Vec<StoreOperation>>,
    read_only: bool,
}

impl InMemoryLiveStore {
    /// Create a new empty, writable store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            journal: RwLock::new(Vec::new()),
            read_only: false,
        }
    }

    /// Create a store pre-populated with `records`. Seeding is not journaled.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let store = Self::new();
        {
            let mut map = store.records.write().expect("lock poisoned");
            for record in records {
                map.insert(record.id, record);
            }
        }
        store
    }

    /// Reject every subsequent mutation with [`StoreError::ReadOnly`].
    pub fn into_read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Fetch a copy of a live record.
    pub fn get(&self, id: &RecordId) -> Option<Record> {
        self.records.read().expect("lock poisoned").get(id).cloned()
    }

    /// Returns `true` if the record is present.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.read().expect("lock poisoned").contains_key(id)
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().expect("lock poisoned").is_empty()
    }

    /// The mutation journal, oldest first.
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.journal.read().expect("lock poisoned").clone()
    }

    fn ensure_writable(&self) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }

    fn journal(&self, op: StoreOperation) {
        self.journal.write().expect("lock poisoned").push(op);
    }
}

/// Remove every descendant of `root` from `map`, returning how many went.
fn remove_descendants(map: &mut HashMap<RecordId, Record>, root: &RecordId) -> usize {
    let mut removed = 0;
    let mut frontier = vec![*root];
    while let Some(parent) = frontier.pop() {
        let children: Vec<RecordId> = map
            .values()
            .filter(|r| r.parent == Some(parent))
            .map(|r| r.id)
            .collect();
        for child in children {
            map.remove(&child);
            removed += 1;
            frontier.push(child);
        }
    }
    removed
}

impl Default for InMemoryLiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Materializer for InMemoryLiveStore {
    fn deserialize(&self, serialized: &Record, overwrite_children: bool) -> StoreResult<Record> {
        self.ensure_writable()?;
        let mut map = self.records.write().expect("lock poisoned");
        if overwrite_children {
            let removed = remove_descendants(&mut map, &serialized.id);
            debug!(id = %serialized.id, removed, "cleared live subtree before deserialize");
        }
        map.insert(serialized.id, serialized.clone());
        drop(map);

        self.journal(StoreOperation::Deserialize {
            id: serialized.id,
            overwrite_children,
        });
        debug!(id = %serialized.id, name = %serialized.name, "deserialized record");
        Ok(serialized.clone())
    }
}

impl Recycler for InMemoryLiveStore {
    fn recycle(&self, live: &Record) -> StoreResult<()> {
        self.ensure_writable()?;
        let mut map = self.records.write().expect("lock poisoned");
        if map.remove(&live.id).is_none() {
            return Err(StoreError::NotFound(live.id));
        }
        let cascaded = remove_descendants(&mut map, &live.id);
        drop(map);

        self.journal(StoreOperation::Recycle {
            id: live.id,
            cascaded,
        });
        debug!(id = %live.id, cascaded, "recycled record");
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryLiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLiveStore")
            .field("record_count", &self.len())
            .field("read_only", &self.read_only)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_types::{ItemVersion, TemplateId};

    fn make_record(name: &str) -> Record {
        Record::new(RecordId::new(), name, TemplateId::new())
            .with_version(ItemVersion::new("en", 1).unwrap().with_revision("r1"))
            .unwrap()
    }

    fn child_of(parent: &Record, name: &str) -> Record {
        make_record(name).with_parent(parent.id)
    }

    #[test]
    fn deserialize_inserts_new_record() {
        let store = InMemoryLiveStore::new();
        let rec = make_record("Home");
        let live = store.deserialize(&rec, false).unwrap();
        assert_eq!(live, rec);
        assert_eq!(store.get(&rec.id), Some(rec.clone()));
        assert_eq!(
            store.operations(),
            vec![StoreOperation::Deserialize {
                id: rec.id,
                overwrite_children: false
            }]
        );
    }

    #[test]
    fn deserialize_overwrites_existing_content() {
        let original = make_record("Home");
        let store = InMemoryLiveStore::with_records([original.clone()]);
        let mut changed = original.clone();
        changed.name = "Start".into();

        store.deserialize(&changed, false).unwrap();
        assert_eq!(store.get(&original.id).unwrap().name, "Start");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn shallow_deserialize_keeps_children() {
        let parent = make_record("Home");
        let child = child_of(&parent, "About");
        let store = InMemoryLiveStore::with_records([parent.clone(), child.clone()]);

        store.deserialize(&parent, false).unwrap();
        assert!(store.contains(&child.id));
        assert_eq!(store.get(&child.id).and_then(|r| r.parent), Some(parent.id));
    }

    #[test]
    fn deep_deserialize_clears_subtree() {
        let parent = make_record("Home");
        let child = child_of(&parent, "About");
        let grandchild = child_of(&child, "Team");
        let store =
            InMemoryLiveStore::with_records([parent.clone(), child.clone(), grandchild.clone()]);

        store.deserialize(&parent, true).unwrap();
        assert!(store.contains(&parent.id));
        assert!(!store.contains(&child.id));
        assert!(!store.contains(&grandchild.id));
    }

    #[test]
    fn recycle_removes_record_and_descendants() {
        let parent = make_record("Home");
        let child = child_of(&parent, "About");
        let sibling = make_record("Elsewhere");
        let store =
            InMemoryLiveStore::with_records([parent.clone(), child.clone(), sibling.clone()]);

        store.recycle(&parent).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(&sibling.id));
        assert_eq!(
            store.operations(),
            vec![StoreOperation::Recycle {
                id: parent.id,
                cascaded: 1
            }]
        );
    }

    #[test]
    fn recycle_unknown_record_is_not_found() {
        let store = InMemoryLiveStore::new();
        let rec = make_record("Ghost");
        let err = store.recycle(&rec).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == rec.id));
        assert!(store.operations().is_empty());
    }

    #[test]
    fn read_only_store_rejects_mutations() {
        let rec = make_record("Home");
        let store = InMemoryLiveStore::with_records([rec.clone()]).into_read_only();
        assert!(matches!(
            store.deserialize(&rec, false),
            Err(StoreError::ReadOnly)
        ));
        assert!(matches!(store.recycle(&rec), Err(StoreError::ReadOnly)));
        assert!(store.contains(&rec.id));
        assert!(store.operations().is_empty());
    }

    #[test]
    fn debug_shows_count() {
        let store = InMemoryLiveStore::with_records([make_record("a"), make_record("b")]);
        let dbg = format!("{store:?}");
        assert!(dbg.contains("record_count: 2"));
    }
}
