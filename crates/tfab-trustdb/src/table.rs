use std::collections::{BTreeMap, HashMap};

use tfab_types::{Version, Versioned};

/// Insertion-ordered table of one versioned object family.
///
/// Rows are keyed by `(owner, version)`. The table itself does no locking;
/// the backend owns the synchronization, so composite writes spanning
/// several tables can share one critical section.
pub struct VersionedTable<T: Versioned> {
    rows: HashMap<T::Owner, BTreeMap<u64, T>>,
    /// Global insertion log; `get_all` replays it verbatim.
    order: Vec<(T::Owner, u64)>,
}

impl<T: Versioned> VersionedTable<T> {
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Insert an object under its own `(owner, version)` key.
    ///
    /// Returns the number of rows written: 0 if the key already exists
    /// (idempotent, payload ignored), 1 otherwise. A new row is visible to
    /// every subsequent read.
    pub fn insert(&mut self, object: &T) -> u64 {
        let owner = object.owner();
        let version = object.version();
        let versions = self.rows.entry(owner.clone()).or_default();
        if versions.contains_key(&version) {
            return 0;
        }
        versions.insert(version, object.clone());
        self.order.push((owner, version));
        1
    }

    /// Look up an object, resolving [`Version::Latest`] to the owner's
    /// highest stored version first.
    pub fn get(&self, owner: &T::Owner, version: Version) -> Option<&T> {
        let versions = self.rows.get(owner)?;
        match version {
            Version::Latest => versions.last_key_value().map(|(_, object)| object),
            Version::At(v) => versions.get(&v),
        }
    }

    /// The owner's highest stored version, if any.
    pub fn max_version(&self, owner: &T::Owner) -> Option<u64> {
        self.rows
            .get(owner)
            .and_then(|versions| versions.last_key_value())
            .map(|(version, _)| *version)
    }

    /// All stored objects across all owners, in global insertion order.
    pub fn get_all(&self) -> impl Iterator<Item = &T> {
        self.order
            .iter()
            .filter_map(|(owner, version)| self.rows.get(owner)?.get(version))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<T: Versioned> Default for VersionedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfab_types::{Isd, Trc, Validity};

    fn trc(isd: u16, version: u64) -> Trc {
        Trc {
            isd: Isd(isd),
            version,
            description: format!("ISD {isd} root v{version}"),
            validity: Validity {
                not_before: 1_000,
                not_after: 2_000,
            },
            core_ases: vec![format!("{isd}-ff00:0:110").parse().unwrap()],
            signature: vec![0xaa; 64],
        }
    }

    #[test]
    fn insert_is_idempotent() {
        let mut table = VersionedTable::new();
        assert_eq!(table.insert(&trc(1, 1)), 1);
        assert_eq!(table.insert(&trc(1, 1)), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn get_exact_version() {
        let mut table = VersionedTable::new();
        table.insert(&trc(1, 1));
        table.insert(&trc(1, 2));
        assert_eq!(table.get(&Isd(1), Version::At(1)), Some(&trc(1, 1)));
        assert_eq!(table.get(&Isd(1), Version::At(3)), None);
    }

    #[test]
    fn latest_resolves_to_highest_version() {
        let mut table = VersionedTable::new();
        // Out-of-order arrival must not confuse latest resolution.
        table.insert(&trc(1, 3));
        table.insert(&trc(1, 1));
        table.insert(&trc(1, 2));
        assert_eq!(table.get(&Isd(1), Version::Latest), Some(&trc(1, 3)));
        assert_eq!(table.max_version(&Isd(1)), Some(3));
    }

    #[test]
    fn absent_owner_is_none() {
        let table: VersionedTable<Trc> = VersionedTable::new();
        assert_eq!(table.get(&Isd(2), Version::At(10)), None);
        assert_eq!(table.get(&Isd(2), Version::Latest), None);
        assert_eq!(table.max_version(&Isd(2)), None);
    }

    #[test]
    fn get_all_preserves_insertion_order() {
        let mut table = VersionedTable::new();
        table.insert(&trc(2, 1));
        table.insert(&trc(1, 1));
        table.insert(&trc(1, 2));
        let all: Vec<_> = table.get_all().cloned().collect();
        assert_eq!(all, vec![trc(2, 1), trc(1, 1), trc(1, 2)]);
    }

    #[test]
    fn duplicate_insert_does_not_duplicate_in_get_all() {
        let mut table = VersionedTable::new();
        table.insert(&trc(1, 1));
        table.insert(&trc(1, 1));
        assert_eq!(table.get_all().count(), 1);
    }

    #[test]
    fn empty_table() {
        let table: VersionedTable<Trc> = VersionedTable::default();
        assert!(table.is_empty());
        assert_eq!(table.get_all().count(), 0);
    }
}
