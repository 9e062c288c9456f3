use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use _model::{Address, AddressDraft, AddressId};
use tracing::{debug, error, warn};

use crate::{
    error::PersistError,
    store::{AddressStore, Command, Outcome, Snapshot},
};

pub const ROOT_KEY: &str = "persist:root";

/// Key-value blob storage, one JSON file per key.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key.replace(':', "-")))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.path(key)) {
            Ok(x) => Ok(Some(x)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Written next to the target and renamed over it, so readers only ever
    /// see a complete blob.
    pub fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn load_snapshot(&self) -> Result<Snapshot, PersistError> {
        Ok(match self.get(ROOT_KEY)? {
            Some(x) => serde_json::from_str(&x)?,
            None => Snapshot::default(),
        })
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let mut output = serde_json::to_string_pretty(snapshot)?;
        output.push('\n');
        self.set(ROOT_KEY, &output)
    }
}

/// An [`AddressStore`] bound to its storage. Every applied command is saved
/// before `dispatch` returns.
#[derive(Debug)]
pub struct PersistentStore {
    store: AddressStore,
    storage: Storage,
    dirty: bool,
}

impl PersistentStore {
    pub fn open(storage: Storage) -> Result<Self, PersistError> {
        let snapshot = storage.load_snapshot()?;
        debug!(
            addresses = snapshot.addresses.len(),
            dir = %storage.dir().display(),
            "rehydrated address store"
        );
        Ok(Self {
            store: AddressStore::from_snapshot(snapshot),
            storage,
            dirty: false,
        })
    }

    pub fn store(&self) -> &AddressStore {
        &self.store
    }

    pub fn addresses(&self) -> &[Address] {
        self.store.addresses()
    }

    pub fn get(&self, id: &AddressId) -> Option<&Address> {
        self.store.get(id)
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, PersistError> {
        // the picked location is not part of the snapshot
        let persisted = !matches!(command, Command::SetLocation(_));
        let outcome = self.store.apply(command);
        if outcome == Outcome::Applied && persisted {
            self.dirty = true;
            self.save()?;
        }
        Ok(outcome)
    }

    /// Adds and saves, handing back the new id.
    pub fn add(&mut self, draft: AddressDraft) -> Result<AddressId, PersistError> {
        let id = self.store.add_address(draft);
        self.dirty = true;
        self.save()?;
        Ok(id)
    }

    pub fn save(&mut self) -> Result<(), PersistError> {
        self.storage.save_snapshot(&self.store.snapshot())?;
        self.dirty = false;
        Ok(())
    }
}

impl Drop for PersistentStore {
    fn drop(&mut self) {
        if !self.dirty {
            return;
        }
        warn!("address store dropped with unsaved changes, retrying save");
        if let Err(e) = self.save() {
            error!("failed to save addresses: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use _model::{AddressDetails, AddressPatch, AddressType, Coordinates, Location};

    use super::*;

    fn draft(line: &str) -> AddressDraft {
        AddressDraft {
            address_line1: line.into(),
            pincode: "400001".into(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            ..Default::default()
        }
    }

    #[test]
    fn storage_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("nested"));
        assert_eq!(storage.get("persist:root").unwrap(), None);

        storage.set("persist:root", "{}").unwrap();
        assert!(dir.path().join("nested/persist-root.json").exists());
        assert_eq!(storage.get("persist:root").unwrap().as_deref(), Some("{}"));

        storage.set("persist:root", "[]").unwrap();
        assert_eq!(storage.get("persist:root").unwrap().as_deref(), Some("[]"));
        assert!(!dir.path().join("nested/persist-root.json.tmp").exists());
    }

    #[test]
    fn missing_blob_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentStore::open(Storage::new(dir.path())).unwrap();
        assert!(store.addresses().is_empty());
    }

    #[test]
    fn corrupt_blob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        storage.set(ROOT_KEY, "{\"addresses\": [").unwrap();
        assert!(matches!(
            PersistentStore::open(storage),
            Err(PersistError::Serialization(_))
        ));
    }

    #[test]
    fn saves_after_each_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = PersistentStore::open(storage.clone()).unwrap();

        let home = store.add(draft("1 Marine Drive")).unwrap();
        assert_eq!(storage.load_snapshot().unwrap().addresses.len(), 1);

        let office = store
            .add(AddressDraft {
                kind: AddressType::Office,
                ..draft("2 Nariman Point")
            })
            .unwrap();
        store
            .dispatch(Command::SetDefaultAddress(office.clone()))
            .unwrap();
        let saved = storage.load_snapshot().unwrap();
        assert_eq!(saved.addresses[1].id, office);
        assert!(saved.addresses[1].is_default);

        store
            .dispatch(Command::UpdateAddress {
                id: home.clone(),
                patch: AddressPatch {
                    flat_number: Some("7".into()),
                    ..Default::default()
                },
            })
            .unwrap();
        assert_eq!(storage.load_snapshot().unwrap().addresses[0].flat_number, "7");

        store.dispatch(Command::DeleteAddress(home)).unwrap();
        let saved = storage.load_snapshot().unwrap();
        assert_eq!(saved.addresses.len(), 1);
        assert_eq!(saved.addresses[0].id, office);
    }

    #[test]
    fn noop_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = PersistentStore::open(storage.clone()).unwrap();
        let outcome = store
            .dispatch(Command::DeleteAddress(AddressId::from("404")))
            .unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(storage.get(ROOT_KEY).unwrap(), None);

        store
            .dispatch(Command::SetLocation(Location {
                coordinates: Coordinates::new(19.07, 72.87),
                address: AddressDetails::default(),
            }))
            .unwrap();
        assert_eq!(storage.get(ROOT_KEY).unwrap(), None);
        assert!(store.store().current_location().is_some());
    }

    #[test]
    fn drop_retries_failed_save() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("book");
        let mut store = PersistentStore::open(Storage::new(&book)).unwrap();

        // a regular file where the storage directory should go
        fs::write(&book, "").unwrap();
        let result = store.dispatch(Command::AddAddress(draft("1 Marine Drive")));
        assert!(matches!(result, Err(PersistError::Io(_))));
        assert_eq!(store.addresses().len(), 1);

        fs::remove_file(&book).unwrap();
        drop(store);
        let saved = Storage::new(&book).load_snapshot().unwrap();
        assert_eq!(saved.addresses.len(), 1);
        assert_eq!(saved.addresses[0].address_line1, "1 Marine Drive");
    }

    #[test]
    fn drop_after_clean_save_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        drop(PersistentStore::open(storage.clone()).unwrap());
        assert_eq!(storage.get(ROOT_KEY).unwrap(), None);
    }

    #[test]
    fn reopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let before = {
            let mut store = PersistentStore::open(Storage::new(dir.path())).unwrap();
            for line in ["a", "b", "c"] {
                store.add(draft(line)).unwrap();
            }
            let second = store.addresses()[1].id.clone();
            store.dispatch(Command::SetDefaultAddress(second)).unwrap();
            store.addresses().to_vec()
        };

        let store = PersistentStore::open(Storage::new(dir.path())).unwrap();
        assert_eq!(store.addresses(), before.as_slice());
        assert!(store.store().current_location().is_none());
    }
}
