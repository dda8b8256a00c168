use std::path::Path;

use log::debug;
use sled::IVec;

use crate::config::SavesConfig;
use crate::mission::errors::MissionError;
use crate::mission::snapshot::MissionSnapshot;
use crate::mission::types::SNAPSHOT_SCHEMA_VERSION;

const TREE_SAVES: &str = "saves";
const SLOT_PREFIX: &str = "slots:";

/// Slot used by autosaves unless configured otherwise.
pub const DEFAULT_SLOT: &str = "AutoSave";

/// Sled-backed save slots holding bincode-encoded [`MissionSnapshot`]s.
pub struct SaveStore {
    _db: sled::Db,
    saves: sled::Tree,
    default_slot: String,
}

impl SaveStore {
    /// Open (or create) the save database rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MissionError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let saves = db.open_tree(TREE_SAVES)?;
        Ok(Self {
            _db: db,
            saves,
            default_slot: DEFAULT_SLOT.to_string(),
        })
    }

    /// Open `saves.dir` and autosave into `saves.default_slot`.
    pub fn from_config(config: &SavesConfig) -> Result<Self, MissionError> {
        Self::slot_key(&config.default_slot)?;
        let mut store = Self::open(&config.dir)?;
        store.default_slot = config.default_slot.clone();
        Ok(store)
    }

    pub fn default_slot(&self) -> &str {
        &self.default_slot
    }

    fn slot_key(slot: &str) -> Result<Vec<u8>, MissionError> {
        if slot.is_empty() || slot.chars().any(|ch| ch.is_control()) {
            return Err(MissionError::InvalidIdentifier(format!(
                "save slot '{}'",
                slot.escape_default()
            )));
        }
        Ok(format!("{}{}", SLOT_PREFIX, slot).into_bytes())
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, MissionError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, MissionError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    /// Write a snapshot into `slot`, replacing whatever was there.
    pub fn put_snapshot(&self, slot: &str, snapshot: &MissionSnapshot) -> Result<(), MissionError> {
        let key = Self::slot_key(slot)?;
        let mut record = snapshot.clone();
        record.schema_version = SNAPSHOT_SCHEMA_VERSION;
        let bytes = Self::serialize(&record)?;
        self.saves.insert(key, bytes)?;
        self.saves.flush()?;
        debug!(
            "saved slot {} ({} active, {} completed missions)",
            slot,
            record.active_missions.len(),
            record.completed_missions.len()
        );
        Ok(())
    }

    pub fn get_snapshot(&self, slot: &str) -> Result<MissionSnapshot, MissionError> {
        let key = Self::slot_key(slot)?;
        let Some(bytes) = self.saves.get(&key)? else {
            return Err(MissionError::NotFound(format!("save slot: {}", slot)));
        };
        let record: MissionSnapshot = Self::deserialize(bytes)?;
        if record.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(MissionError::SchemaMismatch {
                entity: "snapshot",
                expected: SNAPSHOT_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// List all slot names currently stored.
    pub fn list_slots(&self) -> Result<Vec<String>, MissionError> {
        let mut slots = Vec::new();
        for entry in self.saves.scan_prefix(SLOT_PREFIX.as_bytes()) {
            let (key, _) = entry?;
            let text = String::from_utf8_lossy(&key);
            if let Some(slot) = text.strip_prefix(SLOT_PREFIX) {
                slots.push(slot.to_string());
            }
        }
        Ok(slots)
    }

    /// Returns true if the slot existed.
    pub fn delete_slot(&self, slot: &str) -> Result<bool, MissionError> {
        let key = Self::slot_key(slot)?;
        let removed = self.saves.remove(key)?.is_some();
        self.saves.flush()?;
        Ok(removed)
    }
}
