// src/save/src/lib.rs

use anyhow::{Context, Result};
use combat::Stats;
use dungeon::IdAllocator;
use error::{GameError, handle_error};
use hero::PlayerState;
use run::{FloorInfo, MetaProfile, RunState};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use strum::{Display, EnumString};

/// Current run snapshot version
pub const SAVE_VERSION: u32 = 1;

const PROFILE_FILE: &str = "profile.json";
const RUN_FILE_STEM: &str = "current_run";

fn default_version() -> u32 {
    1
}

/// On-disk encoding of the run snapshot. The profile is always JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SaveFormat {
    #[default]
    Json,
    Binary,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Json => "json",
            SaveFormat::Binary => "bin",
        }
    }
}

/// The player entity minus its position; floors are regenerated on resume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: u64,
    pub name: String,
    pub glyph: char,
    pub stats: Stats,
    pub progress: PlayerState,
}

/// Just enough to rebuild the current floor from its depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonDescriptor {
    pub floor_number: u32,
    pub is_boss_floor: bool,
    pub is_final_floor: bool,
}

impl From<FloorInfo> for DungeonDescriptor {
    fn from(info: FloorInfo) -> Self {
        Self {
            floor_number: info.floor_number,
            is_boss_floor: info.is_boss_floor,
            is_final_floor: info.is_final_floor,
        }
    }
}

impl DungeonDescriptor {
    pub fn floor_info(&self) -> FloorInfo {
        FloorInfo {
            floor_number: self.floor_number,
            is_boss_floor: self.is_boss_floor,
            is_final_floor: self.is_final_floor,
        }
    }
}

/// Everything needed to resume an unfinished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub run: RunState,
    pub player: PlayerSnapshot,
    pub dungeon: DungeonDescriptor,
    #[serde(default)]
    pub ids: IdAllocator,
    #[serde(default)]
    pub turn: u64,
}

impl RunSnapshot {
    /// Rejects snapshots from newer builds and internally inconsistent data
    pub fn validate(&self) -> Result<(), GameError> {
        if self.version > SAVE_VERSION {
            return Err(GameError::VersionMismatch {
                found: self.version,
                supported: SAVE_VERSION,
            });
        }
        if self.run.is_finished {
            return Err(GameError::InvalidData("run already finished".into()));
        }
        if self.run.current_floor == 0 || self.run.current_floor > self.run.max_floor {
            return Err(GameError::InvalidData(format!(
                "floor {} outside 1..={}",
                self.run.current_floor, self.run.max_floor
            )));
        }
        if self.dungeon.floor_number != self.run.current_floor {
            return Err(GameError::InvalidData("dungeon descriptor disagrees with run".into()));
        }
        if self.player.stats.max_hp == 0 || self.player.stats.is_dead() {
            return Err(GameError::InvalidData("player has no hit points".into()));
        }
        Ok(())
    }

    pub fn encode(&self, format: SaveFormat) -> Result<Vec<u8>, GameError> {
        match format {
            SaveFormat::Json => Ok(serde_json::to_vec_pretty(self)?),
            SaveFormat::Binary => Ok(bincode::serde::encode_to_vec(
                self,
                bincode::config::standard(),
            )?),
        }
    }

    pub fn decode(bytes: &[u8], format: SaveFormat) -> Result<Self, GameError> {
        let snapshot: RunSnapshot = match format {
            SaveFormat::Json => serde_json::from_slice(bytes)?,
            SaveFormat::Binary => {
                let (snapshot, read) =
                    bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
                if read != bytes.len() {
                    return Err(GameError::CorruptedSave);
                }
                snapshot
            }
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// File-backed storage for the meta profile and the resumable run
pub struct SaveStore {
    save_dir: PathBuf,
    format: SaveFormat,
}

impl SaveStore {
    pub fn new(save_dir: impl AsRef<Path>, format: SaveFormat) -> Result<Self> {
        let save_dir = save_dir.as_ref();
        if !save_dir.exists() {
            fs::create_dir_all(save_dir).context("Failed to create save directory")?;
        }

        Ok(Self {
            save_dir: save_dir.to_path_buf(),
            format,
        })
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn format(&self) -> SaveFormat {
        self.format
    }

    pub fn profile_path(&self) -> PathBuf {
        self.save_dir.join(PROFILE_FILE)
    }

    pub fn run_path(&self) -> PathBuf {
        self.save_dir
            .join(format!("{RUN_FILE_STEM}.{}", self.format.extension()))
    }

    pub fn save_profile(&self, profile: &MetaProfile) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(profile).context("Failed to serialize profile")?;
        write_atomic(&self.profile_path(), &bytes)
    }

    /// Never fails: a missing or unreadable profile yields the default one
    pub fn load_profile(&self) -> MetaProfile {
        let path = self.profile_path();
        if !path.exists() {
            return MetaProfile::default();
        }
        let loaded = fs::read(&path)
            .map_err(GameError::from)
            .and_then(|bytes| serde_json::from_slice(&bytes).map_err(GameError::from));
        match loaded {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Ignoring profile at {:?}: {}", path, handle_error(&e));
                MetaProfile::default()
            }
        }
    }

    pub fn save_run(&self, snapshot: &RunSnapshot) -> Result<()> {
        let bytes = snapshot
            .encode(self.format)
            .context("Failed to serialize run snapshot")?;
        write_atomic(&self.run_path(), &bytes)
    }

    /// `None` when there is no resumable run or the snapshot is unusable
    pub fn load_run(&self) -> Option<RunSnapshot> {
        let path = self.run_path();
        if !path.exists() {
            return None;
        }
        let loaded = fs::read(&path)
            .map_err(GameError::from)
            .and_then(|bytes| RunSnapshot::decode(&bytes, self.format));
        match loaded {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Ignoring run snapshot at {:?}: {}", path, handle_error(&e));
                None
            }
        }
    }

    pub fn has_run(&self) -> bool {
        self.run_path().exists()
    }

    pub fn clear_run(&self) -> Result<()> {
        let path = self.run_path();
        if path.exists() {
            fs::remove_file(path).context("Failed to delete run snapshot")?;
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).context("Failed to create temporary save file")?;
    file.write_all(bytes).context("Failed to write save data")?;
    file.flush().context("Failed to flush save data")?;
    fs::rename(&temp_path, path).context("Failed to commit save file")?;
    tracing::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use items::{Item, ItemType};
    use pretty_assertions::assert_eq;
    use run::DEFAULT_REGION;
    use tempfile::tempdir;

    fn sample_snapshot() -> RunSnapshot {
        let mut progress = PlayerState::new(20);
        progress
            .inventory
            .add(Item::new(7, ItemType::MinorHealthPotion, 3))
            .unwrap();
        progress.mutation_state.dodge_bonus = 0.25;
        progress
            .mutation_state
            .acquired_mutation_ids
            .insert("quick_reflexes".into());
        let mut ids = IdAllocator::default();
        ids.reserve_past(12, 40);

        RunSnapshot {
            version: SAVE_VERSION,
            run: RunState::new(99, DEFAULT_REGION, 12, 1_000),
            player: PlayerSnapshot {
                id: 1,
                name: "Wanderer".into(),
                glyph: '@',
                stats: Stats::new(30, 4, 1).with_armor(3),
                progress,
            },
            dungeon: FloorInfo::for_floor(1, 12).into(),
            ids,
            turn: 17,
        }
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempdir().unwrap();
        let store = SaveStore::new(dir.path(), SaveFormat::Json).unwrap();
        let snapshot = sample_snapshot();

        store.save_run(&snapshot).unwrap();
        assert!(store.has_run());
        assert_eq!(store.load_run(), Some(snapshot));
    }

    #[test]
    fn test_binary_round_trip() {
        let dir = tempdir().unwrap();
        let store = SaveStore::new(dir.path(), SaveFormat::Binary).unwrap();
        let snapshot = sample_snapshot();

        store.save_run(&snapshot).unwrap();
        assert!(store.run_path().ends_with("current_run.bin"));
        assert_eq!(store.load_run(), Some(snapshot));
    }

    #[test]
    fn test_missing_files_fall_back() {
        let dir = tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("nested"), SaveFormat::Json).unwrap();

        assert_eq!(store.load_profile(), MetaProfile::default());
        assert!(store.load_run().is_none());
        assert!(!store.has_run());
    }

    #[test]
    fn test_corrupt_files_fall_back() {
        let dir = tempdir().unwrap();
        let store = SaveStore::new(dir.path(), SaveFormat::Json).unwrap();
        fs::write(store.profile_path(), b"{ not json").unwrap();
        fs::write(store.run_path(), b"{\"version\": 1").unwrap();

        assert_eq!(store.load_profile(), MetaProfile::default());
        assert!(store.load_run().is_none());
    }

    #[test]
    fn test_newer_version_is_ignored() {
        let dir = tempdir().unwrap();
        let store = SaveStore::new(dir.path(), SaveFormat::Json).unwrap();
        let mut snapshot = sample_snapshot();
        snapshot.version = SAVE_VERSION + 1;
        store.save_run(&snapshot).unwrap();

        assert!(store.load_run().is_none());
        assert!(matches!(
            snapshot.validate(),
            Err(GameError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_clear_run() {
        let dir = tempdir().unwrap();
        let store = SaveStore::new(dir.path(), SaveFormat::Json).unwrap();
        store.save_run(&sample_snapshot()).unwrap();
        store.clear_run().unwrap();
        assert!(!store.has_run());
        // clearing twice is fine
        store.clear_run().unwrap();
    }

    #[test]
    fn test_profile_round_trip() {
        let dir = tempdir().unwrap();
        let store = SaveStore::new(dir.path(), SaveFormat::Binary).unwrap();
        let profile = MetaProfile {
            titan_shards: 42,
            runs_started: 3,
            ..Default::default()
        };

        store.save_profile(&profile).unwrap();
        assert_eq!(store.load_profile(), profile);
        assert!(!dir.path().join("profile.tmp").exists());
    }

    #[test]
    fn test_snapshot_uses_camel_case_schema() {
        let json = String::from_utf8(sample_snapshot().encode(SaveFormat::Json).unwrap()).unwrap();
        assert!(json.contains("\"floorNumber\": 1"));
        assert!(json.contains("\"isBossFloor\": false"));
        assert!(json.contains("\"maxFloor\": 12"));
    }

    #[test]
    fn test_format_parses_from_config_strings() {
        assert_eq!("json".parse::<SaveFormat>().unwrap(), SaveFormat::Json);
        assert_eq!("Binary".parse::<SaveFormat>().unwrap(), SaveFormat::Binary);
        assert!("xml".parse::<SaveFormat>().is_err());
    }
}
