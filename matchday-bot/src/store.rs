//! Player record persistence.
use matchday_game::{PlayerProfile, ProfileUpdate, UpdateOutcome};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("player {0} not found")]
    NotFound(u64),
    #[error("player {0} already exists")]
    AlreadyExists(u64),
    #[error("player store unavailable: {0}")]
    Unavailable(String),
}

/// Create, read, update and delete player profiles.
///
/// `update` adds stat counters on top of the stored values, replaces every
/// other field it carries and skips deltas whose match key was already
/// folded in.
#[async_trait::async_trait]
pub trait PlayerStore: Send + Sync {
    async fn get(&self, user_id: u64) -> Result<Option<PlayerProfile>, StoreError>;

    async fn create(&self, profile: PlayerProfile) -> Result<(), StoreError>;

    async fn update(
        &self,
        user_id: u64,
        update: &ProfileUpdate,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Remove a player, returning the record that was deleted.
    async fn delete(&self, user_id: u64) -> Result<Option<PlayerProfile>, StoreError>;
}

/// Profiles held in memory, optionally mirrored to a JSON file after every
/// change.
#[derive(Debug, Default)]
pub struct MemoryPlayerStore {
    players: RwLock<HashMap<u64, PlayerProfile>>,
    file: Option<PathBuf>,
}

impl MemoryPlayerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a file-backed store, starting empty if `path` does not exist yet.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let players = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let list: Vec<PlayerProfile> = serde_json::from_str(&raw)
                    .map_err(|err| StoreError::Unavailable(format!("{}: {err}", path.display())))?;
                list.into_iter()
                    .map(|profile| (profile.user_id, profile))
                    .collect()
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("player file {} not found; starting empty", path.display());
                HashMap::new()
            }
            Err(err) => {
                return Err(StoreError::Unavailable(format!("{}: {err}", path.display())));
            }
        };
        log::info!("loaded {} players from {}", players.len(), path.display());
        Ok(Self {
            players: RwLock::new(players),
            file: Some(path),
        })
    }

    pub async fn len(&self) -> usize {
        self.players.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.players.read().await.is_empty()
    }

    async fn persist(&self, players: &HashMap<u64, PlayerProfile>) -> Result<(), StoreError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let mut list: Vec<&PlayerProfile> = players.values().collect();
        list.sort_by_key(|profile| profile.user_id);
        let json = serde_json::to_string_pretty(&list)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        write_atomically(path, json.as_bytes())
            .await
            .map_err(|err| StoreError::Unavailable(format!("{}: {err}", path.display())))
    }
}

async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}

#[async_trait::async_trait]
impl PlayerStore for MemoryPlayerStore {
    async fn get(&self, user_id: u64) -> Result<Option<PlayerProfile>, StoreError> {
        Ok(self.players.read().await.get(&user_id).cloned())
    }

    async fn create(&self, profile: PlayerProfile) -> Result<(), StoreError> {
        let mut players = self.players.write().await;
        let user_id = profile.user_id;
        if players.contains_key(&user_id) {
            return Err(StoreError::AlreadyExists(user_id));
        }
        players.insert(user_id, profile);
        if let Err(err) = self.persist(&players).await {
            players.remove(&user_id);
            return Err(err);
        }
        Ok(())
    }

    async fn update(
        &self,
        user_id: u64,
        update: &ProfileUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut players = self.players.write().await;
        let profile = players
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound(user_id))?;
        let previous = profile.clone();
        let outcome = profile.apply(update);
        if outcome == UpdateOutcome::Duplicate {
            return Ok(outcome);
        }
        if let Err(err) = self.persist(&players).await {
            players.insert(user_id, previous);
            return Err(err);
        }
        Ok(outcome)
    }

    async fn delete(&self, user_id: u64) -> Result<Option<PlayerProfile>, StoreError> {
        let mut players = self.players.write().await;
        let Some(removed) = players.remove(&user_id) else {
            return Ok(None);
        };
        if let Err(err) = self.persist(&players).await {
            players.insert(user_id, removed);
            return Err(err);
        }
        log::info!("deleted player {user_id}");
        Ok(Some(removed))
    }
}
