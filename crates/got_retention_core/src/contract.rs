use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub const SWEEP_SCHEMA_VERSION: &str = "v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunContext {
    pub run_id: String,
    pub schema_version: String,
    pub payload_fingerprint: String,
}

/// A Games-table row as the sweeper sees it: the key plus the creation
/// timestamp the age filter runs against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameRecord {
    pub game_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryKey {
    pub game_id: String,
    pub entry_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreKey {
    pub game_id: String,
    pub player_name: String,
}

/// One page of a listing. `next_token` carries the opaque resume position;
/// `None` means the listing is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamePage {
    pub games: Vec<GameRecord>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPage {
    pub keys: Vec<EntryKey>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScorePage {
    pub keys: Vec<ScoreKey>,
    pub next_token: Option<String>,
}

/// The step of a game's cascade that failed. Lookup failures leave the game
/// untouched; delete failures may leave a partial cascade behind, which the
/// next scheduled run retries under the same age filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SweepPhase {
    EntryLookup,
    EntryDelete,
    ScoreLookup,
    ScoreDelete,
    GameDelete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameFailure {
    pub game_id: String,
    pub phase: SweepPhase,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepSummary {
    pub message: String,
    pub cutoff_time: String,
    pub deleted_games: u64,
    pub deleted_items: u64,
    pub failed_games: Vec<GameFailure>,
    pub dry_run: bool,
    pub schema_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepFailure {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryError {
    message: String,
}

impl DiscoveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DiscoveryError {}

/// Fingerprint of the opaque invocation payload, logged for traceability.
/// The payload itself is never interpreted.
pub fn payload_fingerprint(payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stable_contract_json(payload));
    format!("{:x}", hasher.finalize())
}

pub fn stable_contract_json(value: impl Serialize) -> String {
    serde_json::to_string(&value).expect("serialization of contract value should not fail")
}
