use got_retention_core::contract::{EntryKey, EntryPage, GamePage, ScoreKey, ScorePage};

/// Storage seam for the three retention tables.
///
/// Listings return one page per call; callers follow `next_token` until it
/// is `None`. Child listings must be keyed lookups scoped to `game_id`,
/// never table scans. Deleting a key that no longer exists must succeed.
pub trait SweepStore {
    fn scan_expired_games(
        &self,
        cutoff: &str,
        page_token: Option<&str>,
    ) -> Result<GamePage, String>;

    fn query_entries(&self, game_id: &str, page_token: Option<&str>)
        -> Result<EntryPage, String>;

    fn query_scores(&self, game_id: &str, page_token: Option<&str>) -> Result<ScorePage, String>;

    fn delete_entry(&self, key: &EntryKey) -> Result<(), String>;

    fn delete_score(&self, key: &ScoreKey) -> Result<(), String>;

    fn delete_game(&self, game_id: &str) -> Result<(), String>;
}
