use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use got_retention_core::contract::{
    EntryKey, EntryPage, GamePage, GameRecord, ScoreKey, ScorePage,
};

use crate::adapters::store::SweepStore;

/// DynamoDB-backed store over the Games, Entries, and Scores tables.
/// Table names and the client are injected at construction; nothing is held
/// in module-level state.
pub struct DynamoDbSweepStore {
    client: aws_sdk_dynamodb::Client,
    games_table: String,
    entries_table: String,
    scores_table: String,
}

impl DynamoDbSweepStore {
    pub fn new(
        client: aws_sdk_dynamodb::Client,
        games_table: impl Into<String>,
        entries_table: impl Into<String>,
        scores_table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            games_table: games_table.into(),
            entries_table: entries_table.into(),
            scores_table: scores_table.into(),
        }
    }
}

impl SweepStore for DynamoDbSweepStore {
    fn scan_expired_games(
        &self,
        cutoff: &str,
        page_token: Option<&str>,
    ) -> Result<GamePage, String> {
        let client = self.client.clone();
        let table = self.games_table.clone();
        let cutoff_value = AttributeValue::S(cutoff.to_string());
        let start_key = page_token.map(game_key);

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .scan()
                    .table_name(table)
                    .filter_expression("createdAt < :cutoff")
                    .expression_attribute_values(":cutoff", cutoff_value)
                    .set_exclusive_start_key(start_key)
                    .send()
                    .await
                    .map_err(|error| format!("failed to scan games table: {error}"))
            })
        })?;

        let games = output
            .items
            .unwrap_or_default()
            .iter()
            .map(game_record_from_item)
            .collect::<Result<Vec<_>, String>>()?;
        let next_token = output
            .last_evaluated_key
            .as_ref()
            .map(|key| string_attribute(key, "gameId"))
            .transpose()?;

        Ok(GamePage { games, next_token })
    }

    fn query_entries(
        &self,
        game_id: &str,
        page_token: Option<&str>,
    ) -> Result<EntryPage, String> {
        let client = self.client.clone();
        let table = self.entries_table.clone();
        let game_value = AttributeValue::S(game_id.to_string());
        let start_key = page_token.map(|entry_id| entry_key(game_id, entry_id));

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .query()
                    .table_name(table)
                    .key_condition_expression("gameId = :game_id")
                    .expression_attribute_values(":game_id", game_value)
                    .set_exclusive_start_key(start_key)
                    .send()
                    .await
                    .map_err(|error| format!("failed to query entries table: {error}"))
            })
        })?;

        let keys = output
            .items
            .unwrap_or_default()
            .iter()
            .map(|item| {
                Ok(EntryKey {
                    game_id: string_attribute(item, "gameId")?,
                    entry_id: string_attribute(item, "entryId")?,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        let next_token = output
            .last_evaluated_key
            .as_ref()
            .map(|key| string_attribute(key, "entryId"))
            .transpose()?;

        Ok(EntryPage { keys, next_token })
    }

    fn query_scores(&self, game_id: &str, page_token: Option<&str>) -> Result<ScorePage, String> {
        let client = self.client.clone();
        let table = self.scores_table.clone();
        let game_value = AttributeValue::S(game_id.to_string());
        let start_key = page_token.map(|player_name| score_key(game_id, player_name));

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .query()
                    .table_name(table)
                    .key_condition_expression("gameId = :game_id")
                    .expression_attribute_values(":game_id", game_value)
                    .set_exclusive_start_key(start_key)
                    .send()
                    .await
                    .map_err(|error| format!("failed to query scores table: {error}"))
            })
        })?;

        let keys = output
            .items
            .unwrap_or_default()
            .iter()
            .map(|item| {
                Ok(ScoreKey {
                    game_id: string_attribute(item, "gameId")?,
                    player_name: string_attribute(item, "playerName")?,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        let next_token = output
            .last_evaluated_key
            .as_ref()
            .map(|key| string_attribute(key, "playerName"))
            .transpose()?;

        Ok(ScorePage { keys, next_token })
    }

    fn delete_entry(&self, key: &EntryKey) -> Result<(), String> {
        self.delete_item(
            self.entries_table.clone(),
            entry_key(&key.game_id, &key.entry_id),
            "entries",
        )
    }

    fn delete_score(&self, key: &ScoreKey) -> Result<(), String> {
        self.delete_item(
            self.scores_table.clone(),
            score_key(&key.game_id, &key.player_name),
            "scores",
        )
    }

    fn delete_game(&self, game_id: &str) -> Result<(), String> {
        self.delete_item(self.games_table.clone(), game_key(game_id), "games")
    }
}

impl DynamoDbSweepStore {
    // Deleting an absent key succeeds in DynamoDB; re-runs rely on that.
    fn delete_item(
        &self,
        table: String,
        key: HashMap<String, AttributeValue>,
        table_label: &str,
    ) -> Result<(), String> {
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_item()
                    .table_name(table)
                    .set_key(Some(key))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to delete from {table_label} table: {error}"))
            })
        })
    }
}

fn game_key(game_id: &str) -> HashMap<String, AttributeValue> {
    HashMap::from([(
        "gameId".to_string(),
        AttributeValue::S(game_id.to_string()),
    )])
}

fn entry_key(game_id: &str, entry_id: &str) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            "gameId".to_string(),
            AttributeValue::S(game_id.to_string()),
        ),
        (
            "entryId".to_string(),
            AttributeValue::S(entry_id.to_string()),
        ),
    ])
}

fn score_key(game_id: &str, player_name: &str) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            "gameId".to_string(),
            AttributeValue::S(game_id.to_string()),
        ),
        (
            "playerName".to_string(),
            AttributeValue::S(player_name.to_string()),
        ),
    ])
}

fn game_record_from_item(item: &HashMap<String, AttributeValue>) -> Result<GameRecord, String> {
    Ok(GameRecord {
        game_id: string_attribute(item, "gameId")?,
        created_at: string_attribute(item, "createdAt")?,
    })
}

fn string_attribute(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String, String> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| format!("item is missing string attribute '{name}'"))
}
