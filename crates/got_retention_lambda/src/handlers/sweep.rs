use chrono::{DateTime, Utc};
use got_retention_core::contract::{
    payload_fingerprint, DiscoveryError, GameFailure, GameRecord, RunContext, SweepFailure,
    SweepPhase, SweepSummary, SWEEP_SCHEMA_VERSION,
};
use got_retention_core::cutoff::{cutoff_timestamp, RetentionWindow};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::store::SweepStore;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub retention: RetentionWindow,
    /// Captured once per invocation so the cutoff is stable across the run.
    pub event_time: DateTime<Utc>,
    pub dry_run: bool,
    /// Upper bound on games processed this run; `None` means unbounded.
    pub max_games: Option<usize>,
}

/// Runs one retention sweep: discover games older than the cutoff, then for
/// each game delete its entries and scores before the game record itself.
/// A failed game is recorded and skipped; only a discovery failure aborts.
pub fn handle_sweep_event(
    event: &Value,
    run_id: &str,
    config: &SweepConfig,
    store: &dyn SweepStore,
) -> ApiGatewayResponse {
    let run_context = RunContext {
        run_id: run_id.to_string(),
        schema_version: SWEEP_SCHEMA_VERSION.to_string(),
        payload_fingerprint: payload_fingerprint(event),
    };
    log_sweep_info(
        "invocation_received",
        json!({
            "run_id": run_context.run_id,
            "payload_fingerprint": run_context.payload_fingerprint,
            "payload": event,
        }),
    );

    let cutoff = cutoff_timestamp(config.event_time, config.retention);
    log_sweep_info(
        "cutoff_computed",
        json!({
            "run_id": run_context.run_id,
            "cutoff_time": cutoff,
            "retention_hours": config.retention.hours(),
            "dry_run": config.dry_run,
        }),
    );

    let expired = match discover_expired_games(store, &cutoff) {
        Ok(games) => games,
        Err(error) => {
            log_sweep_error(
                "discovery_failed",
                json!({
                    "run_id": run_context.run_id,
                    "cutoff_time": cutoff,
                    "error": error.message(),
                }),
            );
            return error_response(
                500,
                &SweepFailure {
                    error: "discovery_failed".to_string(),
                    message: error.message().to_string(),
                },
            );
        }
    };

    log_sweep_info(
        "games_discovered",
        json!({
            "run_id": run_context.run_id,
            "expired_games": expired.len(),
        }),
    );

    let planned = match config.max_games {
        Some(cap) if expired.len() > cap => {
            log_sweep_info(
                "games_truncated",
                json!({
                    "run_id": run_context.run_id,
                    "cap": cap,
                    "deferred_games": expired.len() - cap,
                }),
            );
            &expired[..cap]
        }
        _ => &expired[..],
    };

    let mut deleted_games = 0u64;
    let mut deleted_items = 0u64;
    let mut failed_games = Vec::new();

    for game in planned {
        log_sweep_info(
            "game_started",
            json!({
                "run_id": run_context.run_id,
                "game_id": game.game_id,
                "created_at": game.created_at,
            }),
        );

        match sweep_game(store, game, config.dry_run, &run_context.run_id) {
            Ok(child_items) => {
                deleted_games += 1;
                deleted_items += child_items;
                log_sweep_info(
                    "game_deleted",
                    json!({
                        "run_id": run_context.run_id,
                        "game_id": game.game_id,
                        "child_items": child_items,
                        "dry_run": config.dry_run,
                    }),
                );
            }
            Err(failure) => {
                log_sweep_error(
                    "game_failed",
                    json!({
                        "run_id": run_context.run_id,
                        "game_id": failure.game_id,
                        "phase": failure.phase,
                        "error": failure.message,
                    }),
                );
                failed_games.push(failure);
            }
        }
    }

    let message = if config.dry_run {
        format!(
            "Dry run complete. {deleted_games} games and {deleted_items} child items are older than {} hours.",
            config.retention.hours()
        )
    } else {
        format!(
            "Cleanup complete. Deleted {deleted_games} games and {deleted_items} child items older than {} hours.",
            config.retention.hours()
        )
    };

    let summary = SweepSummary {
        message,
        cutoff_time: cutoff,
        deleted_games,
        deleted_items,
        failed_games,
        dry_run: config.dry_run,
        schema_version: SWEEP_SCHEMA_VERSION.to_string(),
    };

    log_sweep_info(
        "sweep_completed",
        json!({
            "run_id": run_context.run_id,
            "deleted_games": summary.deleted_games,
            "deleted_items": summary.deleted_items,
            "failed_games": summary.failed_games.len(),
            "dry_run": summary.dry_run,
        }),
    );

    success_response(200, &summary)
}

/// Drains every scan page before reporting the expired set; a partial page
/// is never treated as the complete result.
fn discover_expired_games(
    store: &dyn SweepStore,
    cutoff: &str,
) -> Result<Vec<GameRecord>, DiscoveryError> {
    let mut games = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = store
            .scan_expired_games(cutoff, page_token.as_deref())
            .map_err(DiscoveryError::new)?;
        games.extend(page.games);
        match page.next_token {
            Some(token) => page_token = Some(token),
            None => return Ok(games),
        }
    }
}

/// Cascades one game: entries, then scores, then the game record itself.
/// The parent delete only runs after every child is gone, so an interrupted
/// run never strands children without a discoverable parent.
fn sweep_game(
    store: &dyn SweepStore,
    game: &GameRecord,
    dry_run: bool,
    run_id: &str,
) -> Result<u64, GameFailure> {
    let game_id = game.game_id.as_str();

    let mut deleted_entries = 0u64;
    let mut page_token: Option<String> = None;
    loop {
        let page = store
            .query_entries(game_id, page_token.as_deref())
            .map_err(|message| game_failure(game_id, SweepPhase::EntryLookup, message))?;
        for key in &page.keys {
            if !dry_run {
                store
                    .delete_entry(key)
                    .map_err(|message| game_failure(game_id, SweepPhase::EntryDelete, message))?;
            }
            deleted_entries += 1;
        }
        match page.next_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    let mut deleted_scores = 0u64;
    let mut page_token: Option<String> = None;
    loop {
        let page = store
            .query_scores(game_id, page_token.as_deref())
            .map_err(|message| game_failure(game_id, SweepPhase::ScoreLookup, message))?;
        for key in &page.keys {
            if !dry_run {
                store
                    .delete_score(key)
                    .map_err(|message| game_failure(game_id, SweepPhase::ScoreDelete, message))?;
            }
            deleted_scores += 1;
        }
        match page.next_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    log_sweep_info(
        "game_children_deleted",
        json!({
            "run_id": run_id,
            "game_id": game_id,
            "entries": deleted_entries,
            "scores": deleted_scores,
            "dry_run": dry_run,
        }),
    );

    if !dry_run {
        store
            .delete_game(game_id)
            .map_err(|message| game_failure(game_id, SweepPhase::GameDelete, message))?;
    }

    Ok(deleted_entries + deleted_scores)
}

fn game_failure(game_id: &str, phase: SweepPhase, message: String) -> GameFailure {
    GameFailure {
        game_id: game_id.to_string(),
        phase,
        message,
    }
}

fn log_sweep_info(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "retention_sweeper",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_sweep_error(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "retention_sweeper",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn success_response(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: serde_json::to_string(&payload).expect("response payload should serialize"),
    }
}

fn error_response(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: serde_json::to_string(&payload).expect("response payload should serialize"),
    }
}
