use chrono::Utc;
use got_retention_core::cutoff::RetentionWindow;
use got_retention_lambda::adapters::dynamodb::DynamoDbSweepStore;
use got_retention_lambda::handlers::sweep::{handle_sweep_event, ApiGatewayResponse, SweepConfig};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

const DEFAULT_RETENTION_HOURS: u64 = 48;

async fn handle_request(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    let config = SweepConfig {
        retention: RetentionWindow::from_hours(parse_retention_hours(
            std::env::var("RETENTION_HOURS").ok(),
        )?),
        event_time: Utc::now(),
        dry_run: parse_flag("DRY_RUN", std::env::var("DRY_RUN").ok())?,
        max_games: parse_game_cap(std::env::var("MAX_GAMES_PER_RUN").ok())?,
    };

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoDbSweepStore::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        std::env::var("GAMES_TABLE").unwrap_or_else(|_| "Games".to_string()),
        std::env::var("ENTRIES_TABLE").unwrap_or_else(|_| "Entries".to_string()),
        std::env::var("SCORES_TABLE").unwrap_or_else(|_| "Scores".to_string()),
    );

    Ok(handle_sweep_event(
        &event.payload,
        &event.context.request_id,
        &config,
        &store,
    ))
}

fn parse_retention_hours(value: Option<String>) -> Result<u64, Error> {
    match value {
        None => Ok(DEFAULT_RETENTION_HOURS),
        Some(text) => text.trim().parse::<u64>().map_err(|_| {
            Error::from(format!(
                "RETENTION_HOURS must be a non-negative integer, got '{text}'"
            ))
        }),
    }
}

fn parse_flag(name: &str, value: Option<String>) -> Result<bool, Error> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(text) => match text.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(Error::from(format!(
                "{name} must be a boolean flag, got '{other}'"
            ))),
        },
    }
}

/// `MAX_GAMES_PER_RUN=0` (or unset) means unbounded.
fn parse_game_cap(value: Option<String>) -> Result<Option<usize>, Error> {
    match value {
        None => Ok(None),
        Some(text) => {
            let cap = text.trim().parse::<usize>().map_err(|_| {
                Error::from(format!(
                    "MAX_GAMES_PER_RUN must be a non-negative integer, got '{text}'"
                ))
            })?;
            Ok((cap > 0).then_some(cap))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
