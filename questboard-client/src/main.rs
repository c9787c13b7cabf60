//! Questboard client entry point.
//!
//! Loads the three dashboard collections once, logs what came back, and exits.

use questboard_client::api_client::RestTableService;
use questboard_client::config::{arg_value, ClientConfig};
use questboard_client::error::ClientError;
use questboard_client::hooks::{use_achievements, use_user_activity, use_users};
use questboard_client::state::ResourceState;
use questboard_client::telemetry;
use questboard_core::UserId;
use questboard_storage::RemoteTableService;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let config = ClientConfig::load()?;
    telemetry::init_logging(&config.log)?;

    let service: Arc<dyn RemoteTableService> = Arc::new(RestTableService::new(&config)?);
    let user_id = arg_value("--user").map(UserId::new);

    tracing::info!(
        base_url = %config.api_base_url,
        user = ?user_id,
        "Loading dashboard collections"
    );

    let achievements = use_achievements(service.clone());
    let activity = use_user_activity(service.clone(), user_id);
    let users = use_users(service);

    let (achievements_state, activity_state, users_state) = tokio::join!(
        achievements.wait_until_settled(),
        activity.wait_until_settled(),
        users.wait_until_settled(),
    );

    log_summary(achievements.table(), &achievements_state);
    log_summary(activity.table(), &activity_state);
    log_summary(users.table(), &users_state);

    if let Some(top) = achievements_state.data.first() {
        tracing::info!(name = %top.name, xp_reward = top.xp_reward, "Top achievement");
    }
    if let Some(latest) = activity_state.data.first() {
        tracing::info!(
            user = %latest.user_id,
            activity_type = %latest.activity_type,
            at = %latest.created_at,
            "Latest activity"
        );
    }
    Ok(())
}

fn log_summary<T>(table: &str, state: &ResourceState<T>) {
    match &state.error {
        None => tracing::info!(table, rows = state.data.len(), "Loaded"),
        Some(error) => tracing::error!(table, error = %error, "Load failed"),
    }
}
