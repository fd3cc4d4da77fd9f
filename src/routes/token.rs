use axum::extract::State;
use tracing::info;

use crate::{error::AppError, services::metrics_manager::Counter, state::SharedState};

/// Returns a streaming token as plain text.
pub async fn access_token_handler(State(state): State<SharedState>) -> Result<String, AppError> {
    match state.tokens.fetch_token().await {
        Ok(token) => {
            info!("Issued streaming access token");
            state.metrics.increment(Counter::TokenIssued).await;
            Ok(token)
        }
        Err(e) => {
            state.metrics.increment(Counter::TokenFailed).await;
            Err(e.into())
        }
    }
}
