use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::accounts::register_account;
use crate::errors::AppError;
use crate::models::user::{Account, NewAccount};
use crate::state::AppState;

/// POST /api/v1/accounts
pub async fn handle_register(
    State(state): State<AppState>,
    payload: Result<Json<NewAccount>, JsonRejection>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let Json(req) = payload?;
    let account = register_account(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(account)))
}
