//! Contact form handler.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::forms::ContactForm;
use crate::state::AppState;

/// Accept a contact message from any visitor, signed in or not.
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let message = form.validate().map_err(AppError::Validation)?;
    state.contact().insert(&message).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Message sent, we'll get back to you as soon as possible" })),
    ))
}
