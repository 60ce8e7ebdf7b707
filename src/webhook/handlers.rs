use axum::{extract::State, http::HeaderMap};
use tracing::{debug, instrument, warn};

use crate::state::AppState;
use crate::users::services as users;

use super::events::WebhookEvent;
use super::verify::{verify_signature, WebhookError};

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Identity-provider user lifecycle webhook. Signature verification happens
/// before the payload is even parsed; nothing is written on a rejected
/// delivery.
#[instrument(skip(state, headers, body))]
pub async fn clerk_users_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<&'static str, WebhookError> {
    let secret = state
        .config
        .clerk_webhook_secret
        .as_deref()
        .ok_or(WebhookError::MissingSecret)?;

    let (svix_id, svix_timestamp, svix_signature) = match (
        header(&headers, "svix-id"),
        header(&headers, "svix-timestamp"),
        header(&headers, "svix-signature"),
    ) {
        (Some(id), Some(ts), Some(sig)) => (id, ts, sig),
        _ => {
            warn!("webhook delivery missing svix headers");
            return Err(WebhookError::MissingHeaders);
        }
    };

    verify_signature(secret, svix_id, svix_timestamp, svix_signature, &body)?;

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

    match event.kind.as_str() {
        "user.created" | "user.updated" => {
            let subject = event
                .data
                .id
                .as_deref()
                .ok_or_else(|| WebhookError::InvalidPayload("missing user id".into()))?;
            users::apply_user_upsert(&state.db, subject, &event.data).await?;
        }
        "user.deleted" => {
            if let Some(subject) = event.data.id.as_deref() {
                users::delete_user_by_clerk_id(&state.db, subject).await?;
            }
        }
        other => {
            debug!(kind = other, "ignoring webhook event");
        }
    }

    Ok("OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn missing_secret_is_a_server_error() {
        let response = WebhookError::MissingSecret.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_headers_and_bad_signature_are_client_errors() {
        assert_eq!(
            WebhookError::MissingHeaders.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::InvalidSignature.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
