use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use time::OffsetDateTime;

type HmacSha256 = Hmac<Sha256>;

/// Accepted clock skew between the delivery timestamp and our clock.
const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

/// Transport-level webhook failures. These map straight to HTTP statuses and
/// are checked before any state is touched.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook secret not configured")]
    MissingSecret,

    #[error("webhook secret is malformed")]
    MalformedSecret,

    #[error("missing svix headers")]
    MissingHeaders,

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingSecret | Self::MalformedSecret | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MissingHeaders | Self::InvalidSignature | Self::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        // Responses never carry internal detail, only a fixed phrase.
        let body = match &self {
            Self::MissingSecret | Self::MalformedSecret => "Webhook secret not configured",
            Self::MissingHeaders => "Missing svix headers",
            Self::InvalidSignature => "Invalid webhook signature",
            Self::InvalidPayload(_) => "Invalid payload",
            Self::Database(e) => {
                tracing::error!(error = %e, "webhook database error");
                "Internal server error"
            }
        };
        (self.status_code(), body).into_response()
    }
}

/// Verify a svix-signed delivery: HMAC-SHA256 over `"{id}.{timestamp}.{body}"`
/// with the base64 key carried after the `whsec_` prefix. The signature
/// header lists space-separated `v1,<base64>` candidates; any constant-time
/// match within the timestamp tolerance accepts the delivery.
pub fn verify_signature(
    secret: &str,
    svix_id: &str,
    svix_timestamp: &str,
    svix_signature: &str,
    body: &str,
) -> Result<(), WebhookError> {
    let encoded_key = secret
        .strip_prefix("whsec_")
        .ok_or(WebhookError::MalformedSecret)?;
    let key = STANDARD
        .decode(encoded_key)
        .map_err(|_| WebhookError::MalformedSecret)?;

    let timestamp: i64 = svix_timestamp
        .parse()
        .map_err(|_| WebhookError::InvalidSignature)?;
    let now = OffsetDateTime::now_utc().unix_timestamp();
    if (now - timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(WebhookError::InvalidSignature);
    }

    let mut mac =
        HmacSha256::new_from_slice(&key).map_err(|_| WebhookError::MalformedSecret)?;
    mac.update(format!("{svix_id}.{svix_timestamp}.{body}").as_bytes());

    for candidate in svix_signature.split_whitespace() {
        let Some((version, signature)) = candidate.split_once(',') else {
            continue;
        };
        if version != "v1" {
            continue;
        }
        let Ok(signature) = STANDARD.decode(signature) else {
            continue;
        };
        if mac.clone().verify_slice(&signature).is_ok() {
            return Ok(());
        }
    }

    Err(WebhookError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_dGVzdC1zZWNyZXQ=";

    fn sign(secret: &str, id: &str, timestamp: &str, body: &str) -> String {
        let key = STANDARD
            .decode(secret.strip_prefix("whsec_").unwrap())
            .unwrap();
        let mut mac = HmacSha256::new_from_slice(&key).unwrap();
        mac.update(format!("{id}.{timestamp}.{body}").as_bytes());
        format!("v1,{}", STANDARD.encode(mac.finalize().into_bytes()))
    }

    fn now_str() -> String {
        OffsetDateTime::now_utc().unix_timestamp().to_string()
    }

    #[test]
    fn accepts_valid_signature() {
        let ts = now_str();
        let body = r#"{"type":"user.created"}"#;
        let sig = sign(SECRET, "msg_1", &ts, body);
        assert!(verify_signature(SECRET, "msg_1", &ts, &sig, body).is_ok());
    }

    #[test]
    fn accepts_valid_signature_among_many() {
        let ts = now_str();
        let body = "{}";
        let good = sign(SECRET, "msg_1", &ts, body);
        let header = format!("v1,Zm9yZ2VkLXNpZ25hdHVyZQ== {good}");
        assert!(verify_signature(SECRET, "msg_1", &ts, &header, body).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let ts = now_str();
        let sig = sign(SECRET, "msg_1", &ts, "{}");
        let result = verify_signature(SECRET, "msg_1", &ts, &sig, r#"{"evil":true}"#);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn rejects_wrong_message_id() {
        let ts = now_str();
        let sig = sign(SECRET, "msg_1", &ts, "{}");
        let result = verify_signature(SECRET, "msg_2", &ts, &sig, "{}");
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn rejects_stale_timestamp() {
        let stale = (OffsetDateTime::now_utc().unix_timestamp() - 2 * TIMESTAMP_TOLERANCE_SECS)
            .to_string();
        let sig = sign(SECRET, "msg_1", &stale, "{}");
        let result = verify_signature(SECRET, "msg_1", &stale, &sig, "{}");
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn rejects_secret_without_prefix() {
        let ts = now_str();
        let result = verify_signature("dGVzdC1zZWNyZXQ=", "msg_1", &ts, "v1,abc", "{}");
        assert!(matches!(result, Err(WebhookError::MalformedSecret)));
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        let result = verify_signature(SECRET, "msg_1", "yesterday", "v1,abc", "{}");
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }
}
