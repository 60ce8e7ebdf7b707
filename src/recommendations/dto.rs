use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::recommendations::repo_types::{Genre, RecommendationWithAuthorRow};

#[derive(Debug, Deserialize)]
pub struct CreateRecommendationRequest {
    pub title: String,
    pub genre: Genre,
    pub link: String,
    pub blurb: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedRecommendation {
    pub id: Uuid,
}

/// A recommendation enriched with denormalized author fields, so the client
/// never needs a second lookup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationWithAuthor {
    pub id: Uuid,
    pub title: String,
    pub genre: Genre,
    pub link: String,
    pub blurb: String,
    pub user_id: Uuid,
    pub is_staff_pick: bool,
    pub created_at: OffsetDateTime,
    pub author_name: String,
    pub author_image_url: Option<String>,
}

impl From<RecommendationWithAuthorRow> for RecommendationWithAuthor {
    fn from(row: RecommendationWithAuthorRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            genre: row.genre,
            link: row.link,
            blurb: row.blurb,
            user_id: row.user_id,
            is_staff_pick: row.is_staff_pick,
            created_at: row.created_at,
            author_name: row.author_name.unwrap_or_else(|| "Unknown".to_string()),
            author_image_url: row.author_image_url,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffPickState {
    pub id: Uuid,
    pub is_staff_pick: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub genre: Option<Genre>,
    pub cursor: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

/// One page of results plus the continuation state, mirroring the shape the
/// client consumes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page: Vec<RecommendationWithAuthor>,
    pub is_done: bool,
    pub continue_cursor: String,
}

impl Page {
    pub fn empty() -> Self {
        Self {
            page: Vec::new(),
            is_done: true,
            continue_cursor: String::new(),
        }
    }
}

/// Keyset position of the last row handed out, packed into an opaque string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: OffsetDateTime,
    pub id: Uuid,
}

impl Cursor {
    pub fn encode(&self) -> String {
        let micros = self.created_at.unix_timestamp_nanos() / 1_000;
        URL_SAFE_NO_PAD.encode(format!("{}:{}", micros, self.id))
    }

    pub fn decode(raw: &str) -> Result<Self, AppError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|_| AppError::InvalidCursor)?;
        let text = String::from_utf8(bytes).map_err(|_| AppError::InvalidCursor)?;
        let (micros, id) = text.split_once(':').ok_or(AppError::InvalidCursor)?;
        let micros: i128 = micros.parse().map_err(|_| AppError::InvalidCursor)?;
        let created_at = OffsetDateTime::from_unix_timestamp_nanos(micros * 1_000)
            .map_err(|_| AppError::InvalidCursor)?;
        let id = id.parse().map_err(|_| AppError::InvalidCursor)?;
        Ok(Self { created_at, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn cursor_round_trip() {
        let cursor = Cursor {
            created_at: datetime!(2024-05-01 12:30:45.123456 UTC),
            id: Uuid::new_v4(),
        };
        let decoded = Cursor::decode(&cursor.encode()).expect("decode");
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn cursor_rejects_garbage() {
        assert!(Cursor::decode("not base64 ***").is_err());
        assert!(Cursor::decode(&URL_SAFE_NO_PAD.encode("missing-separator")).is_err());
        assert!(Cursor::decode(&URL_SAFE_NO_PAD.encode("abc:not-a-uuid")).is_err());
    }

    #[test]
    fn missing_author_falls_back_to_unknown() {
        let row = RecommendationWithAuthorRow {
            id: Uuid::new_v4(),
            title: "Dune".into(),
            genre: Genre::SciFi,
            link: "https://example.com".into(),
            blurb: "Great book".into(),
            user_id: Uuid::new_v4(),
            is_staff_pick: false,
            created_at: datetime!(2024-05-01 12:00 UTC),
            author_name: None,
            author_image_url: None,
        };
        let enriched = RecommendationWithAuthor::from(row);
        assert_eq!(enriched.author_name, "Unknown");
        assert_eq!(enriched.author_image_url, None);
    }

    #[test]
    fn staff_pick_field_serializes_camel_case() {
        let state = StaffPickState {
            id: Uuid::nil(),
            is_staff_pick: false,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"isStaffPick\":false"));
    }
}
