use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// The fixed genre set. Values outside it are rejected at deserialization,
/// before any handler runs. Wire and database names are kebab-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "genre", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Genre {
    Horror,
    Action,
    Comedy,
    Drama,
    SciFi,
    Documentary,
    Thriller,
    Romance,
    Animation,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recommendation {
    pub id: Uuid,
    pub title: String,
    pub genre: Genre,
    pub link: String,
    pub blurb: String,
    pub user_id: Uuid,
    pub is_staff_pick: bool,
    pub created_at: OffsetDateTime,
}

/// A recommendation row joined with its author's display fields. The author
/// columns are nullable so a missing owner degrades to a fallback name
/// instead of dropping the row.
#[derive(Debug, Clone, FromRow)]
pub struct RecommendationWithAuthorRow {
    pub id: Uuid,
    pub title: String,
    pub genre: Genre,
    pub link: String,
    pub blurb: String,
    pub user_id: Uuid,
    pub is_staff_pick: bool,
    pub created_at: OffsetDateTime,
    pub author_name: Option<String>,
    pub author_image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_wire_names_are_kebab_case() {
        assert_eq!(serde_json::to_string(&Genre::SciFi).unwrap(), "\"sci-fi\"");
        assert_eq!(
            serde_json::to_string(&Genre::Documentary).unwrap(),
            "\"documentary\""
        );
        let parsed: Genre = serde_json::from_str("\"sci-fi\"").unwrap();
        assert_eq!(parsed, Genre::SciFi);
    }

    #[test]
    fn unknown_genre_is_rejected() {
        assert!(serde_json::from_str::<Genre>("\"western\"").is_err());
    }
}
