use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::recommendations::repo_types::{Genre, Recommendation, RecommendationWithAuthorRow};

const ENRICHED_SELECT: &str = "SELECT r.id, r.title, r.genre, r.link, r.blurb, r.user_id, \
     r.is_staff_pick, r.created_at, \
     u.name AS author_name, u.image_url AS author_image_url \
     FROM recommendations r \
     LEFT JOIN users u ON u.id = r.user_id";

/// Most recent recommendations, author-enriched, newest first.
pub async fn list_recent(
    db: &PgPool,
    limit: i64,
) -> Result<Vec<RecommendationWithAuthorRow>, sqlx::Error> {
    sqlx::query_as::<_, RecommendationWithAuthorRow>(&format!(
        "{ENRICHED_SELECT} ORDER BY r.created_at DESC, r.id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(db)
    .await
}

/// One keyset page, newest first, optionally narrowed to a genre. `after`
/// is the position of the last row the caller has already seen.
pub async fn list_page(
    db: &PgPool,
    genre: Option<Genre>,
    after: Option<(OffsetDateTime, Uuid)>,
    limit: i64,
) -> Result<Vec<RecommendationWithAuthorRow>, sqlx::Error> {
    let mut query = QueryBuilder::<Postgres>::new(ENRICHED_SELECT);
    query.push(" WHERE TRUE");
    if let Some(genre) = genre {
        query.push(" AND r.genre = ").push_bind(genre);
    }
    if let Some((created_at, id)) = after {
        query
            .push(" AND (r.created_at, r.id) < (")
            .push_bind(created_at)
            .push(", ")
            .push_bind(id)
            .push(")");
    }
    query
        .push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ")
        .push_bind(limit);

    query
        .build_query_as::<RecommendationWithAuthorRow>()
        .fetch_all(db)
        .await
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    title: &str,
    genre: Genre,
    link: &str,
    blurb: &str,
) -> Result<Uuid, sqlx::Error> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO recommendations (title, genre, link, blurb, user_id, is_staff_pick)
        VALUES ($1, $2, $3, $4, $5, FALSE)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(genre)
    .bind(link)
    .bind(blurb)
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(id)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Recommendation>, sqlx::Error> {
    sqlx::query_as::<_, Recommendation>(
        r#"
        SELECT id, title, genre, link, blurb, user_id, is_staff_pick, created_at
        FROM recommendations
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM recommendations WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_staff_pick(db: &PgPool, id: Uuid, value: bool) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE recommendations SET is_staff_pick = $2 WHERE id = $1")
        .bind(id)
        .bind(value)
        .execute(db)
        .await?;
    Ok(())
}
