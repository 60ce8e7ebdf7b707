use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{Role, User};

impl User {
    /// Find a user by external subject identifier.
    pub async fn find_by_clerk_id(db: &PgPool, clerk_id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, clerk_id, name, image_url, role, created_at
            FROM users
            WHERE clerk_id = $1
            "#,
        )
        .bind(clerk_id)
        .fetch_optional(db)
        .await
    }

    /// Insert a new mirror row unless one already exists for the subject.
    ///
    /// The unique constraint on `clerk_id` is the tie-break for concurrent
    /// creation: the losing writer no-ops and re-reads.
    pub async fn insert_if_absent(
        db: &PgPool,
        clerk_id: &str,
        name: &str,
        image_url: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (clerk_id, name, image_url, role)
            VALUES ($1, $2, $3, 'user')
            ON CONFLICT (clerk_id) DO NOTHING
            "#,
        )
        .bind(clerk_id)
        .bind(name)
        .bind(image_url)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Patch profile fields; `None` leaves the stored value untouched.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        name: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                image_url = COALESCE($3, image_url)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(image_url)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Upsert keyed by subject identifier; webhook deliveries are applied
    /// through this so re-delivery is a no-op beyond the first write.
    pub async fn upsert_from_webhook(
        db: &PgPool,
        clerk_id: &str,
        name: &str,
        image_url: Option<&str>,
        role: Role,
    ) -> Result<Uuid, sqlx::Error> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO users (clerk_id, name, image_url, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (clerk_id) DO UPDATE
            SET name = EXCLUDED.name,
                image_url = EXCLUDED.image_url,
                role = EXCLUDED.role
            RETURNING id
            "#,
        )
        .bind(clerk_id)
        .bind(name)
        .bind(image_url)
        .bind(role)
        .fetch_one(db)
        .await?;
        Ok(id)
    }

    /// Delete a user together with every recommendation they own, as one
    /// transaction so no orphaned recommendations survive.
    pub async fn delete_with_recommendations(db: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        let mut tx = db.begin().await?;
        sqlx::query("DELETE FROM recommendations WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await
    }
}
