//! Repository for the `comics` cache table.

use chrono::Duration;
use oddplate_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::comic::{Comic, CreateComic};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "place_id, place_name, narrative, score, image_key, image_url, created_at, expires_at";

/// Provides cache operations for generated comics.
pub struct ComicRepo;

impl ComicRepo {
    /// Look up the comic for a place.
    ///
    /// Returns expired rows too; the caller decides validity against the
    /// stored `expires_at`.
    pub async fn find_by_place(pool: &PgPool, place_id: &str) -> Result<Option<Comic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comics WHERE place_id = $1");
        sqlx::query_as::<_, Comic>(&query)
            .bind(place_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or fully replace the comic for a place.
    ///
    /// The expiry is always stamped as `now() + ttl` at write time,
    /// regardless of anything the caller holds, so stale expiry values
    /// can never leak through.
    pub async fn upsert(
        pool: &PgPool,
        body: &CreateComic,
        ttl: Duration,
    ) -> Result<Comic, sqlx::Error> {
        let query = format!(
            "INSERT INTO comics
                (place_id, place_name, narrative, score, image_key, image_url, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, now(), now() + $7 * INTERVAL '1 second')
             ON CONFLICT (place_id) DO UPDATE SET
                place_name = EXCLUDED.place_name,
                narrative = EXCLUDED.narrative,
                score = EXCLUDED.score,
                image_key = EXCLUDED.image_key,
                image_url = EXCLUDED.image_url,
                created_at = now(),
                expires_at = now() + $7 * INTERVAL '1 second'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comic>(&query)
            .bind(&body.place_id)
            .bind(&body.place_name)
            .bind(&body.narrative)
            .bind(body.score)
            .bind(&body.image_key)
            .bind(&body.image_url)
            .bind(ttl.num_seconds() as f64)
            .fetch_one(pool)
            .await
    }

    /// Delete the comic for a place (takedown path).
    pub async fn delete_by_place(pool: &PgPool, place_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM comics WHERE place_id = $1")
            .bind(place_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// List comics that expired at or before `cutoff`, oldest first,
    /// bounded to `limit` rows. Used by the expiry sweep.
    pub async fn list_expired(
        pool: &PgPool,
        cutoff: Timestamp,
        limit: i64,
    ) -> Result<Vec<Comic>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comics
             WHERE expires_at <= $1
             ORDER BY expires_at ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, Comic>(&query)
            .bind(cutoff)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
