//! Repository for the `leaderboard_entries` table.
//!
//! Score monotonicity is enforced here, not in caller logic: an upsert
//! carrying a lower score than the stored row is ignored and reported as
//! [`UpsertOutcome::IgnoredLowerScore`].

use oddplate_core::ranking::score_to_sort_key;
use sqlx::PgPool;

use crate::models::leaderboard::{LeaderboardEntry, UpsertLeaderboardEntry, UpsertOutcome};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "place_id, region, place_name, address, score, sort_key, image_url, updated_at";

/// Provides ranked-set operations for the regional leaderboard.
pub struct LeaderboardRepo;

impl LeaderboardRepo {
    /// Insert or update the entry for a (place, region) pair.
    ///
    /// The sort key is derived here from the score and place id. The
    /// update only fires when the new score strictly beats the stored
    /// one; otherwise the row is untouched.
    pub async fn upsert(
        pool: &PgPool,
        body: &UpsertLeaderboardEntry,
    ) -> Result<UpsertOutcome, sqlx::Error> {
        let sort_key = score_to_sort_key(body.score, &body.place_id);
        // `xmax = 0` distinguishes a fresh insert from a conflict update.
        let row: Option<(bool,)> = sqlx::query_as(
            "INSERT INTO leaderboard_entries
                (place_id, region, place_name, address, score, sort_key, image_url, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, now())
             ON CONFLICT (place_id, region) DO UPDATE SET
                place_name = EXCLUDED.place_name,
                address = EXCLUDED.address,
                score = EXCLUDED.score,
                sort_key = EXCLUDED.sort_key,
                image_url = EXCLUDED.image_url,
                updated_at = now()
             WHERE EXCLUDED.score > leaderboard_entries.score
             RETURNING (xmax = 0) AS inserted",
        )
        .bind(&body.place_id)
        .bind(&body.region)
        .bind(&body.place_name)
        .bind(&body.address)
        .bind(body.score)
        .bind(&sort_key)
        .bind(&body.image_url)
        .fetch_optional(pool)
        .await?;

        Ok(match row {
            Some((true,)) => UpsertOutcome::Inserted,
            Some((false,)) => UpsertOutcome::Updated,
            None => UpsertOutcome::IgnoredLowerScore,
        })
    }

    /// Top `n` entries for a region, highest score first.
    ///
    /// A plain ascending scan over `sort_key`; no server-side sort by
    /// score is needed because the key construction inverts the score.
    pub async fn top_by_region(
        pool: &PgPool,
        region: &str,
        n: i64,
    ) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leaderboard_entries
             WHERE region = $1
             ORDER BY sort_key ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, LeaderboardEntry>(&query)
            .bind(region)
            .bind(n)
            .fetch_all(pool)
            .await
    }

    /// Look up one place's entry within a region.
    pub async fn find_by_place(
        pool: &PgPool,
        place_id: &str,
        region: &str,
    ) -> Result<Option<LeaderboardEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM leaderboard_entries
             WHERE place_id = $1 AND region = $2"
        );
        sqlx::query_as::<_, LeaderboardEntry>(&query)
            .bind(place_id)
            .bind(region)
            .fetch_optional(pool)
            .await
    }

    /// Remove a place's entries across all regions (takedown path).
    pub async fn delete_by_place(pool: &PgPool, place_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leaderboard_entries WHERE place_id = $1")
            .bind(place_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remove a place's entry from one region only.
    pub async fn delete_by_place_in_region(
        pool: &PgPool,
        place_id: &str,
        region: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM leaderboard_entries WHERE place_id = $1 AND region = $2")
            .bind(place_id)
            .bind(region)
            .execute(pool)
            .await?;
        Ok(())
    }
}
