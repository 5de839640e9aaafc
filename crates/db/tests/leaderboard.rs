use sqlx::PgPool;

use oddplate_db::models::leaderboard::{UpsertLeaderboardEntry, UpsertOutcome};
use oddplate_db::repositories::leaderboard_repo::LeaderboardRepo;

fn entry(place_id: &str, region: &str, score: f64) -> UpsertLeaderboardEntry {
    UpsertLeaderboardEntry {
        place_id: place_id.to_string(),
        region: region.to_string(),
        place_name: format!("Place {place_id}"),
        address: "1 Example St".to_string(),
        score,
        image_url: format!("https://cdn.example.com/{place_id}.png"),
    }
}

#[sqlx::test]
async fn top_returns_descending_scores(pool: PgPool) {
    for (i, score) in [50.0, 90.0, 10.0, 75.0].iter().enumerate() {
        LeaderboardRepo::upsert(&pool, &entry(&format!("p{i}"), "us-mn", *score))
            .await
            .unwrap();
    }

    let top = LeaderboardRepo::top_by_region(&pool, "us-mn", 4).await.unwrap();
    let scores: Vec<f64> = top.iter().map(|e| e.score).collect();
    assert_eq!(scores, vec![90.0, 75.0, 50.0, 10.0]);
}

#[sqlx::test]
async fn top_is_bounded_and_region_scoped(pool: PgPool) {
    for i in 0..5 {
        LeaderboardRepo::upsert(&pool, &entry(&format!("p{i}"), "us-mn", i as f64 * 10.0))
            .await
            .unwrap();
    }
    LeaderboardRepo::upsert(&pool, &entry("other", "us-wi", 99.0))
        .await
        .unwrap();

    let top = LeaderboardRepo::top_by_region(&pool, "us-mn", 3).await.unwrap();
    assert_eq!(top.len(), 3);
    assert!(top.iter().all(|e| e.region == "us-mn"));
}

#[sqlx::test]
async fn first_upsert_inserts(pool: PgPool) {
    let outcome = LeaderboardRepo::upsert(&pool, &entry("p1", "us-mn", 50.0))
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Inserted);
}

#[sqlx::test]
async fn higher_score_updates(pool: PgPool) {
    LeaderboardRepo::upsert(&pool, &entry("p1", "us-mn", 50.0))
        .await
        .unwrap();
    let outcome = LeaderboardRepo::upsert(&pool, &entry("p1", "us-mn", 80.0))
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);

    let found = LeaderboardRepo::find_by_place(&pool, "p1", "us-mn")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.score, 80.0);
}

#[sqlx::test]
async fn lower_score_is_ignored_and_rank_unchanged(pool: PgPool) {
    LeaderboardRepo::upsert(&pool, &entry("winner", "us-mn", 90.0))
        .await
        .unwrap();
    LeaderboardRepo::upsert(&pool, &entry("runner-up", "us-mn", 60.0))
        .await
        .unwrap();

    let outcome = LeaderboardRepo::upsert(&pool, &entry("winner", "us-mn", 30.0))
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::IgnoredLowerScore);

    let top = LeaderboardRepo::top_by_region(&pool, "us-mn", 2).await.unwrap();
    assert_eq!(top[0].place_id, "winner");
    assert_eq!(top[0].score, 90.0);
    assert_eq!(top[1].place_id, "runner-up");
}

#[sqlx::test]
async fn tied_scores_keep_both_entries(pool: PgPool) {
    LeaderboardRepo::upsert(&pool, &entry("a", "us-mn", 50.0))
        .await
        .unwrap();
    LeaderboardRepo::upsert(&pool, &entry("b", "us-mn", 50.0))
        .await
        .unwrap();

    let top = LeaderboardRepo::top_by_region(&pool, "us-mn", 10).await.unwrap();
    assert_eq!(top.len(), 2);
}

#[sqlx::test]
async fn delete_by_place_spans_regions(pool: PgPool) {
    LeaderboardRepo::upsert(&pool, &entry("p1", "us-mn", 50.0))
        .await
        .unwrap();
    LeaderboardRepo::upsert(&pool, &entry("p1", "us-wi", 60.0))
        .await
        .unwrap();

    let removed = LeaderboardRepo::delete_by_place(&pool, "p1").await.unwrap();
    assert_eq!(removed, 2);
    assert!(LeaderboardRepo::find_by_place(&pool, "p1", "us-mn")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test]
async fn delete_in_region_leaves_other_regions(pool: PgPool) {
    LeaderboardRepo::upsert(&pool, &entry("p1", "us-mn", 50.0))
        .await
        .unwrap();
    LeaderboardRepo::upsert(&pool, &entry("p1", "us-wi", 60.0))
        .await
        .unwrap();

    LeaderboardRepo::delete_by_place_in_region(&pool, "p1", "us-mn")
        .await
        .unwrap();
    assert!(LeaderboardRepo::find_by_place(&pool, "p1", "us-mn")
        .await
        .unwrap()
        .is_none());
    assert!(LeaderboardRepo::find_by_place(&pool, "p1", "us-wi")
        .await
        .unwrap()
        .is_some());
}
