//! End-to-end pipeline tests over in-memory collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::Duration;

use oddplate_cloud::{ArtifactStore, CloudError};
use oddplate_core::narrative::NarrativeAnalysis;
use oddplate_core::prompt::fallback_prompt;
use oddplate_core::review::Review;
use oddplate_db::models::comic::{Comic, CreateComic};
use oddplate_db::models::leaderboard::{UpsertLeaderboardEntry, UpsertOutcome};
use oddplate_pipeline::ports::{
    ComicCache, ImageSynthesizer, LeaderboardStore, NarrativeAnalyzer, ReviewSource,
};
use oddplate_pipeline::takedown::{remove_place, StepResult};
use oddplate_pipeline::{
    ComicPipeline, ErrorKind, LeaderboardWrite, PipelineConfig, PipelineError,
};
use oddplate_places::PlaceDetails;

// ---------------------------------------------------------------------------
// In-memory collaborators
// ---------------------------------------------------------------------------

struct StubSource {
    details: Option<PlaceDetails>,
}

#[async_trait]
impl ReviewSource for StubSource {
    async fn get_details(&self, place_id: &str) -> Result<PlaceDetails, PipelineError> {
        self.details
            .clone()
            .ok_or_else(|| PipelineError::PlaceNotFound(place_id.to_string()))
    }
}

struct StubAnalyzer {
    analysis: NarrativeAnalysis,
}

#[async_trait]
impl NarrativeAnalyzer for StubAnalyzer {
    async fn analyze(&self, _review_texts: &[String]) -> Result<NarrativeAnalysis, PipelineError> {
        Ok(self.analysis.clone())
    }
}

/// Scripted image provider: rejects the first `reject_first` calls with a
/// content-policy error, then returns a real PNG. Captures every prompt.
struct StubSynthesizer {
    reject_first: usize,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubSynthesizer {
    fn new(reject_first: usize) -> Self {
        Self {
            reject_first,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSynthesizer for StubSynthesizer {
    async fn synthesize(&self, prompt: &str, _panel_count: u8) -> Result<Vec<u8>, PipelineError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if call < self.reject_first {
            return Err(PipelineError::ContentPolicy("unsafe prompt".to_string()));
        }
        Ok(png_bytes(96, 96))
    }
}

#[derive(Default)]
struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, CloudError> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(format!("https://blobs.test/{key}"))
    }

    async fn delete(&self, key: &str) -> Result<(), CloudError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

struct MemoryCache {
    rows: Mutex<HashMap<String, Comic>>,
    ttl: Duration,
}

impl MemoryCache {
    fn new(ttl: Duration) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn seed(&self, comic: Comic) {
        self.rows
            .lock()
            .unwrap()
            .insert(comic.place_id.clone(), comic);
    }
}

#[async_trait]
impl ComicCache for MemoryCache {
    async fn find(&self, place_id: &str) -> Result<Option<Comic>, PipelineError> {
        Ok(self.rows.lock().unwrap().get(place_id).cloned())
    }

    async fn upsert(&self, comic: &CreateComic) -> Result<Comic, PipelineError> {
        let now = chrono::Utc::now();
        let row = Comic {
            place_id: comic.place_id.clone(),
            place_name: comic.place_name.clone(),
            narrative: comic.narrative.clone(),
            score: comic.score,
            image_key: comic.image_key.clone(),
            image_url: comic.image_url.clone(),
            created_at: now,
            expires_at: now + self.ttl,
            from_cache: false,
        };
        self.seed(row.clone());
        Ok(row)
    }

    async fn delete(&self, place_id: &str) -> Result<(), PipelineError> {
        self.rows.lock().unwrap().remove(place_id);
        Ok(())
    }
}

/// Monotonic in-memory leaderboard keyed by (place, region).
#[derive(Default)]
struct MemoryLeaderboard {
    scores: Mutex<HashMap<(String, String), f64>>,
}

impl MemoryLeaderboard {
    fn seed(&self, place_id: &str, region: &str, score: f64) {
        self.scores
            .lock()
            .unwrap()
            .insert((place_id.to_string(), region.to_string()), score);
    }
}

#[async_trait]
impl LeaderboardStore for MemoryLeaderboard {
    async fn upsert(
        &self,
        entry: &UpsertLeaderboardEntry,
    ) -> Result<UpsertOutcome, PipelineError> {
        let mut scores = self.scores.lock().unwrap();
        let key = (entry.place_id.clone(), entry.region.clone());
        match scores.get(&key).copied() {
            None => {
                scores.insert(key, entry.score);
                Ok(UpsertOutcome::Inserted)
            }
            Some(existing) if entry.score > existing => {
                scores.insert(key, entry.score);
                Ok(UpsertOutcome::Updated)
            }
            Some(_) => Ok(UpsertOutcome::IgnoredLowerScore),
        }
    }

    async fn delete_by_place(&self, place_id: &str) -> Result<u64, PipelineError> {
        let mut scores = self.scores.lock().unwrap();
        let before = scores.len();
        scores.retain(|(place, _), _| place != place_id);
        Ok((before - scores.len()) as u64)
    }
}

struct FailingLeaderboard;

#[async_trait]
impl LeaderboardStore for FailingLeaderboard {
    async fn upsert(
        &self,
        _entry: &UpsertLeaderboardEntry,
    ) -> Result<UpsertOutcome, PipelineError> {
        Err(PipelineError::Storage("connection refused".to_string()))
    }

    async fn delete_by_place(&self, _place_id: &str) -> Result<u64, PipelineError> {
        Err(PipelineError::Storage("connection refused".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn review(rating: u8, text: &str) -> Review {
    Review {
        author: "tester".to_string(),
        text: text.to_string(),
        rating,
        time: chrono::Utc::now(),
    }
}

fn place_details(reviews: Vec<Review>) -> PlaceDetails {
    PlaceDetails {
        place_id: "p1".to_string(),
        display_name: "The Odd Plate".to_string(),
        address: "1 Example St".to_string(),
        region_code: "us-mn".to_string(),
        reviews,
    }
}

fn six_clean_reviews() -> Vec<Review> {
    vec![
        review(1, "The soup stared back at me."),
        review(1, "A pigeon took my fork and nobody blinked."),
        review(2, "The waiter recited a poem instead of the menu."),
        review(4, "Odd but charming, honestly."),
        review(5, "Best surreal dining in town."),
        review(5, "I left with more spoons than I arrived with."),
    ]
}

fn analysis(score: f64, panel_count: u8) -> NarrativeAnalysis {
    NarrativeAnalysis {
        score,
        panel_count,
        narrative: "The diner arrives hopeful. The soup blinks first. Everyone applauds."
            .to_string(),
    }
}

struct Fixture {
    synthesizer: Arc<StubSynthesizer>,
    store: Arc<MemoryStore>,
    cache: Arc<MemoryCache>,
    leaderboard: Arc<MemoryLeaderboard>,
    pipeline: ComicPipeline,
}

fn fixture(details: Option<PlaceDetails>, reject_first: usize) -> Fixture {
    let config = PipelineConfig::default();
    let synthesizer = Arc::new(StubSynthesizer::new(reject_first));
    let store = Arc::new(MemoryStore::default());
    let cache = Arc::new(MemoryCache::new(config.cache_ttl));
    let leaderboard = Arc::new(MemoryLeaderboard::default());
    let pipeline = ComicPipeline {
        source: Arc::new(StubSource { details }),
        analyzer: Arc::new(StubAnalyzer {
            analysis: analysis(72.0, 3),
        }),
        synthesizer: synthesizer.clone(),
        artifacts: store.clone(),
        cache: cache.clone(),
        leaderboard: leaderboard.clone(),
        font: None,
        config,
    };
    Fixture {
        synthesizer,
        store,
        cache,
        leaderboard,
        pipeline,
    }
}

fn cached_comic(place_id: &str, expires_in: Duration) -> Comic {
    let now = chrono::Utc::now();
    Comic {
        place_id: place_id.to_string(),
        place_name: "The Odd Plate".to_string(),
        narrative: "An old story.".to_string(),
        score: 40.0,
        image_key: format!("comics/{place_id}/old.png"),
        image_url: "https://blobs.test/old.png".to_string(),
        created_at: now - Duration::days(1),
        expires_at: now + expires_in,
        from_cache: false,
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generates_comic_end_to_end() {
    let fx = fixture(Some(place_details(six_clean_reviews())), 0);

    let outcome = fx.pipeline.generate("p1", false).await.unwrap();

    assert!(!outcome.comic.from_cache);
    assert_eq!(outcome.comic.place_id, "p1");
    assert_eq!(outcome.comic.score, 72.0);
    assert!(outcome.comic.image_key.starts_with("comics/p1/"));
    assert!(outcome.comic.image_key.ends_with(".png"));
    assert!(outcome
        .comic
        .image_url
        .starts_with("https://blobs.test/comics/p1/"));
    assert_eq!(
        outcome.comic.expires_at - outcome.comic.created_at,
        Duration::days(7)
    );
    assert_eq!(outcome.leaderboard, LeaderboardWrite::Inserted);
    assert_eq!(fx.synthesizer.call_count(), 1);
    assert!(fx
        .store
        .objects
        .lock()
        .unwrap()
        .contains_key(&outcome.comic.image_key));
}

#[tokio::test]
async fn content_policy_rejection_retries_with_generic_fallback() {
    let fx = fixture(Some(place_details(six_clean_reviews())), 1);

    let outcome = fx.pipeline.generate("p1", false).await.unwrap();

    assert_eq!(fx.synthesizer.call_count(), 2);
    let prompts = fx.synthesizer.prompts.lock().unwrap();
    assert_ne!(prompts[0], prompts[1]);
    assert_eq!(prompts[1], fallback_prompt(3));
    assert!(!outcome.comic.from_cache);
}

#[tokio::test]
async fn second_content_policy_rejection_is_terminal() {
    let fx = fixture(Some(place_details(six_clean_reviews())), 2);

    let err = fx.pipeline.generate("p1", false).await.unwrap_err();

    assert_matches!(err, PipelineError::ContentPolicy(_));
    assert_eq!(fx.synthesizer.call_count(), 2);
    assert!(fx.store.objects.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Cache behavior
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_cache_hit_skips_generation() {
    let fx = fixture(Some(place_details(six_clean_reviews())), 0);
    fx.cache.seed(cached_comic("p1", Duration::days(3)));

    let outcome = fx.pipeline.generate("p1", false).await.unwrap();

    assert!(outcome.comic.from_cache);
    assert_eq!(outcome.comic.narrative, "An old story.");
    assert_eq!(outcome.leaderboard, LeaderboardWrite::NotAttempted);
    assert_eq!(fx.synthesizer.call_count(), 0);
}

#[tokio::test]
async fn expired_cache_row_triggers_regeneration() {
    let fx = fixture(Some(place_details(six_clean_reviews())), 0);
    fx.cache.seed(cached_comic("p1", Duration::seconds(-10)));

    let outcome = fx.pipeline.generate("p1", false).await.unwrap();

    assert!(!outcome.comic.from_cache);
    assert_ne!(outcome.comic.narrative, "An old story.");
    assert_eq!(fx.synthesizer.call_count(), 1);
}

#[tokio::test]
async fn force_regenerate_bypasses_valid_cache() {
    let fx = fixture(Some(place_details(six_clean_reviews())), 0);
    fx.cache.seed(cached_comic("p1", Duration::days(3)));

    let outcome = fx.pipeline.generate("p1", true).await.unwrap();

    assert!(!outcome.comic.from_cache);
    assert_eq!(fx.synthesizer.call_count(), 1);
}

#[tokio::test]
async fn get_cached_hides_expired_rows() {
    let fx = fixture(None, 0);
    fx.cache.seed(cached_comic("p1", Duration::seconds(-10)));

    assert!(fx.pipeline.get_cached("p1").await.unwrap().is_none());
}

#[tokio::test]
async fn get_cached_marks_valid_rows() {
    let fx = fixture(None, 0);
    fx.cache.seed(cached_comic("p1", Duration::days(3)));

    let comic = fx.pipeline.get_cached("p1").await.unwrap().unwrap();
    assert!(comic.from_cache);
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_place_surfaces_not_found() {
    let fx = fixture(None, 0);

    let err = fx.pipeline.generate("missing", false).await.unwrap_err();

    assert_matches!(err, PipelineError::PlaceNotFound(ref id) if id == "missing");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn too_few_reviews_rejected_before_any_ai_call() {
    let reviews = vec![
        review(1, "odd"),
        review(2, "strange"),
        review(5, "fine"),
    ];
    let fx = fixture(Some(place_details(reviews)), 0);

    let err = fx.pipeline.generate("p1", false).await.unwrap_err();

    assert_matches!(
        err,
        PipelineError::InsufficientContent {
            found: 3,
            required: 5
        }
    );
    assert_eq!(fx.synthesizer.call_count(), 0);
}

#[tokio::test]
async fn profanity_filter_can_drop_below_minimum() {
    let mut reviews = six_clean_reviews();
    reviews.truncate(5);
    reviews[0].text = "This shit place served me a talking sandwich.".to_string();
    reviews[1].text = "What an ass of a maitre d'.".to_string();
    let fx = fixture(Some(place_details(reviews)), 0);

    let err = fx.pipeline.generate("p1", false).await.unwrap_err();

    assert_matches!(
        err,
        PipelineError::InsufficientContent {
            found: 3,
            required: 5
        }
    );
}

// ---------------------------------------------------------------------------
// Leaderboard policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn leaderboard_failure_does_not_fail_generation() {
    let mut fx = fixture(Some(place_details(six_clean_reviews())), 0);
    fx.pipeline.leaderboard = Arc::new(FailingLeaderboard);

    let outcome = fx.pipeline.generate("p1", false).await.unwrap();

    assert_eq!(outcome.leaderboard, LeaderboardWrite::Failed);
    assert!(!outcome.comic.from_cache);
}

#[tokio::test]
async fn lower_score_leaves_leaderboard_rank_unchanged() {
    let fx = fixture(Some(place_details(six_clean_reviews())), 0);
    fx.leaderboard.seed("p1", "us-mn", 90.0);

    let outcome = fx.pipeline.generate("p1", false).await.unwrap();

    assert_eq!(outcome.leaderboard, LeaderboardWrite::IgnoredLowerScore);
    let scores = fx.leaderboard.scores.lock().unwrap();
    assert_eq!(
        scores.get(&("p1".to_string(), "us-mn".to_string())),
        Some(&90.0)
    );
}

#[tokio::test]
async fn higher_score_updates_leaderboard() {
    let fx = fixture(Some(place_details(six_clean_reviews())), 0);
    fx.leaderboard.seed("p1", "us-mn", 10.0);

    let outcome = fx.pipeline.generate("p1", false).await.unwrap();

    assert_eq!(outcome.leaderboard, LeaderboardWrite::Updated);
}

// ---------------------------------------------------------------------------
// Takedown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn takedown_removes_blob_cache_and_leaderboard() {
    let fx = fixture(Some(place_details(six_clean_reviews())), 0);
    let outcome = fx.pipeline.generate("p1", false).await.unwrap();

    let report = remove_place(
        &fx.pipeline.cache,
        &fx.pipeline.artifacts,
        &fx.pipeline.leaderboard,
        "p1",
    )
    .await
    .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.blob, StepResult::Removed(1));
    assert_eq!(report.cache, StepResult::Removed(1));
    assert_eq!(report.leaderboard, StepResult::Removed(1));
    assert!(!fx
        .store
        .objects
        .lock()
        .unwrap()
        .contains_key(&outcome.comic.image_key));
    assert!(fx.cache.rows.lock().unwrap().is_empty());
    assert!(fx.leaderboard.scores.lock().unwrap().is_empty());
}

#[tokio::test]
async fn takedown_of_unknown_place_reports_absent_everywhere() {
    let fx = fixture(None, 0);

    let report = remove_place(
        &fx.pipeline.cache,
        &fx.pipeline.artifacts,
        &fx.pipeline.leaderboard,
        "ghost",
    )
    .await
    .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.blob, StepResult::Absent);
    assert_eq!(report.cache, StepResult::Absent);
    assert_eq!(report.leaderboard, StepResult::Absent);
}

#[tokio::test]
async fn takedown_reports_partial_failure() {
    let mut fx = fixture(None, 0);
    fx.cache.seed(cached_comic("p1", Duration::days(3)));
    fx.pipeline.leaderboard = Arc::new(FailingLeaderboard);

    let report = remove_place(
        &fx.pipeline.cache,
        &fx.pipeline.artifacts,
        &fx.pipeline.leaderboard,
        "p1",
    )
    .await
    .unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.blob, StepResult::Removed(1));
    assert_eq!(report.cache, StepResult::Removed(1));
    assert_matches!(report.leaderboard, StepResult::Failed(_));
}
