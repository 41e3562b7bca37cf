// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-pass FAQ matcher.
//!
//! A query is embedded once and compared against both the question vectors
//! and the response vectors of the seeded collection. Question hits come
//! first, then response hits whose question was not already returned.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use faqchat_config::model::FaqConfig;
use faqchat_core::traits::{EmbeddingAdapter, VectorStoreAdapter};
use faqchat_core::types::{EmbeddingInput, FaqRecord, FaqResult, ScoredRecord, VectorField};
use faqchat_core::FaqchatError;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::seed::{load_seed_file, SeedEntry};

/// Outcome of seeding the FAQ collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// True if records were written by this matcher.
    pub created: bool,
    /// Records in the collection once seeding finished.
    pub records: usize,
}

/// Lifecycle of the one-time seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedState {
    Empty,
    Seeding,
    Ready,
}

/// Semantic FAQ lookup over a vector store.
pub struct FaqMatcher {
    store: Arc<dyn VectorStoreAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    config: FaqConfig,
    /// Ensures the collection is seeded only once even with concurrent callers.
    seeded: OnceCell<SeedReport>,
    seeding: AtomicBool,
    /// Set once this matcher created the collection, so a retry after a
    /// failed seed rewrites it instead of skipping it.
    owns_collection: AtomicBool,
}

impl FaqMatcher {
    pub fn new(
        store: Arc<dyn VectorStoreAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: FaqConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
            seeded: OnceCell::new(),
            seeding: AtomicBool::new(false),
            owns_collection: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SeedState {
        if self.seeded.initialized() {
            SeedState::Ready
        } else if self.seeding.load(Ordering::SeqCst) {
            SeedState::Seeding
        } else {
            SeedState::Empty
        }
    }

    /// Seeds the collection from the seed file unless this matcher already did.
    ///
    /// A failed attempt leaves the matcher `Empty`, so the next call retries.
    pub async fn ensure_seeded(&self) -> Result<SeedReport, FaqchatError> {
        let report = self
            .seeded
            .get_or_try_init(|| async {
                self.seeding.store(true, Ordering::SeqCst);
                let result = self.seed().await;
                self.seeding.store(false, Ordering::SeqCst);
                result
            })
            .await?;
        Ok(*report)
    }

    async fn seed(&self) -> Result<SeedReport, FaqchatError> {
        let collection = self.config.collection.as_str();

        // The seed file is only read when records are about to be written.
        let entries = if self.store.collection_exists(collection).await? {
            if !self.config.reseed_on_start && !self.owns_collection.load(Ordering::SeqCst) {
                let records = self.store.count(collection).await?;
                info!(collection, records, "FAQ collection already exists, skipping seed");
                return Ok(SeedReport {
                    created: false,
                    records,
                });
            }
            info!(collection, "re-seeding existing FAQ collection");
            self.load_entries().await?
        } else {
            let entries = self.load_entries().await?;
            self.store.create_collection(collection).await?;
            self.owns_collection.store(true, Ordering::SeqCst);
            entries
        };

        let total = entries.len();
        stream::iter(entries.into_iter().enumerate())
            .map(|(index, entry)| self.seed_entry(index as u64 + 1, entry))
            .buffer_unordered(self.config.seed_concurrency.max(1))
            .try_collect::<Vec<()>>()
            .await?;

        let records = self.store.count(collection).await?;
        info!(collection, entries = total, records, "FAQ collection seeded");
        Ok(SeedReport {
            created: true,
            records,
        })
    }

    async fn load_entries(&self) -> Result<Vec<SeedEntry>, FaqchatError> {
        load_seed_file(Path::new(&self.config.seed_path)).await
    }

    async fn seed_entry(&self, id: u64, entry: SeedEntry) -> Result<(), FaqchatError> {
        let (question_embedding, response_embedding) =
            tokio::try_join!(self.embed_one(&entry.question), self.embed_one(&entry.response))?;

        self.store
            .upsert(
                &self.config.collection,
                FaqRecord {
                    id,
                    question: entry.question,
                    response: entry.response,
                    question_embedding,
                    response_embedding,
                },
            )
            .await
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, FaqchatError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| FaqchatError::Embedding {
                message: "embedding returned no vectors".to_string(),
                source: None,
            })
    }

    /// Finds FAQ entries relevant to `question`.
    ///
    /// Blank input returns no matches without seeding or embedding. Zero
    /// matches is not an error.
    pub async fn find_faq(&self, question: &str) -> Result<Vec<FaqResult>, FaqchatError> {
        if question.trim().is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_seeded().await?;
        let vector = self.embed_one(question).await?;
        let collection = self.config.collection.as_str();

        let (by_question, by_response) = tokio::try_join!(
            self.store.search(
                collection,
                VectorField::Question,
                &vector,
                self.config.question_top,
                0
            ),
            self.store.search(
                collection,
                VectorField::Response,
                &vector,
                self.config.response_top,
                0
            ),
        )?;

        let results = merge_matches(
            &by_question,
            &by_response,
            self.config.question_threshold,
            self.config.response_threshold,
        );
        info!(matches = results.len(), "FAQ lookup finished");
        Ok(results)
    }
}

/// Merges question-vector hits and response-vector hits.
///
/// Keeps question hits scoring strictly above `question_threshold`, then
/// response hits strictly above `response_threshold`, each in the order given.
/// A question already kept is never repeated.
pub fn merge_matches(
    by_question: &[ScoredRecord],
    by_response: &[ScoredRecord],
    question_threshold: f32,
    response_threshold: f32,
) -> Vec<FaqResult> {
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    let passes = [
        (VectorField::Question, by_question, question_threshold),
        (VectorField::Response, by_response, response_threshold),
    ];
    for (pass, hits, threshold) in passes {
        for hit in hits.iter().filter(|h| h.score > threshold) {
            if seen.insert(hit.record.question.as_str()) {
                debug!(%pass, score = hit.score, question = %hit.record.question, "FAQ match");
                results.push(FaqResult::from(&hit.record));
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryVectorStore;
    use faqchat_test_utils::MockEmbedder;
    use proptest::prelude::*;
    use std::time::Duration;
    use tracing_test::traced_test;

    const QUERY: &str = "how do refunds work?";

    /// Unit vectors at exact cosine distances from `[1, 0, 0, 0]`.
    fn at(similarity: u8) -> Vec<f32> {
        match similarity {
            1 => vec![1.0, 9.0, 3.0, 3.0],
            2 => vec![2.0, 4.0, 4.0, 8.0],
            3 => vec![3.0, 9.0, 3.0, 1.0],
            4 => vec![4.0, 8.0, 4.0, 2.0],
            6 => vec![6.0, 8.0, 0.0, 0.0],
            9 => vec![9.0, 3.0, 3.0, 1.0],
            _ => unreachable!("no fixture for {similarity}"),
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<InMemoryVectorStore>,
        embedder: MockEmbedder,
        matcher: FaqMatcher,
    }

    /// Builds a matcher over seed entries `(question, q-sim, response, r-sim)`.
    fn fixture(entries: &[(&str, u8, &str, u8)], tweak: impl FnOnce(&mut FaqConfig)) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let seed_path = dir.path().join("faq.json");
        let json: Vec<serde_json::Value> = entries
            .iter()
            .map(|(q, _, r, _)| serde_json::json!({"question": q, "response": r}))
            .collect();
        std::fs::write(&seed_path, serde_json::to_string(&json).unwrap()).unwrap();

        let mut embedder = MockEmbedder::new(4).with_vector(QUERY, vec![1.0, 0.0, 0.0, 0.0]);
        for (q, qs, r, rs) in entries {
            embedder = embedder.with_vector(*q, at(*qs)).with_vector(*r, at(*rs));
        }

        let mut config = FaqConfig {
            seed_path: seed_path.display().to_string(),
            ..FaqConfig::default()
        };
        tweak(&mut config);

        let store = Arc::new(InMemoryVectorStore::new(config.embedding_dim));
        let matcher = FaqMatcher::new(store.clone(), Arc::new(embedder.clone()), config);
        Fixture {
            _dir: dir,
            store,
            embedder,
            matcher,
        }
    }

    fn scored(question: &str, score: f32) -> ScoredRecord {
        ScoredRecord {
            record: FaqRecord {
                id: 0,
                question: question.to_string(),
                response: format!("answer to {question}"),
                question_embedding: vec![],
                response_embedding: vec![],
            },
            score,
        }
    }

    #[tokio::test]
    async fn blank_question_touches_nothing() {
        let f = fixture(&[("Refunds?", 9, "Within 30 days.", 2)], |_| {});

        assert!(f.matcher.find_faq("").await.unwrap().is_empty());
        assert!(f.matcher.find_faq("   \t").await.unwrap().is_empty());
        assert_eq!(f.embedder.calls(), 0);
        assert_eq!(f.matcher.state(), SeedState::Empty);
        assert!(!f.store.collection_exists("faq").await.unwrap());
    }

    #[tokio::test]
    async fn strong_question_match_is_returned_once() {
        let f = fixture(&[("Refunds?", 9, "Within 30 days.", 2)], |_| {});

        let results = f.matcher.find_faq(QUERY).await.unwrap();
        assert_eq!(
            results,
            vec![FaqResult {
                question: "Refunds?".into(),
                response: "Within 30 days.".into()
            }]
        );
    }

    #[tokio::test]
    async fn threshold_question_score_falls_through_to_response_pass() {
        let entries = [("Refunds?", 3, "Within 30 days.", 6)];
        let f = fixture(&entries, |_| {});
        let results = f.matcher.find_faq(QUERY).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].question, "Refunds?");

        // Raising the response threshold past 0.6 removes it, so the match
        // came from the response pass.
        let strict = fixture(&entries, |c| c.response_threshold = 0.7);
        assert!(strict.matcher.find_faq(QUERY).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn weak_scores_return_nothing() {
        let f = fixture(&[("Refunds?", 1, "Within 30 days.", 4)], |_| {});
        assert!(f.matcher.find_faq(QUERY).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_matching_both_passes_appears_once() {
        let f = fixture(
            &[
                ("Refunds?", 9, "Within 30 days.", 9),
                ("Shipping?", 1, "Refund shipping is free.", 6),
            ],
            |_| {},
        );

        let results = f.matcher.find_faq(QUERY).await.unwrap();
        let questions: Vec<&str> = results.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["Refunds?", "Shipping?"]);
    }

    #[tokio::test]
    async fn question_top_limits_first_pass() {
        let f = fixture(
            &[
                ("A?", 9, "a", 1),
                ("B?", 9, "b", 1),
                ("C?", 6, "c", 1),
            ],
            |c| c.question_top = 2,
        );

        let results = f.matcher.find_faq(QUERY).await.unwrap();
        let questions: Vec<&str> = results.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["A?", "B?"]);
    }

    #[tokio::test]
    async fn seeding_creates_one_record_per_entry() {
        let f = fixture(
            &[("A?", 9, "a", 1), ("B?", 6, "b", 2), ("C?", 3, "c", 4)],
            |_| {},
        );

        let report = f.matcher.ensure_seeded().await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                created: true,
                records: 3
            }
        );
        assert_eq!(f.matcher.state(), SeedState::Ready);

        let records = f.store.records("faq").await.unwrap();
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(records
            .iter()
            .all(|r| r.question_embedding.len() == 4 && r.response_embedding.len() == 4));
        assert_eq!(records[1].question_embedding, at(6));
        assert_eq!(records[1].response_embedding, at(2));
        assert_eq!(f.embedder.texts_embedded(), 6);
    }

    #[tokio::test]
    async fn existing_collection_is_not_written() {
        let f = fixture(&[("A?", 9, "a", 1)], |_| {});
        f.store.create_collection("faq").await.unwrap();

        let report = f.matcher.ensure_seeded().await.unwrap();
        assert!(!report.created);
        assert_eq!(report.records, 0);
        assert_eq!(f.store.count("faq").await.unwrap(), 0);
        assert_eq!(f.embedder.calls(), 0);
    }

    #[tokio::test]
    async fn existing_collection_does_not_need_seed_file() {
        let f = fixture(&[], |c| c.seed_path = "/nonexistent/faq.json".into());
        f.store.create_collection("faq").await.unwrap();

        let report = f.matcher.ensure_seeded().await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                created: false,
                records: 0
            }
        );
        assert_eq!(f.matcher.state(), SeedState::Ready);
    }

    #[tokio::test]
    async fn missing_seed_file_creates_no_collection() {
        let f = fixture(&[], |c| c.seed_path = "/nonexistent/faq.json".into());

        let err = f.matcher.ensure_seeded().await.unwrap_err();
        assert!(matches!(err, FaqchatError::SeedData { .. }));
        assert!(!f.store.collection_exists("faq").await.unwrap());
    }

    #[tokio::test]
    async fn reseed_still_requires_seed_file() {
        let f = fixture(&[], |c| {
            c.seed_path = "/nonexistent/faq.json".into();
            c.reseed_on_start = true;
        });
        f.store.create_collection("faq").await.unwrap();

        let err = f.matcher.ensure_seeded().await.unwrap_err();
        assert!(matches!(err, FaqchatError::SeedData { .. }));
        assert_eq!(f.matcher.state(), SeedState::Empty);
    }

    #[tokio::test]
    async fn reseed_on_start_rewrites_existing_collection() {
        let f = fixture(&[("A?", 9, "a", 1), ("B?", 6, "b", 1)], |c| {
            c.reseed_on_start = true
        });
        f.store.create_collection("faq").await.unwrap();

        let report = f.matcher.ensure_seeded().await.unwrap();
        assert!(report.created);
        assert_eq!(report.records, 2);
    }

    #[tokio::test]
    async fn seeding_happens_once() {
        let f = fixture(&[("A?", 9, "a", 1), ("B?", 6, "b", 1)], |_| {});

        f.matcher.ensure_seeded().await.unwrap();
        f.matcher.find_faq(QUERY).await.unwrap();
        f.matcher.find_faq(QUERY).await.unwrap();

        // Four seed embeddings plus one per lookup.
        assert_eq!(f.embedder.texts_embedded(), 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_seed_once() {
        let dir = tempfile::tempdir().unwrap();
        let seed_path = dir.path().join("faq.json");
        std::fs::write(
            &seed_path,
            r#"[{"question": "A?", "response": "a"}, {"question": "B?", "response": "b"}]"#,
        )
        .unwrap();
        let embedder = MockEmbedder::new(4).with_delay(Duration::from_millis(20));
        let config = FaqConfig {
            seed_path: seed_path.display().to_string(),
            ..FaqConfig::default()
        };
        let matcher = Arc::new(FaqMatcher::new(
            Arc::new(InMemoryVectorStore::new(0)),
            Arc::new(embedder.clone()),
            config,
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let matcher = matcher.clone();
                tokio::spawn(async move { matcher.ensure_seeded().await })
            })
            .collect();
        for handle in handles {
            let report = handle.await.unwrap().unwrap();
            assert_eq!(report.records, 2);
        }

        assert_eq!(embedder.texts_embedded(), 4);
    }

    #[tokio::test]
    async fn failed_seed_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let seed_path = dir.path().join("faq.json");
        let config = FaqConfig {
            seed_path: seed_path.display().to_string(),
            ..FaqConfig::default()
        };
        let matcher = FaqMatcher::new(
            Arc::new(InMemoryVectorStore::new(0)),
            Arc::new(MockEmbedder::new(4)),
            config,
        );

        let err = matcher.ensure_seeded().await.unwrap_err();
        assert!(matches!(err, FaqchatError::SeedData { .. }));
        assert_eq!(matcher.state(), SeedState::Empty);

        std::fs::write(&seed_path, r#"[{"question": "A?", "response": "a"}]"#).unwrap();
        let report = matcher.ensure_seeded().await.unwrap();
        assert_eq!(report.records, 1);
        assert_eq!(matcher.state(), SeedState::Ready);
    }

    #[tokio::test]
    async fn embedding_failure_aborts_seeding() {
        let dir = tempfile::tempdir().unwrap();
        let seed_path = dir.path().join("faq.json");
        std::fs::write(
            &seed_path,
            r#"[{"question": "A?", "response": "a"}, {"question": "B?", "response": "boom"}]"#,
        )
        .unwrap();
        let config = FaqConfig {
            seed_path: seed_path.display().to_string(),
            ..FaqConfig::default()
        };
        let matcher = FaqMatcher::new(
            Arc::new(InMemoryVectorStore::new(0)),
            Arc::new(MockEmbedder::new(4).failing_on("boom")),
            config,
        );

        let err = matcher.find_faq(QUERY).await.unwrap_err();
        assert!(matches!(err, FaqchatError::Embedding { .. }));
        assert_eq!(matcher.state(), SeedState::Empty);

        // The half-written collection is rewritten on the next attempt.
        std::fs::write(
            &seed_path,
            r#"[{"question": "A?", "response": "a"}, {"question": "B?", "response": "b"}]"#,
        )
        .unwrap();
        let report = matcher.ensure_seeded().await.unwrap();
        assert!(report.created);
        assert_eq!(report.records, 2);
    }

    #[tokio::test]
    #[traced_test]
    async fn matches_are_logged_with_pass() {
        let f = fixture(&[("Refunds?", 3, "Within 30 days.", 6)], |_| {});
        f.matcher.find_faq(QUERY).await.unwrap();
        assert!(logs_contain("pass=response"));
        assert!(logs_contain("FAQ lookup finished"));
    }

    #[test]
    fn merge_keeps_question_pass_first() {
        let results = merge_matches(
            &[scored("q1", 0.8), scored("q2", 0.2)],
            &[scored("q3", 0.9), scored("q1", 0.95), scored("q4", 0.5)],
            0.3,
            0.5,
        );
        let questions: Vec<&str> = results.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["q1", "q3"]);
    }

    proptest! {
        #[test]
        fn merged_questions_are_unique(
            first in prop::collection::vec((0u8..6, 0.0f32..1.0), 0..8),
            second in prop::collection::vec((0u8..6, 0.0f32..1.0), 0..8),
            qt in 0.0f32..1.0,
            rt in 0.0f32..1.0,
        ) {
            let to_hits = |hits: &[(u8, f32)]| -> Vec<ScoredRecord> {
                hits.iter().map(|(q, s)| scored(&format!("q{q}"), *s)).collect()
            };
            let results = merge_matches(&to_hits(&first), &to_hits(&second), qt, rt);

            let unique: HashSet<&str> = results.iter().map(|r| r.question.as_str()).collect();
            prop_assert_eq!(unique.len(), results.len());

            for r in &results {
                let kept = |hits: &[(u8, f32)], threshold: f32| {
                    hits.iter()
                        .any(|(q, s)| format!("q{q}") == r.question && *s > threshold)
                };
                let in_first = kept(first.as_slice(), qt);
                let in_second = kept(second.as_slice(), rt);
                prop_assert!(in_first || in_second);
            }
        }
    }
}
