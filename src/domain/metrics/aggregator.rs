//! Process-wide running metrics.
//!
//! Each aggregate sits behind its own mutex so an update is applied as a
//! single step with respect to other updates of the same aggregate. `reset`
//! and `snapshot` take all three locks in a fixed order (llm, rag,
//! conversation), so they never see or produce a half-updated mix. Updates
//! hold one lock at a time and cannot deadlock against them.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::snapshot::{ConversationStats, LlmCallStats, MetricsSnapshot, RagQueryStats};
use crate::domain::conversation::{Language, Phase};

/// Running statistics over completion calls, retrieval, and turns.
///
/// Constructed explicitly and shared via `Arc`; there is no global instance.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    llm_calls: Mutex<LlmCallStats>,
    rag_queries: Mutex<RagQueryStats>,
    conversation: Mutex<ConversationStats>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one hosted completion call.
    pub fn record_llm_call(&self, duration_ms: u64, success: bool) {
        let mut stats = lock(&self.llm_calls);
        if success {
            stats.success += 1;
        } else {
            stats.failed += 1;
        }
        stats.total_time_ms += duration_ms;
        stats.average_time_ms = stats.total_time_ms as f64 / stats.total_calls() as f64;

        tracing::debug!(
            duration_ms,
            status = if success { "success" } else { "failed" },
            average_time_ms = stats.average_time_ms,
            "LLM call metrics"
        );
    }

    /// Records one retrieval query by its best score.
    pub fn record_rag_query(&self, max_score: f32, matched: bool) {
        let mut stats = lock(&self.rag_queries);
        stats.total += 1;
        if !matched {
            stats.no_matches += 1;
        }
        let n = stats.total as f64;
        stats.average_similarity =
            (stats.average_similarity * (n - 1.0) + f64::from(max_score)) / n;

        tracing::debug!(
            similarity = max_score,
            found_match = matched,
            no_match_rate = stats.no_match_rate(),
            "RAG query metrics"
        );
    }

    /// Records the outcome of one conversation turn.
    pub fn record_conversation(&self, phase: Phase, success: bool, language: Language) {
        let mut stats = lock(&self.conversation);
        let phase_stats = match phase {
            Phase::Collecting => &mut stats.collection_phase,
            Phase::Answering => &mut stats.qa_phase,
        };
        if success {
            phase_stats.success += 1;
        } else {
            phase_stats.failed += 1;
        }
        match language {
            Language::He => stats.language_stats.he += 1,
            Language::En => stats.language_stats.en += 1,
        }

        tracing::debug!(
            phase = %phase,
            status = if success { "success" } else { "failed" },
            language = %language,
            "Conversation metrics"
        );
    }

    /// Zeroes all three aggregates in one step.
    pub fn reset(&self) {
        let mut llm = lock(&self.llm_calls);
        let mut rag = lock(&self.rag_queries);
        let mut conversation = lock(&self.conversation);
        *llm = LlmCallStats::default();
        *rag = RagQueryStats::default();
        *conversation = ConversationStats::default();
    }

    /// Copies all three aggregates at one instant.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let llm = lock(&self.llm_calls);
        let rag = lock(&self.rag_queries);
        let conversation = lock(&self.conversation);
        MetricsSnapshot {
            llm_calls: llm.clone(),
            rag_queries: rag.clone(),
            conversation: conversation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    const EPS: f64 = 1e-9;

    mod llm_calls {
        use super::*;

        #[test]
        fn tracks_counts_and_average() {
            let metrics = MetricsAggregator::new();
            metrics.record_llm_call(100, true);
            metrics.record_llm_call(300, false);

            let stats = metrics.snapshot().llm_calls;
            assert_eq!(stats.success, 1);
            assert_eq!(stats.failed, 1);
            assert_eq!(stats.total_time_ms, 400);
            assert!((stats.average_time_ms - 200.0).abs() < EPS);
        }
    }

    mod rag_queries {
        use super::*;

        #[test]
        fn counts_no_matches() {
            let metrics = MetricsAggregator::new();
            metrics.record_rag_query(0.9, true);
            metrics.record_rag_query(0.2, false);

            let stats = metrics.snapshot().rag_queries;
            assert_eq!(stats.total, 2);
            assert_eq!(stats.no_matches, 1);
        }

        #[test]
        fn incremental_mean_matches_direct_mean() {
            let scores = [0.91f32, 0.42, 0.77, 0.13, 0.68, 0.99, 0.5];
            let metrics = MetricsAggregator::new();
            for s in scores {
                metrics.record_rag_query(s, s >= 0.7);
            }

            let direct: f64 =
                scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64;
            let running = metrics.snapshot().rag_queries.average_similarity;
            assert!((running - direct).abs() < 1e-6);
        }

        #[test]
        fn repeated_value_keeps_mean_fixed() {
            let metrics = MetricsAggregator::new();
            for _ in 0..50 {
                metrics.record_rag_query(0.75, true);
            }
            let once = MetricsAggregator::new();
            once.record_rag_query(0.75, true);

            let repeated = metrics.snapshot().rag_queries.average_similarity;
            let single = once.snapshot().rag_queries.average_similarity;
            assert!((repeated - single).abs() < 1e-6);
        }
    }

    mod conversation {
        use super::*;

        #[test]
        fn tracks_phase_and_language() {
            let metrics = MetricsAggregator::new();
            metrics.record_conversation(Phase::Collecting, true, Language::He);
            metrics.record_conversation(Phase::Answering, false, Language::En);
            metrics.record_conversation(Phase::Answering, true, Language::En);

            let stats = metrics.snapshot().conversation;
            assert_eq!(stats.collection_phase.success, 1);
            assert_eq!(stats.collection_phase.failed, 0);
            assert_eq!(stats.qa_phase.success, 1);
            assert_eq!(stats.qa_phase.failed, 1);
            assert_eq!(stats.language_stats.he, 1);
            assert_eq!(stats.language_stats.en, 2);
        }
    }

    mod reset {
        use super::*;

        #[test]
        fn reset_then_snapshot_is_all_zero() {
            let metrics = MetricsAggregator::new();
            for i in 0..100 {
                metrics.record_llm_call(i, i % 3 != 0);
                metrics.record_rag_query(0.5, i % 2 == 0);
                metrics.record_conversation(Phase::Answering, true, Language::He);
            }

            metrics.reset();

            assert!(metrics.snapshot().is_zero());
        }

        #[test]
        fn snapshot_is_detached_from_live_state() {
            let metrics = MetricsAggregator::new();
            metrics.record_llm_call(10, true);
            let before = metrics.snapshot();

            metrics.record_llm_call(10, true);

            assert_eq!(before.llm_calls.success, 1);
            assert_eq!(metrics.snapshot().llm_calls.success, 2);
        }
    }

    mod concurrency {
        use super::*;

        #[test]
        fn concurrent_updates_are_not_lost() {
            let metrics = Arc::new(MetricsAggregator::new());
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let metrics = Arc::clone(&metrics);
                    thread::spawn(move || {
                        for _ in 0..500 {
                            metrics.record_llm_call(2, true);
                            metrics.record_rag_query(1.0, true);
                            metrics.record_conversation(Phase::Collecting, true, Language::En);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let snapshot = metrics.snapshot();
            assert_eq!(snapshot.llm_calls.success, 4000);
            assert_eq!(snapshot.llm_calls.total_time_ms, 8000);
            assert_eq!(snapshot.rag_queries.total, 4000);
            assert!((snapshot.rag_queries.average_similarity - 1.0).abs() < 1e-6);
            assert_eq!(snapshot.conversation.collection_phase.success, 4000);
            assert_eq!(snapshot.conversation.language_stats.en, 4000);
        }

        fn assert_consistent(snapshot: &MetricsSnapshot) {
            let llm = &snapshot.llm_calls;
            assert_eq!(llm.total_time_ms, 3 * llm.total_calls());
            if llm.total_calls() == 0 {
                assert_eq!(llm.average_time_ms, 0.0);
            } else {
                assert!((llm.average_time_ms - 3.0).abs() < EPS);
            }

            let rag = &snapshot.rag_queries;
            assert!(rag.no_matches <= rag.total);
            if rag.total == 0 {
                assert_eq!(rag.average_similarity, 0.0);
            } else {
                assert!((rag.average_similarity - 0.5).abs() < 1e-6);
            }

            let conversation = &snapshot.conversation;
            let turns = conversation.collection_phase.success + conversation.collection_phase.failed;
            let by_language = conversation.language_stats.he + conversation.language_stats.en;
            assert_eq!(turns, by_language);
        }

        #[test]
        fn reset_interleaved_with_updates_never_mixes_state() {
            let metrics = Arc::new(MetricsAggregator::new());
            let writers_done = Arc::new(AtomicBool::new(false));

            let writers: Vec<_> = (0..4)
                .map(|i| {
                    let metrics = Arc::clone(&metrics);
                    thread::spawn(move || {
                        for n in 0..2000 {
                            let even = (n + i) % 2 == 0;
                            metrics.record_llm_call(3, even);
                            metrics.record_rag_query(0.5, even);
                            let language = if even { Language::He } else { Language::En };
                            metrics.record_conversation(Phase::Collecting, even, language);
                        }
                    })
                })
                .collect();

            let resetter = {
                let metrics = Arc::clone(&metrics);
                let writers_done = Arc::clone(&writers_done);
                thread::spawn(move || {
                    let mut snapshots = 0;
                    loop {
                        metrics.reset();
                        assert_consistent(&metrics.snapshot());
                        snapshots += 1;
                        if writers_done.load(Ordering::Acquire) {
                            break snapshots;
                        }
                    }
                })
            };

            for writer in writers {
                writer.join().unwrap();
            }
            writers_done.store(true, Ordering::Release);
            assert!(resetter.join().unwrap() > 0);

            assert_consistent(&metrics.snapshot());
            metrics.reset();
            assert!(metrics.snapshot().is_zero());
        }
    }
}
