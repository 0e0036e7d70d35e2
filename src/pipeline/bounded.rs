//! Time-bounded collaborator calls.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::content::{score_content, ContentAnalysis, ContentContext, ContentStrategy};
use crate::error::ScoreError;
use crate::pipeline::traits::{Embedder, SpeechFrontend, TextChecker};
use crate::types::{AudioClip, RawAcoustics, TextIssue};

/// Runs `job` on a worker thread and waits at most `timeout` for it. Without
/// a timeout the job runs inline.
///
/// A job that overruns keeps running detached; its result is dropped.
pub fn run_bounded<T, F>(stage: &'static str, timeout: Option<Duration>, job: F) -> Result<T, ScoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ScoreError> + Send + 'static,
{
    let Some(budget) = timeout else {
        return job();
    };
    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name(format!("rubric-{}", stage.replace(' ', "-")))
        .spawn(move || {
            let _ = tx.send(job());
        })
        .map_err(|e| ScoreError::collaborator(stage, e))?;

    match rx.recv_timeout(budget) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            let timeout_ms = budget.as_millis() as u64;
            tracing::warn!(stage, timeout_ms, "collaborator call exceeded its budget");
            Err(ScoreError::timeout(stage, timeout_ms))
        }
        Err(RecvTimeoutError::Disconnected) => Err(ScoreError::collaborator(
            stage,
            "worker exited without a result",
        )),
    }
}

/// Scores content with every embedder call it makes sharing one budget.
pub(crate) fn content(
    embedder: &Arc<dyn Embedder>,
    reference: &str,
    response: &str,
    strategy: &ContentStrategy,
    key_phrases: &[String],
    timeout: Option<Duration>,
) -> Result<ContentAnalysis, ScoreError> {
    let embedder = Arc::clone(embedder);
    let reference = reference.to_string();
    let response = response.to_string();
    let strategy = strategy.clone();
    let key_phrases = key_phrases.to_vec();
    run_bounded("content scoring", timeout, move || {
        let context = ContentContext {
            embedder: &*embedder,
            key_phrases: &key_phrases,
        };
        score_content(&reference, &response, &strategy, &context)
    })
}

pub(crate) fn check_text(
    checker: &Arc<dyn TextChecker>,
    text: &str,
    timeout: Option<Duration>,
) -> Result<Vec<TextIssue>, ScoreError> {
    let checker = Arc::clone(checker);
    let text = text.to_string();
    run_bounded("text checker", timeout, move || checker.check(&text))
}

pub(crate) fn transcribe(
    frontend: &Arc<dyn SpeechFrontend>,
    clip: &AudioClip,
    timeout: Option<Duration>,
) -> Result<(String, RawAcoustics), ScoreError> {
    let frontend = Arc::clone(frontend);
    let clip = clip.clone();
    run_bounded("speech frontend", timeout, move || {
        let transcript = frontend.transcribe(&clip)?;
        let raw = frontend.extract_features(&clip)?;
        Ok((transcript, raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_without_timeout() {
        let result = run_bounded("test", None, || Ok(41 + 1));
        assert_eq!(result.ok(), Some(42));
    }

    #[test]
    fn fast_job_finishes_within_budget() {
        let result = run_bounded("test", Some(Duration::from_secs(5)), || Ok("done"));
        assert_eq!(result.ok(), Some("done"));
    }

    #[test]
    fn slow_job_times_out() {
        let result: Result<(), _> = run_bounded("slow stage", Some(Duration::from_millis(20)), || {
            thread::sleep(Duration::from_millis(500));
            Ok(())
        });
        assert!(matches!(
            result,
            Err(ScoreError::Timeout {
                stage: "slow stage",
                timeout_ms: 20
            })
        ));
    }

    struct SleepyEmbedder;

    impl Embedder for SleepyEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, ScoreError> {
            thread::sleep(Duration::from_millis(80));
            Ok(vec![1.0])
        }
    }

    #[test]
    fn content_calls_share_one_budget() {
        let embedder: Arc<dyn Embedder> = Arc::new(SleepyEmbedder);
        let strategy = ContentStrategy::CoverageBlend {
            key_terms: 5,
            coverage_weight: 0.5,
            similarity_weight: 0.5,
        };
        // two embeddings at 80 ms each overrun a 100 ms budget that either
        // call alone would fit in
        let result = content(
            &embedder,
            "Rivers fed the first cities.",
            "Early towns grew beside rivers.",
            &strategy,
            &[],
            Some(Duration::from_millis(100)),
        );
        assert!(matches!(
            result,
            Err(ScoreError::Timeout {
                stage: "content scoring",
                timeout_ms: 100
            })
        ));

        let unbounded = content(
            &embedder,
            "Rivers fed the first cities.",
            "Early towns grew beside rivers.",
            &strategy,
            &[],
            None,
        );
        assert!(unbounded.is_ok());
    }

    #[test]
    fn job_errors_pass_through() {
        let result: Result<(), _> = run_bounded("test", Some(Duration::from_secs(5)), || {
            Err(ScoreError::collaborator("embedder", "offline"))
        });
        assert!(matches!(result, Err(ScoreError::Collaborator { .. })));
    }
}
