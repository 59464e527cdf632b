//! Retry loop that turns a subject into an accepted clue ladder.
//!
//! Each attempt builds a request from the subject, the role plan and the
//! guidance accumulated so far, waits at most `request_timeout` for the
//! generator, then parses and validates the reply. Rejections narrow the
//! guidance for the next attempt. The loop ends on the first accepted
//! ladder, on a configuration error, or when the attempt budget is spent.

use cluecard_core::error::GenerationError;
use cluecard_core::textgen::TextGenerator;
use tracing::{debug, info, warn};

use super::fallback::cycle_to_length;
use super::guidance::DraftState;
use super::parse::{clamp_words, parse_clues};
use super::prompt::build_request;
use crate::config::{EngineConfig, ExhaustionPolicy};
use crate::domain::ladder::ClueLadder;
use crate::domain::subject::Subject;

/// Drives a [`TextGenerator`] until it produces a ladder that passes the
/// leak detector and the style checker.
pub struct LadderOrchestrator<'a> {
    generator: &'a dyn TextGenerator,
    config: &'a EngineConfig,
}

impl<'a> LadderOrchestrator<'a> {
    /// Creates an orchestrator over `generator` using `config`.
    #[must_use]
    pub fn new(generator: &'a dyn TextGenerator, config: &'a EngineConfig) -> Self {
        Self { generator, config }
    }

    /// Produces exactly `ladder_length` validated clues for `subject`.
    ///
    /// `fallback_offset` picks where in the fallback pool to start when the
    /// exhaustion policy is `Fallback`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Configuration` as soon as the generator
    /// reports missing credentials, and `GenerationError::Exhausted` when
    /// every attempt was rejected and no fallback ladder could be served.
    pub async fn generate_ladder(
        &self,
        subject: &Subject,
        ladder_length: usize,
        fallback_offset: u32,
    ) -> Result<ClueLadder, GenerationError> {
        if ladder_length == 0 {
            return Ok(ClueLadder::generated(Vec::new(), 0));
        }

        let settings = &self.config.generation;
        let mut state = DraftState::new(settings.max_attempts);

        while let Some(attempt) = state.begin_attempt() {
            if attempt > 1 && !settings.backoff().is_zero() {
                tokio::time::sleep(settings.backoff()).await;
            }

            let request = build_request(subject, ladder_length, self.config, state.guidance());
            debug!(
                attempt,
                guidance = state.guidance().len(),
                "requesting clue ladder"
            );

            let call = self.generator.generate(&request);
            let raw = match tokio::time::timeout(settings.request_timeout(), call).await {
                Ok(Ok(raw)) => raw,
                Ok(Err(err)) if !err.is_retryable() => return Err(err),
                Ok(Err(err)) => {
                    warn!(attempt, error = %err, "generation attempt failed");
                    continue;
                }
                Err(_) => {
                    warn!(
                        attempt,
                        timeout_ms = settings.request_timeout_ms,
                        "generation attempt timed out"
                    );
                    continue;
                }
            };
            state.record_output(&raw);

            let clues = match parse_clues(&raw, ladder_length) {
                Ok(clues) => clues,
                Err(err) => {
                    warn!(attempt, error = %err, "discarding malformed ladder");
                    continue;
                }
            };
            let clues: Vec<String> = clues
                .iter()
                .map(|clue| clamp_words(clue, settings.max_words_per_clue))
                .collect();

            let review = self.config.rules.review_ladder(subject, &clues);
            if review.is_accepted() {
                info!(attempt, ladder_length, "clue ladder accepted");
                return Ok(ClueLadder::generated(clues, attempt));
            }

            state.absorb(&review);
            warn!(
                attempt,
                leaking_slots = ?review.leaking_slots,
                style_slots = ?review.style_slots,
                rejection = ?state.last_rejection(),
                "clue ladder rejected"
            );
        }

        match settings.on_exhaustion {
            ExhaustionPolicy::Fail => {
                warn!(attempts = state.attempts_made(), "clue generation exhausted");
                Err(state.into_exhausted())
            }
            ExhaustionPolicy::Fallback => {
                self.fallback_ladder(subject, ladder_length, fallback_offset, state)
            }
        }
    }

    fn fallback_ladder(
        &self,
        subject: &Subject,
        ladder_length: usize,
        offset: u32,
        state: DraftState,
    ) -> Result<ClueLadder, GenerationError> {
        let max_words = self.config.generation.max_words_per_clue;
        let usable: Vec<String> = self
            .config
            .fallback
            .clues_for(subject.kind)
            .iter()
            .map(|clue| clamp_words(clue, max_words))
            .filter(|clue| self.config.rules.check(subject, clue).is_accepted())
            .collect();

        let offset = usize::try_from(offset).unwrap_or(0);
        match cycle_to_length(&usable, ladder_length, offset) {
            Some(clues) => {
                warn!(
                    attempts = state.attempts_made(),
                    ladder_length, "generation exhausted, serving fallback clue ladder"
                );
                Ok(ClueLadder::fallback(clues, state.attempts_made()))
            }
            None => {
                warn!(
                    attempts = state.attempts_made(),
                    "no usable fallback clues for subject"
                );
                Err(state.into_exhausted())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tracing::Level;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry;

    use super::*;
    use crate::config::GenerationSettings;
    use crate::domain::ladder::LadderSource;
    use crate::domain::subject::SubjectKind;
    use crate::generation::fallback::FallbackPool;
    use crate::generation::guidance::GuidanceOverride;
    use cluecard_test_support::{ScriptedReply, ScriptedTextGenerator};

    const GOOD: [&str; 3] = [
        "You will want the lights off and a blanket for this one.",
        "Most of it happens somewhere you could never visit yourself.",
        "The lead spends a lot of time questioning what is real.",
    ];

    const LEAKY: [&str; 3] = [
        "You will want the lights off and a blanket for this one.",
        "Most of it happens somewhere you could never visit yourself.",
        "Everyone remembers the matrix and its green falling code.",
    ];

    const STYLELESS: [&str; 3] = [
        "Dark.",
        "Most of it happens somewhere you could never visit yourself.",
        "The lead spends a lot of time questioning what is real.",
    ];

    fn config() -> EngineConfig {
        EngineConfig {
            generation: GenerationSettings {
                backoff_ms: 0,
                ..GenerationSettings::default()
            },
            ..EngineConfig::default()
        }
    }

    fn fallback_config() -> EngineConfig {
        let mut config = config();
        config.generation.on_exhaustion = ExhaustionPolicy::Fallback;
        config
    }

    fn subject() -> Subject {
        Subject::new(SubjectKind::Movie, "The Matrix")
    }

    #[tokio::test]
    async fn test_accepts_first_valid_ladder() {
        // Arrange
        let generator = ScriptedTextGenerator::repeating(ScriptedReply::clues(&GOOD));
        let config = config();
        let orchestrator = LadderOrchestrator::new(&generator, &config);

        // Act
        let ladder = orchestrator.generate_ladder(&subject(), 3, 0).await.unwrap();

        // Assert
        assert_eq!(ladder.clues, GOOD.map(str::to_owned).to_vec());
        assert_eq!(ladder.source, LadderSource::Generated { attempts: 1 });
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_tolerates_prose_around_json() {
        let body = format!(
            "Here are your clues!\n{}\nEnjoy the game.",
            serde_json::json!({ "clues": GOOD })
        );
        let generator = ScriptedTextGenerator::repeating(ScriptedReply::Text(body));
        let config = config();

        let ladder = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await
            .unwrap();

        assert_eq!(ladder.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_retried_without_new_guidance() {
        let generator = ScriptedTextGenerator::new(vec![
            ScriptedReply::Text("not json at all".to_owned()),
            ScriptedReply::clues(&GOOD[..2]),
            ScriptedReply::clues(&GOOD),
        ]);
        let config = config();

        let ladder = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await
            .unwrap();

        assert_eq!(ladder.source, LadderSource::Generated { attempts: 3 });
        let requests = generator.requests();
        assert_eq!(requests[0].user, requests[2].user);
        assert!(!requests[2].user.contains("Extra guidance"));
    }

    #[tokio::test]
    async fn test_rejections_accumulate_guidance() {
        // Arrange
        let generator = ScriptedTextGenerator::new(vec![
            ScriptedReply::clues(&LEAKY),
            ScriptedReply::clues(&STYLELESS),
            ScriptedReply::clues(&GOOD),
        ]);
        let config = config();

        // Act
        let ladder = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await
            .unwrap();

        // Assert
        assert_eq!(ladder.source, LadderSource::Generated { attempts: 3 });
        let requests = generator.requests();
        let avoid = GuidanceOverride::AvoidProperNouns.instruction();
        let simplify = GuidanceOverride::SimplifyVocabulary.instruction();
        assert!(!requests[0].user.contains(avoid));
        assert!(requests[1].user.contains(avoid));
        assert!(!requests[1].user.contains(simplify));
        assert!(requests[2].user.contains(avoid));
        assert!(requests[2].user.contains(simplify));
    }

    #[tokio::test]
    async fn test_always_leaking_exhausts_after_max_attempts() {
        let generator = ScriptedTextGenerator::repeating(ScriptedReply::clues(&LEAKY));
        let config = config();

        let result = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await;

        match result {
            Err(GenerationError::Exhausted {
                attempts,
                last_output,
            }) => {
                assert_eq!(attempts, 7);
                assert!(last_output.unwrap().contains("matrix"));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(generator.calls(), 7);
    }

    #[tokio::test]
    async fn test_fallback_policy_serves_pool_after_exhaustion() {
        // Arrange
        let generator = ScriptedTextGenerator::repeating(ScriptedReply::clues(&LEAKY));
        let config = fallback_config();

        // Act
        let ladder = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 5, 3)
            .await
            .unwrap();

        // Assert
        assert_eq!(ladder.len(), 5);
        assert_eq!(ladder.source, LadderSource::Fallback { attempts: 7 });
        assert_eq!(ladder.clues[0], FallbackPool::default().movie[3]);
        assert!(config.rules.review_ladder(&subject(), &ladder.clues).is_accepted());
    }

    #[tokio::test]
    async fn test_fallback_skips_pool_entries_that_leak() {
        let generator = ScriptedTextGenerator::repeating(ScriptedReply::Text(String::new()));
        let mut config = fallback_config();
        config.generation.max_attempts = 1;
        config.fallback.movie = vec![
            "The matrix of feelings here is hard to explain.".to_owned(),
            "Picture who you would most want sitting next to you.".to_owned(),
        ];

        let ladder = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await
            .unwrap();

        assert!(ladder.clues.iter().all(|c| c.starts_with("Picture")));
    }

    #[tokio::test]
    async fn test_fallback_with_no_usable_clues_is_exhausted() {
        let generator = ScriptedTextGenerator::repeating(ScriptedReply::Text(String::new()));
        let mut config = fallback_config();
        config.generation.max_attempts = 2;
        config.fallback.movie = Vec::new();

        let result = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await;

        assert!(matches!(
            result,
            Err(GenerationError::Exhausted { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_configuration_error_stops_immediately() {
        let generator = ScriptedTextGenerator::repeating(ScriptedReply::Fail(
            GenerationError::Configuration("no credentials".to_owned()),
        ));
        let config = fallback_config();

        let result = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await;

        assert!(matches!(result, Err(GenerationError::Configuration(_))));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_retried() {
        let generator = ScriptedTextGenerator::new(vec![
            ScriptedReply::Fail(GenerationError::Transport("503".to_owned())),
            ScriptedReply::clues(&GOOD),
        ]);
        let config = config();

        let ladder = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await
            .unwrap();

        assert_eq!(ladder.source, LadderSource::Generated { attempts: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_attempt_times_out_and_is_retried() {
        let generator = ScriptedTextGenerator::new(vec![
            ScriptedReply::Hang(Duration::from_secs(600)),
            ScriptedReply::clues(&GOOD),
        ]);
        let config = config();

        let ladder = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await
            .unwrap();

        assert_eq!(ladder.source, LadderSource::Generated { attempts: 2 });
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_long_clues_are_clamped_before_validation() {
        let long = "You will want the lights off and a blanket and snacks and a friend and a lot of patience for this";
        let generator = ScriptedTextGenerator::repeating(ScriptedReply::clues(&[long, GOOD[1], GOOD[2]]));
        let mut config = config();
        config.generation.max_words_per_clue = 8;

        let ladder = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await
            .unwrap();

        assert_eq!(ladder.clues[0].split_whitespace().count(), 8);
    }

    #[tokio::test]
    async fn test_zero_length_ladder_needs_no_generation() {
        let generator = ScriptedTextGenerator::repeating(ScriptedReply::clues(&GOOD));
        let config = config();

        let ladder = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 0, 0)
            .await
            .unwrap();

        assert!(ladder.is_empty());
        assert_eq!(generator.calls(), 0);
    }

    /// Collects `(level, fields)` for every event emitted while installed.
    #[derive(Clone, Default)]
    struct CapturedEvents(Arc<Mutex<Vec<(Level, String)>>>);

    impl CapturedEvents {
        fn at(&self, level: Level) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, fields)| fields.clone())
                .collect()
        }
    }

    struct FieldText(String);

    impl Visit for FieldText {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.push_str(&format!("{}={value:?} ", field.name()));
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for CapturedEvents {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = FieldText(String::new());
            event.record(&mut fields);
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), fields.0));
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_rejections_and_fallback_are_logged_as_warnings() {
        // Arrange
        let captured = CapturedEvents::default();
        let _guard = tracing::subscriber::set_default(registry().with(captured.clone()));
        let generator = ScriptedTextGenerator::repeating(ScriptedReply::clues(&LEAKY));
        let config = fallback_config();

        // Act
        let ladder = LadderOrchestrator::new(&generator, &config)
            .generate_ladder(&subject(), 3, 0)
            .await
            .unwrap();

        // Assert
        assert_eq!(ladder.source, LadderSource::Fallback { attempts: 7 });
        let warnings = captured.at(Level::WARN);
        let rejections: Vec<_> = warnings
            .iter()
            .filter(|w| w.contains("clue ladder rejected"))
            .collect();
        assert_eq!(rejections.len(), 7);
        assert!(
            rejections
                .iter()
                .all(|w| w.contains("rejection=Some(LeakRejected { slot: 3 })"))
        );
        assert!(
            warnings
                .iter()
                .any(|w| w.contains("serving fallback clue ladder"))
        );
        assert!(
            captured
                .at(Level::INFO)
                .iter()
                .all(|i| !i.contains("fallback"))
        );
    }
}
