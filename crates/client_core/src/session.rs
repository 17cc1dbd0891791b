//! Reading wizard state: question -> spread -> cards -> drawing -> result.
//!
//! The controller is the only writer of [`ReadingSession`]. Observers follow
//! it through [`SessionController::subscribe`]; every transition publishes a
//! fresh [`SessionSnapshot`].

use std::{sync::Arc, time::Duration};

use rand::{rngs::StdRng, RngCore, SeedableRng};
use shared::domain::{Card, ReadingResult, SpreadId, SpreadInfo, SpreadRecommendation};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{config::ClientSettings, draw, error::ClientError, fallback, TarotApi};

pub const DEFAULT_DRAW_TIMEOUT: Duration = Duration::from_secs(30);
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingStep {
    #[default]
    Question,
    Spread,
    Cards,
    Drawing,
    Result,
}

impl ReadingStep {
    /// Number of segments in the wizard's progress indicator.
    pub const PROGRESS_SEGMENTS: usize = 4;

    /// 1-based progress segment. Drawing shares the cards segment.
    pub fn progress(self) -> usize {
        match self {
            Self::Question => 1,
            Self::Spread => 2,
            Self::Cards | Self::Drawing => 3,
            Self::Result => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadingSession {
    pub question: String,
    pub spread_id: Option<SpreadId>,
    pub drawn_cards: Vec<Card>,
    pub result: Option<ReadingResult>,
    pub step: ReadingStep,
    /// Advisory message from the last failed backend call. Never blocks
    /// progression.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub session: ReadingSession,
    pub spreads: Vec<SpreadInfo>,
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn selected_spread(&self) -> Option<&SpreadInfo> {
        let spread_id = self.session.spread_id.as_ref()?;
        self.spreads.iter().find(|spread| &spread.id == spread_id)
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged(SessionSnapshot),
    /// The reading request failed and a local result was substituted.
    DrawFellBack { generation: u64, reason: String },
    /// A reading response arrived after the session it belonged to was reset.
    StaleResponseDiscarded { generation: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("question must not be blank")]
    BlankQuestion,
    #[error("spread {0} is not in the loaded spread list")]
    UnknownSpread(SpreadId),
    #[error("cannot {action} at step {step:?}")]
    InvalidTransition {
        action: &'static str,
        step: ReadingStep,
    },
    #[error("a draw is already in progress")]
    DrawInProgress,
    #[error("session was reset before the draw completed")]
    Superseded,
    #[error("draw task ended without a result")]
    DrawAborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadSource {
    Backend,
    BuiltIn,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub draw_timeout: Duration,
    pub save_readings: bool,
    /// Fixed seed for the placeholder draw. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            draw_timeout: DEFAULT_DRAW_TIMEOUT,
            save_readings: true,
            seed: None,
        }
    }
}

impl SessionOptions {
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            draw_timeout: settings.draw_timeout(),
            save_readings: settings.save_readings,
            seed: None,
        }
    }
}

struct ControllerState {
    generation: u64,
    session: ReadingSession,
    spreads: Vec<SpreadInfo>,
    pending_draw: Option<u64>,
    rng: Box<dyn RngCore + Send>,
}

impl ControllerState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            session: self.session.clone(),
            spreads: self.spreads.clone(),
            loading: self.pending_draw == Some(self.generation),
        }
    }
}

pub struct SessionController {
    api: Arc<dyn TarotApi>,
    draw_timeout: Duration,
    save_readings: bool,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(api: Arc<dyn TarotApi>) -> Arc<Self> {
        Self::new_with_options(api, SessionOptions::default())
    }

    pub fn new_with_options(api: Arc<dyn TarotApi>, options: SessionOptions) -> Arc<Self> {
        let rng: Box<dyn RngCore + Send> = match options.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            draw_timeout: options.draw_timeout,
            save_readings: options.save_readings,
            inner: Mutex::new(ControllerState {
                generation: 0,
                session: ReadingSession::default(),
                spreads: Vec::new(),
                pending_draw: None,
                rng,
            }),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn is_loading(&self) -> bool {
        let guard = self.inner.lock().await;
        guard.pending_draw == Some(guard.generation)
    }

    fn publish(&self, state: &ControllerState) {
        let _ = self
            .events
            .send(SessionEvent::StateChanged(state.snapshot()));
    }

    /// Fetches the spread list, substituting the built-in set when the
    /// backend fails or returns nothing.
    pub async fn load_spreads(&self) -> (Vec<SpreadInfo>, SpreadSource) {
        let (spreads, source) = match self.api.list_spreads().await.map(drop_empty_spreads) {
            Ok(spreads) if !spreads.is_empty() => (spreads, SpreadSource::Backend),
            Ok(_) => {
                warn!("session: backend returned no usable spreads; using built-in set");
                (fallback::builtin_spreads(), SpreadSource::BuiltIn)
            }
            Err(err) => {
                warn!(error = %err, "session: failed to load spreads; using built-in set");
                (fallback::builtin_spreads(), SpreadSource::BuiltIn)
            }
        };

        let mut guard = self.inner.lock().await;
        guard.spreads = spreads.clone();
        self.publish(&guard);
        info!(count = spreads.len(), source = ?source, "session: spreads loaded");
        (spreads, source)
    }

    pub async fn submit_question(&self, text: &str) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().await;
        if guard.session.step != ReadingStep::Question {
            return Err(SessionError::InvalidTransition {
                action: "submit a question",
                step: guard.session.step,
            });
        }
        let question = text.trim();
        if question.is_empty() {
            return Err(SessionError::BlankQuestion);
        }

        guard.session.question = question.to_string();
        guard.session.step = ReadingStep::Spread;
        debug!(generation = guard.generation, "session: question accepted");
        self.publish(&guard);
        Ok(())
    }

    pub async fn select_spread(&self, spread_id: &SpreadId) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().await;
        if guard.session.step != ReadingStep::Spread {
            return Err(SessionError::InvalidTransition {
                action: "select a spread",
                step: guard.session.step,
            });
        }
        if !guard.spreads.iter().any(|spread| &spread.id == spread_id) {
            return Err(SessionError::UnknownSpread(spread_id.clone()));
        }

        guard.session.spread_id = Some(spread_id.clone());
        guard.session.step = ReadingStep::Cards;
        debug!(generation = guard.generation, spread = %spread_id, "session: spread selected");
        self.publish(&guard);
        Ok(())
    }

    /// Draws placeholder cards immediately, then asks the backend for the
    /// real reading. Once the draw starts the session always ends at
    /// [`ReadingStep::Result`]: any backend failure or timeout is replaced
    /// by a local fallback result that still reports `success: true`. That
    /// soft success is a product decision; the failure is kept in
    /// `session.error` and logged.
    ///
    /// The request runs on its own task, so dropping the returned future
    /// does not strand the session in [`ReadingStep::Drawing`].
    ///
    /// Returns [`SessionError::Superseded`] if the session was reset while
    /// the request was outstanding; the late response is then dropped.
    pub async fn start_draw(self: &Arc<Self>) -> Result<ReadingResult, SessionError> {
        let (generation, question, spread) = {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;
            if state.pending_draw == Some(state.generation) {
                return Err(SessionError::DrawInProgress);
            }
            if state.session.step != ReadingStep::Cards {
                return Err(SessionError::InvalidTransition {
                    action: "start a draw",
                    step: state.session.step,
                });
            }
            let spread_id = state.session.spread_id.clone().ok_or(
                SessionError::InvalidTransition {
                    action: "start a draw",
                    step: state.session.step,
                },
            )?;
            let spread = state
                .spreads
                .iter()
                .find(|spread| spread.id == spread_id)
                .cloned()
                .ok_or(SessionError::UnknownSpread(spread_id))?;

            state.session.drawn_cards = draw::placeholder_draw(&mut state.rng, spread.card_count);
            state.session.error = None;
            state.session.step = ReadingStep::Drawing;
            state.pending_draw = Some(state.generation);
            self.publish(state);
            (state.generation, state.session.question.clone(), spread)
        };

        info!(
            generation,
            spread = %spread.id,
            card_count = spread.card_count,
            "session: draw started"
        );

        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            controller.finish_draw(generation, question, spread).await
        });
        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(generation, error = %err, "session: draw task failed");
                Err(SessionError::DrawAborted)
            }
        }
    }

    async fn finish_draw(
        &self,
        generation: u64,
        question: String,
        spread: SpreadInfo,
    ) -> Result<ReadingResult, SessionError> {
        let outcome = match tokio::time::timeout(
            self.draw_timeout,
            self.api
                .create_reading(&question, &spread.id, self.save_readings),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(ClientError::Timeout(self.draw_timeout)),
        };

        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        if state.generation != generation {
            warn!(
                generation,
                current_generation = state.generation,
                "session: discarding reading response for a reset session"
            );
            let _ = self
                .events
                .send(SessionEvent::StaleResponseDiscarded { generation });
            return Err(SessionError::Superseded);
        }

        state.pending_draw = None;
        let result = match outcome {
            Ok(result) => {
                if !result.drawn_cards.is_empty() {
                    state.session.drawn_cards = result.drawn_cards.clone();
                }
                info!(generation, fallback_mode = result.fallback_mode, "session: reading received");
                result
            }
            Err(err) => {
                let reason = err.to_string();
                warn!(
                    generation,
                    kind = ?err.kind(),
                    error = %reason,
                    "session: reading request failed; showing fallback result"
                );
                state.session.error = Some(reason.clone());
                let _ = self
                    .events
                    .send(SessionEvent::DrawFellBack { generation, reason });
                fallback::fallback_result(&question, &spread, &state.session.drawn_cards)
            }
        };

        state.session.result = Some(result.clone());
        state.session.step = ReadingStep::Result;
        self.publish(state);
        Ok(result)
    }

    /// Discards the current session from any step. A draw still in flight
    /// for the old session will not touch the new one.
    pub async fn reset(&self) {
        let mut guard = self.inner.lock().await;
        guard.generation += 1;
        guard.session = ReadingSession::default();
        guard.pending_draw = None;
        debug!(generation = guard.generation, "session: reset");
        self.publish(&guard);
    }

    /// Suggests a spread for the current question, falling back to the local
    /// heuristic when the backend cannot answer.
    pub async fn recommend_spread(&self) -> Result<SpreadRecommendation, SessionError> {
        let question = self.inner.lock().await.session.question.clone();
        if question.trim().is_empty() {
            return Err(SessionError::BlankQuestion);
        }

        match self.api.recommend_spread(&question).await {
            Ok(recommendation) => Ok(recommendation),
            Err(err) => {
                warn!(error = %err, "session: recommendation failed; using local heuristic");
                Ok(fallback::recommend_locally(&question))
            }
        }
    }
}

/// Spreads without cards cannot be drawn.
fn drop_empty_spreads(spreads: Vec<SpreadInfo>) -> Vec<SpreadInfo> {
    spreads
        .into_iter()
        .filter(|spread| {
            if spread.card_count == 0 {
                warn!(spread = %spread.id, "session: ignoring spread with no cards");
            }
            spread.card_count > 0
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
