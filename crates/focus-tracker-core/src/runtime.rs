//! Real-time driver for a [`TimerEngine`].
//!
//! [`TimerRuntime`] owns one engine and at most one [`Ticker`]. Every
//! command that leaves the engine paused (pause, reset, mode switch,
//! completion, shutdown) cancels the ticker while holding the engine lock,
//! and every tick re-checks its token under that same lock, so a stale tick
//! can never decrement the countdown.
//!
//! On completion the runtime signals the [`Notifier`] and appends a
//! [`WorkSession`](crate::sessions::WorkSession) through the
//! [`SessionRepository`] on a separate task that [`TimerRuntime::shutdown`]
//! waits for. Engine events are broadcast to subscribers.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::notify::{CompletionSignal, Notifier};
use crate::sessions::SessionRepository;
use crate::storage::Settings;
use crate::timer::{DurationConfig, Mode, Ticker, TimerEngine, TimerState};

/// Broadcast channel capacity for timer events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct TimerRuntime {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<RuntimeState>,
    sessions: SessionRepository,
    settings: Settings,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<Event>,
    tick_period: Duration,
}

struct RuntimeState {
    engine: TimerEngine,
    ticker: Option<Ticker>,
    /// Completion handling (notify + record) still in flight.
    pending_writes: Vec<JoinHandle<()>>,
}

impl RuntimeState {
    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn track_write(&mut self, handle: JoinHandle<()>) {
        self.pending_writes.retain(|h| !h.is_finished());
        self.pending_writes.push(handle);
    }
}

impl TimerRuntime {
    /// Build a paused runtime in Focus mode using the persisted durations.
    pub fn new(
        sessions: SessionRepository,
        settings: Settings,
        notifier: Arc<dyn Notifier>,
        tick_period: Duration,
    ) -> Result<Self> {
        let durations = settings.get_durations()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RuntimeState {
                    engine: TimerEngine::new(durations),
                    ticker: None,
                    pending_writes: Vec::new(),
                }),
                sessions,
                settings,
                notifier,
                events,
                tick_period,
            }),
        })
    }

    /// Subscribe to every event the runtime produces, including completion
    /// and recording outcomes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    pub async fn state(&self) -> TimerState {
        self.inner.state.lock().await.engine.state()
    }

    pub async fn snapshot(&self) -> Event {
        self.inner.state.lock().await.engine.snapshot()
    }

    /// Start counting down. `None` when already running.
    pub async fn start(&self) -> Option<Event> {
        let mut state = self.inner.state.lock().await;
        let event = self.inner.start_locked(&mut state)?;
        self.inner.publish(&event);
        Some(event)
    }

    pub async fn pause(&self) -> Option<Event> {
        let mut state = self.inner.state.lock().await;
        state.stop_ticker();
        let event = state.engine.pause()?;
        self.inner.publish(&event);
        Some(event)
    }

    pub async fn toggle(&self) -> Option<Event> {
        let mut state = self.inner.state.lock().await;
        let event = if state.engine.is_running() {
            state.stop_ticker();
            state.engine.pause()
        } else {
            self.inner.start_locked(&mut state)
        }?;
        self.inner.publish(&event);
        Some(event)
    }

    pub async fn reset(&self) -> Event {
        let mut state = self.inner.state.lock().await;
        state.stop_ticker();
        let event = state.engine.reset();
        self.inner.publish(&event);
        event
    }

    /// Switch modes. A running countdown is discarded without a record.
    pub async fn switch_mode(&self, mode: Mode) -> Event {
        let mut state = self.inner.state.lock().await;
        state.stop_ticker();
        let event = state.engine.switch_mode(mode);
        self.inner.publish(&event);
        event
    }

    /// Persist new durations and apply them to the engine.
    ///
    /// # Errors
    /// Rejects zero durations; the engine is left untouched in that case.
    pub async fn set_durations(&self, durations: DurationConfig) -> Result<Event> {
        self.inner.settings.set_durations(durations)?;
        let mut state = self.inner.state.lock().await;
        let event = state.engine.apply_durations(durations);
        self.inner.publish(&event);
        Ok(event)
    }

    /// Pause, stop ticking and wait for any completed countdown to finish
    /// recording. Dropping the runtime stops the ticker but does not wait.
    pub async fn shutdown(&self) -> Option<Event> {
        let (event, pending) = {
            let mut state = self.inner.state.lock().await;
            state.stop_ticker();
            let event = state.engine.pause();
            if let Some(event) = &event {
                self.inner.publish(event);
            }
            (event, std::mem::take(&mut state.pending_writes))
        };
        for handle in pending {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "completion handling task failed");
            }
        }
        event
    }
}

impl Inner {
    fn publish(&self, event: &Event) {
        // No subscribers is fine.
        let _ = self.events.send(event.clone());
    }

    fn start_locked(self: &Arc<Self>, state: &mut RuntimeState) -> Option<Event> {
        let event = state.engine.start()?;
        state.stop_ticker();
        state.ticker = Some(self.spawn_ticker());
        Some(event)
    }

    fn spawn_ticker(self: &Arc<Self>) -> Ticker {
        let weak = Arc::downgrade(self);
        Ticker::spawn(self.tick_period, move |token| {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => inner.on_tick(&token).await,
                    None => ControlFlow::Break(()),
                }
            }
        })
    }

    async fn on_tick(self: &Arc<Self>, token: &CancellationToken) -> ControlFlow<()> {
        let mut state = self.state.lock().await;
        if token.is_cancelled() {
            return ControlFlow::Break(());
        }
        let Some(completed) = state.engine.tick() else {
            return ControlFlow::Continue(());
        };
        state.stop_ticker();
        self.publish(&completed);

        // Recorded on its own task so `shutdown` can wait for it.
        if let Event::SessionCompleted {
            mode,
            duration_secs,
            ..
        } = completed
        {
            let inner = Arc::clone(self);
            state.track_write(tokio::spawn(async move {
                inner.finish_countdown(mode, duration_secs).await;
            }));
        }
        ControlFlow::Break(())
    }

    async fn finish_countdown(&self, mode: Mode, duration_secs: u64) {
        self.notifier
            .notify(CompletionSignal::for_completion(mode, duration_secs));

        match self.sessions.record(mode, duration_secs).await {
            Ok(session) => self.publish(&Event::SessionRecorded { session }),
            Err(e) => {
                if matches!(e, CoreError::NotAuthenticated) {
                    tracing::warn!(%mode, "completed session not recorded: nobody is logged in");
                } else {
                    tracing::error!(%mode, error = %e, "failed to record completed session");
                }
                self.publish(&Event::SessionNotRecorded {
                    mode,
                    reason: e.to_string(),
                    at: Utc::now(),
                });
            }
        }
    }
}
