//! Tick Loop
//!
//! Sample → step → publish → sleep, once per tick, on a single task. The
//! loop owns the engine, the input sampler and the register channel; nothing
//! else touches them. Quit (keyboard or shutdown future) is the only exit.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::RuntimeConfig;
use crate::core::hash::StateHash;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::{InputRecording, InputSampler, KeySource};
use crate::game::tick::GameEngine;
use crate::hw::channel::RegisterChannel;
use crate::hw::registers::{RegisterSnapshot, StatusFlags, STATUS};

/// What a single tick decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep ticking
    Continue,
    /// Quit key seen; the engine was not stepped
    Quit,
}

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// Quit key
    QuitKey,
    /// Shutdown future completed (SIGINT)
    Shutdown,
}

/// Totals reported when the loop exits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopSummary {
    /// Why the loop stopped
    pub reason: ExitReason,
    /// Engine ticks stepped
    pub ticks: u32,
    /// Score at exit
    pub score: u32,
    /// Score of the last finished run, if any
    pub final_score: Option<u32>,
    /// Publishes with at least one failed register write
    pub publish_failures: u64,
    /// Engine state hash at exit
    pub state_hash: StateHash,
}

/// The tick loop.
pub struct TickLoop<S, C> {
    engine: GameEngine,
    sampler: InputSampler<S>,
    channel: C,
    tick_duration: Duration,
    poll_timeout: Duration,
    recording: Option<InputRecording>,
    publish_failures: u64,
    failing_streak: u64,
}

impl<S: KeySource, C: RegisterChannel> TickLoop<S, C> {
    /// Assemble a loop around an engine in its initial state.
    ///
    /// Inputs are recorded only when `runtime.recording_path` is set.
    pub fn new(engine: GameEngine, source: S, channel: C, runtime: &RuntimeConfig) -> Self {
        let sampler = InputSampler::new(source, engine.config().keys);
        let recording = runtime
            .recording_path
            .as_ref()
            .map(|_| InputRecording::new(engine.state().rng_seed));
        Self {
            engine,
            sampler,
            channel,
            tick_duration: runtime.tick_duration(),
            poll_timeout: runtime.poll_timeout(),
            recording,
            publish_failures: 0,
            failing_streak: 0,
        }
    }

    /// Run one tick without waiting.
    pub fn tick_once(&mut self) -> TickOutcome {
        let frame = self.sampler.poll(self.poll_timeout);
        if frame.quit_pressed() {
            info!("Quit key pressed");
            return TickOutcome::Quit;
        }

        let result = self.engine.step(frame);
        let tick = self.engine.state().tick;
        if let Some(recording) = self.recording.as_mut() {
            recording.record(tick, frame);
        }

        for event in &result.events {
            log_event(event);
        }

        let snapshot = RegisterSnapshot::capture(self.engine.state(), self.engine.config());
        match self.channel.publish(&snapshot) {
            Ok(()) if self.failing_streak > 0 => {
                info!(
                    "Tick {}: register publish recovered after {} failed ticks",
                    tick, self.failing_streak
                );
                self.failing_streak = 0;
            }
            Ok(()) => {}
            Err(e) => {
                self.publish_failures += 1;
                self.failing_streak += 1;
                // One warning per outage
                if self.failing_streak == 1 {
                    warn!("Tick {}: register publish failed: {}", tick, e);
                } else {
                    debug!("Tick {}: register publish still failing: {}", tick, e);
                }
            }
        }

        trace!(
            "Tick {}: {:?} y={} v={} score={}",
            tick,
            result.status,
            self.engine.state().actor.y_px(),
            self.engine.state().actor.velocity,
            self.engine.score()
        );

        TickOutcome::Continue
    }

    /// Tick at the configured rate until quit or `shutdown` completes.
    ///
    /// Missed ticks are skipped, not burst.
    pub async fn run<F>(&mut self, shutdown: F) -> LoopSummary
    where
        F: Future,
    {
        let mut ticker = interval(self.tick_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!("Tick loop running at {:?} per tick", self.tick_duration);

        let reason = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.tick_once() == TickOutcome::Quit {
                        break ExitReason::QuitKey;
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break ExitReason::Shutdown;
                }
            }
        };

        self.finish(reason)
    }

    /// Leave the peripheral showing game over and report totals.
    pub fn finish(&mut self, reason: ExitReason) -> LoopSummary {
        if let Err(e) = self.channel.write_register(STATUS, StatusFlags::GAME_OVER.bits()) {
            warn!("Failed to write final status: {}", e);
        }

        let state = self.engine.state();
        let summary = LoopSummary {
            reason,
            ticks: state.tick,
            score: state.score,
            final_score: state.final_score,
            publish_failures: self.publish_failures,
            state_hash: self.engine.compute_hash(),
        };

        info!(
            "Loop exited ({:?}) after {} ticks, score {}, {} failed publishes",
            summary.reason, summary.ticks, summary.score, summary.publish_failures
        );
        info!("Final state hash: {}", hex::encode(summary.state_hash));
        summary
    }

    /// The engine.
    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// The register channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Mutable register channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Inputs recorded so far, if recording is enabled.
    pub fn recording(&self) -> Option<&InputRecording> {
        self.recording.as_ref()
    }

    /// Consecutive ticks whose publish has failed, zero once one succeeds.
    pub fn failing_streak(&self) -> u64 {
        self.failing_streak
    }
}

fn log_event(event: &GameEvent) {
    let message = match &event.data {
        GameEventData::Started => "run started".to_string(),
        GameEventData::Collided { kind, final_score } => {
            format!("game over ({:?}), final score {}", kind, final_score)
        }
        GameEventData::DifficultyRaised { level, speed, regapped } => {
            format!("difficulty {} (speed {}, obstacle {} re-gapped)", level, speed, regapped)
        }
        GameEventData::Reset => "reset".to_string(),
        GameEventData::ScoreWrapped { ceiling } => format!("score wrapped at {}", ceiling),
        GameEventData::ObstacleRecycled { index, gap_y } => {
            format!("obstacle {} respawned, gap at {}", index, gap_y)
        }
        GameEventData::Scored { score } => format!("score {}", score),
        GameEventData::Jumped { .. } => {
            trace!("Tick {}: jump", event.tick);
            return;
        }
    };

    if event.is_milestone() {
        info!("Tick {}: {}", event.tick, message);
    } else {
        debug!("Tick {}: {}", event.tick, message);
    }
}
