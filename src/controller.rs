/*
 * @file controller.rs
 * @brief Recognition loop controller and its supervised consumer
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Recognition loop controller.
//!
//! Owns the start/stop/ignore state, the expression buffer, and the single
//! consumer task that pulls utterances from the recognizer.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::buffer::{BufferRules, ExpressionBuffer};
use crate::error::CalcResult;
use crate::events::{CalcEvent, EventBus};
use crate::recognizer::{Recognition, Recognizer};
use crate::token::map_utterance;

/// Lifecycle of the recognition consumer.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecognitionState {
    Idle = 0,
    Starting = 1,
    Listening = 2,
    /// The loop ended on its own: a processing failure or a closed recognizer.
    Exited = 3,
    /// The loop was asked to stop.
    Stopped = 4,
}

impl RecognitionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => RecognitionState::Starting,
            2 => RecognitionState::Listening,
            3 => RecognitionState::Exited,
            4 => RecognitionState::Stopped,
            _ => RecognitionState::Idle,
        }
    }
}

/// What the consumer does after a processing failure.
///
/// # Details
/// `Never` keeps the legacy behaviour: one bad evaluation ends recognition
/// until `start` is called again. The other policies restart the consumer
/// in place, keeping the buffer as it was before the failing utterance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum RestartPolicy {
    #[default]
    Never,
    Fixed {
        max_restarts: u32,
        #[serde(default)]
        delay_ms: u64,
    },
    Backoff {
        max_restarts: u32,
        initial_delay_ms: u64,
        max_delay_ms: u64,
    },
}

impl RestartPolicy {
    /// Delay before restart number `attempt` (1-based).
    ///
    /// # Returns
    /// * `Some(Duration)` - Restart after this delay.
    /// * `None` - The policy forbids or has exhausted restarts.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        match *self {
            RestartPolicy::Never => None,
            RestartPolicy::Fixed {
                max_restarts,
                delay_ms,
            } => (attempt <= max_restarts).then(|| Duration::from_millis(delay_ms)),
            RestartPolicy::Backoff {
                max_restarts,
                initial_delay_ms,
                max_delay_ms,
            } => {
                if attempt > max_restarts {
                    return None;
                }
                let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
                let delay = initial_delay_ms.saturating_mul(factor).min(max_delay_ms);
                Some(Duration::from_millis(delay))
            }
        }
    }
}

/// Settings for a [`RecognitionController`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    pub rules: BufferRules,
    pub restart: RestartPolicy,
}

/// State shared between the controller handle and its consumer task.
struct Shared {
    state: AtomicU8,
    ignore_results: AtomicBool,
    buffer: Mutex<ExpressionBuffer>,
    /// Empty while a consumer owns the recognizer.
    recognizer: Mutex<Option<Box<dyn Recognizer>>>,
    consumer: Mutex<Option<JoinHandle<()>>>,
    events: EventBus,
    options: ControllerOptions,
}

impl Shared {
    fn state(&self) -> RecognitionState {
        RecognitionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: RecognitionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn is_listening(&self) -> bool {
        self.state() == RecognitionState::Listening
    }
}

/// Drives the recognizer and applies what it hears to the buffer.
///
/// # Details
/// Cloning yields another handle onto the same controller. The buffer is
/// written only by the consumer task; [`buffer`](Self::buffer) returns a
/// snapshot.
#[derive(Clone)]
pub struct RecognitionController {
    shared: Arc<Shared>,
}

impl RecognitionController {
    pub fn new(recognizer: Box<dyn Recognizer>, events: EventBus, options: ControllerOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: AtomicU8::new(RecognitionState::Idle as u8),
                ignore_results: AtomicBool::new(false),
                buffer: Mutex::new(ExpressionBuffer::new()),
                recognizer: Mutex::new(Some(recognizer)),
                consumer: Mutex::new(None),
                events,
                options,
            }),
        }
    }

    /// Starts the consumer loop unless one is already running.
    ///
    /// # Details
    /// Clears the ignore flag, starts the recognizer with a fresh cache and
    /// spawns the consumer on the blocking pool. Must be called from within
    /// a Tokio runtime. Starting again after `Exited` or `Stopped` is
    /// allowed once the previous consumer has handed the recognizer back,
    /// which it does after publishing `RecognitionExited`; call
    /// [`wait`](Self::wait) first to be sure.
    ///
    /// # Returns
    /// * `Ok(true)` - A new consumer is listening.
    /// * `Ok(false)` - Nothing was started (already running, or the previous
    ///   consumer is still blocked inside the recognizer).
    ///
    /// # Errors
    /// [`CalcError::RecognizerUnavailable`](crate::error::CalcError::RecognizerUnavailable)
    /// when the recognizer fails to start.
    pub fn start(&self) -> CalcResult<bool> {
        let current = self.shared.state();
        if matches!(current, RecognitionState::Starting | RecognitionState::Listening)
            || self
                .shared
                .state
                .compare_exchange(
                    current as u8,
                    RecognitionState::Starting as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_err()
        {
            log::info!("Speech recognition thread already running");
            return Ok(false);
        }

        let Some(mut recognizer) = lock(&self.shared.recognizer).take() else {
            log::warn!("Previous speech thread has not released the recognizer yet");
            self.shared.set_state(current);
            return Ok(false);
        };

        self.shared.ignore_results.store(false, Ordering::Release);
        if let Err(err) = recognizer.start(true) {
            log::error!("Failed to start speech recognition: {}", err);
            *lock(&self.shared.recognizer) = Some(recognizer);
            self.shared.set_state(RecognitionState::Exited);
            return Err(err);
        }

        self.shared.set_state(RecognitionState::Listening);
        log::info!("You can start to speak...");
        self.shared.events.publish(CalcEvent::RecognitionStarted);

        let shared = Arc::clone(&self.shared);
        let handle = tokio::task::spawn_blocking(move || consume(shared, recognizer));
        *lock(&self.shared.consumer) = Some(handle);
        Ok(true)
    }

    /// Asks the consumer to stop.
    ///
    /// # Details
    /// Takes effect immediately between utterances. A consumer blocked in
    /// the recognizer stops once the pending wait returns; the utterance it
    /// returns is discarded.
    ///
    /// # Returns
    /// `true` if a running consumer was told to stop.
    pub fn stop(&self) -> bool {
        let stopped = self
            .shared
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                match RecognitionState::from_u8(raw) {
                    RecognitionState::Starting | RecognitionState::Listening => {
                        Some(RecognitionState::Stopped as u8)
                    }
                    _ => None,
                }
            })
            .is_ok();
        if stopped {
            log::info!("Stopping speech recognition");
        }
        stopped
    }

    /// Toggles discarding of recognition results, from the next utterance on.
    pub fn set_ignore(&self, ignore: bool) {
        self.shared.ignore_results.store(ignore, Ordering::Release);
    }

    pub fn is_ignoring(&self) -> bool {
        self.shared.ignore_results.load(Ordering::Acquire)
    }

    pub fn state(&self) -> RecognitionState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_listening()
    }

    /// Snapshot of the expression buffer.
    pub fn buffer(&self) -> String {
        lock(&self.shared.buffer).as_str().to_string()
    }

    /// Waits for the current consumer, if any, to finish.
    pub async fn wait(&self) {
        let handle = lock(&self.shared.consumer).take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                log::error!("Speech thread panicked: {}", err);
            }
        }
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Body of the consumer task: listen, and supervise restarts on failure.
fn consume(shared: Arc<Shared>, mut recognizer: Box<dyn Recognizer>) {
    let mut attempt = 0;
    while let Err(err) = listen(&shared, recognizer.as_mut()) {
        log::warn!("Speech processing failed: {}", err);
        shared.events.publish(CalcEvent::ProcessingFailed {
            error: err.to_string(),
        });

        attempt += 1;
        let Some(delay) = shared.options.restart.delay_for(attempt) else {
            break;
        };
        if !shared.is_listening() {
            break;
        }
        log::info!("Restarting speech recognition in {:?} (attempt {})", delay, attempt);
        shared.events.publish(CalcEvent::RecognitionRestarting {
            attempt,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        });
        std::thread::sleep(delay);
        if !shared.is_listening() {
            break;
        }
        if let Err(err) = recognizer.start(true) {
            log::error!("Failed to restart speech recognition: {}", err);
            break;
        }
        shared.events.publish(CalcEvent::RecognitionStarted);
    }

    recognizer.stop();
    // No other consumer can exist until the recognizer is handed back, so
    // the state and the exit event must be settled before that.
    let _ = shared.state.compare_exchange(
        RecognitionState::Listening as u8,
        RecognitionState::Exited as u8,
        Ordering::AcqRel,
        Ordering::Acquire,
    );
    log::info!("Speech thread has exited");
    shared.events.publish(CalcEvent::RecognitionExited);
    *lock(&shared.recognizer) = Some(recognizer);
}

/// Pulls utterances until stopped, closed, or a processing failure.
fn listen(shared: &Shared, recognizer: &mut dyn Recognizer) -> CalcResult<()> {
    while shared.is_listening() {
        let recognition = recognizer.next_utterance();
        if !shared.is_listening() {
            break;
        }
        match recognition {
            Recognition::Closed => {
                log::info!("Recognizer closed");
                break;
            }
            _ if shared.ignore_results.load(Ordering::Acquire) => {
                log::info!("Ignoring speech recognition results");
                shared.events.publish(CalcEvent::UtteranceIgnored);
            }
            Recognition::Unrecognized => {
                log::info!("I can't understand what you said.");
                shared.events.publish(CalcEvent::UtteranceUnrecognized);
            }
            Recognition::Hypothesis(text) => {
                log::info!("You said: [{}]", text);
                shared.events.publish(CalcEvent::UtteranceHeard { text: text.clone() });
                process(shared, &text)?;
            }
        }
    }
    Ok(())
}

/// Maps one hypothesis and applies it to the buffer.
fn process(shared: &Shared, text: &str) -> CalcResult<()> {
    let Some(token) = map_utterance(text) else {
        log::debug!("'{}' is not in the vocabulary", text);
        return Ok(());
    };
    let snapshot = {
        let mut buffer = lock(&shared.buffer);
        buffer.apply(token, &shared.options.rules)?;
        buffer.as_str().to_string()
    };
    log::info!("{}", snapshot);
    shared.events.publish(CalcEvent::BufferUpdated { buffer: snapshot });
    Ok(())
}
