/*
 * @file events.rs
 * @brief Observable status and result stream
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

//! Observable status and result stream shared by both loops.

use serde::Serialize;
use tokio::sync::broadcast;

/// Default number of events a slow subscriber may lag behind.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Everything the calculator reports to the outside world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CalcEvent {
    /// The consumer loop is listening for utterances.
    RecognitionStarted,
    /// A confident hypothesis arrived and is about to be applied.
    UtteranceHeard { text: String },
    /// An utterance arrived while results were being ignored.
    UtteranceIgnored,
    /// The recognizer produced no confident hypothesis.
    UtteranceUnrecognized,
    /// The buffer after applying a recognized utterance.
    BufferUpdated { buffer: String },
    /// Applying an utterance failed; the loop exits or restarts next.
    ProcessingFailed { error: String },
    /// The supervisor will restart the consumer after `delay_ms`.
    RecognitionRestarting { attempt: u32, delay_ms: u64 },
    /// The consumer loop has terminated.
    RecognitionExited,
    /// Result of one microphone availability probe.
    MicrophoneStatus { available: bool },
}

/// Cloneable publisher handle over a tokio broadcast channel.
///
/// # Details
/// Publishing never blocks and never fails: with no subscribers the event
/// is dropped, and a subscriber that lags more than the channel capacity
/// sees `RecvError::Lagged` on its next receive.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<CalcEvent>,
}

impl EventBus {
    /// Creates a bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Opens a new subscription that sees every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CalcEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event to all current subscribers.
    pub fn publish(&self, event: CalcEvent) {
        log::trace!("event: {:?}", event);
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_receive_published_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(CalcEvent::RecognitionStarted);
        bus.publish(CalcEvent::BufferUpdated { buffer: "1".into() });
        assert_eq!(rx.try_recv().unwrap(), CalcEvent::RecognitionStarted);
        assert_eq!(
            rx.try_recv().unwrap(),
            CalcEvent::BufferUpdated { buffer: "1".into() }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new(1);
        bus.publish(CalcEvent::UtteranceIgnored);
    }

    #[test]
    fn events_serialize_with_a_tag() {
        let json = serde_json::to_string(&CalcEvent::MicrophoneStatus { available: false }).unwrap();
        assert_eq!(json, r#"{"event":"microphone_status","available":false}"#);
        let json = serde_json::to_string(&CalcEvent::RecognitionExited).unwrap();
        assert_eq!(json, r#"{"event":"recognition_exited"}"#);
    }
}
