/*
 * @file recognizer.rs
 * @brief Speech recognizer seam and in-process recognizers
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

//! Speech recognizer seam.
//!
//! The acoustic recognizer itself lives outside this crate; anything that can
//! hand over one hypothesis at a time implements [`Recognizer`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc;

use crate::error::{CalcError, CalcResult};

/// Outcome of one blocking wait on the recognizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recognition {
    /// A confident hypothesis.
    Hypothesis(String),
    /// Speech was heard but no hypothesis was confident enough.
    Unrecognized,
    /// The recognizer will produce nothing more.
    Closed,
}

/// Producer of recognized utterances.
///
/// # Details
/// `next_utterance` is the only blocking call in the calculator. It carries
/// no timeout and no cancellation: stopping the consumer while it waits
/// takes effect once this call returns.
pub trait Recognizer: Send {
    /// Starts (or restarts) recognition.
    ///
    /// # Arguments
    /// * `clear_cache` - Discard audio buffered before this call.
    ///
    /// # Errors
    /// [`CalcError::RecognizerUnavailable`] when recognition cannot begin.
    fn start(&mut self, clear_cache: bool) -> CalcResult<()>;

    /// Blocks until the next hypothesis is available.
    fn next_utterance(&mut self) -> Recognition;

    /// Stops recognition. The default does nothing.
    fn stop(&mut self) {}
}

/// Recognizer fed through an in-process channel.
///
/// Each message is one hypothesis, `None` meaning unrecognized speech.
/// Dropping every [`UtteranceSender`] closes the recognizer.
pub struct ChannelRecognizer {
    receiver: mpsc::Receiver<Option<String>>,
    queued: bool,
}

/// Sending half of a [`ChannelRecognizer`].
#[derive(Clone)]
pub struct UtteranceSender {
    sender: mpsc::Sender<Option<String>>,
}

impl ChannelRecognizer {
    /// Creates a connected sender/recognizer pair.
    pub fn new() -> (UtteranceSender, Self) {
        let (sender, receiver) = mpsc::channel();
        (
            UtteranceSender { sender },
            Self {
                receiver,
                queued: true,
            },
        )
    }

    /// Keeps hypotheses sent before `start` instead of discarding them.
    pub fn keep_queued(mut self, keep: bool) -> Self {
        self.queued = keep;
        self
    }
}

impl UtteranceSender {
    /// Queues a confident hypothesis.
    ///
    /// # Returns
    /// `false` once the recognizer has been dropped.
    pub fn say(&self, text: &str) -> bool {
        self.sender.send(Some(text.to_string())).is_ok()
    }

    /// Queues an unrecognized-speech outcome.
    pub fn mumble(&self) -> bool {
        self.sender.send(None).is_ok()
    }
}

impl Recognizer for ChannelRecognizer {
    fn start(&mut self, clear_cache: bool) -> CalcResult<()> {
        if clear_cache && !self.queued {
            while self.receiver.try_recv().is_ok() {}
        }
        Ok(())
    }

    fn next_utterance(&mut self) -> Recognition {
        match self.receiver.recv() {
            Ok(Some(text)) => Recognition::Hypothesis(text),
            Ok(None) => Recognition::Unrecognized,
            Err(_) => Recognition::Closed,
        }
    }
}

/// Recognizer that reads one hypothesis per line.
///
/// # Details
/// Used for typed input on stdin and for replaying recorded sessions. A
/// blank line stands for unrecognized speech; end of input closes it.
pub struct LineRecognizer<R> {
    reader: R,
    stopped: bool,
}

impl<R: BufRead + Send> LineRecognizer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            stopped: false,
        }
    }
}

impl LineRecognizer<BufReader<File>> {
    /// Opens a script file of utterances.
    ///
    /// # Errors
    /// [`CalcError::RecognizerUnavailable`] when the file cannot be opened.
    pub fn from_path(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            CalcError::RecognizerUnavailable(format!("{}: {}", path.display(), err))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead + Send> Recognizer for LineRecognizer<R> {
    fn start(&mut self, _clear_cache: bool) -> CalcResult<()> {
        self.stopped = false;
        Ok(())
    }

    fn next_utterance(&mut self) -> Recognition {
        if self.stopped {
            return Recognition::Closed;
        }
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Recognition::Closed,
            Ok(_) => match line.trim() {
                "" => Recognition::Unrecognized,
                text => Recognition::Hypothesis(text.to_string()),
            },
            Err(err) => {
                log::warn!("Utterance input error: {}", err);
                Recognition::Closed
            }
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn channel_recognizer_relays_hypotheses_then_closes() {
        let (tx, mut recognizer) = ChannelRecognizer::new();
        recognizer.start(true).unwrap();
        assert!(tx.say("one"));
        assert!(tx.mumble());
        drop(tx);
        assert_eq!(recognizer.next_utterance(), Recognition::Hypothesis("one".into()));
        assert_eq!(recognizer.next_utterance(), Recognition::Unrecognized);
        assert_eq!(recognizer.next_utterance(), Recognition::Closed);
    }

    #[test]
    fn channel_recognizer_can_drop_stale_audio() {
        let (tx, recognizer) = ChannelRecognizer::new();
        let mut recognizer = recognizer.keep_queued(false);
        tx.say("stale");
        recognizer.start(true).unwrap();
        tx.say("fresh");
        assert_eq!(recognizer.next_utterance(), Recognition::Hypothesis("fresh".into()));
    }

    #[test]
    fn line_recognizer_treats_blank_lines_as_unrecognized() {
        let mut recognizer = LineRecognizer::new(Cursor::new("one\n\n  plus \n"));
        recognizer.start(true).unwrap();
        assert_eq!(recognizer.next_utterance(), Recognition::Hypothesis("one".into()));
        assert_eq!(recognizer.next_utterance(), Recognition::Unrecognized);
        assert_eq!(recognizer.next_utterance(), Recognition::Hypothesis("plus".into()));
        assert_eq!(recognizer.next_utterance(), Recognition::Closed);
    }

    #[test]
    fn stopped_line_recognizer_is_closed() {
        let mut recognizer = LineRecognizer::new(Cursor::new("one\n"));
        recognizer.stop();
        assert_eq!(recognizer.next_utterance(), Recognition::Closed);
    }

    #[test]
    fn missing_script_is_unavailable() {
        let err = LineRecognizer::from_path("/definitely/not/here.txt")
            .err()
            .unwrap();
        assert!(matches!(err, CalcError::RecognizerUnavailable(_)));
    }
}
