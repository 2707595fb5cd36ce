/*
 * @file lib.rs
 * @brief Vocalc library root
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

//! Vocalc - a hands-free calculator driven by recognized speech.
//!
//! A recognizer hands over one word at a time from a closed vocabulary
//! (`zero`..`nine`, `plus`, `minus`, `multiply`, `divide`, `clear`,
//! `remove`, `result`). Each word becomes a [`Token`] that edits the
//! expression buffer; `result` evaluates it strictly left to right.
//! A separate monitor reports microphone availability on its own cadence.
//!
//! # Example
//! ```no_run
//! use anyhow::Result;
//! use vocalc::app::{run_calculator, SessionOptions};
//!
//! #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
//! async fn main() -> Result<()> {
//!     run_calculator(SessionOptions::default()).await
//! }
//! ```

pub mod app;
pub mod buffer;
pub mod config;
pub mod controller;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod grammar;
pub mod monitor;
pub mod recognizer;
pub mod token;

pub use buffer::{BufferRules, DigitSixMode, EmptyRemovePolicy, ExpressionBuffer};
pub use controller::{ControllerOptions, RecognitionController, RecognitionState, RestartPolicy};
pub use error::{CalcError, CalcResult};
pub use evaluator::evaluate;
pub use events::{CalcEvent, EventBus};
pub use monitor::{CpalProbe, MicrophoneProbe, ResourceMonitor};
pub use recognizer::{ChannelRecognizer, LineRecognizer, Recognition, Recognizer, UtteranceSender};
pub use token::{map_utterance, Control, Operator, Token};
