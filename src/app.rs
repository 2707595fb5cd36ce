/*
 * @file app.rs
 * @brief Calculator session orchestration
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

//! Calculator session orchestration.
//!
//! Wires the recognizer, controller, resource monitor, and console reporter
//! together and runs until the recognition loop exits.

use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;

use crate::config::AppConfig;
use crate::controller::RecognitionController;
use crate::events::{CalcEvent, EventBus};
use crate::monitor::{CpalProbe, MicrophoneProbe, ResourceMonitor};
use crate::recognizer::{LineRecognizer, Recognizer};

/// How a calculator session should run.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub config: AppConfig,
    /// Read utterances from this file instead of stdin.
    pub script: Option<PathBuf>,
    /// Print events as JSON lines instead of console text.
    pub json: bool,
    /// Skip the microphone monitor.
    pub without_monitor: bool,
}

/// Runs a calculator session against stdin (or a script) and stdout.
///
/// # Returns
/// `Ok(())` once the recognition loop has exited.
///
/// # Errors
/// Returns an error if the recognizer cannot be created or started, or if
/// writing to stdout fails.
pub async fn run_calculator(options: SessionOptions) -> Result<()> {
    let recognizer: Box<dyn Recognizer> = match &options.script {
        Some(path) => Box::new(
            LineRecognizer::from_path(path).context("Failed to open utterance script")?,
        ),
        None => Box::new(LineRecognizer::new(BufReader::new(io::stdin()))),
    };
    let stdout = io::stdout();
    run_session(recognizer, Arc::new(CpalProbe), &options, stdout.lock()).await
}

/// Runs one session with explicit collaborators.
///
/// # Details
/// Subscribes to the event bus before anything starts, so no event is
/// missed, then reports every event to `out` until `RecognitionExited`.
///
/// # Arguments
/// * `recognizer` - Source of utterances.
/// * `probe` - Microphone availability check for the monitor.
/// * `options` - Session settings.
/// * `out` - Destination for the console or JSON report.
///
/// # Errors
/// Returns an error if the recognizer fails to start or `out` fails.
pub async fn run_session<W: Write>(
    recognizer: Box<dyn Recognizer>,
    probe: Arc<dyn MicrophoneProbe>,
    options: &SessionOptions,
    mut out: W,
) -> Result<()> {
    log::info!("Loading speech recognizer...");
    let events = EventBus::new(options.config.event_capacity);
    let mut rx = events.subscribe();
    let controller = RecognitionController::new(
        recognizer,
        events.clone(),
        options.config.controller_options(),
    );
    let monitor = ResourceMonitor::new(probe, events, options.config.monitor_interval());

    if !options.without_monitor {
        monitor.start();
    }
    if let Err(err) = controller.start() {
        monitor.shutdown();
        monitor.wait().await;
        return Err(err).context("Failed to start speech recognition");
    }

    let reported = report_events(&mut rx, &mut out, options.json).await;
    monitor.shutdown();
    monitor.wait().await;
    controller.wait().await;
    reported
}

/// Writes events to `out` until the recognition loop exits.
async fn report_events<W: Write>(
    rx: &mut tokio::sync::broadcast::Receiver<CalcEvent>,
    out: &mut W,
    json: bool,
) -> Result<()> {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Console fell behind, {} events skipped", skipped);
                continue;
            }
            Err(RecvError::Closed) => return Ok(()),
        };
        let line = if json {
            Some(serde_json::to_string(&event).context("Failed to encode event")?)
        } else {
            console_line(&event)
        };
        if let Some(line) = line {
            writeln!(out, "{}", line).context("Failed to write report")?;
            out.flush().context("Failed to flush report")?;
        }
        if event == CalcEvent::RecognitionExited {
            return Ok(());
        }
    }
}

/// Console rendering of an event, or `None` for events only worth logging.
pub fn console_line(event: &CalcEvent) -> Option<String> {
    match event {
        CalcEvent::UtteranceHeard { text } => Some(format!("You said: [{}]", text)),
        CalcEvent::BufferUpdated { buffer } => Some(buffer.clone()),
        CalcEvent::UtteranceUnrecognized => Some("I can't understand what you said.".to_string()),
        CalcEvent::ProcessingFailed { error } => Some(format!("Error: {}", error)),
        CalcEvent::MicrophoneStatus { available: false } => {
            Some("Microphone is not available.".to_string())
        }
        _ => None,
    }
}
