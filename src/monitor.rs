/*
 * @file monitor.rs
 * @brief Microphone availability monitor
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

//! Microphone availability monitor.
//!
//! Runs beside the recognition loop and shares nothing with it except the
//! event bus.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cpal::traits::HostTrait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::events::{CalcEvent, EventBus};

/// Pause between two microphone probes.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_millis(350);

/// Answers whether a microphone-capable input is present right now.
pub trait MicrophoneProbe: Send + Sync {
    fn is_microphone_available(&self) -> bool;
}

/// Probe backed by the default CPAL host.
///
/// # Details
/// A microphone counts as available when the host reports a default input
/// device.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpalProbe;

impl MicrophoneProbe for CpalProbe {
    fn is_microphone_available(&self) -> bool {
        cpal::default_host().default_input_device().is_some()
    }
}

/// Periodic microphone health reporter.
///
/// # Details
/// Once started the loop runs until [`shutdown`](Self::shutdown) is called;
/// it never stops on its own. Starting it twice is a no-op, but a loop that
/// has been told to shut down can be replaced straight away. Each loop gets
/// its own generation number and only clears the running marker while it
/// is still the current one.
pub struct ResourceMonitor {
    probe: Arc<dyn MicrophoneProbe>,
    events: EventBus,
    interval: Duration,
    /// Generation of the live loop, `0` when none is running.
    current: Arc<AtomicU64>,
    next_generation: AtomicU64,
    /// Shutdown signal of the live loop; empty once it was told to stop.
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ResourceMonitor {
    pub fn new(probe: Arc<dyn MicrophoneProbe>, events: EventBus, interval: Duration) -> Self {
        Self {
            probe,
            events,
            interval: interval.max(Duration::from_millis(1)),
            current: Arc::new(AtomicU64::new(0)),
            next_generation: AtomicU64::new(1),
            shutdown: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawns the probe loop on the current Tokio runtime.
    ///
    /// # Returns
    /// `false` when a loop is already running and has not been shut down.
    pub fn start(&self) -> bool {
        let mut slot = self.shutdown.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            log::info!("Resources thread already running");
            return false;
        }
        let generation = self.next_generation.fetch_add(1, Ordering::AcqRel);
        self.current.store(generation, Ordering::Release);
        let (sender, mut shutdown) = watch::channel(false);
        *slot = Some(sender);
        drop(slot);

        let probe = Arc::clone(&self.probe);
        let events = self.events.clone();
        let current = Arc::clone(&self.current);
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let available = probe_on_blocking_pool(&probe).await;
                        if !available {
                            log::warn!("Microphone is not available.");
                        }
                        events.publish(CalcEvent::MicrophoneStatus { available });
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            let _ = current.compare_exchange(generation, 0, Ordering::AcqRel, Ordering::Acquire);
            log::info!("Resources thread has exited");
        });
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
        true
    }

    pub fn is_running(&self) -> bool {
        self.current.load(Ordering::Acquire) != 0
    }

    /// Signals the loop to stop after its current probe.
    pub fn shutdown(&self) {
        let sender = self.shutdown.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(sender) = sender {
            sender.send_replace(true);
        }
    }

    /// Waits for every loop started so far to finish.
    pub async fn wait(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for task in tasks {
            if let Err(err) = task.await {
                log::error!("Resources thread panicked: {}", err);
            }
        }
    }
}

/// Runs one probe off the async workers, since device enumeration blocks.
///
/// # Returns
/// The probe's answer, or `false` if the probe panicked.
async fn probe_on_blocking_pool(probe: &Arc<dyn MicrophoneProbe>) -> bool {
    let probe = Arc::clone(probe);
    match tokio::task::spawn_blocking(move || probe.is_microphone_available()).await {
        Ok(available) => available,
        Err(err) => {
            log::error!("Microphone probe failed: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::broadcast;
    use tokio::time::timeout;

    struct SwitchProbe(AtomicBool);

    impl MicrophoneProbe for SwitchProbe {
        fn is_microphone_available(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    async fn next_status(rx: &mut broadcast::Receiver<CalcEvent>, available: bool) {
        let wanted = CalcEvent::MicrophoneStatus { available };
        timeout(Duration::from_secs(5), async {
            loop {
                if rx.recv().await.expect("event stream closed") == wanted {
                    break;
                }
            }
        })
        .await
        .expect("status not reported in time");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reports_status_changes_until_shut_down() {
        let probe = Arc::new(SwitchProbe(AtomicBool::new(true)));
        let events = EventBus::new(64);
        let mut rx = events.subscribe();
        let monitor = ResourceMonitor::new(probe.clone(), events, Duration::from_millis(5));

        assert!(monitor.start());
        assert!(monitor.is_running());
        next_status(&mut rx, true).await;

        probe.0.store(false, Ordering::SeqCst);
        next_status(&mut rx, false).await;

        monitor.shutdown();
        monitor.wait().await;
        assert!(!monitor.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn second_start_is_a_no_op() {
        let probe = Arc::new(SwitchProbe(AtomicBool::new(true)));
        let monitor = ResourceMonitor::new(probe, EventBus::new(8), Duration::from_millis(5));
        assert!(monitor.start());
        assert!(!monitor.start());
        monitor.shutdown();
        monitor.wait().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn can_start_again_after_shutdown() {
        let probe = Arc::new(SwitchProbe(AtomicBool::new(true)));
        let events = EventBus::new(64);
        let mut rx = events.subscribe();
        let monitor = ResourceMonitor::new(probe, events, Duration::from_millis(5));
        monitor.start();
        monitor.shutdown();
        monitor.wait().await;

        assert!(monitor.start());
        while rx.try_recv().is_ok() {}
        next_status(&mut rx, true).await;
        monitor.shutdown();
        monitor.wait().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn restart_right_after_shutdown_keeps_monitoring() {
        let probe = Arc::new(SwitchProbe(AtomicBool::new(true)));
        let events = EventBus::new(256);
        let mut rx = events.subscribe();
        let monitor = ResourceMonitor::new(probe, events, Duration::from_millis(5));
        assert!(monitor.start());
        next_status(&mut rx, true).await;

        monitor.shutdown();
        assert!(monitor.start());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(monitor.is_running());
        while rx.try_recv().is_ok() {}
        next_status(&mut rx, true).await;

        monitor.shutdown();
        monitor.wait().await;
        assert!(!monitor.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_without_start_is_harmless() {
        let probe = Arc::new(SwitchProbe(AtomicBool::new(true)));
        let monitor = ResourceMonitor::new(probe, EventBus::new(8), Duration::from_millis(5));
        monitor.shutdown();
        monitor.wait().await;
        assert!(!monitor.is_running());
    }

    #[test]
    fn default_interval_is_350ms() {
        assert_eq!(DEFAULT_PROBE_INTERVAL, Duration::from_millis(350));
    }
}
