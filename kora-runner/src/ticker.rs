//! Loading-message rotation.
//!
//! A background thread advances the overlay message on a fixed interval,
//! independent of real progress. Stage markers jump straight to the message
//! for that stage and rotation continues from there. The thread is stopped
//! when loading ends or the ticker is dropped, so no message fires after the
//! overlay is gone.

use crate::sink::{PipelineEvent, ReportSink};
use kora_core::progress::{next_message_index, FINAL_MESSAGE_INDEX, LOADING_MESSAGES};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

pub struct LoadingTicker {
    sink: Arc<dyn ReportSink>,
    index: Arc<AtomicUsize>,
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl LoadingTicker {
    /// Show the first message and start rotating.
    pub fn start(sink: Arc<dyn ReportSink>, interval: Duration) -> Self {
        let index = Arc::new(AtomicUsize::new(0));
        emit_message(sink.as_ref(), 0);

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread_sink = Arc::clone(&sink);
        let thread_index = Arc::clone(&index);
        let handle = thread::Builder::new()
            .name("kora-loading-ticker".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let next = next_message_index(thread_index.load(Ordering::Relaxed));
                        thread_index.store(next, Ordering::Relaxed);
                        emit_message(thread_sink.as_ref(), next);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .ok();

        if handle.is_none() {
            debug!("could not spawn loading ticker thread; messages will not rotate");
        }

        Self {
            sink,
            index,
            stop_tx: Some(stop_tx),
            handle,
        }
    }

    /// Jump to a specific message.
    pub fn show(&self, index: usize) {
        let index = index.min(FINAL_MESSAGE_INDEX);
        self.index.store(index, Ordering::Relaxed);
        emit_message(self.sink.as_ref(), index);
    }

    pub fn current(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop rotating and show the final message. Safe to call twice.
    pub fn finish(&mut self) {
        if self.stop() {
            self.show(FINAL_MESSAGE_INDEX);
        }
    }

    /// Stop the thread; returns whether it was running.
    fn stop(&mut self) -> bool {
        let was_running = self.stop_tx.is_some();
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        was_running
    }
}

impl Drop for LoadingTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn emit_message(sink: &dyn ReportSink, index: usize) {
    sink.emit(PipelineEvent::LoadingMessage {
        index,
        text: LOADING_MESSAGES[index],
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;

    fn message_indices(sink: &RecordingSink) -> Vec<usize> {
        sink.events()
            .into_iter()
            .filter_map(|e| match e {
                PipelineEvent::LoadingMessage { index, .. } => Some(index),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rotates_until_finished() {
        let sink = Arc::new(RecordingSink::new());
        let mut ticker = LoadingTicker::start(sink.clone(), Duration::from_millis(10));
        thread::sleep(Duration::from_millis(80));
        ticker.finish();

        let indices = message_indices(&sink);
        assert_eq!(indices[0], 0);
        assert!(indices.len() >= 3);
        assert_eq!(*indices.last().unwrap(), FINAL_MESSAGE_INDEX);
        // Final message appears exactly once, at the end.
        assert_eq!(
            indices.iter().filter(|i| **i == FINAL_MESSAGE_INDEX).count(),
            1
        );
        assert!(!ticker.is_running());
    }

    #[test]
    fn nothing_fires_after_finish() {
        let sink = Arc::new(RecordingSink::new());
        let mut ticker = LoadingTicker::start(sink.clone(), Duration::from_millis(5));
        ticker.finish();
        let count = sink.events().len();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(sink.events().len(), count);
        ticker.finish();
        assert_eq!(sink.events().len(), count);
    }

    #[test]
    fn stage_jump_sets_rotation_point() {
        let sink = Arc::new(RecordingSink::new());
        let ticker = LoadingTicker::start(sink.clone(), Duration::from_secs(60));
        ticker.show(4);
        assert_eq!(ticker.current(), 4);
        assert_eq!(message_indices(&sink), vec![0, 4]);
    }
}
