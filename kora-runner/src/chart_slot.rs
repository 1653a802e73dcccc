//! The page's single chart instance.
//!
//! Re-rendering always destroys the previous instance before a new one is
//! created, so at most one instance is ever live. The live count is shared
//! with every instance and decremented on drop, which makes leaks observable.

use crate::sink::{PipelineEvent, ReportSink};
use kora_core::view::ChartView;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct ChartInstance {
    id: u64,
    view: ChartView,
    live: Arc<AtomicUsize>,
}

impl ChartInstance {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn view(&self) -> &ChartView {
        &self.view
    }
}

impl Drop for ChartInstance {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<ChartInstance>,
    next_id: u64,
    live: Arc<AtomicUsize>,
}

impl ChartSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instances created by this slot and not yet dropped.
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> Option<&ChartInstance> {
        self.current.as_ref()
    }

    /// Replace the chart. `None` (no price history) leaves the slot empty.
    pub fn render(&mut self, view: Option<ChartView>, sink: &dyn ReportSink) {
        self.destroy(sink);
        let Some(view) = view else {
            return;
        };

        self.next_id += 1;
        self.live.fetch_add(1, Ordering::SeqCst);
        let instance = ChartInstance {
            id: self.next_id,
            view,
            live: Arc::clone(&self.live),
        };
        sink.emit(PipelineEvent::ChartCreated {
            id: instance.id,
            view: Box::new(instance.view.clone()),
        });
        self.current = Some(instance);
    }

    pub fn destroy(&mut self, sink: &dyn ReportSink) {
        if let Some(old) = self.current.take() {
            let id = old.id;
            drop(old);
            sink.emit(PipelineEvent::ChartDestroyed { id });
        }
    }
}
