use std::sync::Arc;

use super::super::events::LogEntry;
use super::stage::{AgentStatus, PipelineStage};

/// Sink for pipeline progress, injected instead of wiring a rendering layer in.
pub trait PipelineObserver: Send + Sync {
    fn on_status_change(&self, stage: PipelineStage, status: AgentStatus);
    fn on_log_entry(&self, entry: &LogEntry);
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_status_change(&self, _stage: PipelineStage, _status: AgentStatus) {}

    fn on_log_entry(&self, _entry: &LogEntry) {}
}

impl<T: PipelineObserver + ?Sized> PipelineObserver for Arc<T> {
    fn on_status_change(&self, stage: PipelineStage, status: AgentStatus) {
        (**self).on_status_change(stage, status);
    }

    fn on_log_entry(&self, entry: &LogEntry) {
        (**self).on_log_entry(entry);
    }
}
