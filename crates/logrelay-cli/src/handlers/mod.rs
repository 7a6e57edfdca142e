//! Command handlers.

pub mod send;
pub mod tail;
pub mod view;

use std::sync::Arc;

use logrelay_core::{LogSink, Settings};

/// Sink for a relay run, honoring the retention setting.
pub(crate) fn build_sink(settings: &Settings) -> Arc<LogSink> {
    Arc::new(match settings.max_entries {
        Some(max) => LogSink::with_retention(max),
        None => LogSink::new(),
    })
}
