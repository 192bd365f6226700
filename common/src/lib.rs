//! common - ambient plumbing shared by the Iu adaptation crates: logging
//! setup and a small graceful-shutdown handle.

use slog::{o, Drain, Logger};

/// Build the process-wide root logger: async, term-formatted, compact.
///
/// Every crate in this workspace takes a `Logger` at construction rather than
/// reaching for a global - this is the one place a global drain is set up,
/// meant to be called once from the host binary.
pub fn root_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    Logger::root(drain, o!())
}

/// A `Logger` that discards everything, for unit tests that don't want
/// terminal output.
pub fn null_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

/// A background task plus the `StopSource` that cancels it. Dropping the
/// `StopSource` signals shutdown; `graceful_shutdown` drops it and then
/// waits for the task to actually finish.
pub struct ShutdownHandle {
    handle: Option<async_std::task::JoinHandle<()>>,
    stop_source: Option<stop_token::StopSource>,
}

impl ShutdownHandle {
    pub fn new(
        handle: async_std::task::JoinHandle<()>,
        stop_source: stop_token::StopSource,
    ) -> Self {
        ShutdownHandle {
            handle: Some(handle),
            stop_source: Some(stop_source),
        }
    }

    pub async fn graceful_shutdown(mut self) {
        drop(self.stop_source.take());
        if let Some(handle) = self.handle.take() {
            handle.await;
        }
    }
}
