//! Progress notification seam.
//!
//! The core reports progress, results, and failures as plain data; the
//! transport owns all presentation (chat markup, HTTP bodies, ...).

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{error, info};

/// Trait for acquisition progress sinks.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A human-readable progress update.
    async fn progress(&self, message: &str);

    /// The final set of files produced by an acquisition.
    async fn result(&self, files: &[PathBuf]);

    /// A user-facing failure description.
    async fn error(&self, message: &str);
}

/// Notifier that reports through the tracing subscriber.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn progress(&self, message: &str) {
        info!(target: "cinesub::progress", "{}", message);
    }

    async fn result(&self, files: &[PathBuf]) {
        info!(target: "cinesub::progress", files = files.len(), "Acquisition complete");
    }

    async fn error(&self, message: &str) {
        error!(target: "cinesub::progress", "{}", message);
    }
}
