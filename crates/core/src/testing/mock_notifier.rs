//! Recording notifier for testing.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::notify::Notifier;

/// Notifier that records everything it is told.
#[derive(Default)]
pub struct MockNotifier {
    progress: RwLock<Vec<String>>,
    results: RwLock<Vec<Vec<PathBuf>>>,
    errors: RwLock<Vec<String>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn progress_messages(&self) -> Vec<String> {
        self.progress.read().await.clone()
    }

    pub async fn results(&self) -> Vec<Vec<PathBuf>> {
        self.results.read().await.clone()
    }

    pub async fn error_messages(&self) -> Vec<String> {
        self.errors.read().await.clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn progress(&self, message: &str) {
        self.progress.write().await.push(message.to_string());
    }

    async fn result(&self, files: &[PathBuf]) {
        self.results.write().await.push(files.to_vec());
    }

    async fn error(&self, message: &str) {
        self.errors.write().await.push(message.to_string());
    }
}
