//! Handle to a crawl running on a background task
//!
//! The crawl task is the only writer of its records. Progress flows to the
//! caller over an unbounded channel, so reporting never blocks the fetch
//! loop, and the final result is handed over through the task's join handle.

use crate::crawler::coordinator::Coordinator;
use crate::crawler::request::{CrawlMode, CrawlProgress, CrawlRequest, CrawlResult, CrawlStatus};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A running crawl
pub struct CrawlHandle {
    progress: UnboundedReceiver<CrawlProgress>,
    cancel: CancellationToken,
    task: JoinHandle<CrawlResult>,
}

impl CrawlHandle {
    pub(crate) fn spawn(coordinator: Coordinator, request: CrawlRequest, mode: CrawlMode) -> Self {
        let (sender, progress) = mpsc::unbounded_channel();
        let cancel = request.cancel_token().clone();
        let coordinator = coordinator.with_progress(sender);

        let task = tokio::spawn(async move { coordinator.run(request, mode).await });

        Self {
            progress,
            cancel,
            task,
        }
    }

    /// Asks the crawl to stop at the next page boundary
    ///
    /// The page being worked on is finished first and its records are kept.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns a clone of the crawl's cancellation token
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the next progress event
    ///
    /// Returns None once the crawl has finished and every event was received.
    pub async fn next_progress(&mut self) -> Option<CrawlProgress> {
        self.progress.recv().await
    }

    /// Waits for the crawl to finish, discarding unread progress events
    pub async fn wait(self) -> CrawlResult {
        join(self.task).await
    }

    /// Waits for the crawl to finish, calling `on_progress` for every event
    ///
    /// The callback runs on the caller's task, never on the crawl task.
    pub async fn wait_with_progress<F>(mut self, mut on_progress: F) -> CrawlResult
    where
        F: FnMut(CrawlProgress),
    {
        while let Some(progress) = self.progress.recv().await {
            on_progress(progress);
        }
        join(self.task).await
    }
}

async fn join(task: JoinHandle<CrawlResult>) -> CrawlResult {
    match task.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Crawl task ended abnormally: {}", e);
            CrawlResult::new(
                Vec::new(),
                CrawlStatus::Failed(format!("Crawl task ended abnormally: {}", e)),
            )
        }
    }
}
