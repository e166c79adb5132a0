//! Background data sync system
//!
//! Runs the cache manager's refresh on a configured interval in a tokio
//! task, reporting progress to the main application over a channel. The
//! refresh itself is idempotent and absorbs upstream failures, so changing
//! intervals is just shutdown-then-respawn.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::api::ServiceSource;
use crate::cache::{CacheManager, SyncSummary};

/// Supported sync intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncInterval {
    /// Every hour
    Hourly,
    /// Every twelve hours
    TwiceDaily,
    /// Every day
    Daily,
}

impl SyncInterval {
    /// Parses an interval name as used in settings and on the command line
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hourly" => Some(SyncInterval::Hourly),
            "twicedaily" | "twice-daily" => Some(SyncInterval::TwiceDaily),
            "daily" => Some(SyncInterval::Daily),
            _ => None,
        }
    }

    /// Canonical settings name for this interval
    pub fn as_str(self) -> &'static str {
        match self {
            SyncInterval::Hourly => "hourly",
            SyncInterval::TwiceDaily => "twicedaily",
            SyncInterval::Daily => "daily",
        }
    }

    /// Wall-clock duration between sync runs
    pub fn as_duration(self) -> Duration {
        match self {
            SyncInterval::Hourly => Duration::from_secs(3600),
            SyncInterval::TwiceDaily => Duration::from_secs(43200),
            SyncInterval::Daily => Duration::from_secs(86400),
        }
    }
}

/// Messages sent from the background sync task to the main app
#[derive(Debug, Clone)]
pub enum SyncMessage {
    /// A sync cycle has started
    SyncStarted,
    /// A sync cycle finished; counts reflect the data now being served
    SyncCompleted(SyncSummary),
}

/// Configuration for the background sync task
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Time between sync runs
    pub every: Duration,
    /// Whether background sync is enabled
    pub enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            every: SyncInterval::Hourly.as_duration(),
            enabled: true,
        }
    }
}

impl From<SyncInterval> for SyncConfig {
    fn from(interval: SyncInterval) -> Self {
        Self {
            every: interval.as_duration(),
            enabled: true,
        }
    }
}

/// Handle for controlling the background sync task
pub struct SyncHandle {
    /// Channel on which sync progress messages arrive
    pub receiver: mpsc::Receiver<SyncMessage>,
    /// Flag to signal shutdown
    shutdown_tx: mpsc::Sender<()>,
}

impl SyncHandle {
    /// Spawns the background sync task over the given cache manager
    ///
    /// The first interval tick is skipped so spawning does not trigger an
    /// immediate refresh; callers that want a warm start refresh explicitly
    /// before spawning.
    pub fn spawn<S>(cache: Arc<CacheManager<S>>, config: SyncConfig) -> Self
    where
        S: ServiceSource + 'static,
    {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(config.every);
                // Skip the first tick (immediate)
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            let _ = msg_tx.send(SyncMessage::SyncStarted).await;
                            let summary = cache.refresh().await;
                            let _ = msg_tx.send(SyncMessage::SyncCompleted(summary)).await;
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Shuts down the background sync task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Checks for pending sync messages without blocking
pub fn try_recv(handle: &mut SyncHandle) -> Option<SyncMessage> {
    handle.receiver.try_recv().ok()
}
