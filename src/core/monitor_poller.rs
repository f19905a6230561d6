use crate::app_config::ApplicationConfig;
use crate::core::snapshot_source::{SnapshotFrame, SnapshotSource};
use crate::errors::AppError;
use crate::shinobi::models::MonitorMetadata;
use crate::shinobi::monitor_entity::{MonitorEntity, MonitorState};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{debug, info, trace, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Frames queued between a poller and its tile. The tile only ever shows the newest.
const FRAME_QUEUE_DEPTH: usize = 2;

/// Called from the network side whenever a tile has something new to draw.
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollTiming {
    pub poll_interval: Duration,
    pub metadata_retry_delay: Duration,
}

impl From<&ApplicationConfig> for PollTiming {
    fn from(app: &ApplicationConfig) -> Self {
        PollTiming {
            poll_interval: app.poll_interval(),
            metadata_retry_delay: app.metadata_retry_delay(),
        }
    }
}

fn lock_entity(entity: &Mutex<MonitorEntity>) -> MutexGuard<'_, MonitorEntity> {
    entity.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drives one monitor tile: metadata once, then a snapshot every tick.
pub struct MonitorPoller {
    entity: Arc<Mutex<MonitorEntity>>,
    source: Arc<dyn SnapshotSource>,
    timing: PollTiming,
    repaint: RepaintHook,
    frames_tx: Sender<SnapshotFrame>,
    frames_rx: Receiver<SnapshotFrame>,
    cancel: Option<CancellationToken>,
}

impl MonitorPoller {
    pub fn new(
        entity: MonitorEntity,
        source: Arc<dyn SnapshotSource>,
        timing: PollTiming,
        repaint: RepaintHook,
    ) -> Self {
        let (frames_tx, frames_rx) = crossbeam_channel::bounded(FRAME_QUEUE_DEPTH);
        MonitorPoller {
            entity: Arc::new(Mutex::new(entity)),
            source,
            timing,
            repaint,
            frames_tx,
            frames_rx,
            cancel: None,
        }
    }

    pub fn monitor_id(&self) -> String {
        lock_entity(&self.entity).monitor_id.clone()
    }

    pub fn state(&self) -> MonitorState {
        lock_entity(&self.entity).state
    }

    pub fn metadata(&self) -> Option<MonitorMetadata> {
        lock_entity(&self.entity).metadata.clone()
    }

    pub fn is_running(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| !c.is_cancelled())
    }

    /// Spawns the poll loop on `runtime`. Does nothing if the loop is already running.
    pub fn start(&mut self, runtime: &Handle) {
        if self.is_running() {
            debug!("Monitor '{}' already polling, ignoring start.", self.monitor_id());
            return;
        }

        let cancel = CancellationToken::new();
        lock_entity(&self.entity).update_state(MonitorState::Loading);

        let task = PollTask {
            entity: Arc::clone(&self.entity),
            source: Arc::clone(&self.source),
            timing: self.timing,
            repaint: Arc::clone(&self.repaint),
            frames_tx: self.frames_tx.clone(),
            frames_rx: self.frames_rx.clone(),
            cancel: cancel.clone(),
        };
        runtime.spawn(task.run());
        self.cancel = Some(cancel);
    }

    /// Cancels scheduled fetches. A request already on the wire may finish, but its
    /// result is dropped.
    pub fn stop(&mut self) {
        {
            let mut entity = lock_entity(&self.entity);
            if let Some(cancel) = self.cancel.take() {
                cancel.cancel();
            }
            entity.reset();
        }
        while self.frames_rx.try_recv().is_ok() {}
    }

    /// Newest decoded frame since the last call, if any.
    pub fn take_latest_frame(&self) -> Option<SnapshotFrame> {
        let mut latest = None;
        while let Ok(frame) = self.frames_rx.try_recv() {
            if latest.is_some() {
                trace!("dropping stale frame");
            }
            latest = Some(frame);
        }
        latest
    }
}

impl Drop for MonitorPoller {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

struct PollTask {
    entity: Arc<Mutex<MonitorEntity>>,
    source: Arc<dyn SnapshotSource>,
    timing: PollTiming,
    repaint: RepaintHook,
    frames_tx: Sender<SnapshotFrame>,
    frames_rx: Receiver<SnapshotFrame>,
    cancel: CancellationToken,
}

impl PollTask {
    async fn run(self) {
        let (monitor_id, server, monitor_path) = {
            let entity = lock_entity(&self.entity);
            debug!("Monitor '{}': poll loop started, metadata from {}", entity.monitor_id, entity.metadata_url());
            (entity.monitor_id.clone(), entity.server_url.clone(), entity.monitor_path.clone())
        };

        let metadata = match self.fetch_metadata_until_ok(&monitor_id, &server, &monitor_path).await {
            Some(m) => m,
            None => {
                debug!("Monitor '{}': cancelled before metadata arrived.", monitor_id);
                return;
            }
        };
        let snapshot_path = metadata.snapshot.clone();
        let snapshot_url = {
            let mut entity = lock_entity(&self.entity);
            if self.cancel.is_cancelled() {
                return;
            }
            entity.metadata = Some(metadata);
            entity.snapshot_url().unwrap_or_default()
        };
        info!("📷 Monitor '{}': polling snapshots from {}", monitor_id, snapshot_url);

        let mut ticker = tokio::time::interval(self.timing.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // first tick completes immediately
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let fetched = tokio::select! {
                _ = self.cancel.cancelled() => break,
                res = self.source.fetch_snapshot(&server, &snapshot_path) => res,
            };

            match decode_off_thread(fetched).await {
                Ok(frame) => {
                    if !self.publish(frame) {
                        break;
                    }
                }
                Err(e) => {
                    debug!("Monitor '{}': snapshot skipped: {}", monitor_id, e);
                }
            }
        }
        debug!("Monitor '{}': poll loop stopped.", monitor_id);
    }

    async fn fetch_metadata_until_ok(
        &self,
        monitor_id: &str,
        server: &str,
        monitor_path: &str,
    ) -> Option<MonitorMetadata> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let result = tokio::select! {
                _ = self.cancel.cancelled() => return None,
                res = self.source.fetch_metadata(server, monitor_path) => res,
            };
            match result {
                Ok(metadata) => return Some(metadata),
                Err(e) => {
                    if attempt == 1 {
                        warn!("⚠️ Monitor '{}': metadata fetch failed, retrying every {:?}: {}", monitor_id, self.timing.metadata_retry_delay, e);
                    } else {
                        debug!("Monitor '{}': metadata attempt {} failed: {}", monitor_id, attempt, e);
                    }
                }
            }
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.timing.metadata_retry_delay) => {}
            }
        }
    }

    /// Hands a frame to the tile. Returns false once the poller has been stopped.
    fn publish(&self, frame: SnapshotFrame) -> bool {
        {
            let mut entity = lock_entity(&self.entity);
            if self.cancel.is_cancelled() {
                return false;
            }
            entity.update_state(MonitorState::Playing);

            let mut pending = frame;
            loop {
                match self.frames_tx.try_send(pending) {
                    Ok(()) => break,
                    Err(TrySendError::Full(back)) => {
                        // tile is behind, replace the oldest queued frame
                        let _ = self.frames_rx.try_recv();
                        pending = back;
                    }
                    Err(TrySendError::Disconnected(_)) => return false,
                }
            }
        }
        (self.repaint)();
        true
    }
}

async fn decode_off_thread(fetched: Result<Vec<u8>, AppError>) -> Result<SnapshotFrame, AppError> {
    let bytes = fetched?;
    tokio::task::spawn_blocking(move || SnapshotFrame::decode_jpeg(&bytes))
        .await
        .map_err(|e| AppError::Decode(format!("decode task failed: {}", e)))?
}
