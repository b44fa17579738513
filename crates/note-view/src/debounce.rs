//! Debounced snapshot writes and the autosave task that feeds them.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::persist::{PersistedSnapshot, SnapshotStore};
use crate::store::NoteStore;

/// Writes the most recent snapshot once no new one has arrived for `delay`.
///
/// Every `schedule` call cancels the pending timer and starts a new one.
pub struct DebouncedWriter {
    tx: mpsc::UnboundedSender<PersistedSnapshot>,
    task: JoinHandle<()>,
}

impl DebouncedWriter {
    /// Spawn the writer task on the current runtime.
    pub fn spawn(store: Arc<dyn SnapshotStore>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_writer(rx, store, delay));
        Self { tx, task }
    }

    /// Queue `snapshot`, replacing anything not yet written.
    pub fn schedule(&self, snapshot: PersistedSnapshot) {
        if self.tx.send(snapshot).is_err() {
            tracing::warn!("snapshot writer stopped, dropping snapshot");
        }
    }

    /// Flush any pending snapshot and stop.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "snapshot writer task failed");
        }
    }
}

async fn run_writer(
    mut rx: mpsc::UnboundedReceiver<PersistedSnapshot>,
    store: Arc<dyn SnapshotStore>,
    delay: Duration,
) {
    while let Some(mut pending) = rx.recv().await {
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(snapshot) => pending = snapshot,
                    None => {
                        store.write(&pending).await;
                        return;
                    }
                },
                _ = tokio::time::sleep(delay) => {
                    store.write(&pending).await;
                    break;
                }
            }
        }
    }
}

/// Background task that persists pins, filters and sort after they change.
pub struct Autosave {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Autosave {
    /// Subscribe to `store` and write through `snapshots`, debounced by `delay`.
    pub fn spawn(store: NoteStore, snapshots: Arc<dyn SnapshotStore>, delay: Duration) -> Self {
        let events = store.subscribe();
        let writer = DebouncedWriter::spawn(snapshots, delay);
        let (stop, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run_autosave(store, events, writer, stop_rx));
        Self { stop, task }
    }

    /// Stop listening and flush the pending write.
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "autosave task failed");
        }
    }
}

async fn run_autosave(
    store: NoteStore,
    mut events: broadcast::Receiver<crate::store::StoreEvent>,
    writer: DebouncedWriter,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut stop => {
                drain_pending(&store, &mut events, &writer);
                break;
            }
            event = events.recv() => match event {
                Ok(event) if event.affects_snapshot() => writer.schedule(store.persisted_snapshot()),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "autosave lagged, saving current state");
                    writer.schedule(store.persisted_snapshot());
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    writer.shutdown().await;
}

/// Schedule a final snapshot if events still buffered at stop touched it.
fn drain_pending(
    store: &NoteStore,
    events: &mut broadcast::Receiver<crate::store::StoreEvent>,
    writer: &DebouncedWriter,
) {
    let mut dirty = false;
    loop {
        match events.try_recv() {
            Ok(event) => dirty |= event.affects_snapshot(),
            Err(broadcast::error::TryRecvError::Lagged(_)) => dirty = true,
            Err(_) => break,
        }
    }
    if dirty {
        writer.schedule(store.persisted_snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticLoader;
    use crate::persist::MemorySnapshotStore;

    fn snapshot(pin: &str) -> PersistedSnapshot {
        PersistedSnapshot {
            pinned_notes: vec![pin.to_string()],
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_to_one_write() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let writer = DebouncedWriter::spawn(memory.clone(), Duration::from_millis(500));

        for pin in ["a", "b", "c"] {
            writer.schedule(snapshot(pin));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(memory.write_count(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(memory.write_count(), 1);
        assert_eq!(memory.read().await, Some(snapshot("c")));

        writer.shutdown().await;
        assert_eq!(memory.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let writer = DebouncedWriter::spawn(memory.clone(), Duration::from_secs(60));
        writer.schedule(snapshot("late"));
        writer.shutdown().await;
        assert_eq!(memory.read().await, Some(snapshot("late")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_is_not_fatal() {
        let memory = Arc::new(MemorySnapshotStore::new());
        memory.set_fail_writes(true);
        let writer = DebouncedWriter::spawn(memory.clone(), Duration::from_millis(10));
        writer.schedule(snapshot("a"));
        tokio::time::sleep(Duration::from_millis(50)).await;

        memory.set_fail_writes(false);
        writer.schedule(snapshot("b"));
        writer.shutdown().await;
        assert_eq!(memory.read().await, Some(snapshot("b")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_persists_pin_changes() {
        let store = NoteStore::builder(Arc::new(StaticLoader::default())).build();
        let memory = Arc::new(MemorySnapshotStore::new());
        let autosave = Autosave::spawn(store.clone(), memory.clone(), Duration::from_millis(200));

        store.toggle_pin("x.md");
        store.toggle_pin("y.md");
        store.set_error(Some("ignored".into()));
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(memory.write_count(), 1);
        let saved = memory.read().await.unwrap();
        assert_eq!(saved.pinned_notes, vec!["x.md", "y.md"]);

        autosave.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_right_after_change_keeps_it() {
        for _ in 0..50 {
            let store = NoteStore::builder(Arc::new(StaticLoader::default())).build();
            let memory = Arc::new(MemorySnapshotStore::new());
            let autosave =
                Autosave::spawn(store.clone(), memory.clone(), Duration::from_secs(60));

            store.toggle_pin("x.md");
            autosave.shutdown().await;

            assert_eq!(memory.write_count(), 1);
            let saved = memory.read().await.unwrap();
            assert_eq!(saved.pinned_notes, vec!["x.md"]);
        }
    }

    #[tokio::test]
    async fn test_shutdown_without_changes_writes_nothing() {
        let store = NoteStore::builder(Arc::new(StaticLoader::default())).build();
        let memory = Arc::new(MemorySnapshotStore::new());
        let autosave = Autosave::spawn(store.clone(), memory.clone(), Duration::from_secs(60));

        store.set_error(Some("not persisted".into()));
        autosave.shutdown().await;

        assert_eq!(memory.write_count(), 0);
    }
}
