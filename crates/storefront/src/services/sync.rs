//! Per-identity remote write queue.
//!
//! Remote cart writes are fire-and-forget from the caller's point of view:
//! the local session state is the source of truth and must never wait on
//! the network. To keep unordered completions from leaving the remote store
//! on a stale snapshot, writes for one user are funneled through a single
//! worker holding a `watch` channel: at most one write is in flight, and
//! intermediate snapshots are coalesced (latest wins).
//!
//! A remote failure is logged as degraded sync and otherwise ignored; the
//! next snapshot push retries implicitly with fresher state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use tracing::warn;

use hk_leather_core::UserId;

use crate::models::cart::CartLine;
use crate::services::cart::RemoteCartStore;

type SenderMap = Arc<Mutex<HashMap<UserId, watch::Sender<Vec<CartLine>>>>>;

/// Workers deregister themselves after this long without a new snapshot,
/// so the queue holds one entry and one task per recently-active user,
/// not per user ever seen.
const IDLE_SHUTDOWN: Duration = Duration::from_secs(60);

/// Coalescing write queue in front of a [`RemoteCartStore`].
pub struct SyncQueue<R> {
    remote: Arc<R>,
    senders: SenderMap,
}

impl<R: RemoteCartStore> SyncQueue<R> {
    #[must_use]
    pub fn new(remote: Arc<R>) -> Self {
        Self {
            remote,
            senders: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Queue a full-replace write of `lines` for `user`.
    ///
    /// Returns immediately; the write happens on the user's worker task.
    /// If a write is already in flight, this snapshot supersedes any queued
    /// one and is written next.
    pub fn push(&self, user: UserId, lines: Vec<CartLine>) {
        let Ok(mut senders) = self.senders.lock() else {
            warn!(user = %user, "sync queue lock poisoned; dropping remote write");
            return;
        };

        if let Some(tx) = senders.get(&user) {
            if tx.send(lines.clone()).is_ok() {
                return;
            }
            // Worker died (panicked); fall through and restart it.
        }

        let (tx, rx) = watch::channel(lines);
        senders.insert(user, tx);
        tokio::spawn(run_worker(
            Arc::clone(&self.remote),
            Arc::clone(&self.senders),
            user,
            rx,
        ));
    }
}

/// Drain loop for one user: write the current snapshot, then wait for the
/// next change. `borrow_and_update` skips any snapshots that arrived while
/// a write was in flight. After [`IDLE_SHUTDOWN`] with no new snapshot the
/// worker removes its sender entry and exits; the next push starts a fresh
/// one.
async fn run_worker<R: RemoteCartStore>(
    remote: Arc<R>,
    senders: SenderMap,
    user: UserId,
    mut rx: watch::Receiver<Vec<CartLine>>,
) {
    loop {
        let snapshot = rx.borrow_and_update().clone();
        if let Err(e) = remote.replace_all(user, &snapshot).await {
            warn!(user = %user, error = %e,
                  "remote cart sync degraded; local cart remains authoritative");
        }
        match timeout(IDLE_SHUTDOWN, rx.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => break,
            Err(_) => {
                let Ok(mut map) = senders.lock() else { break };
                // push() sends under the same lock, so a snapshot that
                // raced in ahead of us is visible here; stay alive for it.
                if matches!(rx.has_changed(), Ok(true)) {
                    continue;
                }
                map.remove(&user);
                break;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;

    use hk_leather_core::ProductId;

    use super::*;
    use crate::db::RepositoryError;

    /// Recording remote store with a switchable failure mode.
    #[derive(Default)]
    struct RecordingRemote {
        state: Mutex<HashMap<UserId, Vec<CartLine>>>,
        writes: Mutex<u32>,
        fail: Mutex<bool>,
    }

    impl RemoteCartStore for RecordingRemote {
        async fn fetch(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
            Ok(self.state.lock().unwrap().get(&user).cloned().unwrap_or_default())
        }

        async fn replace_all(
            &self,
            user: UserId,
            lines: &[CartLine],
        ) -> Result<(), RepositoryError> {
            *self.writes.lock().unwrap() += 1;
            if *self.fail.lock().unwrap() {
                return Err(RepositoryError::DataCorruption("injected".to_owned()));
            }
            self.state.lock().unwrap().insert(user, lines.to_vec());
            Ok(())
        }
    }

    fn line(id: i32, qty: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            unit_price: Decimal::from(100),
            image: String::new(),
            category: "bags".to_owned(),
            variant: None,
            quantity: qty,
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within timeout");
    }

    #[tokio::test]
    async fn push_converges_remote_to_latest_snapshot() {
        let remote = Arc::new(RecordingRemote::default());
        let queue = SyncQueue::new(Arc::clone(&remote));
        let user = UserId::generate();

        queue.push(user, vec![line(1, 1)]);
        queue.push(user, vec![line(1, 2)]);
        queue.push(user, vec![line(1, 3)]);

        let remote_ref = Arc::clone(&remote);
        wait_until(move || {
            remote_ref
                .state
                .lock()
                .unwrap()
                .get(&user)
                .is_some_and(|lines| lines == &vec![line(1, 3)])
        })
        .await;
    }

    #[tokio::test]
    async fn empty_snapshot_clears_the_remote_cart() {
        let remote = Arc::new(RecordingRemote::default());
        let queue = SyncQueue::new(Arc::clone(&remote));
        let user = UserId::generate();

        queue.push(user, vec![line(1, 1)]);
        queue.push(user, Vec::new());

        let remote_ref = Arc::clone(&remote);
        wait_until(move || {
            remote_ref
                .state
                .lock()
                .unwrap()
                .get(&user)
                .is_some_and(Vec::is_empty)
        })
        .await;
    }

    #[tokio::test]
    async fn failed_write_is_swallowed_and_next_push_recovers() {
        let remote = Arc::new(RecordingRemote::default());
        let queue = SyncQueue::new(Arc::clone(&remote));
        let user = UserId::generate();

        *remote.fail.lock().unwrap() = true;
        queue.push(user, vec![line(1, 1)]);
        let remote_ref = Arc::clone(&remote);
        wait_until(move || *remote_ref.writes.lock().unwrap() >= 1).await;
        assert!(remote.state.lock().unwrap().get(&user).is_none());

        *remote.fail.lock().unwrap() = false;
        queue.push(user, vec![line(1, 2)]);
        let remote_ref = Arc::clone(&remote);
        wait_until(move || {
            remote_ref
                .state
                .lock()
                .unwrap()
                .get(&user)
                .is_some_and(|lines| lines == &vec![line(1, 2)])
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn idle_workers_deregister_and_restart_on_demand() {
        let remote = Arc::new(RecordingRemote::default());
        let queue = SyncQueue::new(Arc::clone(&remote));
        let user = UserId::generate();

        queue.push(user, vec![line(1, 1)]);
        let remote_ref = Arc::clone(&remote);
        wait_until(move || {
            remote_ref
                .state
                .lock()
                .unwrap()
                .get(&user)
                .is_some_and(|l| l == &vec![line(1, 1)])
        })
        .await;

        // A long quiet period reaps the worker and its sender entry.
        tokio::time::sleep(IDLE_SHUTDOWN + Duration::from_secs(1)).await;
        let senders = Arc::clone(&queue.senders);
        wait_until(move || senders.lock().unwrap().is_empty()).await;

        // The next push spins up a fresh worker for the same user.
        queue.push(user, vec![line(1, 2)]);
        let remote_ref = Arc::clone(&remote);
        wait_until(move || {
            remote_ref
                .state
                .lock()
                .unwrap()
                .get(&user)
                .is_some_and(|l| l == &vec![line(1, 2)])
        })
        .await;
        assert_eq!(queue.senders.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn queues_are_independent_per_user() {
        let remote = Arc::new(RecordingRemote::default());
        let queue = SyncQueue::new(Arc::clone(&remote));
        let alice = UserId::generate();
        let bob = UserId::generate();

        queue.push(alice, vec![line(1, 1)]);
        queue.push(bob, vec![line(2, 2)]);

        let remote_ref = Arc::clone(&remote);
        wait_until(move || {
            let state = remote_ref.state.lock().unwrap();
            state.get(&alice).is_some_and(|l| l == &vec![line(1, 1)])
                && state.get(&bob).is_some_and(|l| l == &vec![line(2, 2)])
        })
        .await;
    }
}
