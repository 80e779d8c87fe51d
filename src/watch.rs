//! Registration counter watcher
//!
//! Best-effort change notification for the public counter display: a polling
//! task that invokes a callback whenever the total registrant count changes.
//! Poll failures are logged and never retried beyond the next tick; nothing
//! here blocks a core operation.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::store::RegistrantStore;

/// Handle for a running watcher. Dropping it stops the polling task.
#[derive(Debug)]
pub struct CountWatcher {
    handle: JoinHandle<()>,
}

impl CountWatcher {
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for CountWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start polling the registrant count every `interval`, calling `on_change`
/// with each new value (including the first observed one).
pub fn watch_registration_count<S, F>(
    store: Arc<S>,
    interval: Duration,
    on_change: F,
) -> CountWatcher
where
    S: RegistrantStore + ?Sized + 'static,
    F: Fn(u64) + Send + Sync + 'static,
{
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        let mut last: Option<u64> = None;
        loop {
            ticker.tick().await;
            match store.count_registrants().await {
                Ok(count) => {
                    if last != Some(count) {
                        debug!(count, "registration count changed");
                        last = Some(count);
                        on_change(count);
                    }
                }
                Err(err) => {
                    warn!(%err, "registration count poll failed");
                }
            }
        }
    });
    CountWatcher { handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Interest, MemoryStore, NewRegistrant};
    use chrono::Utc;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn registrant(phone: &str) -> NewRegistrant {
        NewRegistrant {
            name: "Test".into(),
            college: None,
            phone: phone.into(),
            interest: Interest::Other,
            assigned: false,
            group_id: None,
            is_dummy: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn callback_fires_only_on_change() {
        let store = Arc::new(MemoryStore::new());
        let seen = Arc::new(AtomicU64::new(0));
        let fired = Arc::new(AtomicU64::new(0));

        let watcher = {
            let seen = Arc::clone(&seen);
            let fired = Arc::clone(&fired);
            watch_registration_count(
                Arc::clone(&store),
                Duration::from_secs(5),
                move |count| {
                    seen.store(count, Ordering::SeqCst);
                    fired.fetch_add(1, Ordering::SeqCst);
                },
            )
        };

        // First tick observes zero.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Ticks without change stay quiet.
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        use crate::store::RegistrantStore;
        store.insert_registrant(registrant("01012345678")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        watcher.stop();
    }
}
