//! Polling subscriptions.
//!
//! A subscription polls one `(cluster, owner)` key on a fixed interval and
//! refetches immediately when the key is invalidated. Dropping the
//! subscription aborts its task, so a read still in flight for an old key is
//! discarded rather than delivered.

use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::basic::cache::{CacheLease, CachedSnapshot, VaultCache};
use crate::basic::reader::StateReader;
use crate::config::Cluster;
use crate::core::connection::SolConnection;
use crate::types::{VaultKey, VaultSnapshot};

/// Starts polling subscriptions for one cluster
pub struct VaultWatcher<C> {
    reader: Arc<StateReader<C>>,
    cache: Arc<VaultCache>,
    cluster: Cluster,
    poll_interval: Duration,
}

impl<C> Clone for VaultWatcher<C> {
    fn clone(&self) -> Self {
        Self {
            reader: Arc::clone(&self.reader),
            cache: Arc::clone(&self.cache),
            cluster: self.cluster.clone(),
            poll_interval: self.poll_interval,
        }
    }
}

impl<C: SolConnection + 'static> VaultWatcher<C> {
    pub fn new(
        reader: Arc<StateReader<C>>,
        cache: Arc<VaultCache>,
        cluster: Cluster,
        poll_interval: Duration,
    ) -> Self {
        Self {
            reader,
            cache,
            cluster,
            poll_interval,
        }
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    /// Start polling `owner`'s vault. With no owner the subscription stays
    /// `Disconnected` and issues no reads.
    pub fn subscribe(&self, owner: Option<Pubkey>) -> VaultSubscription {
        let Some(owner) = owner else {
            let (_, receiver) = watch::channel(VaultSnapshot::Disconnected);
            return VaultSubscription {
                key: None,
                receiver,
                task: None,
            };
        };

        let key = VaultKey::new(self.cluster.clone(), owner);
        // Take the lease before reading the seed so an invalidation in
        // between cannot be missed
        let lease = self.cache.lease(&key);
        let initial = self
            .cache
            .get(&key)
            .and_then(CachedSnapshot::fresh)
            .unwrap_or(VaultSnapshot::Loading);
        let (sender, receiver) = watch::channel(initial);

        info!(%key, "starting vault subscription");
        let task = tokio::spawn(poll(
            Arc::clone(&self.reader),
            Arc::clone(&self.cache),
            lease,
            self.poll_interval,
            sender,
        ));

        VaultSubscription {
            key: Some(key),
            receiver,
            task: Some(task),
        }
    }
}

/// Read on every tick and on every invalidation. The interval restarts after
/// each read, so a slow read (retries included) is followed by a full
/// interval before the next one.
async fn poll<C: SolConnection>(
    reader: Arc<StateReader<C>>,
    cache: Arc<VaultCache>,
    mut lease: CacheLease,
    poll_interval: Duration,
    sender: watch::Sender<VaultSnapshot>,
) {
    let key = lease.key().clone();
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {},
            live = lease.invalidated() => {
                if !live {
                    debug!(%key, "cache entry removed, stopping poller");
                    break;
                }
            },
        }

        let generation = lease.generation();
        let snapshot = reader.read_vault_view(Some(&key.owner)).await;
        if cache.store(&key, generation, snapshot.clone()) {
            sender.send_replace(snapshot);
        }
        ticker.reset();
    }
}

/// A live polling stream for one key. Polling stops on drop.
pub struct VaultSubscription {
    key: Option<VaultKey>,
    receiver: watch::Receiver<VaultSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl VaultSubscription {
    /// `None` when subscribed without an owner
    pub fn key(&self) -> Option<&VaultKey> {
        self.key.as_ref()
    }

    /// Latest snapshot delivered to this subscription
    pub fn snapshot(&self) -> VaultSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next snapshot. `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<VaultSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn receiver(&self) -> watch::Receiver<VaultSnapshot> {
        self.receiver.clone()
    }
}

impl Drop for VaultSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            if let Some(key) = &self.key {
                debug!(%key, "stopping vault subscription");
            }
            task.abort();
        }
    }
}

/// Follows whichever `(cluster, owner)` is current.
///
/// Switching replaces the subscription, so results for the previous key are
/// never visible through the session.
#[derive(Default)]
pub struct VaultSession {
    subscription: Option<VaultSubscription>,
}

impl VaultSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&VaultKey> {
        self.subscription.as_ref().and_then(|s| s.key())
    }

    /// Point the session at `owner` on `watcher`'s cluster. A no-op if that is
    /// already the current key.
    pub fn follow<C: SolConnection + 'static>(
        &mut self,
        watcher: &VaultWatcher<C>,
        owner: Option<Pubkey>,
    ) {
        let key = owner.map(|owner| VaultKey::new(watcher.cluster().clone(), owner));
        if let Some(current) = &self.subscription {
            if current.key() == key.as_ref() {
                return;
            }
        }
        // Stop the old poller before starting the new one
        self.subscription = None;
        self.subscription = Some(watcher.subscribe(owner));
    }

    pub fn snapshot(&self) -> VaultSnapshot {
        self.subscription
            .as_ref()
            .map(VaultSubscription::snapshot)
            .unwrap_or(VaultSnapshot::Disconnected)
    }

    /// Wait for the next snapshot on the current subscription
    pub async fn next(&mut self) -> Option<VaultSnapshot> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.next().await,
            None => None,
        }
    }
}
