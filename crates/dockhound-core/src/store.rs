//! The Host Store: the authoritative in-memory host table, its single
//! writer event loop, and the subscription bus that rides along with it.
//!
//! One [`tokio::task`] owns the mutation path and the subscriber set. The
//! host map itself is shared behind a [`parking_lot::RwLock`] so read
//! operations (`snapshot`, `findForward`, `findReverse`) never have to go
//! through the event loop: they take the shared lock directly, which only
//! ever blocks behind the brief exclusive section the event loop holds
//! while inserting or deleting a single entry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};

use dockhound_common::{DockhoundError, DockhoundResult};

use crate::record::{Host, HostId, is_global_unicast};

/// Channel capacity for the command queue and for each subscription's add
/// and remove channels. Spec requires capacity >= 4 for subscriptions; the
/// command queue gets more headroom since it fans in every mutation.
const COMMAND_CAPACITY: usize = 64;
const SUBSCRIPTION_CAPACITY: usize = 16;

enum Command {
    Add(Host),
    Remove(HostId),
    Subscribe {
        add_tx: mpsc::Sender<Host>,
        remove_tx: mpsc::Sender<HostId>,
        reply: oneshot::Sender<u64>,
    },
    Unsubscribe(u64),
}

/// A live subscription to the Host Store's add/remove event stream.
///
/// Events already observed by the time the subscription was created are
/// *not* replayed — callers that need the current state take a separate
/// [`HostStore::snapshot`] and tolerate seeing the same id on both paths.
pub struct Subscription {
    id: u64,
    commands: mpsc::Sender<Command>,
    /// Receives one [`Host`] per addition observed after this subscription
    /// was registered.
    pub on_add: mpsc::Receiver<Host>,
    /// Receives one [`HostId`] per removal observed after this subscription
    /// was registered.
    pub on_remove: mpsc::Receiver<HostId>,
}

impl Subscription {
    /// Unregister this subscription. The event loop drops its sender
    /// halves of `on_add`/`on_remove` in response, so any pending or future
    /// `recv` on them resolves to `None`.
    pub async fn unsubscribe(&self) {
        // A closed command queue means the store is already gone, which
        // means the channels are already closed too; nothing to do.
        let _ = self.commands.send(Command::Unsubscribe(self.id)).await;
    }
}

/// Handle to the Host Store. Cheap to clone: every clone shares the same
/// event loop and the same host map.
#[derive(Clone)]
pub struct HostStore {
    commands: mpsc::Sender<Command>,
    hosts: Arc<RwLock<HashMap<HostId, Host>>>,
}

impl HostStore {
    /// Spawn the event loop and return a handle to it.
    #[must_use]
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let hosts = Arc::new(RwLock::new(HashMap::new()));
        tokio::spawn(run(rx, Arc::clone(&hosts)));
        Self { commands: tx, hosts }
    }

    /// Idempotently enqueue an addition. A second add for an existing id is
    /// a no-op: no overwrite, no event.
    ///
    /// # Errors
    ///
    /// Returns [`DockhoundError::StoreClosed`] if the event loop has shut
    /// down.
    pub async fn add_host(&self, host: Host) -> DockhoundResult<()> {
        self.commands
            .send(Command::Add(host))
            .await
            .map_err(|_| DockhoundError::StoreClosed)
    }

    /// Idempotently enqueue a removal. Removing an unknown id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DockhoundError::StoreClosed`] if the event loop has shut
    /// down.
    pub async fn remove_host(&self, id: HostId) -> DockhoundResult<()> {
        self.commands
            .send(Command::Remove(id))
            .await
            .map_err(|_| DockhoundError::StoreClosed)
    }

    /// A shallow copy of the current table. Safe for concurrent callers;
    /// further mutations do not affect the returned map.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<HostId, Host> {
        self.hosts.read().clone()
    }

    /// All addresses whose record name or any alias equals `name` once both
    /// sides are compared in FQDN form (exactly one trailing dot).
    #[must_use]
    pub fn find_forward(&self, name: &str) -> Vec<std::net::Ipv4Addr> {
        let name = fqdn(name);
        let hosts = self.hosts.read();
        let mut addrs = Vec::new();
        for host in hosts.values() {
            if fqdn(&host.name) == name || host.aliases.iter().any(|a| fqdn(a) == name) {
                addrs.push(host.address);
            }
        }
        addrs
    }

    /// Primary names (in FQDN form) of every record whose reverse DNS form
    /// equals `ptr_name`. `ptr_name` is expected in `.in-addr.arpa.` form
    /// already, lower-cased by this function before comparing.
    #[must_use]
    pub fn find_reverse(&self, ptr_name: &str) -> Vec<String> {
        let target = fqdn(ptr_name).to_lowercase();
        let hosts = self.hosts.read();
        hosts
            .values()
            .filter(|host| reverse_form(host.address) == target)
            .map(|host| fqdn(&host.name))
            .collect()
    }

    /// Register a new subscription. Events are delivered in the order the
    /// event loop processes the corresponding mutations.
    ///
    /// # Errors
    ///
    /// Returns [`DockhoundError::StoreClosed`] if the event loop has shut
    /// down.
    pub async fn subscribe(&self) -> DockhoundResult<Subscription> {
        let (add_tx, add_rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        let (remove_tx, remove_rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        let (reply_tx, reply_rx) = oneshot::channel();

        self.commands
            .send(Command::Subscribe {
                add_tx,
                remove_tx,
                reply: reply_tx,
            })
            .await
            .map_err(|_| DockhoundError::StoreClosed)?;

        let id = reply_rx.await.map_err(|_| DockhoundError::StoreClosed)?;

        Ok(Subscription {
            id,
            commands: self.commands.clone(),
            on_add: add_rx,
            on_remove: remove_rx,
        })
    }
}

/// `name` with exactly one trailing dot.
#[must_use]
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_owned()
    } else {
        format!("{name}.")
    }
}

/// The `.in-addr.arpa.` reverse form of an IPv4 address, e.g.
/// `4.3.2.1.in-addr.arpa.` for `1.2.3.4`.
#[must_use]
pub fn reverse_form(addr: std::net::Ipv4Addr) -> String {
    let [a, b, c, d] = addr.octets();
    format!("{d}.{c}.{b}.{a}.in-addr.arpa.")
}

struct Subscriber {
    id: u64,
    add_tx: mpsc::Sender<Host>,
    remove_tx: mpsc::Sender<HostId>,
}

async fn run(mut commands: mpsc::Receiver<Command>, hosts: Arc<RwLock<HashMap<HostId, Host>>>) {
    let mut subscribers: Vec<Subscriber> = Vec::new();
    let mut next_id: u64 = 0;

    while let Some(command) = commands.recv().await {
        match command {
            Command::Add(host) => {
                let inserted = {
                    let mut map = hosts.write();
                    if map.contains_key(&host.id) {
                        false
                    } else {
                        map.insert(host.id.clone(), host.clone());
                        true
                    }
                };
                if inserted {
                    publish_add(&mut subscribers, host).await;
                }
            }
            Command::Remove(id) => {
                let removed = hosts.write().remove(&id).is_some();
                if removed {
                    publish_remove(&mut subscribers, id).await;
                }
            }
            Command::Subscribe {
                add_tx,
                remove_tx,
                reply,
            } => {
                let id = next_id;
                next_id += 1;
                subscribers.push(Subscriber {
                    id,
                    add_tx,
                    remove_tx,
                });
                // The only way this fails is the caller dropping the
                // subscription future before it resolved; nothing to clean
                // up since no channel halves escaped to it.
                let _ = reply.send(id);
            }
            Command::Unsubscribe(id) => {
                subscribers.retain(|s| s.id != id);
            }
        }
    }
}

/// Publish an add event to every current subscriber, in registration order.
/// A full channel backpressures the whole loop by design (spec §4.1); a
/// subscriber whose receiver has been dropped is pruned instead of treated
/// as an error, so a forgetful subscriber can't wedge the loop forever.
async fn publish_add(subscribers: &mut Vec<Subscriber>, host: Host) {
    let mut i = 0;
    while i < subscribers.len() {
        if subscribers[i].add_tx.send(host.clone()).await.is_err() {
            tracing::debug!(id = subscribers[i].id, "subscriber gone, pruning");
            subscribers.remove(i);
        } else {
            i += 1;
        }
    }
}

async fn publish_remove(subscribers: &mut Vec<Subscriber>, id: HostId) {
    let mut i = 0;
    while i < subscribers.len() {
        if subscribers[i].remove_tx.send(id.clone()).await.is_err() {
            tracing::debug!(id = subscribers[i].id, "subscriber gone, pruning");
            subscribers.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Projection of a [`Host`] used by the public read views (HTTP/WebSocket
/// façade): global-unicast-filtered, keyed by id, with internal fields
/// dropped.
#[must_use]
pub fn public_view(hosts: &HashMap<HostId, Host>) -> HashMap<HostId, Host> {
    hosts
        .iter()
        .filter(|(_, host)| is_global_unicast(host.address))
        .map(|(id, host)| (id.clone(), host.clone()))
        .collect()
}
