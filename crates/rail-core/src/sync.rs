//! Rendezvous channel primitives.
//!
//! The whole coordination protocol is built from two shapes:
//!
//! - [`Lane`]: a zero-capacity rendezvous channel.  A blocking send parks
//!   the sender until a receiver takes the value; a [`Lane::try_send`]
//!   succeeds *only* when a receiver is already parked.  That second
//!   property is what makes non-blocking "is anyone serving?" probes
//!   (busy-scan, reservation, repair enqueue) sound: acceptance implies the
//!   counterparty is at its select point right now.
//! - [`Flag`]: a single-slot channel used as a latching signal (`broke`,
//!   `available`).  Setting an already-set flag is a no-op.
//!
//! A [`Baton`] is a `Lane<()>` whose both ends are cloned to every party
//! that may hold an agent "in hand": servers commit to a rendezvous by
//! passing the agent's baton, and the previous holder's parked receive is
//! what gets released.  See the server loop in `rail-sim` for the full
//! handshake.
//!
//! Backed by `flume`, whose zero-capacity channels have exactly these
//! semantics and whose receive futures compose with `tokio::select!`.

use std::fmt;

// ── Closed ────────────────────────────────────────────────────────────────────

/// The counterparty of a channel operation has gone away.
///
/// During a run this never happens (resource and agent tasks live forever);
/// it is observed when a test tears the railway down, and loops treat it as
/// a clean shutdown signal.
#[derive(Debug, PartialEq, Eq)]
pub struct Closed;

impl fmt::Display for Closed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("channel counterparty closed")
    }
}

impl std::error::Error for Closed {}

// ── Lane ──────────────────────────────────────────────────────────────────────

/// A zero-capacity rendezvous channel.
///
/// Both ends are kept together and the whole lane is cloned to every party;
/// flume channels are MPMC, so any holder may take either side.
pub struct Lane<T> {
    tx: flume::Sender<T>,
    rx: flume::Receiver<T>,
}

impl<T> Lane<T> {
    /// Create a rendezvous lane.
    pub fn rendezvous() -> Self {
        let (tx, rx) = flume::bounded(0);
        Self { tx, rx }
    }

    /// Park until a receiver takes `value`.
    pub async fn send(&self, value: T) -> Result<(), Closed> {
        self.tx.send_async(value).await.map_err(|_| Closed)
    }

    /// Hand `value` over only if a receiver is parked right now.
    ///
    /// Returns `false` (dropping `value`) otherwise.
    pub fn try_send(&self, value: T) -> bool {
        self.tx.try_send(value).is_ok()
    }

    /// Park until a sender hands a value over.
    pub async fn recv(&self) -> Result<T, Closed> {
        self.rx.recv_async().await.map_err(|_| Closed)
    }
}

impl<T> Clone for Lane<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> fmt::Debug for Lane<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lane")
    }
}

/// An agent's handshake channel: passed by servers to commit a rendezvous
/// and received by whichever party currently holds the agent.
pub type Baton = Lane<()>;

// ── Flag ──────────────────────────────────────────────────────────────────────

/// A single-slot latching signal.
pub struct Flag {
    tx: flume::Sender<()>,
    rx: flume::Receiver<()>,
}

impl Flag {
    pub fn new() -> Self {
        let (tx, rx) = flume::bounded(1);
        Self { tx, rx }
    }

    /// Latch the flag.  No-op if already latched.
    pub fn arm(&self) {
        let _ = self.tx.try_send(());
    }

    /// Consume the flag if latched.  Returns whether it was.
    pub fn take(&self) -> bool {
        self.rx.try_recv().is_ok()
    }

    /// Park until the flag is latched, consuming it.
    pub async fn wait(&self) -> Result<(), Closed> {
        self.rx.recv_async().await.map_err(|_| Closed)
    }
}

impl Clone for Flag {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Flag")
    }
}
