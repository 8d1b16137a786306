//! Stale-response protection.
//!
//! Each fetch takes a [`GenerationTicket`] before it starts. When it finishes
//! it may only publish its result if no newer fetch has begun since; slower,
//! older responses are discarded instead of overwriting fresher data.
//!
//! # Example
//!
//! ```rust
//! use board_ingestion::Latest;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let latest: Latest<Vec<u32>> = Latest::new();
//!
//! let slow = latest.begin();
//! let fast = latest.begin();
//!
//! assert!(latest.publish(fast, vec![2]).await);
//! // The older fetch finished last; its result is dropped.
//! assert!(!latest.publish(slow, vec![1]).await);
//! assert_eq!(*latest.get().await.unwrap(), vec![2]);
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Identifies one fetch. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationTicket(u64);

impl GenerationTicket {
    /// Raw counter value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonically increasing fetch counter.
#[derive(Debug, Default)]
pub struct Generation {
    counter: AtomicU64,
}

impl Generation {
    /// Counter starting at zero; the first ticket is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch, invalidating every earlier ticket.
    pub fn begin(&self) -> GenerationTicket {
        GenerationTicket(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently issued ticket.
    pub fn current(&self) -> GenerationTicket {
        GenerationTicket(self.counter.load(Ordering::SeqCst))
    }

    /// True if no fetch has begun since `ticket` was issued.
    pub fn is_current(&self, ticket: GenerationTicket) -> bool {
        self.current() == ticket
    }
}

/// The latest published value, tagged with the ticket that produced it.
#[derive(Debug)]
pub struct Latest<T> {
    generation: Generation,
    slot: RwLock<Option<(GenerationTicket, Arc<T>)>>,
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self {
            generation: Generation::new(),
            slot: RwLock::new(None),
        }
    }
}

impl<T> Latest<T> {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch whose result will go into this slot.
    pub fn begin(&self) -> GenerationTicket {
        self.generation.begin()
    }

    /// True if `ticket` still belongs to the newest fetch.
    pub fn is_current(&self, ticket: GenerationTicket) -> bool {
        self.generation.is_current(ticket)
    }

    /// Store `value` if `ticket` is still current.
    ///
    /// Returns false, leaving the slot untouched, when a newer fetch has
    /// begun in the meantime.
    pub async fn publish(&self, ticket: GenerationTicket, value: T) -> bool {
        self.publish_shared(ticket, Arc::new(value)).await
    }

    /// [`publish`](Self::publish) for a value the caller keeps a handle to.
    pub async fn publish_shared(&self, ticket: GenerationTicket, value: Arc<T>) -> bool {
        let mut slot = self.slot.write().await;
        if !self.generation.is_current(ticket) {
            tracing::warn!(
                "Discarding stale result from generation {} (current is {})",
                ticket.value(),
                self.generation.current().value()
            );
            return false;
        }
        *slot = Some((ticket, value));
        true
    }

    /// The latest published value, if any.
    pub async fn get(&self) -> Option<Arc<T>> {
        self.slot.read().await.as_ref().map(|(_, value)| Arc::clone(value))
    }

    /// The latest published value with the ticket that produced it.
    pub async fn get_with_ticket(&self) -> Option<(GenerationTicket, Arc<T>)> {
        self.slot.read().await.clone()
    }

    /// Returns true if nothing has been published yet.
    pub async fn is_empty(&self) -> bool {
        self.slot.read().await.is_none()
    }
}
