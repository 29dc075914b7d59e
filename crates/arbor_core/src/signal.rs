//! Typed Publish/Subscribe Signals
//!
//! A [`Signal`] is a synchronous, multi-subscriber notification channel.
//! Subscribers are invoked in connection order and receive a mutable
//! dispatch context `C` together with the argument record `A`:
//!
//! ```rust,ignore
//! let signal: Signal<Vec<u32>, u32> = Signal::new();
//! let slot = signal.connect(|log, value| log.push(*value));
//!
//! let mut log = Vec::new();
//! signal.execute(&mut log, &7);
//! assert_eq!(log, vec![7]);
//!
//! drop(slot); // disconnects
//! ```
//!
//! # Dispatch Contract
//!
//! Dispatch takes a snapshot of the subscriber list before the first
//! handler runs. Handlers connected during a dispatch are not called by
//! that dispatch; handlers disconnected during a dispatch are still called
//! by it. Re-entrant dispatch of the same signal from inside a handler is
//! allowed.
//!
//! # Slots
//!
//! [`Signal::connect`] returns a [`SignalSlot`]. Dropping the slot (or
//! calling [`SignalSlot::disconnect`]) removes exactly that subscriber.
//! A slot that outlives its signal disconnects as a no-op.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

/// A subscriber callback.
pub type Handler<C, A> = Rc<dyn Fn(&mut C, &A)>;

/// Snapshot of the subscribers of a signal at a given instant.
pub type Subscribers<C, A> = SmallVec<[Handler<C, A>; 4]>;

struct Subscriber<C: ?Sized, A> {
    id: u64,
    handler: Handler<C, A>,
}

struct SubscriberList<C: ?Sized, A> {
    next_id: u64,
    entries: Vec<Subscriber<C, A>>,
}

/// Type-erased removal so a [`SignalSlot`] does not carry the signal's type.
trait Disconnect {
    fn disconnect(&self, id: u64);
}

impl<C: ?Sized, A> Disconnect for RefCell<SubscriberList<C, A>> {
    fn disconnect(&self, id: u64) {
        // The handler may own slots of this same list; drop it unborrowed.
        let removed = {
            let mut list = self.borrow_mut();
            list.entries
                .iter()
                .position(|s| s.id == id)
                .map(|i| list.entries.remove(i))
        };
        drop(removed);
    }
}

/// A synchronous notification channel with ordered subscribers.
pub struct Signal<C: ?Sized, A> {
    subscribers: Rc<RefCell<SubscriberList<C, A>>>,
}

impl<C: ?Sized + 'static, A: 'static> Signal<C, A> {
    /// Creates a signal with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(SubscriberList {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Appends a subscriber and returns the slot that keeps it connected.
    #[must_use = "dropping the slot disconnects the handler immediately"]
    pub fn connect<F>(&self, handler: F) -> SignalSlot
    where
        F: Fn(&mut C, &A) + 'static,
    {
        let id = {
            let mut list = self.subscribers.borrow_mut();
            let id = list.next_id;
            list.next_id += 1;
            list.entries.push(Subscriber {
                id,
                handler: Rc::new(handler),
            });
            id
        };

        let weak: Weak<RefCell<SubscriberList<C, A>>> = Rc::downgrade(&self.subscribers);
        let list: Weak<dyn Disconnect> = weak;
        SignalSlot {
            id,
            list: Some(list),
        }
    }

    /// Invokes every subscriber connected at call time, in connection order.
    pub fn execute(&self, ctx: &mut C, args: &A) {
        for handler in self.subscribers() {
            handler(ctx, args);
        }
    }

    /// Returns a snapshot of the current subscribers.
    ///
    /// Used when the signal lives inside the context that is handed to the
    /// handlers: take the snapshot, release the borrow, then call each one.
    #[must_use]
    pub fn subscribers(&self) -> Subscribers<C, A> {
        self.subscribers
            .borrow()
            .entries
            .iter()
            .map(|s| Rc::clone(&s.handler))
            .collect()
    }

    /// Number of connected subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Disconnects every subscriber. Outstanding slots become no-ops.
    pub fn clear(&self) {
        let old = std::mem::take(&mut self.subscribers.borrow_mut().entries);
        drop(old);
    }
}

impl<C: ?Sized + 'static, A: 'static> Default for Signal<C, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized, A> fmt::Debug for Signal<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscribers.borrow().entries.len())
            .finish()
    }
}

/// Disconnect handle returned by [`Signal::connect`].
///
/// The subscriber stays connected for as long as the slot is alive.
#[must_use = "dropping the slot disconnects the handler immediately"]
pub struct SignalSlot {
    id: u64,
    list: Option<Weak<dyn Disconnect>>,
}

impl SignalSlot {
    /// Removes the subscriber. Calling this more than once is harmless.
    pub fn disconnect(&mut self) {
        if let Some(list) = self.list.take()
            && let Some(list) = list.upgrade()
        {
            list.disconnect(self.id);
        }
    }

    /// Whether this slot still refers to a live subscriber list.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.list.as_ref().is_some_and(|l| l.strong_count() > 0)
    }

    /// Consumes the slot while leaving the subscriber connected for the
    /// remaining lifetime of the signal.
    pub fn detach(mut self) {
        self.list = None;
    }
}

impl Drop for SignalSlot {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for SignalSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalSlot")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}
