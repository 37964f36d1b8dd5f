//! Hand-off of GPU resource work from any thread to the render thread.
//!
//! Producers are cheap clones that may live on the loader or input threads.
//! The single consumer is `Send` so it can be moved onto the render thread,
//! but not `Sync`: draining is only possible through `&mut` on one thread.

use std::cell::Cell;
use std::marker::PhantomData;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, trace};

/// Create a connected producer/consumer pair.
///
/// `I` is the payload of "needs GPU init" requests, `D` of "needs GPU
/// dispose" requests.
pub fn lifecycle_queue<I, D>() -> (LifecycleProducer<I, D>, LifecycleConsumer<I, D>)
where
    I: Send,
    D: Send,
{
    let (init_tx, init_rx) = unbounded();
    let (dispose_tx, dispose_rx) = unbounded();
    (
        LifecycleProducer {
            init_tx,
            dispose_tx,
        },
        LifecycleConsumer {
            init_rx,
            dispose_rx,
            _not_sync: PhantomData,
        },
    )
}

pub struct LifecycleProducer<I, D> {
    init_tx: Sender<I>,
    dispose_tx: Sender<D>,
}

impl<I, D> Clone for LifecycleProducer<I, D> {
    fn clone(&self) -> Self {
        Self {
            init_tx: self.init_tx.clone(),
            dispose_tx: self.dispose_tx.clone(),
        }
    }
}

impl<I, D> std::fmt::Debug for LifecycleProducer<I, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleProducer")
            .field("pending_init", &self.init_tx.len())
            .field("pending_dispose", &self.dispose_tx.len())
            .finish()
    }
}

impl<I, D> LifecycleProducer<I, D> {
    /// Queue `item` for initialisation. Never blocks. Returns `false` once
    /// the consumer has been dropped; the item is dropped with it.
    pub fn request_init(&self, item: I) -> bool {
        self.init_tx.send(item).is_ok()
    }

    /// Queue `item` for disposal. Ownership moves into the queue, so the
    /// caller can no longer reach it.
    pub fn request_dispose(&self, item: D) -> bool {
        self.dispose_tx.send(item).is_ok()
    }
}

/// Render-thread end of the queue.
pub struct LifecycleConsumer<I, D> {
    init_rx: Receiver<I>,
    dispose_rx: Receiver<D>,
    _not_sync: PhantomData<Cell<()>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    pub initialized: usize,
    pub disposed: usize,
}

impl<I, D> LifecycleConsumer<I, D> {
    /// Run `init` on every queued init request, then `dispose` on every
    /// queued dispose request, in FIFO order within each queue.
    ///
    /// Items enqueued while the drain runs are picked up in the same call.
    pub fn drain(&mut self, mut init: impl FnMut(I), mut dispose: impl FnMut(D)) -> DrainStats {
        self.drain_with(&mut (), |_, item| init(item), |_, item| dispose(item))
    }

    /// Like [`drain`](Self::drain), with a context handed to both callbacks
    /// so they can share mutable state such as the render backend.
    pub fn drain_with<C: ?Sized>(
        &mut self,
        ctx: &mut C,
        mut init: impl FnMut(&mut C, I),
        mut dispose: impl FnMut(&mut C, D),
    ) -> DrainStats {
        let mut stats = DrainStats::default();
        for item in self.init_rx.try_iter() {
            init(ctx, item);
            stats.initialized += 1;
        }
        for item in self.dispose_rx.try_iter() {
            dispose(ctx, item);
            stats.disposed += 1;
        }
        if stats != DrainStats::default() {
            debug!(
                initialized = stats.initialized,
                disposed = stats.disposed,
                "drained lifecycle queues"
            );
        } else {
            trace!("lifecycle queues empty");
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.init_rx.is_empty() && self.dispose_rx.is_empty()
    }
}

impl<I, D> std::fmt::Debug for LifecycleConsumer<I, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleConsumer")
            .field("pending_init", &self.init_rx.len())
            .field("pending_dispose", &self.dispose_rx.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_fifo_order_per_queue() {
        let (tx, mut rx) = lifecycle_queue::<u32, &'static str>();
        tx.request_init(1);
        tx.request_dispose("a");
        tx.request_init(2);
        tx.request_dispose("b");
        tx.request_init(3);

        let mut inits = Vec::new();
        let mut disposals = Vec::new();
        let stats = rx.drain(|i| inits.push(i), |d| disposals.push(d));

        assert_eq!(inits, vec![1, 2, 3]);
        assert_eq!(disposals, vec!["a", "b"]);
        assert_eq!(
            stats,
            DrainStats {
                initialized: 3,
                disposed: 2
            }
        );
        assert!(rx.is_empty());
    }

    #[test]
    fn items_are_delivered_at_most_once() {
        let (tx, mut rx) = lifecycle_queue::<u32, u32>();
        tx.request_init(7);
        let first = rx.drain(|_| {}, |_| {});
        let second = rx.drain(|_| panic!("init twice"), |_| panic!("dispose"));
        assert_eq!(first.initialized, 1);
        assert_eq!(second, DrainStats::default());
    }

    #[test]
    fn producer_reports_closed_consumer() {
        let (tx, rx) = lifecycle_queue::<u32, u32>();
        drop(rx);
        assert!(!tx.request_init(1));
        assert!(!tx.request_dispose(1));
    }
}
