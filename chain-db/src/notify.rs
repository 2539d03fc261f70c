//! Persistence notification
//!
//! After a block is committed every registered observer is called in
//! registration order, then every channel subscriber receives the block.
//! Delivery happens on the committing thread before `add_block` returns.

use chain_core::Block;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Callback invoked with each committed block
pub trait PersistObserver: Send + Sync {
    fn on_persist(&self, block: &Block);
}

impl<F> PersistObserver for F
where
    F: Fn(&Block) + Send + Sync,
{
    fn on_persist(&self, block: &Block) {
        self(block)
    }
}

/// Fan-out of commit events
#[derive(Default)]
pub struct PersistNotifier {
    observers: RwLock<Vec<Arc<dyn PersistObserver>>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Arc<Block>>>>,
}

impl PersistNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous observer
    pub fn register(&self, observer: Arc<dyn PersistObserver>) {
        self.observers.write().push(observer);
    }

    /// Subscribe to committed blocks over a channel
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Arc<Block>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Deliver `block` to observers and subscribers. Subscribers whose
    /// receiver is gone are dropped.
    pub fn notify(&self, block: &Block) {
        let observers: Vec<Arc<dyn PersistObserver>> = self.observers.read().clone();
        for observer in &observers {
            observer.on_persist(block);
        }

        let mut subscribers = self.subscribers.lock();
        if subscribers.is_empty() {
            return;
        }
        let shared = Arc::new(block.clone());
        let before = subscribers.len();
        subscribers.retain(|sender| sender.send(Arc::clone(&shared)).is_ok());
        if subscribers.len() < before {
            debug!(
                "Dropped {} closed persist subscribers",
                before - subscribers.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::genesis_block;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_observers_called_in_order() {
        let notifier = PersistNotifier::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for id in 0..3 {
            let calls = Arc::clone(&calls);
            notifier.register(Arc::new(move |block: &Block| {
                calls.lock().push((id, block.height()));
            }));
        }

        notifier.notify(genesis_block());
        assert_eq!(*calls.lock(), vec![(0, 0), (1, 0), (2, 0)]);
        assert_eq!(notifier.observer_count(), 3);
    }

    #[test]
    fn test_subscribers_receive_block() {
        let notifier = PersistNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.notify(genesis_block());
        let block = rx.try_recv().unwrap();
        assert_eq!(block.hash(), genesis_block().hash());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_subscribers_dropped() {
        let notifier = PersistNotifier::new();
        let rx = notifier.subscribe();
        let _kept = notifier.subscribe();
        drop(rx);

        notifier.notify(genesis_block());
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn test_each_notify_delivers_once() {
        let notifier = PersistNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        notifier.register(Arc::new(move |_: &Block| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        notifier.notify(genesis_block());
        notifier.notify(genesis_block());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
