// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Mutex, PoisonError};

/// Which slice of the ledger changed. Events carry no payload on purpose:
/// subscribers re-read the store instead of trusting a snapshot that may
/// already be stale by the time it is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Wallets,
    Transactions,
    Transfers,
    ScheduledTransfers,
}

/// Fan-out for change signals. Mutating operations take a `&ChangeBus`
/// explicitly; there is no process-global bus. Publishing after a failed
/// validation is a bug, so operations only publish once their write has
/// committed.
#[derive(Default)]
pub struct ChangeBus {
    subscribers: Mutex<Vec<Sender<Change>>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and returns its receiving end.
    pub fn subscribe(&self) -> Receiver<Change> {
        let (tx, rx) = channel();
        self.lock().push(tx);
        rx
    }

    /// Best-effort delivery. Subscribers whose receiver has been dropped are
    /// pruned here rather than on subscribe.
    pub fn publish(&self, change: Change) {
        self.lock().retain(|tx| tx.send(change).is_ok());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<Change>>> {
        // A poisoned lock only means another thread panicked mid-push; the
        // Vec itself is still sound to use.
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_receive_published_changes() {
        let bus = ChangeBus::new();
        let rx = bus.subscribe();
        bus.publish(Change::Wallets);
        bus.publish(Change::Transfers);
        assert_eq!(rx.try_recv(), Ok(Change::Wallets));
        assert_eq!(rx.try_recv(), Ok(Change::Transfers));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = ChangeBus::new();
        let rx = bus.subscribe();
        drop(rx);
        // Must not error or deliver to the dead channel.
        bus.publish(Change::Transactions);
        let rx2 = bus.subscribe();
        bus.publish(Change::Transactions);
        assert_eq!(rx2.try_recv(), Ok(Change::Transactions));
    }
}
