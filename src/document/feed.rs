use std::sync::mpsc::{self, Receiver, Sender};

use super::Document;

/// Fan-out of confirmed document changes.
///
/// Each subscriber gets its own channel. A subscriber that has been
/// dropped is pruned on the next publish, so teardown never needs an
/// explicit unsubscribe call.
#[derive(Debug, Default)]
pub struct ChangeFeed {
    subscribers: Vec<Sender<Document>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        Subscription { rx }
    }

    /// Deliver `document` to every live subscriber.
    pub fn publish(&mut self, document: &Document) {
        self.subscribers
            .retain(|tx| tx.send(document.clone()).is_ok());
    }

    /// Subscribers still registered (dropped ones linger until the next publish).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Receiving end of a [`ChangeFeed`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<Document>,
}

impl Subscription {
    /// Drain pending changes and return the newest one.
    ///
    /// Intermediate values are skipped, so a consumer that falls behind
    /// only ever renders the most recent confirmed document.
    pub fn latest(&self) -> Option<Document> {
        self.rx.try_iter().last()
    }

    /// Drain every pending change in confirmation order.
    pub fn drain(&self) -> Vec<Document> {
        self.rx.try_iter().collect()
    }
}
