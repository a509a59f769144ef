// SPDX-License-Identifier: GPL-3.0-only

//! Single-slot "latest value" channel
//!
//! Detections are produced asynchronously and consumed once per frame tick.
//! Only the newest value matters: publishing overwrites whatever the frame
//! loop has not read yet, and reading never drains the slot, so the last
//! detection stays visible until a newer one replaces it.

use tokio::sync::watch;

/// Producer half
#[derive(Debug, Clone)]
pub struct LatestSender<T> {
    tx: watch::Sender<Option<T>>,
}

/// Consumer half
#[derive(Debug, Clone)]
pub struct LatestReceiver<T> {
    rx: watch::Receiver<Option<T>>,
}

/// Create an empty slot
pub fn latest_slot<T>() -> (LatestSender<T>, LatestReceiver<T>) {
    let (tx, rx) = watch::channel(None);
    (LatestSender { tx }, LatestReceiver { rx })
}

impl<T> LatestSender<T> {
    /// Replace the slot contents
    ///
    /// Returns `false` once every receiver is gone.
    pub fn publish(&self, value: T) -> bool {
        self.tx.send_replace(Some(value));
        !self.tx.is_closed()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T: Clone> LatestReceiver<T> {
    /// Most recent value, whether or not it was read before
    pub fn latest(&mut self) -> Option<T> {
        self.rx.borrow_and_update().clone()
    }

    /// Most recent value, only if it arrived since the last read
    pub fn fresh(&mut self) -> Option<T> {
        if self.rx.has_changed().unwrap_or(false) {
            self.latest()
        } else {
            None
        }
    }

    /// Wait for the next publish
    ///
    /// Returns `false` when the sender is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_reads_none() {
        let (_tx, mut rx) = latest_slot::<u32>();
        assert_eq!(rx.latest(), None);
        assert_eq!(rx.fresh(), None);
    }

    #[test]
    fn test_newest_value_wins() {
        let (tx, mut rx) = latest_slot();
        tx.publish(1);
        tx.publish(2);
        tx.publish(3);
        assert_eq!(rx.latest(), Some(3));
    }

    #[test]
    fn test_value_persists_across_reads() {
        let (tx, mut rx) = latest_slot();
        tx.publish("hand");
        assert_eq!(rx.fresh(), Some("hand"));
        assert_eq!(rx.fresh(), None);
        assert_eq!(rx.latest(), Some("hand"));
    }

    #[test]
    fn test_publish_reports_closed() {
        let (tx, rx) = latest_slot();
        assert!(tx.publish(1));
        drop(rx);
        assert!(!tx.publish(2));
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_changed_wakes_on_publish() {
        let (tx, mut rx) = latest_slot();
        let handle = tokio::spawn(async move {
            tx.publish(7u8);
        });
        assert!(rx.changed().await);
        assert_eq!(rx.latest(), Some(7));
        handle.await.unwrap();
    }
}
