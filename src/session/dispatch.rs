// SPDX-License-Identifier: GPL-3.0-only

//! Fire-and-forget classification requests
//!
//! Each request runs as its own tokio task. Replies come back over a channel
//! that the frame loop drains once per tick, so the session is only ever
//! mutated from the loop.

use crate::errors::ClassifyError;
use crate::session::{ClassifyTicket, SketchSession};
use crate::sketch::{Classification, SketchClassifier};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::debug;

/// A finished classification
#[derive(Debug)]
pub struct ClassifyReply {
    pub ticket: ClassifyTicket,
    pub result: Result<Vec<Classification>, ClassifyError>,
}

/// Spawns classification tasks and collects their replies
pub struct ClassifyDispatcher {
    classifier: Arc<dyn SketchClassifier>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<ClassifyReply>,
    rx: mpsc::UnboundedReceiver<ClassifyReply>,
}

impl ClassifyDispatcher {
    pub fn new(classifier: Arc<dyn SketchClassifier>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            classifier,
            runtime,
            tx,
            rx,
        }
    }

    /// Snapshot the session's surface and classify it in the background
    pub fn request(&self, session: &mut SketchSession) -> ClassifyTicket {
        let (ticket, snapshot) = session.begin_classification();
        let future = self.classifier.classify(snapshot);
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            let result = future.await;
            // The loop may have shut down in the meantime
            if tx.send(ClassifyReply { ticket, result }).is_err() {
                debug!(sequence = ticket.sequence(), "Reply dropped, dispatcher gone");
            }
        });

        ticket
    }

    /// Apply every reply that has arrived; returns how many were applied
    pub fn drain(&mut self, session: &mut SketchSession) -> usize {
        let mut applied = 0;
        while let Ok(reply) = self.rx.try_recv() {
            if session.finish_classification(reply.ticket, reply.result) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next reply and apply it
    ///
    /// Returns whether it changed the status text.
    pub async fn wait_one(&mut self, session: &mut SketchSession) -> bool {
        match self.rx.recv().await {
            Some(reply) => session.finish_classification(reply.ticket, reply.result),
            // Unreachable while `self.tx` is alive
            None => false,
        }
    }
}
