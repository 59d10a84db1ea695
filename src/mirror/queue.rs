//! Per-window serialization of mirrored mutations.
//!
//! At most one batch is in flight. While it is, the window that started it
//! may keep appending to a single continuation batch that runs next; any
//! other window's events are refused.

use super::event::{Dispatch, PendingMutation};
use crate::window::WindowId;

#[derive(Debug)]
struct Batch {
    origin: WindowId,
    events: Vec<PendingMutation>,
}

#[derive(Debug, Default)]
pub struct MirrorQueue {
    in_flight: Option<Batch>,
    /// Origin of the batch handed out by `begin`, until `complete`
    running: Option<WindowId>,
    continuation: Option<Batch>,
}

impl MirrorQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window whose mutations are currently being mirrored
    pub fn busy_with(&self) -> Option<WindowId> {
        self.running
            .or_else(|| self.in_flight.as_ref().map(|b| b.origin))
    }

    pub fn is_idle(&self) -> bool {
        self.busy_with().is_none() && self.continuation.is_none()
    }

    pub fn accepts(&self, origin: WindowId) -> bool {
        self.busy_with().is_none_or(|busy| busy == origin)
    }

    pub fn admit(&mut self, pending: PendingMutation) -> Dispatch {
        let origin = pending.origin;
        match self.busy_with() {
            None => {
                self.in_flight = Some(Batch {
                    origin,
                    events: vec![pending],
                });
                Dispatch::Started
            }
            Some(busy) if busy == origin => {
                match self.in_flight.as_mut() {
                    // Not handed out yet: still part of the first batch
                    Some(batch) if self.running.is_none() => batch.events.push(pending),
                    _ => self
                        .continuation
                        .get_or_insert_with(|| Batch {
                            origin,
                            events: Vec::new(),
                        })
                        .events
                        .push(pending),
                }
                Dispatch::Queued
            }
            Some(_) => Dispatch::Dropped,
        }
    }

    /// Hand out the in-flight batch. The origin stays busy until `complete`.
    pub fn begin(&mut self) -> Option<Vec<PendingMutation>> {
        if self.running.is_some() {
            return None;
        }
        let batch = self.in_flight.take()?;
        self.running = Some(batch.origin);
        Some(batch.events)
    }

    /// Finish the running batch; the continuation, if any, becomes in flight.
    pub fn complete(&mut self) {
        self.running = None;
        self.in_flight = self.continuation.take();
    }

    /// Number of events waiting (in flight but not begun, plus continuation)
    pub fn pending_len(&self) -> usize {
        self.in_flight.as_ref().map_or(0, |b| b.events.len())
            + self.continuation.as_ref().map_or(0, |b| b.events.len())
    }

    /// Discard everything queued by a window that went away
    pub fn forget(&mut self, origin: WindowId) {
        if self.in_flight.as_ref().is_some_and(|b| b.origin == origin) && self.running.is_none() {
            self.in_flight = None;
        }
        if self.continuation.as_ref().is_some_and(|b| b.origin == origin) {
            self.continuation = None;
        }
    }
}
