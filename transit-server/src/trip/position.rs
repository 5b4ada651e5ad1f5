//! Positioning feed.
//!
//! The positioning collaborator pushes updates through a watch channel,
//! which holds exactly one value: the controller only ever sees the latest
//! update, and intermediate fixes are discarded (last-write-wins).

use tokio::sync::watch;

use crate::domain::Coordinate;

/// One positioning update.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionUpdate {
    /// A coordinate fix.
    Fix(Coordinate),
    /// A non-fatal positioning failure (unsupported, permission denied...).
    Error(String),
}

/// Sender half of a positioning subscription.
#[derive(Debug, Clone)]
pub struct PositionFeed {
    tx: watch::Sender<Option<PositionUpdate>>,
}

impl PositionFeed {
    /// Create a feed and its subscription receiver.
    pub fn channel() -> (Self, watch::Receiver<Option<PositionUpdate>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }

    /// Push a coordinate fix. Silently dropped once the trip is gone.
    pub fn fix(&self, coord: Coordinate) {
        let _ = self.tx.send(Some(PositionUpdate::Fix(coord)));
    }

    /// Push a positioning failure. Silently dropped once the trip is gone.
    pub fn error(&self, message: impl Into<String>) {
        let _ = self.tx.send(Some(PositionUpdate::Error(message.into())));
    }
}
