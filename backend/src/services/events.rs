//! In-process stock change feed
//!
//! Committed ledger mutations are published here so clients (availability
//! panes, dashboards) can poll for changes instead of re-reading whole
//! tables. The feed is a bounded ring with monotonically increasing sequence
//! numbers; a reader that falls further behind than the ring holds is told
//! to resync from a fresh snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use shared::models::LotKey;

/// What a published ledger mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockEventKind {
    Received,
    Consumed,
    Reversed,
}

/// One committed stock mutation.
#[derive(Debug, Clone, Serialize)]
pub struct StockEvent {
    pub seq: u64,
    pub kind: StockEventKind,
    pub lot: LotKey,
    pub new_quantity: i32,
    pub occurred_at: DateTime<Utc>,
}

/// Page of events returned to a polling reader.
#[derive(Debug, Clone, Serialize)]
pub struct EventPage {
    pub events: Vec<StockEvent>,
    pub latest_seq: u64,
    /// Set when the cursor is unusable: events after it were already evicted,
    /// or it is ahead of the feed entirely. The reader must reload its views
    /// before continuing from `latest_seq`.
    pub resync_required: bool,
}

/// Shared handle to the stock change feed.
#[derive(Clone)]
pub struct StockEvents {
    inner: Arc<RwLock<EventRing>>,
}

struct EventRing {
    next_seq: u64,
    capacity: usize,
    events: VecDeque<StockEvent>,
}

impl StockEvents {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(EventRing {
                next_seq: 1,
                capacity: capacity.max(1),
                events: VecDeque::new(),
            })),
        }
    }

    /// Publish a committed mutation. Call only after the transaction that
    /// performed it has committed; rolled-back work must never appear here.
    pub fn publish(&self, kind: StockEventKind, lot: LotKey, new_quantity: i32) -> u64 {
        let mut ring = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let seq = ring.next_seq;
        ring.next_seq += 1;
        ring.events.push_back(StockEvent {
            seq,
            kind,
            lot,
            new_quantity,
            occurred_at: Utc::now(),
        });
        while ring.events.len() > ring.capacity {
            ring.events.pop_front();
        }
        seq
    }

    /// Events with sequence numbers greater than `after` (0 = from the start).
    ///
    /// A cursor ahead of the feed is treated like one that fell off it: the
    /// feed is process-local, so a future cursor comes from an earlier run
    /// and that reader's views are stale too.
    pub fn since(&self, after: u64) -> EventPage {
        let ring = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let latest_seq = ring.next_seq - 1;
        let resync_required = after > latest_seq
            || match ring.events.front() {
                Some(oldest) => after + 1 < oldest.seq,
                None => after < latest_seq,
            };
        let events = ring
            .events
            .iter()
            .filter(|e| e.seq > after)
            .cloned()
            .collect();
        EventPage {
            events,
            latest_seq,
            resync_required,
        }
    }

    pub fn latest_seq(&self) -> u64 {
        let ring = self.inner.read().unwrap_or_else(|e| e.into_inner());
        ring.next_seq - 1
    }
}
