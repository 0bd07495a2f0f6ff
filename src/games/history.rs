//! Bounded per-game round history, newest first.

use crate::games::types::{GameKind, RoundHistoryEntry};
use std::collections::{HashMap, VecDeque};

/// Receiver for settled rounds
pub trait HistorySink {
    fn record(&mut self, entry: RoundHistoryEntry);
}

#[derive(Debug, Clone)]
pub struct RoundHistory {
    retention: usize,
    entries: HashMap<GameKind, VecDeque<RoundHistoryEntry>>,
}

impl RoundHistory {
    pub fn new(retention: usize) -> Self {
        Self {
            retention: retention.max(1),
            entries: HashMap::new(),
        }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn recent(&self, kind: GameKind) -> impl Iterator<Item = &RoundHistoryEntry> {
        self.entries.get(&kind).into_iter().flat_map(|list| list.iter())
    }

    pub fn latest(&self, kind: GameKind) -> Option<&RoundHistoryEntry> {
        self.entries.get(&kind).and_then(|list| list.front())
    }

    pub fn len(&self, kind: GameKind) -> usize {
        self.entries.get(&kind).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(VecDeque::is_empty)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl HistorySink for RoundHistory {
    /// Prepends an entry, dropping the oldest once the game's list is full.
    fn record(&mut self, entry: RoundHistoryEntry) {
        let list = self.entries.entry(entry.config.kind()).or_default();
        list.push_front(entry);
        list.truncate(self.retention);
    }
}
