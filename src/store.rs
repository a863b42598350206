//! Chromosome-scoped retention of representative reads
//!
//! The store maps each duplicate key to the record currently chosen to
//! represent it. The map only ever holds keys from one reference sequence: when
//! a record from another reference arrives, everything retained so far is
//! written out and the map is cleared. With coordinate-sorted input this
//! bounds memory to one chromosome's worth of distinct keys.
//!
//! Output order within a block is the order in which keys were first seen.
//! That order is part of the output contract, which is why the map is an
//! `IndexMap` rather than a `HashMap`.

use std::collections::VecDeque;
use std::io::Write;
use std::num::NonZeroUsize;

use indexmap::IndexMap;

use crate::algorithm::NormalizedKey;
use crate::error::Result;
use crate::io::write_line;
use crate::record::AlignmentRecord;

/// The record currently representing a key and its mean base quality
#[derive(Debug, Clone)]
pub struct RetainedEntry {
    pub record: AlignmentRecord,
    pub score: f64,
}

/// Outcome of offering a record to the store
#[derive(Debug)]
pub enum Decision {
    /// First record seen for its key
    Kept,
    /// The record displaced a lower-quality representative, returned here
    Replaced(AlignmentRecord),
    /// The record is a duplicate of the current representative
    Rejected(AlignmentRecord),
}

#[derive(Debug)]
enum Slot {
    /// Held in the map until the block is flushed
    Held(RetainedEntry),
    /// Held in the output window under this ticket
    Windowed(u64),
    /// Already written; later duplicates can only be rejected
    Emitted,
}

/// Bounded FIFO of the most recently retained records.
///
/// Records stay replaceable while they sit in the window. Once the window is
/// full, pushing a new record evicts the oldest one, which the caller writes
/// out. Tickets are assigned sequentially, so the position of a ticket in the
/// deque is `ticket - evicted`.
#[derive(Debug)]
pub struct OutputWindow {
    entries: VecDeque<(NormalizedKey, RetainedEntry)>,
    capacity: NonZeroUsize,
    evicted: u64,
}

impl OutputWindow {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.get()),
            capacity,
            evicted: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, returning its ticket and the evicted oldest entry if
    /// the window was full.
    pub fn push(
        &mut self,
        key: NormalizedKey,
        entry: RetainedEntry,
    ) -> (u64, Option<(NormalizedKey, RetainedEntry)>) {
        let evicted = if self.entries.len() == self.capacity.get() {
            self.evicted += 1;
            self.entries.pop_front()
        } else {
            None
        };
        let ticket = self.evicted + self.entries.len() as u64;
        self.entries.push_back((key, entry));
        (ticket, evicted)
    }

    pub fn get_mut(&mut self, ticket: u64) -> Option<&mut RetainedEntry> {
        let idx = ticket.checked_sub(self.evicted)?;
        self.entries.get_mut(idx as usize).map(|(_, entry)| entry)
    }

    /// Remove every entry, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = (NormalizedKey, RetainedEntry)> + '_ {
        self.evicted += self.entries.len() as u64;
        self.entries.drain(..)
    }
}

#[derive(Debug)]
pub struct RetentionStore {
    retained: IndexMap<NormalizedKey, Slot>,
    current_reference: Option<String>,
    quality_aware: bool,
    window: Option<OutputWindow>,
    written: u64,
}

impl RetentionStore {
    pub fn new(quality_aware: bool, window: Option<NonZeroUsize>) -> Self {
        Self {
            retained: IndexMap::new(),
            current_reference: None,
            quality_aware,
            window: window.map(OutputWindow::new),
            written: 0,
        }
    }

    /// Number of keys tracked for the current reference block
    pub fn len(&self) -> usize {
        self.retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    pub fn current_reference(&self) -> Option<&str> {
        self.current_reference.as_deref()
    }

    /// Records written to the primary output so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Offer a record under `key`. Crossing into a new reference block flushes
    /// the previous block to `out` before the record is evaluated.
    pub fn observe<W: Write>(
        &mut self,
        key: NormalizedKey,
        record: AlignmentRecord,
        score: f64,
        out: &mut W,
    ) -> Result<Decision> {
        if self.current_reference.as_deref() != Some(key.reference.as_str()) {
            if self.current_reference.is_some() {
                self.flush_block(out)?;
                self.drain_window(out)?;
            }
            self.current_reference = Some(key.reference.clone());
        }

        let entry = RetainedEntry { record, score };
        let slot = match self.retained.get_mut(&key) {
            Some(slot) => slot,
            None => {
                self.insert(key, entry, out)?;
                return Ok(Decision::Kept);
            }
        };

        if !self.quality_aware {
            return Ok(Decision::Rejected(entry.record));
        }

        let current = match slot {
            Slot::Held(current) => Some(current),
            Slot::Windowed(ticket) => self.window.as_mut().and_then(|w| w.get_mut(*ticket)),
            Slot::Emitted => None,
        };
        match current {
            Some(current) if entry.score > current.score => {
                let previous = std::mem::replace(current, entry);
                Ok(Decision::Replaced(previous.record))
            }
            _ => Ok(Decision::Rejected(entry.record)),
        }
    }

    fn insert<W: Write>(
        &mut self,
        key: NormalizedKey,
        entry: RetainedEntry,
        out: &mut W,
    ) -> Result<()> {
        let Some(window) = self.window.as_mut() else {
            self.retained.insert(key, Slot::Held(entry));
            return Ok(());
        };

        let (ticket, evicted) = window.push(key.clone(), entry);
        self.retained.insert(key, Slot::Windowed(ticket));
        if let Some((old_key, old)) = evicted {
            write_line(out, old.record.line().as_bytes())?;
            self.written += 1;
            if let Some(slot) = self.retained.get_mut(&old_key) {
                *slot = Slot::Emitted;
            }
        }
        Ok(())
    }

    /// Write every record held in the map, in first-seen key order, and clear
    /// the map. Windowed records are left for `drain_window`.
    pub fn flush_block<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let mut flushed = 0u64;
        for (_, slot) in self.retained.drain(..) {
            if let Slot::Held(entry) = slot {
                write_line(out, entry.record.line().as_bytes())?;
                flushed += 1;
            }
        }
        self.written += flushed;
        if let Some(reference) = &self.current_reference {
            log::debug!("flushed {flushed} records for reference {reference}");
        }
        Ok(())
    }

    /// Write every record still in the output window, oldest first.
    pub fn drain_window<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let Some(window) = self.window.as_mut().filter(|w| !w.is_empty()) else {
            return Ok(());
        };
        for (_, entry) in window.drain() {
            write_line(out, entry.record.line().as_bytes())?;
            self.written += 1;
        }
        Ok(())
    }

    /// Terminal flush at end of input.
    pub fn finish<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.flush_block(out)?;
        self.drain_window(out)?;
        self.current_reference = None;
        Ok(())
    }
}
