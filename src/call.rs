//! Per-trunk call table and CRV allocator.
//!
//! Mirrors `struct Q931_Call` and the `Q931CreateCRV`/`Q931AllocateCRV`/
//! `Q931ReleaseCRV` functions: a fixed-capacity table of call slots keyed by
//! CRV, plus a monotonic per-trunk counter that hands out fresh values.
//! Unlike the original's `L3INT callIndex` out-parameter plus global error
//! code, allocation returns a typed [`CallIndex`] or a [`Q931Error`].

use crate::error::{Q931Error, Result};
use crate::types::{BChannel, CallIndex, Crv, Tei};

/// One call's tracked state within a trunk's call table.
///
/// `state` is a bare `u16` here (not the dialect-specific `CallState` enum
/// in [`crate::state`]) because the table itself is dialect-agnostic; the
/// state engine interprets the value, the call table just stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallEntry {
    pub in_use: bool,
    pub crv: Crv,
    pub tei: Tei,
    pub b_channel: BChannel,
    pub state: u16,
    pub timer_id: u16,
    /// Absolute deadline in milliseconds, per the host's `get_time_ms`
    /// clock. Meaningless while `timer_id == 0`.
    pub timer_deadline_ms: u64,
    /// Number of times the release-timer (T308) expiry has already retried
    /// a RELEASE on this call. Spec.md §4.5/§8 scenario 3: the first T308
    /// expiry resends RELEASE and re-arms the timer; the second forces the
    /// call idle.
    pub release_retries: u8,
}

impl CallEntry {
    const fn idle() -> Self {
        CallEntry {
            in_use: false,
            crv: Crv::GLOBAL,
            tei: Tei::new(0),
            b_channel: BChannel::UNASSIGNED,
            state: 0,
            timer_id: 0,
            timer_deadline_ms: 0,
            release_retries: 0,
        }
    }
}

impl Default for CallEntry {
    fn default() -> Self {
        CallEntry::idle()
    }
}

/// Fixed-capacity call table plus the CRV counter for one trunk.
///
/// Capacity is a construction-time parameter rather than the original's
/// `Q931MAXCALLPERTRUNK` compile-time constant, so BRI (small) and PRI
/// (large) trunks can size their table independently.
#[derive(Debug, Clone)]
pub struct CallTable {
    entries: Vec<CallEntry>,
    last_crv: u16,
    max_crv: u16,
}

impl CallTable {
    pub fn new(capacity: usize, max_crv: u16) -> Self {
        CallTable {
            entries: vec![CallEntry::idle(); capacity],
            last_crv: 0,
            max_crv,
        }
    }

    /// Table sized for a PRI trunk: CRV wraps at 2^15-1.
    pub fn pri(capacity: usize) -> Self {
        CallTable::new(capacity, Crv::MAX_PRI)
    }

    /// Table sized for a BRI trunk: CRV wraps at 2^7-1.
    pub fn bri(capacity: usize) -> Self {
        CallTable::new(capacity, Crv::MAX_BRI)
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Marks a free slot in use for `crv`, tei unset, state/timer/B-channel
    /// reset to idle defaults. Returns `TooManyCalls` if the table is full.
    pub fn allocate(&mut self, crv: Crv) -> Result<CallIndex> {
        let slot = self
            .entries
            .iter()
            .position(|e| !e.in_use)
            .ok_or(Q931Error::TooManyCalls)?;
        self.entries[slot] = CallEntry {
            in_use: true,
            crv,
            tei: Tei::default(),
            b_channel: BChannel::UNASSIGNED,
            state: 0,
            timer_id: 0,
            timer_deadline_ms: 0,
            release_retries: 0,
        };
        Ok(CallIndex(slot))
    }

    /// Mints the next unique CRV for this trunk, then allocates a slot for
    /// it. The flag is always `false` here: the allocating side is always
    /// the originator of a freshly minted CRV.
    pub fn create(&mut self) -> Result<(Crv, CallIndex)> {
        let next = if self.last_crv >= self.max_crv {
            1
        } else {
            self.last_crv + 1
        };
        self.last_crv = next;
        let crv = Crv::new(next, false);
        let index = self.allocate(crv)?;
        Ok((crv, index))
    }

    /// Linear scan for the in-use entry with the given CRV.
    pub fn find(&self, crv: Crv) -> Result<CallIndex> {
        self.entries
            .iter()
            .position(|e| e.in_use && e.crv == crv)
            .map(CallIndex)
            .ok_or(Q931Error::InvalidCrv(crv))
    }

    /// Frees the slot for `crv`. Idempotent: releasing an already-idle or
    /// unknown CRV is not an error.
    pub fn release(&mut self, crv: Crv) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.in_use && e.crv == crv) {
            *e = CallEntry::idle();
        }
    }

    pub fn get(&self, index: CallIndex) -> Option<&CallEntry> {
        self.entries.get(index.0).filter(|e| e.in_use)
    }

    pub fn get_mut(&mut self, index: CallIndex) -> Option<&mut CallEntry> {
        self.entries.get_mut(index.0).filter(|e| e.in_use)
    }

    /// Iterates the in-use entries along with their index, for RESTART and
    /// timer-tick sweeps.
    pub fn in_use(&self) -> impl Iterator<Item = (CallIndex, &CallEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.in_use)
            .map(|(i, e)| (CallIndex(i), e))
    }

    pub fn in_use_mut(&mut self) -> impl Iterator<Item = (CallIndex, &mut CallEntry)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter(|(_, e)| e.in_use)
            .map(|(i, e)| (CallIndex(i), e))
    }

    /// Resets every in-use entry to idle, freeing their B-channels, without
    /// touching `last_crv`. Used by global RESTART handling.
    pub fn release_all(&mut self) {
        for e in self.entries.iter_mut() {
            if e.in_use {
                *e = CallEntry::idle();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_find_roundtrip() {
        let mut t = CallTable::pri(4);
        let crv = Crv::new(7, false);
        let idx = t.allocate(crv).unwrap();
        assert_eq!(t.find(crv).unwrap(), idx);
        assert_eq!(t.get(idx).unwrap().state, 0);
        assert_eq!(t.get(idx).unwrap().b_channel, BChannel::UNASSIGNED);
    }

    #[test]
    fn too_many_calls() {
        let mut t = CallTable::pri(1);
        t.allocate(Crv::new(1, false)).unwrap();
        assert_eq!(t.allocate(Crv::new(2, false)), Err(Q931Error::TooManyCalls));
    }

    #[test]
    fn create_assigns_distinct_monotonic_crvs() {
        let mut t = CallTable::pri(4);
        let (crv1, _) = t.create().unwrap();
        let (crv2, _) = t.create().unwrap();
        assert_ne!(crv1, crv2);
        assert_eq!(crv1.value(), 1);
        assert_eq!(crv2.value(), 2);
    }

    #[test]
    fn create_wraps_at_bri_limit() {
        let mut t = CallTable::bri(200);
        t.last_crv = Crv::MAX_BRI;
        let (crv, _) = t.create().unwrap();
        assert_eq!(crv.value(), 1);
    }

    #[test]
    fn find_missing_crv_is_invalid_crv() {
        let t = CallTable::pri(4);
        assert_eq!(t.find(Crv::new(9, false)), Err(Q931Error::InvalidCrv(Crv::new(9, false))));
    }

    #[test]
    fn release_is_idempotent() {
        let mut t = CallTable::pri(2);
        let crv = Crv::new(3, false);
        let idx = t.allocate(crv).unwrap();
        t.release(crv);
        t.release(crv);
        assert!(t.get(idx).is_none());
        assert!(t.find(crv).is_err());
    }

    #[test]
    fn release_all_clears_every_in_use_slot() {
        let mut t = CallTable::pri(4);
        t.allocate(Crv::new(1, false)).unwrap();
        t.allocate(Crv::new(2, false)).unwrap();
        t.release_all();
        assert_eq!(t.in_use().count(), 0);
    }
}
