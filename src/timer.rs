//! T3xx timer subsystem.
//!
//! Grounded on `Q931TimerTick`/`Q931StartTimer`/`Q931StopTimer`: each call
//! slot carries one timer id and an absolute deadline. A per-trunk tick
//! (driven by the host, never an internal thread -- see spec.md §5) walks
//! the call table and fires any call whose deadline has passed. Starting a
//! timer looks its default duration up from the dialect's
//! `(dialect x timer-id) -> duration-ms` table; stopping clears the id only
//! if it still matches, so a late expiry racing a fresh restart can't stomp
//! the new timer.

use crate::call::CallTable;
use crate::dialect::DialectTable;
use crate::error::Result;
use crate::types::CallIndex;

/// Standard Q.931 timer identifiers this engine starts. Dialects may also
/// register additional ids of their own (e.g. a digit-collection timeout)
/// through the same `(dialect, timer_id) -> ms` table.
pub mod ids {
    pub const T301: u16 = 301;
    pub const T303: u16 = 303;
    pub const T305: u16 = 305;
    pub const T308: u16 = 308;
    pub const T309: u16 = 309;
    pub const T313: u16 = 313;
    pub const T322: u16 = 322;
    /// Overlap-dial digit-collection timeout (spec.md §4.8), not part of
    /// the ITU T3xx numbering but registered the same way.
    pub const DIGIT_TIMEOUT: u16 = 900;
}

/// Starts (or restarts) the timer for `call`, using the dialect's default
/// duration for `timer_id`. Overwrites any timer already running on this
/// call, matching the original's "starting a timer just stomps the old
/// one" behaviour -- only *stopping* is guarded against races.
pub fn start(
    table: &mut CallTable,
    dialect: &DialectTable,
    call: CallIndex,
    timer_id: u16,
    now_ms: u64,
) -> Result<()> {
    let default_ms = dialect.timer_default_ms(timer_id).ok_or_else(|| {
        crate::error::Q931Error::Internal(format!("timer {timer_id} has no registered default"))
    })?;
    let entry = table
        .get_mut(call)
        .ok_or_else(|| crate::error::Q931Error::Internal(format!("no call at {call}")))?;
    entry.timer_id = timer_id;
    entry.timer_deadline_ms = now_ms + u64::from(default_ms);
    Ok(())
}

/// Clears the running timer on `call` iff its id matches `timer_id`. A
/// mismatch means a different timer has already been started since, and
/// is silently ignored -- exactly the "stopping clears the id only if it
/// matches" guard spec.md §4.4 calls for.
pub fn stop(table: &mut CallTable, call: CallIndex, timer_id: u16) {
    if let Some(entry) = table.get_mut(call) {
        if entry.timer_id == timer_id {
            entry.timer_id = 0;
            entry.timer_deadline_ms = 0;
        }
    }
}

/// One timer that expired during a [`tick`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired {
    pub call: CallIndex,
    pub timer_id: u16,
}

/// Walks every in-use call; any whose timer has a deadline `<= now_ms`
/// clears it and returns it in the result. Callers are expected to invoke
/// the dialect's timeout handler for each entry in order -- the function
/// itself only performs the table scan plus bookkeeping.
pub fn tick(table: &mut CallTable, now_ms: u64) -> Vec<Expired> {
    let mut fired = Vec::new();
    for (idx, entry) in table.in_use_mut() {
        if entry.timer_id != 0 && entry.timer_deadline_ms <= now_ms {
            fired.push(Expired {
                call: idx,
                timer_id: entry.timer_id,
            });
            entry.timer_id = 0;
            entry.timer_deadline_ms = 0;
        }
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectTable;
    use crate::types::Crv;

    fn noop_timeout(_id: u16) -> Result<()> {
        Ok(())
    }

    fn dialect_with_t303() -> DialectTable {
        let mut d = DialectTable::new();
        d.register_timeout(ids::T303, noop_timeout, 4_000);
        d.register_timeout(ids::T308, noop_timeout, 4_000);
        d
    }

    #[test]
    fn start_sets_deadline_from_dialect_default() {
        let mut table = CallTable::pri(4);
        let dialect = dialect_with_t303();
        let idx = table.allocate(Crv::new(1, false)).unwrap();
        start(&mut table, &dialect, idx, ids::T303, 1_000).unwrap();
        let entry = table.get(idx).unwrap();
        assert_eq!(entry.timer_id, ids::T303);
        assert_eq!(entry.timer_deadline_ms, 5_000);
    }

    #[test]
    fn tick_fires_exactly_once_for_past_deadline() {
        let mut table = CallTable::pri(4);
        let dialect = dialect_with_t303();
        let idx = table.allocate(Crv::new(1, false)).unwrap();
        start(&mut table, &dialect, idx, ids::T303, 0).unwrap();

        assert!(tick(&mut table, 3_999).is_empty());
        let fired = tick(&mut table, 4_000);
        assert_eq!(fired, vec![Expired { call: idx, timer_id: ids::T303 }]);
        assert!(tick(&mut table, 10_000).is_empty());
    }

    #[test]
    fn stop_ignores_mismatched_timer_id() {
        let mut table = CallTable::pri(4);
        let dialect = dialect_with_t303();
        let idx = table.allocate(Crv::new(1, false)).unwrap();
        start(&mut table, &dialect, idx, ids::T303, 0).unwrap();
        // A restart raced in with T308 before the stop call for T303 runs.
        start(&mut table, &dialect, idx, ids::T308, 0).unwrap();
        stop(&mut table, idx, ids::T303);
        assert_eq!(table.get(idx).unwrap().timer_id, ids::T308);
    }

    #[test]
    fn stop_clears_matching_timer() {
        let mut table = CallTable::pri(4);
        let dialect = dialect_with_t303();
        let idx = table.allocate(Crv::new(1, false)).unwrap();
        start(&mut table, &dialect, idx, ids::T303, 0).unwrap();
        stop(&mut table, idx, ids::T303);
        assert_eq!(table.get(idx).unwrap().timer_id, 0);
    }
}
