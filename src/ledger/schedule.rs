// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;

use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::events::{Change, ChangeBus};
use crate::ledger::{rates, store, transfers};
use crate::models::{Frequency, ScheduledTransfer, Transfer};

pub use crate::ledger::store::NewSchedule;

/// Next occurrence strictly after `reference`.
///
/// daily: the following day. weekly: the next `day_of_week` (0 = Monday);
/// when `reference` already falls on that weekday the run is a full week
/// out, never the same day. monthly: `day_of_month` within the reference
/// month, clamped to the month's length (31st in April runs on the 30th);
/// if that lands on or before `reference` it rolls one month forward.
pub fn next_run_date(
    frequency: Frequency,
    reference: NaiveDate,
    day_of_week: Option<u32>,
    day_of_month: Option<u32>,
) -> NaiveDate {
    match frequency {
        Frequency::Daily => reference + Duration::days(1),
        Frequency::Weekly => {
            let current = reference.weekday().num_days_from_monday();
            let target = day_of_week.unwrap_or(current);
            let mut ahead = (target + 7 - current) % 7;
            if ahead == 0 {
                ahead = 7;
            }
            reference + Duration::days(ahead as i64)
        }
        Frequency::Monthly => {
            let day = day_of_month.unwrap_or_else(|| reference.day());
            let candidate = clamp_to_month(reference.year(), reference.month(), day);
            if candidate > reference {
                candidate
            } else {
                let (year, month) = if reference.month() == 12 {
                    (reference.year() + 1, 1)
                } else {
                    (reference.year(), reference.month() + 1)
                };
                clamp_to_month(year, month, day)
            }
        }
    }
}

/// Each frequency needs exactly its own anchor field, present and in range;
/// a row that slips past this could never compute a sensible next run.
fn validate_cadence(new: &NewSchedule) -> LedgerResult<()> {
    match new.frequency {
        Frequency::Daily => Ok(()),
        Frequency::Weekly => match new.day_of_week {
            None => Err(LedgerError::InvalidSchedule(
                "weekly schedules need a day of week",
            )),
            Some(dow) if dow > 6 => Err(LedgerError::InvalidSchedule(
                "day of week must be 0 (Monday) through 6 (Sunday)",
            )),
            Some(_) => Ok(()),
        },
        Frequency::Monthly => match new.day_of_month {
            None => Err(LedgerError::InvalidSchedule(
                "monthly schedules need a day of month",
            )),
            Some(dom) if !(1..=31).contains(&dom) => Err(LedgerError::InvalidSchedule(
                "day of month must be between 1 and 31",
            )),
            Some(_) => Ok(()),
        },
    }
}

fn clamp_to_month(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap();
    (first_of_next - Duration::days(1)).day()
}

/// Registers a recurring transfer. The first `next_run_date` is computed
/// from `today`, so a schedule is never due on the day it was created.
pub fn create_scheduled(
    conn: &Connection,
    bus: &ChangeBus,
    profile_id: i64,
    new: NewSchedule,
    today: NaiveDate,
) -> LedgerResult<ScheduledTransfer> {
    if new.from_wallet_id == new.to_wallet_id {
        return Err(LedgerError::InvalidTransfer);
    }
    validate_cadence(&new)?;
    let from = store::get_wallet(conn, profile_id, new.from_wallet_id)?;
    store::get_wallet(conn, profile_id, new.to_wallet_id)?;
    let next = next_run_date(new.frequency, today, new.day_of_week, new.day_of_month);
    let created = store::insert_schedule(conn, profile_id, &new, &from.currency, next)?;
    bus.publish(Change::ScheduledTransfers);
    Ok(created)
}

/// Flips a schedule between active and paused without touching its cadence
/// or history.
pub fn toggle_scheduled(
    conn: &Connection,
    bus: &ChangeBus,
    profile_id: i64,
    id: i64,
) -> LedgerResult<ScheduledTransfer> {
    let sched = store::get_schedule(conn, profile_id, id)?;
    store::set_schedule_active(conn, profile_id, id, !sched.is_active)?;
    bus.publish(Change::ScheduledTransfers);
    store::get_schedule(conn, profile_id, id)
}

pub fn delete_scheduled(
    conn: &Connection,
    bus: &ChangeBus,
    profile_id: i64,
    id: i64,
) -> LedgerResult<()> {
    store::delete_schedule_row(conn, profile_id, id)?;
    bus.publish(Change::ScheduledTransfers);
    Ok(())
}

pub fn list_schedules(
    conn: &Connection,
    profile_id: i64,
    only_active: bool,
) -> LedgerResult<Vec<ScheduledTransfer>> {
    store::list_schedules(conn, profile_id, only_active)
}

/// Materializes every schedule due on or before `today` and returns the
/// transfers created. Each schedule yields at most one transfer per call
/// because its `next_run_date` advances into the future in the same storage
/// transaction that records the transfer; a second invocation on the same
/// day finds nothing due.
pub fn run_due(
    conn: &mut Connection,
    bus: &ChangeBus,
    profile_id: i64,
    today: NaiveDate,
) -> LedgerResult<Vec<Transfer>> {
    let due = store::list_due_schedules(conn, profile_id, today)?;
    let mut created = Vec::with_capacity(due.len());
    for sched in &due {
        if let Some(transfer) = materialize(conn, profile_id, sched, today)? {
            created.push(transfer);
        }
    }
    if !created.is_empty() {
        bus.publish(Change::Transfers);
        bus.publish(Change::ScheduledTransfers);
    }
    Ok(created)
}

fn materialize(
    conn: &mut Connection,
    profile_id: i64,
    sched: &ScheduledTransfer,
    today: NaiveDate,
) -> LedgerResult<Option<Transfer>> {
    if !sched.is_active
        || sched.next_run_date > today
        || sched.remaining_occurrences == Some(0)
    {
        return Ok(None);
    }
    let from = store::get_wallet(conn, profile_id, sched.from_wallet_id)?;
    let to = store::get_wallet(conn, profile_id, sched.to_wallet_id)?;
    let converted = if from.currency == to.currency {
        None
    } else {
        rates::rate(conn, today, &from.currency, &to.currency)?.map(|r| sched.amount * r)
    };
    let new = transfers::NewTransfer {
        from_wallet_id: sched.from_wallet_id,
        to_wallet_id: sched.to_wallet_id,
        amount: sched.amount,
        date: today,
        description: sched.description.clone(),
    };
    let remaining = sched.remaining_occurrences.map(|n| n.saturating_sub(1));
    let still_active = remaining.map_or(true, |n| n > 0);
    // A deactivated schedule keeps its old next_run_date; it is only
    // recomputed while the schedule will run again.
    let next = still_active
        .then(|| next_run_date(sched.frequency, today, sched.day_of_week, sched.day_of_month));

    let tx = conn.transaction()?;
    let transfer = transfers::insert_and_reconcile(&tx, profile_id, &new, &from.currency, converted)?;
    store::advance_schedule(&tx, profile_id, sched.id, today, next, remaining, still_active)?;
    tx.commit()?;
    Ok(Some(transfer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_advances_one_day() {
        assert_eq!(
            next_run_date(Frequency::Daily, d(2025, 3, 31), None, None),
            d(2025, 4, 1)
        );
    }

    #[test]
    fn weekly_lands_on_requested_weekday() {
        // 2025-03-05 is a Wednesday; Friday is day 4.
        assert_eq!(
            next_run_date(Frequency::Weekly, d(2025, 3, 5), Some(4), None),
            d(2025, 3, 7)
        );
    }

    #[test]
    fn weekly_on_matching_day_waits_a_full_week() {
        // 2025-03-05 is a Wednesday; Wednesday is day 2.
        assert_eq!(
            next_run_date(Frequency::Weekly, d(2025, 3, 5), Some(2), None),
            d(2025, 3, 12)
        );
    }

    #[test]
    fn monthly_clamps_to_short_months() {
        assert_eq!(
            next_run_date(Frequency::Monthly, d(2025, 4, 1), None, Some(31)),
            d(2025, 4, 30)
        );
        // Non-leap February: day 31 from the 20th lands on the 28th.
        assert_eq!(
            next_run_date(Frequency::Monthly, d(2025, 2, 20), None, Some(31)),
            d(2025, 2, 28)
        );
        // Leap February.
        assert_eq!(
            next_run_date(Frequency::Monthly, d(2024, 2, 20), None, Some(31)),
            d(2024, 2, 29)
        );
    }

    #[test]
    fn monthly_on_or_before_reference_rolls_forward() {
        // Same day as reference rolls a month ahead.
        assert_eq!(
            next_run_date(Frequency::Monthly, d(2025, 1, 15), None, Some(15)),
            d(2025, 2, 15)
        );
        // Earlier in the month rolls too.
        assert_eq!(
            next_run_date(Frequency::Monthly, d(2025, 1, 20), None, Some(15)),
            d(2025, 2, 15)
        );
        // December rolls into January of the next year.
        assert_eq!(
            next_run_date(Frequency::Monthly, d(2025, 12, 31), None, Some(31)),
            d(2026, 1, 31)
        );
    }

    #[test]
    fn monthly_still_in_future_stays_in_month() {
        assert_eq!(
            next_run_date(Frequency::Monthly, d(2025, 1, 20), None, Some(31)),
            d(2025, 1, 31)
        );
    }
}
