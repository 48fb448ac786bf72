use chrono::{DateTime, Days, Duration, Local, SubsecRound, TimeZone, Utc};

use crate::error::TaskError;
use crate::model::task::IntervalUnit;

/// Next due instant: `value` units of `unit` after `from`.
///
/// Days are calendar days in the local time zone, so a daily reminder keeps
/// its wall-clock time across month ends and DST shifts. Minutes and hours
/// are absolute. Callers must pass `value >= 1`.
///
/// The result is cut to whole milliseconds, the precision tasks are stored
/// with.
pub fn compute_next(value: u32, unit: IntervalUnit, from: DateTime<Utc>) -> DateTime<Utc> {
    compute_next_in(value, unit, &from.with_timezone(&Local))
        .map(|next| next.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
        .trunc_subsecs(3)
}

/// Same as [`compute_next`] for an instant in any zone. `None` only when the
/// result falls outside chrono's representable range.
pub fn compute_next_in<Tz: TimeZone>(
    value: u32,
    unit: IntervalUnit,
    from: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let value = i64::from(value);
    match unit {
        IntervalUnit::Minutes => from.clone().checked_add_signed(Duration::try_minutes(value)?),
        IntervalUnit::Hours => from.clone().checked_add_signed(Duration::try_hours(value)?),
        IntervalUnit::Days => {
            // A day that lands on a skipped or repeated local time has no
            // single calendar answer; use 24h steps instead.
            let days = u64::try_from(value).ok()?;
            from.clone()
                .checked_add_days(Days::new(days))
                .or_else(|| from.clone().checked_add_signed(Duration::try_days(value)?))
        }
    }
}

/// Parses a compact interval literal such as `15m`, `2h`, `1d` or `90min`.
pub fn parse_interval(input: &str) -> Result<(u32, IntervalUnit), TaskError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TaskError::MalformedInterval(input.to_string()));
    }

    let split = input
        .find(|c: char| !c.is_ascii_digit() && c != '-')
        .unwrap_or(input.len());
    let (num_str, unit_str) = input.split_at(split);

    let num: i64 = num_str
        .parse()
        .map_err(|_| TaskError::MalformedInterval(input.to_string()))?;
    if num < 1 {
        return Err(TaskError::InvalidInterval(num));
    }
    let value = u32::try_from(num).map_err(|_| TaskError::MalformedInterval(input.to_string()))?;

    // A bare number means minutes, matching the add form's default unit.
    let unit = if unit_str.is_empty() {
        IntervalUnit::default()
    } else {
        unit_str.parse()?
    };

    Ok((value, unit))
}
