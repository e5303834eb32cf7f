//! Fire-time arithmetic
//!
//! All arithmetic is on full date-times in the schedule's zone, so
//! "startup + 1 minute" at 10:59 is 11:00, and 23:59 rolls to the next day.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone};
use contracts::Trigger;

/// Earliest fire instant of `trigger` strictly later than `now`
///
/// `startup` anchors `AfterStartup` triggers; `Daily` triggers are evaluated
/// in `now`'s offset. Returns `None` only when the trigger names a time of
/// day that does not exist (hour > 23, minute > 59).
pub fn next_fire(
    trigger: &Trigger,
    startup: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    let zone = now.timezone();
    let anchor = match *trigger {
        Trigger::AfterStartup { minutes } => {
            (startup + Duration::minutes(i64::from(minutes))).with_timezone(&zone)
        }
        Trigger::Daily { hour, minute } => {
            let at = NaiveTime::from_hms_opt(hour, minute, 0)?;
            zone.from_local_datetime(&now.date_naive().and_time(at)).single()?
        }
    };
    Some(first_after(anchor, now))
}

/// `anchor + k days` for the smallest k >= 0 that lands after `now`
fn first_after(anchor: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    if anchor > now {
        return anchor;
    }
    let elapsed_days = (now - anchor).num_days();
    anchor + Duration::days(elapsed_days + 1)
}
