//! Timestamp utilities and the daily trigger calculation

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::{Error, Result};

/// Today's date on the local wall clock
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Next occurrence of `hour:00:00` strictly after `now`
///
/// If today's trigger time has already been reached, the trigger moves to
/// tomorrow.
pub fn next_daily_trigger(now: NaiveDateTime, hour: u32) -> Result<NaiveDateTime> {
    let today_target = now
        .date()
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| Error::InvalidInput(format!("invalid trigger hour: {}", hour)))?;

    if now >= today_target {
        Ok(today_target + Duration::days(1))
    } else {
        Ok(today_target)
    }
}

/// How long to sleep from `now` until the next local trigger
pub fn duration_until_next_trigger(now: DateTime<Local>, hour: u32) -> Result<std::time::Duration> {
    let target_naive = next_daily_trigger(now.naive_local(), hour)?;

    // A DST gap can make the local time nonexistent; shift forward an hour.
    let target = Local
        .from_local_datetime(&target_naive)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(target_naive + Duration::hours(1)))
                .earliest()
        })
        .ok_or_else(|| Error::Internal(format!("unrepresentable local time: {}", target_naive)))?;

    (target - now)
        .to_std()
        .map_err(|e| Error::Internal(format!("negative sleep duration: {}", e)))
}
