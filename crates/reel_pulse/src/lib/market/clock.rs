use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

use crate::market::MarketWindow;

/// US equity market clock over America/New_York wall time.
///
/// Close is 16:00, open is 09:30. Weekends and exchange holidays are not
/// modeled yet; the window is purely wall-clock based.
#[derive(Debug, Clone)]
pub struct MarketClock {
    pub now: DateTime<Tz>,
    pub last_close: DateTime<Tz>,
    pub next_open: DateTime<Tz>,
}

impl MarketClock {
    pub fn new() -> Self {
        Self::at(Utc::now().with_timezone(&New_York))
    }

    /// Builds the clock around an explicit "now", so tests and replays
    /// can pin the window.
    pub fn at(now: DateTime<Tz>) -> Self {
        let close_today = at_wall_time(&now, 16, 0);
        let last_close = if now < close_today {
            close_today - Duration::days(1)
        } else {
            close_today
        };

        let open_today = at_wall_time(&now, 9, 30);
        let next_open = if now > open_today {
            open_today + Duration::days(1)
        } else {
            open_today
        };

        MarketClock {
            now,
            last_close,
            next_open,
        }
    }

    /// Open during the regular session, 09:30 to 16:00 wall time.
    pub fn is_open(&self) -> bool {
        let open = at_wall_time(&self.now, 9, 30);
        let close = at_wall_time(&self.now, 16, 0);
        self.now >= open && self.now < close
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    pub fn window(&self) -> MarketWindow {
        MarketWindow {
            last_close: self.last_close,
            next_open: self.next_open,
        }
    }
}

impl Default for MarketClock {
    fn default() -> Self {
        MarketClock::new()
    }
}

fn at_wall_time(now: &DateTime<Tz>, hour: u32, minute: u32) -> DateTime<Tz> {
    // 09:30 and 16:00 never fall inside the 02:00 DST transition gap.
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
    now.timezone()
        .from_local_datetime(&now.date_naive().and_time(time))
        .single()
        .unwrap()
}
