//! Calendar clock sink and whole-hour adjustment.

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::{Error, Result};

/// One calendar reading, shaped like the register file of a battery-backed
/// real-time clock.
#[derive(Copy, Clone, Eq, PartialEq, Debug, derive_more::Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[display("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")]
pub struct ClockFields {
    /// Full year, e.g. 2024.
    pub year: u16,
    /// 1 = January.
    pub month: u8,
    /// Day of month, starting at 1.
    pub day: u8,
    /// Day of week with Sunday = 0.
    pub weekday: u8,
    /// 24-hour clock.
    pub hour: u8,
    /// Minute of the hour.
    pub minute: u8,
    /// Second of the minute.
    pub second: u8,
}

impl ClockFields {
    /// Calendar fields of the given instant, read in the instant's own offset.
    pub fn from_local(moment: OffsetDateTime) -> Result<Self> {
        Self::from_datetime(PrimitiveDateTime::new(moment.date(), moment.time()))
    }

    fn from_datetime(datetime: PrimitiveDateTime) -> Result<Self> {
        let year = u16::try_from(datetime.year()).map_err(|_| Error::TimestampOutOfRange)?;
        Ok(Self {
            year,
            month: u8::from(datetime.month()),
            day: datetime.day(),
            weekday: datetime.weekday().number_days_from_sunday(),
            hour: datetime.hour(),
            minute: datetime.minute(),
            second: datetime.second(),
        })
    }

    /// Checked conversion to a zone-less date-time. The stored weekday is
    /// not consulted; the date alone decides it.
    fn to_datetime(self) -> Result<PrimitiveDateTime> {
        let month = Month::try_from(self.month).map_err(|_| Error::InvalidClockFields)?;
        let date = Date::from_calendar_date(i32::from(self.year), month, self.day)
            .map_err(|_| Error::InvalidClockFields)?;
        let time = Time::from_hms(self.hour, self.minute, self.second)
            .map_err(|_| Error::InvalidClockFields)?;
        Ok(PrimitiveDateTime::new(date, time))
    }
}

/// Power-on reading: midnight, New Year's Day 2023 (a Sunday). What the
/// clock shows before the first successful sync.
impl Default for ClockFields {
    fn default() -> Self {
        Self {
            year: 2023,
            month: 1,
            day: 1,
            weekday: 0,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

/// Where committed time lands: a settable calendar clock.
///
/// Hardware implementations wrap a real-time clock chip; tests and host
/// programs use [`RamClock`](crate::host::RamClock).
pub trait WallClock {
    /// Get the current calendar reading.
    fn now(&self) -> Result<ClockFields>;

    /// Commit a new calendar reading.
    fn set(&mut self, fields: ClockFields) -> Result<()>;

    /// Shift the current reading by a whole number of hours, carrying
    /// through day, month, and year boundaries and recomputing the weekday.
    ///
    /// Made for interactive timezone stepping: +1 followed by -1 restores
    /// the original fields as long as the clock does not tick in between.
    fn adjust_hours(&mut self, hours: i8) -> Result<()> {
        let current = self.now()?.to_datetime()?;
        let shifted = current
            .checked_add(Duration::hours(i64::from(hours)))
            .ok_or(Error::TimestampOutOfRange)?;
        self.set(ClockFields::from_datetime(shifted)?)
    }
}
