//! Caller-adjustable whole-hour timezone offset.

use time::UtcOffset;

/// A whole-hour UTC offset, kept inside the range real timezones occupy.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, derive_more::Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[display("UTC{_0:+}")]
pub struct TimezoneHours(i8);

impl TimezoneHours {
    /// Westernmost offset in use, UTC-12.
    pub const MIN: Self = Self(-12);
    /// Easternmost offset in use, UTC+14.
    pub const MAX: Self = Self(14);
    /// No offset.
    pub const UTC: Self = Self(0);

    /// `None` outside the UTC-12 to UTC+14 range.
    #[must_use]
    pub const fn new(hours: i8) -> Option<Self> {
        if hours >= Self::MIN.0 && hours <= Self::MAX.0 {
            Some(Self(hours))
        } else {
            None
        }
    }

    /// Nearest in-range offset.
    #[must_use]
    pub const fn clamped(hours: i8) -> Self {
        if hours < Self::MIN.0 {
            Self::MIN
        } else if hours > Self::MAX.0 {
            Self::MAX
        } else {
            Self(hours)
        }
    }

    /// The offset in whole hours.
    #[must_use]
    pub const fn hours(self) -> i8 {
        self.0
    }

    /// One hour east, stopping at [`Self::MAX`].
    #[must_use]
    pub const fn step_east(self) -> Self {
        Self::clamped(self.0.saturating_add(1))
    }

    /// One hour west, stopping at [`Self::MIN`].
    #[must_use]
    pub const fn step_west(self) -> Self {
        Self::clamped(self.0.saturating_sub(1))
    }

    /// As a `time` crate offset.
    #[must_use]
    pub fn utc_offset(self) -> UtcOffset {
        #[expect(clippy::arithmetic_side_effects, reason = "offset bounds checked")]
        let seconds = i32::from(self.0) * 3600;
        UtcOffset::from_whole_seconds(seconds).unwrap_or(UtcOffset::UTC)
    }
}

impl Default for TimezoneHours {
    fn default() -> Self {
        Self::UTC
    }
}
