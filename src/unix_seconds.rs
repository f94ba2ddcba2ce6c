//! Timestamp types for the time exchange

use time::{OffsetDateTime, UtcOffset};

/// Units-safe wrapper for on-the-wire timestamps (seconds since 1900-01-01 00:00:00 UTC)
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NtpSeconds(pub u32);

impl NtpSeconds {
    /// Get the underlying u32 value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Convert to Unix seconds (since 1970-01-01)
    ///
    /// Values before 1970 come out negative; raw 0 is 1900-01-01 itself.
    #[must_use]
    pub const fn to_unix(self) -> UnixSeconds {
        // 1900→1970 offset: 70 years of seconds, 17 of them leap years
        const NTP_TO_UNIX_SECONDS: i64 = 2_208_988_800;
        UnixSeconds((self.0 as i64) - NTP_TO_UNIX_SECONDS)
    }
}

/// Units-safe wrapper for Unix timestamps (seconds since 1970-01-01 00:00:00 UTC)
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnixSeconds(pub i64);

impl UnixSeconds {
    /// Get the underlying i64 value
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Convert to OffsetDateTime with the given timezone offset
    #[must_use]
    pub fn to_offset_datetime(self, offset: UtcOffset) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.as_i64())
            .ok()
            .map(|dt| dt.to_offset(offset))
    }
}
