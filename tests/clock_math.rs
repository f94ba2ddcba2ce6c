//! Host-level tests for calendar decoding and the whole-hour adjustment.

use clock_kit::host::RamClock;
use clock_kit::{ClockFields, NtpSeconds, TimezoneHours, WallClock};

fn decode(raw: u32, timezone: TimezoneHours) -> ClockFields {
    let local = NtpSeconds(raw)
        .to_unix()
        .to_offset_datetime(timezone.utc_offset())
        .expect("in range");
    ClockFields::from_local(local).expect("in range")
}

#[test]
fn new_year_2024_at_utc() {
    assert_eq!(
        decode(3_913_056_000, TimezoneHours::UTC),
        ClockFields {
            year: 2024,
            month: 1,
            day: 1,
            weekday: 1, // Monday
            hour: 0,
            minute: 0,
            second: 0,
        }
    );
}

#[test]
fn eastern_offset_shifts_the_local_reading() {
    let timezone = TimezoneHours::new(5).expect("in range");
    let fields = decode(3_913_056_000, timezone);
    assert_eq!(
        (fields.year, fields.month, fields.day, fields.hour),
        (2024, 1, 1, 5)
    );
}

#[test]
fn western_offset_lands_on_the_previous_day() {
    let timezone = TimezoneHours::new(-5).expect("in range");
    assert_eq!(
        decode(3_913_056_000, timezone),
        ClockFields {
            year: 2023,
            month: 12,
            day: 31,
            weekday: 0, // Sunday
            hour: 19,
            minute: 0,
            second: 0,
        }
    );
}

#[test]
fn raw_zero_is_the_1900_epoch() {
    let fields = decode(0, TimezoneHours::UTC);
    assert_eq!(
        (fields.year, fields.month, fields.day, fields.hour),
        (1900, 1, 1, 0)
    );
}

#[test]
fn power_on_reading_is_new_years_2023() {
    assert_eq!(
        ClockFields::default(),
        ClockFields {
            year: 2023,
            month: 1,
            day: 1,
            weekday: 0, // Sunday
            hour: 0,
            minute: 0,
            second: 0,
        }
    );
}

#[test]
fn adjustment_round_trip_is_identity() {
    let start = ClockFields {
        year: 2024,
        month: 6,
        day: 15,
        weekday: 6, // Saturday
        hour: 12,
        minute: 30,
        second: 45,
    };
    let mut clock = RamClock::new(start);
    clock.adjust_hours(1).expect("in range");
    clock.adjust_hours(-1).expect("in range");
    assert_eq!(clock.fields(), start);
}

#[test]
fn adjustment_rolls_over_a_month_boundary() {
    let start = ClockFields {
        year: 2023,
        month: 4,
        day: 30,
        weekday: 0, // Sunday
        hour: 23,
        minute: 30,
        second: 0,
    };
    let mut clock = RamClock::new(start);
    clock.adjust_hours(1).expect("in range");
    assert_eq!(
        clock.fields(),
        ClockFields {
            year: 2023,
            month: 5,
            day: 1,
            weekday: 1, // Monday
            hour: 0,
            minute: 30,
            second: 0,
        }
    );
    clock.adjust_hours(-1).expect("in range");
    assert_eq!(clock.fields(), start);
}

#[test]
fn adjustment_crosses_the_leap_day() {
    let start = ClockFields {
        year: 2024,
        month: 2,
        day: 28,
        weekday: 3, // Wednesday
        hour: 23,
        minute: 59,
        second: 59,
    };
    let mut clock = RamClock::new(start);
    clock.adjust_hours(1).expect("in range");
    assert_eq!(
        clock.fields(),
        ClockFields {
            year: 2024,
            month: 2,
            day: 29,
            weekday: 4, // Thursday
            hour: 0,
            minute: 59,
            second: 59,
        }
    );
}

#[test]
fn adjustment_crosses_the_year_boundary() {
    let start = ClockFields {
        year: 2023,
        month: 12,
        day: 31,
        weekday: 0, // Sunday
        hour: 23,
        minute: 30,
        second: 0,
    };
    let mut clock = RamClock::new(start);
    clock.adjust_hours(1).expect("in range");
    assert_eq!(
        clock.fields(),
        ClockFields {
            year: 2024,
            month: 1,
            day: 1,
            weekday: 1, // Monday
            hour: 0,
            minute: 30,
            second: 0,
        }
    );
}

#[test]
fn zero_adjustment_normalizes_a_wrong_weekday() {
    // 2024-06-15 is a Saturday; the stored weekday lies.
    let mut clock = RamClock::new(ClockFields {
        year: 2024,
        month: 6,
        day: 15,
        weekday: 2,
        hour: 8,
        minute: 0,
        second: 0,
    });
    clock.adjust_hours(0).expect("in range");
    assert_eq!(clock.fields().weekday, 6);
}

#[test]
fn nonsense_fields_are_refused() {
    let mut clock = RamClock::new(ClockFields {
        year: 2023,
        month: 2,
        day: 30,
        weekday: 0,
        hour: 0,
        minute: 0,
        second: 0,
    });
    assert!(clock.adjust_hours(1).is_err());
    // The reading is left untouched.
    assert_eq!(clock.fields().day, 30);
    assert_eq!(clock.set_count(), 0);
}

#[test]
fn timezone_bounds_hold() {
    assert_eq!(TimezoneHours::new(15), None);
    assert_eq!(TimezoneHours::new(-13), None);
    assert_eq!(TimezoneHours::new(14), Some(TimezoneHours::MAX));
    assert_eq!(TimezoneHours::new(-12), Some(TimezoneHours::MIN));

    assert_eq!(TimezoneHours::MAX.step_east(), TimezoneHours::MAX);
    assert_eq!(TimezoneHours::MIN.step_west(), TimezoneHours::MIN);
    assert_eq!(TimezoneHours::UTC.step_east().hours(), 1);
    assert_eq!(TimezoneHours::UTC.step_west().hours(), -1);

    assert_eq!(TimezoneHours::clamped(40).hours(), 14);
    assert_eq!(TimezoneHours::clamped(-40).hours(), -12);
}
