//! Polled Network Time Protocol (NTP) time sync and wall-clock plumbing for
//! Pico-class clock projects.
//!
//! The heart of the crate is [`TimeSync`], a non-blocking state machine the
//! firmware polls from its main loop: it brings the WiFi link up, resolves
//! the server, fires one request, and commits the reply to a [`WallClock`]
//! as local calendar time. Network and clock hardware stay behind the
//! [`NetworkLink`], [`NameResolver`], [`TimeTransport`], and [`WallClock`]
//! traits; the `host` feature adds scripted implementations so the whole
//! machine runs in plain `cargo test`.
#![cfg_attr(not(feature = "host"), no_std)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("features `defmt` and `log` are mutually exclusive; enable at most one");

// This module must come first so the others see its macros.
#[macro_use]
mod fmt;

mod error;
mod inbox;
mod net;
pub mod ntp;
mod time_sync;
mod timezone;
mod unix_seconds;
mod wall_clock;

#[cfg(feature = "host")]
pub mod host;

// Re-export commonly used items
pub use error::{Error, Result};
pub use inbox::{SyncHandle, SyncInbox};
pub use net::{LinkCredentials, LinkStatus, NameResolver, NetworkLink, TimeTransport};
pub use time_sync::{DEFAULT_SERVER, SyncConfig, SyncStatus, TimeSync};
pub use timezone::TimezoneHours;
pub use unix_seconds::{NtpSeconds, UnixSeconds};
pub use wall_clock::{ClockFields, WallClock};
