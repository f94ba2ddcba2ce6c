//! Collaborator seams toward the radio link and the network stack.
//!
//! The controller in [`time_sync`](crate::time_sync) drives these traits and
//! never touches hardware directly. Firmware supplies adapters over its WiFi
//! driver and socket stack; tests and host programs use the scripted
//! implementations in [`host`](crate::host).

use core::net::Ipv4Addr;

use crate::inbox::SyncHandle;
use crate::ntp::PACKET_LEN;
use crate::{Error, Result};

/// What the radio link reports when asked.
#[derive(Debug, Copy, Clone, Eq, PartialEq, derive_more::Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    /// No join attempt in progress.
    #[display("idle")]
    Idle,

    /// Joining and authenticating.
    #[display("connecting")]
    Connecting,

    /// Associated with an address; ready for traffic.
    #[display("up")]
    Up,

    /// The access point rejected the credentials.
    #[display("authentication rejected")]
    AuthFailed,

    /// No such network in range.
    #[display("network not found")]
    NoNetwork,

    /// Any other terminal link failure.
    #[display("link failure")]
    Failed,
}

impl LinkStatus {
    /// True for the statuses a join attempt cannot recover from.
    #[must_use]
    pub const fn is_hard_failure(self) -> bool {
        matches!(self, Self::AuthFailed | Self::NoNetwork | Self::Failed)
    }
}

/// WiFi join credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCredentials {
    /// Network name (SSID)
    pub ssid: heapless::String<32>,
    /// Network password
    pub password: heapless::String<64>,
}

impl LinkCredentials {
    /// Errors with [`Error::CredentialTooLong`] if either field exceeds its
    /// fixed capacity.
    pub fn new(ssid: &str, password: &str) -> Result<Self> {
        let mut credentials = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        credentials
            .ssid
            .push_str(ssid)
            .map_err(|()| Error::CredentialTooLong)?;
        credentials
            .password
            .push_str(password)
            .map_err(|()| Error::CredentialTooLong)?;
        Ok(credentials)
    }
}

/// Radio link management.
///
/// All three operations are non-blocking; progress is read back through
/// [`status`](Self::status) on later polls.
pub trait NetworkLink {
    /// Begin joining the network named by the credentials.
    fn bring_up(&mut self, credentials: &LinkCredentials);

    /// Current link state.
    fn status(&mut self) -> LinkStatus;

    /// Release the link. Safe to call in any state.
    fn tear_down(&mut self);
}

/// Hostname lookup.
///
/// Lookup is asynchronous: the implementation answers through the handle,
/// either immediately (a cached result) or from a later callback.
pub trait NameResolver {
    /// Start one lookup. The controller never starts a second before the
    /// first answers or the session is torn down.
    fn resolve(&mut self, hostname: &str, reply: SyncHandle);
}

/// One datagram endpoint for the time exchange.
pub trait TimeTransport {
    /// Create the endpoint and install its receive path; every datagram the
    /// endpoint receives is pushed through the handle.
    fn open(&mut self, reply: SyncHandle) -> Result<()>;

    /// Fire the fixed-size request at the server.
    fn send(&mut self, server: Ipv4Addr, port: u16, payload: &[u8; PACKET_LEN]) -> Result<()>;

    /// Destroy the endpoint. Safe to call when nothing is open.
    fn close(&mut self);
}
