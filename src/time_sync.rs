//! Polled Network Time Protocol (NTP) synchronization over WiFi.
//!
//! See [`TimeSync`] for usage examples.

use core::net::Ipv4Addr;

use crate::inbox::{SyncHandle, SyncInbox};
use crate::net::{LinkCredentials, LinkStatus, NameResolver, NetworkLink, TimeTransport};
use crate::ntp;
use crate::timezone::TimezoneHours;
use crate::unix_seconds::NtpSeconds;
use crate::wall_clock::{ClockFields, WallClock};
use crate::{Error, Result};

/// Default Network Time Protocol (NTP) server hostname.
pub const DEFAULT_SERVER: &str = "pool.ntp.org";

// ============================================================================
// Configuration
// ============================================================================

/// Server endpoint and join credentials for one controller.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Hostname to resolve and query.
    pub server: &'static str,
    /// Server port, normally [`ntp::SERVER_PORT`]. Replies are only
    /// accepted from this port.
    pub port: u16,
    /// WiFi join credentials.
    pub credentials: LinkCredentials,
}

impl SyncConfig {
    /// Pool defaults with the given join credentials.
    #[must_use]
    pub const fn new(credentials: LinkCredentials) -> Self {
        Self {
            server: DEFAULT_SERVER,
            port: ntp::SERVER_PORT,
            credentials,
        }
    }
}

/// Where the controller currently is, for callers that want to watch.
#[derive(Debug, Copy, Clone, Eq, PartialEq, derive_more::Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncStatus {
    /// Between passes; the next poll starts one.
    #[display("idle")]
    Idle,

    /// Link bring-up or transport setup in progress.
    #[display("connecting")]
    Connecting,

    /// Hostname resolution outstanding.
    #[display("resolving")]
    Resolving,

    /// Request sent; nothing heard back yet.
    #[display("awaiting reply")]
    AwaitingReply,
}

// ============================================================================
// Session State
// ============================================================================

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Phase {
    Idle,
    Connecting,
    Up,
}

/// One pass's live state, reset wholesale on teardown.
struct Session {
    phase: Phase,
    handle: Option<SyncHandle>,
    transport_open: bool,
    resolving: bool,
    server_address: Option<Ipv4Addr>,
    request_sent: bool,
}

impl Session {
    const fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            handle: None,
            transport_open: false,
            resolving: false,
            server_address: None,
            request_sent: false,
        }
    }
}

// ============================================================================
// TimeSync Controller
// ============================================================================

/// Device abstraction that drives one Network Time Protocol (NTP) sync pass
/// at a time: bring the WiFi link up, resolve the server, fire one request,
/// and commit the reply to the wall clock, all from a caller-owned poll loop.
///
/// Each call to [`poll`](Self::poll) advances at most one step and never
/// blocks. A `true` return means local time was just committed; the machine
/// is then idle and the very next poll starts a fresh pass, so callers decide
/// the cadence: poll eagerly until the first success, then as often as a
/// refresh is wanted.
///
/// # Examples
///
/// ```
/// use clock_kit::host::{
///     LinkScript, RamClock, ResolveBehavior, ResolverScript, ScriptedLink,
///     ScriptedResolver, ScriptedTransport, TransportScript, server_reply,
/// };
/// use clock_kit::{
///     LinkCredentials, LinkStatus, NtpSeconds, SyncConfig, SyncInbox, TimeSync,
///     TimezoneHours,
/// };
/// use core::net::Ipv4Addr;
///
/// # fn main() -> clock_kit::Result<()> {
/// let inbox = SyncInbox::leaked();
/// let link = LinkScript::leaked(&[LinkStatus::Connecting, LinkStatus::Up]);
/// let resolver =
///     ResolverScript::leaked(ResolveBehavior::AnswerNow(Ipv4Addr::new(192, 0, 2, 1)));
/// let transport = TransportScript::leaked();
///
/// let config = SyncConfig::new(LinkCredentials::new("shopnet", "vermillion")?);
/// let mut time_sync = TimeSync::new(
///     inbox,
///     ScriptedLink::new(link),
///     ScriptedResolver::new(resolver),
///     ScriptedTransport::new(transport),
///     config,
/// );
/// let mut clock = RamClock::default();
///
/// // Poll until the request is on the wire, then play the server's part.
/// let timezone = TimezoneHours::UTC;
/// while transport.last_request().is_none() {
///     time_sync.poll(&mut clock, timezone);
/// }
/// transport.inject(&server_reply(NtpSeconds(3_913_056_000), 2), 123);
///
/// assert!(time_sync.poll(&mut clock, timezone));
/// assert_eq!(clock.fields().year, 2024);
/// # Ok(())
/// # }
/// ```
pub struct TimeSync<L, R, T> {
    link: L,
    resolver: R,
    transport: T,
    inbox: &'static SyncInbox,
    config: SyncConfig,
    session: Session,
}

impl<L, R, T> TimeSync<L, R, T>
where
    L: NetworkLink,
    R: NameResolver,
    T: TimeTransport,
{
    /// Create an idle controller around the given collaborators.
    pub fn new(
        inbox: &'static SyncInbox,
        link: L,
        resolver: R,
        transport: T,
        config: SyncConfig,
    ) -> Self {
        Self {
            link,
            resolver,
            transport,
            inbox,
            config,
            session: Session::idle(),
        }
    }

    /// Advance the machine one step. Never blocks.
    ///
    /// `timezone` applies at commit time and may differ from poll to poll;
    /// the reading written to `clock` is already local. Returns `true`
    /// exactly when this call committed time.
    ///
    /// On any failure the pass is torn down and the next poll starts over
    /// from scratch. There is no internal timeout and no backoff; a silent
    /// server leaves the machine waiting until the caller gives up.
    pub fn poll(&mut self, clock: &mut impl WallClock, timezone: TimezoneHours) -> bool {
        if self.session.phase == Phase::Idle {
            let handle = self.inbox.open_session(self.config.port);
            debug!("time sync: session started");
            self.link.bring_up(&self.config.credentials);
            self.session = Session {
                phase: Phase::Connecting,
                handle: Some(handle),
                ..Session::idle()
            };
        }

        if self.session.phase == Phase::Connecting {
            let status = self.link.status();
            if status == LinkStatus::Up {
                info!("time sync: link up");
                self.session.phase = Phase::Up;
            } else if status.is_hard_failure() {
                warn!("time sync: link failed: {}", status);
                self.teardown();
                return false;
            } else {
                return false;
            }
        }

        // Connecting and Up sessions always carry a handle.
        let Some(handle) = self.session.handle else {
            return false;
        };

        if !self.session.transport_open {
            match self.transport.open(handle) {
                Ok(()) => self.session.transport_open = true,
                Err(error) => {
                    // The link is fine; try the endpoint again next poll.
                    warn!("time sync: transport open failed: {}", error);
                    return false;
                }
            }
        }

        if !self.session.resolving && !self.session.request_sent {
            debug!("time sync: resolving {}", self.config.server);
            self.resolver.resolve(self.config.server, handle);
            self.session.resolving = true;
        }

        if self.inbox.take_resolve_failure() {
            warn!("time sync: name resolution failed");
            self.teardown();
            return false;
        }

        if !self.session.request_sent {
            let Some(address) = self.inbox.take_address() else {
                return false;
            };
            self.session.resolving = false;
            self.session.server_address = Some(address);
            match self
                .transport
                .send(address, self.config.port, &ntp::client_request())
            {
                Ok(()) => {
                    info!("time sync: request sent");
                    self.session.request_sent = true;
                }
                Err(error) => {
                    warn!("time sync: send failed: {}", error);
                    self.teardown();
                }
            }
            return false;
        }

        // Request outstanding; the reply is the only thing left to wait for.
        if let Some(timestamp) = self.inbox.take_timestamp() {
            let committed = Self::commit(clock, timestamp, timezone);
            self.teardown();
            match committed {
                Ok(fields) => {
                    info!("time sync: clock set to {}", fields);
                    return true;
                }
                Err(error) => {
                    warn!("time sync: commit failed: {}", error);
                    return false;
                }
            }
        }

        false
    }

    /// Where the machine currently is.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        match self.session.phase {
            Phase::Idle => SyncStatus::Idle,
            Phase::Connecting => SyncStatus::Connecting,
            Phase::Up => {
                if self.session.request_sent {
                    SyncStatus::AwaitingReply
                } else if self.session.resolving {
                    SyncStatus::Resolving
                } else {
                    SyncStatus::Connecting
                }
            }
        }
    }

    /// The address resolution produced, while the pass that resolved it is
    /// still alive.
    #[must_use]
    pub fn server_address(&self) -> Option<Ipv4Addr> {
        self.session.server_address
    }

    fn teardown(&mut self) {
        if self.session.transport_open {
            self.transport.close();
        }
        self.link.tear_down();
        self.inbox.close_session();
        self.session = Session::idle();
        debug!("time sync: session torn down");
    }

    fn commit(
        clock: &mut impl WallClock,
        timestamp: NtpSeconds,
        timezone: TimezoneHours,
    ) -> Result<ClockFields> {
        let local = timestamp
            .to_unix()
            .to_offset_datetime(timezone.utc_offset())
            .ok_or(Error::TimestampOutOfRange)?;
        let fields = ClockFields::from_local(local)?;
        clock.set(fields)?;
        Ok(fields)
    }
}
