//! Scripted collaborators for tests and host demos.
//!
//! Each network-facing device splits into a shared script you leak once
//! ([`LinkScript`], [`ResolverScript`], [`TransportScript`]) and a cheap
//! handle that implements the collaborator trait ([`ScriptedLink`],
//! [`ScriptedResolver`], [`ScriptedTransport`]). The controller owns the
//! handle; the test keeps the script reference to steer behavior and read
//! call counters. [`RamClock`] stands in for the real-time clock and
//! [`server_reply`] builds well-formed reply datagrams.

use core::{cell::RefCell, net::Ipv4Addr};

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};

use crate::inbox::SyncHandle;
use crate::net::{LinkCredentials, LinkStatus, NameResolver, NetworkLink, TimeTransport};
use crate::ntp::PACKET_LEN;
use crate::unix_seconds::NtpSeconds;
use crate::wall_clock::{ClockFields, WallClock};
use crate::{Error, Result};

// ============================================================================
// Canned Packets
// ============================================================================

/// A well-formed server reply carrying the given transmit timestamp.
///
/// Byte 0 is LI=0, VN=4, Mode=4 (server). Pass `stratum` 0 to make a
/// kiss-of-death packet instead.
#[must_use]
pub fn server_reply(timestamp: NtpSeconds, stratum: u8) -> [u8; PACKET_LEN] {
    let mut reply = [0u8; PACKET_LEN];
    reply[0] = 0x24; // LI=0, VN=4, Mode=4 (server)
    reply[1] = stratum;
    let seconds = timestamp.as_u32().to_be_bytes();
    reply[40] = seconds[0];
    reply[41] = seconds[1];
    reply[42] = seconds[2];
    reply[43] = seconds[3];
    reply
}

// ============================================================================
// RamClock
// ============================================================================

/// A [`WallClock`] that holds its reading in memory.
#[derive(Debug, Clone)]
pub struct RamClock {
    fields: ClockFields,
    set_count: u32,
    unavailable: bool,
}

impl RamClock {
    /// Start at the given reading.
    #[must_use]
    pub const fn new(fields: ClockFields) -> Self {
        Self {
            fields,
            set_count: 0,
            unavailable: false,
        }
    }

    /// Current reading without going through the trait.
    #[must_use]
    pub const fn fields(&self) -> ClockFields {
        self.fields
    }

    /// Successful writes so far.
    #[must_use]
    pub const fn set_count(&self) -> u32 {
        self.set_count
    }

    /// While unavailable, reads and writes through the trait fail with
    /// [`Error::ClockUnavailable`].
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }
}

/// Starts at the power-on reading.
impl Default for RamClock {
    fn default() -> Self {
        Self::new(ClockFields::default())
    }
}

impl WallClock for RamClock {
    fn now(&self) -> Result<ClockFields> {
        if self.unavailable {
            return Err(Error::ClockUnavailable);
        }
        Ok(self.fields)
    }

    fn set(&mut self, fields: ClockFields) -> Result<()> {
        if self.unavailable {
            return Err(Error::ClockUnavailable);
        }
        self.fields = fields;
        self.set_count = self.set_count.saturating_add(1);
        Ok(())
    }
}

// ============================================================================
// Scripted Link
// ============================================================================

struct LinkShared {
    plan: heapless::Vec<LinkStatus, 16>,
    cursor: usize,
    bring_up_count: u32,
    tear_down_count: u32,
    last_ssid: heapless::String<32>,
}

/// Script for a [`ScriptedLink`]: the status sequence reported after each
/// bring-up, plus call counters.
pub struct LinkScript {
    shared: Mutex<CriticalSectionRawMutex, RefCell<LinkShared>>,
}

impl LinkScript {
    /// Statuses reported by `status()` in order; the last one repeats.
    /// Plans longer than the internal capacity are truncated.
    #[must_use]
    pub fn new(plan: &[LinkStatus]) -> Self {
        let mut stored = heapless::Vec::new();
        for status in plan {
            if stored.push(*status).is_err() {
                break;
            }
        }
        Self {
            shared: Mutex::new(RefCell::new(LinkShared {
                plan: stored,
                cursor: 0,
                bring_up_count: 0,
                tear_down_count: 0,
                last_ssid: heapless::String::new(),
            })),
        }
    }

    /// Leaked, ready to hand to a [`ScriptedLink`].
    #[must_use]
    pub fn leaked(plan: &[LinkStatus]) -> &'static Self {
        Box::leak(Box::new(Self::new(plan)))
    }

    /// How many times the link was brought up.
    #[must_use]
    pub fn bring_up_count(&self) -> u32 {
        self.shared.lock(|shared| shared.borrow().bring_up_count)
    }

    /// How many times the link was torn down.
    #[must_use]
    pub fn tear_down_count(&self) -> u32 {
        self.shared.lock(|shared| shared.borrow().tear_down_count)
    }

    /// SSID from the most recent bring-up.
    #[must_use]
    pub fn last_ssid(&self) -> heapless::String<32> {
        self.shared.lock(|shared| shared.borrow().last_ssid.clone())
    }
}

/// Link device driven by a [`LinkScript`].
#[derive(Copy, Clone)]
pub struct ScriptedLink {
    script: &'static LinkScript,
}

impl ScriptedLink {
    /// Handle over the given script.
    #[must_use]
    pub const fn new(script: &'static LinkScript) -> Self {
        Self { script }
    }
}

impl NetworkLink for ScriptedLink {
    fn bring_up(&mut self, credentials: &LinkCredentials) {
        self.script.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            shared.bring_up_count = shared.bring_up_count.saturating_add(1);
            shared.cursor = 0;
            shared.last_ssid = credentials.ssid.clone();
        });
    }

    fn status(&mut self) -> LinkStatus {
        self.script.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            let status = shared
                .plan
                .get(shared.cursor)
                .copied()
                .unwrap_or(LinkStatus::Idle);
            let next = shared.cursor.saturating_add(1);
            if next < shared.plan.len() {
                shared.cursor = next;
            }
            status
        })
    }

    fn tear_down(&mut self) {
        self.script.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            shared.tear_down_count = shared.tear_down_count.saturating_add(1);
        });
    }
}

// ============================================================================
// Scripted Resolver
// ============================================================================

/// How a [`ScriptedResolver`] answers a lookup.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResolveBehavior {
    /// Complete immediately inside `resolve`, like a cached lookup.
    AnswerNow(Ipv4Addr),

    /// Fail immediately inside `resolve`.
    FailNow,

    /// Hold the request open; the test completes it later through
    /// [`ResolverScript::answer`] or [`ResolverScript::fail`].
    Defer,
}

struct ResolverShared {
    behavior: ResolveBehavior,
    held: Option<SyncHandle>,
    resolve_count: u32,
    last_hostname: heapless::String<64>,
}

/// Script for a [`ScriptedResolver`].
pub struct ResolverScript {
    shared: Mutex<CriticalSectionRawMutex, RefCell<ResolverShared>>,
}

impl ResolverScript {
    /// Answer every lookup with the given behavior.
    #[must_use]
    pub const fn new(behavior: ResolveBehavior) -> Self {
        Self {
            shared: Mutex::new(RefCell::new(ResolverShared {
                behavior,
                held: None,
                resolve_count: 0,
                last_hostname: heapless::String::new(),
            })),
        }
    }

    /// Leaked, ready to hand to a [`ScriptedResolver`].
    #[must_use]
    pub fn leaked(behavior: ResolveBehavior) -> &'static Self {
        Box::leak(Box::new(Self::new(behavior)))
    }

    /// How many lookups were started.
    #[must_use]
    pub fn resolve_count(&self) -> u32 {
        self.shared.lock(|shared| shared.borrow().resolve_count)
    }

    /// Hostname from the most recent lookup, truncated to what fits.
    #[must_use]
    pub fn last_hostname(&self) -> heapless::String<64> {
        self.shared
            .lock(|shared| shared.borrow().last_hostname.clone())
    }

    /// Complete a deferred lookup with an address. No-op when none is held.
    pub fn answer(&self, address: Ipv4Addr) {
        let held = self.shared.lock(|shared| shared.borrow_mut().held.take());
        if let Some(handle) = held {
            handle.deliver_address(address);
        }
    }

    /// Fail a deferred lookup. No-op when none is held.
    pub fn fail(&self) {
        let held = self.shared.lock(|shared| shared.borrow_mut().held.take());
        if let Some(handle) = held {
            handle.deliver_resolve_failure();
        }
    }
}

/// Resolver device driven by a [`ResolverScript`].
#[derive(Copy, Clone)]
pub struct ScriptedResolver {
    script: &'static ResolverScript,
}

impl ScriptedResolver {
    /// Handle over the given script.
    #[must_use]
    pub const fn new(script: &'static ResolverScript) -> Self {
        Self { script }
    }
}

impl NameResolver for ScriptedResolver {
    fn resolve(&mut self, hostname: &str, reply: SyncHandle) {
        let behavior = self.script.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            shared.resolve_count = shared.resolve_count.saturating_add(1);
            shared.last_hostname.clear();
            let _ = shared.last_hostname.push_str(hostname);
            shared.behavior
        });
        match behavior {
            ResolveBehavior::AnswerNow(address) => reply.deliver_address(address),
            ResolveBehavior::FailNow => reply.deliver_resolve_failure(),
            ResolveBehavior::Defer => {
                self.script
                    .shared
                    .lock(|shared| shared.borrow_mut().held = Some(reply));
            }
        }
    }
}

// ============================================================================
// Scripted Transport
// ============================================================================

struct TransportShared {
    handle: Option<SyncHandle>,
    open_count: u32,
    send_count: u32,
    close_count: u32,
    fail_open: bool,
    fail_send: bool,
    last_destination: Option<(Ipv4Addr, u16)>,
    last_request: Option<[u8; PACKET_LEN]>,
}

/// Script for a [`ScriptedTransport`].
///
/// The receive path captured at `open` outlives `close` on purpose, so tests
/// can deliver datagrams to sessions that no longer exist.
pub struct TransportScript {
    shared: Mutex<CriticalSectionRawMutex, RefCell<TransportShared>>,
}

impl TransportScript {
    /// An endpoint that opens and sends without complaint.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            shared: Mutex::new(RefCell::new(TransportShared {
                handle: None,
                open_count: 0,
                send_count: 0,
                close_count: 0,
                fail_open: false,
                fail_send: false,
                last_destination: None,
                last_request: None,
            })),
        }
    }

    /// Leaked, ready to hand to a [`ScriptedTransport`].
    #[must_use]
    pub fn leaked() -> &'static Self {
        Box::leak(Box::new(Self::new()))
    }

    /// Make the next `open` calls fail.
    pub fn set_fail_open(&self, fail: bool) {
        self.shared.lock(|shared| shared.borrow_mut().fail_open = fail);
    }

    /// Make the next `send` calls fail.
    pub fn set_fail_send(&self, fail: bool) {
        self.shared.lock(|shared| shared.borrow_mut().fail_send = fail);
    }

    /// How many times the endpoint opened successfully.
    #[must_use]
    pub fn open_count(&self) -> u32 {
        self.shared.lock(|shared| shared.borrow().open_count)
    }

    /// How many requests went out.
    #[must_use]
    pub fn send_count(&self) -> u32 {
        self.shared.lock(|shared| shared.borrow().send_count)
    }

    /// How many times the endpoint was closed.
    #[must_use]
    pub fn close_count(&self) -> u32 {
        self.shared.lock(|shared| shared.borrow().close_count)
    }

    /// Destination of the most recent send.
    #[must_use]
    pub fn last_destination(&self) -> Option<(Ipv4Addr, u16)> {
        self.shared.lock(|shared| shared.borrow().last_destination)
    }

    /// Payload of the most recent send.
    #[must_use]
    pub fn last_request(&self) -> Option<[u8; PACKET_LEN]> {
        self.shared.lock(|shared| shared.borrow().last_request)
    }

    /// Deliver a datagram through the receive path installed by the most
    /// recent `open`. No-op if the endpoint never opened.
    pub fn inject(&self, payload: &[u8], source_port: u16) {
        let handle = self.shared.lock(|shared| shared.borrow().handle);
        if let Some(handle) = handle {
            handle.deliver_datagram(payload, source_port);
        }
    }
}

impl Default for TransportScript {
    fn default() -> Self {
        Self::new()
    }
}

/// Transport device driven by a [`TransportScript`].
#[derive(Copy, Clone)]
pub struct ScriptedTransport {
    script: &'static TransportScript,
}

impl ScriptedTransport {
    /// Handle over the given script.
    #[must_use]
    pub const fn new(script: &'static TransportScript) -> Self {
        Self { script }
    }
}

impl TimeTransport for ScriptedTransport {
    fn open(&mut self, reply: SyncHandle) -> Result<()> {
        self.script.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            if shared.fail_open {
                return Err(Error::TransportUnavailable);
            }
            shared.open_count = shared.open_count.saturating_add(1);
            shared.handle = Some(reply);
            Ok(())
        })
    }

    fn send(&mut self, server: Ipv4Addr, port: u16, payload: &[u8; PACKET_LEN]) -> Result<()> {
        self.script.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            if shared.fail_send {
                return Err(Error::SendFailed);
            }
            shared.send_count = shared.send_count.saturating_add(1);
            shared.last_destination = Some((server, port));
            shared.last_request = Some(*payload);
            Ok(())
        })
    }

    fn close(&mut self) {
        self.script.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            shared.close_count = shared.close_count.saturating_add(1);
        });
    }
}
