//! Completion inbox between network callbacks and the polled controller.
//!
//! Resolution answers and received datagrams arrive from the network side's
//! own execution context. They land here, tagged with the session that asked
//! for them, and the controller drains them on its next poll. Deliveries
//! tagged with a closed or superseded session are dropped at the door.

use core::{cell::RefCell, net::Ipv4Addr};

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};

use crate::ntp;
use crate::unix_seconds::NtpSeconds;

/// Identity of one sync session.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct SessionToken(u32);

/// The delivery side of the inbox: one session's callback target, handed to
/// the resolver and the transport. Cheap to copy and safe to hold after the
/// session ends; late deliveries through a stale handle go nowhere.
#[derive(Copy, Clone)]
pub struct SyncHandle {
    inbox: &'static SyncInbox,
    token: SessionToken,
    server_port: u16,
}

impl SyncHandle {
    /// Resolution finished with the server's address.
    pub fn deliver_address(self, address: Ipv4Addr) {
        self.inbox.deliver_address(self.token, address);
    }

    /// Resolution failed.
    pub fn deliver_resolve_failure(self) {
        self.inbox.deliver_resolve_failure(self.token);
    }

    /// A datagram arrived on the session's endpoint. Validation happens here
    /// at delivery, against the port this session's request went to; only an
    /// accepted reply is kept for the controller.
    pub fn deliver_datagram(self, payload: &[u8], source_port: u16) {
        match ntp::parse_reply(payload, source_port, self.server_port) {
            Ok(timestamp) => self.inbox.deliver_timestamp(self.token, timestamp),
            Err(reason) => debug!("time sync: ignored datagram: {}", reason),
        }
    }
}

/// What the current session has delivered so far.
struct Pending {
    token: u32,
    session_open: bool,
    address: Option<Ipv4Addr>,
    resolve_failed: bool,
    timestamp: Option<NtpSeconds>,
}

impl Pending {
    fn accepts(&self, token: SessionToken) -> bool {
        self.session_open && self.token == token.0
    }
}

/// Mailbox the network side writes and [`poll`](crate::TimeSync::poll)
/// drains.
///
/// Guarded by a critical-section mutex so deliveries may come from the
/// network stack's own execution context, including interrupt context.
pub struct SyncInbox {
    pending: Mutex<CriticalSectionRawMutex, RefCell<Pending>>,
}

impl SyncInbox {
    /// Create an empty inbox. `const`, so it can live in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(RefCell::new(Pending {
                token: 0,
                session_open: false,
                address: None,
                resolve_failed: false,
                timestamp: None,
            })),
        }
    }

    /// Leak a fresh inbox, the convenient way to get the `&'static` a
    /// controller wants in tests and host programs.
    #[cfg(feature = "host")]
    #[must_use]
    pub fn leaked() -> &'static Self {
        Box::leak(Box::new(Self::new()))
    }

    /// Start a new session whose replies must come from `server_port`.
    /// Everything pending is cleared and handles from earlier sessions go
    /// stale.
    pub(crate) fn open_session(&'static self, server_port: u16) -> SyncHandle {
        let token = self.pending.lock(|pending| {
            let mut pending = pending.borrow_mut();
            pending.token = pending.token.wrapping_add(1);
            pending.session_open = true;
            pending.address = None;
            pending.resolve_failed = false;
            pending.timestamp = None;
            pending.token
        });
        SyncHandle {
            inbox: self,
            token: SessionToken(token),
            server_port,
        }
    }

    /// End the current session; whatever it still delivers is dropped.
    pub(crate) fn close_session(&self) {
        self.pending.lock(|pending| {
            let mut pending = pending.borrow_mut();
            pending.session_open = false;
            pending.address = None;
            pending.resolve_failed = false;
            pending.timestamp = None;
        });
    }

    pub(crate) fn take_address(&self) -> Option<Ipv4Addr> {
        self.pending
            .lock(|pending| pending.borrow_mut().address.take())
    }

    pub(crate) fn take_resolve_failure(&self) -> bool {
        self.pending
            .lock(|pending| core::mem::take(&mut pending.borrow_mut().resolve_failed))
    }

    pub(crate) fn take_timestamp(&self) -> Option<NtpSeconds> {
        self.pending
            .lock(|pending| pending.borrow_mut().timestamp.take())
    }

    fn deliver_address(&self, token: SessionToken, address: Ipv4Addr) {
        self.pending.lock(|pending| {
            let mut pending = pending.borrow_mut();
            if pending.accepts(token) {
                pending.address = Some(address);
            } else {
                debug!("time sync: dropped stale resolution");
            }
        });
    }

    fn deliver_resolve_failure(&self, token: SessionToken) {
        self.pending.lock(|pending| {
            let mut pending = pending.borrow_mut();
            if pending.accepts(token) {
                pending.resolve_failed = true;
            } else {
                debug!("time sync: dropped stale resolution failure");
            }
        });
    }

    fn deliver_timestamp(&self, token: SessionToken, timestamp: NtpSeconds) {
        self.pending.lock(|pending| {
            let mut pending = pending.borrow_mut();
            if pending.accepts(token) {
                pending.timestamp = Some(timestamp);
            } else {
                debug!("time sync: dropped stale reply");
            }
        });
    }
}

impl Default for SyncInbox {
    fn default() -> Self {
        Self::new()
    }
}
