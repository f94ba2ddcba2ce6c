//! Wire format for the Network Time Protocol (NTP) exchange.
//!
//! One fixed-size datagram each way: a mostly-zero client request out, a
//! server reply back whose transmit timestamp is the only field read.

use derive_more::derive::Display;

use crate::unix_seconds::NtpSeconds;

/// Every request and reply is exactly this long.
pub const PACKET_LEN: usize = 48;

/// The well-known Network Time Protocol (NTP) server port.
pub const SERVER_PORT: u16 = 123;

// Low three bits of byte 0.
const MODE_MASK: u8 = 0x07;
const MODE_SERVER: u8 = 4;

/// Build a Network Time Protocol (NTP) request (48 bytes, version 3, client mode).
#[must_use]
pub const fn client_request() -> [u8; PACKET_LEN] {
    let mut request = [0u8; PACKET_LEN];
    request[0] = 0x1B; // LI=0, VN=3, Mode=3 (client)
    request
}

/// Why a candidate datagram was not accepted as the server's reply.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError {
    /// Sender is not the port the request went to.
    #[display("Unexpected source port")]
    SourcePort,

    /// Datagram is not the fixed packet size.
    #[display("Wrong length")]
    Length,

    /// Mode bits do not say "server".
    #[display("Not a server reply")]
    Mode,

    /// Stratum 0, the kiss-of-death marker.
    #[display("Stratum zero")]
    KissOfDeath,
}

/// Validate a candidate reply and extract its transmit timestamp.
///
/// A datagram counts as the reply only when it comes from `server_port`
/// (the port the session's request went to, [`SERVER_PORT`] unless
/// reconfigured), is exactly [`PACKET_LEN`] bytes, carries server mode bits,
/// and names a nonzero stratum. Anything else is reported with the first
/// failed check.
pub fn parse_reply(
    payload: &[u8],
    source_port: u16,
    server_port: u16,
) -> Result<NtpSeconds, ReplyError> {
    if source_port != server_port {
        return Err(ReplyError::SourcePort);
    }
    let reply: &[u8; PACKET_LEN] = payload.try_into().map_err(|_| ReplyError::Length)?;
    if reply[0] & MODE_MASK != MODE_SERVER {
        return Err(ReplyError::Mode);
    }
    if reply[1] == 0 {
        return Err(ReplyError::KissOfDeath);
    }

    // Extract the transmit timestamp (bytes 40-43, big-endian seconds)
    let seconds = u32::from_be_bytes([reply[40], reply[41], reply[42], reply[43]]);
    Ok(NtpSeconds(seconds))
}
