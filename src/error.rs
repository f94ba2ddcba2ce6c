use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
#[derive(Debug, Display, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An SSID or password does not fit its fixed-capacity field.
    #[display("Credential too long")]
    CredentialTooLong,

    /// The datagram endpoint could not be created.
    #[display("Transport unavailable")]
    TransportUnavailable,

    /// The request datagram could not be handed to the network stack.
    #[display("Send failed")]
    SendFailed,

    /// A computed date-time fell outside the supported calendar range.
    #[display("Timestamp out of range")]
    TimestampOutOfRange,

    /// Calendar fields that do not name a real date or time of day.
    #[display("Invalid clock fields")]
    InvalidClockFields,

    /// The clock sink refused a read or a write.
    #[display("Clock unavailable")]
    ClockUnavailable,
}
