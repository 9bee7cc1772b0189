//! Error taxonomy shared by every layer of the driver.

use core::fmt;

/// Every failure the driver can report.
///
/// The taxonomy is flat: one variant per condition, whether it comes from the
/// link (checksum, byte count), from frame matching, or from the fault bits of
/// the status summary register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Command frame is not in the catalogue, or the device flagged it as invalid.
    InvalidCommandFrame,
    /// The transport wrote fewer (or more) bytes than a frame holds.
    IncorrectNumberOfBytesWritten { written: usize },
    /// Response frame failed its CRC check.
    BadChecksum { expected: u8, received: u8 },
    /// Response address does not match the command address.
    InvalidResponseFrame,
    /// Response read/write bit does not match the command.
    OpcodeReadWriteMismatch,
    /// Return status reports start-up in progress.
    StartupInProgress,
    /// Return status reports self-test running.
    SelfTestRunning,
    /// Status summary has flags set that map to no specific fault.
    ErrorFlagsActive,
    /// Self-test output signal exceeds its threshold.
    StoExceedsThreshold,
    /// Self-test output exceeded its threshold on too many consecutive reads.
    StoComponentFailure,
    /// Component internal connection error.
    PinContinuity,
    /// Operation mode changed.
    ModeChanged,
    /// Status summary reports the device is powered down.
    DevicePoweredDown,
    /// Error in non-volatile memory.
    NonVolatileMemory,
    /// Start-up indication, or supply voltage levels outside the safe range.
    VoltageLevel,
    /// Temperature signal path saturated.
    TemperatureSaturated,
    /// Acceleration signal path saturated.
    AccelerationSaturated,
    /// Clock error.
    ClockError,
    /// Digital block error type 2.
    DigitalBlockType2,
    /// Digital block error type 1.
    DigitalBlockType1,
    /// The underlying transport returned an error.
    TransferFailure,
    /// Transition refused because the device is powered down.
    PoweredDown,
    /// WHOAMI did not return the expected component id.
    WhoAmIMismatch { found: u8 },
}

impl Error {
    /// Start-up and self-test conditions clear on their own; polling again is fine.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StartupInProgress | Self::SelfTestRunning)
    }

    /// The datasheet remedy for this fault is a software or hardware reset.
    ///
    /// The driver never resets by itself; this only tells the caller what to do.
    pub fn requires_reset(&self) -> bool {
        matches!(
            self,
            Self::ModeChanged
                | Self::DevicePoweredDown
                | Self::NonVolatileMemory
                | Self::VoltageLevel
                | Self::ClockError
                | Self::DigitalBlockType2
                | Self::DigitalBlockType1
        )
    }

    /// `false` when the part on the bus is not the expected device at all.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::WhoAmIMismatch { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCommandFrame => write!(f, "command frame invalid or has incorrect CRC"),
            Self::IncorrectNumberOfBytesWritten { written } => {
                write!(f, "incorrect number of bytes transmitted: {}", written)
            }
            Self::BadChecksum { expected, received } => write!(
                f,
                "response frame checksum failure: expected 0x{:02X}, received 0x{:02X}",
                expected, received
            ),
            Self::InvalidResponseFrame => {
                write!(f, "response address does not match transmitted command")
            }
            Self::OpcodeReadWriteMismatch => {
                write!(f, "response read/write bit does not match transmitted command")
            }
            Self::StartupInProgress => write!(f, "start-up is in progress"),
            Self::SelfTestRunning => write!(f, "self-test is running"),
            Self::ErrorFlagsActive => write!(f, "error flags active in status summary"),
            Self::StoExceedsThreshold => write!(f, "self-test output exceeds threshold"),
            Self::StoComponentFailure => {
                write!(f, "component failure: self-test output exceeded threshold repeatedly")
            }
            Self::PinContinuity => write!(f, "component internal connection error"),
            Self::ModeChanged => write!(f, "operation mode changed"),
            Self::DevicePoweredDown => write!(f, "device in power down mode"),
            Self::NonVolatileMemory => write!(f, "error in non-volatile memory"),
            Self::VoltageLevel => write!(f, "start-up indication or voltage levels out of range"),
            Self::TemperatureSaturated => write!(f, "temperature signal path saturated"),
            Self::AccelerationSaturated => write!(f, "acceleration signal path saturated"),
            Self::ClockError => write!(f, "clock error"),
            Self::DigitalBlockType2 => write!(f, "digital block error type 2"),
            Self::DigitalBlockType1 => write!(f, "digital block error type 1"),
            Self::TransferFailure => write!(f, "SPI transfer failed"),
            Self::PoweredDown => write!(f, "device is powered down"),
            Self::WhoAmIMismatch { found } => {
                write!(f, "WHOAMI mismatch: found 0x{:02X}", found)
            }
        }
    }
}
