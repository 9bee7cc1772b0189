//! Decoding of the status summary, error flag and command registers.
//!
//! The two error flag registers are 16-bit masks. Only the reason for the
//! lowest set bit is surfaced; callers needing every bit read the raw mask.

use crate::{Error, ReturnStatus};

/// Maps each bit of a 16-bit flag register to a reason.
#[derive(Debug)]
pub struct ReasonMap<R> {
    /// Reported when no bit is set.
    pub none: R,
    /// `bits[n]` is the reason for bit `1 << n`.
    pub bits: [R; 16],
}

/// Returns the reason for the lowest set bit of `flags`.
pub fn decode_reason<R: Copy>(flags: u16, map: &ReasonMap<R>) -> R {
    if flags == 0 {
        return map.none;
    }
    map.bits[flags.trailing_zeros() as usize]
}

/// Reasons behind bits of the ERR_FLAG1 register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorFlag1Reason {
    SuccessNoError = 0x0000,
    Mem = 0x0001,
    AfeSatBit1 = 0x0002,
    AfeSatBit2 = 0x0004,
    AfeSatBit3 = 0x0008,
    AfeSatBit4 = 0x0010,
    AfeSatBit5 = 0x0020,
    AfeSatBit6 = 0x0040,
    AfeSatBit7 = 0x0080,
    AfeSatBit8 = 0x0100,
    AfeSatBit9 = 0x0200,
    AfeSatBit10 = 0x0400,
    AdcSat = 0x0800,
    Reserved1 = 0x1000,
    Reserved2 = 0x2000,
    Reserved3 = 0x4000,
    Reserved4 = 0x8000,
}

pub const ERROR_FLAG_1_REASONS: ReasonMap<ErrorFlag1Reason> = ReasonMap {
    none: ErrorFlag1Reason::SuccessNoError,
    bits: [
        ErrorFlag1Reason::Mem,
        ErrorFlag1Reason::AfeSatBit1,
        ErrorFlag1Reason::AfeSatBit2,
        ErrorFlag1Reason::AfeSatBit3,
        ErrorFlag1Reason::AfeSatBit4,
        ErrorFlag1Reason::AfeSatBit5,
        ErrorFlag1Reason::AfeSatBit6,
        ErrorFlag1Reason::AfeSatBit7,
        ErrorFlag1Reason::AfeSatBit8,
        ErrorFlag1Reason::AfeSatBit9,
        ErrorFlag1Reason::AfeSatBit10,
        ErrorFlag1Reason::AdcSat,
        ErrorFlag1Reason::Reserved1,
        ErrorFlag1Reason::Reserved2,
        ErrorFlag1Reason::Reserved3,
        ErrorFlag1Reason::Reserved4,
    ],
};

impl ErrorFlag1Reason {
    pub fn from_flags(flags: u16) -> Self {
        decode_reason(flags, &ERROR_FLAG_1_REASONS)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::SuccessNoError => "No errors present",
            Self::Mem => "Error in non-volatile memory",
            Self::AfeSatBit1 => "Signal saturated at C2V - Bit 1",
            Self::AfeSatBit2 => "Signal saturated at C2V - Bit 2",
            Self::AfeSatBit3 => "Signal saturated at C2V - Bit 3",
            Self::AfeSatBit4 => "Signal saturated at C2V - Bit 4",
            Self::AfeSatBit5 => "Signal saturated at C2V - Bit 5",
            Self::AfeSatBit6 => "Signal saturated at C2V - Bit 6",
            Self::AfeSatBit7 => "Signal saturated at C2V - Bit 7",
            Self::AfeSatBit8 => "Signal saturated at C2V - Bit 8",
            Self::AfeSatBit9 => "Signal saturated at C2V - Bit 9",
            Self::AfeSatBit10 => "Signal saturated at C2V - Bit 10",
            Self::AdcSat => "Signal saturated at A2D",
            Self::Reserved1 => "Reserved - Bit 1",
            Self::Reserved2 => "Reserved - Bit 2",
            Self::Reserved3 => "Reserved - Bit 3",
            Self::Reserved4 => "Reserved - Bit 4",
        }
    }
}

/// Reasons behind bits of the ERR_FLAG2 register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorFlag2Reason {
    SuccessNoError = 0x0000,
    Clk = 0x0001,
    TempSat = 0x0002,
    Apwr2 = 0x0004,
    Vref = 0x0008,
    Dpwr = 0x0010,
    Apwr = 0x0020,
    Reserved6 = 0x0040,
    MemoryCrc = 0x0080,
    Pd = 0x0100,
    ModeChange = 0x0200,
    Reserved10 = 0x0400,
    Vdd = 0x0800,
    Agnd = 0x1000,
    AExtC = 0x2000,
    DExtC = 0x4000,
    Reserved15 = 0x8000,
}

pub const ERROR_FLAG_2_REASONS: ReasonMap<ErrorFlag2Reason> = ReasonMap {
    none: ErrorFlag2Reason::SuccessNoError,
    bits: [
        ErrorFlag2Reason::Clk,
        ErrorFlag2Reason::TempSat,
        ErrorFlag2Reason::Apwr2,
        ErrorFlag2Reason::Vref,
        ErrorFlag2Reason::Dpwr,
        ErrorFlag2Reason::Apwr,
        ErrorFlag2Reason::Reserved6,
        ErrorFlag2Reason::MemoryCrc,
        ErrorFlag2Reason::Pd,
        ErrorFlag2Reason::ModeChange,
        ErrorFlag2Reason::Reserved10,
        ErrorFlag2Reason::Vdd,
        ErrorFlag2Reason::Agnd,
        ErrorFlag2Reason::AExtC,
        ErrorFlag2Reason::DExtC,
        ErrorFlag2Reason::Reserved15,
    ],
};

impl ErrorFlag2Reason {
    pub fn from_flags(flags: u16) -> Self {
        decode_reason(flags, &ERROR_FLAG_2_REASONS)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::SuccessNoError => "No errors present",
            Self::Clk => "Clock error",
            Self::TempSat => "Temperature signal path saturated",
            Self::Apwr2 => "Analog power error 2",
            Self::Vref => "Reference voltage error",
            Self::Dpwr => "Digital power error - SW or HW reset needed",
            Self::Apwr => "Analog power error",
            Self::Reserved6 => "Reserved - Bit 6",
            Self::MemoryCrc => "Memory CRC check failed",
            Self::Pd => "Device in power down mode",
            Self::ModeChange => "Operation mode changed by user",
            Self::Reserved10 => "Reserved - Bit 10",
            Self::Vdd => "Supply voltage error",
            Self::Agnd => "Analog ground connection error",
            Self::AExtC => "A - External capacitor connection error",
            Self::DExtC => "D - External capacitor connection error",
            Self::Reserved15 => "Reserved - Bit 15",
        }
    }

    /// Only a digital power error calls for a software or hardware reset.
    pub fn requires_reset(self) -> bool {
        self == Self::Dpwr
    }
}

// Fault reported by each status summary bit, lowest bit first.
const STATUS_SUMMARY_FAULTS: [Error; 10] = [
    Error::PinContinuity,
    Error::ModeChanged,
    Error::DevicePoweredDown,
    Error::NonVolatileMemory,
    Error::VoltageLevel,
    Error::TemperatureSaturated,
    Error::AccelerationSaturated,
    Error::ClockError,
    Error::DigitalBlockType2,
    Error::DigitalBlockType1,
];

/// Converts a status summary reading into the fault it reports.
///
/// The return status of the response takes precedence: start-up and
/// self-test are reported as such whatever the register holds. Among
/// fault bits the lowest one wins; bits 10..15 carry no specific fault.
pub fn status_summary_error(return_status: ReturnStatus, status: u16) -> Result<(), Error> {
    match return_status {
        ReturnStatus::StartupInProgress => return Err(Error::StartupInProgress),
        ReturnStatus::SelfTest => return Err(Error::SelfTestRunning),
        ReturnStatus::Normal | ReturnStatus::Error => {}
    }

    if status == 0 {
        return Ok(());
    }

    let lowest = status.trailing_zeros() as usize;
    Err(STATUS_SUMMARY_FAULTS
        .get(lowest)
        .copied()
        .unwrap_or(Error::ErrorFlagsActive))
}

/// Fields of the command (MODE) register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CommandRegisterValue {
    Mode1 = 0x0000,
    Mode2 = 0x0001,
    Mode3 = 0x0002,
    Mode4 = 0x0003,
    Pd = 0x0004,
    FactoryUseBit3 = 0x0008,
    FactoryUseBit4 = 0x0010,
    SwRst = 0x0020,
    FactoryUseBit6 = 0x0040,
    FactoryUseBit7 = 0x0080,
    ReservedBit8 = 0x0100,
    ReservedBit9 = 0x0200,
    ReservedBit10 = 0x0400,
    ReservedBit11 = 0x0800,
    ReservedBit12 = 0x1000,
    ReservedBit13 = 0x2000,
    ReservedBit14 = 0x4000,
    ReservedBit15 = 0x8000,
}

// Single-bit fields above the two mode bits, bit 2 first.
const COMMAND_REGISTER_BITS: [CommandRegisterValue; 14] = [
    CommandRegisterValue::Pd,
    CommandRegisterValue::FactoryUseBit3,
    CommandRegisterValue::FactoryUseBit4,
    CommandRegisterValue::SwRst,
    CommandRegisterValue::FactoryUseBit6,
    CommandRegisterValue::FactoryUseBit7,
    CommandRegisterValue::ReservedBit8,
    CommandRegisterValue::ReservedBit9,
    CommandRegisterValue::ReservedBit10,
    CommandRegisterValue::ReservedBit11,
    CommandRegisterValue::ReservedBit12,
    CommandRegisterValue::ReservedBit13,
    CommandRegisterValue::ReservedBit14,
    CommandRegisterValue::ReservedBit15,
];

impl CommandRegisterValue {
    pub fn description(self) -> &'static str {
        match self {
            Self::Mode1 => "MODE_1 -> Operation Mode 1",
            Self::Mode2 => "MODE_2 -> Operation Mode 2",
            Self::Mode3 => "MODE_3 -> Operation Mode 3",
            Self::Mode4 => "MODE_4 -> Operation Mode 4",
            Self::Pd => "PD -> Power Down",
            Self::FactoryUseBit3 => "FACTORY_USE -> Factory use - Bit 3",
            Self::FactoryUseBit4 => "FACTORY_USE -> Factory use - Bit 4",
            Self::SwRst => "SW_RST -> Software (SW) Reset",
            Self::FactoryUseBit6 => "FACTORY_USE -> Factory use - Bit 6",
            Self::FactoryUseBit7 => "FACTORY_USE -> Factory use - Bit 7",
            Self::ReservedBit8 => "RESERVED -> Reserved - Bit 8",
            Self::ReservedBit9 => "RESERVED -> Reserved - Bit 9",
            Self::ReservedBit10 => "RESERVED -> Reserved - Bit 10",
            Self::ReservedBit11 => "RESERVED -> Reserved - Bit 11",
            Self::ReservedBit12 => "RESERVED -> Reserved - Bit 12",
            Self::ReservedBit13 => "RESERVED -> Reserved - Bit 13",
            Self::ReservedBit14 => "RESERVED -> Reserved - Bit 14",
            Self::ReservedBit15 => "RESERVED -> Reserved - Bit 15",
        }
    }
}

/// Lists the fields set in a command register value: the mode first, then
/// every other set bit from low to high.
pub fn command_register_values(value: u16) -> impl Iterator<Item = CommandRegisterValue> {
    let mode = match value & 0x0003 {
        0 => CommandRegisterValue::Mode1,
        1 => CommandRegisterValue::Mode2,
        2 => CommandRegisterValue::Mode3,
        _ => CommandRegisterValue::Mode4,
    };
    let flags = COMMAND_REGISTER_BITS
        .into_iter()
        .filter(move |field| value & (*field as u16) != 0);
    core::iter::once(mode).chain(flags)
}
