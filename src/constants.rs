//! Protocol constants, register map and the command frame catalogue.

use fugit::MicrosDurationU64;

use crate::checksum::crc8;
use crate::Frame;

// WHO_AM_I is the fixed component id returned by the WHOAMI register.
pub const WHO_AM_I: u8 = 0xC1;

// MIN_TRANSFER_INTERVAL is the minimum time between the end of one SPI frame
// and the start of the next. Shorter gaps corrupt the sensor output.
pub const MIN_TRANSFER_INTERVAL: MicrosDurationU64 = MicrosDurationU64::from_ticks(10);

// POWER_ON_DELAY_MS is the time to wait after power-up before the first frame.
pub const POWER_ON_DELAY_MS: u32 = 1;

// RESET_DELAY_MS is the time the device needs after a software reset.
pub const RESET_DELAY_MS: u32 = 1;

// SERIAL_SUFFIX is appended to the decimal serial number printed on the part.
pub const SERIAL_SUFFIX: &str = "B33";

/// Registers addressed by the catalogue frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    AccelerationX = 0x01,
    AccelerationY = 0x02,
    AccelerationZ = 0x03,
    SelfTestOutput = 0x04,
    Temperature = 0x05,
    StatusSummary = 0x06,
    ErrorFlag1 = 0x07,
    ErrorFlag2 = 0x08,
    AngleX = 0x09,
    AngleY = 0x0A,
    AngleZ = 0x0B,
    AngleControl = 0x0C,
    /// Mode, power down and software reset all go through this register.
    Command = 0x0D,
    WhoAmI = 0x10,
    Serial1 = 0x19,
    Serial2 = 0x1A,
    SelectBank = 0x1F,
}

impl Register {
    pub const fn address(self) -> u8 {
        self as u8
    }
}

/// The closed set of frames the driver is allowed to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ReadAccelerationX,
    ReadAccelerationY,
    ReadAccelerationZ,
    ReadSelfTestOutput,
    EnableAngleOutputs,
    ReadAngleX,
    ReadAngleY,
    ReadAngleZ,
    ReadTemperature,
    ReadStatusSummary,
    ReadErrorFlag1,
    ReadErrorFlag2,
    ReadCommand,
    ChangeToMode1,
    ChangeToMode2,
    ChangeToMode3,
    ChangeToMode4,
    SetPowerDownMode,
    WakeUpFromPowerDown,
    SoftwareReset,
    ReadWhoAmI,
    ReadSerial1,
    ReadSerial2,
    ReadCurrentBank,
    SwitchToBank0,
    SwitchToBank1,
}

impl Command {
    pub const ALL: [Command; 26] = [
        Command::ReadAccelerationX,
        Command::ReadAccelerationY,
        Command::ReadAccelerationZ,
        Command::ReadSelfTestOutput,
        Command::EnableAngleOutputs,
        Command::ReadAngleX,
        Command::ReadAngleY,
        Command::ReadAngleZ,
        Command::ReadTemperature,
        Command::ReadStatusSummary,
        Command::ReadErrorFlag1,
        Command::ReadErrorFlag2,
        Command::ReadCommand,
        Command::ChangeToMode1,
        Command::ChangeToMode2,
        Command::ChangeToMode3,
        Command::ChangeToMode4,
        Command::SetPowerDownMode,
        Command::WakeUpFromPowerDown,
        Command::SoftwareReset,
        Command::ReadWhoAmI,
        Command::ReadSerial1,
        Command::ReadSerial2,
        Command::ReadCurrentBank,
        Command::SwitchToBank0,
        Command::SwitchToBank1,
    ];

    /// The canonical frame, byte for byte as the device expects it.
    pub const fn frame(self) -> Frame {
        Frame::new(self.entry().bytes)
    }

    pub const fn register(self) -> Register {
        self.entry().register
    }

    pub const fn name(self) -> &'static str {
        self.entry().name
    }

    const fn entry(self) -> Entry {
        CATALOGUE[self as usize]
    }

    /// Looks `frame` up in the catalogue.
    ///
    /// Wake-up and mode 1 share their bytes; the first entry wins.
    pub fn from_frame(frame: &Frame) -> Option<Command> {
        Self::ALL.into_iter().find(|command| command.frame() == *frame)
    }
}

#[derive(Clone, Copy)]
struct Entry {
    bytes: [u8; 4],
    name: &'static str,
    register: Register,
}

const fn entry(bytes: [u8; 4], name: &'static str, register: Register) -> Entry {
    Entry {
        bytes,
        name,
        register,
    }
}

// Indexed by `Command as usize`; keep in declaration order.
#[rustfmt::skip]
const CATALOGUE: [Entry; 26] = [
    entry([0x04, 0x00, 0x00, 0xF7], "READ_ACCELERATION_X_AXIS", Register::AccelerationX),
    entry([0x08, 0x00, 0x00, 0xFD], "READ_ACCELERATION_Y_AXIS", Register::AccelerationY),
    entry([0x0C, 0x00, 0x00, 0xFB], "READ_ACCELERATION_Z_AXIS", Register::AccelerationZ),
    entry([0x10, 0x00, 0x00, 0xE9], "READ_SELF_TEST_OUTPUT", Register::SelfTestOutput),
    entry([0xB0, 0x00, 0x1F, 0x6F], "ENABLE_ANGLE_OUTPUTS", Register::AngleControl),
    entry([0x24, 0x00, 0x00, 0xC7], "READ_ANGLE_X_AXIS", Register::AngleX),
    entry([0x28, 0x00, 0x00, 0xCD], "READ_ANGLE_Y_AXIS", Register::AngleY),
    entry([0x2C, 0x00, 0x00, 0xCB], "READ_ANGLE_Z_AXIS", Register::AngleZ),
    entry([0x14, 0x00, 0x00, 0xEF], "READ_TEMPERATURE", Register::Temperature),
    entry([0x18, 0x00, 0x00, 0xE5], "READ_STATUS_SUMMARY", Register::StatusSummary),
    entry([0x1C, 0x00, 0x00, 0xE3], "READ_ERROR_FLAG_1", Register::ErrorFlag1),
    entry([0x20, 0x00, 0x00, 0xC1], "READ_ERROR_FLAG_2", Register::ErrorFlag2),
    entry([0x34, 0x00, 0x00, 0xDF], "READ_COMMAND", Register::Command),
    entry([0xB4, 0x00, 0x00, 0x1F], "CHANGE_TO_MODE_1", Register::Command),
    entry([0xB4, 0x00, 0x01, 0x02], "CHANGE_TO_MODE_2", Register::Command),
    entry([0xB4, 0x00, 0x02, 0x25], "CHANGE_TO_MODE_3", Register::Command),
    entry([0xB4, 0x00, 0x03, 0x38], "CHANGE_TO_MODE_4", Register::Command),
    entry([0xB4, 0x00, 0x04, 0x6B], "SET_POWERDOWN_MODE", Register::Command),
    // Waking up is a plain write of mode 1.
    entry([0xB4, 0x00, 0x00, 0x1F], "WAKEUP_FROM_POWERDOWN_MODE", Register::Command),
    entry([0xB4, 0x00, 0x20, 0x98], "SOFTWARE_RESET", Register::Command),
    entry([0x40, 0x00, 0x00, 0x91], "READ_WHO_AM_I", Register::WhoAmI),
    entry([0x64, 0x00, 0x00, 0xA7], "READ_SERIAL_1", Register::Serial1),
    entry([0x68, 0x00, 0x00, 0xAD], "READ_SERIAL_2", Register::Serial2),
    entry([0x7C, 0x00, 0x00, 0xB3], "READ_CURRENT_BANK", Register::SelectBank),
    entry([0xFC, 0x00, 0x00, 0x73], "SWITCH_TO_BANK_0", Register::SelectBank),
    entry([0xFC, 0x00, 0x01, 0x6E], "SWITCH_TO_BANK_1", Register::SelectBank),
];

const fn catalogue_is_consistent() -> bool {
    let mut i = 0;
    while i < Command::ALL.len() {
        let frame = Command::ALL[i].frame();
        let fields = frame.decode();
        if Command::ALL[i] as usize != i
            || crc8(frame.header()) != frame.checksum()
            || fields.address != Command::ALL[i].register().address()
        {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(catalogue_is_consistent(), "catalogue frame with bad CRC or address");

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Command::ReadAccelerationX, Register::AccelerationX, false; "acceleration x")]
    #[test_case(Command::ReadTemperature, Register::Temperature, false; "temperature")]
    #[test_case(Command::EnableAngleOutputs, Register::AngleControl, true; "angle control")]
    #[test_case(Command::SoftwareReset, Register::Command, true; "software reset")]
    #[test_case(Command::ReadCommand, Register::Command, false; "read command")]
    #[test_case(Command::ReadCurrentBank, Register::SelectBank, false; "read bank")]
    #[test_case(Command::SwitchToBank0, Register::SelectBank, true; "bank 0")]
    fn frame_targets_register(command: Command, register: Register, write: bool) {
        let fields = command.frame().decode();
        assert_eq!(fields.address, register.address());
        assert_eq!(command.register(), register);
        assert_eq!(fields.write, write);
    }

    #[test_case(Command::ReadAccelerationX, "READ_ACCELERATION_X_AXIS"; "first entry")]
    #[test_case(Command::WakeUpFromPowerDown, "WAKEUP_FROM_POWERDOWN_MODE"; "wake up")]
    #[test_case(Command::SwitchToBank1, "SWITCH_TO_BANK_1"; "last entry")]
    fn command_names(command: Command, name: &str) {
        assert_eq!(command.name(), name);
    }

    #[test]
    fn catalogue_lookup() {
        for command in Command::ALL {
            let found = Command::from_frame(&command.frame()).unwrap();
            assert_eq!(found.frame(), command.frame());
        }
        assert_eq!(
            Command::from_frame(&Command::WakeUpFromPowerDown.frame()),
            Some(Command::ChangeToMode1)
        );
    }

    #[test]
    fn unknown_frames_are_rejected() {
        assert_eq!(Command::from_frame(&Frame::new([0x04, 0x00, 0x00, 0xF6])), None);
        assert_eq!(Command::from_frame(&Frame::new([0x00, 0x00, 0x00, 0x00])), None);
        let factory_bit = Frame::encode(true, 0x0D, crate::ReturnStatus::StartupInProgress, 0x0008);
        assert_eq!(Command::from_frame(&factory_bit), None);
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in Command::ALL.iter().enumerate() {
            for b in &Command::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
