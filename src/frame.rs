//! The 32-bit frame and its field layout.

use crate::checksum::crc8;

/// Number of bytes in every frame, in both directions.
pub const FRAME_LEN: usize = 4;

const ADDRESS_MASK: u8 = 0x1F;
const RETURN_STATUS_MASK: u8 = 0x03;

/// A 32-bit SPI frame: `[opcode, data_hi, data_lo, crc]`.
///
/// The opcode byte packs `[RW:1][ADDR:5][RS:2]`. On MOSI the RS bits are zero;
/// on MISO they carry the device's return status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; FRAME_LEN]);

/// Two-bit return status carried by every response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReturnStatus {
    /// Start-up in progress.
    StartupInProgress = 0b00,
    /// Normal operation, no flags.
    Normal = 0b01,
    /// Self-test running.
    SelfTest = 0b10,
    /// Error, or the previous command was rejected.
    Error = 0b11,
}

impl ReturnStatus {
    /// Maps the two least significant bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & RETURN_STATUS_MASK {
            0b00 => Self::StartupInProgress,
            0b01 => Self::Normal,
            0b10 => Self::SelfTest,
            _ => Self::Error,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// The fields of a frame after bit extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    /// Read/write bit, `true` for a write (command) operation.
    pub write: bool,
    /// 5-bit register address.
    pub address: u8,
    pub return_status: ReturnStatus,
    /// 16-bit payload, MSB first on the wire.
    pub data: u16,
    pub checksum: u8,
}

impl Fields {
    /// The payload read as a two's complement value.
    pub fn data_i16(&self) -> i16 {
        self.data as i16
    }
}

impl Frame {
    pub const fn new(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds a frame from its fields and fills in the checksum.
    ///
    /// `address` is truncated to its 5 bits.
    pub const fn encode(write: bool, address: u8, return_status: ReturnStatus, data: u16) -> Self {
        let opcode = ((write as u8) << 7) | ((address & ADDRESS_MASK) << 2) | return_status.bits();
        let [data_hi, data_lo] = data.to_be_bytes();
        let header = [opcode, data_hi, data_lo];
        Self([opcode, data_hi, data_lo, crc8(header)])
    }

    /// Splits the frame into its fields. No validation is done here.
    pub const fn decode(&self) -> Fields {
        let opcode = self.0[0];
        Fields {
            write: (opcode >> 7) != 0,
            address: (opcode >> 2) & ADDRESS_MASK,
            return_status: ReturnStatus::from_bits(opcode),
            data: ((self.0[1] as u16) << 8) | self.0[2] as u16,
            checksum: self.0[3],
        }
    }

    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// The three bytes covered by the checksum.
    pub const fn header(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    pub const fn checksum(&self) -> u8 {
        self.0[3]
    }
}

impl From<[u8; FRAME_LEN]> for Frame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;

    const STATUSES: [ReturnStatus; 4] = [
        ReturnStatus::StartupInProgress,
        ReturnStatus::Normal,
        ReturnStatus::SelfTest,
        ReturnStatus::Error,
    ];

    #[test]
    fn decode_read_acceleration_x() {
        let fields = Command::ReadAccelerationX.frame().decode();
        assert!(!fields.write);
        assert_eq!(fields.address, 0x01);
        assert_eq!(fields.return_status, ReturnStatus::StartupInProgress);
        assert_eq!(fields.data, 0x0000);
        assert_eq!(fields.checksum, 0xF7);
    }

    #[test]
    fn decode_switch_to_bank_1() {
        let fields = Command::SwitchToBank1.frame().decode();
        assert!(fields.write);
        assert_eq!(fields.address, 0x1F);
        assert_eq!(fields.data, 0x0001);
    }

    #[test]
    fn decode_signed_payload() {
        let fields = Frame::new([0x05, 0xFF, 0x38, 0x00]).decode();
        assert_eq!(fields.return_status, ReturnStatus::Normal);
        assert_eq!(fields.data, 0xFF38);
        assert_eq!(fields.data_i16(), -200);
    }

    #[test]
    fn encode_reproduces_catalogue() {
        for command in Command::ALL {
            let fields = command.frame().decode();
            let rebuilt = Frame::encode(fields.write, fields.address, fields.return_status, fields.data);
            assert_eq!(rebuilt, command.frame(), "{}", command.name());
        }
    }

    #[test]
    fn encode_decode_recovers_fields() {
        for write in [false, true] {
            for address in 0..=0x1F {
                for status in STATUSES {
                    for data in 0..=u16::MAX {
                        let frame = Frame::encode(write, address, status, data);
                        let fields = frame.decode();
                        assert_eq!(fields.write, write);
                        assert_eq!(fields.address, address);
                        assert_eq!(fields.return_status, status);
                        assert_eq!(fields.data, data);
                        assert_eq!(fields.checksum, crc8(frame.header()));
                    }
                }
            }
        }
    }

    #[test]
    fn return_status_from_bits_ignores_high_bits() {
        assert_eq!(ReturnStatus::from_bits(0xFD), ReturnStatus::Normal);
        assert_eq!(ReturnStatus::from_bits(0x03), ReturnStatus::Error);
    }
}
