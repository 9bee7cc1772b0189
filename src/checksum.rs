//! CRC-8 used by every SPI frame.
//!
//! Polynomial 0x1D, seed 0xFF, result inverted, MSB first over the three
//! leading bytes of the frame. That is the CRC-8/SAE-J1850 parameter set.

use crc::{Crc, CRC_8_SAE_J1850};

use crate::{Error, Frame};

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SAE_J1850);

/// Computes the checksum byte for the three leading bytes of a frame.
pub const fn crc8(bytes: [u8; 3]) -> u8 {
    CRC8.checksum(&bytes)
}

/// Checks the trailing checksum byte of `frame`.
pub fn validate(frame: &Frame) -> Result<(), Error> {
    let expected = crc8(frame.header());
    let received = frame.checksum();
    if expected != received {
        return Err(Error::BadChecksum { expected, received });
    }
    Ok(())
}
