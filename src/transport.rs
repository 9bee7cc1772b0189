//! The two capabilities the driver is built on: a full-duplex frame
//! exchange and a monotonic clock.

use embedded_hal::spi::SpiDevice;

use crate::{Frame, FRAME_LEN};

/// Microsecond instant used by the transfer timing gate.
pub type Instant = fugit::TimerInstantU64<1_000_000>;

/// Full-duplex exchange of one frame.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Clocks `tx` out while filling `rx`, with chip select asserted for the
    /// whole frame. Returns the number of bytes written.
    fn transfer(&mut self, tx: &Frame, rx: &mut [u8; FRAME_LEN]) -> Result<usize, Self::Error>;
}

/// Monotonic time source.
pub trait Clock {
    fn now(&mut self) -> Instant;
}

/// [`Transport`] over an `embedded-hal` SPI device.
///
/// The device owns chip select; it must be configured for SPI mode 0,
/// MSB first, at no more than 8 MHz.
pub struct SpiTransport<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> SpiTransport<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Gives the SPI device back.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> Transport for SpiTransport<SPI> {
    type Error = SPI::Error;

    fn transfer(&mut self, tx: &Frame, rx: &mut [u8; FRAME_LEN]) -> Result<usize, Self::Error> {
        self.spi.transfer(rx, tx.as_bytes())?;
        Ok(FRAME_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;
    use core::convert::Infallible;
    use embedded_hal::spi::{ErrorType, Operation};

    // Echoes every MOSI byte back on MISO.
    struct Loopback {
        transactions: usize,
    }

    impl ErrorType for Loopback {
        type Error = Infallible;
    }

    impl SpiDevice for Loopback {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            self.transactions += 1;
            for operation in operations {
                if let Operation::Transfer(read, write) = operation {
                    let len = read.len();
                    read.copy_from_slice(&write[..len]);
                }
            }
            Ok(())
        }
    }

    #[test]
    fn spi_transfer_is_one_transaction() {
        let mut transport = SpiTransport::new(Loopback { transactions: 0 });
        let tx = Command::ReadWhoAmI.frame();
        let mut rx = [0u8; FRAME_LEN];

        assert_eq!(transport.transfer(&tx, &mut rx), Ok(FRAME_LEN));
        assert_eq!(&rx, tx.as_bytes());
        assert_eq!(transport.release().transactions, 1);
    }
}
