#![cfg_attr(not(test), no_std)]
//! `no_std` driver for the Murata SCL3300 inclinometer.
//!
//! Talks the sensor's 32-bit SPI frame protocol through any
//! `embedded-hal` [`SpiDevice`](embedded_hal::spi::SpiDevice), keeps track of
//! the selected register bank and operating mode, and decodes the status and
//! error flag registers.

use core::fmt;

use embedded_hal::delay::DelayNs;
use fugit::MicrosDurationU64;
use log::debug;

pub mod checksum;
pub use checksum::crc8;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod frame;
pub use frame::*;

mod classify;
pub use classify::*;

mod status;
pub use status::*;

mod readings;
pub use readings::*;

mod transport;
pub use transport::*;

pub mod units;
pub use units::TemperatureScale;

/// Register bank selected through SELBANK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryBank {
    Bank0,
    Bank1,
}

impl MemoryBank {
    /// The frame that selects this bank.
    pub const fn command(self) -> Command {
        match self {
            MemoryBank::Bank0 => Command::SwitchToBank0,
            MemoryBank::Bank1 => Command::SwitchToBank1,
        }
    }
}

/// Operating mode as last set by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    Measuring(MeasurementMode),
    PoweredDown,
}

/// The driver's view of the device, changed only by successful transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    pub bank: MemoryBank,
    pub mode: OperatingMode,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            bank: MemoryBank::Bank0,
            mode: OperatingMode::Measuring(MeasurementMode::Mode1),
        }
    }
}

/// Component serial number: SERIAL2 in the high half, SERIAL1 in the low half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialNumber(pub u32);

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, SERIAL_SUFFIX)
    }
}

/// Represents an SCL3300 inclinometer on an SPI bus.
///
/// Every exchange sends one catalogue frame and classifies the response
/// that came back in the same transfer. Transfers are spaced at least
/// [`MIN_TRANSFER_INTERVAL`] apart.
///
/// # Type Parameters
///
/// * `T`: The frame transport, usually [`SpiTransport`].
/// * `D`: A delay provider implementing `embedded_hal::delay::DelayNs`.
/// * `C`: A monotonic microsecond [`Clock`].
pub struct Scl3300<T, D, C> {
    transport: T,
    delay: D,
    clock: C,
    config: Config,
    state: DeviceState,
    classifier: Classifier,
    data: SensorData,
    sto_exceedances: u8,
    last_transfer: Instant,
}

impl<T, D, C> Scl3300<T, D, C>
where
    T: Transport,
    D: DelayNs,
    C: Clock,
{
    /// Creates a new `Scl3300` instance. No I/O is performed.
    ///
    /// # Arguments
    ///
    /// * `transport`: The frame transport connected to the device.
    /// * `delay`: Delay provider used for start-up waits and transfer spacing.
    /// * `clock`: Monotonic clock. The current instant counts as the end of
    ///   the previous transfer.
    /// * `config`: The configuration applied by [`Scl3300::init`].
    pub fn new(transport: T, delay: D, mut clock: C, config: Config) -> Self {
        let last_transfer = clock.now();
        Self {
            transport,
            delay,
            clock,
            config,
            state: DeviceState::default(),
            classifier: Classifier::new(),
            data: SensorData::default(),
            sto_exceedances: 0,
            last_transfer,
        }
    }

    /// Gives back the transport, delay and clock.
    pub fn release(self) -> (T, D, C) {
        (self.transport, self.delay, self.clock)
    }

    /// Returns the bank and mode recorded by the last successful transitions.
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Returns the configuration given to [`Scl3300::new`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Last accepted value of every slot.
    pub fn data(&self) -> &SensorData {
        &self.data
    }

    /// Returns the last accepted value of `slot` without any I/O.
    ///
    /// # Returns
    ///
    /// * `Some(Reading)` with the raw value and the return status it came with.
    /// * `None` if the slot has not been read successfully yet.
    pub fn latest(&self, slot: Slot) -> Option<Reading> {
        self.data.get(slot)
    }

    /// Brings the device up following the start-up sequence.
    ///
    /// This involves:
    /// - Waiting for the power-on delay, then a software reset.
    /// - Selecting the configured measurement mode.
    /// - Enabling the angle outputs, if configured.
    /// - Waiting for the signal path to settle.
    /// - Reading the status summary three times; the last read must be clean.
    /// - Checking the WHOAMI register.
    pub fn init(&mut self) -> Result<(), Error> {
        self.delay.delay_ms(POWER_ON_DELAY_MS);

        self.software_reset().map_err(|e| {
            log::error!("Failed to reset device during init: {:?}", e);
            e
        })?;

        let mode = self.config.mode;
        self.change_mode(mode).map_err(|e| {
            log::error!("Failed to set {:?} during init: {:?}", mode, e);
            e
        })?;

        if self.config.angle_outputs {
            self.enable_angle_outputs().map_err(|e| {
                log::error!("Failed to enable angle outputs during init: {:?}", e);
                e
            })?;
        }

        debug!("Waiting {} ms for {:?} to settle", mode.settling_time_ms(), mode);
        self.delay.delay_ms(mode.settling_time_ms());

        let confirmed = self.confirm_status_cleared();
        let restored = self.ensure_bank(MemoryBank::Bank0);
        confirmed.map_err(|e| {
            log::error!("Status summary not clean after start-up: {:?}", e);
            e
        })?;
        restored?;

        self.verify_who_am_i()?;

        debug!("SCL3300 init sequence complete.");
        Ok(())
    }

    /// Selects a register bank.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the device accepted the switch; the state now records `bank`.
    /// * `Err(Error)` if the exchange failed. The recorded bank is unchanged.
    pub fn switch_to_bank(&mut self, bank: MemoryBank) -> Result<(), Error> {
        self.ensure_awake()?;
        debug!("Switching to {:?}", bank);
        self.write(bank.command()).map_err(|e| {
            log::error!("Failed to switch to {:?}: {:?}", bank, e);
            e
        })?;
        self.state.bank = bank;
        Ok(())
    }

    /// Changes the measurement mode.
    pub fn change_mode(&mut self, mode: MeasurementMode) -> Result<(), Error> {
        self.ensure_awake()?;
        debug!("Changing to {:?}", mode);
        self.write(mode.command()).map_err(|e| {
            log::error!("Failed to change to {:?}: {:?}", mode, e);
            e
        })?;
        self.state.mode = OperatingMode::Measuring(mode);
        Ok(())
    }

    /// Enables the angle outputs. ANG_CTRL lives in bank 0.
    pub fn enable_angle_outputs(&mut self) -> Result<(), Error> {
        self.ensure_awake()?;
        self.ensure_bank(MemoryBank::Bank0)?;
        debug!("Enabling angle outputs");
        self.write(Command::EnableAngleOutputs).map_err(|e| {
            log::error!("Failed to enable angle outputs: {:?}", e);
            e
        })
    }

    /// Puts the device into power down mode.
    ///
    /// Afterwards only [`Scl3300::wake_up`] and [`Scl3300::software_reset`]
    /// are accepted.
    pub fn power_down(&mut self) -> Result<(), Error> {
        self.ensure_awake()?;
        debug!("Powering down");
        self.write(Command::SetPowerDownMode).map_err(|e| {
            log::error!("Failed to power down: {:?}", e);
            e
        })?;
        self.state.mode = OperatingMode::PoweredDown;
        Ok(())
    }

    /// Wakes the device from power down. The device resumes in mode 1.
    pub fn wake_up(&mut self) -> Result<(), Error> {
        debug!("Waking up from power down");
        self.write(Command::WakeUpFromPowerDown).map_err(|e| {
            log::error!("Failed to wake up: {:?}", e);
            e
        })?;
        self.state.mode = OperatingMode::Measuring(MeasurementMode::Mode1);
        Ok(())
    }

    /// Resets the device and returns the recorded state to bank 0, mode 1.
    pub fn software_reset(&mut self) -> Result<(), Error> {
        debug!("Software reset");
        self.write(Command::SoftwareReset).map_err(|e| {
            log::error!("Failed to reset device: {:?}", e);
            e
        })?;
        self.delay.delay_ms(RESET_DELAY_MS);
        self.state = DeviceState::default();
        self.sto_exceedances = 0;
        Ok(())
    }

    /// Reads one slot of the reading set.
    ///
    /// Slots in bank 1 are read with bank 1 selected, after which bank 0 is
    /// selected again, also when the read failed. The slot is updated only on
    /// [`Outcome::Success`]; on an error or a transient start-up response the
    /// previous value is kept.
    pub fn refresh(&mut self, slot: Slot) -> Result<Outcome, Error> {
        let outcome = self.read_slot(slot);
        let restored = self.ensure_bank(MemoryBank::Bank0);
        let outcome = outcome?;
        restored?;
        Ok(outcome)
    }

    /// Reads every slot, bank 0 slots first, and leaves bank 0 selected.
    pub fn refresh_all(&mut self) -> Result<(), Error> {
        let bank_0 = Slot::ALL
            .into_iter()
            .filter(|slot| slot.bank() == MemoryBank::Bank0);
        let bank_1 = Slot::ALL
            .into_iter()
            .filter(|slot| slot.bank() == MemoryBank::Bank1);
        let result = bank_0
            .chain(bank_1)
            .try_for_each(|slot| self.read_slot(slot).map(|_| ()));
        let restored = self.ensure_bank(MemoryBank::Bank0);
        result?;
        restored
    }

    /// Reads the self-test output and checks it against the configured threshold.
    ///
    /// # Returns
    ///
    /// * `Ok(i16)` with the self-test output when it is within the threshold.
    /// * `Err(Error::StoExceedsThreshold)` when it is outside the threshold.
    /// * `Err(Error::StoComponentFailure)` when it has been outside the
    ///   threshold on `sto_failure_limit` consecutive reads.
    pub fn monitor_self_test(&mut self) -> Result<i16, Error> {
        let fields = match self.refresh(Slot::SelfTestOutput)? {
            Outcome::Success(fields) => fields,
            Outcome::TransientStartup => return Err(Error::StartupInProgress),
        };

        let sto = fields.data_i16();
        if sto.unsigned_abs() <= self.config.sto_threshold {
            self.sto_exceedances = 0;
            return Ok(sto);
        }

        self.sto_exceedances = self.sto_exceedances.saturating_add(1);
        log::warn!(
            "Self-test output {} outside ±{} ({} of {})",
            sto,
            self.config.sto_threshold,
            self.sto_exceedances,
            self.config.sto_failure_limit
        );
        if self.sto_exceedances >= self.config.sto_failure_limit {
            log::error!("Self-test output persistently out of range, component failure");
            Err(Error::StoComponentFailure)
        } else {
            Err(Error::StoExceedsThreshold)
        }
    }

    /// Decodes the cached status summary. `Ok` until it has been read once.
    pub fn status_summary_error(&self) -> Result<(), Error> {
        match self.data.get(Slot::StatusSummary) {
            Some(reading) => status_summary_error(reading.return_status, reading.raw),
            None => Ok(()),
        }
    }

    /// Reads the status summary, which clears it on the device.
    pub fn clear_status_summary(&mut self) -> Result<Outcome, Error> {
        self.refresh(Slot::StatusSummary)
    }

    /// Reads error flag 1.
    ///
    /// # Returns
    ///
    /// * `Ok((u16, ErrorFlag1Reason))` with the raw flags and the reason of the lowest set bit.
    /// * `Err(Error)` if the exchange failed.
    pub fn read_error_flag_1(&mut self) -> Result<(u16, ErrorFlag1Reason), Error> {
        let flags = self.read_register(Command::ReadErrorFlag1)?.data;
        let reason = ErrorFlag1Reason::from_flags(flags);
        if flags != 0 {
            log::warn!("Error flag 1 = 0x{:04X}: {}", flags, reason.description());
        }
        Ok((flags, reason))
    }

    /// Reads error flag 2.
    pub fn read_error_flag_2(&mut self) -> Result<(u16, ErrorFlag2Reason), Error> {
        let flags = self.read_register(Command::ReadErrorFlag2)?.data;
        let reason = ErrorFlag2Reason::from_flags(flags);
        if flags != 0 {
            log::warn!("Error flag 2 = 0x{:04X}: {}", flags, reason.description());
        }
        Ok((flags, reason))
    }

    /// Reads the command register and logs each field that is set.
    pub fn read_command_register(&mut self) -> Result<u16, Error> {
        let value = self.read_register(Command::ReadCommand)?.data;
        for field in command_register_values(value) {
            debug!("Command register 0x{:04X}: {}", value, field.description());
        }
        Ok(value)
    }

    /// Reads both serial number registers.
    ///
    /// # Returns
    ///
    /// * `Ok(SerialNumber)` with SERIAL2 in the high half and SERIAL1 in the low half.
    /// * `Err(Error)` if either read failed.
    pub fn read_serial_number(&mut self) -> Result<SerialNumber, Error> {
        let low = self.read_register(Command::ReadSerial1)?.data;
        let high = self.read_register(Command::ReadSerial2)?.data;
        let serial = SerialNumber((u32::from(high) << 16) | u32::from(low));
        debug!("Serial number: {}", serial);
        Ok(serial)
    }

    /// Bank reported by SELBANK. The recorded state is not touched.
    pub fn read_current_bank(&mut self) -> Result<MemoryBank, Error> {
        self.ensure_awake()?;
        let fields = self.expect_success(Command::ReadCurrentBank)?;
        Ok(if fields.data & 0x0001 == 0 {
            MemoryBank::Bank0
        } else {
            MemoryBank::Bank1
        })
    }

    /// Checks that the part answers with the SCL3300 component id.
    pub fn verify_who_am_i(&mut self) -> Result<(), Error> {
        let found = match self.refresh(Slot::WhoAmI)? {
            Outcome::Success(fields) => (fields.data & 0x00FF) as u8,
            Outcome::TransientStartup => return Err(Error::StartupInProgress),
        };
        if found != WHO_AM_I {
            log::error!("WHOAMI 0x{:02X}, expected 0x{:02X}", found, WHO_AM_I);
            return Err(Error::WhoAmIMismatch { found });
        }
        debug!("WHOAMI 0x{:02X} confirmed", found);
        Ok(())
    }

    /// Last X acceleration in g, scaled for the current measurement mode.
    pub fn acceleration_x(&self) -> f32 {
        self.acceleration(Slot::AccelerationX)
    }

    /// Last Y acceleration in g.
    pub fn acceleration_y(&self) -> f32 {
        self.acceleration(Slot::AccelerationY)
    }

    /// Last Z acceleration in g.
    pub fn acceleration_z(&self) -> f32 {
        self.acceleration(Slot::AccelerationZ)
    }

    /// Last X inclination in degrees.
    pub fn angle_x(&self) -> f32 {
        units::angle(self.data.signed(Slot::AngleX))
    }

    /// Last Y inclination in degrees.
    pub fn angle_y(&self) -> f32 {
        units::angle(self.data.signed(Slot::AngleY))
    }

    /// Last Z inclination in degrees.
    pub fn angle_z(&self) -> f32 {
        units::angle(self.data.signed(Slot::AngleZ))
    }

    /// Last temperature reading.
    ///
    /// # Arguments
    ///
    /// * `scale`: The unit to convert to.
    pub fn temperature(&self, scale: TemperatureScale) -> f32 {
        units::temperature(self.data.signed(Slot::Temperature), scale)
    }

    /// Last self-test output, in LSB.
    pub fn self_test_output(&self) -> i16 {
        self.data.signed(Slot::SelfTestOutput)
    }

    // Sensitivity follows the last measurement mode; while powered down the
    // configured one is used.
    fn acceleration(&self, slot: Slot) -> f32 {
        let mode = match self.state.mode {
            OperatingMode::Measuring(mode) => mode,
            OperatingMode::PoweredDown => self.config.mode,
        };
        units::acceleration(self.data.signed(slot), mode)
    }

    // Reading clears the status summary: clear, read, then confirm.
    fn confirm_status_cleared(&mut self) -> Result<(), Error> {
        self.read_slot(Slot::StatusSummary)?;
        self.read_slot(Slot::StatusSummary)?;
        match self.read_slot(Slot::StatusSummary)? {
            Outcome::Success(fields) => status_summary_error(fields.return_status, fields.data),
            Outcome::TransientStartup => Err(Error::StartupInProgress),
        }
    }

    // Reads a slot in its bank and leaves that bank selected.
    fn read_slot(&mut self, slot: Slot) -> Result<Outcome, Error> {
        self.ensure_awake()?;
        self.ensure_bank(slot.bank())?;

        let outcome = self.exchange(slot.command()).map_err(|e| {
            log::error!("Failed to read {}: {:?}", slot.name(), e);
            e
        })?;

        if let Outcome::Success(fields) = outcome {
            debug!("{} = 0x{:04X} ({:?})", slot.name(), fields.data, fields.return_status);
            self.data.store(
                slot,
                Reading {
                    raw: fields.data,
                    return_status: fields.return_status,
                },
            );
        }
        Ok(outcome)
    }

    // Reads a register without a slot, in bank 0.
    fn read_register(&mut self, command: Command) -> Result<Fields, Error> {
        self.ensure_awake()?;
        self.ensure_bank(MemoryBank::Bank0)?;
        self.expect_success(command).map_err(|e| {
            log::error!("Failed to read {}: {:?}", command.name(), e);
            e
        })
    }

    fn write(&mut self, command: Command) -> Result<(), Error> {
        self.expect_success(command).map(|_| ())
    }

    fn expect_success(&mut self, command: Command) -> Result<Fields, Error> {
        match self.exchange(command)? {
            Outcome::Success(fields) => Ok(fields),
            Outcome::TransientStartup => Err(Error::StartupInProgress),
        }
    }

    fn ensure_awake(&self) -> Result<(), Error> {
        if self.state.mode == OperatingMode::PoweredDown {
            log::error!("Device is powered down, wake it up or reset it first");
            return Err(Error::PoweredDown);
        }
        Ok(())
    }

    fn ensure_bank(&mut self, bank: MemoryBank) -> Result<(), Error> {
        if self.state.bank == bank {
            return Ok(());
        }
        self.switch_to_bank(bank)
    }

    // One full-duplex exchange of a catalogue frame, classified.
    fn exchange(&mut self, command: Command) -> Result<Outcome, Error> {
        let frame = command.frame();
        debug!("Executing {}: {:02X?}", command.name(), frame.as_bytes());
        let response = self.transfer(&frame)?;
        debug!("Response: {:02X?}", response.as_bytes());
        self.classifier.classify(&frame, &response)
    }

    fn transfer(&mut self, frame: &Frame) -> Result<Frame, Error> {
        self.wait_for_transfer_window();

        let mut rx = [0u8; FRAME_LEN];
        let result = self.transport.transfer(frame, &mut rx);
        self.last_transfer = self.clock.now();

        let written = result.map_err(|e| {
            log::error!("SPI transfer failed: {:?}", e);
            Error::TransferFailure
        })?;
        if written != FRAME_LEN {
            log::error!("Wrote {} bytes, expected {}", written, FRAME_LEN);
            return Err(Error::IncorrectNumberOfBytesWritten { written });
        }
        Ok(Frame::new(rx))
    }

    // Sleeps until MIN_TRANSFER_INTERVAL has passed since the last transfer ended.
    fn wait_for_transfer_window(&mut self) {
        loop {
            let elapsed = self
                .clock
                .now()
                .checked_duration_since(self.last_transfer)
                .unwrap_or(MicrosDurationU64::from_ticks(0));
            if elapsed >= MIN_TRANSFER_INTERVAL {
                return;
            }
            let remaining = MIN_TRANSFER_INTERVAL - elapsed;
            self.delay.delay_us(remaining.ticks() as u32);
        }
    }
}
