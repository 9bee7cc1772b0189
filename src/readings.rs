//! Cache of the most recent value read from each polled register.

use crate::{Command, MemoryBank, ReturnStatus};

/// Named slots of the reading set, one per polled register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    AccelerationX,
    AccelerationY,
    AccelerationZ,
    SelfTestOutput,
    Temperature,
    AngleX,
    AngleY,
    AngleZ,
    StatusSummary,
    WhoAmI,
}

impl Slot {
    pub const ALL: [Slot; 10] = [
        Slot::AccelerationX,
        Slot::AccelerationY,
        Slot::AccelerationZ,
        Slot::SelfTestOutput,
        Slot::Temperature,
        Slot::AngleX,
        Slot::AngleY,
        Slot::AngleZ,
        Slot::StatusSummary,
        Slot::WhoAmI,
    ];

    /// The read frame that refreshes this slot.
    pub const fn command(self) -> Command {
        match self {
            Slot::AccelerationX => Command::ReadAccelerationX,
            Slot::AccelerationY => Command::ReadAccelerationY,
            Slot::AccelerationZ => Command::ReadAccelerationZ,
            Slot::SelfTestOutput => Command::ReadSelfTestOutput,
            Slot::Temperature => Command::ReadTemperature,
            Slot::AngleX => Command::ReadAngleX,
            Slot::AngleY => Command::ReadAngleY,
            Slot::AngleZ => Command::ReadAngleZ,
            Slot::StatusSummary => Command::ReadStatusSummary,
            Slot::WhoAmI => Command::ReadWhoAmI,
        }
    }

    /// The bank that must be active when the slot is read.
    pub const fn bank(self) -> MemoryBank {
        match self {
            Slot::AngleX | Slot::AngleY | Slot::AngleZ | Slot::WhoAmI => MemoryBank::Bank0,
            _ => MemoryBank::Bank1,
        }
    }

    pub const fn name(self) -> &'static str {
        self.command().name()
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// The last accepted value of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub raw: u16,
    pub return_status: ReturnStatus,
}

impl Reading {
    pub fn signed(&self) -> i16 {
        self.raw as i16
    }
}

/// Most recent value of every slot. `None` until a slot is first read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorData {
    readings: [Option<Reading>; 10],
}

impl SensorData {
    pub fn get(&self, slot: Slot) -> Option<Reading> {
        self.readings[slot.index()]
    }

    /// Raw value of `slot`, zero until the first successful read.
    pub fn raw(&self, slot: Slot) -> u16 {
        self.get(slot).map_or(0, |reading| reading.raw)
    }

    pub fn signed(&self, slot: Slot) -> i16 {
        self.raw(slot) as i16
    }

    pub(crate) fn store(&mut self, slot: Slot, reading: Reading) {
        self.readings[slot.index()] = Some(reading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_read_their_register() {
        for slot in Slot::ALL {
            assert!(!slot.command().frame().decode().write, "{}", slot.name());
        }
        assert_eq!(Slot::AngleY.command(), Command::ReadAngleY);
        assert_eq!(Slot::AngleY.bank(), MemoryBank::Bank0);
        assert_eq!(Slot::Temperature.bank(), MemoryBank::Bank1);
        assert_eq!(Slot::WhoAmI.name(), "READ_WHO_AM_I");
    }

    #[test]
    fn store_touches_one_slot() {
        let mut data = SensorData::default();
        assert_eq!(data.get(Slot::AngleX), None);
        assert_eq!(data.raw(Slot::AngleX), 0);

        data.store(
            Slot::AngleX,
            Reading {
                raw: 0xE000,
                return_status: ReturnStatus::Normal,
            },
        );
        assert_eq!(data.signed(Slot::AngleX), -8192);
        assert_eq!(data.get(Slot::AngleY), None);
    }
}
