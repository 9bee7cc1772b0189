//! Pairing of a command frame with the response it produced.

use log::debug;

use crate::{checksum, Command, Error, Fields, Frame, ReturnStatus};

/// Non-error result of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Response matched the command; its fields carry the payload.
    Success(Fields),
    /// The status summary still shows errors, as it does right after
    /// power-on until it has been read out. Poll again.
    TransientStartup,
}

/// Classifies request/response pairs.
///
/// Holds no state across exchanges apart from the one-shot start-up
/// indication latch.
#[derive(Debug)]
pub struct Classifier {
    startup_indication: bool,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub const fn new() -> Self {
        Self {
            startup_indication: true,
        }
    }

    /// `true` until the first clean status summary response has been seen.
    pub fn awaiting_startup_indication(&self) -> bool {
        self.startup_indication
    }

    /// Classifies `response` against the `command` sent in the same exchange.
    ///
    /// `command` must be a catalogue frame. Anything else is a bug in the
    /// caller: it panics in debug builds and is rejected with
    /// [`Error::InvalidCommandFrame`] otherwise.
    pub fn classify(&mut self, command: &Frame, response: &Frame) -> Result<Outcome, Error> {
        if Command::from_frame(command).is_none() {
            debug_assert!(
                false,
                "frame {:02X?} is not in the command catalogue",
                command.as_bytes()
            );
            log::error!("Frame {:02X?} is not in the command catalogue", command.as_bytes());
            return Err(Error::InvalidCommandFrame);
        }

        checksum::validate(response)?;

        let sent = command.decode();
        let received = response.decode();
        let status_summary = *command == Command::ReadStatusSummary.frame();

        if received.return_status == ReturnStatus::Error {
            if status_summary {
                debug!("Status summary not cleared yet, start-up in progress");
                return Ok(Outcome::TransientStartup);
            }
            log::error!(
                "Device flagged command {:02X?} as invalid, response {:02X?}",
                command.as_bytes(),
                response.as_bytes()
            );
            return Err(Error::InvalidCommandFrame);
        }

        if status_summary {
            self.note_startup(received.return_status);
        }

        if received.address != sent.address {
            log::error!(
                "Response address 0x{:02X} does not match command address 0x{:02X}",
                received.address,
                sent.address
            );
            return Err(Error::InvalidResponseFrame);
        }

        if received.write != sent.write {
            log::error!(
                "Response read/write bit {} does not match command {}",
                received.write,
                sent.write
            );
            return Err(Error::OpcodeReadWriteMismatch);
        }

        Ok(Outcome::Success(received))
    }

    fn note_startup(&mut self, return_status: ReturnStatus) {
        if return_status != ReturnStatus::Normal {
            log::warn!(
                "Start-up has not been performed correctly, return status {:?}",
                return_status
            );
        } else if self.startup_indication {
            self.startup_indication = false;
            log::info!("First status summary response with status cleared, start-up complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(command: Command, status: ReturnStatus, data: u16) -> Frame {
        let fields = command.frame().decode();
        Frame::encode(fields.write, fields.address, status, data)
    }

    #[test]
    fn matching_response_is_accepted() {
        let mut classifier = Classifier::new();
        let command = Command::ReadAccelerationX.frame();
        let outcome = classifier
            .classify(&command, &response(Command::ReadAccelerationX, ReturnStatus::Normal, 0xFF38))
            .unwrap();
        match outcome {
            Outcome::Success(fields) => {
                assert_eq!(fields.data_i16(), -200);
                assert_eq!(fields.return_status, ReturnStatus::Normal);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn self_test_status_still_carries_data() {
        let mut classifier = Classifier::new();
        let command = Command::ReadSelfTestOutput.frame();
        let outcome = classifier
            .classify(&command, &response(Command::ReadSelfTestOutput, ReturnStatus::SelfTest, 42))
            .unwrap();
        assert!(matches!(outcome, Outcome::Success(fields) if fields.data == 42));
    }

    #[test]
    fn bad_checksum_stops_classification() {
        let mut classifier = Classifier::new();
        let mut bytes = *response(Command::ReadAccelerationX, ReturnStatus::Normal, 7).as_bytes();
        bytes[3] ^= 0x01;
        let result = classifier.classify(&Command::ReadAccelerationX.frame(), &Frame::new(bytes));
        assert!(matches!(result, Err(Error::BadChecksum { .. })));
    }

    #[test]
    fn error_status_on_plain_command_is_invalid_command() {
        let mut classifier = Classifier::new();
        let result = classifier.classify(
            &Command::ReadTemperature.frame(),
            &response(Command::ReadTemperature, ReturnStatus::Error, 0),
        );
        assert_eq!(result, Err(Error::InvalidCommandFrame));
    }

    #[test]
    fn error_status_on_status_summary_is_transient() {
        let mut classifier = Classifier::new();
        let result = classifier.classify(
            &Command::ReadStatusSummary.frame(),
            &response(Command::ReadStatusSummary, ReturnStatus::Error, 0x0010),
        );
        assert_eq!(result, Ok(Outcome::TransientStartup));
        assert!(classifier.awaiting_startup_indication());
    }

    #[test]
    fn address_mismatch() {
        let mut classifier = Classifier::new();
        let result = classifier.classify(
            &Command::ReadAccelerationX.frame(),
            &response(Command::ReadAccelerationY, ReturnStatus::Normal, 0),
        );
        assert_eq!(result, Err(Error::InvalidResponseFrame));
    }

    #[test]
    fn read_write_mismatch() {
        let mut classifier = Classifier::new();
        let wrong_direction = Frame::encode(true, 0x01, ReturnStatus::Normal, 0);
        let result = classifier.classify(&Command::ReadAccelerationX.frame(), &wrong_direction);
        assert_eq!(result, Err(Error::OpcodeReadWriteMismatch));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not in the command catalogue")]
    fn foreign_command_frame_panics_in_debug() {
        let mut classifier = Classifier::new();
        let foreign = Frame::encode(false, 0x11, ReturnStatus::StartupInProgress, 0);
        let _ = classifier.classify(&foreign, &foreign);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn foreign_command_frame_is_rejected() {
        let mut classifier = Classifier::new();
        let foreign = Frame::encode(false, 0x11, ReturnStatus::StartupInProgress, 0);
        assert_eq!(
            classifier.classify(&foreign, &foreign),
            Err(Error::InvalidCommandFrame)
        );
    }

    #[test]
    fn startup_latch_flips_once() {
        let mut classifier = Classifier::new();
        let command = Command::ReadStatusSummary.frame();

        classifier
            .classify(&command, &response(Command::ReadStatusSummary, ReturnStatus::StartupInProgress, 0))
            .unwrap();
        assert!(classifier.awaiting_startup_indication());

        classifier
            .classify(&command, &response(Command::ReadStatusSummary, ReturnStatus::Normal, 0))
            .unwrap();
        assert!(!classifier.awaiting_startup_indication());

        classifier
            .classify(&command, &response(Command::ReadStatusSummary, ReturnStatus::SelfTest, 0))
            .unwrap();
        assert!(!classifier.awaiting_startup_indication());
    }
}
