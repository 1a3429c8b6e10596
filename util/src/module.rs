//! Module interfaces
//!
//! A processing module is set up once from its parameters and then stepped once per input, for
//! example once per telemetry frame. Modules may be re-initialised, which discards any history
//! built up by previous steps.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::warn;

// Internal imports
use crate::{archive::Archived, session::Session};

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A stepped processing module.
pub trait State {
    /// Parameters the module is built from
    type InitData;
    /// Raised when the parameters can't be used or the archives can't be created.
    type InitError;

    /// One input sample.
    type InputData;
    /// What the module produces for one sample.
    type OutputData;
    /// Breakdown of how the output was produced.
    type StatusReport;
    /// Raised when a sample can't be processed, including before `init` has been called.
    type ProcError;

    /// Set the module up, or reset it if it was already running.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process one input sample.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;

    /// Process one input sample and archive the result.
    ///
    /// Archive failures are logged and don't fail the step, a command is still produced.
    fn proc_archived(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    where
        Self: Archived
    {
        let result = self.proc(input_data)?;

        if let Err(e) = self.write() {
            warn!("Could not write archives: {}", e);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveError;

    /// Running sum, which fails to archive when the sum goes negative.
    #[derive(Default)]
    struct Summer {
        sum: i32,
        writes: usize
    }

    impl State for Summer {
        type InitData = i32;
        type InitError = ();
        type InputData = i32;
        type OutputData = i32;
        type StatusReport = ();
        type ProcError = &'static str;

        fn init(&mut self, init_data: i32, _session: &Session) -> Result<(), ()> {
            self.sum = init_data;
            Ok(())
        }

        fn proc(&mut self, input_data: &i32) -> Result<(i32, ()), &'static str> {
            if *input_data == 0 {
                return Err("zero input")
            }
            self.sum += input_data;
            Ok((self.sum, ()))
        }
    }

    impl Archived for Summer {
        fn write(&mut self) -> Result<(), ArchiveError> {
            if self.sum < 0 {
                return Err(ArchiveError::FlushError(
                    std::io::Error::new(std::io::ErrorKind::Other, "negative")
                ))
            }
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_proc_archived() {
        let mut summer = Summer::default();

        assert_eq!(summer.proc_archived(&2).unwrap().0, 2);
        assert_eq!(summer.writes, 1);

        // Archive failure still yields the output
        assert_eq!(summer.proc_archived(&-5).unwrap().0, -3);
        assert_eq!(summer.writes, 1);

        // Processing failure skips the archive
        assert_eq!(summer.proc_archived(&0).unwrap_err(), "zero input");
        assert_eq!(summer.sum, -3);
        assert_eq!(summer.writes, 1);
    }
}
