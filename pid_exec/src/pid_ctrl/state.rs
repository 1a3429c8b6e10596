//! Implementations for the PidCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use super::{ControlPolicy, Params, PidCtrlError, StatusReport};
use comms_if::sim::{CommandPair, TelemetrySample};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// PID control module state
#[derive(Default)]
pub struct PidCtrl {

    pub(crate) policy: Option<ControlPolicy>,

    pub(crate) report: Option<StatusReport>,
    arch_report: Archiver,

    pub(crate) output: Option<CommandPair>,
    arch_output: Archiver
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidCtrl {
    /// Create an initialised PidCtrl which doesn't write any archives.
    pub fn new(params: Params) -> Result<Self, PidCtrlError> {
        params.validate()?;

        Ok(Self {
            policy: Some(ControlPolicy::new(params)),
            ..Default::default()
        })
    }

    /// The control policy, or `None` before initialisation.
    pub fn policy(&self) -> Option<&ControlPolicy> {
        self.policy.as_ref()
    }
}

impl State for PidCtrl {
    type InitData = Params;
    type InitError = PidCtrlError;

    type InputData = TelemetrySample;
    type OutputData = CommandPair;
    type StatusReport = StatusReport;
    type ProcError = PidCtrlError;

    /// Initialise the PidCtrl module.
    ///
    /// Expected init data is the set of parameters to use. Any previous controller history is
    /// discarded.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        init_data.validate()?;

        self.arch_report = Archiver::from_path(session, "pid_ctrl/status_report.csv")?;
        self.arch_output = Archiver::from_path(session, "pid_ctrl/output.csv")?;

        self.policy = Some(ControlPolicy::new(init_data));
        self.report = None;
        self.output = None;

        debug!("PidCtrl initialised with {:#?}", init_data);

        Ok(())
    }

    /// Process a single telemetry sample.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let policy = self.policy.as_mut().ok_or(PidCtrlError::NotInitialised)?;

        let output = policy.on_telemetry(input_data);
        let report = *policy.report();

        self.output = Some(output);
        self.report = Some(report);

        Ok((output, report))
    }
}

impl Archived for PidCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        if let Some(report) = self.report {
            self.arch_report.serialise(report)?;
        }
        if let Some(output) = self.output {
            self.arch_output.serialise(output)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proc_before_init() {
        let mut ctrl = PidCtrl::default();

        let result = ctrl.proc(&TelemetrySample::default());

        assert!(matches!(result, Err(PidCtrlError::NotInitialised)));
        assert!(ctrl.write().is_ok());
    }

    #[test]
    fn test_new_rejects_bad_params() {
        let mut params = Params::default();
        params.max_throt = -1.0;

        assert!(matches!(PidCtrl::new(params), Err(PidCtrlError::InvalidParams(_))));
    }

    #[test]
    fn test_proc_matches_policy() {
        let mut ctrl = PidCtrl::new(Params::default()).unwrap();
        let mut policy = ControlPolicy::new(Params::default());

        let sample = TelemetrySample {
            cte: 0.5,
            speed: 30.0,
            steering_angle: 0.0
        };

        let (output, report) = ctrl.proc(&sample).unwrap();

        assert_eq!(output, policy.on_telemetry(&sample));
        assert_eq!(&report, policy.report());
        assert_eq!(ctrl.output, Some(output));
        assert!(ctrl.write().is_ok());
    }
}
