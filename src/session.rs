use crate::{
    error::Error,
    pose::Pose,
    reps::{validate_reps, SquatLogEntry},
    squat::{Feedback, PhaseDetector, SquatPhase, StateMachine, Tick},
};
use num_traits::ToPrimitive;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// One tracking session: the phase and feedback cells plus the event log.
///
/// Each session owns its own cells; run several sessions by creating several values.
pub struct Session<D> {
    machine: StateMachine<D>,
    phase: SquatPhase,
    feedback: Feedback,
    log: Vec<SquatLogEntry>,
}

impl<D> Session<D>
where
    D: PhaseDetector,
{
    pub fn new(machine: StateMachine<D>) -> Self {
        Self {
            machine,
            phase: SquatPhase::default(),
            feedback: Feedback::default(),
            log: Vec::new(),
        }
    }

    /// Feed one pose. `capture` is called only when a phase completes, to obtain the
    /// image reference stored with the log entry.
    pub fn process<F>(&mut self, pose: &Pose, capture: F) -> Result<Tick, Error>
    where
        F: FnOnce() -> String,
    {
        let tick = self.machine.tick(self.phase, pose)?;
        self.phase = tick.phase;

        if let Some(feedback) = &tick.feedback {
            self.feedback = feedback.clone();
        }

        if let Some(phase) = tick.completed {
            let timestamp = self.next_timestamp()?;
            info!(message = "phase complete", ?phase, timestamp);
            self.log.push(SquatLogEntry::new(phase, timestamp, capture()));
        }

        Ok(tick)
    }

    fn next_timestamp(&self) -> Result<u64, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default()
            .to_u64()
            .ok_or(Error::ConvertToU64)?;
        Ok(match self.log.last() {
            Some(last) if now <= last.timestamp => last.timestamp + 1,
            _ => now,
        })
    }

    pub fn phase(&self) -> SquatPhase {
        self.phase
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    pub fn log(&self) -> &[SquatLogEntry] {
        &self.log
    }

    /// Mark valid repetitions in the log and return how many there are.
    pub fn validate_reps(&mut self) -> usize {
        validate_reps(&mut self.log)
    }

    pub fn into_log(self) -> Vec<SquatLogEntry> {
        self.log
    }
}
