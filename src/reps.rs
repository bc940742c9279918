use crate::squat::SquatPhase;
use serde::{Deserialize, Serialize};

/// One phase-complete event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquatLogEntry {
    pub phase: SquatPhase,
    /// Milliseconds since the Unix epoch, strictly increasing within a session.
    pub timestamp: u64,
    /// Reference to the frame captured when the event fired.
    pub image_data: String,
    /// Left unset until [`validate_reps`] marks the entry as part of a repetition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_valid: Option<bool>,
}

impl SquatLogEntry {
    pub fn new(phase: SquatPhase, timestamp: u64, image_data: impl Into<String>) -> Self {
        Self {
            phase,
            timestamp,
            image_data: image_data.into(),
            is_valid: None,
        }
    }
}

/// Count STANDING, SQUATTING, STANDING triples in a time-ordered log and mark their
/// entries valid in place.
///
/// The scan is greedy with a single cursor. After a match it advances by two, so the
/// closing STANDING of one repetition can open the next, while the matched SQUATTING
/// is never revisited.
pub fn validate_reps(log: &mut [SquatLogEntry]) -> usize {
    let mut count = 0;
    let mut i = 0;

    while i + 2 < log.len() {
        let is_rep = matches!(
            (log[i].phase, log[i + 1].phase, log[i + 2].phase),
            (
                SquatPhase::Standing,
                SquatPhase::Squatting,
                SquatPhase::Standing
            )
        );
        if is_rep {
            log[i..i + 3]
                .iter_mut()
                .for_each(|entry| entry.is_valid = Some(true));
            count += 1;
            i += 2;
        } else {
            i += 1;
        }
    }

    count
}
