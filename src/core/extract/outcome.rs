//! Run outcome and state machine types

use crate::core::state::watermark::Watermark;
use crate::domain::HighwaterError;
use std::fmt;

/// Stage of a run that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStage {
    LoadWatermark,
    Extract,
    Persist,
    Commit,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadWatermark => "load-watermark",
            Self::Extract => "extract",
            Self::Persist => "persist",
            Self::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Last state a run reached
///
/// ```text
/// Init -> WatermarkLoaded -> Extracted -> NoOp
///                                      -> Written -> Committed
/// any state -> Failed(stage)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    WatermarkLoaded,
    Extracted,
    NoOp,
    Written,
    Committed,
    Failed(RunStage),
}

impl RunState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoOp | Self::Committed | Self::Failed(_))
    }
}

/// Result of one extraction run
#[derive(Debug)]
pub enum RunOutcome {
    /// The delta query returned no rows; nothing was written
    NoNewData { watermark: Watermark },

    /// An artifact was written and the watermark advanced
    Success {
        rows_written: usize,
        new_watermark: Watermark,
        artifact: String,
    },

    /// The run stopped at `stage`
    Failed {
        stage: RunStage,
        cause: HighwaterError,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Process exit code for this outcome
    ///
    /// | code | meaning                    |
    /// |------|----------------------------|
    /// | 0    | success or no new data     |
    /// | 2    | configuration error        |
    /// | 3    | corrupt checkpoint         |
    /// | 4    | connection failure         |
    /// | 5    | any other failure          |
    /// | 130  | interrupted                |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoNewData { .. } | Self::Success { .. } => 0,
            Self::Failed { cause, .. } => error_exit_code(cause),
        }
    }
}

/// Exit code for an error surfaced outside of a run
pub fn error_exit_code(error: &HighwaterError) -> i32 {
    match error {
        HighwaterError::Configuration(_) => 2,
        HighwaterError::CheckpointCorrupt { .. } => 3,
        HighwaterError::Connection(_) => 4,
        HighwaterError::Interrupted(_) => 130,
        _ => 5,
    }
}
