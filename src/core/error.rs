use thiserror::Error;

/// Which flat buffer an operation was talking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Continuous,
    Discrete,
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferKind::Continuous => f.write_str("continuous"),
            BufferKind::Discrete => f.write_str("discrete"),
        }
    }
}

/// Everything that can go wrong while registering, freezing or stepping actuators.
///
/// All variants are contract violations rather than transient failures: none of
/// them is worth retrying, and each is reported before any buffer is touched.
#[derive(Debug, Error, PartialEq)]
pub enum ActuatorError {
    #[error("cannot {operation} actuators after the manager has been frozen")]
    Frozen { operation: &'static str },

    #[error("actuator name `{name}` is registered more than once")]
    DuplicateName { name: String },

    #[error(
        "actuators `{first}` and `{name}` disagree on having continuous actions \
         (`{name}` has continuous: {has_continuous})"
    )]
    MixedActionPolarity {
        first: String,
        name: String,
        has_continuous: bool,
    },

    #[error("{buffer} action source has length {actual}, expected {expected}")]
    BufferLengthMismatch {
        buffer: BufferKind,
        expected: usize,
        actual: usize,
    },

    #[error("index {index} out of range for {len} actuators")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("mask write out of range: branch {branch} action {action} (actuator owns {branches} branches)")]
    MaskOutOfRange {
        branch: usize,
        action: usize,
        branches: usize,
    },

    #[error("every action of discrete branch {branch} is masked")]
    BranchFullyMasked { branch: usize },

    #[error("actuator `{name}` is already borrowed elsewhere")]
    ActuatorBusy { name: String },

    #[error("actuator at registration index {index} is already borrowed elsewhere")]
    BusyAtRegistration { index: usize },
}

pub type Result<T> = std::result::Result<T, ActuatorError>;
