use core::fmt;

/// Failures raised while building a world or a level.
///
/// Per-frame simulation never fails; everything here is caught at construction.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    InvalidTuning { field: &'static str, reason: String },
    EmptyLevel { level: u32 },
    DegeneratePlatform { level: u32, index: usize },
    InvalidCharacter { index: usize },
    Parse(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTuning { field, reason } => {
                write!(f, "invalid tuning value `{field}`: {reason}")
            }
            Self::EmptyLevel { level } => {
                write!(f, "level {level} has no platforms")
            }
            Self::DegeneratePlatform { level, index } => {
                write!(f, "level {level} platform {index} has no area")
            }
            Self::InvalidCharacter { index } => {
                write!(f, "no character preset at index {index}")
            }
            Self::Parse(msg) => write!(f, "failed to parse tuning: {msg}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
