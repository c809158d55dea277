use thiserror::Error;

/// Errors that terminate a scheduling run. A run that fails never hands
/// back a partial grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The course tables disagree with each other.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("invalid pre-assignment for course {course}: {reason}")]
    InvalidPreAssignment { course: String, reason: String },

    /// A course still had outstanding sessions after a pass over the whole week
    /// found nowhere to put them.
    #[error("unsatisfiable demand for course {course}: {remaining} session(s) could not be placed")]
    UnsatisfiableDemand { course: String, remaining: u32 },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors raised while reading the service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
