/// Broad failure category, used by callers that need to react differently
/// (e.g. the dashboard keeps running after a `Prediction` failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad flags or environment.
    Config,
    /// A required dataset column is missing.
    Format,
    /// A dataset field could not be parsed.
    Parse,
    /// A reduction that needs at least one record ran on an empty dataset.
    EmptyDataset,
    /// The model artifact is missing, corrupted, or incompatible.
    ModelLoad,
    /// The model rejected the feature vector or produced a non-finite value.
    Prediction,
    /// Writing an export or sample file failed.
    Io,
    /// Terminal setup, drawing, or event handling failed.
    Terminal,
}

impl ErrorKind {
    /// Process exit code for this kind of failure.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config | ErrorKind::Format | ErrorKind::Parse | ErrorKind::Io => 2,
            ErrorKind::EmptyDataset | ErrorKind::ModelLoad => 3,
            ErrorKind::Prediction | ErrorKind::Terminal => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn empty_dataset(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyDataset, message)
    }

    pub fn model_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModelLoad, message)
    }

    pub fn prediction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Prediction, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failures_abort_with_distinct_codes() {
        assert_eq!(AppError::format("x").exit_code(), 2);
        assert_eq!(AppError::parse("x").exit_code(), 2);
        assert_eq!(AppError::model_load("x").exit_code(), 3);
        assert_eq!(AppError::prediction("x").kind(), ErrorKind::Prediction);
    }
}
