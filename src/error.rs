use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResourceExhaustion,
    MalformedRow,
    Resource,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Catalog,
    Manifest,
    Index,
    Resource,
    Unknown,
}

#[derive(Debug, Clone, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub stage: ErrorStage,
    pub message: String,
    /// 1-based input line the error was raised on, when known.
    pub line: Option<usize>,
}

impl Error {
    pub fn exhausted(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ResourceExhaustion,
            stage: ErrorStage::Unknown,
            message: message.into(),
            line: None,
        }
    }

    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::MalformedRow,
            stage: ErrorStage::Manifest,
            message: format!("line {line}: {}", message.into()),
            line: Some(line),
        }
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Resource,
            stage: ErrorStage::Resource,
            message: message.into(),
            line: None,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Io,
            stage: ErrorStage::Unknown,
            message: message.into(),
            line: None,
        }
    }

    pub fn with_stage(mut self, stage: ErrorStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn is_exhaustion(&self) -> bool {
        self.kind == ErrorKind::ResourceExhaustion
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(format!("io error: {err}"))
    }
}
