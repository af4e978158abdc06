use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Model '{0}' does not exist")]
    UnknownModel(String),

    #[error("Model '{model}' has no {direction} port named '{port}'")]
    UnknownPort {
        model: String,
        port: String,
        direction: String,
    },

    #[error("A model named '{0}' was already added")]
    DuplicateModel(String),

    #[error("Coupling {coupling} carries '{requested}', but the port is a '{expected}'")]
    IncompatiblePorts {
        coupling: String,
        requested: String,
        expected: String,
    },

    #[error("Port '{port}' carries '{expected}', but '{requested}' was requested")]
    WrongPortType {
        port: String,
        requested: String,
        expected: String,
    },

    #[error("Model is still active after {0} steps")]
    StepLimit(usize),

    #[error("Trying to use a closed channel")]
    ClosedChannel,
}
