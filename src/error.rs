use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Failed to construct service {identity}: {message}")]
    Construction { identity: String, message: String },

    #[error("Trying to initialize a service of type {identity} but an instance of that service is already running")]
    AlreadyInitialized { identity: String },

    #[error("Unsupported entry return type {return_type} for service {identity}")]
    UnsupportedEntry {
        identity: String,
        return_type: String,
    },

    #[error("Service error in {identity}: {message}")]
    Service { identity: String, message: String },

    #[error("System error: {message}")]
    System { message: String },
}

impl ServiceError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn service<I: Into<String>, M: Into<String>>(identity: I, message: M) -> Self {
        Self::Service {
            identity: identity.into(),
            message: message.into(),
        }
    }

    pub fn construction<I: Into<String>, M: Into<String>>(identity: I, message: M) -> Self {
        Self::Construction {
            identity: identity.into(),
            message: message.into(),
        }
    }

    pub fn already_initialized<I: Into<String>>(identity: I) -> Self {
        Self::AlreadyInitialized {
            identity: identity.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
