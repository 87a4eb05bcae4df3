use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io { path: String, message: String },
    /// TOML parse / deserialization error.
    Parse(String),
    /// A value parsed but is not usable.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read config {path}: {message}"),
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Validation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
