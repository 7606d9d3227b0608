use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Possible infinite recursion. Check your variables for a circular reference")]
    RecursionLimitExceeded,

    #[error("Variable ${0} does not exist")]
    NoSuchVariable(String),

    #[error("{0}")]
    EvaluationFailed(String),

    #[error("No saved memory file named '{0}'")]
    FileNotFound(String),

    #[error("'{name}' is not a valid memory file")]
    Deserialization {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{0}' is not a valid file name")]
    InvalidFileName(String),

    #[error("Could not access '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
