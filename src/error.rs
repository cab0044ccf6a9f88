use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::ports::PortParseError;

pub type Result<T> = std::result::Result<T, GenError>;

/// Every way a generation run can fail. All of them are fatal.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("missing required parameter --{0}")]
    MissingArgument(&'static str),

    #[error("malformed cluster '{0}': expected <provider>_<zone>")]
    MalformedCluster(String),

    #[error("missing template file(s)")]
    MissingTemplates,

    #[error(transparent)]
    Ports(#[from] PortParseError),

    #[error("failed to parse template {}", path.display())]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("failed to render template {name}")]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("failed to build the template context")]
    Context {
        #[source]
        source: tera::Error,
    },

    #[error("invalid output filename '{filename}' for template {}", path.display())]
    InvalidOutputFilename { path: PathBuf, filename: String },

    #[error("invalid template pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to parse values file {}", path.display())]
    Values {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
