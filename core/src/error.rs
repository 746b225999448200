use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown field `{field}` for test `{test}`")]
    UnknownField { test: &'static str, field: String },

    #[error("row index {0} out of range")]
    RowOutOfRange(usize),

    #[error("read-only sheet {0}: this role cannot edit results")]
    ReadOnly(String),

    #[error("save already in progress for {0}")]
    SaveInProgress(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl From<ureq::Error> for CoreError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, resp) => {
                CoreError::Http(format!("status {} from {}", code, resp.get_url()))
            }
            ureq::Error::Transport(t) => CoreError::Http(t.to_string()),
        }
    }
}

impl<E: std::fmt::Display> From<serde_path_to_error::Error<E>> for CoreError {
    fn from(e: serde_path_to_error::Error<E>) -> Self {
        CoreError::Parse {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
