use std::path::PathBuf;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Anything that stops a fetch. The first one aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("could not create directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not create file '{}': {source}", path.display())]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write file '{}': {source}", path.display())]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Listing failed. Bad credentials, a missing bucket and an unreachable
    /// endpoint all show up here first.
    #[error("could not list s3://{bucket}/{prefix}: {source}")]
    List {
        bucket: String,
        prefix: String,
        source: BoxError,
    },

    #[error("could not download s3://{bucket}/{key}: {source}")]
    Download {
        bucket: String,
        key: String,
        source: BoxError,
    },
}

/// Failure while streaming one object into a local sink.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The request or the body stream failed on the remote side.
    #[error("remote: {0}")]
    Remote(BoxError),
    /// The local sink refused the bytes.
    #[error("sink: {0}")]
    Sink(#[from] std::io::Error),
}
