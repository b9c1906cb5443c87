use std::collections::VecDeque;
use std::path::Path;
use tokio::{fs, io::AsyncWriteExt};

use crate::clapargs::TransferRequest;
use crate::error::{BoxError, FetchError, TransferError};
use crate::s3agent::{ObjectSource, S3Agent};

/// Counts for one completed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub files: u64,
    pub bytes: u64,
    /// Directory markers that were listed but not downloaded.
    pub skipped: u64,
}

/// Lazy view over every key under a prefix. Pages are pulled only when the
/// buffered keys run out, and once the last page is drained the listing is
/// spent; there is no way to rewind it.
pub struct ObjectListing<'a, S> {
    source: &'a S,
    prefix: &'a str,
    buffered: VecDeque<String>,
    next_token: Option<String>,
    exhausted: bool,
}

impl<'a, S: ObjectSource> ObjectListing<'a, S> {
    pub fn new(source: &'a S, prefix: &'a str) -> Self {
        Self {
            source,
            prefix,
            buffered: VecDeque::new(),
            next_token: None,
            exhausted: false,
        }
    }

    pub async fn next_key(&mut self) -> Result<Option<String>, BoxError> {
        // Loop because a page may legitimately come back empty
        while self.buffered.is_empty() && !self.exhausted {
            let page = self
                .source
                .list_page(self.prefix, self.next_token.take())
                .await?;
            self.buffered.extend(page.keys);
            self.next_token = page.next_token;
            self.exhausted = self.next_token.is_none();
        }
        Ok(self.buffered.pop_front())
    }
}

/// The local file name for `key`: whatever follows the last `/`. Empty for
/// directory markers like `exports/`.
pub fn object_filename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or_default()
}

/// Creates `path` and any missing parents. An existing directory is fine.
pub async fn ensure_local_dir(path: &Path) -> Result<(), FetchError> {
    fs::create_dir_all(path)
        .await
        .map_err(|source| FetchError::CreateDir {
            path: path.to_owned(),
            source,
        })
}

/// Mirrors `request.prefix` of `request.bucket` into `request.local_path`.
pub async fn fetch(request: TransferRequest) -> Result<FetchSummary, FetchError> {
    // Building the agent makes no network call and cannot fail
    let s3agent = S3Agent::new(&request).await;
    fetch_from(&request, &s3agent).await
}

/// Same as [`fetch`] against any object source.
pub async fn fetch_from<S: ObjectSource>(
    request: &TransferRequest,
    source: &S,
) -> Result<FetchSummary, FetchError> {
    ensure_local_dir(&request.local_path).await?;
    download_all(request, source).await
}

/// Drains the listing and downloads each object in turn. The first error
/// ends the run: files already written stay, the one in flight may be
/// truncated, and the rest are never touched.
pub async fn download_all<S: ObjectSource>(
    request: &TransferRequest,
    source: &S,
) -> Result<FetchSummary, FetchError> {
    let mut summary = FetchSummary::default();
    let mut listing = ObjectListing::new(source, &request.prefix);

    while let Some(key) = listing
        .next_key()
        .await
        .map_err(|source| FetchError::List {
            bucket: request.bucket.clone(),
            prefix: request.prefix.clone(),
            source,
        })?
    {
        let filename = object_filename(&key);
        if filename.is_empty() {
            debug!("skipping directory marker '{}'", key);
            summary.skipped += 1;
            continue;
        }

        info!("Downloading {}...", filename);
        let path = request.local_path.join(filename);
        let bytes = download_one(request, source, &key, &path).await?;
        info!("{} downloaded", filename);

        summary.files += 1;
        summary.bytes += bytes;
    }

    Ok(summary)
}

async fn download_one<S: ObjectSource>(
    request: &TransferRequest,
    source: &S,
    key: &str,
    path: &Path,
) -> Result<u64, FetchError> {
    // Open the file for writing; the handle is dropped when this returns
    let mut localfh = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|source| FetchError::CreateFile {
            path: path.to_owned(),
            source,
        })?;

    let write_err = |source: std::io::Error| FetchError::WriteFile {
        path: path.to_owned(),
        source,
    };
    let transferred = source.download_to(key, &mut localfh).await;
    // Settle pending writes even when the transfer failed, so whatever
    // arrived is on disk before the handle goes away
    let flushed = localfh.flush().await;

    let bytes = match transferred {
        Ok(bytes) => bytes,
        Err(TransferError::Remote(e)) => {
            return Err(FetchError::Download {
                bucket: request.bucket.clone(),
                key: key.to_owned(),
                source: e,
            })
        }
        Err(TransferError::Sink(e)) => return Err(write_err(e)),
    };
    flushed.map_err(write_err)?;

    Ok(bytes)
}
