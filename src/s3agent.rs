use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::Client;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::clapargs::TransferRequest;
use crate::error::{BoxError, TransferError};

const FALLBACK_REGION: &str = "us-east-1";

/// One page of a listing, as the service hands it back.
#[derive(Debug)]
pub struct ListPage {
    pub keys: Vec<String>,
    /// Set while more pages remain.
    pub next_token: Option<String>,
}

/// The two calls the fetcher needs from an object store.
#[allow(async_fn_in_trait)]
pub trait ObjectSource {
    /// Lists one page of keys starting with `prefix`. `token` is the
    /// `next_token` of the previous page, `None` for the first one.
    async fn list_page(&self, prefix: &str, token: Option<String>) -> Result<ListPage, BoxError>;

    /// Streams the whole body of `key` into `sink`, returning the number of
    /// bytes written.
    async fn download_to<W>(&self, key: &str, sink: &mut W) -> Result<u64, TransferError>
    where
        W: AsyncWrite + Unpin + Send;
}

#[derive(Debug)]
pub struct S3Agent {
    bucket: String,
    client: Client,
}

// see:
// https://docs.aws.amazon.com/sdk-for-rust/latest/dg/rust_s3_code_examples.html

impl S3Agent {
    /// Builds a client from the literal key pair in `request`. Nothing is
    /// checked here; bad credentials surface on the first call.
    pub async fn new(request: &TransferRequest) -> Self {
        let region = RegionProviderChain::first_try(request.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(FALLBACK_REGION));
        let credentials = Credentials::new(
            &request.access_key,
            &request.secret_key,
            None,
            None,
            "command-line",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials);
        if let Some(endpoint) = &request.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        // Custom endpoints (minio and friends) rarely do virtual-hosted buckets.
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(request.endpoint_url.is_some())
            .build();

        Self {
            bucket: request.bucket.clone(),
            client: Client::from_conf(s3_config),
        }
    }
}

impl ObjectSource for S3Agent {
    async fn list_page(&self, prefix: &str, token: Option<String>) -> Result<ListPage, BoxError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .set_continuation_token(token)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_owned))
            .collect();
        let next_token = match output.is_truncated() {
            Some(true) => output.next_continuation_token().map(str::to_owned),
            _ => None,
        };

        Ok(ListPage { keys, next_token })
    }

    async fn download_to<W>(&self, key: &str, sink: &mut W) -> Result<u64, TransferError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| TransferError::Remote(Box::new(aws_sdk_s3::Error::from(e))))?;

        // Copy chunk by chunk so large objects never sit in memory whole
        let mut body = object.body;
        let mut written: u64 = 0;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| TransferError::Remote(Box::new(e)))?
        {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        Ok(written)
    }
}
