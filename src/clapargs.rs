use clap::Parser;
use std::path::PathBuf;

/// s3fetch - copy every object under an s3 prefix into a local directory
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The local directory to download the objects into (created if missing)
    pub data_path: PathBuf,
    /// The s3 bucket from which to fetch objects
    pub s3_bucket: String,
    /// The folder or key prefix under which the objects are stored
    pub dataset_folder: String,
    /// The access key id used to authenticate against s3
    #[arg(value_name = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: String,
    /// The secret access key used to authenticate against s3
    #[arg(value_name = "AWS_SECRET_ACCESS_KEY")]
    pub secret_access_key: String,
    /// Extension, optional: the region of the bucket (defaults to AWS_REGION / profile, then us-east-1)
    #[arg(long)]
    pub region: Option<String>,
    /// Extension, optional: a custom endpoint for s3-compatible stores, e.g. http://localhost:9000
    #[arg(long)]
    pub endpoint_url: Option<String>,
}

/// Everything one run needs, fixed at startup.
pub struct TransferRequest {
    pub local_path: PathBuf,
    pub bucket: String,
    pub prefix: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

// The secret must never end up in a log line.
impl std::fmt::Debug for TransferRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferRequest")
            .field("local_path", &self.local_path)
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl From<Args> for TransferRequest {
    fn from(args: Args) -> Self {
        Self {
            local_path: args.data_path,
            bucket: args.s3_bucket,
            prefix: args.dataset_folder,
            access_key: args.access_key_id,
            secret_key: args.secret_access_key,
            region: args.region,
            endpoint_url: args.endpoint_url,
        }
    }
}
