use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageKind {
    /// Amazon S3 or any S3-compatible service
    S3,
    /// Directories under `--root`, one per bucket
    Filesystem,
    /// Process memory, lost on exit
    Memory,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Editor listening host
    #[arg(long, env = "CMS3_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Editor listening port
    #[arg(short, long, env = "PORT", default_value_t = 3012)]
    pub port: u16,

    /// Storage backend type
    #[arg(
        short,
        long,
        env = "CMS3_STORAGE",
        value_enum,
        ignore_case = true,
        default_value = "S3"
    )]
    pub storage: StorageKind,

    /// Root path of the filesystem backend
    #[arg(long, env = "CMS3_ROOTDIR", default_value = "/var/lib/cms3")]
    pub root: String,

    /// Bucket opened when visiting `/`
    #[arg(long, env = "AWS_BUCKET_DEFAULT")]
    pub default_bucket: String,

    /// Region of the object store
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Custom S3 endpoint (MinIO, RustFS, ...)
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Base URL that serves bucket objects publicly, instead of the AWS regional endpoint
    #[arg(long, env = "CMS3_PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,
}
