use std::path::Path;

use crate::presenter::ResourceLocator;
use crate::utils::cli::{Args, StorageKind};
use crate::utils::validation::is_valid_bucket;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage_typ: StorageKind,
    pub root_dir: String,
    pub default_bucket: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub public_base_url: Option<String>,
}

impl Config {
    /// Checks the parsed arguments and reports every problem at once.
    pub fn from_args(args: &Args) -> Result<Self, Vec<String>> {
        let mut validation_errors = Vec::new();

        if !is_valid_bucket(&args.default_bucket) {
            validation_errors.push(format!(
                "AWS_BUCKET_DEFAULT `{}` is not a valid bucket name",
                args.default_bucket,
            ));
        }

        if args.storage == StorageKind::Filesystem && !Path::new(&args.root).is_dir() {
            validation_errors.push(format!(
                "CMS3_ROOTDIR `{}` does not exist or is not a directory",
                args.root,
            ));
        }

        if args.region.trim().is_empty() {
            validation_errors.push("AWS_REGION must not be empty".to_string());
        }

        for (name, url) in [
            ("AWS_ENDPOINT_URL", &args.endpoint_url),
            ("CMS3_PUBLIC_BASE_URL", &args.public_base_url),
        ] {
            if let Some(url) = url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    validation_errors.push(format!("{name} `{url}` must be an http(s) URL"));
                }
            }
        }

        if !validation_errors.is_empty() {
            return Err(validation_errors);
        }

        Ok(Config {
            host: args.host.clone(),
            port: args.port,
            storage_typ: args.storage,
            root_dir: args.root.clone(),
            default_bucket: args.default_bucket.clone(),
            region: args.region.clone(),
            endpoint_url: args.endpoint_url.clone(),
            public_base_url: args.public_base_url.clone(),
        })
    }

    /// Where externally linked objects are served from: the configured public
    /// base URL, else the custom endpoint, else the AWS regional endpoint.
    pub fn resource_locator(&self) -> ResourceLocator {
        match (&self.public_base_url, &self.endpoint_url) {
            (Some(base), _) | (None, Some(base)) => ResourceLocator::with_base_url(base.as_str()),
            (None, None) => ResourceLocator::for_region(&self.region),
        }
    }
}
