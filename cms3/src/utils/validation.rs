/// Longest key S3 accepts, in bytes.
pub const MAX_KEY_LEN: usize = 1024;

/// Bucket names are single path segments; the provider enforces its own
/// naming rules beyond that.
pub fn is_valid_bucket(bucket: &str) -> bool {
    !bucket.is_empty()
        && bucket != "."
        && bucket != ".."
        && !bucket.contains('/')
        && !bucket.chars().any(char::is_control)
}

/// Keys may be nested (`css/site.css`) but every segment must be a real name.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && !key.chars().any(char::is_control)
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}
