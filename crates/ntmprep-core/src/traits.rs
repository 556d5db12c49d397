use crate::error::Result;

/// Named-object storage addressed by `(bucket, key)`.
///
/// Keys use `/` as a separator regardless of platform. Implementations must
/// treat a `put` to an existing key as an overwrite.
pub trait BlobStore: Send + Sync {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()>;
    /// Keys under `prefix`, sorted.
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    fn get_text(&self, bucket: &str, key: &str) -> Result<String> {
        let bytes = self.get(bucket, key)?;
        String::from_utf8(bytes).map_err(|e| crate::error::Error::decode(key, e.to_string()))
    }
}
