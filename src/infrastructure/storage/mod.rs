//! Durable storage adapters.

mod file_bucket_storage;

pub use file_bucket_storage::FileBucketStorage;
