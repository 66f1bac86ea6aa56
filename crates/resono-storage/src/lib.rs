//! Object storage for streaming artifacts.
//!
//! Three logical buckets ([`Bucket`]) hold track audio (HLS manifests,
//! segments, source files), track cover images and playlist cover images.
//! Backends implement [`ObjectStorage`]; an S3-compatible backend (AWS or
//! MinIO via endpoint override) and a local filesystem backend are provided.
//! Keys are flat and derived from track ids (see [`keys`]), which makes
//! uploads idempotent by key and safe to retry.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Bucket, BucketNames, ByteStream, ObjectStorage, StorageError, StorageResult};
