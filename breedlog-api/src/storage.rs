//! Object storage for animal photos and breed reference images
//!
//! Two buckets exist. `animal-images` is private: keys start with the owning
//! user's id and only that user may read them. `breed-references` is public.
//!
//! Image references stored on records use the short `<bucket>/<key>` form.
//! The hosted-storage URL layouts clients may still send are recognised too:
//! `/storage/v1/object/{public,sign,authenticated}/<bucket>/<key>` and this
//! service's own `/api/storage/<bucket>/<key>`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Known buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    AnimalImages,
    BreedReferences,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::AnimalImages => "animal-images",
            Bucket::BreedReferences => "breed-references",
        }
    }

    pub fn parse(name: &str) -> Option<Bucket> {
        match name {
            "animal-images" => Some(Bucket::AnimalImages),
            "breed-references" => Some(Bucket::BreedReferences),
            _ => None,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Bucket::BreedReferences)
    }
}

/// Validated bucket + key pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    bucket: Bucket,
    key: String,
}

const HOSTED_PREFIXES: [&str; 4] = [
    "/storage/v1/object/public/",
    "/storage/v1/object/sign/",
    "/storage/v1/object/authenticated/",
    "/api/storage/",
];

impl ObjectPath {
    /// Build a path, rejecting empty, absolute or traversing keys
    pub fn new(bucket: Bucket, key: &str) -> Result<Self, StorageError> {
        let valid = !key.is_empty()
            && !key.contains('\\')
            && key
                .split('/')
                .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(Self {
            bucket,
            key: key.to_string(),
        })
    }

    /// Private-bucket key for a fresh upload: `<user_id>/<uuid>.<ext>`
    pub fn new_upload(owner: Uuid, extension: &str) -> Self {
        Self {
            bucket: Bucket::AnimalImages,
            key: format!("{}/{}.{}", owner, Uuid::new_v4(), extension),
        }
    }

    /// Recognise a storage reference
    ///
    /// Accepts the short form, the hosted layouts (bare path or full URL) and
    /// ignores any query string. Returns `None` for anything else, including
    /// references naming an unknown bucket or an invalid key.
    pub fn parse_reference(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        let reference = reference
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();

        let path = match reference.split_once("://") {
            Some((scheme, rest)) if scheme == "http" || scheme == "https" => {
                let (_, path) = rest.split_once('/')?;
                return Self::from_hosted_path(&format!("/{}", path));
            }
            Some(_) => return None,
            None => reference,
        };

        if path.starts_with('/') {
            return Self::from_hosted_path(path);
        }

        Self::from_bucket_path(path)
    }

    fn from_hosted_path(path: &str) -> Option<Self> {
        HOSTED_PREFIXES
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix))
            .and_then(Self::from_bucket_path)
    }

    fn from_bucket_path(path: &str) -> Option<Self> {
        let (bucket, key) = path.split_once('/')?;
        let bucket = Bucket::parse(bucket)?;
        Self::new(bucket, key).ok()
    }

    pub fn bucket(&self) -> Bucket {
        self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Public objects are readable by anyone; private ones only under the owner's prefix
    pub fn readable_by(&self, user: Option<Uuid>) -> bool {
        if self.bucket.is_public() {
            return true;
        }
        let Some(user) = user else {
            return false;
        };
        self.key
            .split_once('/')
            .is_some_and(|(owner, _)| owner == user.to_string())
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket.as_str(), self.key)
    }
}

/// Object store seam; production uses the filesystem, tests use memory
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object, `None` if absent
    async fn get(&self, path: &ObjectPath) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write (or replace) an object
    async fn put(&self, path: &ObjectPath, bytes: Vec<u8>) -> Result<(), StorageError>;
}

/// Filesystem store rooted at `<root>/<bucket>/<key>`
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_path(&self, path: &ObjectPath) -> PathBuf {
        let mut file = self.root.join(path.bucket.as_str());
        for segment in path.key.split('/') {
            file.push(segment);
        }
        file
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get(&self, path: &ObjectPath) -> Result<Option<Vec<u8>>, StorageError> {
        match tokio::fs::read(self.file_path(path)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, path: &ObjectPath, bytes: Vec<u8>) -> Result<(), StorageError> {
        let file = self.file_path(path);
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(file, bytes).await?;
        Ok(())
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<ObjectPath, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, path: &ObjectPath) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.objects.read().await.get(path).cloned())
    }

    async fn put(&self, path: &ObjectPath, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.objects.write().await.insert(path.clone(), bytes);
        Ok(())
    }
}
