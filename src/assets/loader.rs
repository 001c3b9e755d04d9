use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

use crate::foundation::error::{StudioError, StudioResult};

/// Fetches the encoded bytes behind an image source string.
///
/// `data:` URIs never reach a loader; the cache decodes them inline.
pub trait ImageLoader {
    /// Fetch the raw bytes for `src`.
    fn fetch(&self, src: &str) -> impl Future<Output = StudioResult<Vec<u8>>>;
}

/// Loads sources as paths relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    /// Loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Resolve `src` below the root. Accepts an optional `file://` prefix.
    pub fn resolve(&self, src: &str) -> StudioResult<PathBuf> {
        let rel = src.strip_prefix("file://").unwrap_or(src);
        if rel.contains("://") {
            return Err(StudioError::asset_load(format!(
                "unsupported image source scheme in '{src}'"
            )));
        }
        let norm = normalize_rel_path(rel)?;
        Ok(self.root.join(norm))
    }
}

impl ImageLoader for FsImageLoader {
    async fn fetch(&self, src: &str) -> StudioResult<Vec<u8>> {
        let path = self.resolve(src)?;
        std::fs::read(&path).map_err(|e| {
            StudioError::asset_load(format!("read image '{}': {e}", path.display()))
        })
    }
}

/// In-memory loader keyed by source string.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageLoader {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryImageLoader {
    /// Empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes for `src`.
    pub fn insert(&mut self, src: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(src.into(), bytes);
    }
}

impl ImageLoader for MemoryImageLoader {
    async fn fetch(&self, src: &str) -> StudioResult<Vec<u8>> {
        self.entries
            .get(src)
            .cloned()
            .ok_or_else(|| StudioError::asset_load(format!("image source '{src}' not found")))
    }
}

/// Normalize a relative asset path: forward slashes, no `.`/`..`, no leading `/`.
pub fn normalize_rel_path(source: &str) -> StudioResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StudioError::asset_load("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(StudioError::asset_load("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StudioError::asset_load("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StudioError::asset_load("image path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
