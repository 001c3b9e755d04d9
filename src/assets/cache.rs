use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::{ImageData, decode_source_bytes, parse_data_uri};
use crate::assets::loader::ImageLoader;
use crate::foundation::error::StudioResult;

/// Load state of one image source as seen by the renderer.
#[derive(Clone, Debug)]
pub enum ImageStatus {
    /// Decoded and ready to draw.
    Ready(Arc<ImageData>),
    /// Registered but not fetched yet; draw the placeholder.
    Pending,
    /// Fetch or decode failed; draw the placeholder.
    Failed,
}

#[derive(Clone, Debug)]
enum Slot {
    Pending,
    Ready(Arc<ImageData>),
    Failed(String),
}

/// Per-source memo of decoded images.
///
/// Each distinct source is fetched at most once. Sources first seen during a paint are recorded
/// as pending; [`ImageCache::resolve_pending`] fetches them all concurrently and is the barrier
/// the export path waits on before its final paint.
#[derive(Clone, Debug, Default)]
pub struct ImageCache {
    slots: HashMap<String, Slot>,
}

impl ImageCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known sources in any state.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no source has been seen.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Status for `src`, registering it as pending on first sight.
    ///
    /// `data:` URIs are decoded immediately.
    pub fn ensure_loaded(&mut self, src: &str) -> ImageStatus {
        if let Some(slot) = self.slots.get(src) {
            return slot_status(slot);
        }

        let slot = match parse_data_uri(src) {
            Ok(Some((mime, bytes))) => decode_slot(src, &bytes, mime.as_deref()),
            Ok(None) => Slot::Pending,
            Err(e) => {
                tracing::warn!(error = %e, "invalid data uri");
                Slot::Failed(e.to_string())
            }
        };
        let status = slot_status(&slot);
        self.slots.insert(src.to_owned(), slot);
        status
    }

    /// Register every non-empty source so a following [`ImageCache::resolve_pending`] covers it.
    pub fn register_sources<'a>(&mut self, sources: impl IntoIterator<Item = &'a str>) {
        for src in sources {
            if !src.is_empty() {
                self.ensure_loaded(src);
            }
        }
    }

    /// Status for `src` without registering it.
    pub fn status(&self, src: &str) -> Option<ImageStatus> {
        self.slots.get(src).map(slot_status)
    }

    /// Failure message for `src`, if its load failed.
    pub fn failure(&self, src: &str) -> Option<&str> {
        match self.slots.get(src) {
            Some(Slot::Failed(msg)) => Some(msg),
            _ => None,
        }
    }

    /// Sources still waiting on a fetch, sorted.
    pub fn pending_sources(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Pending))
            .map(|(src, _)| src.clone())
            .collect();
        out.sort();
        out
    }

    /// True when some source is still pending.
    pub fn has_pending(&self) -> bool {
        self.slots.values().any(|s| matches!(s, Slot::Pending))
    }

    /// Decode `bytes` and store them under `src`, replacing any previous state.
    pub fn insert_bytes(&mut self, src: &str, bytes: &[u8]) -> StudioResult<()> {
        let data = decode_source_bytes(bytes, None)?;
        self.slots
            .insert(src.to_owned(), Slot::Ready(Arc::new(data)));
        Ok(())
    }

    /// Mark every failed source as pending again so the next resolve retries it.
    pub fn retry_failed(&mut self) {
        for slot in self.slots.values_mut() {
            if matches!(slot, Slot::Failed(_)) {
                *slot = Slot::Pending;
            }
        }
    }

    /// Fetch and decode every pending source concurrently.
    ///
    /// Failures are recorded per source and never abort the batch. Returns how many sources
    /// became ready.
    #[tracing::instrument(skip(self, loader))]
    pub async fn resolve_pending<L: ImageLoader>(&mut self, loader: &L) -> usize {
        let sources = self.pending_sources();
        if sources.is_empty() {
            return 0;
        }

        let fetched =
            futures::future::join_all(sources.iter().map(|src| loader.fetch(src))).await;

        let mut ready = 0;
        for (src, result) in sources.into_iter().zip(fetched) {
            let slot = match result {
                Ok(bytes) => decode_slot(&src, &bytes, None),
                Err(e) => {
                    tracing::warn!(src = %src, error = %e, "image fetch failed");
                    Slot::Failed(e.to_string())
                }
            };
            if matches!(slot, Slot::Ready(_)) {
                ready += 1;
            }
            self.slots.insert(src, slot);
        }
        ready
    }
}

fn decode_slot(src: &str, bytes: &[u8], mime: Option<&str>) -> Slot {
    match decode_source_bytes(bytes, mime) {
        Ok(data) => Slot::Ready(Arc::new(data)),
        Err(e) => {
            let shown = if src.starts_with("data:") { "data:..." } else { src };
            tracing::warn!(src = shown, error = %e, "image decode failed");
            Slot::Failed(e.to_string())
        }
    }
}

fn slot_status(slot: &Slot) -> ImageStatus {
    match slot {
        Slot::Pending => ImageStatus::Pending,
        Slot::Ready(data) => ImageStatus::Ready(Arc::clone(data)),
        Slot::Failed(_) => ImageStatus::Failed,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
