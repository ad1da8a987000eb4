use crate::error::{SyncError, SyncResult};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageRef {
    Object { url: String },
    Plain(String),
}

/// Parse a `data-images` attribute: a JSON list of `{"url": ...}` objects or
/// bare URL strings.
pub fn parse_images(raw: &str) -> SyncResult<Vec<String>> {
    let refs: Vec<ImageRef> = serde_json::from_str(raw)
        .map_err(|e| SyncError::Decode(format!("data-images: {e}")))?;
    Ok(refs
        .into_iter()
        .map(|r| match r {
            ImageRef::Object { url } => url,
            ImageRef::Plain(url) => url,
        })
        .collect())
}

/// Wrap-around index over a non-empty image list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    current: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Option<Self> {
        (len > 0).then_some(Self { len, current: 0 })
    }

    /// Resume from a `data-current-image` value; out-of-range values wrap.
    pub fn resume(len: usize, current: Option<&str>) -> Option<Self> {
        let mut carousel = Self::new(len)?;
        let index = current.and_then(|v| v.trim().parse::<usize>().ok()).unwrap_or(0);
        carousel.current = index % len;
        Some(carousel)
    }

    /// Dots and arrows are only worth drawing for two or more images.
    pub fn has_controls(&self) -> bool {
        self.len >= 2
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.current = (self.current + 1) % self.len;
        self.current
    }

    pub fn prev(&mut self) -> usize {
        self.current = (self.current + self.len - 1) % self.len;
        self.current
    }

    pub fn go_to(&mut self, index: usize) -> usize {
        self.current = index.min(self.len - 1);
        self.current
    }
}
