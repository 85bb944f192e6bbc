//! Decoded-bitmap cache and the image decoder seam.
//!
//! The cache is owned by whoever drives rendering and passed to the render
//! pass by reference. An entry moves `Pending → Ready | Failed` in a single
//! insert once decoding has fully finished, so a render never observes a
//! partially decoded bitmap.

use dd_core::ImageSourceId;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A decoded RGBA8 (straight alpha) bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Wrap an RGBA8 buffer, checking that it covers `width × height`.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty);
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(DecodeError::BufferSize {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }
}

/// Errors from turning source bytes into a bitmap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The bytes are not an image format the decoder understands.
    #[error("unsupported or corrupt image data: {0}")]
    Format(String),

    /// The image decoded to zero pixels.
    #[error("image has no pixels")]
    Empty,

    #[error("pixel buffer of {actual} bytes does not match {width}x{height} RGBA")]
    BufferSize { width: u32, height: u32, actual: usize },

    /// No bytes were registered for the source.
    #[error("no bytes registered for image source {0:?}")]
    UnknownSource(ImageSourceId),
}

/// Converts encoded image bytes into a bitmap.
pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Bitmap, DecodeError>;
}

/// Decoder backed by the `image` crate (PNG, JPEG, GIF, WebP).
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Bitmap, DecodeError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| DecodeError::Format(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Bitmap::from_rgba8(width, height, rgba.into_raw())
    }
}

/// State of one cached source.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// A decode has been requested but has not completed.
    Pending,
    Ready(Arc<Bitmap>),
    Failed(DecodeError),
}

/// Result of a cache read.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    /// Never requested.
    Missing,
    Pending,
    Ready(&'a Arc<Bitmap>),
    Failed(&'a DecodeError),
}

#[derive(Debug, Default)]
pub struct BitmapCache {
    entries: HashMap<ImageSourceId, CacheEntry>,
}

impl BitmapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, source: ImageSourceId) -> Lookup<'_> {
        match self.entries.get(&source) {
            None => Lookup::Missing,
            Some(CacheEntry::Pending) => Lookup::Pending,
            Some(CacheEntry::Ready(bitmap)) => Lookup::Ready(bitmap),
            Some(CacheEntry::Failed(err)) => Lookup::Failed(err),
        }
    }

    pub fn bitmap(&self, source: ImageSourceId) -> Option<Arc<Bitmap>> {
        match self.entries.get(&source) {
            Some(CacheEntry::Ready(bitmap)) => Some(Arc::clone(bitmap)),
            _ => None,
        }
    }

    /// Record that a decode is in flight. Returns `false` if the source
    /// already has an entry of any kind, so callers never decode twice.
    pub fn mark_pending(&mut self, source: ImageSourceId) -> bool {
        if self.entries.contains_key(&source) {
            return false;
        }
        self.entries.insert(source, CacheEntry::Pending);
        true
    }

    /// Publish a finished decode.
    pub fn complete(
        &mut self,
        source: ImageSourceId,
        result: Result<Bitmap, DecodeError>,
    ) -> Result<Arc<Bitmap>, DecodeError> {
        match result {
            Ok(bitmap) => {
                let bitmap = Arc::new(bitmap);
                log::debug!(
                    "bitmap cache: {source:?} ready ({}x{})",
                    bitmap.width,
                    bitmap.height
                );
                self.entries
                    .insert(source, CacheEntry::Ready(Arc::clone(&bitmap)));
                Ok(bitmap)
            }
            Err(err) => {
                log::warn!("bitmap cache: {source:?} failed to decode: {err}");
                self.entries.insert(source, CacheEntry::Failed(err.clone()));
                Err(err)
            }
        }
    }

    pub fn evict(&mut self, source: ImageSourceId) {
        self.entries.remove(&source);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
