use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

const SHAPE_PREFIX: &str = "shape_";

/// Stable identity of a shape, minted once at creation.
///
/// Positions in the scene change on every reorder or removal; a `ShapeId`
/// never does. Ids are never reused within a process, so a discarded stroke
/// costs nothing beyond its counter value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl ShapeId {
    /// Mint a fresh id.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        ShapeId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    /// Parse the `shape_<n>` form produced by `Display`.
    pub fn parse(s: &str) -> Option<Self> {
        s.strip_prefix(SHAPE_PREFIX)?.parse().ok().map(ShapeId)
    }
}

impl fmt::Debug for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{SHAPE_PREFIX}{}", self.0)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SHAPE_PREFIX}{}", self.0)
    }
}

impl Serialize for ShapeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ShapeId::parse(&s).ok_or_else(|| D::Error::custom(format!("invalid shape id `{s}`")))
    }
}

/// Key of one imported image byte source. Decoded bitmaps are cached per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageSourceId(u64);

impl ImageSourceId {
    /// Mint a fresh source key.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        ImageSourceId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}
