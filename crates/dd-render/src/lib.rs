pub mod cache;
pub mod display;
pub mod encode;
pub mod hit;
pub mod paint;

pub use cache::{Bitmap, BitmapCache, CacheEntry, DecodeError, ImageDecoder, Lookup, RasterDecoder};
pub use display::{DrawCmd, Frame, Primitive};
pub use encode::encode_frame;
pub use hit::{HitList, hit_test, hit_test_rect};
pub use paint::{RenderInput, Theme, render_scene};
