//! Instance field placement and coloring
//!
//! Each field owns a pre-sized array of instances and rewrites it in place
//! from the current time. No field keeps history, so any time can be
//! evaluated directly.

pub mod bars;
pub mod grid;
pub mod stickers;

pub use bars::{BarConfig, LightBar, LightBars};
pub use grid::{GridConfig, GridLight, LightGrid};
pub use stickers::{Sticker, StickerConfig, Stickers};
