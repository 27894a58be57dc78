//! Viewport virtualization.
//!
//! This module windows a computed [`Layout`](crate::layout::Layout) down to
//! the cards that intersect the scrolled viewport, using an R-tree
//! ([`LayoutIndex`]) built once per layout. Zoom is tracked by
//! [`ZoomState`] and applied as a visual transform only.

mod index;
mod window;
mod zoom;

pub use index::{CardExtent, LayoutIndex};
pub use window::{RenderWindow, Viewport, ViewportConfig, ViewportVirtualizer, visible};
pub use zoom::{ZoomConfig, ZoomState};
