//! Doubt overlay: highlight text, ask about it, stack follow-up popups.

#[cfg(feature = "desktop")]
pub(crate) mod commands;
pub mod controller;
pub mod geometry;
pub mod layout;
pub mod registry;
pub mod render;
pub mod selection;

pub use controller::{OverlayController, OverlaySink};
pub use geometry::{Point, Rect, Size, Viewport};
pub use registry::{Doubt, DoubtId};
pub use render::{DoubtFrame, OverlayFrame};
pub use selection::{Affordance, SelectionReport};
