//! Popup placement and anchor connectors.
//!
//! Everything here is recomputed from scratch for each frame: the viewport and
//! the number of open popups both change between frames and the arithmetic is
//! cheap.

use serde::Serialize;

use super::geometry::{Point, Rect, Size, Viewport};

/// Assumed popup size for clamping when the real size has not been measured.
pub const POPUP_FOOTPRINT: Size = Size::new(600.0, 400.0);
/// Each later popup cascades this far right and down.
pub const CASCADE_STEP: f64 = 32.0;
/// Height of the ordinal badge strip above a popup.
pub const HEADER_HEIGHT: f64 = 40.0;
pub const EDGE_MARGIN: f64 = 16.0;
/// Smallest allowed distance from the viewport top to a popup's top edge.
pub const HEADER_CLEARANCE: f64 = HEADER_HEIGHT + EDGE_MARGIN;
/// Padding around the connector's drawing surface.
pub const CONNECTOR_MARGIN: f64 = 20.0;
/// The connector ends this far below the popup's top edge.
pub const CONNECTOR_END_INSET: f64 = 24.0;

/// Where a popup goes. `center` is the point the popup is translated onto
/// (`translate(-50%, -50%)` on the frontend).
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PopupPlacement {
    pub center: Point,
    pub footprint: Size,
}

pub fn place_popup(index: usize, viewport: Viewport, footprint: Size) -> PopupPlacement {
    let cascade = CASCADE_STEP * index as f64;
    let max_offset_x = ((viewport.width - footprint.width) / 2.0).max(0.0);
    let max_offset_y = ((viewport.height - footprint.height) / 2.0).max(0.0);
    let offset_x = cascade.min(max_offset_x);
    let offset_y = cascade.min(max_offset_y);

    let origin = viewport.center();
    let half_height = footprint.height / 2.0;

    let mut top = origin.y + offset_y;
    let min_top = HEADER_CLEARANCE + half_height;
    if top < min_top {
        top = min_top;
    }
    // Applied last: on a very short viewport the bottom edge wins.
    let max_top = viewport.height - half_height - EDGE_MARGIN;
    if top > max_top {
        top = max_top;
    }

    PopupPlacement {
        center: Point {
            x: origin.x + offset_x,
            y: top,
        },
        footprint,
    }
}

/// Dashed anchor-to-popup line. `start` and `end` are relative to `surface`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub surface: Rect,
    pub start: Point,
    pub end: Point,
}

pub fn connector(anchor: &Rect, popup: &Rect) -> Connector {
    let start = anchor.center();
    let end = Point {
        x: popup.left + popup.width / 2.0,
        y: popup.top + CONNECTOR_END_INSET,
    };

    let left = start.x.min(end.x) - CONNECTOR_MARGIN;
    let top = start.y.min(end.y) - CONNECTOR_MARGIN;
    let surface = Rect {
        left,
        top,
        width: (end.x - start.x).abs() + 2.0 * CONNECTOR_MARGIN,
        height: (end.y - start.y).abs() + 2.0 * CONNECTOR_MARGIN,
    };

    Connector {
        surface,
        start: Point {
            x: start.x - left,
            y: start.y - top,
        },
        end: Point {
            x: end.x - left,
            y: end.y - top,
        },
    }
}
