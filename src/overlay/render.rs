use std::collections::HashMap;

use serde::Serialize;

use super::{
    geometry::{Rect, Size, Viewport},
    layout::{connector, place_popup, Connector, PopupPlacement, POPUP_FOOTPRINT},
    registry::{DoubtId, DoubtRegistry},
    selection::Affordance,
};

/// Everything the frontend needs to draw the overlay for one frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayFrame {
    pub viewport: Viewport,
    pub affordance: Option<Affordance>,
    pub doubts: Vec<DoubtFrame>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoubtFrame {
    pub id: DoubtId,
    /// 1-based badge number ("Doubt #N").
    pub ordinal: usize,
    pub selected_text: String,
    pub pending_query: String,
    pub query: String,
    /// Present only once a non-empty response exists.
    pub answer: Option<String>,
    pub error: Option<String>,
    pub awaiting_response: bool,
    pub backdrop_z: i64,
    pub popup_z: i64,
    pub connector_z: i64,
    pub placement: PopupPlacement,
    pub connector: Option<Connector>,
}

/// Derives the frame from current state. `measured` holds the last bounds the
/// frontend read back for each mounted popup.
pub fn render_frame(
    registry: &DoubtRegistry,
    affordance: Option<&Affordance>,
    viewport: Viewport,
    measured: &HashMap<DoubtId, Rect>,
) -> OverlayFrame {
    let doubts = registry
        .iter()
        .enumerate()
        .map(|(index, doubt)| {
            let mounted = measured.get(&doubt.id);
            let footprint = mounted
                .map(|rect| Size::new(rect.width, rect.height))
                .unwrap_or(POPUP_FOOTPRINT);
            let placement = place_popup(index, viewport, footprint);

            // No read-back yet means no line this pass.
            let line = match (doubt.anchor_position.as_ref(), mounted) {
                (Some(anchor), Some(popup)) => Some(connector(anchor, popup)),
                _ => None,
            };

            DoubtFrame {
                id: doubt.id.clone(),
                ordinal: index + 1,
                selected_text: doubt.selected_text.clone(),
                pending_query: registry
                    .pending_query(&doubt.id)
                    .unwrap_or_default()
                    .to_string(),
                query: doubt.query.clone(),
                answer: doubt.has_response().then(|| doubt.response.clone()),
                error: doubt.error.clone(),
                awaiting_response: doubt.awaiting_response,
                backdrop_z: doubt.stack_order - 1,
                popup_z: doubt.stack_order,
                connector_z: doubt.stack_order - 2,
                placement,
                connector: line,
            }
        })
        .collect();

    OverlayFrame {
        viewport,
        affordance: affordance.cloned(),
        doubts,
    }
}
