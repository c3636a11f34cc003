use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geometry::{Point, Rect};

/// An unused affordance disappears after this long.
pub const AFFORDANCE_TIMEOUT: Duration = Duration::from_secs(5);
/// Horizontal gap between the selection's right edge and the icon.
pub const ICON_GAP: f64 = 10.0;

/// What the frontend saw on pointer-up inside a highlightable region.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionReport {
    pub text: Option<String>,
    pub rect: Option<Rect>,
}

/// The transient "ask about this" icon offered for a fresh selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Affordance {
    pub id: String,
    pub text: String,
    pub anchor: Rect,
    pub icon: Point,
}

#[derive(Debug, Default)]
pub struct SelectionDetector {
    current: Option<Affordance>,
}

impl SelectionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers an affordance for the selection, replacing any unconsumed one.
    /// Blank text or a selection without usable geometry offers nothing and
    /// leaves the previous affordance alone.
    pub fn capture(&mut self, report: SelectionReport) -> Option<&Affordance> {
        let text = report.text.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return None;
        }
        let anchor = report.rect.filter(Rect::is_measurable)?;

        self.current = Some(Affordance {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            anchor,
            icon: Point {
                x: anchor.right() + ICON_GAP,
                y: anchor.top,
            },
        });
        self.current.as_ref()
    }

    /// Consumes the affordance if `id` is still the live one.
    pub fn take(&mut self, id: &str) -> Option<Affordance> {
        if self.current.as_ref().is_some_and(|a| a.id == id) {
            self.current.take()
        } else {
            None
        }
    }

    /// Drops the affordance; with `Some(id)` only when it still matches.
    pub fn dismiss(&mut self, id: Option<&str>) -> bool {
        match (id, self.current.as_ref()) {
            (_, None) => false,
            (Some(id), Some(current)) if current.id != id => false,
            _ => {
                self.current = None;
                true
            }
        }
    }

    pub fn current(&self) -> Option<&Affordance> {
        self.current.as_ref()
    }
}
