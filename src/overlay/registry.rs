use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geometry::Rect;

/// Stack order of the first doubt; each later doubt sits `STACK_STEP` above.
pub const BASE_Z: i64 = 1000;
pub const STACK_STEP: i64 = 10;

pub type DoubtId = String;

/// One open question-popup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doubt {
    pub id: DoubtId,
    pub selected_text: String,
    pub query: String,
    pub response: String,
    pub stack_order: i64,
    pub anchor_position: Option<Rect>,
    /// Inline generation failure, cleared on the next submission.
    pub error: Option<String>,
    /// True while any generation request for this doubt is outstanding.
    pub awaiting_response: bool,
    #[serde(skip)]
    in_flight: usize,
}

impl Doubt {
    pub fn has_response(&self) -> bool {
        !self.response.is_empty()
    }

    fn request_started(&mut self) {
        self.in_flight += 1;
        self.awaiting_response = true;
    }

    fn request_finished(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.awaiting_response = self.in_flight > 0;
    }
}

/// Ordered collection of open doubts plus the unsubmitted query text for each.
#[derive(Debug, Default)]
pub struct DoubtRegistry {
    doubts: Vec<Doubt>,
    pending: HashMap<DoubtId, String>,
}

impl DoubtRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, selected_text: String, anchor_position: Option<Rect>) -> &Doubt {
        let stack_order = self.next_stack_order();
        let doubt = Doubt {
            id: Uuid::new_v4().to_string(),
            selected_text,
            query: String::new(),
            response: String::new(),
            stack_order,
            anchor_position,
            error: None,
            awaiting_response: false,
            in_flight: 0,
        };

        self.pending.insert(doubt.id.clone(), String::new());
        self.doubts.push(doubt);
        &self.doubts[self.doubts.len() - 1]
    }

    /// `BASE_Z + STACK_STEP * count`, bumped past the topmost open doubt so a
    /// close followed by a create can never reuse a live value.
    fn next_stack_order(&self) -> i64 {
        let by_count = BASE_Z + STACK_STEP * self.doubts.len() as i64;
        match self.doubts.last() {
            Some(top) => by_count.max(top.stack_order + STACK_STEP),
            None => by_count,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Doubt> {
        self.doubts.iter().find(|d| d.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Doubt> {
        self.doubts.iter_mut().find(|d| d.id == id)
    }

    pub fn pending_query(&self, id: &str) -> Option<&str> {
        self.pending.get(id).map(String::as_str)
    }

    /// Edits the in-progress query. Returns false when the doubt is gone.
    pub fn update_query(&mut self, id: &str, text: String) -> bool {
        match self.pending.get_mut(id) {
            Some(entry) => {
                *entry = text;
                true
            }
            None => false,
        }
    }

    /// Copies the pending query into `Doubt.query` and flags the doubt as
    /// waiting. Returns the `(selected_text, query)` pair for the generator,
    /// or `None` when the doubt is absent or the query is blank.
    pub fn commit_query(&mut self, id: &str) -> Option<(String, String)> {
        let query = self.pending.get(id)?.clone();
        if query.trim().is_empty() {
            return None;
        }

        let doubt = self.get_mut(id)?;
        doubt.query = query.clone();
        doubt.error = None;
        doubt.request_started();
        Some((doubt.selected_text.clone(), query))
    }

    pub fn set_response(&mut self, id: &str, response: String) -> bool {
        match self.get_mut(id) {
            Some(doubt) => {
                doubt.response = response;
                doubt.error = None;
                doubt.request_finished();
                true
            }
            None => false,
        }
    }

    pub fn set_error(&mut self, id: &str, message: String) -> bool {
        match self.get_mut(id) {
            Some(doubt) => {
                doubt.error = Some(message);
                doubt.request_finished();
                true
            }
            None => false,
        }
    }

    /// Removes the doubt and its pending entry. Safe to call twice.
    pub fn remove(&mut self, id: &str) -> Option<Doubt> {
        self.pending.remove(id);
        let index = self.doubts.iter().position(|d| d.id == id)?;
        Some(self.doubts.remove(index))
    }

    pub fn clear(&mut self) {
        self.doubts.clear();
        self.pending.clear();
    }

    /// Doubts in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Doubt> {
        self.doubts.iter()
    }

    pub fn len(&self) -> usize {
        self.doubts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doubts.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
