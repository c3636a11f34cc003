use tauri::{AppHandle, Emitter};

use crate::{
    chat::{ChatSink, ChatSnapshot},
    overlay::{OverlayFrame, OverlaySink},
};

pub const OVERLAY_UPDATED: &str = "overlay-updated";
pub const CHAT_UPDATED: &str = "chat-updated";

/// Forwards controller state changes to the webview as Tauri events.
pub struct TauriEventSink {
    app_handle: AppHandle,
}

impl TauriEventSink {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl OverlaySink for TauriEventSink {
    fn overlay_changed(&self, frame: &OverlayFrame) {
        if let Err(err) = self.app_handle.emit(OVERLAY_UPDATED, frame) {
            log::error!("Failed to emit {OVERLAY_UPDATED}: {err}");
        }
    }
}

impl ChatSink for TauriEventSink {
    fn chat_changed(&self, snapshot: &ChatSnapshot) {
        if let Err(err) = self.app_handle.emit(CHAT_UPDATED, snapshot) {
            log::error!("Failed to emit {CHAT_UPDATED}: {err}");
        }
    }
}
