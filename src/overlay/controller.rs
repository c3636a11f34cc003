use std::{collections::HashMap, sync::Arc};

use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::generation::TextGenerator;

use super::{
    geometry::{Rect, Viewport},
    registry::{Doubt, DoubtId, DoubtRegistry},
    render::{render_frame, OverlayFrame},
    selection::{Affordance, SelectionDetector, SelectionReport, AFFORDANCE_TIMEOUT},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Receives a fresh frame after every state change.
pub trait OverlaySink: Send + Sync + 'static {
    fn overlay_changed(&self, frame: &OverlayFrame);
}

#[derive(Default)]
struct OverlayState {
    registry: DoubtRegistry,
    selection: SelectionDetector,
    affordance_timer: Option<CancellationToken>,
    viewport: Viewport,
    measured: HashMap<DoubtId, Rect>,
}

impl OverlayState {
    fn frame(&self) -> OverlayFrame {
        render_frame(
            &self.registry,
            self.selection.current(),
            self.viewport,
            &self.measured,
        )
    }

    fn cancel_affordance_timer(&mut self) {
        if let Some(token) = self.affordance_timer.take() {
            token.cancel();
        }
    }
}

/// Owns one overlay's doubts. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct OverlayController {
    state: Arc<Mutex<OverlayState>>,
    generator: Arc<dyn TextGenerator>,
    sink: Arc<dyn OverlaySink>,
}

impl OverlayController {
    pub fn new(generator: Arc<dyn TextGenerator>, sink: Arc<dyn OverlaySink>) -> Self {
        Self {
            state: Arc::new(Mutex::new(OverlayState::default())),
            generator,
            sink,
        }
    }

    pub async fn snapshot(&self) -> OverlayFrame {
        self.state.lock().await.frame()
    }

    fn publish(&self, frame: OverlayFrame) {
        self.sink.overlay_changed(&frame);
    }

    /// Pointer-up inside a highlightable region.
    pub async fn capture_selection(&self, report: SelectionReport) -> Option<Affordance> {
        let (affordance, frame) = {
            let mut state = self.state.lock().await;
            let affordance = state.selection.capture(report)?.clone();

            state.cancel_affordance_timer();
            let token = CancellationToken::new();
            state.affordance_timer = Some(token.clone());
            self.spawn_affordance_timeout(affordance.id.clone(), token);

            (affordance, state.frame())
        };

        log_debug!("offering doubt affordance {}", affordance.id);
        self.publish(frame);
        Some(affordance)
    }

    fn spawn_affordance_timeout(&self, affordance_id: String, token: CancellationToken) {
        let controller = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(AFFORDANCE_TIMEOUT) => {
                    controller.expire_affordance(&affordance_id).await;
                }
            }
        });
    }

    async fn expire_affordance(&self, affordance_id: &str) {
        let frame = {
            let mut state = self.state.lock().await;
            if !state.selection.dismiss(Some(affordance_id)) {
                return;
            }
            state.affordance_timer = None;
            state.frame()
        };
        log_debug!("affordance {} expired unused", affordance_id);
        self.publish(frame);
    }

    /// Turns the live affordance into a doubt. Stale ids are ignored.
    pub async fn confirm_affordance(&self, affordance_id: &str) -> Option<Doubt> {
        let (doubt, frame) = {
            let mut state = self.state.lock().await;
            let affordance = state.selection.take(affordance_id)?;
            state.cancel_affordance_timer();
            let doubt = state
                .registry
                .create(affordance.text, Some(affordance.anchor))
                .clone();
            (doubt, state.frame())
        };

        log_info!("doubt {} opened (z={})", doubt.id, doubt.stack_order);
        self.publish(frame);
        Some(doubt)
    }

    pub async fn dismiss_affordance(&self) -> bool {
        let frame = {
            let mut state = self.state.lock().await;
            if !state.selection.dismiss(None) {
                return false;
            }
            state.cancel_affordance_timer();
            state.frame()
        };
        self.publish(frame);
        true
    }

    /// Opens a doubt directly, without an affordance step.
    pub async fn open_doubt(&self, selected_text: &str, anchor: Option<Rect>) -> Option<Doubt> {
        let selected_text = selected_text.trim();
        if selected_text.is_empty() {
            return None;
        }

        let (doubt, frame) = {
            let mut state = self.state.lock().await;
            let anchor = anchor.filter(Rect::is_measurable);
            let doubt = state
                .registry
                .create(selected_text.to_string(), anchor)
                .clone();
            (doubt, state.frame())
        };

        log_info!("doubt {} opened (z={})", doubt.id, doubt.stack_order);
        self.publish(frame);
        Some(doubt)
    }

    pub async fn update_query(&self, doubt_id: &str, text: String) -> bool {
        let frame = {
            let mut state = self.state.lock().await;
            if !state.registry.update_query(doubt_id, text) {
                return false;
            }
            state.frame()
        };
        self.publish(frame);
        true
    }

    /// Sends the pending query to the generator. Returns the task that will
    /// write the answer back, or `None` when nothing was submitted.
    ///
    /// A response for a doubt closed in the meantime is dropped on arrival;
    /// requests are never cancelled.
    pub async fn submit_query(&self, doubt_id: &str) -> Option<JoinHandle<()>> {
        let ((selected_text, query), frame) = {
            let mut state = self.state.lock().await;
            let request = state.registry.commit_query(doubt_id)?;
            (request, state.frame())
        };
        self.publish(frame);

        let controller = self.clone();
        let doubt_id = doubt_id.to_string();
        Some(tokio::spawn(async move {
            let result = controller.generator.explain(&selected_text, &query).await;

            let frame = {
                let mut state = controller.state.lock().await;
                let applied = match result {
                    Ok(response) => state.registry.set_response(&doubt_id, response),
                    Err(err) => {
                        log_warn!("generation failed for doubt {}: {}", doubt_id, err);
                        state.registry.set_error(&doubt_id, err.to_string())
                    }
                };
                if !applied {
                    log_debug!("dropping response for closed doubt {}", doubt_id);
                    return;
                }
                state.frame()
            };
            controller.publish(frame);
        }))
    }

    /// Closes one doubt. Closing an unknown or already closed id is a no-op.
    pub async fn close_doubt(&self, doubt_id: &str) -> bool {
        let frame = {
            let mut state = self.state.lock().await;
            state.measured.remove(doubt_id);
            if state.registry.remove(doubt_id).is_none() {
                return false;
            }
            state.frame()
        };
        log_info!("doubt {} closed", doubt_id);
        self.publish(frame);
        true
    }

    /// Closes the containing overlay: every doubt and any pending affordance.
    pub async fn close_all(&self) {
        let frame = {
            let mut state = self.state.lock().await;
            state.registry.clear();
            state.measured.clear();
            state.selection.dismiss(None);
            state.cancel_affordance_timer();
            state.frame()
        };
        self.publish(frame);
    }

    pub async fn set_viewport(&self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log_warn!("ignoring invalid viewport {}x{}", width, height);
            return;
        }

        let frame = {
            let mut state = self.state.lock().await;
            let viewport = Viewport::new(width, height);
            if state.viewport == viewport {
                return;
            }
            state.viewport = viewport;
            state.frame()
        };
        self.publish(frame);
    }

    /// Records the bounds the frontend read back for a mounted popup. Only a
    /// change triggers a new frame, so read-back after every render settles.
    pub async fn report_popup_bounds(&self, doubt_id: &str, bounds: Rect) -> bool {
        if !bounds.is_measurable() {
            return false;
        }

        let frame = {
            let mut state = self.state.lock().await;
            if state.registry.get(doubt_id).is_none() {
                return false;
            }
            if state.measured.get(doubt_id) == Some(&bounds) {
                return false;
            }
            state.measured.insert(doubt_id.to_string(), bounds);
            state.frame()
        };
        self.publish(frame);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chat::ChatMessage,
        generation::{simulated::simulated_explanation, GenerationError},
        overlay::registry::BASE_Z,
    };
    use async_trait::async_trait;
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex as StdMutex,
        },
        time::Duration,
    };

    #[derive(Default)]
    struct RecordingSink {
        frames: StdMutex<Vec<OverlayFrame>>,
    }

    impl RecordingSink {
        fn count(&self) -> usize {
            self.frames.lock().unwrap().len()
        }
    }

    impl OverlaySink for RecordingSink {
        fn overlay_changed(&self, frame: &OverlayFrame) {
            self.frames.lock().unwrap().push(frame.clone());
        }
    }

    struct CountingGenerator {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                fail: false,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn explain(&self, selected: &str, question: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(GenerationError::NotConfigured("offline"));
            }
            Ok(simulated_explanation(selected, question))
        }

        async fn reply(&self, _transcript: &[ChatMessage]) -> Result<String, GenerationError> {
            unreachable!("overlay never chats")
        }
    }

    fn controller_with(
        generator: CountingGenerator,
    ) -> (OverlayController, Arc<RecordingSink>, Arc<CountingGenerator>) {
        let sink = Arc::new(RecordingSink::default());
        let generator = Arc::new(generator);
        let controller = OverlayController::new(generator.clone(), sink.clone());
        (controller, sink, generator)
    }

    fn selection(text: &str) -> SelectionReport {
        SelectionReport {
            text: Some(text.to_string()),
            rect: Some(Rect::new(120.0, 300.0, 64.0, 18.0)),
        }
    }

    async fn select_and_confirm(controller: &OverlayController, text: &str) -> Doubt {
        let affordance = controller.capture_selection(selection(text)).await.unwrap();
        controller.confirm_affordance(&affordance.id).await.unwrap()
    }

    #[tokio::test]
    async fn gravity_scenario() {
        let (controller, _sink, generator) = controller_with(CountingGenerator::new());

        let doubt = select_and_confirm(&controller, "gravity").await;
        assert_eq!(doubt.stack_order, BASE_Z);
        assert_eq!(doubt.anchor_position, Some(Rect::new(120.0, 300.0, 64.0, 18.0)));
        assert!(controller.snapshot().await.affordance.is_none());

        controller.update_query(&doubt.id, "why?".into()).await;
        controller.submit_query(&doubt.id).await.unwrap().await.unwrap();

        let frame = controller.snapshot().await;
        assert_eq!(frame.doubts.len(), 1);
        assert_eq!(frame.doubts[0].query, "why?");
        assert_eq!(
            frame.doubts[0].answer.as_deref(),
            Some(simulated_explanation("gravity", "why?").as_str())
        );
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

        assert!(controller.close_doubt(&doubt.id).await);
        assert!(controller.snapshot().await.doubts.is_empty());
    }

    #[tokio::test]
    async fn many_confirms_keep_ids_unique_and_orders_increasing() {
        let (controller, _sink, _) = controller_with(CountingGenerator::new());
        for i in 0..6 {
            select_and_confirm(&controller, &format!("term {i}")).await;
        }

        let frame = controller.snapshot().await;
        assert_eq!(frame.doubts.len(), 6);
        let ids: HashSet<_> = frame.doubts.iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids.len(), 6);
        assert!(frame.doubts.windows(2).all(|w| w[0].popup_z < w[1].popup_z));
    }

    #[tokio::test]
    async fn blank_submission_never_calls_generator() {
        let (controller, sink, generator) = controller_with(CountingGenerator::new());
        let doubt = select_and_confirm(&controller, "gravity").await;
        let frames_before = sink.count();

        assert!(controller.submit_query(&doubt.id).await.is_none());
        controller.update_query(&doubt.id, "   ".into()).await;
        assert!(controller.submit_query(&doubt.id).await.is_none());
        assert!(controller.submit_query("missing").await.is_none());

        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        let frame = controller.snapshot().await;
        assert!(frame.doubts[0].answer.is_none());
        assert!(!frame.doubts[0].awaiting_response);
        // Only the query edit published.
        assert_eq!(sink.count(), frames_before + 1);
    }

    #[tokio::test]
    async fn repeated_submit_regenerates_each_time() {
        let (controller, _sink, generator) = controller_with(CountingGenerator::new());
        let doubt = select_and_confirm(&controller, "gravity").await;
        controller.update_query(&doubt.id, "why?".into()).await;

        for _ in 0..3 {
            controller.submit_query(&doubt.id).await.unwrap().await.unwrap();
        }
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_targets_one_doubt() {
        let (controller, _sink, _) = controller_with(CountingGenerator::new());
        let first = select_and_confirm(&controller, "first").await;
        let second = select_and_confirm(&controller, "second").await;
        controller.update_query(&second.id, "draft".into()).await;

        assert!(controller.close_doubt(&first.id).await);
        assert!(!controller.close_doubt(&first.id).await);

        let frame = controller.snapshot().await;
        assert_eq!(frame.doubts.len(), 1);
        assert_eq!(frame.doubts[0].id, second.id);
        assert_eq!(frame.doubts[0].pending_query, "draft");
        assert_eq!(frame.doubts[0].popup_z, second.stack_order);
    }

    #[tokio::test(start_paused = true)]
    async fn response_for_closed_doubt_is_dropped() {
        let mut generator = CountingGenerator::new();
        generator.delay = Duration::from_millis(500);
        let (controller, sink, _) = controller_with(generator);

        let doubt = select_and_confirm(&controller, "gravity").await;
        controller.update_query(&doubt.id, "why?".into()).await;
        let task = controller.submit_query(&doubt.id).await.unwrap();
        controller.close_doubt(&doubt.id).await;
        let frames_after_close = sink.count();

        task.await.unwrap();
        assert!(controller.snapshot().await.doubts.is_empty());
        assert_eq!(sink.count(), frames_after_close);
    }

    #[tokio::test]
    async fn generation_failure_is_shown_inline() {
        let mut generator = CountingGenerator::new();
        generator.fail = true;
        let (controller, _sink, _) = controller_with(generator);

        let doubt = select_and_confirm(&controller, "gravity").await;
        controller.update_query(&doubt.id, "why?".into()).await;
        controller.submit_query(&doubt.id).await.unwrap().await.unwrap();

        let frame = controller.snapshot().await;
        assert!(frame.doubts[0].answer.is_none());
        assert!(frame.doubts[0].error.as_deref().unwrap().contains("offline"));
        assert!(!frame.doubts[0].awaiting_response);
    }

    #[tokio::test(start_paused = true)]
    async fn unused_affordance_expires() {
        let (controller, _sink, _) = controller_with(CountingGenerator::new());
        let affordance = controller.capture_selection(selection("gravity")).await.unwrap();

        tokio::time::sleep(AFFORDANCE_TIMEOUT + Duration::from_millis(10)).await;

        assert!(controller.snapshot().await.affordance.is_none());
        assert!(controller.confirm_affordance(&affordance.id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_affordance_timer_does_not_remove_new_one() {
        let (controller, _sink, _) = controller_with(CountingGenerator::new());
        controller.capture_selection(selection("first")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        let second = controller.capture_selection(selection("second")).await.unwrap();

        // First timer would have fired at 5s; the second runs until 8s.
        tokio::time::sleep(Duration::from_secs(3)).await;
        let frame = controller.snapshot().await;
        assert_eq!(frame.affordance.as_ref().map(|a| a.id.clone()), Some(second.id.clone()));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(controller.snapshot().await.affordance.is_none());
    }

    #[tokio::test]
    async fn whitespace_selection_offers_nothing() {
        let (controller, sink, _) = controller_with(CountingGenerator::new());
        assert!(controller.capture_selection(selection(" \n\t ")).await.is_none());
        assert_eq!(sink.count(), 0);
    }

    #[tokio::test]
    async fn bounds_report_enables_connector_once() {
        let (controller, sink, _) = controller_with(CountingGenerator::new());
        let doubt = select_and_confirm(&controller, "gravity").await;
        assert!(controller.snapshot().await.doubts[0].connector.is_none());

        let bounds = Rect::new(340.0, 200.0, 600.0, 400.0);
        assert!(controller.report_popup_bounds(&doubt.id, bounds).await);
        let frames = sink.count();
        assert!(!controller.report_popup_bounds(&doubt.id, bounds).await);
        assert_eq!(sink.count(), frames);
        assert!(!controller.report_popup_bounds("missing", bounds).await);

        assert!(controller.snapshot().await.doubts[0].connector.is_some());
    }

    #[tokio::test]
    async fn viewport_drives_layout() {
        let (controller, _sink, _) = controller_with(CountingGenerator::new());
        controller.set_viewport(1024.0, 768.0).await;
        for text in ["a", "b", "c"] {
            select_and_confirm(&controller, text).await;
        }

        let frame = controller.snapshot().await;
        let max_top = 768.0 - 400.0 / 2.0 - 16.0;
        assert!(frame.doubts.iter().all(|d| d.placement.center.y <= max_top));
        assert_eq!(frame.doubts[2].placement.center.x, 512.0 + 64.0);

        controller.set_viewport(-1.0, 768.0).await;
        assert_eq!(controller.snapshot().await.viewport, Viewport::new(1024.0, 768.0));
    }

    #[tokio::test]
    async fn close_all_clears_everything() {
        let (controller, _sink, _) = controller_with(CountingGenerator::new());
        select_and_confirm(&controller, "a").await;
        select_and_confirm(&controller, "b").await;
        controller.capture_selection(selection("c")).await.unwrap();

        controller.close_all().await;
        let frame = controller.snapshot().await;
        assert!(frame.doubts.is_empty());
        assert!(frame.affordance.is_none());

        let next = select_and_confirm(&controller, "d").await;
        assert_eq!(next.stack_order, BASE_Z);
    }

    #[tokio::test]
    async fn independent_controllers_do_not_share_state() {
        let (left, _, _) = controller_with(CountingGenerator::new());
        let (right, _, _) = controller_with(CountingGenerator::new());
        select_and_confirm(&left, "only here").await;

        assert_eq!(left.snapshot().await.doubts.len(), 1);
        assert!(right.snapshot().await.doubts.is_empty());
    }
}
