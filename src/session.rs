// session.rs - one statistics screen: pager, tilt, gestures and the camera, all on the UI thread
//
// Every camera write funnels through `apply_pose`, which recomputes the pose
// from the latest scroll progress and tilt offset. Nothing touches the camera
// until the loader has handed over a scene.

use std::time::Instant;

use crate::config::{Preferences, ScreenConfig};
use crate::error::{LoadError, SceneError};
use crate::gesture::{DragMode, GestureCommand, GestureCoordinator};
use crate::loader::{LoadOutcome, ModelLoader};
use crate::model::{ModelIdentity, UserProfile};
use crate::motion::PerturbationSource;
use crate::pager::{PagedScroll, PagerUpdate};
use crate::pose::{compute_pose, CameraPose, ScrollProgress};
use crate::progress::{PagingState, ScrollTracker};
use crate::render::CameraRig;
use crate::routes::{route_for_row, DetailRoute};
use crate::scene::{Node, Scene, SceneBindings};
use crate::tween::{FadeEnvelope, LabelAnimation, NumberTween};

/// Page the edge tap and the edge-swipe snap return to.
const LIFTS_PAGE: usize = 2;

struct LoadedScene<M> {
    scene: Scene<M>,
    bindings: SceneBindings,
}

/// First-appearance animation of the body-fat cell.
#[derive(Debug, Clone)]
pub struct IntroAnimation {
    pub label: LabelAnimation,
    pub ring: NumberTween,
    pub started: Instant,
}

impl IntroAnimation {
    pub fn label_text(&self, now: Instant) -> String {
        self.label.text_at(now.saturating_duration_since(self.started))
    }

    pub fn ring_progress(&self, now: Instant) -> f64 {
        self.ring.value_at(now.saturating_duration_since(self.started))
    }
}

/// Snapshot for drawing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub progress: ScrollProgress,
    pub page: usize,
    pub paging: PagingState,
    pub camera: Option<CameraPose>,
    pub edge_hint_alpha: Option<f32>,
}

pub struct StatisticsSession<M> {
    config: ScreenConfig,
    prefs: Preferences,
    view_width: f32,
    pager: PagedScroll,
    tracker: ScrollTracker,
    motion: PerturbationSource,
    motion_enabled: bool,
    gestures: GestureCoordinator,
    rig: CameraRig,
    loader: Option<ModelLoader<M>>,
    scene: Option<LoadedScene<M>>,
    displayed_model: Option<ModelIdentity>,
    /// Latest identity handed to the loader; the last request wins.
    requested_model: Option<ModelIdentity>,
    /// Set once the user flips the tilt switch; the stored preference then
    /// no longer applies at hand-off.
    motion_toggled: bool,
    edge_hint_started: Option<Instant>,
    intro: Option<IntroAnimation>,
    intro_played: bool,
}

impl<M: Send + Sync + 'static> StatisticsSession<M> {
    pub fn new(config: ScreenConfig, prefs: Preferences, view_width: f32) -> Self {
        let mut gestures = GestureCoordinator::new(view_width * config.edge_swipe_fraction);
        gestures.release_velocity_threshold = config.release_velocity_threshold;
        gestures.snap_back_progress = config.snap_back_progress;
        gestures.rotation_per_view_width = config.rotation_per_view_width;

        Self {
            pager: PagedScroll::new(view_width, config.page_count, config.scroll_animation()),
            tracker: ScrollTracker::new(),
            motion: PerturbationSource::new(
                config.max_horizontal_tilt_deg,
                config.max_vertical_tilt_deg,
            ),
            motion_enabled: false,
            gestures,
            rig: CameraRig::new(config.pose_transition()),
            loader: None,
            scene: None,
            displayed_model: None,
            requested_model: None,
            motion_toggled: false,
            edge_hint_started: None,
            intro: None,
            intro_played: false,
            view_width,
            config,
            prefs,
        }
    }

    pub fn with_loader(mut self, loader: ModelLoader<M>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn pager(&self) -> &PagedScroll {
        &self.pager
    }

    pub fn progress(&self) -> ScrollProgress {
        self.tracker.progress()
    }

    pub fn paging(&self) -> PagingState {
        self.tracker.paging()
    }

    pub fn motion_enabled(&self) -> bool {
        self.motion_enabled
    }

    pub fn is_scene_ready(&self) -> bool {
        self.scene.is_some()
    }

    pub fn scene(&self) -> Option<&Scene<M>> {
        self.scene.as_ref().map(|s| &s.scene)
    }

    /// Key of the avatar currently on screen.
    pub fn current_model_identity(&self) -> Option<String> {
        self.displayed_model.map(|id| id.key())
    }

    pub fn focused_model_yaw(&self) -> Option<f32> {
        self.scene
            .as_ref()
            .map(|s| s.scene.node(s.bindings.focus).transform.euler.y)
    }

    pub fn resize(&mut self, view_width: f32, now: Instant) {
        if view_width <= 0.0 {
            return;
        }
        self.view_width = view_width;
        self.gestures.edge_threshold = view_width * self.config.edge_swipe_fraction;
        let update = self.pager.set_page_width(view_width);
        self.handle_pager(update, now);
    }

    // ---- loading ----

    pub fn start_loading(&mut self, profile: &UserProfile) -> Result<(), LoadError> {
        let identity = ModelIdentity::for_profile(profile);
        let loader = self.loader.as_ref().ok_or(LoadError::Disconnected)?;
        loader.request_initial(identity)?;
        self.requested_model = Some(identity);
        Ok(())
    }

    /// Returns `false` when the variant is already the latest one requested
    /// (displayed or still in flight).
    pub fn reload_model(&mut self, profile: &UserProfile) -> Result<bool, LoadError> {
        let identity = ModelIdentity::for_profile(profile);
        if self.requested_model == Some(identity) {
            log::debug!("model {identity} already requested");
            return Ok(false);
        }
        let loader = self.loader.as_ref().ok_or(LoadError::Disconnected)?;
        loader.request_reload(identity)?;
        self.requested_model = Some(identity);
        Ok(true)
    }

    /// Drains finished loads. Errors from individual loads are returned after
    /// the rest of the queue has been handled.
    pub fn poll_loader(&mut self, now: Instant) -> Result<(), LoadError> {
        let mut first_error = None;
        loop {
            let outcome = match &self.loader {
                Some(loader) => loader.try_recv()?,
                None => return Ok(()),
            };
            let Some(outcome) = outcome else {
                break;
            };
            if let Err(e) = self.handle_load_outcome(outcome, now) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn handle_load_outcome(
        &mut self,
        outcome: LoadOutcome<M>,
        now: Instant,
    ) -> Result<(), LoadError> {
        match outcome {
            LoadOutcome::SceneReady {
                identity,
                scene,
                model,
            } => Ok(self.attach_scene(scene, identity, model, now)?),
            LoadOutcome::ModelReady { identity, model } => {
                Ok(self.replace_model(identity, model)?)
            }
            LoadOutcome::Failed { identity, error } => {
                if self.requested_model == Some(identity) {
                    self.requested_model = self.displayed_model;
                }
                Err(error)
            }
        }
    }

    /// Hand-off from the loader: bind nodes, attach the avatar, place the camera.
    pub fn attach_scene(
        &mut self,
        mut scene: Scene<M>,
        identity: ModelIdentity,
        model: Node<M>,
        now: Instant,
    ) -> Result<(), SceneError> {
        let bindings = scene.bind()?;
        scene.replace_model(&bindings, model)?;
        log::info!("scene ready with model {identity}");

        self.scene = Some(LoadedScene { scene, bindings });
        self.displayed_model = Some(identity);
        self.requested_model.get_or_insert(identity);
        self.reset_camera(now);
        if !self.motion_toggled {
            self.motion_enabled = self.prefs.perspective_enabled;
        }
        Ok(())
    }

    pub fn replace_model(&mut self, identity: ModelIdentity, model: Node<M>) -> Result<(), SceneError> {
        let Some(loaded) = self.scene.as_mut() else {
            log::warn!("model {identity} arrived before the scene, dropping it");
            return Err(SceneError::NotReady);
        };
        match loaded.scene.replace_model(&loaded.bindings, model) {
            Ok(()) => {
                log::info!("displaying model {identity}");
                self.displayed_model = Some(identity);
                self.requested_model.get_or_insert(identity);
                Ok(())
            }
            Err(e) => {
                log::error!("scene graph corrupted while swapping to {identity}: {e}");
                self.displayed_model = None;
                self.requested_model = None;
                if let Some(loader) = &self.loader {
                    if let Err(send) = loader.forget_current() {
                        log::warn!("could not reset the model loader: {send}");
                    }
                }
                Err(e)
            }
        }
    }

    // ---- camera ----

    fn apply_pose(&mut self, animated: bool, now: Instant) {
        if self.scene.is_none() {
            return;
        }
        let pose = compute_pose(self.tracker.progress(), self.motion.offset());
        self.rig.apply(pose, animated, now);
    }

    /// Immediate re-application, e.g. right after load.
    pub fn reset_camera(&mut self, now: Instant) {
        self.apply_pose(false, now);
    }

    pub fn on_motion(&mut self, viewer_offset_horizontal: f32, viewer_offset_vertical: f32, now: Instant) {
        if !self.motion_enabled || self.scene.is_none() {
            return;
        }
        self.motion
            .update(viewer_offset_horizontal, viewer_offset_vertical);
        self.apply_pose(true, now);
    }

    pub fn set_motion_enabled(&mut self, enabled: bool, now: Instant) {
        self.motion_toggled = true;
        if self.motion_enabled == enabled {
            return;
        }
        self.motion_enabled = enabled;
        if !enabled {
            self.motion.reset();
            self.reset_camera(now);
        }
    }

    // ---- paging ----

    fn handle_pager(&mut self, update: PagerUpdate, now: Instant) {
        if let Some(offset_x) = update.offset_changed {
            self.tracker
                .on_scroll_changed(offset_x, self.pager.page_width());
            self.apply_pose(true, now);
        }
        if update.settled {
            let outcome = self.tracker.settle();
            self.pager.user_interaction_enabled = outcome.user_interaction_enabled;
            if outcome.show_edge_indicator {
                self.edge_hint_started = Some(now);
            }
        }
    }

    fn set_user_interaction(&mut self, enabled: bool) {
        self.pager.user_interaction_enabled = enabled;
        self.tracker.set_user_interaction_enabled(enabled);
    }

    pub fn begin_scroll_drag(&mut self) -> bool {
        self.pager.begin_drag()
    }

    pub fn scroll_drag_by(&mut self, dx: f32, now: Instant) {
        let update = self.pager.drag_by(dx);
        self.handle_pager(update, now);
    }

    pub fn end_scroll_drag(&mut self, velocity_x: f32, now: Instant) {
        let update = self.pager.end_drag(velocity_x, now);
        self.handle_pager(update, now);
    }

    pub fn step_page(&mut self, direction: i32, now: Instant) {
        let update = self.pager.step_page(direction, now);
        self.handle_pager(update, now);
    }

    pub fn scroll_to_page(&mut self, page: usize, animated: bool, now: Instant) {
        let update = self.pager.scroll_to_page(page, animated, now);
        self.handle_pager(update, now);
    }

    // ---- scene view gestures (only reachable while paging is locked) ----

    pub fn scene_drag_began(&mut self, touch_x: f32) -> Option<DragMode> {
        if self.pager.user_interaction_enabled {
            return None;
        }
        let yaw = self.focused_model_yaw()?;
        Some(self.gestures.drag_began(touch_x, yaw))
    }

    pub fn scene_drag_moved(&mut self, touch_x: f32, now: Instant) {
        let command =
            self.gestures
                .drag_moved(touch_x, self.pager.page_width(), self.view_width);
        self.apply_gesture(command, now);
    }

    pub fn scene_drag_ended(&mut self, velocity_x: f32, now: Instant) {
        let command = self.gestures.drag_ended(
            velocity_x,
            self.tracker.progress().value(),
            self.pager.page_width(),
        );
        self.apply_gesture(command, now);
    }

    pub fn scene_drag_cancelled(&mut self, now: Instant) {
        let command = self.gestures.drag_cancelled(
            0.0,
            self.tracker.progress().value(),
            self.pager.page_width(),
        );
        self.apply_gesture(command, now);
    }

    fn apply_gesture(&mut self, command: GestureCommand, now: Instant) {
        match command {
            GestureCommand::None => {}
            GestureCommand::SetScrollOffset { offset_x } => {
                let update = self.pager.set_offset(offset_x, false, now);
                self.handle_pager(update, now);
            }
            GestureCommand::SnapToPage {
                offset_x,
                user_interaction_enabled,
                ..
            } => {
                let update = self.pager.set_offset(offset_x, true, now);
                self.set_user_interaction(user_interaction_enabled);
                self.handle_pager(update, now);
            }
            GestureCommand::RotateModel { yaw } => {
                if let Some(loaded) = self.scene.as_mut() {
                    loaded.scene.node_mut(loaded.bindings.focus).transform.euler.y = yaw;
                }
            }
        }
    }

    /// A tap in the left band while locked returns to the lifts page.
    pub fn scene_tapped(&mut self, touch_x: f32, now: Instant) -> bool {
        if self.pager.user_interaction_enabled || self.gestures.is_active() {
            return false;
        }
        if touch_x > self.view_width * self.config.edge_tap_fraction {
            return false;
        }
        self.set_user_interaction(true);
        self.scroll_to_page(LIFTS_PAGE, true, now);
        true
    }

    // ---- page content ----

    pub fn on_row_activated(
        &self,
        page: usize,
        section: usize,
        row: usize,
        tag: i32,
    ) -> Option<DetailRoute> {
        let route = route_for_row(page, section, row, tag);
        log::debug!("row activated: page={page} section={section} row={row} tag={tag} -> {route:?}");
        route
    }

    /// Starts the body-fat counter once per screen; later calls return `None`.
    pub fn play_intro_if_needed(
        &mut self,
        body_fat_percentage: Option<f64>,
        now: Instant,
    ) -> Option<&IntroAnimation> {
        if self.intro_played {
            return None;
        }
        let bf = body_fat_percentage?;
        self.intro_played = true;

        let duration = self.config.intro_label_duration();
        self.intro = Some(IntroAnimation {
            label: LabelAnimation::new(NumberTween::new((bf - 10.0).max(0.0), bf, duration), "%"),
            ring: NumberTween::new(0.0, (bf / 50.0).min(1.0), duration),
            started: now,
        });
        self.intro.as_ref()
    }

    pub fn intro(&self) -> Option<&IntroAnimation> {
        self.intro.as_ref()
    }

    // ---- per frame ----

    pub fn tick(&mut self, now: Instant) -> FrameState {
        let update = self.pager.tick(now);
        self.handle_pager(update, now);

        let mut camera = None;
        if let Some(loaded) = self.scene.as_mut() {
            self.rig
                .present(now, loaded.scene.node_mut(loaded.bindings.camera));
            camera = self.rig.sample(now);
        }

        let hint = FadeEnvelope::EDGE_HINT;
        let edge_hint_alpha = match self.edge_hint_started {
            Some(started) => {
                let elapsed = now.saturating_duration_since(started);
                if hint.is_finished(elapsed) {
                    self.edge_hint_started = None;
                    None
                } else {
                    Some(hint.alpha_at(elapsed))
                }
            }
            None => None,
        };

        let progress = self.tracker.progress();
        FrameState {
            progress,
            page: progress.page_index(self.pager.page_count()),
            paging: self.tracker.paging(),
            camera,
            edge_hint_alpha,
        }
    }

    /// Something is still moving; keep redrawing.
    pub fn is_animating(&self) -> bool {
        self.pager.is_animating() || self.rig.is_transitioning() || self.edge_hint_started.is_some()
    }
}
