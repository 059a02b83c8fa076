//! Render-on-demand frame scheduling.
//!
//! Nothing is drawn unless something changed. Camera changes and resizes call
//! [`FrameScheduler::request_frame_if_idle`], which asks the host for at most
//! one frame callback at a time. The frame callback clears the pending state
//! before doing any work, so a change raised while a frame is being produced
//! schedules a follow-up frame instead of being lost.

use log::{debug, info, warn};

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::input::PointerEvent;
use crate::render::RenderError;
use crate::scene::Scene;

/// Whether a frame callback is currently scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    #[default]
    Idle,
    Pending,
}

/// Host side of the scheduler: the "call me before the next repaint" primitive.
pub trait FrameHost {
    /// Schedules exactly one future call of [`FrameScheduler::frame`].
    fn request_frame(&mut self);
}

/// Output surface plus the renderer drawing into it.
pub trait FrameRenderer {
    type Error;

    /// Size the surface is displayed at.
    fn display_size(&self) -> (u32, u32);

    /// Size of the drawable backing the surface.
    fn drawable_size(&self) -> (u32, u32);

    fn set_size(&mut self, width: u32, height: u32);

    /// Reapplies the current surface configuration after the surface was lost.
    fn reconfigure(&mut self);

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), Self::Error>;
}

/// Owns the scene, camera, controls and renderer, and decides when to redraw.
pub struct FrameScheduler<H, R> {
    state: FrameState,
    host: H,
    renderer: R,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    frames: u64,
}

impl<H, R> FrameScheduler<H, R>
where
    H: FrameHost,
    R: FrameRenderer,
{
    pub fn new(
        host: H,
        renderer: R,
        scene: Scene,
        camera: PerspectiveCamera,
        controls: OrbitControls,
    ) -> Self {
        Self {
            state: FrameState::Idle,
            host,
            renderer,
            scene,
            camera,
            controls,
            frames: 0,
        }
    }

    /// Requests the first frame.
    pub fn start(&mut self) {
        info!(
            "starting render-on-demand loop ({} meshes)",
            self.scene.meshes.len()
        );
        self.request_frame_if_idle();
    }

    pub fn request_frame_if_idle(&mut self) {
        if self.state == FrameState::Idle {
            self.state = FrameState::Pending;
            self.host.request_frame();
        }
    }

    /// Forwards pointer input to the orbit controls and redraws on change.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let viewport = self.renderer.display_size();
        if self.controls.handle_pointer(event, &self.camera, viewport)
            && self.controls.update(&mut self.camera)
        {
            self.request_frame_if_idle();
        }
    }

    pub fn handle_resize(&mut self) {
        self.request_frame_if_idle();
    }

    /// The frame callback. Call once for every [`FrameHost::request_frame`].
    pub fn frame(&mut self) -> Result<(), R::Error> {
        self.state = FrameState::Idle;
        self.frames += 1;

        if self.controls.enable_damping && self.controls.update(&mut self.camera) {
            self.request_frame_if_idle();
        }

        if self.resize_to_display_size() {
            let (width, height) = self.renderer.display_size();
            self.camera.aspect = width as f32 / height as f32;
            self.camera.update_projection_matrix();
            debug!("resized to {width}x{height}");
        }

        debug!("frame {}", self.frames);
        self.renderer.render(&self.scene, &self.camera)
    }

    fn resize_to_display_size(&mut self) -> bool {
        let (width, height) = self.renderer.display_size();
        if width == 0 || height == 0 {
            return false;
        }
        let needs_resize = self.renderer.drawable_size() != (width, height);
        if needs_resize {
            self.renderer.set_size(width, height);
        }
        needs_resize
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Number of frame callbacks run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H, R> FrameScheduler<H, R>
where
    H: FrameHost,
    R: FrameRenderer<Error = RenderError>,
{
    /// Handles a failed frame.
    ///
    /// Recoverable errors schedule another frame, after reconfiguring the
    /// surface if it was lost. Anything else is handed back to the caller.
    pub fn recover(&mut self, err: RenderError) -> Result<(), RenderError> {
        if !err.is_recoverable() {
            return Err(err);
        }
        if err == RenderError::SurfaceLost {
            info!("surface lost; reconfiguring");
            self.renderer.reconfigure();
        } else {
            warn!("{err}; retrying next frame");
        }
        self.request_frame_if_idle();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::config::{ControlsConfig, ViewerConfig};
    use crate::input::MouseButton;
    use crate::scene::build_cube_grid;

    #[derive(Default)]
    struct FakeHost {
        requested: usize,
    }

    impl FrameHost for FakeHost {
        fn request_frame(&mut self) {
            self.requested += 1;
        }
    }

    struct FakeRenderer {
        display: (u32, u32),
        drawable: (u32, u32),
        drawn_aspects: Vec<f32>,
        fail_next: Option<RenderError>,
        reconfigured: usize,
    }

    impl FrameRenderer for FakeRenderer {
        type Error = RenderError;

        fn display_size(&self) -> (u32, u32) {
            self.display
        }

        fn drawable_size(&self) -> (u32, u32) {
            self.drawable
        }

        fn set_size(&mut self, width: u32, height: u32) {
            self.drawable = (width, height);
        }

        fn reconfigure(&mut self) {
            self.reconfigured += 1;
        }

        fn render(&mut self, _scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
            if let Some(err) = self.fail_next.take() {
                return Err(err);
            }
            self.drawn_aspects.push(camera.aspect);
            Ok(())
        }
    }

    /// Scheduler plus a model of the host's frame queue.
    struct Harness {
        scheduler: FrameScheduler<FakeHost, FakeRenderer>,
        delivered: usize,
    }

    impl Harness {
        fn new(controls: ControlsConfig) -> Self {
            let config = ViewerConfig {
                controls,
                ..ViewerConfig::default()
            };
            let camera = PerspectiveCamera::from_config(&config.camera);
            let controls = OrbitControls::new(&camera, &config.controls);
            let renderer = FakeRenderer {
                display: (800, 400),
                drawable: (800, 400),
                drawn_aspects: Vec::new(),
                fail_next: None,
                reconfigured: 0,
            };
            Self {
                scheduler: FrameScheduler::new(
                    FakeHost::default(),
                    renderer,
                    build_cube_grid(&config),
                    camera,
                    controls,
                ),
                delivered: 0,
            }
        }

        fn outstanding(&self) -> usize {
            self.scheduler.host().requested - self.delivered
        }

        /// Fires every frame callback the host currently owes.
        fn pump_once(&mut self) -> usize {
            let owed = self.outstanding();
            for _ in 0..owed {
                self.delivered += 1;
                self.scheduler.frame().unwrap();
            }
            owed
        }

        fn pump_until_idle(&mut self) -> usize {
            let mut total = 0;
            loop {
                let ran = self.pump_once();
                if ran == 0 {
                    return total;
                }
                total += ran;
                assert!(total < 10_000, "render loop never went idle");
            }
        }

        /// Requests a frame whose draw fails with `err` and runs it.
        fn failed_frame(&mut self, err: RenderError) -> RenderError {
            self.scheduler.renderer_mut().fail_next = Some(err);
            self.scheduler.request_frame_if_idle();
            assert_eq!(self.outstanding(), 1);
            self.delivered += 1;
            self.scheduler.frame().unwrap_err()
        }

        fn rotate(&mut self, dx: f32) {
            let scheduler = &mut self.scheduler;
            scheduler.handle_pointer(PointerEvent::Moved(Vec2::new(100.0, 100.0)));
            scheduler.handle_pointer(PointerEvent::Pressed(MouseButton::LEFT));
            scheduler.handle_pointer(PointerEvent::Moved(Vec2::new(100.0 + dx, 100.0)));
            scheduler.handle_pointer(PointerEvent::Released(MouseButton::LEFT));
        }
    }

    #[test]
    fn start_produces_exactly_one_frame() {
        let mut harness = Harness::new(ControlsConfig::default());
        assert_eq!(harness.scheduler.state(), FrameState::Idle);
        harness.scheduler.start();
        assert_eq!(harness.scheduler.state(), FrameState::Pending);
        assert_eq!(harness.pump_until_idle(), 1);
        assert_eq!(harness.scheduler.renderer().drawn_aspects.len(), 1);
        assert_eq!(harness.scheduler.state(), FrameState::Idle);
    }

    #[test]
    fn bursts_of_events_coalesce_into_one_frame() {
        let mut harness = Harness::new(ControlsConfig::default());
        harness.scheduler.start();
        harness.pump_until_idle();

        for step in 0..5 {
            harness.rotate(10.0 + step as f32);
            harness.scheduler.handle_resize();
        }
        assert_eq!(harness.outstanding(), 1);
        assert_eq!(harness.pump_until_idle(), 1);
        assert_eq!(harness.scheduler.frames(), 2);
    }

    #[test]
    fn repeated_requests_are_idempotent_while_pending() {
        let mut harness = Harness::new(ControlsConfig::default());
        for _ in 0..10 {
            harness.scheduler.request_frame_if_idle();
        }
        assert_eq!(harness.scheduler.host().requested, 1);
        assert_eq!(harness.scheduler.state(), FrameState::Pending);
    }

    #[test]
    fn input_without_camera_change_does_not_redraw() {
        let mut harness = Harness::new(ControlsConfig::default());
        harness.scheduler.start();
        harness.pump_until_idle();
        harness
            .scheduler
            .handle_pointer(PointerEvent::Moved(Vec2::new(5.0, 5.0)));
        harness
            .scheduler
            .handle_pointer(PointerEvent::Pressed(MouseButton::LEFT));
        assert_eq!(harness.outstanding(), 0);
        assert_eq!(harness.scheduler.state(), FrameState::Idle);
    }

    #[test]
    fn change_raised_during_a_frame_schedules_one_more() {
        let mut harness = Harness::new(ControlsConfig {
            damping: true,
            ..ControlsConfig::default()
        });
        harness.scheduler.start();
        harness.pump_until_idle();

        harness.rotate(200.0);
        assert_eq!(harness.outstanding(), 1);

        // the damped controls move the camera inside the frame callback
        harness.pump_once();
        assert_eq!(harness.outstanding(), 1);
        assert_eq!(harness.scheduler.state(), FrameState::Pending);

        let settled = harness.pump_until_idle();
        assert!(settled > 10);
        assert_eq!(harness.scheduler.state(), FrameState::Idle);
        assert_eq!(harness.outstanding(), 0);
    }

    #[test]
    fn resize_updates_aspect_before_drawing() {
        let mut harness = Harness::new(ControlsConfig::default());
        harness.scheduler.start();
        harness.pump_until_idle();
        assert_eq!(harness.scheduler.renderer().drawn_aspects, vec![2.0]);

        harness.scheduler.renderer_mut().display = (600, 600);
        harness.scheduler.handle_resize();
        harness.pump_until_idle();

        assert_eq!(harness.scheduler.renderer().drawable, (600, 600));
        assert_eq!(harness.scheduler.renderer().drawn_aspects, vec![2.0, 1.0]);
        assert_eq!(harness.scheduler.camera().aspect, 1.0);
    }

    #[test]
    fn matching_sizes_leave_aspect_untouched() {
        let mut harness = Harness::new(ControlsConfig::default());
        harness.scheduler.renderer_mut().display = (1000, 250);
        harness.scheduler.renderer_mut().drawable = (1000, 250);
        harness.scheduler.start();
        harness.pump_until_idle();
        // the configured aspect survives even though 1000x250 would be 4.0
        assert_eq!(harness.scheduler.camera().aspect, 2.0);
    }

    #[test]
    fn zero_sized_display_skips_resize() {
        let mut harness = Harness::new(ControlsConfig::default());
        harness.scheduler.renderer_mut().display = (0, 0);
        harness.scheduler.handle_resize();
        harness.pump_until_idle();
        assert_eq!(harness.scheduler.renderer().drawable, (800, 400));
        assert_eq!(harness.scheduler.camera().aspect, 2.0);
    }

    #[test]
    fn orbit_changes_camera_seen_by_renderer() {
        let mut harness = Harness::new(ControlsConfig::default());
        harness.scheduler.start();
        harness.pump_until_idle();
        harness.rotate(100.0);
        harness.pump_until_idle();
        let position = harness.scheduler.camera().position;
        assert!((position - Vec3::new(0.0, 0.0, 4.0)).length() > 1.0);
        assert!((position.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn lost_surface_is_reconfigured_and_redrawn() {
        let mut harness = Harness::new(ControlsConfig::default());
        harness.scheduler.start();
        harness.pump_until_idle();

        let err = harness.failed_frame(RenderError::SurfaceLost);
        assert_eq!(harness.scheduler.state(), FrameState::Idle);
        harness.scheduler.recover(err).unwrap();

        assert_eq!(harness.scheduler.renderer().reconfigured, 1);
        assert_eq!(harness.scheduler.state(), FrameState::Pending);
        assert_eq!(harness.outstanding(), 1);
        assert_eq!(harness.pump_until_idle(), 1);
        assert_eq!(harness.scheduler.renderer().drawn_aspects.len(), 2);
    }

    #[test]
    fn timeout_retries_without_reconfiguring() {
        let mut harness = Harness::new(ControlsConfig::default());
        harness.scheduler.start();
        harness.pump_until_idle();

        let err = harness.failed_frame(RenderError::Timeout);
        harness.scheduler.recover(err).unwrap();

        assert_eq!(harness.scheduler.renderer().reconfigured, 0);
        assert_eq!(harness.outstanding(), 1);
        assert_eq!(harness.pump_until_idle(), 1);
    }

    #[test]
    fn fatal_errors_are_returned_and_stop_redrawing() {
        for fatal in [RenderError::OutOfMemory, RenderError::Other] {
            let mut harness = Harness::new(ControlsConfig::default());
            harness.scheduler.start();
            harness.pump_until_idle();

            let err = harness.failed_frame(fatal);
            assert_eq!(harness.scheduler.recover(err), Err(fatal));
            assert_eq!(harness.scheduler.renderer().reconfigured, 0);
            assert_eq!(harness.scheduler.state(), FrameState::Idle);
            assert_eq!(harness.outstanding(), 0);
        }
    }
}
