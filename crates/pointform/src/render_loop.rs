//! Throttled, cancellable render loop.
//!
//! A [`RenderLoop`] is `Idle` until [`RenderLoop::start`], `Running` while it
//! self-schedules one tick per cadence interval, and `Stopped` for good after
//! [`RenderLoop::stop`]. Each tick advances motions, builds the scene graph
//! and issues exactly one draw call, in that order.

use crate::camera::{Camera, OrbitBounds, Viewport};
use crate::error::RenderError;
use crate::scene::Scene;
use crate::scheduler::{Scheduler, TimerHandle, TimerQueue};
use crate::surface::RenderSurface;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    Running,
    Stopped,
}

impl LoopPhase {
    pub fn name(self) -> &'static str {
        match self {
            LoopPhase::Idle => "idle",
            LoopPhase::Running => "running",
            LoopPhase::Stopped => "stopped",
        }
    }
}

/// Target frame interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    interval: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self::from_fps(30)
    }
}

impl Cadence {
    /// `fps` of zero is treated as one frame per second.
    pub fn from_fps(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
        }
    }

    pub fn from_interval(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Bookkeeping for one loop. At most one tick is pending at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopState {
    pub phase: LoopPhase,
    pub started_at: Option<Duration>,
    pub last_frame_time: Option<Duration>,
    pub target_interval: Duration,
    pub pending: Option<TimerHandle>,
    pub listening_resize: bool,
    pub frames_drawn: u64,
    pub failed_draws: u64,
}

impl LoopState {
    fn new(cadence: Cadence) -> Self {
        Self {
            phase: LoopPhase::Idle,
            started_at: None,
            last_frame_time: None,
            target_interval: cadence.interval(),
            pending: None,
            listening_resize: false,
            frames_drawn: 0,
            failed_draws: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Drawn,
    /// The draw failed; the next tick is already scheduled.
    DrawFailed,
    /// The timer was cancelled or superseded, or the loop is not running.
    Stale,
}

pub struct RenderLoop<R: RenderSurface, S: Scheduler = TimerQueue> {
    surface: R,
    scheduler: S,
    handle: Option<R::Handle>,
    scene: Scene,
    camera: Camera,
    orbit: OrbitBounds,
    viewport: Viewport,
    state: LoopState,
}

impl<R: RenderSurface> RenderLoop<R, TimerQueue> {
    pub fn new(surface: R, scene: Scene, camera: Camera, cadence: Cadence) -> Self {
        Self::with_scheduler(surface, TimerQueue::new(), scene, camera, cadence)
    }
}

impl<R: RenderSurface, S: Scheduler> RenderLoop<R, S> {
    pub fn with_scheduler(surface: R, scheduler: S, scene: Scene, camera: Camera, cadence: Cadence) -> Self {
        Self {
            surface,
            scheduler,
            handle: None,
            scene,
            camera,
            orbit: OrbitBounds::default(),
            viewport: Viewport::new(0, 0),
            state: LoopState::new(cadence),
        }
    }

    pub fn with_orbit(mut self, orbit: OrbitBounds) -> Self {
        self.orbit = orbit;
        self
    }

    pub fn phase(&self) -> LoopPhase {
        self.state.phase
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn orbit(&self) -> &OrbitBounds {
        &self.orbit
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    /// When the pending tick is due, if the loop is running.
    pub fn next_deadline(&self) -> Option<Duration> {
        match self.state.phase {
            LoopPhase::Running => self.scheduler.next_deadline(),
            _ => None,
        }
    }

    /// Acquires the surface and schedules the first tick.
    ///
    /// A surface failure is fatal: the loop ends up `Stopped` and the error is
    /// returned.
    pub fn start(&mut self, viewport: Viewport, now: Duration) -> Result<(), RenderError> {
        if self.state.phase != LoopPhase::Idle {
            return Err(RenderError::InvalidTransition {
                action: "start",
                phase: self.state.phase.name(),
            });
        }

        let handle = match self.surface.create_surface(viewport) {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("render loop failed to start: {e}");
                self.state.phase = LoopPhase::Stopped;
                return Err(e);
            }
        };
        self.handle = Some(handle);
        self.viewport = viewport;
        self.camera.set_viewport(viewport);

        self.state.phase = LoopPhase::Running;
        self.state.listening_resize = true;
        self.state.started_at = Some(now);
        self.state.last_frame_time = Some(now);
        self.state.pending = Some(self.scheduler.schedule(now, self.state.target_interval));

        log::info!(
            "render loop started ({}x{}, every {:?})",
            viewport.width,
            viewport.height,
            self.state.target_interval
        );
        Ok(())
    }

    /// Fires every timer due at `now`. Returns how many frames were drawn.
    pub fn pump(&mut self, now: Duration) -> usize {
        let mut drawn = 0;
        for timer in self.scheduler.take_due(now) {
            if self.on_timer(timer, now) == TickOutcome::Drawn {
                drawn += 1;
            }
        }
        drawn
    }

    /// Runs one tick if `timer` is the pending one.
    pub fn on_timer(&mut self, timer: TimerHandle, now: Duration) -> TickOutcome {
        if self.state.phase != LoopPhase::Running || self.state.pending != Some(timer) {
            log::trace!("ignoring stale timer {}", timer.generation());
            return TickOutcome::Stale;
        }
        self.state.pending = None;

        let last = self.state.last_frame_time.unwrap_or(now);
        let started = self.state.started_at.unwrap_or(now);
        let delta = now.saturating_sub(last).as_secs_f32();
        let elapsed = now.saturating_sub(started).as_secs_f32();
        self.scene.advance(delta, elapsed);
        self.state.last_frame_time = Some(now);

        let outcome = match self.draw() {
            Ok(()) => {
                self.state.frames_drawn += 1;
                TickOutcome::Drawn
            }
            Err(e) => {
                self.state.failed_draws += 1;
                log::warn!("skipping frame: {e}");
                TickOutcome::DrawFailed
            }
        };

        self.state.pending = Some(self.scheduler.schedule(now, self.state.target_interval));
        outcome
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(RenderError::TransientDraw("no surface".into()));
        };
        let graph = self.scene.graph(&self.camera);
        self.surface.draw_frame(handle, &graph, &self.camera)
    }

    /// Applies a new container size. Only a running loop with a non-empty
    /// container reacts; the camera is updated before the next draw.
    pub fn resize(&mut self, viewport: Viewport) {
        if !self.state.listening_resize {
            log::debug!("resize ignored while {}", self.state.phase.name());
            return;
        }
        if viewport.is_empty() {
            log::debug!("resize to empty container ignored");
            return;
        }
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        self.surface
            .resize_surface(handle, viewport.width, viewport.height);
        self.camera.set_viewport(viewport);
        self.viewport = viewport;
        log::debug!("resized to {}x{}", viewport.width, viewport.height);
    }

    /// Cancels the pending tick and releases the surface. Idempotent; a loop
    /// that never started goes straight to `Stopped`.
    pub fn stop(&mut self) {
        match self.state.phase {
            LoopPhase::Stopped => return,
            LoopPhase::Idle => {}
            LoopPhase::Running => {
                if let Some(timer) = self.state.pending.take() {
                    self.scheduler.cancel(timer);
                }
                self.state.listening_resize = false;
                if let Some(handle) = self.handle.take() {
                    self.surface.destroy_surface(handle);
                }
                log::info!(
                    "render loop stopped after {} frames ({} failed)",
                    self.state.frames_drawn,
                    self.state.failed_draws
                );
            }
        }
        self.state.phase = LoopPhase::Stopped;
    }
}

impl<R: RenderSurface, S: Scheduler> Drop for RenderLoop<R, S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::GeometryBuffer;
    use crate::point_cloud::{PointCloud, PointMaterial};
    use crate::scene::{ObjectId, SceneGraph};
    use crate::shape::{generate, ShapeSpec};
    use crate::transform::Motion;
    use glam::Vec3;
    use rand::{rngs::StdRng, SeedableRng};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Create(Viewport),
        Resize(u32, u32),
        Draw { aspect: f32, items: usize },
        Destroy,
    }

    /// Records every call; can be told to fail.
    #[derive(Default)]
    pub(crate) struct FakeSurface {
        pub calls: Rc<RefCell<Vec<Call>>>,
        pub fail_create: bool,
        pub fail_draws: usize,
    }

    impl FakeSurface {
        pub fn draws(&self) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|c| matches!(c, Call::Draw { .. }))
                .count()
        }
    }

    impl RenderSurface for FakeSurface {
        type Handle = ();

        fn create_surface(&mut self, viewport: Viewport) -> Result<(), RenderError> {
            if self.fail_create {
                return Err(RenderError::DeviceInit("no adapter".into()));
            }
            self.calls.borrow_mut().push(Call::Create(viewport));
            Ok(())
        }

        fn resize_surface(&mut self, _: &mut (), width: u32, height: u32) {
            self.calls.borrow_mut().push(Call::Resize(width, height));
        }

        fn draw_frame(&mut self, _: &mut (), graph: &SceneGraph<'_>, camera: &Camera) -> Result<(), RenderError> {
            if self.fail_draws > 0 {
                self.fail_draws -= 1;
                return Err(RenderError::TransientDraw("surface lost".into()));
            }
            self.calls.borrow_mut().push(Call::Draw {
                aspect: camera.aspect,
                items: graph.draw_list().len(),
            });
            Ok(())
        }

        fn destroy_surface(&mut self, _: ()) {
            self.calls.borrow_mut().push(Call::Destroy);
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    const RATE: f32 = 0.15;

    fn spinning_scene(count: usize, seed: u64) -> (Scene, ObjectId) {
        let set = generate(&ShapeSpec::berry(count), &mut StdRng::seed_from_u64(seed)).unwrap();
        let cloud = PointCloud::attach(GeometryBuffer::build(&set), PointMaterial::per_vertex(0.01)).unwrap();
        let mut scene = Scene::default();
        let id = scene.add(cloud);
        scene.animate(id, Motion::spin(Vec3::new(0.0, RATE, 0.0)));
        (scene, id)
    }

    fn running_loop(surface: FakeSurface) -> (RenderLoop<FakeSurface>, ObjectId) {
        let (scene, id) = spinning_scene(100, 42);
        let mut lp = RenderLoop::new(surface, scene, Camera::default(), Cadence::from_interval(ms(16)));
        lp.start(Viewport::new(800, 600), ms(0)).unwrap();
        (lp, id)
    }

    #[test]
    fn one_tick_rotates_by_delta_times_rate_and_draws_once() {
        let (mut lp, id) = running_loop(FakeSurface::default());
        assert_eq!(lp.scene().point_count(), 100);

        assert_eq!(lp.pump(ms(16)), 1);

        let expected = Duration::from_millis(16).as_secs_f32() * RATE;
        assert_eq!(lp.scene().transform(id).unwrap().rotation.y, expected);
        assert_eq!(lp.surface().draws(), 1);
        assert_eq!(lp.state().frames_drawn, 1);
    }

    #[test]
    fn start_then_stop_draws_nothing() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (mut lp, id) = running_loop(FakeSurface {
            calls: calls.clone(),
            ..FakeSurface::default()
        });
        lp.stop();

        assert_eq!(lp.pump(ms(1000)), 0);
        assert_eq!(lp.scene().transform(id).unwrap().rotation, Vec3::ZERO);
        assert_eq!(*calls.borrow(), vec![Call::Create(Viewport::new(800, 600)), Call::Destroy]);
        assert_eq!(lp.next_deadline(), None);
    }

    #[test]
    fn repeated_stop_is_a_no_op() {
        let (mut lp, _) = running_loop(FakeSurface::default());
        lp.stop();
        let snapshot = lp.state().clone();
        lp.stop();
        lp.stop();
        assert_eq!(*lp.state(), snapshot);
        assert_eq!(lp.phase(), LoopPhase::Stopped);
    }

    #[test]
    fn stop_before_start_is_terminal() {
        let (scene, _) = spinning_scene(1, 0);
        let mut lp = RenderLoop::new(FakeSurface::default(), scene, Camera::default(), Cadence::default());
        lp.stop();
        assert_eq!(lp.phase(), LoopPhase::Stopped);
        assert!(matches!(
            lp.start(Viewport::new(10, 10), ms(0)),
            Err(RenderError::InvalidTransition { action: "start", phase: "stopped" })
        ));
    }

    #[test]
    fn resize_updates_aspect_before_next_draw() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (mut lp, _) = running_loop(FakeSurface {
            calls: calls.clone(),
            ..FakeSurface::default()
        });
        lp.pump(ms(16));
        lp.resize(Viewport::new(600, 250));
        lp.pump(ms(32));

        let calls = calls.borrow();
        assert_eq!(calls[2], Call::Resize(600, 250));
        let Call::Draw { aspect, items } = calls[3] else {
            panic!("expected a draw, got {:?}", calls[3]);
        };
        assert!((aspect - 2.4).abs() < 1e-6);
        assert_eq!(items, 1);
    }

    #[test]
    fn resize_outside_running_is_ignored() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (scene, _) = spinning_scene(1, 0);
        let mut lp = RenderLoop::new(
            FakeSurface {
                calls: calls.clone(),
                ..FakeSurface::default()
            },
            scene,
            Camera::default(),
            Cadence::default(),
        );
        lp.resize(Viewport::new(100, 100));
        assert!(calls.borrow().is_empty());

        lp.start(Viewport::new(100, 100), ms(0)).unwrap();
        lp.resize(Viewport::new(0, 100));
        lp.stop();
        lp.resize(Viewport::new(300, 100));
        assert!(!calls.borrow().iter().any(|c| matches!(c, Call::Resize(..))));
        assert_eq!(lp.camera().aspect, 1.0);
    }

    #[test]
    fn device_failure_is_fatal_to_start() {
        let (scene, _) = spinning_scene(1, 0);
        let mut lp = RenderLoop::new(
            FakeSurface {
                fail_create: true,
                ..FakeSurface::default()
            },
            scene,
            Camera::default(),
            Cadence::default(),
        );
        assert!(matches!(
            lp.start(Viewport::new(10, 10), ms(0)),
            Err(RenderError::DeviceInit(_))
        ));
        assert_eq!(lp.phase(), LoopPhase::Stopped);
        assert_eq!(lp.next_deadline(), None);
    }

    #[test]
    fn failed_draw_keeps_cadence() {
        let (mut lp, id) = running_loop(FakeSurface {
            fail_draws: 1,
            ..FakeSurface::default()
        });
        assert_eq!(lp.pump(ms(16)), 0);
        assert_eq!(lp.state().failed_draws, 1);
        assert_eq!(lp.next_deadline(), Some(ms(32)));

        assert_eq!(lp.pump(ms(32)), 1);
        let expected = Duration::from_millis(16).as_secs_f32() * RATE * 2.0;
        let rotation = lp.scene().transform(id).unwrap().rotation.y;
        assert!((rotation - expected).abs() < 1e-6);
    }

    #[test]
    fn at_most_one_tick_per_interval() {
        let (mut lp, _) = running_loop(FakeSurface::default());
        assert_eq!(lp.pump(ms(5)), 0);
        assert_eq!(lp.pump(ms(100)), 1);
        assert!(lp.state().pending.is_some());
        assert_eq!(lp.next_deadline(), Some(ms(116)));
    }

    #[test]
    fn superseded_timer_is_stale() {
        let (mut lp, _) = running_loop(FakeSurface::default());
        let first = lp.state().pending.unwrap();
        lp.pump(ms(16));
        assert_eq!(lp.on_timer(first, ms(20)), TickOutcome::Stale);
        assert_eq!(lp.state().frames_drawn, 1);
    }

    #[test]
    fn second_start_is_rejected() {
        let (mut lp, _) = running_loop(FakeSurface::default());
        assert!(matches!(
            lp.start(Viewport::new(1, 1), ms(1)),
            Err(RenderError::InvalidTransition { phase: "running", .. })
        ));
    }

    #[test]
    fn dropping_a_running_loop_releases_the_surface() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (lp, _) = running_loop(FakeSurface {
            calls: calls.clone(),
            ..FakeSurface::default()
        });
        drop(lp);
        assert_eq!(calls.borrow().last(), Some(&Call::Destroy));
    }

    #[test]
    fn cadence_from_fps() {
        let c = Cadence::from_fps(30);
        assert!((c.interval().as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
        assert_eq!(Cadence::from_fps(0).interval(), Duration::from_secs(1));
    }
}
