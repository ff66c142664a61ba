use crate::clock::{FrameClock, FrameTime, InstantClock};
use crate::config::LoopConfig;
use crate::error::LoopError;
use crate::traits::{Camera, CameraControls, Host, HostEvent, NoControls, Renderer};
use crate::viewport::{PixelDensity, ViewportSize};

/// Per-frame scene mutation supplied by the caller.
pub type UpdateHook<S> = Box<dyn FnMut(&mut S, FrameTime)>;

/// Everything the loop renders and mutates.
///
/// The loop is the only owner of these objects while it runs; callers reach
/// them through [`ViewportLoop::context_mut`] between events.
pub struct ViewportContext<S, C, R, K = NoControls> {
    pub scene: S,
    pub camera: C,
    pub renderer: R,
    pub controls: Option<K>,
}

impl<S, C, R> ViewportContext<S, C, R, NoControls> {
    /// A context without camera controls.
    pub fn new(scene: S, camera: C, renderer: R) -> Self {
        Self {
            scene,
            camera,
            renderer,
            controls: None,
        }
    }
}

impl<S, C, R, K> ViewportContext<S, C, R, K> {
    pub fn with_controls(scene: S, camera: C, renderer: R, controls: K) -> Self {
        Self {
            scene,
            camera,
            renderer,
            controls: Some(controls),
        }
    }
}

/// Lifecycle of a [`ViewportLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, no tick has run yet.
    Idle,
    /// At least one tick has run.
    Running,
    /// [`ViewportLoop::stop`] was called or a frame failed to render. Ticks
    /// are ignored from now on.
    Stopped,
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoopState::Idle => "idle",
            LoopState::Running => "running",
            LoopState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Resize-synchronized render loop.
///
/// The loop never blocks waiting for a frame. Each tick ends by asking the
/// host for another one; the host decides when that frame arrives.
pub struct ViewportLoop<S, C, R, K = NoControls, T = InstantClock> {
    ctx: ViewportContext<S, C, R, K>,
    clock: T,
    hooks: Vec<UpdateHook<S>>,
    viewport: ViewportSize,
    pixel_density: PixelDensity,
    max_pixel_density: f64,
    state: LoopState,
    frames: u64,
    last_elapsed: f64,
}

impl<S, C, R, K, T> ViewportLoop<S, C, R, K, T>
where
    C: Camera,
    R: Renderer<S, C>,
    K: CameraControls<C>,
    T: FrameClock,
{
    pub fn new(ctx: ViewportContext<S, C, R, K>, clock: T, config: &LoopConfig) -> Self {
        Self {
            ctx,
            clock,
            hooks: Vec::new(),
            viewport: ViewportSize::default(),
            pixel_density: PixelDensity::default(),
            max_pixel_density: config.max_pixel_density,
            state: LoopState::Idle,
            frames: 0,
            last_elapsed: 0.0,
        }
    }

    /// Register a per-frame scene mutation. Hooks run in registration order.
    pub fn add_update<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&mut S, FrameTime) + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Size the renderer for the current window and run the first tick.
    pub fn start<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), LoopError> {
        match self.state {
            LoopState::Running => Err(LoopError::AlreadyRunning),
            LoopState::Stopped => Err(LoopError::Stopped),
            LoopState::Idle => {
                tracing::debug!("starting viewport loop");
                self.on_resize(&*host);
                self.tick(host)
            }
        }
    }

    /// Stop the loop. The next tick does nothing and requests no frame.
    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            tracing::debug!(frames = self.frames, "viewport loop stopped");
            self.state = LoopState::Stopped;
        }
    }

    /// Dispatch a host notification.
    pub fn handle<H: Host + ?Sized>(
        &mut self,
        event: HostEvent,
        host: &mut H,
    ) -> Result<(), LoopError> {
        match event {
            HostEvent::Resized => {
                self.on_resize(&*host);
                Ok(())
            }
            HostEvent::Frame => self.tick(host),
        }
    }

    /// Re-read the window size and density and push them to camera and renderer.
    ///
    /// A zero-height window keeps the previous aspect ratio and projection.
    pub fn on_resize<H: Host + ?Sized>(&mut self, host: &H) {
        let size = host.window_size();
        self.viewport = size;

        match size.aspect() {
            Some(aspect) => {
                self.ctx.camera.set_aspect(aspect);
                self.ctx.camera.update_projection();
            }
            None => tracing::debug!(
                aspect = self.ctx.camera.aspect(),
                "zero-height viewport, keeping previous aspect"
            ),
        }

        self.ctx.renderer.set_output_size(size.width, size.height);
        self.pixel_density =
            PixelDensity::clamped(host.device_pixel_density(), self.max_pixel_density);
        self.ctx.renderer.set_pixel_density(self.pixel_density.get());

        tracing::debug!(
            width = size.width,
            height = size.height,
            density = self.pixel_density.get(),
            "viewport resized"
        );
    }

    /// Produce one frame and request the next.
    ///
    /// If rendering fails the error is returned before the next frame is
    /// requested, so the loop halts.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), LoopError> {
        match self.state {
            LoopState::Stopped => {
                tracing::trace!("tick ignored, loop stopped");
                return Ok(());
            }
            LoopState::Idle => {
                tracing::debug!("viewport loop running");
                self.state = LoopState::Running;
            }
            LoopState::Running => {}
        }

        let elapsed = self.clock.elapsed().max(self.last_elapsed);
        let time = FrameTime {
            elapsed,
            delta: if self.frames == 0 {
                0.0
            } else {
                elapsed - self.last_elapsed
            },
            frame: self.frames,
        };
        self.last_elapsed = elapsed;

        for hook in &mut self.hooks {
            hook(&mut self.ctx.scene, time);
        }

        if let Some(controls) = &mut self.ctx.controls {
            controls.update(&mut self.ctx.camera);
        }

        if let Err(e) = self.ctx.renderer.render(&self.ctx.scene, &self.ctx.camera) {
            tracing::error!(frame = time.frame, "render failed, loop stopped: {e}");
            self.state = LoopState::Stopped;
            return Err(e.into());
        }

        self.frames += 1;
        host.request_frame();
        tracing::trace!(frame = time.frame, elapsed, "frame submitted");
        Ok(())
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn pixel_density(&self) -> f64 {
        self.pixel_density.get()
    }

    /// Elapsed time seen by the most recent tick.
    pub fn elapsed(&self) -> f64 {
        self.last_elapsed
    }

    /// Number of frames rendered successfully.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn context(&self) -> &ViewportContext<S, C, R, K> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ViewportContext<S, C, R, K> {
        &mut self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppedClock;
    use crate::error::RenderError;
    use crate::harness::ManualHost;
    use std::cell::RefCell;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<&'static str>>>;

    struct TestCamera {
        aspect: f32,
        projection_updates: u32,
    }

    impl TestCamera {
        fn new() -> Self {
            Self {
                aspect: 1.0,
                projection_updates: 0,
            }
        }
    }

    impl Camera for TestCamera {
        fn aspect(&self) -> f32 {
            self.aspect
        }

        fn set_aspect(&mut self, aspect: f32) {
            self.aspect = aspect;
        }

        fn update_projection(&mut self) {
            self.projection_updates += 1;
        }
    }

    #[derive(Default)]
    struct TestRenderer {
        log: CallLog,
        output_size: (u32, u32),
        pixel_density: f64,
        fail_at: Option<u64>,
        renders: u64,
    }

    impl Renderer<Vec<f64>, TestCamera> for TestRenderer {
        fn set_output_size(&mut self, width: u32, height: u32) {
            self.output_size = (width, height);
        }

        fn set_pixel_density(&mut self, ratio: f64) {
            self.pixel_density = ratio;
        }

        fn render(&mut self, _scene: &Vec<f64>, _camera: &TestCamera) -> Result<(), RenderError> {
            if self.fail_at == Some(self.renders) {
                return Err(RenderError::ContextLost("simulated".into()));
            }
            self.renders += 1;
            self.log.borrow_mut().push("render");
            Ok(())
        }
    }

    struct TestControls {
        log: CallLog,
    }

    impl CameraControls<TestCamera> for TestControls {
        fn update(&mut self, _camera: &mut TestCamera) {
            self.log.borrow_mut().push("controls");
        }
    }

    type TestLoop = ViewportLoop<Vec<f64>, TestCamera, TestRenderer, TestControls, SteppedClock>;

    fn test_loop(log: &CallLog, controls: bool) -> TestLoop {
        let renderer = TestRenderer {
            log: log.clone(),
            ..TestRenderer::default()
        };
        let ctx = ViewportContext {
            scene: Vec::new(),
            camera: TestCamera::new(),
            renderer,
            controls: controls.then(|| TestControls { log: log.clone() }),
        };
        ViewportLoop::new(ctx, SteppedClock::sixty_hz(), &LoopConfig::default())
    }

    #[test]
    fn resize_end_to_end() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        let host = ManualHost::new(800, 600, 3.0);

        lp.on_resize(&host);

        let ctx = lp.context();
        assert_eq!(ctx.camera.aspect, 800.0 / 600.0);
        assert!((ctx.camera.aspect - 1.3333).abs() < 1e-4);
        assert_eq!(ctx.camera.projection_updates, 1);
        assert_eq!(ctx.renderer.output_size, (800, 600));
        assert_eq!(ctx.renderer.pixel_density, 2.0);
        assert_eq!(lp.viewport(), ViewportSize::new(800, 600));
    }

    #[test]
    fn aspect_matches_every_resize() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        let mut host = ManualHost::new(1, 1, 1.0);

        for (w, h) in [(1, 1), (1920, 1080), (375, 812), (1, 4000), (4000, 1), (0, 10)] {
            host.set_window_size(w, h);
            lp.on_resize(&host);
            assert_eq!(lp.context().camera.aspect, w as f32 / h as f32);
            assert_eq!(lp.context().renderer.output_size, (w, h));
        }
    }

    #[test]
    fn pixel_density_is_clamped_on_resize() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        let mut host = ManualHost::new(640, 480, 1.0);

        for d in [0.75, 1.0, 1.5, 2.0, 2.5, 3.0, 8.0] {
            host.set_device_pixel_density(d);
            lp.on_resize(&host);
            assert_eq!(lp.context().renderer.pixel_density, d.min(2.0));
            assert_eq!(lp.pixel_density(), d.min(2.0));
        }
    }

    #[test]
    fn custom_density_cap() {
        let log = CallLog::default();
        let renderer = TestRenderer {
            log: log.clone(),
            ..TestRenderer::default()
        };
        let ctx: ViewportContext<Vec<f64>, TestCamera, TestRenderer> =
            ViewportContext::new(Vec::new(), TestCamera::new(), renderer);
        let config = LoopConfig {
            max_pixel_density: 1.5,
        };
        let mut lp = ViewportLoop::new(ctx, SteppedClock::sixty_hz(), &config);

        lp.on_resize(&ManualHost::new(100, 100, 3.0));
        assert_eq!(lp.context().renderer.pixel_density, 1.5);
    }

    #[test]
    fn zero_height_keeps_previous_aspect() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        let mut host = ManualHost::new(800, 600, 1.0);
        lp.on_resize(&host);

        host.set_window_size(800, 0);
        lp.on_resize(&host);

        let ctx = lp.context();
        assert_eq!(ctx.camera.aspect, 800.0 / 600.0);
        assert_eq!(ctx.camera.projection_updates, 1);
        assert_eq!(ctx.renderer.output_size, (800, 0));
        assert_eq!(lp.viewport(), ViewportSize::new(800, 0));
    }

    #[test]
    fn elapsed_time_never_decreases() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        lp.add_update(|seen: &mut Vec<f64>, time| seen.push(time.elapsed));
        let mut host = ManualHost::new(320, 240, 1.0);

        let ticks = host.pump(&mut lp, 50).unwrap();
        assert_eq!(ticks, 50);

        let seen = &lp.context().scene;
        assert_eq!(seen.len(), 50);
        assert_eq!(seen[0], 0.0);
        assert!(seen.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn backwards_clock_is_clamped() {
        use std::cell::Cell;

        struct Jittery(Cell<u32>);
        impl FrameClock for Jittery {
            fn elapsed(&self) -> f64 {
                let n = self.0.get();
                self.0.set(n + 1);
                if n % 2 == 0 { n as f64 } else { n as f64 - 5.0 }
            }
        }

        let log = CallLog::default();
        let renderer = TestRenderer {
            log: log.clone(),
            ..TestRenderer::default()
        };
        let ctx = ViewportContext::new(Vec::<f64>::new(), TestCamera::new(), renderer);
        let mut lp = ViewportLoop::new(ctx, Jittery(Cell::new(0)), &LoopConfig::default());
        lp.add_update(|seen: &mut Vec<f64>, time| {
            assert!(time.delta >= 0.0);
            seen.push(time.elapsed);
        });

        ManualHost::new(10, 10, 1.0).pump(&mut lp, 10).unwrap();
        let seen = &lp.context().scene;
        assert!(seen.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn delta_and_frame_index() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        let times = Rc::new(RefCell::new(Vec::new()));
        let sink = times.clone();
        lp.add_update(move |_, time| sink.borrow_mut().push(time));

        ManualHost::new(10, 10, 1.0).pump(&mut lp, 3).unwrap();
        assert!((lp.elapsed() - 2.0 / 60.0).abs() < 1e-12);

        let times = times.borrow();
        assert_eq!(times[0].delta, 0.0);
        assert_eq!(times[0].frame, 0);
        assert!((times[1].delta - 1.0 / 60.0).abs() < 1e-12);
        assert_eq!(times[2].frame, 2);
    }

    #[test]
    fn controls_update_before_render() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, true);
        let hook_log = log.clone();
        lp.add_update(move |_, _| hook_log.borrow_mut().push("hook"));

        ManualHost::new(100, 100, 1.0).pump(&mut lp, 2).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["hook", "controls", "render", "hook", "controls", "render"]
        );
    }

    #[test]
    fn no_controls_still_renders() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        ManualHost::new(100, 100, 1.0).pump(&mut lp, 1).unwrap();
        assert_eq!(*log.borrow(), vec!["render"]);
    }

    #[test]
    fn single_start_keeps_ticking() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        let mut host = ManualHost::new(100, 100, 1.0);

        assert_eq!(lp.state(), LoopState::Idle);
        lp.start(&mut host).unwrap();
        assert_eq!(lp.state(), LoopState::Running);
        assert!(host.frame_pending());

        let ticks = host.pump(&mut lp, 25).unwrap();
        assert_eq!(ticks, 25);
        assert_eq!(lp.frames(), 26);
        assert_eq!(host.frame_requests(), 26);
    }

    #[test]
    fn render_failure_stops_rescheduling() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        lp.context_mut().renderer.fail_at = Some(4);
        let mut host = ManualHost::new(100, 100, 1.0);

        let err = host.pump(&mut lp, 100).unwrap_err();
        assert!(matches!(err, LoopError::Render(RenderError::ContextLost(_))));
        assert_eq!(lp.frames(), 4);
        assert_eq!(host.frame_requests(), 4);
        assert!(!host.frame_pending());
        assert_eq!(lp.state(), LoopState::Stopped);

        // Nothing is pending, so the loop stays frozen.
        assert_eq!(host.pump(&mut lp, 100).unwrap(), 0);
        assert_eq!(lp.frames(), 4);

        // A repaint forced by the host is ignored too.
        lp.handle(HostEvent::Frame, &mut host).unwrap();
        assert_eq!(lp.frames(), 4);
        assert_eq!(host.frame_requests(), 4);
    }

    #[test]
    fn stop_halts_the_loop() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        let mut host = ManualHost::new(100, 100, 1.0);
        host.pump(&mut lp, 3).unwrap();

        lp.stop();
        assert_eq!(lp.state(), LoopState::Stopped);
        assert!(host.frame_pending());
        lp.handle(HostEvent::Frame, &mut host).unwrap();

        assert_eq!(lp.frames(), 3);
        assert_eq!(host.frame_requests(), 3);
        assert!(matches!(lp.start(&mut host), Err(LoopError::Stopped)));
    }

    #[test]
    fn start_twice_is_rejected() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        let mut host = ManualHost::new(100, 100, 1.0);
        lp.start(&mut host).unwrap();
        assert!(matches!(lp.start(&mut host), Err(LoopError::AlreadyRunning)));
    }

    #[test]
    fn start_sizes_renderer_first() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        let mut host = ManualHost::new(1280, 720, 1.25);
        lp.start(&mut host).unwrap();

        let ctx = lp.context();
        assert_eq!(ctx.renderer.output_size, (1280, 720));
        assert_eq!(ctx.renderer.pixel_density, 1.25);
        assert_eq!(ctx.camera.aspect, 1280.0 / 720.0);
    }

    #[test]
    fn resize_event_applies_before_next_tick() {
        let log = CallLog::default();
        let mut lp = test_loop(&log, false);
        let mut host = ManualHost::new(800, 600, 1.0);
        lp.start(&mut host).unwrap();

        host.set_window_size(1000, 500);
        lp.handle(HostEvent::Resized, &mut host).unwrap();
        lp.handle(HostEvent::Frame, &mut host).unwrap();

        assert_eq!(lp.context().camera.aspect, 2.0);
        assert_eq!(lp.context().renderer.output_size, (1000, 500));
        assert_eq!(lp.frames(), 2);
    }
}
