use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lightbox_render::Renderer;
use thiserror::Error;

use crate::clock::Clock;
use crate::demo::DemoScene;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoopError {
    #[error("render loop already started")]
    AlreadyStarted,
    #[error("render loop was stopped and cannot restart")]
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// Shared stop flag. Any clone can cancel the loop; the loop notices at the
/// start of its next frame.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Host hook that arranges for the next frame to run.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Drives the demo one frame at a time.
///
/// The host calls [`RenderLoop::frame`] whenever it is ready to draw; each
/// frame asks the scheduler for the next one until the token is cancelled.
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    clock: Clock,
    token: CancellationToken,
    frames: u64,
    elapsed: f32,
}

impl RenderLoop {
    pub fn new(clock: Clock) -> Self {
        Self {
            state: LoopState::Idle,
            clock,
            token: CancellationToken::new(),
            frames: 0,
            elapsed: 0.0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Clock reading taken by the most recent frame.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Move from Idle to Running and request the first frame.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> Result<(), LoopError> {
        match self.state {
            LoopState::Idle => {
                self.state = LoopState::Running;
                tracing::info!("render loop running");
                scheduler.request_frame();
                Ok(())
            }
            LoopState::Running => Err(LoopError::AlreadyStarted),
            LoopState::Stopped => Err(LoopError::Stopped),
        }
    }

    /// Run one frame. Returns the renderer's output, or `None` when the
    /// loop is not running (including the frame that observes
    /// cancellation).
    pub fn frame<R: Renderer>(
        &mut self,
        demo: &mut DemoScene,
        renderer: &mut R,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<R::Output> {
        if self.state != LoopState::Running {
            return None;
        }
        if self.token.is_cancelled() {
            self.state = LoopState::Stopped;
            tracing::info!("render loop stopped after {} frames", self.frames);
            return None;
        }

        let refreshed = demo.graph.apply_refreshes();
        if refreshed > 0 {
            tracing::debug!("refreshed {refreshed} helper(s)");
        }

        self.elapsed = self.clock.elapsed();
        if let Err(err) = demo.objects.animate(&mut demo.graph, self.elapsed) {
            tracing::error!("animation skipped: {err}");
        }
        demo.controls.update(&mut demo.camera);

        let output = renderer.render(&demo.graph, &demo.camera);
        self.frames += 1;

        scheduler.request_frame();
        Some(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTime;
    use crate::demo::DemoConfig;
    use lightbox_render::DebugTextRenderer;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingScheduler(u32);

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) {
            self.0 += 1;
        }
    }

    fn setup() -> (RenderLoop, ManualTime, DemoScene) {
        let time = ManualTime::new();
        let render_loop = RenderLoop::new(Clock::new(time.clone()));
        let demo = DemoScene::new(DemoConfig::default()).unwrap();
        (render_loop, time, demo)
    }

    #[test]
    fn idle_loop_draws_nothing() {
        let (mut render_loop, _time, mut demo) = setup();
        let mut scheduler = CountingScheduler::default();
        let mut renderer = DebugTextRenderer::new();
        assert!(
            render_loop
                .frame(&mut demo, &mut renderer, &mut scheduler)
                .is_none()
        );
        assert_eq!(renderer.draw_calls(), 0);
        assert_eq!(scheduler.0, 0);
    }

    #[test]
    fn starts_exactly_once() {
        let (mut render_loop, _time, _demo) = setup();
        let mut scheduler = CountingScheduler::default();
        render_loop.start(&mut scheduler).unwrap();
        assert_eq!(render_loop.state(), LoopState::Running);
        assert_eq!(
            render_loop.start(&mut scheduler),
            Err(LoopError::AlreadyStarted)
        );
        assert_eq!(scheduler.0, 1);
    }

    #[test]
    fn each_frame_draws_once_and_reschedules() {
        let (mut render_loop, time, mut demo) = setup();
        let mut scheduler = CountingScheduler::default();
        let mut renderer = DebugTextRenderer::new();
        render_loop.start(&mut scheduler).unwrap();

        for _ in 0..3 {
            time.advance(Duration::from_millis(16));
            assert!(
                render_loop
                    .frame(&mut demo, &mut renderer, &mut scheduler)
                    .is_some()
            );
        }
        assert_eq!(renderer.draw_calls(), 3);
        assert_eq!(render_loop.frames(), 3);
        assert_eq!(scheduler.0, 4);
        assert!((render_loop.elapsed() - 0.048).abs() < 1e-5);
    }

    #[test]
    fn cancellation_stops_the_loop() {
        let (mut render_loop, _time, mut demo) = setup();
        let mut scheduler = CountingScheduler::default();
        let mut renderer = DebugTextRenderer::new();
        render_loop.start(&mut scheduler).unwrap();
        render_loop.frame(&mut demo, &mut renderer, &mut scheduler);

        render_loop.token().cancel();
        assert!(
            render_loop
                .frame(&mut demo, &mut renderer, &mut scheduler)
                .is_none()
        );
        assert_eq!(render_loop.state(), LoopState::Stopped);
        assert_eq!(renderer.draw_calls(), 1);
        assert_eq!(scheduler.0, 2);
        assert_eq!(render_loop.start(&mut scheduler), Err(LoopError::Stopped));
    }
}
