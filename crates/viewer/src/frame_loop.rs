use crate::viewer::Viewer;
use duckview_input::CameraController;
use duckview_render::Renderer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable stop signal for a [`FrameLoop`]. Safe to trigger from any thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Drives [`Viewer::frame`] until stopped.
///
/// The host decides when a frame is due (a redraw request, a timer, a plain
/// loop) and calls [`tick`](Self::tick).
#[derive(Debug, Default)]
pub struct FrameLoop {
    stop: StopHandle,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_running(&self) -> bool {
        !self.stop.is_stopped()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Render one frame, or return `None` once stopped.
    pub fn tick<R: Renderer, C: CameraController>(
        &mut self,
        viewer: &mut Viewer<R, C>,
    ) -> Option<R::Output> {
        if !self.is_running() {
            return None;
        }
        let output = viewer.frame();
        self.frames += 1;
        Some(output)
    }

    /// Tick until the stop signal is raised, handing each output to
    /// `on_frame` together with the loop's handle. Returns the frame count.
    pub fn run<R, C, F>(&mut self, viewer: &mut Viewer<R, C>, mut on_frame: F) -> u64
    where
        R: Renderer,
        C: CameraController,
        F: FnMut(&StopHandle, R::Output),
    {
        let _span = tracing::info_span!("frame_loop").entered();
        let handle = self.stop_handle();
        while let Some(output) = self.tick(viewer) {
            on_frame(&handle, output);
        }
        tracing::info!(frames = self.frames, "frame loop stopped");
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::tests::recording_viewer;
    use duckview_scene::Scene;

    #[test]
    fn n_ticks_alternate_update_and_render() {
        let (mut viewer, log) = recording_viewer(Scene::new());
        let mut frame_loop = FrameLoop::new();
        for _ in 0..5 {
            assert!(frame_loop.tick(&mut viewer).is_some());
        }
        assert_eq!(frame_loop.frames(), 5);
        let log = log.borrow();
        assert_eq!(log.len(), 10);
        for pair in log.chunks(2) {
            assert_eq!(pair, ["update", "render"]);
        }
    }

    #[test]
    fn stopped_loop_never_renders() {
        let (mut viewer, log) = recording_viewer(Scene::new());
        let mut frame_loop = FrameLoop::new();
        frame_loop.stop_handle().stop();
        assert!(!frame_loop.is_running());
        assert!(frame_loop.tick(&mut viewer).is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn run_until_callback_stops() {
        let (mut viewer, log) = recording_viewer(Scene::new());
        let mut frame_loop = FrameLoop::new();
        let mut seen = 0;
        let frames = frame_loop.run(&mut viewer, |stop, _| {
            seen += 1;
            if seen == 3 {
                stop.stop();
            }
        });
        assert_eq!(frames, 3);
        assert_eq!(log.borrow().iter().filter(|c| **c == "render").count(), 3);
    }

    #[test]
    fn stop_from_another_thread() {
        let frame_loop = FrameLoop::new();
        let handle = frame_loop.stop_handle();
        std::thread::spawn(move || handle.stop()).join().unwrap();
        assert!(!frame_loop.is_running());
    }
}
