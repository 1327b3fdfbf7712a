//! Self-rescheduling frame loop
//!
//! The host only offers one-shot frame requests. [`FrameLoop`] turns them
//! into a loop: each frame callback runs the user closure and then requests
//! the next frame, until [`FrameLoop::stop`] cancels the pending request.

use std::cell::Cell;
use std::rc::Rc;

use trailglow_platform::{FrameHandle, Host, PlatformError};

type OnFrame = Box<dyn FnMut(f64)>;

/// State shared between the loop and its in-flight frame callback
///
/// Each start gets a fresh instance, so a callback left over from an earlier
/// cycle can never revive the loop.
#[derive(Default)]
struct LoopState {
    running: Cell<bool>,
    pending: Cell<Option<FrameHandle>>,
    frames: Cell<u64>,
}

/// Runs a closure once per host frame while started
pub struct FrameLoop<H: Host> {
    host: H,
    state: Rc<LoopState>,
}

impl<H: Host> FrameLoop<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            state: Rc::new(LoopState::default()),
        }
    }

    /// Request the first frame and keep requesting one per frame
    ///
    /// `on_frame` receives the host timestamp in milliseconds.
    pub fn start(&mut self, on_frame: impl FnMut(f64) + 'static) -> trailglow_platform::Result<()> {
        if self.is_running() {
            tracing::warn!("FrameLoop::start() called while already running");
            return Err(PlatformError::AlreadyStarted);
        }

        let state = Rc::new(LoopState::default());
        state.running.set(true);
        self.state = Rc::clone(&state);

        if let Err(err) = schedule(&self.host, &state, Box::new(on_frame)) {
            state.running.set(false);
            return Err(err);
        }
        Ok(())
    }

    /// Cancel the pending frame; no further callbacks run after this returns
    pub fn stop(&mut self) {
        self.state.running.set(false);
        if let Some(handle) = self.state.pending.take() {
            self.host.cancel_frame(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Frames run since the last start
    pub fn frame_count(&self) -> u64 {
        self.state.frames.get()
    }
}

impl<H: Host> Drop for FrameLoop<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule<H: Host>(
    host: &H,
    state: &Rc<LoopState>,
    mut on_frame: OnFrame,
) -> trailglow_platform::Result<()> {
    let next_host = host.clone();
    let loop_state = Rc::clone(state);

    let handle = host.request_frame(Box::new(move |timestamp| {
        loop_state.pending.set(None);
        if !loop_state.running.get() {
            return;
        }

        loop_state.frames.set(loop_state.frames.get() + 1);
        on_frame(timestamp);

        // The closure may have stopped the loop
        if !loop_state.running.get() {
            return;
        }
        if let Err(err) = schedule(&next_host, &loop_state, on_frame) {
            tracing::warn!("Frame loop stopped, next frame could not be requested: {}", err);
            loop_state.running.set(false);
        }
    }))?;

    state.pending.set(Some(handle));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use trailglow_core::Size;
    use trailglow_platform::HeadlessHost;

    fn host() -> HeadlessHost {
        HeadlessHost::new(Size::new(320.0, 240.0))
    }

    #[test]
    fn test_runs_once_per_frame() {
        let host = host();
        let mut frame_loop = FrameLoop::new(host.clone());
        let stamps = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&stamps);

        frame_loop
            .start(move |timestamp| recorded.borrow_mut().push(timestamp))
            .unwrap();
        assert_eq!(host.pending_frame_count(), 1);

        host.run_frames(3);

        assert_eq!(frame_loop.frame_count(), 3);
        assert_eq!(stamps.borrow().len(), 3);
        assert!(stamps.borrow().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(host.pending_frame_count(), 1);
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let host = host();
        let mut frame_loop = FrameLoop::new(host.clone());
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);

        frame_loop.start(move |_| counter.set(counter.get() + 1)).unwrap();
        host.run_frame();
        frame_loop.stop();

        assert!(!frame_loop.is_running());
        assert_eq!(host.pending_frame_count(), 0);
        host.run_frames(5);
        assert_eq!(count.get(), 1);

        // Stopping again is harmless
        frame_loop.stop();
    }

    #[test]
    fn test_double_start_rejected() {
        let host = host();
        let mut frame_loop = FrameLoop::new(host.clone());

        frame_loop.start(|_| {}).unwrap();
        assert_eq!(frame_loop.start(|_| {}), Err(PlatformError::AlreadyStarted));
        assert_eq!(host.pending_frame_count(), 1);
    }

    #[test]
    fn test_restart_after_stop() {
        let host = host();
        let mut frame_loop = FrameLoop::new(host.clone());

        frame_loop.start(|_| {}).unwrap();
        host.run_frames(2);
        frame_loop.stop();

        frame_loop.start(|_| {}).unwrap();
        assert_eq!(frame_loop.frame_count(), 0);
        host.run_frame();
        assert_eq!(frame_loop.frame_count(), 1);
        assert_eq!(host.pending_frame_count(), 1);
    }

    #[test]
    fn test_drop_stops_loop() {
        let host = host();
        {
            let mut frame_loop = FrameLoop::new(host.clone());
            frame_loop.start(|_| {}).unwrap();
        }
        assert_eq!(host.pending_frame_count(), 0);
    }
}
