//! Cancellable `requestAnimationFrame` loop.
//!
//! Each frame runs the step callback once and then asks for the next frame.
//! [`FrameLoop::stop`] cancels the pending request and drops the callback,
//! so a removed container does not leave a loop running behind it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Lifecycle of one animation instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopPhase {
	/// Created, mount decision not yet taken.
	Uninitialized,
	/// Motion was disallowed at mount; nothing was created.
	Declined,
	/// Requesting a frame after every step.
	Running,
	/// Terminal.
	Stopped,
}

impl LoopPhase {
	/// Takes the mount decision; only an uninitialized phase changes.
	pub fn on_mount(self, motion_allowed: bool) -> Self {
		match self {
			LoopPhase::Uninitialized if motion_allowed => LoopPhase::Running,
			LoopPhase::Uninitialized => LoopPhase::Declined,
			other => other,
		}
	}

	/// Teardown; only a running phase changes.
	pub fn on_stop(self) -> Self {
		match self {
			LoopPhase::Running => LoopPhase::Stopped,
			other => other,
		}
	}

	/// Whether frames should be requested in this phase.
	pub fn schedules_frames(self) -> bool {
		self == LoopPhase::Running
	}
}

/// Runs `step` if the loop is still live and reports whether another frame
/// should be requested.
fn run_frame(phase: &Cell<LoopPhase>, step: &mut dyn FnMut()) -> bool {
	if !phase.get().schedules_frames() {
		return false;
	}
	step();
	phase.get().schedules_frames()
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Handle to a running frame loop.
pub struct FrameLoop {
	phase: Rc<Cell<LoopPhase>>,
	pending: Rc<Cell<Option<i32>>>,
	callback: FrameCallback,
}

impl FrameLoop {
	/// Starts calling `step` once per animation frame.
	///
	/// Returns `None`, touching nothing, unless `phase` schedules frames.
	pub fn start(phase: LoopPhase, mut step: impl FnMut() + 'static) -> Option<Self> {
		if !phase.schedules_frames() {
			return None;
		}
		let phase = Rc::new(Cell::new(phase));
		let pending = Rc::new(Cell::new(None));
		let callback: FrameCallback = Rc::new(RefCell::new(None));

		let (phase_frame, pending_frame, callback_frame) =
			(phase.clone(), pending.clone(), callback.clone());
		*callback.borrow_mut() = Some(Closure::new(move || {
			pending_frame.set(None);
			if run_frame(&phase_frame, &mut step) {
				pending_frame.set(request_frame(&callback_frame));
			}
		}));
		pending.set(request_frame(&callback));

		Some(Self {
			phase,
			pending,
			callback,
		})
	}

	/// Whether frames are still being requested.
	pub fn is_running(&self) -> bool {
		self.phase.get().schedules_frames()
	}

	/// Current lifecycle phase.
	pub fn phase(&self) -> LoopPhase {
		self.phase.get()
	}

	/// Cancels the pending frame. Safe to call more than once.
	pub fn stop(&self) {
		self.phase.set(self.phase.get().on_stop());
		if let Some(id) = self.pending.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
		}
		// The closure captures its own handle; dropping it here breaks the cycle.
		self.callback.borrow_mut().take();
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		self.stop();
	}
}

fn request_frame(callback: &FrameCallback) -> Option<i32> {
	let window = web_sys::window()?;
	let callback = callback.borrow();
	window
		.request_animation_frame(callback.as_ref()?.as_ref().unchecked_ref())
		.ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn declined_phase_starts_no_loop() {
		let stepped = Rc::new(Cell::new(false));
		let flag = stepped.clone();
		let started = FrameLoop::start(LoopPhase::Uninitialized.on_mount(false), move || {
			flag.set(true);
		});
		assert!(started.is_none());
		assert!(!stepped.get());

		let stopped = FrameLoop::start(LoopPhase::Stopped, || {});
		assert!(stopped.is_none());
	}

	#[test]
	fn reduced_motion_declines_and_never_runs() {
		let phase = LoopPhase::Uninitialized.on_mount(false);
		assert_eq!(phase, LoopPhase::Declined);
		assert!(!phase.schedules_frames());
		assert_eq!(phase.on_stop(), LoopPhase::Declined);

		let cell = Cell::new(phase);
		let mut ran = false;
		assert!(!run_frame(&cell, &mut || ran = true));
		assert!(!ran);
	}

	#[test]
	fn running_loop_steps_and_continues() {
		let cell = Cell::new(LoopPhase::Uninitialized.on_mount(true));
		let mut frames = 0;
		for _ in 0..3 {
			assert!(run_frame(&cell, &mut || frames += 1));
		}
		assert_eq!(frames, 3);
	}

	#[test]
	fn stop_is_terminal() {
		let stopped = LoopPhase::Running.on_stop();
		assert_eq!(stopped, LoopPhase::Stopped);
		assert_eq!(stopped.on_mount(true), LoopPhase::Stopped);
		assert_eq!(stopped.on_stop(), LoopPhase::Stopped);
	}

	#[test]
	fn stop_inside_step_prevents_next_request() {
		let cell = Cell::new(LoopPhase::Running);
		let mut steps = 0;
		let continue_loop = run_frame(&cell, &mut || {
			steps += 1;
			cell.set(cell.get().on_stop());
		});
		assert_eq!(steps, 1);
		assert!(!continue_loop);
	}
}
