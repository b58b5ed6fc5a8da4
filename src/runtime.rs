//! One-time, per-UI-thread controller installation.
//!
//! The first [`init`] builds and installs the controller. Every later call
//! returns the same handle and ignores its arguments. There is no teardown;
//! routes unmount their cards through the controller instead.
//!
//! The installed controller queues its card callbacks and bus deliveries.
//! Drive it through [`with_controller`], which runs the queued callbacks
//! after its borrow is released, so a callback may read the handle with
//! [`controller`] or navigate through [`with_controller`] itself. Hosts that
//! borrow the handle directly call [`dispatch_pending`] afterwards.

use std::{
    cell::{OnceCell, RefCell},
    rc::Rc,
};

use crate::{
    controller::{AnimationController, ControllerConfig},
    events::Dispatch,
    foundation::core::Viewport,
    foundation::error::{CardError, CardResult},
    scroll::driver::ScrollDriver,
};

/// The per-thread controller handle.
pub type SharedController = Rc<RefCell<AnimationController>>;

thread_local! {
    static CONTROLLER: OnceCell<SharedController> = const { OnceCell::new() };
}

/// Install the thread's controller, or return the one already installed.
pub fn init(
    config: ControllerConfig,
    viewport: Viewport,
    driver: impl ScrollDriver + 'static,
) -> CardResult<SharedController> {
    if let Some(existing) = controller() {
        tracing::debug!("controller already initialised; ignoring new config");
        return Ok(existing);
    }
    let mut ctrl = AnimationController::new(config, viewport, driver)?;
    ctrl.set_deferred_dispatch(true);
    let shared = Rc::new(RefCell::new(ctrl));
    CONTROLLER.with(|cell| {
        // cannot already be set: the check above ran on this thread
        let _ = cell.set(shared.clone());
    });
    tracing::debug!("controller initialised");
    Ok(shared)
}

/// The installed controller, if [`init`] has run on this thread.
pub fn controller() -> Option<SharedController> {
    CONTROLLER.with(|cell| cell.get().cloned())
}

/// Whether [`init`] has installed a controller on this thread.
pub fn is_initialized() -> bool {
    CONTROLLER.with(|cell| cell.get().is_some())
}

fn installed() -> CardResult<SharedController> {
    controller().ok_or_else(|| CardError::Unavailable("not initialised on this thread".into()))
}

fn take_dispatch(shared: &SharedController) -> CardResult<Dispatch> {
    let mut ctrl = shared
        .try_borrow_mut()
        .map_err(|_| CardError::Unavailable("already borrowed".into()))?;
    Ok(ctrl.take_dispatch())
}

/// Run `f` against the installed controller, then run the callbacks it
/// queued once the borrow is released.
///
/// Fails instead of panicking when the controller is missing or already
/// borrowed further up the stack.
pub fn with_controller<R>(f: impl FnOnce(&mut AnimationController) -> R) -> CardResult<R> {
    let shared = installed()?;
    let (out, dispatch) = {
        let mut ctrl = shared
            .try_borrow_mut()
            .map_err(|_| CardError::Unavailable("already borrowed".into()))?;
        let out = f(&mut ctrl);
        (out, ctrl.take_dispatch())
    };
    dispatch.run();
    Ok(out)
}

/// Run callbacks queued by direct borrows of the handle. Returns how many
/// ran.
pub fn dispatch_pending() -> CardResult<usize> {
    let dispatch = take_dispatch(&installed()?)?;
    let ran = dispatch.len();
    dispatch.run();
    Ok(ran)
}

#[cfg(test)]
#[path = "../tests/unit/runtime.rs"]
mod tests;
