//! Process-wide sink for errors nobody handles.
//!
//! An error reaches the sink when it is delivered to an observer that was
//! subscribed without an error callback. Panics raised by observers and by
//! scheduled actions are reported here as `RxError::ObserverPanicked`.
//! Without an installed hook the error is logged through the `log` facade.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::{
  error::RxError,
  util::{read, write},
};

type ErrorHook = Arc<dyn Fn(RxError) + Send + Sync>;

static ERROR_HOOK: Lazy<RwLock<Option<ErrorHook>>> = Lazy::new(|| RwLock::new(None));

/// Installs `hook` as the unhandled-error sink, replacing any previous one.
pub fn set_error_hook(hook: impl Fn(RxError) + Send + Sync + 'static) {
  *write(&ERROR_HOOK) = Some(Arc::new(hook));
}

/// Removes the installed hook; unhandled errors are logged again.
pub fn reset_error_hook() { *write(&ERROR_HOOK) = None; }

/// Routes `err` to the installed hook, or logs it.
pub fn on_unhandled_error(err: RxError) {
  let hook = read(&ERROR_HOOK).clone();
  match hook {
    Some(hook) => hook(err),
    None => log::error!("unhandled observable error: {err}"),
  }
}
