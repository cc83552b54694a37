//! Process-wide sink for errors that cannot be delivered.
//!
//! Once a subscriber has seen its terminal event, any further error is a
//! protocol violation. Such errors end up here instead of being re-entered
//! into the subscriber.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::error::Error;

type DroppedErrorHook = Arc<dyn Fn(&Error) + Send + Sync>;

static ON_ERROR_DROPPED: Lazy<RwLock<Option<DroppedErrorHook>>> = Lazy::new(|| RwLock::new(None));

/// Install a hook invoked for every dropped error, replacing any previous one.
pub fn set_on_error_dropped<F>(hook: F)
where
    F: Fn(&Error) + Send + Sync + 'static,
{
    let mut guard = ON_ERROR_DROPPED
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *guard = Some(Arc::new(hook));
}

/// Remove the installed hook. Dropped errors are still logged.
pub fn reset_on_error_dropped() {
    let mut guard = ON_ERROR_DROPPED
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *guard = None;
}

/// Report an error that arrived after its subscriber terminated.
pub fn on_error_dropped(error: Error) {
    tracing::error!(error = %error, "error dropped: subscriber already terminated");

    let hook = ON_ERROR_DROPPED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    if let Some(hook) = hook {
        hook(&error);
    }
}
