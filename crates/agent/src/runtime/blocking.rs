//! Blocking: runs file I/O on the blocking pool and turns panics into
//! values that carry the panic message and the stack.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Chain a hook that records the backtrace of the panicking thread, so
/// [`run_blocking`] can report where the panic happened.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

#[derive(Debug, Clone)]
pub struct Panicked {
    pub message: String,
    pub stack: String,
}

impl Panicked {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        let stack = LAST_BACKTRACE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_default();
        Self { message, stack }
    }
}

impl fmt::Display for Panicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, stack is {}", self.message, self.stack)
    }
}

/// `spawn_blocking` with the closure's panic caught and returned.
pub async fn run_blocking<F, T>(f: F) -> Result<T, Panicked>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let joined = tokio::task::spawn_blocking(move || {
        LAST_BACKTRACE.with(|slot| slot.borrow_mut().take());
        panic::catch_unwind(AssertUnwindSafe(f)).map_err(Panicked::from_payload)
    })
    .await;

    match joined {
        Ok(result) => result,
        Err(e) => Err(Panicked {
            message: e.to_string(),
            stack: String::new(),
        }),
    }
}
