//! Request middleware, written as plain async functions for
//! [`actix_web_lab::middleware::from_fn`].
//!
//! The application runs two chains. The standard chain wraps everything:
//! [`recover_panic`] → `TracingLogger` + [`log_request`] → [`secure_headers`].
//! The dynamic chain wraps the HTML pages: the session middleware built by
//! [`SessionLayer`] → [`verify_csrf`] → [`crate::authentication::authenticate`].

mod csrf;
mod log_request;
mod recover;
mod secure_headers;
mod session;

pub use csrf::{verify_csrf, CsrfToken, CSRF_FIELD, CSRF_HEADER};
pub use log_request::log_request;
pub use recover::{recover_panic, DebugMode};
pub use secure_headers::{secure_headers, set_security_headers};
pub use session::{MemorySessionStore, SessionLayer};

/// Wrap a service in a list of middleware, given outermost first.
///
/// `compose!(a, b, c => app)` expands to `app.wrap(c).wrap(b).wrap(a)`, so a
/// request passes through `a`, then `b`, then `c` before reaching `app`.
#[macro_export]
macro_rules! compose {
    (=> $target:expr) => {
        $target
    };
    ($outer:expr $(, $inner:expr)* => $target:expr) => {
        $crate::compose!($($inner),* => $target).wrap($outer)
    };
}
