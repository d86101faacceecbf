//! Logging shim.
//!
//! With the `tracing` feature enabled the macros below are `tracing`'s own.
//! Without it they expand to nothing, so the allocation paths stay free of
//! any logging cost on targets that do not want it.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop {
    macro_rules! trace {
        ($($arg:tt)*) => {{}};
    }

    macro_rules! debug {
        ($($arg:tt)*) => {{}};
    }

    // Not named `warn`: that name is taken by the built-in lint attribute.
    macro_rules! warn_event {
        ($($arg:tt)*) => {{}};
    }

    pub(crate) use {debug, trace, warn_event};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop::{debug, trace, warn_event as warn};
