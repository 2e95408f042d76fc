//! The interception and bookkeeping engine.

pub(crate) mod hooks;
pub(crate) mod index;
pub(crate) mod logging;
pub(crate) mod tracking;
