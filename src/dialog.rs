//! Per-session dialogue controller: states, decoded events, replies and the handlers that map
//! one to the other.

pub(crate) mod event;
pub(crate) mod handlers;
pub(crate) mod machine;
pub(crate) mod reply;
pub(crate) mod session;
pub(crate) mod state;
