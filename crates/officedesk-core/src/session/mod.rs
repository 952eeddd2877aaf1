//! Session management: who is logged in, for how long, and what that unlocks.
//!
//! This module provides:
//! - `SessionState`: anonymous (`Guest`) or authenticated as an identity
//! - `InactivityTimer`: one-shot auto-logout posted back as a `SessionEvent`
//! - `MenuController`: projects the state onto a `MenuSurface`
//! - `SessionContext`: owns all of the above plus the credential list
//!
//! Everything here runs on the UI thread except the timer task, which only
//! ever sends an event; the UI loop applies it.

pub mod context;
pub mod menu;
pub mod state;
pub mod timer;

pub use context::{AuthOutcome, QuitPolicy, SessionContext, Toggle};
pub use menu::{MenuController, MenuProjection, MenuSurface};
pub use state::{SessionState, GUEST_IDENTITY};
pub use timer::{InactivityTimer, SessionEvent};

#[cfg(test)]
pub(crate) mod testing;
