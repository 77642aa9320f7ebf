//! Account management functionality
//!
//! This module owns the master secret and the session that decides which
//! derived account operations act on by default.

mod seed;
mod session;

pub use seed::*;
pub use session::*;
