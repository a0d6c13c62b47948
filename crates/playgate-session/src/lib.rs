//! Authentication session state for Playgate.
//!
//! This crate holds everything about an attempt that is not I/O:
//!
//! 1. **State**: the [`AuthSession`] record and the [`SubStatus`] of each
//!    of the three stages
//! 2. **Convergence**: the rule that turns a [`StatusTriple`] into at most
//!    one host notification ([`converge`])
//! 3. **Collaborator**: the [`IdentityProvider`] trait the host implements
//!
//! # How it fits in the stack
//!
//! ```text
//! Engine Layer (above)  ← owns one AuthSession, feeds it StatusUpdates
//!     ↕
//! Session Layer (this crate)  ← state, convergence rule, provider trait
//!     ↕
//! Protocol Layer (below)  ← HandshakeRequest, ServerPlayer, LoginResult
//! ```
//!
//! Nothing in here is synchronized. The engine keeps the session inside a
//! single task, which is what makes "mutate, then evaluate" atomic.

#![allow(async_fn_in_trait)]

mod convergence;
mod error;
mod provider;
mod session;

pub use convergence::{Convergence, converge};
pub use error::SessionError;
pub use provider::{
    IdentityProvider, LoginInfo, Resolution, ResolutionStage, SignIn, token_scope,
};
pub use session::{
    AttemptParams, AuthSession, NULL_TOKEN_SENTINEL, SessionSnapshot, StatusTriple,
    StatusUpdate, SubStatus, is_token_present,
};
