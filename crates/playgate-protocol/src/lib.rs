//! Wire protocol for Playgate.
//!
//! This crate defines everything that crosses a process boundary:
//!
//! - **Types** ([`HandshakeRequest`], [`ServerPlayer`], [`HostEvent`],
//!   [`LoginResult`]): the backend handshake bodies and the events
//!   delivered to the host.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those bodies are
//!   converted to/from bytes.
//! - **Cookies** ([`session_token_from`]): how the session token is read
//!   out of the backend's `Set-Cookie` headers.
//! - **Errors** ([`ProtocolError`]): what can go wrong in all of the above.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes + headers) → Protocol (typed bodies) → Session (auth state)
//! ```
//!
//! The protocol layer knows nothing about HTTP clients or auth attempts.
//! It only knows the exact shape of the one backend exchange.

mod codec;
mod cookie;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use cookie::{SessionCookie, parse_set_cookie, session_token_from};
pub use error::ProtocolError;
pub use types::{
    EVENT_LOGIN_RESULT, EVENT_PLAYER_CHANGE, HandshakeRequest, HostEvent,
    LoginResult, ServerPlayer,
};
