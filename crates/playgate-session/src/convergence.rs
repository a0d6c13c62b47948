//! The convergence rule: three sub-statuses in, at most one outcome out.
//!
//! Evaluated in a fixed priority order:
//!
//! ```text
//! 1. any Working                                  → Pending
//! 2. all Success                                  → Success
//! 3. server Success and (login or oauth Cancel)   → Cancelled
//! 4. server Failure                               → Failure
//! 5. anything else                                → Unclassified
//! ```
//!
//! `Unclassified` covers triples such as `serverAuth == Cancel` or a login
//! failure paired with a successful handshake. Nothing is notified for
//! them; the session logs a warning instead.

use std::fmt;

use playgate_protocol::LoginResult;

use crate::session::{StatusTriple, SubStatus};

/// What the convergence rule decided for one triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convergence {
    /// At least one stage is still running.
    Pending,
    /// All three stages succeeded.
    Success,
    /// The handshake went through but the user declined identity linking.
    Cancelled,
    /// The handshake failed.
    Failure,
    /// Terminal, but not covered by any rule.
    Unclassified,
}

impl Convergence {
    /// The host notification this verdict produces, if any.
    pub fn login_result(self) -> Option<LoginResult> {
        match self {
            Self::Success => Some(LoginResult::Success),
            Self::Cancelled => Some(LoginResult::Cancel),
            Self::Failure => Some(LoginResult::Failure),
            Self::Pending | Self::Unclassified => None,
        }
    }
}

impl fmt::Display for Convergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Success => write!(f, "Success"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Failure => write!(f, "Failure"),
            Self::Unclassified => write!(f, "Unclassified"),
        }
    }
}

/// Applies the rule to `triple`.
///
/// ```rust
/// use playgate_session::{Convergence, StatusTriple, SubStatus, converge};
///
/// let triple = StatusTriple::new(SubStatus::Cancel, SubStatus::Cancel, SubStatus::Success);
/// assert_eq!(converge(triple), Convergence::Cancelled);
/// ```
pub fn converge(triple: StatusTriple) -> Convergence {
    use SubStatus as S;

    match (triple.login, triple.oauth, triple.server_auth) {
        (S::Working, _, _) | (_, S::Working, _) | (_, _, S::Working) => {
            Convergence::Pending
        }
        (S::Success, S::Success, S::Success) => Convergence::Success,
        (S::Cancel, _, S::Success) | (_, S::Cancel, S::Success) => {
            Convergence::Cancelled
        }
        (_, _, S::Failure) => Convergence::Failure,
        _ => Convergence::Unclassified,
    }
}
