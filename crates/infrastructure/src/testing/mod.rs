//! Response verification.
//!
//! The assertion chain, the header and body matchers it evaluates, and
//! the exchange dump used to inspect a failing exchange.

mod chain;
mod dump;
mod matchers;

pub use chain::{AssertionChain, AssertionFailure, ChainError, ChainState, verify};
pub use dump::{ExchangeDump, UNDECODABLE, dump};
pub use matchers::{BodyJsonMatcher, BodyTextMatcher, HeaderMatcher, JsonPredicate};
