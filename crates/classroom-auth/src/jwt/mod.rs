//! Signed session tokens.

pub mod claims;
pub mod codec;

pub use claims::{Claims, TokenUse};
pub use codec::{IssuedPair, TokenCodec, TokenError};
