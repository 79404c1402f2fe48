//! Middleware stack.

pub mod cors;
pub mod gate;
pub mod logging;
pub mod transaction;

pub use gate::guard;
pub use transaction::TxSlot;
