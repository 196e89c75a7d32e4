//! Gate pass core: id generation, the request lifecycle, gate verification
//! and the role-specific listings. Every operation takes the store by
//! reference; nothing here holds global state.

pub mod ids;
pub mod lifecycle;
pub mod query;
pub mod verify;

pub use lifecycle::{decide, submit};
pub use verify::{verify, Verification};
