pub mod request;
pub mod user;

pub use request::{Decision, NewPassRequest, Outcome, PassRequest, RequestStatus, NO_REMARKS};
pub use user::{Role, UserAccount};
