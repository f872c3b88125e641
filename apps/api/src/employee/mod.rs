//! Employee self-service API. Every route acts on the caller's own record,
//! identified by the session credential.

pub mod handlers;
