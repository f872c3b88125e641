//! Admin console API. Every route except login and logout requires an
//! [`AdminSession`](crate::auth::session::AdminSession).

pub mod console;
pub mod departments;
pub mod employees;
