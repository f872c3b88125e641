//! Identity: accounts, sessions and the employee/account linking flows.

pub mod bootstrap;
pub mod handlers;
pub mod login;
pub mod password;
pub mod registration;
pub mod session;
pub mod token;
