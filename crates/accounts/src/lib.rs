//! User accounts: persistence and password hashing.

pub mod password;
pub mod users;
