//! Courier HTTP API.
//!
//! Endpoints:
//! - POST   /api/auth/register — Create an account, send a welcome email
//! - POST   /api/auth/login — Exchange credentials for a JWT
//! - DELETE /api/auth/delete/{email} — Delete own account
//! - POST   /api/message/send-email — Email an explicit address
//! - POST   /api/message/send-sms — Text an explicit number
//! - POST   /api/message/notify-user — Notify a user on their preferred channel

pub mod middleware;
pub mod notify;
pub mod routes;
pub mod state;
