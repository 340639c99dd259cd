//! Token secrets and the parsed result of a successful exchange.

pub mod grant;
pub mod secret;
