//! In-process credential maps partitioned by visitor.
//!
//! [`RefreshTokenStore`] keeps one long-lived refresh credential per visitor for the life of the
//! process. [`AccessTokenCache`] keeps one short-lived access credential per visitor together with
//! the instant it stops being servable. Both are cheap to clone handles over a shared
//! `parking_lot::RwLock<HashMap<..>>`; locks are never held across an `.await`.

pub mod cache;
pub mod refresh;

pub use cache::{AccessTokenCache, CachedAccessToken};
pub use refresh::RefreshTokenStore;
