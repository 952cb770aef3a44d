//! Southbound change feeds.
//!
//! One feed per consumer class. A poller holding version `v` asks whether
//! anything exists at or after `v`, then asks what to replay for `v` and
//! where to poll next. Delivery is at-least-once: the same `(method, uri)`
//! may be handed out again and pollers replay it idempotently.

mod change_feed;
pub use change_feed::*;
