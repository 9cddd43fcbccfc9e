//! Single-producer, multi-consumer "latest value" broadcast
//!
//! A [`BroadcastHub`] decouples one producer from any number of independent
//! consumers, each progressing at its own pace.
//!
//! # Delivery model
//!
//! ```text
//!  update(v) ──► hub state (closed, latest)
//!                    │  under one lock
//!                    ▼
//!      ┌─────────────┼─────────────┐
//!      ▼             ▼             ▼
//!  [slot cap 1]  [slot cap 1]  [slot cap 1]   one per subscription
//!      │             │             │
//!  Subscription  Subscription  Subscription
//! ```
//!
//! - Every subscription owns a single "latest pending value" slot. A new
//!   update overwrites the slot instead of queueing behind it, so a slow
//!   consumer never grows memory and observes the most recent value when it
//!   next checks, possibly skipping intermediate ones.
//! - A new subscription immediately yields the current value (if any), then
//!   every value published after it registered.
//! - `update` and `subscribe` are serialized: a subscription created
//!   concurrently with an update sees that update exactly once, either as its
//!   initial value or as its first change.
//! - Closing releases every subscription (pending values are still drained)
//!   and rejects further `update`/`subscribe` calls.
//! - Subscriptions unregister themselves when dropped.

mod hub;


pub use hub::*;
