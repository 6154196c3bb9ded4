//! GraphChat: a desktop chat client for a knowledge-graph agent service.
//!
//! The interesting part is not the chrome but the request lifecycle:
//! [`session`] owns the append-only transcript and the single-pending
//! submit state machine, [`processing`] runs the async request cycles
//! over it, and [`services`] talks to the two backend endpoints.

pub mod clipboard;
pub mod components;
pub mod processing;
pub mod services;
pub mod session;
pub mod settings;
