//! Messenger abstractions: inbound events and the outbound notifier/forwarder port.

pub mod port;
pub mod timeout;
pub mod types;
