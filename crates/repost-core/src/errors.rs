/// Core error type for the relay.
///
/// Adapter crates map their specific errors (Telegram, Redis) into this type so the
/// relay can tell a store outage apart from a failed delivery.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("outbound delivery failed: {0}")]
    OutboundDeliveryFailed(String),

    #[error("chat {0} cannot subscribe to itself")]
    SelfSubscription(i64),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
