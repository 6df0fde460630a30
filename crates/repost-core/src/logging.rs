use crate::Result;

/// Initialize tracing for the relay.
///
/// Defaults to info for our crates; override with `RUST_LOG`.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,repost=info,repost_core=info,repost_telegram=info,\
repost_redis=info,{service_name}=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .map_err(|e| crate::Error::External(format!("logging init failed: {e}")))?;

    Ok(())
}
