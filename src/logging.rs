use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Registry,
};

/// Sets up stderr logging. `RUST_LOG` wins over `default_level`; a second call is a no-op.
pub fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    if let Err(e) = Registry::default().with(env_filter).with(stderr_layer).try_init() {
        tracing::debug!("Tracing already initialized: {}", e);
    }
}
