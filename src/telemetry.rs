use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// `RUST_LOG` wins over `env_filter` when it is set.
pub fn get_subscriber(env_filter: &str) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    Registry::default()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), SetGlobalDefaultError> {
    set_global_default(subscriber)
}
