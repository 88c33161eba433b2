use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing output. Safe to call more than once; later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "teamdesk=debug,info".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}
