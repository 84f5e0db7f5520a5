//! Subscriber set-up for the binary.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install an env-filtered fmt subscriber on stderr.
///
/// `RUST_LOG` overrides the default `probwave=info`. Calling this twice is
/// harmless: the second installation attempt is ignored.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "probwave=info".into()),
        )
        .try_init();
}
