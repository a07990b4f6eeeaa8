// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tracing subscriber set-up.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the config names one
pub const DEFAULT_FILTER: &str = "splice_editor=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `filter` when set. Fails if a global subscriber
/// is already installed.
pub fn init(filter: &str) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
