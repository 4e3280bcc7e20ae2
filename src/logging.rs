//! Log subscriber setup for the `soil` binary.
//!
//! The library only emits `tracing` events. `RUST_LOG` wins when set;
//! otherwise `-v` selects debug and `-vv` trace. Output goes to stderr so
//! reports on stdout stay pipeable.

use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "soil_series=warn",
        1 => "soil_series=debug",
        _ => "soil_series=trace",
    }
}

/// Install the global fmt subscriber. A second call is a no-op.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
