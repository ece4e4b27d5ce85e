use tracing_subscriber::EnvFilter;

/// All workspace crate targets that should receive log output.
const CRATE_TARGETS: &[&str] = &[
    "drisk",
    "drisk_assemble",
    "drisk_calendar",
    "drisk_ensemble",
    "drisk_frequency",
    "drisk_hazard",
    "drisk_impact",
    "drisk_io",
    "drisk_stats",
    "drisk_tiles",
];

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn default_filter(verbosity: u8) -> String {
    let level = level(verbosity);
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing based on CLI verbosity level.
///
/// Mapping:
/// - 0 (none) -> warn
/// - 1 (-v)   -> info
/// - 2 (-vv)  -> debug
/// - 3+ (-vvv)-> trace
///
/// `RUST_LOG` env var overrides the CLI flag if set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_covers_every_crate() {
        let f = default_filter(2);
        for t in CRATE_TARGETS {
            assert!(f.contains(&format!("{t}=debug")));
        }
    }

    #[test]
    fn verbosity_saturates_at_trace() {
        assert_eq!(level(0), "warn");
        assert_eq!(level(7), "trace");
    }
}
