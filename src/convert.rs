//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Result, bail};

use drisk_ensemble::DifferencerConfig;
use drisk_frequency::YearSpan;
use drisk_io::{Compression, WriterConfig};

use crate::config::{SnapshotToml, TcToml, YearSpanToml};

/// How flood tiles are combined into one hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// One hazard per tile, stacked along the event axis.
    Concat,
    /// Pixel-wise maximum across tiles, one event per return period.
    Max,
}

/// Parses a compression algorithm name string into the corresponding enum variant.
pub fn parse_compression(s: &str) -> Result<Compression> {
    match s.to_lowercase().as_str() {
        "none" => Ok(Compression::None),
        "snappy" => Ok(Compression::Snappy),
        "zstd" => Ok(Compression::Zstd),
        other => bail!("unknown compression: {other:?}"),
    }
}

/// Parses a tile merge strategy name.
pub fn parse_merge(s: &str) -> Result<MergeStrategy> {
    match s.to_lowercase().as_str() {
        "concat" => Ok(MergeStrategy::Concat),
        "max" => Ok(MergeStrategy::Max),
        other => bail!("unknown merge strategy: {other:?}"),
    }
}

/// Converts the `year_span` setting into a [`YearSpan`].
pub fn parse_year_span(span: &YearSpanToml) -> Result<YearSpan> {
    match span {
        YearSpanToml::Years(0) => bail!("year_span must be positive"),
        YearSpanToml::Years(n) => Ok(YearSpan::Fixed(*n)),
        YearSpanToml::Mode(m) if m.eq_ignore_ascii_case("derived") => Ok(YearSpan::Derived),
        YearSpanToml::Mode(other) => {
            bail!("year_span must be \"derived\" or a number of years, got {other:?}")
        }
    }
}

/// Builds a [`WriterConfig`] from the TOML snapshot configuration.
pub fn build_writer_config(snapshot: &SnapshotToml) -> Result<WriterConfig> {
    let compression = parse_compression(&snapshot.compression)?;
    Ok(WriterConfig::default()
        .with_compression(compression)
        .with_row_group_size(snapshot.row_group_size))
}

/// Builds a [`DifferencerConfig`] from the TOML TC configuration.
///
/// Future periods are the keys of `period_tags`.
pub fn build_differencer_config(tc: &TcToml) -> Result<DifferencerConfig> {
    if tc.period_tags.is_empty() {
        bail!("[tc].period_tags must name at least one future period");
    }
    Ok(DifferencerConfig::default()
        .with_reference_model(&tc.reference)
        .with_future_periods(tc.period_tags.keys().cloned().collect()))
}

/// Checks that a return-period list is usable for aggregation.
pub fn check_return_periods(rps: &[u32], key: &str) -> Result<()> {
    if rps.is_empty() {
        bail!("{key} is empty");
    }
    if rps.contains(&0) {
        bail!("{key} contains 0");
    }
    if rps.windows(2).any(|w| w[0] >= w[1]) {
        bail!("{key} must be strictly ascending");
    }
    Ok(())
}
