use crate::config::{DimensionConfig, DimensionProfile};

use super::Size;

/// Used only when a config carries no level profiles at all.
const FALLBACK_PROFILE: DimensionProfile = DimensionProfile {
    char_width: 7.0,
    padding: 32.0,
    min_width: 140.0,
    max_width: 240.0,
    height: 60.0,
};

/// Box for a node at `level` whose label is `text_length` characters long.
pub fn estimate(level: usize, text_length: usize, config: &DimensionConfig) -> Size {
    if level == 0 {
        return Size {
            width: config.root_width,
            height: config.root_height,
        };
    }
    let profile = profile_for(level, config);
    let raw = text_length as f32 * profile.char_width + profile.padding;
    // max() last so an inverted min/max pair cannot panic like clamp would.
    let width = raw.min(profile.max_width).max(profile.min_width);
    Size {
        width,
        height: profile.height,
    }
}

pub fn estimate_label(level: usize, label: &str, config: &DimensionConfig) -> Size {
    estimate(level, label.chars().count(), config)
}

fn profile_for(level: usize, config: &DimensionConfig) -> &DimensionProfile {
    let idx = level.saturating_sub(1);
    config
        .profiles
        .get(idx)
        .or_else(|| config.profiles.last())
        .unwrap_or(&FALLBACK_PROFILE)
}
