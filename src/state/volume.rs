//! Volume held by the front end across song changes.

/// Decibel bounds offered by the volume control for one clip.
///
/// The lower bound is the midpoint of the clip's gain range, which the
/// engine treats as mute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    /// Mute setting.
    pub floor: f64,
    /// Loudest setting.
    pub ceiling: f64,
}

impl ControlRange {
    /// Derives the control range from a clip's gain bounds.
    #[must_use]
    pub fn from_gain_bounds(min: f64, max: f64) -> Self {
        Self {
            floor: (min + max) / 2.0,
            ceiling: max,
        }
    }

    /// First-use volume: 70% of the way from floor to ceiling.
    #[must_use]
    pub fn default_level(&self) -> f64 {
        self.ceiling * 0.7 + self.floor * 0.3
    }

    /// Clamps `decibels` into the range.
    #[must_use]
    pub fn clamp(&self, decibels: f64) -> f64 {
        decibels.clamp(self.floor, self.ceiling)
    }
}

/// The user's chosen volume, unset until the first song is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VolumeState {
    level: Option<f64>,
}

impl VolumeState {
    /// The stored level, if any.
    #[must_use]
    pub fn level(&self) -> Option<f64> {
        self.level
    }

    /// Stores `decibels` clamped into `range` and returns the stored value.
    ///
    /// NaN leaves the current level in place.
    pub fn set(&mut self, decibels: f64, range: ControlRange) -> f64 {
        let decibels = if decibels.is_nan() {
            self.level.unwrap_or_else(|| range.default_level())
        } else {
            decibels
        };
        let level = range.clamp(decibels);
        self.level = Some(level);
        level
    }

    /// Level to apply to a newly loaded clip.
    ///
    /// Defaults on first use and otherwise clamps the stored level into the
    /// new clip's range. The result is stored.
    pub fn level_for(&mut self, range: ControlRange) -> f64 {
        let level = self.level.unwrap_or_else(|| range.default_level());
        self.set(level, range)
    }
}
