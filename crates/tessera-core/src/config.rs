// crates/tessera-core/src/config.rs
use crate::{Result, TesseraError};
use bitflags::bitflags;
use std::cell::Cell;
use tracing::{debug, warn};

bitflags! {
    /// Legacy behaviours kept for layouts that depend on them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Errata: u32 {
        /// Stretch children along the main axis of a content-sized container
        const STRETCH_FLEX_BASIS = 1;
        /// Absolute children without insets ignore the containing block's padding
        const ABSOLUTE_POSITION_WITHOUT_INSETS_EXCLUDES_PADDING = 1 << 1;
        /// Percent sizes of absolute children resolve against the inner size
        const ABSOLUTE_PERCENT_AGAINST_INNER_SIZE = 1 << 2;
        const ALL = 0x7fff_ffff;
        const CLASSIC = 0x7fff_fffe;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExperimentalFeatures: u32 {
        /// Recompute the flex basis on every pass instead of caching it
        const WEB_FLEX_BASIS = 1;
    }
}

impl std::str::FromStr for Errata {
    type Err = TesseraError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Errata::empty()),
            "stretch-flex-basis" => Ok(Errata::STRETCH_FLEX_BASIS),
            "absolute-position-without-insets-excludes-padding" => {
                Ok(Errata::ABSOLUTE_POSITION_WITHOUT_INSETS_EXCLUDES_PADDING)
            }
            "absolute-percent-against-inner-size" => Ok(Errata::ABSOLUTE_PERCENT_AGAINST_INNER_SIZE),
            "all" => Ok(Errata::ALL),
            "classic" => Ok(Errata::CLASSIC),
            _ => Err(TesseraError::UnknownKeyword {
                kind: "Errata",
                value: s.to_string(),
            }),
        }
    }
}

/// Settings shared by every node that references them.
///
/// Nodes hold an `Rc<Config>`; setters take `&self` so a config can be
/// adjusted between layout passes without re-wiring the tree. Every setter
/// that changes a value bumps `version`, which invalidates cached layouts
/// of the nodes using this config.
#[derive(Debug)]
pub struct Config {
    point_scale_factor: Cell<f32>,
    use_web_defaults: Cell<bool>,
    errata: Cell<Errata>,
    experimental_features: Cell<ExperimentalFeatures>,
    version: Cell<u32>,
    used_in_layout: Cell<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            point_scale_factor: Cell::new(1.0),
            use_web_defaults: Cell::new(false),
            errata: Cell::new(Errata::empty()),
            experimental_features: Cell::new(ExperimentalFeatures::empty()),
            version: Cell::new(0),
            used_in_layout: Cell::new(false),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u32 {
        self.version.get()
    }

    fn bump_version(&self) {
        self.version.set(self.version.get().wrapping_add(1));
        debug!("Config version bumped to {}", self.version.get());
    }

    pub fn point_scale_factor(&self) -> f32 {
        self.point_scale_factor.get()
    }

    /// Device pixels per layout point. Zero disables pixel-grid rounding.
    pub fn set_point_scale_factor(&self, factor: f32) -> Result<()> {
        if !(factor >= 0.0) {
            warn!("Rejected point scale factor {}", factor);
            return Err(TesseraError::InvalidPointScaleFactor(factor));
        }
        if self.point_scale_factor.get() != factor {
            self.point_scale_factor.set(factor);
            self.bump_version();
        }
        Ok(())
    }

    pub fn use_web_defaults(&self) -> bool {
        self.use_web_defaults.get()
    }

    /// Only allowed before the config has taken part in a layout pass.
    pub fn set_use_web_defaults(&self, enabled: bool) -> Result<()> {
        if self.use_web_defaults.get() == enabled {
            return Ok(());
        }
        if self.used_in_layout.get() {
            warn!("Rejected UseWebDefaults change after layout");
            return Err(TesseraError::UseWebDefaultsAfterLayout);
        }
        self.use_web_defaults.set(enabled);
        Ok(())
    }

    pub fn errata(&self) -> Errata {
        self.errata.get()
    }

    pub fn set_errata(&self, errata: Errata) {
        if self.errata.get() != errata {
            self.errata.set(errata);
            self.bump_version();
        }
    }

    pub fn add_errata(&self, errata: Errata) {
        self.set_errata(self.errata.get() | errata);
    }

    pub fn remove_errata(&self, errata: Errata) {
        self.set_errata(self.errata.get() - errata);
    }

    pub fn has_errata(&self, errata: Errata) -> bool {
        self.errata.get().intersects(errata)
    }

    pub fn experimental_features(&self) -> ExperimentalFeatures {
        self.experimental_features.get()
    }

    pub fn is_experimental_feature_enabled(&self, feature: ExperimentalFeatures) -> bool {
        self.experimental_features.get().contains(feature)
    }

    pub fn set_experimental_feature_enabled(&self, feature: ExperimentalFeatures, enabled: bool) {
        if self.is_experimental_feature_enabled(feature) != enabled {
            let mut features = self.experimental_features.get();
            features.set(feature, enabled);
            self.experimental_features.set(features);
            self.bump_version();
        }
    }

    /// Records that a layout pass has read this config.
    pub fn mark_used_in_layout(&self) {
        self.used_in_layout.set(true);
    }

    /// Whether swapping `self` for `other` can change any layout result.
    pub fn update_invalidates_layout(&self, other: &Config) -> bool {
        self.errata() != other.errata()
            || self.experimental_features() != other.experimental_features()
            || self.point_scale_factor() != other.point_scale_factor()
            || self.use_web_defaults() != other.use_web_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_bumps_only_on_change() {
        let config = Config::new();
        assert_eq!(config.version(), 0);

        config.set_point_scale_factor(1.0).unwrap();
        assert_eq!(config.version(), 0);

        config.set_point_scale_factor(2.0).unwrap();
        assert_eq!(config.version(), 1);

        config.set_errata(Errata::CLASSIC);
        config.set_errata(Errata::CLASSIC);
        assert_eq!(config.version(), 2);

        config.set_experimental_feature_enabled(ExperimentalFeatures::WEB_FLEX_BASIS, true);
        assert_eq!(config.version(), 3);
    }

    #[test]
    fn test_negative_scale_factor_rejected() {
        let config = Config::new();
        assert!(matches!(
            config.set_point_scale_factor(-1.0),
            Err(TesseraError::InvalidPointScaleFactor(_))
        ));
        assert!(config.set_point_scale_factor(f32::NAN).is_err());
        assert_eq!(config.point_scale_factor(), 1.0);
    }

    #[test]
    fn test_web_defaults_locked_after_layout() {
        let config = Config::new();
        config.set_use_web_defaults(true).unwrap();
        config.mark_used_in_layout();
        assert!(matches!(
            config.set_use_web_defaults(false),
            Err(TesseraError::UseWebDefaultsAfterLayout)
        ));
        assert!(config.use_web_defaults());
    }

    #[test]
    fn test_classic_errata_excludes_stretch() {
        assert!(!Errata::CLASSIC.contains(Errata::STRETCH_FLEX_BASIS));
        assert!(Errata::CLASSIC.contains(Errata::ABSOLUTE_PERCENT_AGAINST_INNER_SIZE));
        assert_eq!("classic".parse::<Errata>().unwrap(), Errata::CLASSIC);
    }

    #[test]
    fn test_equivalent_configs_do_not_invalidate() {
        let a = Config::new();
        let b = Config::new();
        b.set_point_scale_factor(3.0).unwrap();
        b.set_point_scale_factor(1.0).unwrap();
        assert_ne!(a.version(), b.version());
        assert!(!a.update_invalidates_layout(&b));

        b.add_errata(Errata::STRETCH_FLEX_BASIS);
        assert!(a.update_invalidates_layout(&b));
    }
}
