//! YAML configuration for the shell.
//!
//! A config file only needs the keys it changes: it is merged over the
//! preset of its profile (desktop or mobile) before validation. Files are
//! looked up XDG style under `quantum-os/config.yaml`.

use crate::animation::{BoundaryMode, SurfaceConfig, MAX_SURFACE_EXTENT, MAX_WAVE_SAMPLES};
use crate::error::ConfigError;
use crate::panel::PanelKind;
use qos_core::Color;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Device variant. Selects the preset a config is merged over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Desktop,
    Mobile,
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            other => Err(ConfigError::Invalid(format!("unknown profile '{other}'"))),
        }
    }
}

/// Periods of the three refresh activities, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CadenceConfig {
    pub animation_ms: u64,
    pub clock_ms: u64,
    pub widget_refresh_ms: u64,
}

/// Complete shell configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    pub profile: Profile,
    /// Drawn over the animation and in the status bar.
    pub title: String,
    /// Fixed seed for telemetry and motion; random when absent.
    pub seed: Option<u64>,
    pub surface: SurfaceConfig,
    pub cadence: CadenceConfig,
    /// Home screen widgets in display order.
    pub panels: Vec<PanelKind>,
    pub panel_columns: usize,
    /// Pending foreground posts before new ones are dropped.
    pub queue_capacity: usize,
    /// Chat transcript lines kept.
    pub chat_history: usize,
    /// `#rrggbb`
    pub accent: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::desktop()
    }
}

impl ShellConfig {
    #[must_use]
    pub fn desktop() -> Self {
        Self {
            profile: Profile::Desktop,
            title: "Quantum OS".to_string(),
            seed: None,
            surface: SurfaceConfig::default(),
            cadence: CadenceConfig {
                animation_ms: 50,
                clock_ms: 1000,
                widget_refresh_ms: 3000,
            },
            panels: PanelKind::ALL.to_vec(),
            panel_columns: 3,
            queue_capacity: 16,
            chat_history: 12,
            accent: "#00e5ff".to_string(),
        }
    }

    #[must_use]
    pub fn mobile() -> Self {
        Self {
            profile: Profile::Mobile,
            surface: SurfaceConfig {
                width: 360.0,
                height: 200.0,
                particle_count: 20,
                wave_count: 2,
                boundary: BoundaryMode::Bounce,
                ..SurfaceConfig::default()
            },
            cadence: CadenceConfig {
                animation_ms: 40,
                clock_ms: 1000,
                widget_refresh_ms: 5000,
            },
            panels: vec![
                PanelKind::Weather,
                PanelKind::Health,
                PanelKind::Finance,
                PanelKind::News,
            ],
            panel_columns: 2,
            chat_history: 8,
            ..Self::desktop()
        }
    }

    #[must_use]
    pub fn preset(profile: Profile) -> Self {
        match profile {
            Profile::Desktop => Self::desktop(),
            Profile::Mobile => Self::mobile(),
        }
    }

    /// Candidate config files, most specific first.
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("quantum-os/config.yaml"));
        }
        if let Ok(home) = std::env::var("HOME") {
            paths.push(PathBuf::from(home).join(".config/quantum-os/config.yaml"));
        }
        paths
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit `path` must exist. Otherwise the first XDG candidate that
    /// exists is used, and the preset when there is none. `profile`, when
    /// given, overrides the file's own profile.
    pub fn load(path: Option<&Path>, profile: Option<Profile>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load_from_file(path, profile);
        }
        for candidate in Self::config_paths() {
            if candidate.exists() {
                return Self::load_from_file(&candidate, profile);
            }
        }
        debug!("no config file found, using built-in preset");
        Ok(Self::preset(profile.unwrap_or_default()))
    }

    pub fn load_from_file(path: &Path, profile: Option<Profile>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_with_profile(&contents, profile)?;
        info!(path = %path.display(), profile = ?config.profile, "loaded config");
        Ok(config)
    }

    /// Parse a (possibly partial) YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Self::from_yaml_with_profile(text, None)
    }

    pub fn from_yaml_with_profile(text: &str, profile: Option<Profile>) -> Result<Self, ConfigError> {
        let mut overlay: Value = serde_yaml_ng::from_str(text)?;
        if overlay.is_null() {
            overlay = Value::Mapping(serde_yaml_ng::Mapping::new());
        }
        if !overlay.is_mapping() {
            return Err(ConfigError::Invalid("config must be a YAML mapping".to_string()));
        }

        let profile = match (profile, overlay.get("profile")) {
            (Some(profile), _) => profile,
            (None, Some(value)) => serde_yaml_ng::from_value(value.clone())?,
            (None, None) => Profile::default(),
        };
        if let Value::Mapping(map) = &mut overlay {
            map.remove("profile");
        }

        let mut merged = serde_yaml_ng::to_value(Self::preset(profile))?;
        merge(&mut merged, overlay);
        let config: Self = serde_yaml_ng::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Commented default document, as printed by `--dump-config`.
    pub fn default_yaml() -> Result<String, ConfigError> {
        let body = Self::desktop().to_yaml()?;
        Ok(format!(
            "# Quantum OS configuration\n\
             # Place at $XDG_CONFIG_HOME/quantum-os/config.yaml (or ~/.config/quantum-os/config.yaml).\n\
             # Every key is optional; missing keys come from the profile preset.\n\n{body}"
        ))
    }

    /// Accent colour parsed from its hex string.
    pub fn accent_color(&self) -> Result<Color, ConfigError> {
        Color::from_hex(&self.accent)
            .map_err(|e| ConfigError::Invalid(format!("accent '{}': {e}", self.accent)))
    }

    /// Reject values the shell cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        let s = &self.surface;

        if !(s.width.is_finite() && s.height.is_finite() && s.width > 0.0 && s.height > 0.0) {
            return invalid("surface width and height must be positive");
        }
        if s.width > MAX_SURFACE_EXTENT || s.height > MAX_SURFACE_EXTENT {
            return invalid("surface width and height must be at most 100000");
        }
        if s.particle_count > 10_000 || s.wave_count > 64 {
            return invalid("too many particles or waves");
        }
        if !(s.max_speed.is_finite() && s.max_speed >= 0.0 && s.jitter.is_finite() && s.jitter >= 0.0) {
            return invalid("max_speed and jitter must be non-negative");
        }
        if !(0.0..=1.0).contains(&s.tunneling_probability) {
            return invalid("tunneling_probability must lie in [0, 1]");
        }
        if !(s.wave_step.is_finite() && s.wave_step > 0.0) {
            return invalid("wave_step must be positive");
        }
        if s.width / s.wave_step > MAX_WAVE_SAMPLES as f32 {
            return invalid("wave_step too small for the surface width");
        }
        let c = &self.cadence;
        if c.animation_ms == 0 || c.clock_ms == 0 || c.widget_refresh_ms == 0 {
            return invalid("cadence intervals must be at least 1 ms");
        }
        if self.panels.is_empty() {
            return invalid("at least one panel is required");
        }
        if self.panel_columns == 0 {
            return invalid("panel_columns must be at least 1");
        }
        if self.queue_capacity == 0 {
            return invalid("queue_capacity must be at least 1");
        }
        if self.chat_history < 2 {
            return invalid("chat_history must be at least 2");
        }
        self.accent_color().map(|_| ())
    }
}

/// Overlay `overlay` onto `base`, recursing into mappings.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        ShellConfig::desktop().validate().unwrap();
        ShellConfig::mobile().validate().unwrap();
    }

    #[test]
    fn test_presets_differ_where_expected() {
        let desktop = ShellConfig::desktop();
        let mobile = ShellConfig::mobile();
        assert_eq!(desktop.cadence.animation_ms, 50);
        assert_eq!(mobile.cadence.animation_ms, 40);
        assert_eq!(desktop.cadence.widget_refresh_ms, 3000);
        assert_eq!(mobile.cadence.widget_refresh_ms, 5000);
        assert_eq!(desktop.surface.boundary, BoundaryMode::Wrap);
        assert_eq!(mobile.surface.boundary, BoundaryMode::Bounce);
        assert_eq!(mobile.title, desktop.title);
    }

    #[test]
    fn test_empty_yaml_is_desktop_preset() {
        assert_eq!(ShellConfig::from_yaml("").unwrap(), ShellConfig::desktop());
    }

    #[test]
    fn test_partial_yaml_merges_over_profile_preset() {
        let yaml = "profile: mobile\nseed: 42\nsurface:\n  particle_count: 7\n";
        let config = ShellConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.profile, Profile::Mobile);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.surface.particle_count, 7);
        assert_eq!(config.surface.width, 360.0);
        assert_eq!(config.cadence.widget_refresh_ms, 5000);
    }

    #[test]
    fn test_cli_profile_overrides_file() {
        let config = ShellConfig::from_yaml_with_profile("profile: mobile\n", Some(Profile::Desktop)).unwrap();
        assert_eq!(config.profile, Profile::Desktop);
        assert_eq!(config.surface.width, 1200.0);
    }

    #[test]
    fn test_default_yaml_round_trips() {
        let text = ShellConfig::default_yaml().unwrap();
        assert!(text.starts_with("# Quantum OS"));
        assert_eq!(ShellConfig::from_yaml(&text).unwrap(), ShellConfig::desktop());
    }

    #[test]
    fn test_invalid_values_rejected() {
        for yaml in [
            "surface:\n  width: 0\n",
            "cadence:\n  clock_ms: 0\n",
            "panels: []\n",
            "accent: nope\n",
            "surface:\n  tunneling_probability: 1.5\n",
            "queue_capacity: 0\n",
            "surface:\n  width: 1.0e30\n",
            "surface:\n  height: 1.0e9\n",
            "surface:\n  wave_step: 1.0e-6\n",
        ] {
            let err = ShellConfig::from_yaml(yaml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{yaml}: {err}");
        }
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = ShellConfig::from_yaml("colour: red\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let err = ShellConfig::from_yaml("surface:\n  particle_cont: 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_non_mapping_rejected() {
        assert!(matches!(
            ShellConfig::from_yaml("- 1\n- 2\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_missing_explicit_path_is_io_error() {
        let err = ShellConfig::load(Some(Path::new("/definitely/not/here.yaml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("qos-config-{}.yaml", std::process::id()));
        fs::write(&path, "title: Lab\npanel_columns: 2\n").unwrap();
        let config = ShellConfig::load(Some(&path), Some(Profile::Mobile)).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(config.title, "Lab");
        assert_eq!(config.panel_columns, 2);
        assert_eq!(config.profile, Profile::Mobile);
    }

    #[test]
    fn test_profile_from_str() {
        assert_eq!("Mobile".parse::<Profile>().unwrap(), Profile::Mobile);
        assert!("tablet".parse::<Profile>().is_err());
    }

    #[test]
    fn test_config_paths_end_with_app_file() {
        for path in ShellConfig::config_paths() {
            assert!(path.ends_with("quantum-os/config.yaml"));
        }
    }
}
