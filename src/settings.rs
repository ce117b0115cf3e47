//! Display settings and tunables
//!
//! Persisted in LocalStorage on the web, read from a JSON file natively.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::ShapeConfig;

/// Errors raised while loading or validating settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl SettingsError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SettingsError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Next preset, wrapping from High back to Low
    pub fn next(self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Point-cloud size for this preset
    pub fn particle_count(&self) -> usize {
        match self {
            QualityPreset::Low => 12_000,
            QualityPreset::Medium => 25_000,
            QualityPreset::High => PARTICLE_COUNT,
        }
    }
}

/// Display settings/tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Counts (fixed for a session) ===
    pub particle_count: usize,
    pub ornament_count: usize,

    // === Smoothing rates (per second) ===
    pub particle_blend_rate: f32,
    pub ornament_blend_rate: f32,
    pub camera_blend_rate: f32,

    // === Camera ===
    pub camera_depth: f32,
    pub camera_fov_degrees: f32,

    // === Geometry ===
    pub shape: ShapeConfig,

    // === Dressing ===
    /// Radial glow behind the sigil
    pub background_glow: bool,
    /// Glow disc at the center when formed
    pub core_glow: bool,

    /// Fixed shape seed (random per session when unset)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,

            particle_count: PARTICLE_COUNT,
            ornament_count: ORNAMENT_COUNT,

            particle_blend_rate: PARTICLE_BLEND_RATE,
            ornament_blend_rate: ORNAMENT_BLEND_RATE,
            camera_blend_rate: CAMERA_BLEND_RATE,

            camera_depth: CAMERA_DEPTH,
            camera_fov_degrees: CAMERA_FOV_DEGREES,

            shape: ShapeConfig::default(),

            background_glow: true,
            core_glow: true,

            seed: None,
        }
    }
}

impl Settings {
    /// Apply a quality preset (updates the particle count)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.particle_count = preset.particle_count();
    }

    /// Advance to the next quality preset and return it
    pub fn cycle_quality(&mut self) -> QualityPreset {
        let preset = self.quality.next();
        self.apply_preset(preset);
        preset
    }

    /// Check every tunable the engine relies on
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.particle_count == 0 {
            return Err(SettingsError::invalid("particle_count", "must be at least 1"));
        }
        if self.ornament_count == 0 {
            return Err(SettingsError::invalid("ornament_count", "must be at least 1"));
        }

        let rates = [
            ("particle_blend_rate", self.particle_blend_rate),
            ("ornament_blend_rate", self.ornament_blend_rate),
            ("camera_blend_rate", self.camera_blend_rate),
        ];
        for (field, rate) in rates {
            if !rate.is_finite() || rate < 0.0 {
                return Err(SettingsError::invalid(field, format!("{rate} is not a rate")));
            }
        }

        if !(self.camera_fov_degrees > 0.0 && self.camera_fov_degrees < 180.0) {
            return Err(SettingsError::invalid(
                "camera_fov_degrees",
                format!("{} is outside (0, 180)", self.camera_fov_degrees),
            ));
        }
        if !(self.camera_depth > 0.0) {
            return Err(SettingsError::invalid("camera_depth", "must be positive"));
        }

        let shape = &self.shape;
        let radii = [
            ("shape.chaos_radius", shape.chaos_radius),
            ("shape.outer_radius", shape.outer_radius),
            ("shape.inner_radius", shape.inner_radius),
            ("shape.core_ring_radius", shape.core_ring_radius),
            ("shape.dust_radius", shape.dust_radius),
            ("shape.moon.body_radius", shape.moon.body_radius),
            ("shape.moon.cutout_radius", shape.moon.cutout_radius),
        ];
        for (field, r) in radii {
            if !(r.is_finite() && r > 0.0) {
                return Err(SettingsError::invalid(field, format!("radius {r} must be positive")));
            }
        }

        let finite = [
            ("shape.size_min", shape.size_min),
            ("shape.size_max", shape.size_max),
            ("shape.spin_min", shape.spin_min),
            ("shape.spin_max", shape.spin_max),
            ("shape.ornament_chaos_extent.x", shape.ornament_chaos_extent.x),
            ("shape.ornament_chaos_extent.y", shape.ornament_chaos_extent.y),
            ("shape.ornament_chaos_extent.z", shape.ornament_chaos_extent.z),
            ("shape.moon.body_center.x", shape.moon.body_center.x),
            ("shape.moon.body_center.y", shape.moon.body_center.y),
            ("shape.moon.cutout_center.x", shape.moon.cutout_center.x),
            ("shape.moon.cutout_center.y", shape.moon.cutout_center.y),
        ];
        for (field, v) in finite {
            if !v.is_finite() {
                return Err(SettingsError::invalid(field, format!("{v} is not finite")));
            }
        }
        if shape.ornament_chaos_extent.min_element() < 0.0 {
            return Err(SettingsError::invalid(
                "shape.ornament_chaos_extent",
                "extents must not be negative",
            ));
        }

        if !(shape.size_min > 0.0 && shape.size_min <= shape.size_max) {
            return Err(SettingsError::invalid("shape.size_min", "must be in (0, size_max]"));
        }
        if !(shape.spin_min >= 0.0 && shape.spin_min <= shape.spin_max) {
            return Err(SettingsError::invalid("shape.spin_min", "must be in [0, spin_max]"));
        }
        if shape.moon.max_attempts == 0 {
            return Err(SettingsError::invalid("shape.moon.max_attempts", "must be at least 1"));
        }

        // The crescent must keep some body outside the cutout
        let moon = &shape.moon;
        let gap = moon.body_center.distance(moon.cutout_center);
        if gap + moon.body_radius <= moon.cutout_radius {
            return Err(SettingsError::invalid(
                "shape.moon.cutout_radius",
                "cutout covers the whole moon body",
            ));
        }

        Ok(())
    }

    /// Parse and validate settings from JSON
    ///
    /// Without an explicit `particle_count` the quality preset decides it.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let explicit_count = value.get("particle_count").is_some();
        let mut settings: Settings = serde_json::from_value(value)?;
        if !explicit_count {
            settings.apply_preset(settings.quality);
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sakura_sigil_settings";

    /// Environment variable naming a native settings file
    pub const PATH_ENV: &'static str = "SAKURA_SIGIL_SETTINGS";
    /// Native settings file used when the environment variable is unset
    pub const DEFAULT_PATH: &'static str = "sakura_sigil.json";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Could not save settings: {}", e),
            }
        }
    }

    /// Read settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from the configured file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let path = std::env::var(Self::PATH_ENV).unwrap_or_else(|_| Self::DEFAULT_PATH.to_string());
        if !std::path::Path::new(&path).exists() {
            log::info!("Using default settings");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path, e);
                Self::default()
            }
        }
    }
}
