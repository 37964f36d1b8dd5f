use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::carousel::curve::BellCurve;
use crate::processing::shadow::BlurQuality;

/// Supersampling only happens when this variable is set in the environment
/// in addition to `antialiasing.enabled`.
pub const ANTIALIASING_ENV_VAR: &str = "PHOTO_CAROUSEL_AA";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CurveConfig {
    /// Width of the easing bell; larger is steeper.
    pub sigma: f64,
    /// Shifts the bell's peak to `t = -phase`.
    pub phase: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            sigma: BellCurve::DEFAULT_SIGMA,
            phase: BellCurve::DEFAULT_PHASE,
        }
    }
}

impl CurveConfig {
    pub fn build(&self) -> BellCurve {
        BellCurve::new(self.sigma, self.phase)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AntialiasingConfig {
    pub enabled: bool,
    /// Requested jitter passes; snapped to the nearest supported pattern.
    pub samples: usize,
}

impl Default for AntialiasingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            samples: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ShadowConfig {
    /// Blur window in pixels.
    pub radius: u32,
    /// Peak shadow opacity, clamped to `[0, 1]`.
    pub opacity: f32,
    pub color: [u8; 3],
    pub quality: BlurQuality,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            radius: 11,
            opacity: 1.0,
            color: [0, 0, 0],
            quality: BlurQuality::Fast,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LabelConfig {
    /// Caption size in pixels.
    pub font_size: f32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self { font_size: 32.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Root directory to scan recursively for images.
    pub photo_library_path: PathBuf,
    /// Maximum number of concurrent image decodes in the loader.
    pub loader_max_concurrent_decodes: usize,
    /// Render ticks per second.
    pub tick_rate_hz: u32,
    #[serde(with = "humantime_serde")]
    pub slide_duration: Duration,
    #[serde(with = "humantime_serde")]
    pub zoom_duration: Duration,
    pub curve: CurveConfig,
    pub antialiasing: AntialiasingConfig,
    pub shadow: ShadowConfig,
    /// Eye position; the camera always looks at the origin.
    pub camera: [f32; 3],
    pub label: LabelConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            photo_library_path: PathBuf::new(),
            loader_max_concurrent_decodes: 4,
            tick_rate_hz: 60,
            slide_duration: Duration::from_millis(800),
            zoom_duration: Duration::from_millis(400),
            curve: CurveConfig::default(),
            antialiasing: AntialiasingConfig::default(),
            shadow: ShadowConfig::default(),
            camera: [0.0, 0.0, 100.0],
            label: LabelConfig::default(),
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&s)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        // An empty document means "all defaults".
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(mut self) -> Result<Self> {
        ensure!(
            self.loader_max_concurrent_decodes > 0,
            "loader-max-concurrent-decodes must be greater than zero"
        );
        ensure!(self.tick_rate_hz > 0, "tick-rate-hz must be greater than zero");
        ensure!(
            !self.slide_duration.is_zero(),
            "slide-duration must be greater than zero"
        );
        ensure!(
            !self.zoom_duration.is_zero(),
            "zoom-duration must be greater than zero"
        );
        ensure!(
            self.curve.sigma.is_finite() && self.curve.phase.is_finite(),
            "curve parameters must be finite"
        );
        ensure!(
            self.antialiasing.samples >= 1,
            "antialiasing.samples must be at least one"
        );
        ensure!(
            self.shadow.opacity.is_finite(),
            "shadow.opacity must be a number"
        );
        ensure!(
            self.camera.iter().all(|c| c.is_finite()),
            "camera coordinates must be finite"
        );
        ensure!(
            self.camera != [0.0, 0.0, 0.0],
            "camera must not sit at the origin it looks at"
        );
        ensure!(
            self.label.font_size > 0.0,
            "label.font-size must be positive"
        );
        self.shadow.opacity = self.shadow.opacity.clamp(0.0, 1.0);
        Ok(self)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }

    /// Requested supersampling passes after applying the environment gate.
    /// `1` means a single direct pass.
    pub fn effective_samples(&self) -> usize {
        self.effective_samples_with(std::env::var_os(ANTIALIASING_ENV_VAR).is_some())
    }

    pub fn effective_samples_with(&self, env_enabled: bool) -> usize {
        if self.antialiasing.enabled && env_enabled {
            self.antialiasing.samples
        } else {
            1
        }
    }
}
