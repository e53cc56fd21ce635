//! Pager configuration
//!
//! All lengths are CSS pixels at 96 DPI. Every field has a default, so a
//! JSON config only needs the values it changes:
//!
//! ```json
//! { "page": "Letter", "margins": { "top": 72, "bottom": 72 }, "debounce_ms": 300 }
//! ```

use crate::controller::{ControllerSettings, DiffMode};
use crate::error::ConfigError;
use crate::layout::{FontMetrics, LayoutConstraints, PaginationPolicy};
use serde::{Deserialize, Serialize};

/// Named paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PagePreset {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PagePreset {
    /// Width and height in pixels
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PagePreset::A4 => (794.0, 1123.0),
            PagePreset::A5 => (559.0, 794.0),
            PagePreset::Letter => (816.0, 1056.0),
            PagePreset::Legal => (816.0, 1344.0),
        }
    }
}

/// A preset name or explicit dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageSize {
    Preset(PagePreset),
    Custom { width: f32, height: f32 },
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Preset(PagePreset::default())
    }
}

impl PageSize {
    pub fn dimensions(&self) -> (f32, f32) {
        match *self {
            PageSize::Preset(preset) => preset.dimensions(),
            PageSize::Custom { width, height } => (width, height),
        }
    }
}

/// Page margins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(96.0)
    }
}

impl Margins {
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }
}

/// Everything needed to run the pager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    pub page: PageSize,
    pub margins: Margins,
    /// Quiet period after the last mutation before a pass runs
    pub debounce_ms: u64,
    pub min_split_height: f32,
    pub max_fragments: usize,
    pub diff_mode: DiffMode,
    pub font: FontMetrics,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page: PageSize::default(),
            margins: Margins::default(),
            debounce_ms: 500,
            min_split_height: 60.0,
            max_fragments: 512,
            diff_mode: DiffMode::default(),
            font: FontMetrics::default(),
        }
    }
}

impl PagerConfig {
    /// Parse and validate a JSON config
    pub fn from_json(src: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = self.page.dimensions();
        positive("page width", width)?;
        positive("page height", height)?;
        positive("line height", self.font.line_height)?;
        positive("max fragments", self.max_fragments as f32)?;
        if self.min_split_height.is_nan() || self.min_split_height < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "min split height",
                value: self.min_split_height,
            });
        }

        let constraints = self.constraints();
        if constraints.content_width() <= 0.0 || constraints.content_height() <= 0.0 {
            return Err(ConfigError::EmptyContentArea { width, height });
        }
        Ok(())
    }

    /// Resolved page geometry
    pub fn constraints(&self) -> LayoutConstraints {
        let (page_width, page_height) = self.page.dimensions();
        LayoutConstraints {
            page_width,
            page_height,
            margin_top: self.margins.top,
            margin_bottom: self.margins.bottom,
            margin_left: self.margins.left,
            margin_right: self.margins.right,
        }
    }

    pub fn policy(&self) -> PaginationPolicy {
        PaginationPolicy {
            min_split_height: self.min_split_height,
            max_fragments: self.max_fragments,
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            content_height: self.constraints().content_height(),
            debounce_ms: self.debounce_ms,
            policy: self.policy(),
            diff_mode: self.diff_mode,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
