//! Font metrics for layout

use serde::{Deserialize, Serialize};

/// Metrics needed for text measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontMetrics {
    /// Line height in logical pixels
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 16px body text, 1.2 line height, average advance of a proportional face
        let default_width = 8.0;
        Self {
            line_height: 19.2,
            char_widths: vec![default_width; 128],
            default_width,
        }
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Uniform advance for every character
    pub fn monospace(line_height: f32, advance: f32) -> Self {
        Self::new(line_height, vec![advance; 128], advance)
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }

    /// Width of a grapheme cluster
    pub fn grapheme_width(&self, grapheme: &str) -> f32 {
        if grapheme == "\t" {
            self.default_width * 4.0
        } else if grapheme.chars().all(|c| c.is_control()) {
            0.0
        } else {
            // Combining marks ride on their base character
            grapheme.chars().next().map(|c| self.width(c)).unwrap_or(0.0)
        }
    }
}
