//! Branding context passed explicitly to renderers.

use crate::config::ThemeConfig;
use crate::error::{AppError, Result};

/// Colors and names applied to exported documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub company_name: String,
    /// Header background as `0xRRGGBB`.
    pub header_color: u32,
    /// Header text as `0xRRGGBB`.
    pub header_text_color: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            header_color: 0x4472C4,
            header_text_color: 0xFFFFFF,
        }
    }
}

impl Theme {
    /// Build the theme from configuration, validating the colors.
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        Ok(Self {
            company_name: config.company_name.clone(),
            header_color: parse_hex_color(&config.header_color)?,
            header_text_color: parse_hex_color(&config.header_text_color)?,
        })
    }
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(input: &str) -> Result<u32> {
    let hex = input.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AppError::validation(format!("Invalid color '{input}': expected #RRGGBB")));
    }
    u32::from_str_radix(hex, 16).map_err(|e| AppError::validation(format!("Invalid color '{input}': {e}")))
}
