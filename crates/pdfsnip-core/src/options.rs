//! Options controlling selection and rendering behavior.

/// Minimum width and height, in display units, a drag must exceed to commit.
pub const DEFAULT_MIN_SELECTION: f64 = 10.0;

/// Scale at which pages are shown on screen.
pub const DEFAULT_DISPLAY_SCALE: f64 = 1.5;

/// Scale at which pages are rasterized for cropping.
pub const DEFAULT_RASTER_SCALE: f64 = 4.0;

/// Options for the selection-to-content pipeline.
///
/// Provides sensible defaults for all settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnipOptions {
    /// A drag commits only if both width and height strictly exceed this
    /// value (default: 10.0).
    pub min_selection: f64,
    /// Page scale of the on-screen render (default: 1.5).
    pub display_scale: f64,
    /// Page scale of the off-screen raster used for crops (default: 4.0).
    pub raster_scale: f64,
}

impl Default for SnipOptions {
    fn default() -> Self {
        Self {
            min_selection: DEFAULT_MIN_SELECTION,
            display_scale: DEFAULT_DISPLAY_SCALE,
            raster_scale: DEFAULT_RASTER_SCALE,
        }
    }
}
