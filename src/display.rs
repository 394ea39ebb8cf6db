//! Headless view model for the oscilloscope window.
//!
//! Nothing here draws. These functions turn normalized samples and analysis
//! results into the geometry and strings a graphics toolkit renders.

use crate::audio::{FundamentalFrequencyResult, ABSENT_SAMPLE_VALUE};
use crate::config::DisplayConfig;
use std::path::Path;

/// A vertical line from `top` down to the bottom row at horizontal position `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Title of the oscilloscope window for the file at `path`.
pub fn window_title(path: &Path) -> String {
    format!("Wav Oscilloscope [{}]", path.display())
}

/// Overlay text showing the estimated fundamental frequency.
pub fn frequency_label(result: &FundamentalFrequencyResult) -> String {
    format!("Frequency: {} Hz", result.fundamental_frequency)
}

/// Lays out one column per horizontal step across the view.
///
/// The step is `width / min(len, max_render_samples)` and each column reads
/// the sample at `x as usize`. When there are fewer samples than pixels the
/// step is wider than one sample; past the end of `normalized` the read is
/// absent and the value defaults to [`ABSENT_SAMPLE_VALUE`], which draws
/// nothing taller than the bottom row. Values at or below `f32::EPSILON`
/// (full-scale peaks) are skipped, and at most `max_render_samples` columns
/// are produced.
///
/// # Arguments
/// * `normalized` - Samples in the inverted `[0, 1]` display range
/// * `config` - View size and render cap
///
/// # Returns
/// Columns in left-to-right order; empty for no samples or a zero-sized view
pub fn oscilloscope_columns(normalized: &[f32], config: &DisplayConfig) -> Vec<Column> {
    if normalized.is_empty() || config.width == 0 || config.height == 0 {
        return Vec::new();
    }
    if config.max_render_samples == 0 {
        return Vec::new();
    }

    let width = config.width as f32;
    let bottom = (config.height - 1) as f32;
    let visible = normalized.len().min(config.max_render_samples);
    let delta_x = width / visible as f32;

    let mut columns = Vec::with_capacity(visible.min(config.width as usize));
    let mut step = 0usize;
    loop {
        let x = step as f32 * delta_x;
        if x >= width {
            break;
        }
        step += 1;

        let value = normalized
            .get(x as usize)
            .copied()
            .unwrap_or(ABSENT_SAMPLE_VALUE);
        if value <= f32::EPSILON {
            continue;
        }

        columns.push(Column {
            x,
            top: value * bottom,
            bottom,
        });
        if columns.len() >= config.max_render_samples {
            break;
        }
    }

    columns
}
