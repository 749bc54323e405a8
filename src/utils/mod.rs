// geotag/src/utils/mod.rs
use crate::processors::{to_sexagesimal, Axis};
use base64::Engine;
use std::path::Path;

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

pub fn is_supported_format(path: &Path) -> bool {
    let extensions = ["jpg", "jpeg", "png", "webp", "tif", "tiff"];

    get_file_extension(path)
        .map(|ext| extensions.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

/// Encodes an image payload as a `data:` URL for previews.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_type, encoded)
}

/// Formats a signed decimal value as `40° 26' 46.00" N`.
pub fn format_sexagesimal(decimal: f64, axis: Axis) -> String {
    // round to hundredths of a second before splitting so 59.995" carries
    let rounded = (decimal * 360_000.0).round() / 360_000.0;
    let ([degrees, minutes, seconds], negative) = to_sexagesimal(rounded);
    let hemisphere = if negative {
        axis.negative()
    } else {
        axis.positive()
    };

    format!(
        "{}° {}' {:.2}\" {}",
        degrees, minutes, seconds, hemisphere
    )
}
