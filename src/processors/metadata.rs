// geotag/src/processors/metadata.rs
use crate::processors::{Axis, Hemisphere};
use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use serde::Serialize;
use std::future::Future;
use std::io::Cursor;
use std::sync::Arc;

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// GPS and capture-time tags as found in the image. Every field is
/// independent: a latitude without a longitude is reported as such.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawMetadataTags {
    pub latitude: Option<[f64; 3]>,
    pub latitude_ref: Option<Hemisphere>,
    pub longitude: Option<[f64; 3]>,
    pub longitude_ref: Option<Hemisphere>,
    pub date_time_original: Option<String>,
}

impl RawMetadataTags {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn capture_time(&self) -> Option<NaiveDateTime> {
        self.date_time_original
            .as_deref()
            .and_then(parse_capture_time)
    }
}

pub fn parse_capture_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), EXIF_DATETIME_FORMAT).ok()
}

/// Source of raw metadata tags for an image payload.
pub trait TagExtractor: Send + Sync + 'static {
    fn extract(&self, bytes: Arc<[u8]>) -> impl Future<Output = RawMetadataTags> + Send;
}

pub struct MetadataProcessor;

impl MetadataProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn read_metadata(&self, bytes: &[u8]) -> Option<Exif> {
        let mut cursor = Cursor::new(bytes);

        match Reader::new().read_from_container(&mut cursor) {
            Ok(exif) => {
                log::debug!("Found {} EXIF fields", exif.fields().count());
                Some(exif)
            }
            Err(exif::Error::NotFound(_)) => {
                log::debug!("No EXIF data found");
                None
            }
            Err(e) => {
                log::warn!("Failed to read EXIF data: {}", e);
                None
            }
        }
    }

    /// Reads the tags synchronously. Unreadable payloads yield empty tags.
    pub fn read_tags(&self, bytes: &[u8]) -> RawMetadataTags {
        match self.read_metadata(bytes) {
            Some(exif) => self.extract_tags(&exif),
            None => RawMetadataTags::default(),
        }
    }

    pub fn extract_tags(&self, exif: &Exif) -> RawMetadataTags {
        let tags = RawMetadataTags {
            latitude: gps_components(exif, Tag::GPSLatitude),
            latitude_ref: gps_reference(exif, Tag::GPSLatitudeRef, Axis::Latitude),
            longitude: gps_components(exif, Tag::GPSLongitude),
            longitude_ref: gps_reference(exif, Tag::GPSLongitudeRef, Axis::Longitude),
            date_time_original: ascii_value(exif, Tag::DateTimeOriginal),
        };
        log::debug!("Extracted tags: {:?}", tags);
        tags
    }
}

impl Default for MetadataProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TagExtractor for MetadataProcessor {
    async fn extract(&self, bytes: Arc<[u8]>) -> RawMetadataTags {
        // kamadak-exif is synchronous
        let result =
            tokio::task::spawn_blocking(move || MetadataProcessor::new().read_tags(&bytes)).await;

        match result {
            Ok(tags) => tags,
            Err(e) => {
                log::warn!("Metadata extraction task failed: {}", e);
                RawMetadataTags::default()
            }
        }
    }
}

fn gps_components(exif: &Exif, tag: Tag) -> Option<[f64; 3]> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let values: Vec<f64> = match &field.value {
        Value::Rational(values) => values.iter().map(|r| r.to_f64()).collect(),
        Value::SRational(values) => values.iter().map(|r| r.to_f64()).collect(),
        other => {
            log::debug!("Unexpected value type for {}: {:?}", tag, other);
            return None;
        }
    };

    if values.len() != 3 {
        log::debug!("{} has {} components, expected 3", tag, values.len());
        return None;
    }

    let components = [values[0], values[1], values[2]];
    if components.iter().all(|c| c.is_finite() && *c >= 0.0) {
        Some(components)
    } else {
        log::debug!("{} has unusable components {:?}", tag, components);
        None
    }
}

fn gps_reference(exif: &Exif, tag: Tag, axis: Axis) -> Option<Hemisphere> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .and_then(|raw| Hemisphere::parse_for(axis, raw)),
        _ => None,
    }
}

fn ascii_value(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .and_then(|raw| std::str::from_utf8(raw).ok())
            .map(|text| text.trim_end_matches('\0').trim().to_string())
            .filter(|text| !text.is_empty()),
        _ => None,
    }
}
