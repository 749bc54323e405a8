// geotag/src/core/record.rs
use crate::processors::{GeoCoordinate, GeocodeFailure, PlaceDescription};
use serde::Serialize;
use std::fmt;

/// Capture-time sentinel shown when the photo carries no timestamp.
pub const UNAVAILABLE: &str = "unavailable";
/// Shown in place of latitude/longitude when no usable coordinate was found.
pub const NO_GPS_MESSAGE: &str = "No GPS data available.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Empty,
    Previewing,
    Extracting,
    Geolocated,
    NoGpsData,
    Enriching,
    Enriched,
    EnrichmentFailed,
}

impl Stage {
    /// Extraction has finished with a coordinate; enrichment may or may not have succeeded.
    pub fn is_submittable(self) -> bool {
        matches!(
            self,
            Stage::Geolocated | Stage::Enriched | Stage::EnrichmentFailed
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Empty => "empty",
            Stage::Previewing => "previewing",
            Stage::Extracting => "extracting",
            Stage::Geolocated => "geolocated",
            Stage::NoGpsData => "without GPS data",
            Stage::Enriching => "enriching",
            Stage::Enriched => "enriched",
            Stage::EnrichmentFailed => "enrichment failed",
        };
        f.write_str(name)
    }
}

/// A value read from the image: not yet known, known to be missing, or present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Extracted<T> {
    #[default]
    Pending,
    Unavailable,
    Present(T),
}

impl<T> Extracted<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Extracted::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Extracted::Unavailable)
    }
}

impl<T> From<Option<T>> for Extracted<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Extracted::Present(value),
            None => Extracted::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Enrichment {
    #[default]
    NotRequested,
    Found(PlaceDescription),
    Failed(GeocodeFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePreview {
    pub mime_type: &'static str,
    pub byte_len: usize,
    pub data_url: String,
}

/// Everything known about the photo currently being ingested.
///
/// Only the orchestrator mutates a record; everybody else gets a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeotagRecord {
    stage: Stage,
    preview: Option<ImagePreview>,
    coordinate: Extracted<GeoCoordinate>,
    capture_time: Extracted<String>,
    place: Enrichment,
}

impl GeotagRecord {
    pub(crate) fn previewing(preview: ImagePreview) -> Self {
        Self {
            stage: Stage::Previewing,
            preview: Some(preview),
            ..Default::default()
        }
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        log::debug!("Record stage {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    pub(crate) fn apply_extraction(
        &mut self,
        coordinate: Option<GeoCoordinate>,
        capture_time: Option<String>,
    ) {
        self.stage = if coordinate.is_some() {
            Stage::Geolocated
        } else {
            Stage::NoGpsData
        };
        self.coordinate = coordinate.into();
        self.capture_time = capture_time.into();
    }

    pub(crate) fn apply_enrichment(
        &mut self,
        result: std::result::Result<PlaceDescription, GeocodeFailure>,
    ) {
        match result {
            Ok(place) => {
                self.stage = Stage::Enriched;
                self.place = Enrichment::Found(place);
            }
            Err(failure) => {
                self.stage = Stage::EnrichmentFailed;
                self.place = Enrichment::Failed(failure);
            }
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn preview(&self) -> Option<&ImagePreview> {
        self.preview.as_ref()
    }

    pub fn coordinate(&self) -> &Extracted<GeoCoordinate> {
        &self.coordinate
    }

    pub fn capture_time(&self) -> &Extracted<String> {
        &self.capture_time
    }

    pub fn place(&self) -> &Enrichment {
        &self.place
    }

    pub fn latitude_text(&self) -> String {
        self.axis_text(|c| c.latitude())
    }

    pub fn longitude_text(&self) -> String {
        self.axis_text(|c| c.longitude())
    }

    fn axis_text(&self, axis: impl Fn(&GeoCoordinate) -> f64) -> String {
        match &self.coordinate {
            Extracted::Present(coordinate) => format!("{:.6}", axis(coordinate)),
            Extracted::Unavailable => NO_GPS_MESSAGE.to_string(),
            Extracted::Pending => String::new(),
        }
    }

    pub fn capture_time_text(&self) -> String {
        match &self.capture_time {
            Extracted::Present(value) => value.clone(),
            Extracted::Unavailable => UNAVAILABLE.to_string(),
            Extracted::Pending => String::new(),
        }
    }

    pub fn place_text(&self) -> String {
        match &self.place {
            Enrichment::Found(place) => place.display_name.clone(),
            Enrichment::Failed(failure) => failure.message().to_string(),
            Enrichment::NotRequested => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HemisphereFallback;
    use crate::processors::{Hemisphere, RawMetadataTags};
    use std::collections::BTreeMap;

    fn coordinate() -> GeoCoordinate {
        let tags = RawMetadataTags {
            latitude: Some([40.0, 26.0, 46.0]),
            latitude_ref: Some(Hemisphere::North),
            longitude: Some([79.0, 56.0, 55.0]),
            longitude_ref: Some(Hemisphere::West),
            ..Default::default()
        };
        GeoCoordinate::from_tags(&tags, HemisphereFallback::Lenient).unwrap()
    }

    fn preview() -> ImagePreview {
        ImagePreview {
            mime_type: "image/jpeg",
            byte_len: 4,
            data_url: "data:image/jpeg;base64,/9j/2Q==".to_string(),
        }
    }

    #[test]
    fn empty_record_shows_nothing() {
        let record = GeotagRecord::default();

        assert_eq!(record.stage(), Stage::Empty);
        assert!(record.preview().is_none());
        assert_eq!(record.latitude_text(), "");
        assert_eq!(record.capture_time_text(), "");
        assert_eq!(record.place_text(), "");
    }

    #[test]
    fn missing_gps_is_not_zero() {
        let mut record = GeotagRecord::previewing(preview());
        record.apply_extraction(None, None);

        assert_eq!(record.stage(), Stage::NoGpsData);
        assert!(record.coordinate().is_unavailable());
        assert_eq!(record.latitude_text(), NO_GPS_MESSAGE);
        assert_eq!(record.longitude_text(), NO_GPS_MESSAGE);
        assert_eq!(record.capture_time_text(), UNAVAILABLE);
    }

    #[test]
    fn geolocated_then_enriched() {
        let mut record = GeotagRecord::previewing(preview());
        record.apply_extraction(Some(coordinate()), Some("2024:05:01 10:20:30".to_string()));

        assert_eq!(record.stage(), Stage::Geolocated);
        assert_eq!(record.latitude_text(), "40.446111");
        assert_eq!(record.longitude_text(), "-79.948611");
        assert_eq!(record.capture_time_text(), "2024:05:01 10:20:30");

        let place = PlaceDescription {
            display_name: "Pittsburgh, Pennsylvania, United States".to_string(),
            address: BTreeMap::from([("city".to_string(), "Pittsburgh".to_string())]),
        };
        record.apply_enrichment(Ok(place));

        assert_eq!(record.stage(), Stage::Enriched);
        assert_eq!(record.place_text(), "Pittsburgh, Pennsylvania, United States");
    }

    #[test]
    fn failed_enrichment_stays_submittable() {
        let mut record = GeotagRecord::previewing(preview());
        record.apply_extraction(Some(coordinate()), None);
        record.apply_enrichment(Err(GeocodeFailure::new("HTTP 500")));

        assert_eq!(record.stage(), Stage::EnrichmentFailed);
        assert!(record.stage().is_submittable());
        assert_eq!(record.place_text(), crate::processors::GEOCODE_FAILURE_MESSAGE);
    }

    #[test]
    fn submittable_stages() {
        assert!(!Stage::Empty.is_submittable());
        assert!(!Stage::Extracting.is_submittable());
        assert!(!Stage::NoGpsData.is_submittable());
        assert!(!Stage::Enriching.is_submittable());
        assert!(Stage::Geolocated.is_submittable());
        assert!(Stage::Enriched.is_submittable());
    }

    #[test]
    fn serializes_with_status_tags() {
        let mut record = GeotagRecord::previewing(preview());
        record.apply_extraction(None, Some("2024:05:01 10:20:30".to_string()));

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["stage"], "no_gps_data");
        assert_eq!(json["coordinate"]["status"], "unavailable");
        assert_eq!(json["capture_time"]["value"], "2024:05:01 10:20:30");
        assert_eq!(json["place"]["status"], "not_requested");
    }
}
