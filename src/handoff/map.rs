// geotag/src/handoff/map.rs
use crate::core::{Extracted, GeotagRecord};
use std::fmt;

pub const NO_COORDINATES_MESSAGE: &str = "No coordinates provided.";
pub const DEFAULT_ZOOM: u8 = 13;

/// What the map screen shows for the coordinate routed to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapView {
    NoCoordinates,
    Marker {
        latitude: f64,
        longitude: f64,
        zoom: u8,
    },
}

impl MapView {
    /// Builds the view from routed navigation state. Missing, non-finite or
    /// out-of-range pairs fall back to [`MapView::NoCoordinates`]; `0.0` is a
    /// real position, not an absent one.
    pub fn from_routed_state(state: Option<(f64, f64)>) -> Self {
        match state {
            Some((latitude, longitude))
                if latitude.is_finite()
                    && longitude.is_finite()
                    && latitude.abs() <= 90.0
                    && longitude.abs() <= 180.0 =>
            {
                MapView::Marker {
                    latitude,
                    longitude,
                    zoom: DEFAULT_ZOOM,
                }
            }
            Some(state) => {
                log::warn!("Ignoring out-of-range map state {:?}", state);
                MapView::NoCoordinates
            }
            None => MapView::NoCoordinates,
        }
    }

    pub fn from_record(record: &GeotagRecord) -> Self {
        match record.coordinate() {
            Extracted::Present(coordinate) => {
                Self::from_routed_state(Some((coordinate.latitude(), coordinate.longitude())))
            }
            _ => MapView::NoCoordinates,
        }
    }

    pub fn popup_text(&self) -> Option<String> {
        match self {
            MapView::Marker {
                latitude,
                longitude,
                ..
            } => Some(format!(
                "A new location! Latitude: {}, Longitude: {}",
                latitude, longitude
            )),
            MapView::NoCoordinates => None,
        }
    }

    pub fn link(&self) -> Option<String> {
        match self {
            MapView::Marker {
                latitude,
                longitude,
                zoom,
            } => Some(format!(
                "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map={zoom}/{lat}/{lon}",
                lat = latitude,
                lon = longitude,
                zoom = zoom
            )),
            MapView::NoCoordinates => None,
        }
    }
}

impl fmt::Display for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.popup_text(), self.link()) {
            (Some(popup), Some(link)) => write!(f, "{}\n{}", popup, link),
            _ => f.write_str(NO_COORDINATES_MESSAGE),
        }
    }
}
