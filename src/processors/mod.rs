// geotag/src/processors/mod.rs
mod converter;
mod geocoder;
mod loader;
mod metadata;

pub use converter::{to_decimal_degrees, to_sexagesimal, Axis, GeoCoordinate, Hemisphere};
pub use geocoder::{
    parse_response, GeocodeFailure, NominatimClient, PlaceDescription, ReverseGeocoder,
    GEOCODE_FAILURE_MESSAGE,
};
pub use loader::{ImageSource, LoadedImage, Loader};
pub use metadata::{parse_capture_time, MetadataProcessor, RawMetadataTags, TagExtractor};

pub mod prelude {
    pub use super::{Loader, MetadataProcessor, NominatimClient, ReverseGeocoder, TagExtractor};
}
