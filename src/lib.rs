mod cli;
mod core;
mod handoff;
mod processors;
mod utils;

#[cfg(test)]
mod test_utils;

pub use crate::cli::{Cli, Commands};
pub use crate::core::{
    Enrichment, Extracted, GeotagError, GeotagRecord, HemisphereFallback,
    ImagePreview, IngestConfig, IngestionOrchestrator, PendingReview, Result, Stage,
    SubmitOutcome, DEFAULT_GEOCODE_ENDPOINT, DEFAULT_USER_AGENT, NO_GPS_MESSAGE, UNAVAILABLE,
};
pub use crate::handoff::{
    JsonFileStore, MapView, RecordStore, DEFAULT_ZOOM, NO_COORDINATES_MESSAGE,
};
pub use crate::processors::{
    parse_capture_time, parse_response, to_decimal_degrees, to_sexagesimal, Axis, GeoCoordinate,
    GeocodeFailure, Hemisphere, ImageSource, LoadedImage, Loader, MetadataProcessor,
    NominatimClient, PlaceDescription, RawMetadataTags, ReverseGeocoder, TagExtractor,
    GEOCODE_FAILURE_MESSAGE,
};
pub use crate::utils::{
    data_url, format_file_size, format_sexagesimal, get_file_extension, is_supported_format,
};

pub mod prelude {
    pub use crate::{
        GeotagRecord, IngestConfig, IngestionOrchestrator, MetadataProcessor, NominatimClient,
        RecordStore, ReverseGeocoder, Stage, SubmitOutcome, TagExtractor,
    };
}
