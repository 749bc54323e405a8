// geotag/src/processors/converter.rs
use crate::core::{GeotagError, HemisphereFallback};
use crate::processors::RawMetadataTags;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    pub fn positive(self) -> Hemisphere {
        match self {
            Axis::Latitude => Hemisphere::North,
            Axis::Longitude => Hemisphere::East,
        }
    }

    pub fn negative(self) -> Hemisphere {
        match self {
            Axis::Latitude => Hemisphere::South,
            Axis::Longitude => Hemisphere::West,
        }
    }

    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hemisphere {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "W")]
    West,
}

impl Hemisphere {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            'E' => Some(Hemisphere::East),
            'W' => Some(Hemisphere::West),
            _ => None,
        }
    }

    /// Parses an EXIF ASCII reference value such as `b"N\0"`.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(raw).ok()?;
        let mut letters = text.trim_matches(|c: char| c == '\0' || c.is_whitespace()).chars();
        match (letters.next(), letters.next()) {
            (Some(letter), None) => Self::from_letter(letter),
            _ => None,
        }
    }

    /// Like [`Hemisphere::parse`], but only accepts the two letters valid for `axis`.
    pub fn parse_for(axis: Axis, raw: &[u8]) -> Option<Self> {
        Self::parse(raw).filter(|hemisphere| hemisphere.axis() == axis)
    }

    pub fn axis(self) -> Axis {
        match self {
            Hemisphere::North | Hemisphere::South => Axis::Latitude,
            Hemisphere::East | Hemisphere::West => Axis::Longitude,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(self, Hemisphere::South | Hemisphere::West)
    }

    pub fn letter(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Hemisphere {
    type Err = GeotagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes()).ok_or_else(|| {
            GeotagError::InvalidParameter(format!(
                "Hemisphere reference must be one of N, S, E, W, got '{}'",
                s
            ))
        })
    }
}

const MICROS_PER_SECOND: u64 = 1_000_000;

/// Converts `[degrees, minutes, seconds]` to signed decimal degrees.
///
/// Components are not range checked: `minutes >= 60` is summed as is.
pub fn to_decimal_degrees(components: [f64; 3], reference: Hemisphere) -> f64 {
    let [degrees, minutes, seconds] = components;
    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;

    if reference.is_negative() {
        -decimal
    } else {
        decimal
    }
}

/// Splits a decimal value into non-negative `[degrees, minutes, seconds]` and
/// whether the value lies in the negative hemisphere.
///
/// Seconds are kept to microsecond precision; rounding carries into minutes
/// and degrees, so seconds and minutes always stay below 60.
pub fn to_sexagesimal(decimal: f64) -> ([f64; 3], bool) {
    let negative = decimal.is_sign_negative() && decimal != 0.0;
    let micros = (decimal.abs() * 3600.0 * MICROS_PER_SECOND as f64).round() as u64;

    let degrees = micros / (3600 * MICROS_PER_SECOND);
    let minutes = micros % (3600 * MICROS_PER_SECOND) / (60 * MICROS_PER_SECOND);
    let seconds = (micros % (60 * MICROS_PER_SECOND)) as f64 / MICROS_PER_SECOND as f64;

    ([degrees as f64, minutes as f64, seconds], negative)
}

/// A signed decimal latitude/longitude pair.
///
/// Only produced by converting extracted GPS tags, so both axes are always
/// present and within range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
}

impl GeoCoordinate {
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Builds a coordinate from raw tags. Returns `None` unless both axes are
    /// present, have a usable reference, and convert to an in-range value.
    pub fn from_tags(tags: &RawMetadataTags, fallback: HemisphereFallback) -> Option<Self> {
        let latitude = convert_axis(tags.latitude, tags.latitude_ref, Axis::Latitude, fallback)?;
        let longitude =
            convert_axis(tags.longitude, tags.longitude_ref, Axis::Longitude, fallback)?;

        Some(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

fn convert_axis(
    components: Option<[f64; 3]>,
    reference: Option<Hemisphere>,
    axis: Axis,
    fallback: HemisphereFallback,
) -> Option<f64> {
    let components = components?;
    let reference = fallback.resolve(reference, axis)?;
    let decimal = to_decimal_degrees(components, reference);

    if !decimal.is_finite() || decimal.abs() > axis.limit() {
        log::warn!(
            "Ignoring implausible {:?} value {} from {:?} {}",
            axis,
            decimal,
            components,
            reference
        );
        return None;
    }

    Some(decimal)
}
