//! Encoded polyline format: every coordinate is stored as a delta from the previous one,
//! scaled by 1e5, zig-zag signed and split into 5-bit groups offset by 63.

use thiserror::Error;

use crate::coordinate::Coordinate;

const PRECISION: f64 = 1e5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION_BIT: i64 = 0x20;
const CHAR_OFFSET: u8 = 63;
// 7 groups of 5 bits cover a signed 32-bit value.
const MAX_SHIFT: u32 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolylineError {
    #[error("Polyline ended in the middle of a value after {decoded} coordinates")]
    TruncatedInput { decoded: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPolyline {
    pub coordinates: Vec<Coordinate>,
    /// Set when the input stopped in the middle of a coordinate. `coordinates` then holds
    /// everything decoded before that point.
    pub truncated: bool,
}

/// Reads one zig-zag encoded value starting at `index`. Returns `None` without moving past
/// the end of `bytes` when the group is unterminated or contains a byte outside the alphabet.
fn next_value(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(*index)?;
        if !(CHAR_OFFSET..=b'~').contains(&byte) || shift > MAX_SHIFT {
            return None;
        }
        *index += 1;

        let chunk = (byte - CHAR_OFFSET) as i64;
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;

        if chunk < CONTINUATION_BIT {
            break;
        }
    }

    Some(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

pub fn decode_polyline(encoded: &str) -> DecodedPolyline {
    let bytes = encoded.as_bytes();
    let mut coordinates = Vec::with_capacity(bytes.len() / 4);

    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        let Some(delta_lat) = next_value(bytes, &mut index) else {
            return DecodedPolyline {
                coordinates,
                truncated: true,
            };
        };
        let Some(delta_lon) = next_value(bytes, &mut index) else {
            return DecodedPolyline {
                coordinates,
                truncated: true,
            };
        };

        lat += delta_lat;
        lon += delta_lon;

        coordinates.push(Coordinate::new(
            lat as f64 / PRECISION,
            lon as f64 / PRECISION,
        ));
    }

    DecodedPolyline {
        coordinates,
        truncated: false,
    }
}

pub fn decode_polyline_strict(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let decoded = decode_polyline(encoded);
    if decoded.truncated {
        return Err(PolylineError::TruncatedInput {
            decoded: decoded.coordinates.len(),
        });
    }

    Ok(decoded.coordinates)
}

fn push_value(value: i64, output: &mut String) {
    let mut value = if value < 0 {
        !(value << 1)
    } else {
        value << 1
    };

    while value >= CONTINUATION_BIT {
        output.push((((value & CHUNK_MASK) | CONTINUATION_BIT) as u8 + CHAR_OFFSET) as char);
        value >>= 5;
    }
    output.push((value as u8 + CHAR_OFFSET) as char);
}

pub fn encode_polyline(coordinates: &[Coordinate]) -> String {
    let mut output = String::with_capacity(coordinates.len() * 8);

    let mut previous_lat: i64 = 0;
    let mut previous_lon: i64 = 0;

    for coordinate in coordinates {
        let lat = (coordinate.latitude * PRECISION).round() as i64;
        let lon = (coordinate.longitude * PRECISION).round() as i64;

        push_value(lat - previous_lat, &mut output);
        push_value(lon - previous_lon, &mut output);

        previous_lat = lat;
        previous_lon = lon;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn reference_points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(38.5, -120.2),
            Coordinate::new(40.7, -120.95),
            Coordinate::new(43.252, -126.453),
        ]
    }

    fn assert_close(actual: &[Coordinate], expected: &[Coordinate], tolerance: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a.latitude - e.latitude).abs() <= tolerance, "{a} != {e}");
            assert!((a.longitude - e.longitude).abs() <= tolerance, "{a} != {e}");
        }
    }

    #[test]
    fn decodes_reference_polyline() {
        let decoded = decode_polyline(REFERENCE);
        assert!(!decoded.truncated);
        assert_close(&decoded.coordinates, &reference_points(), 1e-9);
    }

    #[test]
    fn encodes_reference_polyline() {
        assert_eq!(encode_polyline(&reference_points()), REFERENCE);
    }

    #[test]
    fn round_trip_within_precision() {
        let path = vec![
            Coordinate::new(34.261034, -6.583012),
            Coordinate::new(34.262871, -6.582004),
            Coordinate::new(34.265540, -6.581377),
            Coordinate::new(34.270211, -6.580199),
            Coordinate::new(-33.868820, 151.209296),
        ];

        let decoded = decode_polyline_strict(&encode_polyline(&path)).unwrap();
        assert_close(&decoded, &path, 1e-5);
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        let decoded = decode_polyline("");
        assert!(decoded.coordinates.is_empty());
        assert!(!decoded.truncated);
    }

    #[test]
    fn missing_longitude_keeps_previous_points() {
        // second coordinate has its latitude but no longitude
        let decoded = decode_polyline("_p~iF~ps|U_ulL");
        assert!(decoded.truncated);
        assert_close(&decoded.coordinates, &reference_points()[..1], 1e-9);
    }

    #[test]
    fn unterminated_group_is_truncation() {
        // '_' carries the continuation bit and nothing follows
        let decoded = decode_polyline("_p~iF~ps|U_");
        assert!(decoded.truncated);
        assert_eq!(decoded.coordinates.len(), 1);

        assert_eq!(
            decode_polyline_strict("_p~iF~ps|U_"),
            Err(PolylineError::TruncatedInput { decoded: 1 })
        );
    }

    #[test]
    fn bytes_outside_alphabet_stop_decoding() {
        let decoded = decode_polyline("_p~iF~ps|U !!");
        assert!(decoded.truncated);
        assert_eq!(decoded.coordinates.len(), 1);
    }

    #[test]
    fn overlong_group_stops_decoding() {
        let decoded = decode_polyline("~~~~~~~~~~~~");
        assert!(decoded.truncated);
        assert!(decoded.coordinates.is_empty());
    }
}
