//! Compact polyline encoding for route point sequences.
//!
//! Implements the Google polyline algorithm at 5-decimal precision:
//! coordinates are scaled by 1e5, delta-encoded against the previous
//! point, zigzag-signed, and emitted as base-63-offset ASCII in 5-bit
//! chunks. Round-tripping reproduces coordinates within the precision's
//! rounding error. Pure transform, no I/O.

use saferoute_routing_models::RoutePoint;
use thiserror::Error;

const PRECISION: f64 = 1e5;

/// Errors from decoding a polyline string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// The string ended in the middle of a coordinate.
    #[error("polyline truncated at byte {position}")]
    Truncated {
        /// Byte offset where input ran out.
        position: usize,
    },

    /// A byte outside the valid encoding range was encountered.
    #[error("invalid polyline byte {byte:#04x} at offset {position}")]
    InvalidByte {
        /// The offending byte.
        byte: u8,
        /// Its offset in the input.
        position: usize,
    },

    /// A coordinate's continuation chunks ran past the widest encodable
    /// value.
    #[error("polyline value overflow at offset {position}")]
    Overflow {
        /// Offset of the chunk that overran.
        position: usize,
    },
}

/// Encodes a point sequence into a polyline string.
#[must_use]
pub fn encode(points: &[RoutePoint]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for point in points {
        #[allow(clippy::cast_possible_truncation)]
        let lat = (point.lat * PRECISION).round() as i64;
        #[allow(clippy::cast_possible_truncation)]
        let lng = (point.lng * PRECISION).round() as i64;

        encode_value(lat - prev_lat, &mut out);
        encode_value(lng - prev_lng, &mut out);

        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn encode_value(value: i64, out: &mut String) {
    // Zigzag so small negative deltas stay short
    let signed = if value < 0 { !(value << 1) } else { value << 1 };
    #[allow(clippy::cast_sign_loss)]
    let mut v = signed as u64;

    while v >= 0x20 {
        #[allow(clippy::cast_possible_truncation)]
        out.push(char::from((0x20 | (v & 0x1f)) as u8 + 63));
        v >>= 5;
    }
    #[allow(clippy::cast_possible_truncation)]
    out.push(char::from(v as u8 + 63));
}

/// Decodes a polyline string back into points.
///
/// # Errors
///
/// Returns an error if the input is truncated mid-coordinate, contains
/// bytes outside the encoding alphabet, or carries more continuation
/// chunks than any value can need.
pub fn decode(encoded: &str) -> Result<Vec<RoutePoint>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut pos = 0usize;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while pos < bytes.len() {
        lat += decode_value(bytes, &mut pos)?;
        lng += decode_value(bytes, &mut pos)?;

        #[allow(clippy::cast_precision_loss)]
        points.push(RoutePoint::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

fn decode_value(bytes: &[u8], pos: &mut usize) -> Result<i64, PolylineError> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(PolylineError::Truncated { position: *pos });
        };
        if byte < 63 {
            return Err(PolylineError::InvalidByte {
                byte,
                position: *pos,
            });
        }

        // 13 chunks cover a zigzagged i64; anything longer is garbage and
        // would overflow the shift.
        if shift >= 64 {
            return Err(PolylineError::Overflow { position: *pos });
        }

        let chunk = i64::from(byte - 63);
        *pos += 1;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    // Undo zigzag
    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_within_precision() {
        let points = vec![
            RoutePoint::new(12.9716, 77.5946),
            RoutePoint::new(12.9721, 77.5951),
            RoutePoint::new(12.9735, 77.5940),
            RoutePoint::new(-33.8675, 151.2070),
        ];

        let decoded = decode(&encode(&points)).unwrap();

        assert_eq!(decoded.len(), points.len());
        for (d, p) in decoded.iter().zip(&points) {
            assert!((d.lat - p.lat).abs() < 1e-5, "lat {} vs {}", d.lat, p.lat);
            assert!((d.lng - p.lng).abs() < 1e-5, "lng {} vs {}", d.lng, p.lng);
        }
    }

    #[test]
    fn known_vector_from_reference_docs() {
        // The canonical example from the polyline algorithm description
        let points = vec![
            RoutePoint::new(38.5, -120.2),
            RoutePoint::new(40.7, -120.95),
            RoutePoint::new(43.252, -126.453),
        ];

        assert_eq!(encode(&points), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn empty_input_encodes_to_empty_string() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn single_point_round_trips() {
        let points = vec![RoutePoint::new(12.97101, 77.59401)];
        let decoded = decode(&encode(&points)).unwrap();
        assert!((decoded[0].lat - 12.97101).abs() < 1e-5);
        assert!((decoded[0].lng - 77.59401).abs() < 1e-5);
    }

    #[test]
    fn truncated_input_is_rejected() {
        let encoded = encode(&[RoutePoint::new(38.5, -120.2)]);
        let cut = &encoded[..encoded.len() - 1];
        assert!(matches!(
            decode(cut),
            Err(PolylineError::Truncated { .. })
        ));
    }

    #[test]
    fn runaway_continuation_chunks_are_rejected() {
        // Every byte flags continuation, so no coordinate ever terminates.
        let endless = "\u{7f}".repeat(20);
        assert!(matches!(
            decode(&endless),
            Err(PolylineError::Overflow { .. })
        ));
    }

    #[test]
    fn invalid_byte_is_rejected() {
        assert!(matches!(
            decode("_p~iF\n~ps|U"),
            Err(PolylineError::InvalidByte { .. })
        ));
    }

    #[test]
    fn long_paths_round_trip() {
        let points: Vec<RoutePoint> = (0..500)
            .map(|i| {
                RoutePoint::new(
                    12.9 + f64::from(i) * 0.00013,
                    77.5 + f64::from(i % 37) * 0.00029,
                )
            })
            .collect();

        let decoded = decode(&encode(&points)).unwrap();
        for (d, p) in decoded.iter().zip(&points) {
            assert!((d.lat - p.lat).abs() < 1e-5);
            assert!((d.lng - p.lng).abs() < 1e-5);
        }
    }
}
