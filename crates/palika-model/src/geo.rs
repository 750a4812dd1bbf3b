use crate::ids::ValidationError;
use serde_json::{json, Value};

pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Permissive check used before rendering a stored location payload.
///
/// True iff `value` is a GeoJSON object with `type == "Point"` and a
/// two-element `coordinates` pair of longitude then latitude, both in range.
/// Callers drop the location on `false` instead of erroring; field devices
/// have produced every malformed shape imaginable.
#[must_use]
pub fn is_valid_point(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if obj.get("type").and_then(Value::as_str) != Some("Point") {
        return false;
    }
    let Some(coords) = obj.get("coordinates").and_then(Value::as_array) else {
        return false;
    };
    if coords.len() != 2 {
        return false;
    }
    let (Some(lon), Some(lat)) = (coords[0].as_f64(), coords[1].as_f64()) else {
        return false;
    };
    (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&lon)
        && (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&lat)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn parse(value: &Value) -> Result<Self, ValidationError> {
        if !is_valid_point(value) {
            return Err(ValidationError(
                "expected a GeoJSON Point with in-range coordinates".to_string(),
            ));
        }
        let coords = value["coordinates"]
            .as_array()
            .ok_or_else(|| ValidationError("point coordinates missing".to_string()))?;
        let longitude = coords[0]
            .as_f64()
            .ok_or_else(|| ValidationError("longitude is not a number".to_string()))?;
        let latitude = coords[1]
            .as_f64()
            .ok_or_else(|| ValidationError("latitude is not a number".to_string()))?;
        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn parse_str(raw: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ValidationError(format!("point is not valid JSON: {e}")))?;
        Self::parse(&value)
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({"type": "Point", "coordinates": [self.longitude, self.latitude]})
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPolygon {
    pub rings: Vec<Vec<(f64, f64)>>,
}

impl GeoPolygon {
    pub fn parse(value: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = value.as_object() else {
            return Err(ValidationError("polygon must be an object".to_string()));
        };
        if obj.get("type").and_then(Value::as_str) != Some("Polygon") {
            return Err(ValidationError(
                "geometry type must be \"Polygon\"".to_string(),
            ));
        }
        let raw_rings = obj
            .get("coordinates")
            .and_then(Value::as_array)
            .ok_or_else(|| ValidationError("polygon coordinates missing".to_string()))?;
        if raw_rings.is_empty() {
            return Err(ValidationError(
                "polygon must have at least one ring".to_string(),
            ));
        }
        let mut rings = Vec::with_capacity(raw_rings.len());
        for raw_ring in raw_rings {
            let positions = raw_ring
                .as_array()
                .ok_or_else(|| ValidationError("polygon ring must be an array".to_string()))?;
            if positions.len() < 4 {
                return Err(ValidationError(
                    "polygon ring must hold at least 4 positions".to_string(),
                ));
            }
            let mut ring = Vec::with_capacity(positions.len());
            for position in positions {
                let pair = position
                    .as_array()
                    .ok_or_else(|| ValidationError("polygon position must be a pair".to_string()))?;
                if pair.len() != 2 {
                    return Err(ValidationError(
                        "polygon position must be a pair".to_string(),
                    ));
                }
                let (Some(lon), Some(lat)) = (pair[0].as_f64(), pair[1].as_f64()) else {
                    return Err(ValidationError(
                        "polygon position must be numeric".to_string(),
                    ));
                };
                if !(LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&lon)
                    || !(LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&lat)
                {
                    return Err(ValidationError(
                        "polygon position out of range".to_string(),
                    ));
                }
                ring.push((lon, lat));
            }
            if ring.first() != ring.last() {
                return Err(ValidationError(
                    "polygon ring must close on its first position".to_string(),
                ));
            }
            rings.push(ring);
        }
        Ok(Self { rings })
    }

    pub fn parse_str(raw: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ValidationError(format!("polygon is not valid JSON: {e}")))?;
        Self::parse(&value)
    }

    /// Outer-ring vertex mean, skipping the closing position. Good enough as
    /// a map anchor when the survey tool sent no centroid of its own.
    #[must_use]
    pub fn centroid(&self) -> GeoPoint {
        let ring = &self.rings[0];
        let open = &ring[..ring.len() - 1];
        let n = open.len() as f64;
        let (lon_sum, lat_sum) = open
            .iter()
            .fold((0.0, 0.0), |(lo, la), (x, y)| (lo + x, la + y));
        GeoPoint {
            longitude: lon_sum / n,
            latitude: lat_sum / n,
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        let rings: Vec<Value> = self
            .rings
            .iter()
            .map(|ring| {
                Value::Array(
                    ring.iter()
                        .map(|(lon, lat)| json!([lon, lat]))
                        .collect(),
                )
            })
            .collect();
        json!({"type": "Polygon", "coordinates": rings})
    }
}
