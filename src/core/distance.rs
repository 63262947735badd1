use crate::core::EngineError;
use crate::models::GeoPoint;

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Human-readable distance label
///
/// Below 1000 meters the value is shown in whole meters (`"450m"`),
/// otherwise in kilometers with at most two decimals (`"2.3km"`).
pub fn format_distance(distance_km: f64) -> String {
    let meters = (distance_km.max(0.0) * 1000.0).round();
    if meters < 1000.0 {
        return format!("{}m", meters as i64);
    }

    let km = format!("{:.2}", meters / 1000.0);
    let km = km.trim_end_matches('0').trim_end_matches('.');
    format!("{km}km")
}

/// Validate a single coordinate pair
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<GeoPoint, EngineError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(EngineError::InvalidInput(format!(
            "latitude must be between -90 and 90 (got {latitude})"
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(EngineError::InvalidInput(format!(
            "longitude must be between -180 and 180 (got {longitude})"
        )));
    }

    Ok(GeoPoint { latitude, longitude })
}

/// Resolve optional caller coordinates into a ranking origin.
///
/// Ranking needs both values; with either one absent the feed falls back to
/// unranked mode.
pub fn resolve_origin(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<GeoPoint>, EngineError> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => validate_coordinates(lat, lon).map(Some),
        _ => Ok(None),
    }
}
