//! Great-circle distance and display helpers.

pub const EARTH_RADIUS_MILES: f64 = 3958.8;
pub const KM_PER_MILE: f64 = 1.60934;

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
}

/// Haversine distance in miles.
pub fn haversine_miles(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Human readable distance; expects miles already rounded to one decimal.
pub fn format_distance(miles: Option<f64>) -> String {
    match miles {
        None => "Distance unavailable".to_string(),
        Some(d) if d < 1.0 => "< 1 mile away".to_string(),
        Some(d) if d == 1.0 => "1 mile away".to_string(),
        Some(d) if d.fract() == 0.0 => format!("{d:.1} miles away"),
        Some(d) => format!("{d} miles away"),
    }
}

/// Bucket index for the distance summary: 0 = within 5, 1 = within 10,
/// 2 = within 25, 3 = beyond 25 or unknown.
pub fn bucket(miles: Option<f64>) -> usize {
    match miles {
        Some(d) if d <= 5.0 => 0,
        Some(d) if d <= 10.0 => 1,
        Some(d) if d <= 25.0 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint { latitude, longitude, formatted_address: String::new() }
    }

    #[test]
    fn greensboro_to_raleigh_is_about_70_miles() {
        let d = haversine_miles(&pt(36.0726, -79.7920), &pt(35.7796, -78.6382));
        assert!((d - 69.0).abs() < 3.0, "got {d}");
    }

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_miles(&pt(36.0, -80.0), &pt(36.0, -80.0)), 0.0);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_distance(None), "Distance unavailable");
        assert_eq!(format_distance(Some(0.4)), "< 1 mile away");
        assert_eq!(format_distance(Some(1.0)), "1 mile away");
        assert_eq!(format_distance(Some(12.3)), "12.3 miles away");
        assert_eq!(format_distance(Some(15.0)), "15.0 miles away");
        assert_eq!(format_distance(Some(2.0)), "2.0 miles away");
    }

    #[test]
    fn buckets_are_exclusive() {
        assert_eq!(bucket(Some(5.0)), 0);
        assert_eq!(bucket(Some(5.1)), 1);
        assert_eq!(bucket(Some(25.0)), 2);
        assert_eq!(bucket(Some(25.1)), 3);
        assert_eq!(bucket(None), 3);
    }
}
