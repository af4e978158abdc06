use std::sync::Arc;

/// A WGS-84 position, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64, alt_m: f64) -> Self {
        GeoPoint { lat, lon, alt_m }
    }
}

/// Distance between two points, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Separation {
    pub horizontal_m: f64,
    /// `from.alt_m - to.alt_m`
    pub vertical_m: f64,
}

pub trait DistanceModel: Send + Sync {
    fn separation(&self, from: &GeoPoint, to: &GeoPoint) -> Separation;

    fn horizontal_m(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        self.separation(from, to).horizontal_m
    }
}

pub type SharedDistance = Arc<dyn DistanceModel>;

/// Great circle distance on a sphere with the mean earth radius.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wgs84Haversine;

impl Wgs84Haversine {
    pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

    pub fn shared() -> SharedDistance {
        Arc::new(Wgs84Haversine)
    }
}

impl DistanceModel for Wgs84Haversine {
    fn separation(&self, from: &GeoPoint, to: &GeoPoint) -> Separation {
        let lat1 = from.lat.to_radians();
        let lat2 = to.lat.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (to.lon - from.lon).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        Separation {
            horizontal_m: Self::EARTH_RADIUS_M * c,
            vertical_m: from.alt_m - to.alt_m,
        }
    }
}
