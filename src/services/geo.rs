//! Utilidades geográficas
//!
//! Distancia Haversine y aproximación de ubicación por privacidad.
//! La búsqueda de zonas cercanas y el enmascarado de direcciones de
//! vendedores usan estas funciones.

use serde::Serialize;

/// Radio medio de la Tierra en kilómetros
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distancia Haversine entre dos coordenadas, en kilómetros
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Ubicación aproximada expuesta en la API en lugar de la exacta
#[derive(Debug, Clone, Serialize)]
pub struct ApproximateLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub precision: &'static str,
}

/// Aproximar coordenadas a granularidad de ciudad (~1 km)
///
/// Redondear a 2 decimales deja la posición dentro de un radio de ~1 km,
/// suficiente para mostrar la zona sin revelar la dirección del vendedor.
pub fn approximate_location(latitude: f64, longitude: f64) -> ApproximateLocation {
    ApproximateLocation {
        latitude: round_to(latitude, 2),
        longitude: round_to(longitude, 2),
        precision: "city",
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Filtrar y ordenar items por distancia a un punto dentro de un radio
pub fn rank_by_distance<T>(
    items: Vec<T>,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    coords: impl Fn(&T) -> (f64, f64),
) -> Vec<(T, f64)> {
    let mut ranked: Vec<(T, f64)> = items
        .into_iter()
        .map(|item| {
            let (lat, lng) = coords(&item);
            let distance = haversine_km(latitude, longitude, lat, lng);
            (item, distance)
        })
        .filter(|(_, distance)| *distance <= radius_km)
        .collect();

    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_identical_points_is_zero() {
        assert_eq!(haversine_km(40.4168, -3.7038, 40.4168, -3.7038), 0.0);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let d1 = haversine_km(40.4168, -3.7038, 41.3874, 2.1686);
        let d2 = haversine_km(41.3874, 2.1686, 40.4168, -3.7038);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_madrid_barcelona() {
        // Madrid -> Barcelona ~504 km en línea recta
        let d = haversine_km(40.4168, -3.7038, 41.3874, 2.1686);
        assert!(d > 480.0 && d < 530.0, "distancia fuera de rango: {}", d);
    }

    #[test]
    fn test_approximate_location_rounds_coordinates() {
        let approx = approximate_location(40.416775, -3.703790);
        assert_eq!(approx.latitude, 40.42);
        assert_eq!(approx.longitude, -3.70);
        assert_eq!(approx.precision, "city");
    }

    #[test]
    fn test_rank_by_distance_filters_and_sorts() {
        let points = vec![
            ("lejos", 41.3874, 2.1686),   // Barcelona, ~504 km
            ("cerca", 40.42, -3.70),      // Madrid centro
            ("media", 40.96, -5.66),      // Salamanca, ~170 km
        ];
        let ranked = rank_by_distance(points, 40.4168, -3.7038, 200.0, |p| (p.1, p.2));

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0 .0, "cerca");
        assert_eq!(ranked[1].0 .0, "media");
        assert!(ranked[0].1 < ranked[1].1);
    }
}
