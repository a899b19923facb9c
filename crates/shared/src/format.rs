//! Display helpers for distances.

/// Formats a distance in kilometers for display.
///
/// Below 1 km the value is shown in whole meters (`"450m"`), otherwise in
/// kilometers with one decimal (`"2.3km"`).
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0}m", km * 1000.0)
    } else {
        format!("{:.1}km", km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_distance_meters() {
        assert_eq!(format_distance(0.45), "450m");
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(0.9994), "999m");
    }

    #[test]
    fn test_format_distance_kilometers() {
        assert_eq!(format_distance(2.34), "2.3km");
        assert_eq!(format_distance(1.0), "1.0km");
        assert_eq!(format_distance(12.0), "12.0km");
    }
}
