//! Built-in catalog of Indian maritime boundaries and restricted zones.

use shared::geometry::Coordinate;

use crate::models::boundary::{BoundaryType, BoundaryZone, Severity};

struct ZoneSpec {
    id: &'static str,
    name: &'static str,
    boundary_type: BoundaryType,
    severity: Severity,
    warning_distance: f64,
    description: &'static str,
    consequences: &'static str,
    vertices: &'static [(f64, f64)],
}

const ZONES: &[ZoneSpec] = &[
    ZoneSpec {
        id: "india-eez-west",
        name: "Indian EEZ - Western Coast",
        boundary_type: BoundaryType::Eez,
        severity: Severity::High,
        warning_distance: 2.0,
        description: "Indian Exclusive Economic Zone - 200 nautical miles from baseline",
        consequences: "Fishing beyond EEZ requires special permits and international agreements",
        vertices: &[
            (8.4, 68.0),
            (23.0, 68.0),
            (23.5, 67.0),
            (22.5, 68.5),
            (21.0, 70.0),
            (19.0, 72.0),
            (15.5, 73.5),
            (12.0, 75.0),
            (10.0, 76.0),
            (8.0, 77.0),
        ],
    },
    ZoneSpec {
        id: "india-territorial-west",
        name: "Indian Territorial Waters - West Coast",
        boundary_type: BoundaryType::Territorial,
        severity: Severity::Medium,
        warning_distance: 2.0,
        description: "Indian territorial waters - 12 nautical miles from baseline",
        consequences: "Entry restricted for foreign vessels without permission",
        vertices: &[
            (8.5, 76.8),
            (22.8, 68.2),
            (23.2, 68.0),
            (22.3, 68.8),
            (20.8, 70.2),
            (18.8, 72.2),
            (15.3, 73.7),
            (11.8, 75.2),
            (9.8, 76.2),
            (8.2, 77.2),
        ],
    },
    ZoneSpec {
        id: "pakistan-boundary",
        name: "India-Pakistan Maritime Boundary",
        boundary_type: BoundaryType::Restricted,
        severity: Severity::High,
        warning_distance: 5.0,
        description: "International maritime boundary between India and Pakistan",
        consequences: "Crossing without authorization may lead to detention by naval forces",
        vertices: &[
            (23.8, 68.0),
            (24.0, 67.8),
            (24.2, 67.5),
            (24.5, 67.0),
            (25.0, 66.5),
            (24.8, 66.8),
            (24.5, 67.3),
            (24.2, 67.8),
        ],
    },
    ZoneSpec {
        id: "srilanka-boundary",
        name: "India-Sri Lanka Maritime Boundary",
        boundary_type: BoundaryType::Restricted,
        severity: Severity::High,
        warning_distance: 2.0,
        description: "International maritime boundary between India and Sri Lanka",
        consequences: "Illegal crossing may result in arrest by Sri Lankan Navy",
        vertices: &[
            (9.2, 79.5),
            (8.5, 81.0),
            (7.8, 81.5),
            (7.0, 81.8),
            (6.5, 81.5),
            (7.0, 81.0),
            (7.5, 80.5),
            (8.0, 80.0),
            (8.5, 79.8),
        ],
    },
    ZoneSpec {
        id: "mumbai-naval-restricted",
        name: "Mumbai Naval Restricted Zone",
        boundary_type: BoundaryType::Military,
        severity: Severity::High,
        warning_distance: 3.0,
        description: "Naval base restricted area - Mumbai",
        consequences: "Entry prohibited - Naval security enforcement",
        vertices: &[
            (18.9, 72.7),
            (19.0, 72.8),
            (19.1, 72.9),
            (19.0, 73.0),
            (18.9, 72.9),
            (18.8, 72.8),
        ],
    },
    ZoneSpec {
        id: "kochi-naval-restricted",
        name: "Kochi Naval Restricted Zone",
        boundary_type: BoundaryType::Military,
        severity: Severity::High,
        warning_distance: 3.0,
        description: "Naval base restricted area - Kochi",
        consequences: "Entry prohibited - Naval security enforcement",
        vertices: &[(9.9, 76.2), (10.0, 76.3), (10.1, 76.2), (10.0, 76.1)],
    },
    ZoneSpec {
        id: "vizag-naval-restricted",
        name: "Visakhapatnam Naval Restricted Zone",
        boundary_type: BoundaryType::Military,
        severity: Severity::High,
        warning_distance: 3.0,
        description: "Naval base restricted area - Visakhapatnam",
        consequences: "Entry prohibited - Naval security enforcement",
        vertices: &[(17.6, 83.2), (17.7, 83.3), (17.8, 83.2), (17.7, 83.1)],
    },
    ZoneSpec {
        id: "gulf-mannar-marine-park",
        name: "Gulf of Mannar Marine National Park",
        boundary_type: BoundaryType::Conservation,
        severity: Severity::Medium,
        warning_distance: 1.0,
        description: "Protected marine ecosystem - fishing restrictions apply",
        consequences: "Fishing prohibited without proper permits from forest department",
        vertices: &[(8.8, 78.8), (9.2, 79.2), (9.0, 79.4), (8.6, 79.0)],
    },
    ZoneSpec {
        id: "sundarbans-reserve",
        name: "Sundarbans Marine Reserve",
        boundary_type: BoundaryType::Conservation,
        severity: Severity::Medium,
        warning_distance: 1.0,
        description: "UNESCO World Heritage marine reserve",
        consequences: "Restricted fishing area - special permits required",
        vertices: &[(21.8, 88.8), (22.4, 89.2), (22.2, 89.6), (21.6, 89.2)],
    },
];

/// Returns the built-in zones in catalog order.
pub fn builtin_zones() -> Vec<BoundaryZone> {
    ZONES
        .iter()
        .map(|spec| BoundaryZone {
            id: spec.id.to_string(),
            name: spec.name.to_string(),
            boundary_type: spec.boundary_type,
            severity: spec.severity,
            coordinates: spec
                .vertices
                .iter()
                .map(|&(lat, lon)| Coordinate::new(lat, lon))
                .collect(),
            warning_distance: spec.warning_distance,
            description: spec.description.to_string(),
            consequences: Some(spec.consequences.to_string()),
        })
        .collect()
}
