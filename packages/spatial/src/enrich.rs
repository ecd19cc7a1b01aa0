//! Attributes zoning and assessed value to buildings.
//!
//! Each building is represented by the centroid of its footprint. The
//! centroid is looked up independently in a zoning index and an
//! assessment index built for this call only.

use city3d_scene_models::{AssessmentParcel, Building, UNKNOWN_ZONING, ZoningPolygon};

use crate::{SpatialIndex, representative_point};

/// Populates `zoning` and `assessed_value` on every building.
///
/// Both fields are reset first: buildings without a geometry, or whose
/// centroid falls outside every polygon, end up with `"Unknown"` and
/// `None`. Geometry problems never abort the batch.
#[must_use]
pub fn enrich(
    mut buildings: Vec<Building>,
    zoning: &[ZoningPolygon],
    parcels: &[AssessmentParcel],
) -> Vec<Building> {
    let zoning_index = SpatialIndex::build(zoning.iter().map(|z| z.geometry.as_ref()));
    let parcel_index = SpatialIndex::build(parcels.iter().map(|p| p.geometry.as_ref()));

    log::debug!(
        "Enriching {} buildings against {} zoning polygons and {} parcels",
        buildings.len(),
        zoning_index.len(),
        parcel_index.len()
    );

    let mut zoned = 0_usize;
    let mut assessed = 0_usize;

    for building in &mut buildings {
        building.zoning = UNKNOWN_ZONING.to_string();
        building.assessed_value = None;

        let Some(point) = building.geometry.as_ref().and_then(representative_point) else {
            continue;
        };

        if let Some(district) = zoning_index
            .query_containing(point)
            .and_then(|i| zoning.get(i))
        {
            building.zoning.clone_from(&district.zoning);
            zoned += 1;
        }

        if let Some(parcel) = parcel_index
            .query_containing(point)
            .and_then(|i| parcels.get(i))
        {
            building.assessed_value = parcel.assessed_value;
            assessed += 1;
        }
    }

    log::debug!("Matched zoning for {zoned} and assessments for {assessed} buildings");

    buildings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::square;

    fn building(geometry: Option<geojson::Geometry>) -> Building {
        Building {
            id: None,
            geometry,
            height_m: 12.0,
            levels: 4,
            address: None,
            zoning: "R-C1".to_string(),
            assessed_value: Some(1.0),
            building_use: None,
            raw: serde_json::Map::new(),
        }
    }

    fn district(geometry: geojson::Geometry, label: &str) -> ZoningPolygon {
        ZoningPolygon {
            geometry: Some(geometry),
            zoning: label.to_string(),
        }
    }

    fn parcel(geometry: geojson::Geometry, value: f64) -> AssessmentParcel {
        AssessmentParcel {
            geometry: Some(geometry),
            assessed_value: Some(value),
            address: "1 Main St".to_string(),
        }
    }

    #[test]
    fn building_without_geometry_is_never_matched() {
        let zoning = [district(square(-100.0, -100.0, 200.0), "RC-G")];
        let parcels = [parcel(square(-100.0, -100.0, 200.0), 420_000.0)];
        let enriched = enrich(vec![building(None)], &zoning, &parcels);
        assert_eq!(enriched[0].zoning, UNKNOWN_ZONING);
        assert!(enriched[0].assessed_value.is_none());
    }

    #[test]
    fn building_inside_single_district_gets_its_label() {
        let zoning = [
            district(square(10.0, 10.0, 1.0), "C-COR"),
            district(square(0.0, 0.0, 2.0), "RC-G"),
        ];
        let parcels = [parcel(square(0.0, 0.0, 2.0), 420_000.0)];
        let enriched = enrich(
            vec![building(Some(square(0.5, 0.5, 0.5)))],
            &zoning,
            &parcels,
        );
        assert_eq!(enriched[0].zoning, "RC-G");
        assert_eq!(enriched[0].assessed_value, Some(420_000.0));
    }

    #[test]
    fn overlapping_districts_use_first_in_input_order() {
        let zoning = [
            district(square(0.0, 0.0, 4.0), "M-G"),
            district(square(0.5, 0.5, 1.0), "RC-G"),
        ];
        let enriched = enrich(vec![building(Some(square(0.75, 0.75, 0.5)))], &zoning, &[]);
        assert_eq!(enriched[0].zoning, "M-G");
    }

    #[test]
    fn lookups_are_independent() {
        let zoning = [district(square(0.0, 0.0, 2.0), "RC-G")];
        let parcels = [parcel(square(50.0, 50.0, 2.0), 1.0)];
        let enriched = enrich(vec![building(Some(square(0.5, 0.5, 0.5)))], &zoning, &parcels);
        assert_eq!(enriched[0].zoning, "RC-G");
        assert!(enriched[0].assessed_value.is_none());
    }

    #[test]
    fn no_polygons_resets_every_building() {
        let buildings = vec![building(Some(square(0.0, 0.0, 1.0))), building(None)];
        let enriched = enrich(buildings, &[], &[]);
        assert_eq!(enriched.len(), 2);
        for b in &enriched {
            assert_eq!(b.zoning, UNKNOWN_ZONING);
            assert!(b.assessed_value.is_none());
        }
    }

    #[test]
    fn polygons_without_geometry_are_ignored() {
        let zoning = [
            ZoningPolygon {
                geometry: None,
                zoning: "DC".to_string(),
            },
            district(square(0.0, 0.0, 2.0), "RC-G"),
        ];
        let enriched = enrich(vec![building(Some(square(0.5, 0.5, 0.5)))], &zoning, &[]);
        assert_eq!(enriched[0].zoning, "RC-G");
    }
}
