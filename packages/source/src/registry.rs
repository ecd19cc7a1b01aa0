//! Compile-time registry of open-data datasets.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Entries of the same [`DatasetKind`] are tried in registry order, so the
//! preferred dataset for a kind must come first.

use serde::Deserialize;

use crate::DatasetKind;

#[cfg(test)]
const EXPECTED_DATASET_COUNT: usize = 4;

/// Embedded TOML dataset definitions.
const DATASET_TOMLS: &[(&str, &str)] = &[
    ("buildings_3d", include_str!("../datasets/buildings_3d.toml")),
    ("buildings_2d", include_str!("../datasets/buildings_2d.toml")),
    ("land_use", include_str!("../datasets/land_use.toml")),
    ("assessments", include_str!("../datasets/assessments.toml")),
];

/// One dataset published on the open-data portal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetDefinition {
    /// Registry identifier (e.g., `"buildings_3d"`).
    pub id: String,
    /// Human-readable dataset title.
    pub name: String,
    /// Portal resource identifier (e.g., `"cchr-krqg"`).
    pub dataset_id: String,
    /// What the dataset contains.
    pub kind: DatasetKind,
}

/// Returns all registered datasets in preference order.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by tests.
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse dataset '{name}': {e}"))
        })
        .collect()
}

/// Returns the datasets of `kind`, preferred first.
#[must_use]
pub fn datasets_for(kind: DatasetKind) -> Vec<DatasetDefinition> {
    all_datasets()
        .into_iter()
        .filter(|d| d.kind == kind)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn loads_all_datasets() {
        let datasets = all_datasets();
        assert_eq!(
            datasets.len(),
            EXPECTED_DATASET_COUNT,
            "Expected {EXPECTED_DATASET_COUNT} datasets, found {}. \
             Update EXPECTED_DATASET_COUNT after adding/removing datasets.",
            datasets.len()
        );
    }

    #[test]
    fn dataset_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for dataset in &all_datasets() {
            assert!(seen.insert(dataset.id.clone()), "Duplicate dataset ID: {}", dataset.id);
        }
    }

    #[test]
    fn toml_names_match_ids() {
        for ((name, _), dataset) in DATASET_TOMLS.iter().zip(all_datasets()) {
            assert_eq!(*name, dataset.id);
        }
    }

    #[test]
    fn three_d_buildings_are_preferred() {
        let ids: Vec<String> = datasets_for(DatasetKind::Buildings)
            .into_iter()
            .map(|d| d.dataset_id)
            .collect();
        assert_eq!(ids, ["cchr-krqg", "uc4c-6kbd"]);
    }

    #[test]
    fn every_kind_has_a_dataset() {
        for kind in [
            DatasetKind::Buildings,
            DatasetKind::LandUse,
            DatasetKind::Assessments,
        ] {
            assert!(!datasets_for(kind).is_empty(), "No dataset for {kind}");
        }
    }
}
