use std::fs;

use roof_fastener_configurator::catalog::{Catalog, CatalogError};
use roof_fastener_configurator::recommendation::RoofType;

const SMALL_CATALOG: &str = r#"
tube_prefix = "LDTK"

[[concrete_table]]
insulation_mm = 100
screw_mm = 70
tube_mm = 50

[[concrete_table]]
insulation_mm = 200
screw_mm = 80
tube_mm = 150

[[metal_table]]
insulation_mm = 100
screw_mm = 40
tube_mm = 50

[[concrete_screws]]
length_mm = 80
code = "WDB-6,3x80"

[[metal_screws]]
length_mm = 40
code = "WDS-4,8x40"
"#;

#[test]
fn builtin_catalog_is_valid_and_ascending() {
    let catalog = Catalog::builtin();
    catalog.validate().expect("builtin catalog");
    for roof in RoofType::ALL {
        let table = catalog.insulation_table(roof);
        assert!(table.windows(2).all(|w| w[0].insulation_mm < w[1].insulation_mm));
        let screws = catalog.screws(roof);
        assert!(screws.windows(2).all(|w| w[0].length_mm < w[1].length_mm));
    }
    let last = |roof| catalog.insulation_table(roof).last().copied();
    assert_eq!(last(RoofType::Concrete).map(|r| r.insulation_mm), Some(500));
    assert_eq!(last(RoofType::Metal).map(|r| r.insulation_mm), Some(600));
}

#[test]
fn parses_catalog_from_toml() {
    let catalog = Catalog::from_toml_str(SMALL_CATALOG).expect("parse");
    assert_eq!(catalog.concrete_table.len(), 2);
    assert_eq!(catalog.screws(RoofType::Metal)[0].code, "WDS-4,8x40");
}

#[test]
fn rejects_unsorted_table() {
    let src = SMALL_CATALOG.replace("insulation_mm = 200", "insulation_mm = 90");
    match Catalog::from_toml_str(&src) {
        Err(CatalogError::NotAscending { table, prev, next }) => {
            assert_eq!(table, "concrete");
            assert_eq!((prev, next), (100, 90));
        }
        other => panic!("expected NotAscending, got {other:?}"),
    }
}

#[test]
fn rejects_empty_and_unnamed_entries() {
    let mut catalog = Catalog::builtin();
    catalog.metal_screws.clear();
    assert!(matches!(catalog.validate(), Err(CatalogError::Empty("metal"))));

    let mut catalog = Catalog::builtin();
    catalog.concrete_screws[0].code = " ".into();
    assert!(matches!(
        catalog.validate(),
        Err(CatalogError::MissingCode { table: "concrete", .. })
    ));

    let mut catalog = Catalog::builtin();
    catalog.tube_prefix.clear();
    assert!(matches!(catalog.validate(), Err(CatalogError::MissingTubePrefix)));
}

#[test]
fn builtin_catalog_survives_toml_round_trip_through_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("catalog.toml");
    fs::write(&path, toml::to_string_pretty(&Catalog::builtin()).expect("ser")).expect("write");
    let loaded = Catalog::load(&path).expect("load");
    assert_eq!(loaded, Catalog::builtin());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Catalog::load(&dir.path().join("none.toml")).unwrap_err();
    assert!(matches!(err, CatalogError::Io(_)));
}
