//! 추천 계산 회귀 테스트. 내장 카탈로그 기준.
use roof_fastener_configurator::catalog::{Catalog, InsulationRow, ScrewEntry};
use roof_fastener_configurator::recommendation::{
    compute_recommendation, ConfigurationInput, RoofType, ScrewChoice, SCREW_UNAVAILABLE,
};

fn input(roof_type: RoofType, new_mm: u32, old: Option<u32>) -> ConfigurationInput {
    ConfigurationInput {
        roof_type,
        new_thickness_mm: new_mm,
        has_old_insulation: old.is_some(),
        old_thickness_mm: old.unwrap_or(0),
    }
}

#[test]
fn concrete_140_without_old_layers() {
    let catalog = Catalog::builtin();
    let rec = compute_recommendation(&catalog, &input(RoofType::Concrete, 140, None))
        .expect("row for 140 mm");
    assert_eq!(rec.tube_name, "LDTK 100");
    assert_eq!(rec.tube_length_mm, 100);
    assert_eq!(rec.required_screw_length_mm, 80);
    assert_eq!(rec.screw, ScrewChoice::Catalog("WDB-6,3x80".into()));
    assert_eq!(rec.anchor_depth_mm, 30);
}

#[test]
fn metal_ignores_old_layers() {
    let catalog = Catalog::builtin();
    let with_old = input(RoofType::Metal, 600, Some(80));
    assert_eq!(with_old.effective_old_thickness_mm(), 0);

    let rec = compute_recommendation(&catalog, &with_old).expect("row for 600 mm");
    let plain = compute_recommendation(&catalog, &input(RoofType::Metal, 600, None))
        .expect("row for 600 mm");
    assert_eq!(rec, plain);
    assert_eq!(rec.tube_name, "LDTK 550");
    assert_eq!(rec.screw_name(), "WDS-4,8x80");
    assert_eq!(rec.anchor_depth_mm, 14);
}

#[test]
fn thickness_between_rows_rounds_up_to_next_row() {
    let catalog = Catalog::builtin();
    // 130 mm -> 140 mm 행 (튜브 100, 기본 나사 80)
    let rec = compute_recommendation(&catalog, &input(RoofType::Concrete, 130, None))
        .expect("row");
    assert_eq!(rec.tube_length_mm, 100);
    assert_eq!(rec.required_screw_length_mm, 80);
}

#[test]
fn old_layers_extend_required_screw() {
    let catalog = Catalog::builtin();
    // 140 mm 행: 기본 80 + 기존 30 = 110 -> 120 mm 나사
    let rec = compute_recommendation(&catalog, &input(RoofType::Concrete, 140, Some(30)))
        .expect("row");
    assert_eq!(rec.required_screw_length_mm, 110);
    assert_eq!(rec.screw_name(), "WDB-6,3x120");
}

#[test]
fn old_thickness_ignored_when_flag_off() {
    let catalog = Catalog::builtin();
    let mut inp = input(RoofType::Concrete, 140, None);
    inp.old_thickness_mm = 90;
    assert_eq!(inp.effective_old_thickness_mm(), 0);
    let rec = compute_recommendation(&catalog, &inp).expect("row");
    assert_eq!(rec.required_screw_length_mm, 80);
}

#[test]
fn beyond_table_is_no_match() {
    let catalog = Catalog::builtin();
    let max = |roof| {
        catalog
            .insulation_table(roof)
            .last()
            .map(|r| r.insulation_mm)
            .expect("rows")
    };
    let max_concrete = max(RoofType::Concrete);
    let max_metal = max(RoofType::Metal);

    let at_edge = input(RoofType::Concrete, max_concrete, None);
    assert!(compute_recommendation(&catalog, &at_edge).is_some());
    let past_concrete = input(RoofType::Concrete, max_concrete + 1, None);
    assert!(compute_recommendation(&catalog, &past_concrete).is_none());
    let past_metal = input(RoofType::Metal, max_metal + 1, Some(50));
    assert!(compute_recommendation(&catalog, &past_metal).is_none());
    let thickest = input(RoofType::Concrete, 880, None);
    assert!(compute_recommendation(&catalog, &thickest).is_none());
}

#[test]
fn screw_beyond_catalog_is_sentinel() {
    let catalog = Catalog::builtin();
    // 160 mm 행: 기본 100 + 기존 100 = 200 > 160 (최장 WDB)
    let rec = compute_recommendation(&catalog, &input(RoofType::Concrete, 160, Some(100)))
        .expect("row");
    assert_eq!(rec.screw, ScrewChoice::Unavailable);
    assert!(!rec.screw.is_available());
    assert_eq!(rec.screw_name(), SCREW_UNAVAILABLE);
    assert_eq!(rec.tube_name, "LDTK 100");
    assert_eq!(rec.anchor_depth_mm, 30);
}

#[test]
fn repeated_calls_are_identical() {
    let catalog = Catalog::builtin();
    let before = catalog.clone();
    let inp = input(RoofType::Concrete, 260, Some(40));
    let first = compute_recommendation(&catalog, &inp);
    for _ in 0..5 {
        assert_eq!(compute_recommendation(&catalog, &inp), first);
    }
    assert_eq!(catalog, before);
}

#[test]
fn selection_is_minimal_for_every_input() {
    let catalog = Catalog::builtin();
    for roof in RoofType::ALL {
        let table = catalog.insulation_table(roof);
        let screws = catalog.screws(roof);
        for new_mm in (0..=700).step_by(10) {
            for old in [None, Some(0), Some(20), Some(50), Some(100)] {
                let inp = input(roof, new_mm, old);
                let Some(rec) = compute_recommendation(&catalog, &inp) else {
                    assert!(table.iter().all(|r| r.insulation_mm < new_mm));
                    continue;
                };
                let expected_row = table
                    .iter()
                    .filter(|r| r.insulation_mm >= new_mm)
                    .min_by_key(|r| r.insulation_mm)
                    .expect("some row");
                assert_eq!(rec.tube_length_mm, expected_row.tube_mm);

                let required = expected_row.screw_mm + inp.effective_old_thickness_mm();
                assert_eq!(rec.required_screw_length_mm, required);
                let expected_screw = screws
                    .iter()
                    .filter(|s| s.length_mm >= required)
                    .min_by_key(|s| s.length_mm);
                match expected_screw {
                    Some(s) => assert_eq!(rec.screw_name(), s.code),
                    None => assert_eq!(rec.screw, ScrewChoice::Unavailable),
                }
                assert_eq!(rec.anchor_depth_mm, roof.anchor_depth_mm());
            }
        }
    }
}

#[test]
fn custom_catalog_prefix_and_rows() {
    let catalog = Catalog {
        tube_prefix: "TST".into(),
        concrete_table: vec![InsulationRow::new(100, 70, 60), InsulationRow::new(200, 90, 150)],
        metal_table: vec![InsulationRow::new(100, 40, 60)],
        concrete_screws: vec![ScrewEntry {
            length_mm: 90,
            code: "C90".into(),
        }],
        metal_screws: vec![ScrewEntry {
            length_mm: 40,
            code: "M40".into(),
        }],
    };
    catalog.validate().expect("valid catalog");

    let rec = compute_recommendation(&catalog, &input(RoofType::Concrete, 150, None)).expect("row");
    assert_eq!(rec.tube_name, "TST 150");
    assert_eq!(rec.screw_name(), "C90");

    let rec = compute_recommendation(&catalog, &input(RoofType::Concrete, 150, Some(10)))
        .expect("row");
    assert_eq!(rec.screw, ScrewChoice::Unavailable);
}

#[test]
fn roof_type_parses_codes_and_labels() {
    assert_eq!("concrete".parse::<RoofType>(), Ok(RoofType::Concrete));
    assert_eq!("Stalowy".parse::<RoofType>(), Ok(RoofType::Metal));
    assert!("wood".parse::<RoofType>().is_err());
    assert_eq!(RoofType::Concrete.substrate_label(), "Betonowy");
    assert_eq!(RoofType::Metal.to_string(), "metal");
}
