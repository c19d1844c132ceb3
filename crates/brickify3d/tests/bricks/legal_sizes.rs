use brickify3d::bricks::{BrickFamily, BrickSize, LegalSizeTable};
use brickify3d::pipeline::{BuildSettings, ConfigError};

#[test]
fn footprints_are_allowed_in_both_orientations() {
    let table = LegalSizeTable::from_footprints(BrickFamily::Plates, &[(1, 1), (1, 3)]).unwrap();

    assert!(table.contains(&BrickSize::new(1, 3, 1)));
    assert!(table.contains(&BrickSize::new(3, 1, 1)));
    assert!(!table.contains(&BrickSize::new(1, 3, 3)));
    assert_eq!(table.base_size(), BrickSize::unit(1));
}

#[test]
fn tables_without_the_unit_size_are_rejected() {
    assert_eq!(
        LegalSizeTable::from_footprints(BrickFamily::Bricks, &[(2, 2)]),
        Err(ConfigError::MissingBaseSize { height: 3 })
    );
    assert_eq!(
        LegalSizeTable::new(BrickFamily::Bricks, vec![]),
        Err(ConfigError::EmptySizeTable)
    );
}

#[test]
fn invalid_settings_are_rejected_before_any_work() {
    let settings = BuildSettings {
        custom_footprints: Some(vec![(2, 4)]),
        ..BuildSettings::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::MissingBaseSize { .. })
    ));

    let settings = BuildSettings {
        brick_height: 0.0,
        ..BuildSettings::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::InvalidValue { field: "brick_height", .. })
    ));
}
