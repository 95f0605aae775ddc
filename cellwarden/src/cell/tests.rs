//! Tests for cell keys and regions

use super::*;
use proptest::prelude::*;
use std::collections::HashSet;

#[test]
fn test_key_canonical_form() {
    let key = CellKey::new("overworld", -3, 12);
    assert_eq!(key.to_string(), "overworld:-3:12");
}

#[test]
fn test_key_parse_round_trip() {
    let key: CellKey = "overworld:-3:12".parse().unwrap();
    assert_eq!(key, CellKey::new("overworld", -3, 12));
}

#[test]
fn test_key_parse_world_with_separator() {
    let key: CellKey = "mods:nether:4:5".parse().unwrap();
    assert_eq!(key.world(), "mods:nether");
    assert_eq!(key.x(), 4);
    assert_eq!(key.z(), 5);
}

#[test]
fn test_key_parse_rejects_missing_parts() {
    assert_eq!(
        "overworld:3".parse::<CellKey>(),
        Err(CellError::MalformedKey("overworld:3".to_string()))
    );
    assert!(":1:2".parse::<CellKey>().is_err());
}

#[test]
fn test_key_parse_rejects_non_numeric() {
    let result = "w:abc:2".parse::<CellKey>();
    assert_eq!(result, Err(CellError::InvalidCoordinate("abc".to_string())));
}

#[test]
fn test_parse_coordinate_trims_whitespace() {
    assert_eq!(parse_coordinate(" -7 "), Ok(-7));
    assert!(parse_coordinate("7.5").is_err());
}

#[test]
fn test_keys_order_by_world_then_position() {
    let mut keys = vec![
        CellKey::new("b", 0, 0),
        CellKey::new("a", 1, 0),
        CellKey::new("a", 0, 5),
        CellKey::new("a", 0, -1),
    ];
    keys.sort();
    assert_eq!(
        keys,
        vec![
            CellKey::new("a", 0, -1),
            CellKey::new("a", 0, 5),
            CellKey::new("a", 1, 0),
            CellKey::new("b", 0, 0),
        ]
    );
}

#[test]
fn test_region_radius_zero_is_single_cell() {
    let center = CellKey::new("w", 8, -2);
    let region = Region::around(center.clone(), 0).unwrap();
    let cells: Vec<_> = region.cells().collect();
    assert_eq!(cells, vec![center]);
}

#[test]
fn test_region_row_major_order() {
    let region = Region::around(CellKey::new("w", 0, 0), 1).unwrap();
    let cells: Vec<_> = region.cells().map(|k| (k.x(), k.z())).collect();
    assert_eq!(
        cells,
        vec![
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 0),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ]
    );
}

#[test]
fn test_region_rejects_negative_radius() {
    let result = Region::around(CellKey::new("w", 0, 0), -1);
    assert_eq!(result, Err(CellError::NegativeRadius(-1)));
}

#[test]
fn test_region_rejects_overflow() {
    let result = Region::around(CellKey::new("w", i32::MAX, 0), 1);
    assert!(matches!(result, Err(CellError::CoordinateOverflow { .. })));
}

#[test]
fn test_region_keeps_world() {
    let region = Region::around(CellKey::new("nether", 3, 3), 2).unwrap();
    assert!(region.cells().all(|k| k.world() == "nether"));
}

proptest! {
    /// Property: a region of radius r yields exactly (2r+1)² distinct cells.
    #[test]
    fn prop_region_yields_distinct_square(
        x in -10_000i32..10_000,
        z in -10_000i32..10_000,
        radius in 0i32..20,
    ) {
        let region = Region::around(CellKey::new("w", x, z), radius).unwrap();
        let expected = ((2 * radius + 1) * (2 * radius + 1)) as usize;

        let cells: Vec<_> = region.cells().collect();
        let distinct: HashSet<_> = cells.iter().cloned().collect();

        prop_assert_eq!(cells.len(), expected);
        prop_assert_eq!(distinct.len(), expected);
        prop_assert_eq!(region.cells().len(), expected);
    }

    /// Property: every cell lies within the radius of the center.
    #[test]
    fn prop_region_cells_within_radius(
        x in -10_000i32..10_000,
        z in -10_000i32..10_000,
        radius in 0i32..20,
    ) {
        let region = Region::around(CellKey::new("w", x, z), radius).unwrap();
        for cell in region.cells() {
            prop_assert!((cell.x() - x).abs() <= radius);
            prop_assert!((cell.z() - z).abs() <= radius);
        }
    }
}
