#[cfg(test)]
mod tests {
    use pantry_pilot::units::{
        can_convert, convert_unit, format_quantity, normalize_unit, unit_category, UnitCategory,
        SELECTABLE_UNITS, UNIT_ALIASES,
    };

    const SAMPLE_UNITS: &[&str] = &[
        "tsp", "T", "t", "Tablespoons", "cups", "C", "mL", "ML", "l", "L", "Liters", "grams",
        "KG", "Kilo", "ounce", "lbs", "LB", "pcs", "each", "doz", "pinch", "Clove", "  cup  ", "",
    ];

    #[test]
    fn test_canonical_units_are_kept() {
        for unit in SELECTABLE_UNITS {
            assert_eq!(normalize_unit(unit.value), unit.value);
        }
    }

    #[test]
    fn test_aliases_resolve_to_canonical() {
        for (alias, canonical) in UNIT_ALIASES {
            assert_eq!(normalize_unit(alias), *canonical, "alias '{}'", alias);
        }
    }

    #[test]
    fn test_case_sensitive_single_letter_aliases() {
        assert_eq!(normalize_unit("t"), "tsp");
        assert_eq!(normalize_unit("T"), "tbsp");
        assert_eq!(normalize_unit("l"), "L");
        assert_eq!(normalize_unit("c"), "cup");
        assert_eq!(normalize_unit("C"), "cup");
    }

    #[test]
    fn test_case_insensitive_fallback() {
        assert_eq!(normalize_unit("TABLESPOONS"), "tbsp");
        assert_eq!(normalize_unit("Grams"), "g");
        assert_eq!(normalize_unit("ML"), "ml");
        assert_eq!(normalize_unit("Lbs"), "lb");
    }

    #[test]
    fn test_unknown_units_are_lowercased() {
        assert_eq!(normalize_unit("Pinch"), "pinch");
        assert_eq!(normalize_unit("  Clove "), "clove");
        assert_eq!(normalize_unit(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for unit in SAMPLE_UNITS {
            let once = normalize_unit(unit);
            assert_eq!(normalize_unit(&once), once, "input '{}'", unit);
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(unit_category("cups"), Some(UnitCategory::Volume));
        assert_eq!(unit_category("L"), Some(UnitCategory::Volume));
        assert_eq!(unit_category("pounds"), Some(UnitCategory::Weight));
        assert_eq!(unit_category("dozen"), Some(UnitCategory::Count));
        assert_eq!(unit_category("pinch"), None);
        assert_eq!(UnitCategory::Volume.base_unit(), "ml");
    }

    #[test]
    fn test_can_convert_requires_shared_known_category() {
        assert!(can_convert("tsp", "tbsp"));
        assert!(can_convert("kg", "oz"));
        assert!(can_convert("doz", "piece"));
        for a in SAMPLE_UNITS {
            for b in SAMPLE_UNITS {
                let expected = match (unit_category(a), unit_category(b)) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                };
                assert_eq!(can_convert(a, b), expected, "{} -> {}", a, b);
            }
        }
    }

    #[test]
    fn test_convert_identity() {
        for unit in SELECTABLE_UNITS {
            assert_eq!(convert_unit(3.5, unit.value, unit.value), Some(3.5));
        }
        assert_eq!(convert_unit(2.0, "tablespoons", "T"), Some(2.0));
    }

    #[test]
    fn test_convert_known_values() {
        assert_eq!(convert_unit(1.0, "kg", "g"), Some(1000.0));
        assert_eq!(convert_unit(2.0, "dozen", "pieces"), Some(24.0));
        let ml = convert_unit(1.0, "cup", "ml").unwrap();
        assert!((ml - 236.588).abs() < 1e-9);
        let tbsp = convert_unit(3.0, "tsp", "tbsp").unwrap();
        assert!((tbsp - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_convert_round_trips() {
        let values = [0.25, 1.0, 3.0, 17.5, 1000.0];
        for from in SELECTABLE_UNITS {
            for to in SELECTABLE_UNITS {
                if !can_convert(from.value, to.value) {
                    continue;
                }
                for value in values {
                    let there = convert_unit(value, from.value, to.value).unwrap();
                    let back = convert_unit(there, to.value, from.value).unwrap();
                    assert!(
                        (back - value).abs() < 1e-9 * value.max(1.0),
                        "{} {} -> {} -> {}",
                        value,
                        from.value,
                        to.value,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn test_convert_across_categories_fails() {
        assert_eq!(convert_unit(1.0, "cup", "g"), None);
        assert_eq!(convert_unit(1.0, "piece", "kg"), None);
        assert_eq!(convert_unit(1.0, "pinch", "tsp"), None);
        assert_eq!(convert_unit(1.0, "pinch", "dash"), None);
    }

    #[test]
    fn test_format_whole_numbers() {
        assert_eq!(format_quantity(0.0), "0");
        assert_eq!(format_quantity(1.0), "1");
        assert_eq!(format_quantity(16.0), "16");
        assert_eq!(format_quantity(2.004), "2");
    }

    #[test]
    fn test_format_fractions() {
        assert_eq!(format_quantity(0.5), "½");
        assert_eq!(format_quantity(0.25), "¼");
        assert_eq!(format_quantity(0.75), "¾");
        assert_eq!(format_quantity(0.125), "⅛");
        assert_eq!(format_quantity(0.375), "⅜");
        assert_eq!(format_quantity(0.625), "⅝");
        assert_eq!(format_quantity(0.875), "⅞");
        assert_eq!(format_quantity(1.0 / 3.0), "⅓");
        assert_eq!(format_quantity(2.0 / 3.0), "⅔");
        assert_eq!(format_quantity(2.5), "2½");
        assert_eq!(format_quantity(1.333), "1⅓");
    }

    #[test]
    fn test_format_thirds_have_tight_tolerance() {
        assert_eq!(format_quantity(0.35), "0.35");
        assert_eq!(format_quantity(0.65), "0.65");
        assert_eq!(format_quantity(0.64), "⅝");
        assert_eq!(format_quantity(0.69), "0.69");
    }

    #[test]
    fn test_format_decimal_fallback() {
        assert_eq!(format_quantity(1.234), "1.23");
        assert_eq!(format_quantity(0.1), "0.1");
        assert_eq!(format_quantity(3.456), "3.46");
    }

    #[test]
    fn test_format_never_negative() {
        let values = [-0.0, -1.0, -0.5, -2.25, -1.234, -100.0, -0.001, 4.5, -1e6];
        for value in values {
            let rendered = format_quantity(value);
            assert!(!rendered.contains('-'), "{} rendered as {}", value, rendered);
        }
        assert_eq!(format_quantity(-1.5), "1½");
    }
}
