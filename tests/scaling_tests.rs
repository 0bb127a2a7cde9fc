#[cfg(test)]
mod tests {
    use pantry_pilot::config::RecipeConfig;
    use pantry_pilot::markup::{parse_recipe, ParsedIngredient};
    use pantry_pilot::resolver::IngredientId;
    use pantry_pilot::scaling::{
        apply_deduction, compute_deduction, effective_servings, plan_deductions, scale,
        scale_recipe, StockItem,
    };

    fn linked(name: &str, quantity: Option<f64>, unit: Option<&str>) -> ParsedIngredient {
        let mut ingredient = ParsedIngredient::new(name, quantity, unit.map(str::to_string));
        ingredient.ingredient_id = Some(IngredientId::new(name));
        ingredient
    }

    fn stock(name: &str, quantity: f64, unit: &str) -> StockItem {
        StockItem {
            ingredient_id: IngredientId::new(name),
            quantity,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_scale_ratio() {
        assert_eq!(scale(2.0, 4, 8), 4.0);
        assert_eq!(scale(4.0, 8, 2), 1.0);
        assert_eq!(scale(1.5, 2, 2), 1.5);
        assert_eq!(scale(5.0, 4, 0), 0.0);
    }

    #[test]
    fn test_scale_zero_base_counts_as_one() {
        assert_eq!(scale(2.0, 0, 8), 16.0);
        assert_eq!(scale(2.0, 0, 8), scale(2.0, 1, 8));
    }

    #[test]
    fn test_effective_servings() {
        let config = RecipeConfig::default();
        let declared = parse_recipe(">> servings: 2\nCook @rice{1%cup}.");
        assert_eq!(effective_servings(&declared, &config), 2);

        let undeclared = parse_recipe("Cook @rice{1%cup}.");
        assert_eq!(effective_servings(&undeclared, &config), 4);

        let custom = RecipeConfig {
            default_servings: 6,
            ..Default::default()
        };
        assert_eq!(effective_servings(&undeclared, &custom), 6);
    }

    #[test]
    fn test_scale_recipe_formats_for_display() {
        let recipe = parse_recipe("Mix @flour{3/4%cup}, @eggs{1} and @salt.");
        let scaled = scale_recipe(&recipe, 2, 4);

        assert_eq!(scaled.len(), 3);
        assert_eq!(scaled[0].quantity, Some(1.5));
        assert_eq!(scaled[0].display_quantity.as_deref(), Some("1½"));
        assert_eq!(scaled[0].display_line(), "1½ cup flour");
        assert_eq!(scaled[1].display_line(), "2 eggs");
        assert_eq!(scaled[2].quantity, None);
        assert_eq!(scaled[2].display_line(), "salt");

        // The recipe itself is untouched
        assert_eq!(recipe.ingredients[0].quantity, Some(0.75));
    }

    #[test]
    fn test_deduction_same_unit() {
        let result = compute_deduction(2.0, "cups", 5.0, "cup");
        assert_eq!(result.deduct_quantity, 2.0);
        assert_eq!(result.note, None);

        let capped = compute_deduction(7.0, "g", 5.0, "grams");
        assert_eq!(capped.deduct_quantity, 5.0);
    }

    #[test]
    fn test_deduction_converts_units() {
        let result = compute_deduction(3.0, "tsp", 1.0, "tbsp");
        assert!((result.deduct_quantity - 1.0).abs() < 0.01);
        let note = result.note.unwrap();
        assert!(note.starts_with("Recipe needs 3 tsp"), "note: {}", note);
        assert!(note.contains("tbsp"));

        let grams = compute_deduction(0.5, "kg", 2000.0, "g");
        assert_eq!(grams.deduct_quantity, 500.0);
        assert_eq!(grams.note.as_deref(), Some("Recipe needs ½ kg (≈ 500 g)"));
    }

    #[test]
    fn test_converted_deduction_is_capped_at_stock() {
        let result = compute_deduction(2.0, "cup", 100.0, "ml");
        assert_eq!(result.deduct_quantity, 100.0);
        assert!(result.note.is_some());
    }

    #[test]
    fn test_deduction_unit_mismatch() {
        let result = compute_deduction(1.0, "cup", 200.0, "g");
        assert_eq!(result.deduct_quantity, 0.0);
        assert_eq!(
            result.note.as_deref(),
            Some("Unit mismatch: recipe uses cup, pantry has g")
        );

        let unknown = compute_deduction(2.0, "pinch", 10.0, "g");
        assert_eq!(unknown.deduct_quantity, 0.0);
        assert!(unknown.note.unwrap().contains("Unit mismatch"));
    }

    #[test]
    fn test_unitless_deduction() {
        let result = compute_deduction(3.0, "", 2.0, "piece");
        assert_eq!(result.deduct_quantity, 2.0);
        assert_eq!(result.note, None);

        let both_blank = compute_deduction(2.0, " ", 10.0, "");
        assert_eq!(both_blank.deduct_quantity, 2.0);
    }

    #[test]
    fn test_non_positive_quantities_deduct_nothing() {
        assert_eq!(compute_deduction(0.0, "g", 10.0, "g").deduct_quantity, 0.0);
        assert_eq!(compute_deduction(-2.0, "g", 10.0, "g").deduct_quantity, 0.0);
        assert_eq!(compute_deduction(2.0, "g", 0.0, "kg").deduct_quantity, 0.0);
        assert_eq!(compute_deduction(-1.0, "", 5.0, "").deduct_quantity, 0.0);
    }

    #[test]
    fn test_deduction_never_negative_or_above_stock() {
        let quantities = [-5.0, 0.0, 0.25, 1.0, 3.0, 250.0];
        let units = ["", "tsp", "tbsp", "cup", "ml", "g", "kg", "oz", "piece", "dozen", "pinch"];
        for recipe_qty in quantities {
            for stock_qty in quantities {
                for recipe_unit in units {
                    for stock_unit in units {
                        let result =
                            compute_deduction(recipe_qty, recipe_unit, stock_qty, stock_unit);
                        assert!(result.deduct_quantity >= 0.0);
                        if stock_qty > 0.0 {
                            assert!(result.deduct_quantity <= stock_qty + 0.005);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_plan_deductions() {
        let ingredients = vec![
            linked("flour", Some(2.0), Some("cup")),
            linked("eggs", None, None),
            linked("milk", Some(1.0), Some("cup")),
            linked("saffron", Some(1.0), Some("g")),
            ParsedIngredient::new("water", Some(1.0), Some("L".to_string())),
        ];
        let pantry = vec![
            stock("flour", 1000.0, "g"),
            stock("eggs", 12.0, "piece"),
            stock("milk", 2.0, "L"),
            stock("water", 10.0, "L"),
        ];

        let plan = plan_deductions(&ingredients, &pantry);
        assert_eq!(plan.len(), 3);

        assert_eq!(plan[0].ingredient_id, IngredientId::new("flour"));
        assert_eq!(plan[0].result.deduct_quantity, 0.0);
        assert!(plan[0].result.note.as_deref().unwrap().starts_with("Unit mismatch"));

        // Missing quantity counts as one; missing unit deducts without conversion
        assert_eq!(plan[1].original_text, "eggs");
        assert_eq!(plan[1].result.deduct_quantity, 1.0);

        assert_eq!(plan[2].result.deduct_quantity, 0.24);
        assert!(plan[2].result.note.is_some());
    }

    #[test]
    fn test_apply_deduction() {
        assert_eq!(apply_deduction(10.0, 3.0), 7.0);
        assert_eq!(apply_deduction(2.0, 5.0), 0.0);
        assert_eq!(apply_deduction(4.0, 0.0), 4.0);
    }
}
