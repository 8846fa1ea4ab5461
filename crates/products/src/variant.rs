//! Product option axes and variant combinations.
//!
//! An administrator describes a product's options as named axes
//! (`Color: Red, Blue`, `Size: L, XL`). Every sellable variant is one value
//! picked from each axis; `generate_combinations` enumerates them all.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use pledge_core::{DomainError, DomainResult, Money, ValueObject};

/// Separator between option values in a combination label.
pub const LABEL_SEPARATOR: &str = " / ";

/// A named option axis with its ordered values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionAxis {
    pub name: String,
    pub values: Vec<String>,
}

impl ValueObject for OptionAxis {}

impl OptionAxis {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Axes without values take no part in generation.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One generated combination: a value from each non-empty axis, in axis order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantCombination {
    pub label: String,
    pub values: Vec<String>,
}

impl ValueObject for VariantCombination {}

impl VariantCombination {
    fn from_values(values: Vec<String>) -> Self {
        Self {
            label: values.join(LABEL_SEPARATOR),
            values,
        }
    }
}

/// Identifier of a variant within its product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub u32);

impl core::fmt::Display for VariantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A sellable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub combination_label: String,
    /// Empty until an administrator fills it in.
    pub sku: String,
    /// Overrides the product default price when set.
    pub price: Option<Money>,
    pub enabled: bool,
}

impl Variant {
    /// A fresh variant for a generated combination: blank SKU, no price override.
    pub fn shell(id: VariantId, combination: &VariantCombination) -> Self {
        Self {
            id,
            combination_label: combination.label.clone(),
            sku: String::new(),
            price: None,
            enabled: true,
        }
    }
}

/// Validate the axes and keep only those that take part in generation.
///
/// Names and values are trimmed. Axes with no values are dropped, including the
/// blank `{ name: "", values: [] }` placeholder. An axis that has values but no
/// name is malformed, as is a blank or repeated value.
pub fn normalize_axes(axes: &[OptionAxis]) -> DomainResult<Vec<OptionAxis>> {
    let mut valid = Vec::with_capacity(axes.len());

    for (i, axis) in axes.iter().enumerate() {
        if axis.is_empty() {
            continue;
        }

        let name = axis.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation(
                format!("option_axes[{i}].name"),
                "option name is required",
            ));
        }

        let mut seen = HashSet::with_capacity(axis.values.len());
        let mut values = Vec::with_capacity(axis.values.len());
        for (j, raw) in axis.values.iter().enumerate() {
            let value = raw.trim();
            if value.is_empty() {
                return Err(DomainError::validation(
                    format!("option_axes[{i}].values[{j}]"),
                    "option value cannot be empty",
                ));
            }
            if !seen.insert(value) {
                return Err(DomainError::validation(
                    format!("option_axes[{i}].values[{j}]"),
                    format!("duplicate value '{value}' in option '{name}'"),
                ));
            }
            values.push(value.to_string());
        }

        valid.push(OptionAxis::new(name, values));
    }

    Ok(valid)
}

/// Every combination of the given axes (Cartesian product).
///
/// Axis order and value order are preserved: the first axis varies slowest.
/// Returns an empty list when no axis has values.
pub fn generate_combinations(axes: &[OptionAxis]) -> DomainResult<Vec<VariantCombination>> {
    let axes = normalize_axes(axes)?;
    if axes.is_empty() {
        return Ok(Vec::new());
    }

    let total: usize = axes.iter().map(|a| a.values.len()).product();
    let mut prefixes: Vec<Vec<String>> = vec![Vec::with_capacity(axes.len())];

    for axis in &axes {
        let mut next = Vec::with_capacity(prefixes.len() * axis.values.len());
        for prefix in &prefixes {
            for value in &axis.values {
                let mut combo = prefix.clone();
                combo.push(value.clone());
                next.push(combo);
            }
        }
        prefixes = next;
    }

    debug_assert_eq!(prefixes.len(), total);
    Ok(prefixes
        .into_iter()
        .map(VariantCombination::from_values)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(combos: &[VariantCombination]) -> Vec<&str> {
        combos.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn single_axis_yields_bare_values() {
        let axes = [OptionAxis::new("Size", ["S", "M", "L"])];
        let combos = generate_combinations(&axes).unwrap();
        assert_eq!(labels(&combos), ["S", "M", "L"]);
    }

    #[test]
    fn two_axes_follow_axis_then_value_order() {
        let axes = [
            OptionAxis::new("Color", ["Red", "Blue"]),
            OptionAxis::new("Size", ["L", "XL"]),
        ];
        let combos = generate_combinations(&axes).unwrap();
        assert_eq!(labels(&combos), ["Red / L", "Red / XL", "Blue / L", "Blue / XL"]);
        assert_eq!(combos[3].values, ["Blue", "XL"]);
    }

    #[test]
    fn no_axes_yields_nothing() {
        assert!(generate_combinations(&[]).unwrap().is_empty());
    }

    #[test]
    fn empty_valued_axes_are_skipped() {
        let axes = [
            OptionAxis::new("", Vec::<String>::new()),
            OptionAxis::new("Color", Vec::<String>::new()),
        ];
        assert!(generate_combinations(&axes).unwrap().is_empty());

        let axes = [
            OptionAxis::new("Color", Vec::<String>::new()),
            OptionAxis::new("Type", ["Standard", "Premium"]),
        ];
        let combos = generate_combinations(&axes).unwrap();
        assert_eq!(labels(&combos), ["Standard", "Premium"]);
    }

    #[test]
    fn unnamed_axis_with_values_is_rejected() {
        let axes = [
            OptionAxis::new("Color", ["Red"]),
            OptionAxis::new("  ", ["L"]),
        ];
        let err = generate_combinations(&axes).unwrap_err();
        assert_eq!(err.field(), Some("option_axes[1].name"));
    }

    #[test]
    fn blank_and_duplicate_values_are_rejected() {
        let err = generate_combinations(&[OptionAxis::new("Size", ["S", " "])]).unwrap_err();
        assert_eq!(err.field(), Some("option_axes[0].values[1]"));

        let err =
            generate_combinations(&[OptionAxis::new("Size", ["S", "M", "S "])]).unwrap_err();
        assert_eq!(err.field(), Some("option_axes[0].values[2]"));
    }

    #[test]
    fn names_and_values_are_trimmed() {
        let axes = normalize_axes(&[OptionAxis::new(" Color ", [" Red", "Blue "])]).unwrap();
        assert_eq!(axes, [OptionAxis::new("Color", ["Red", "Blue"])]);
    }

    #[test]
    fn generation_is_deterministic() {
        let axes = [
            OptionAxis::new("Color", ["Red", "Blue", "Green"]),
            OptionAxis::new("Valve", ["Clip", "Screw"]),
        ];
        assert_eq!(
            generate_combinations(&axes).unwrap(),
            generate_combinations(&axes).unwrap()
        );
    }

    #[test]
    fn shell_variant_has_no_sku_or_price() {
        let combo = &generate_combinations(&[OptionAxis::new("Type", ["Standard"])]).unwrap()[0];
        let variant = Variant::shell(VariantId(7), combo);
        assert_eq!(variant.combination_label, "Standard");
        assert!(variant.sku.is_empty());
        assert_eq!(variant.price, None);
        assert!(variant.enabled);
    }

    mod proptest_tests {
        use super::*;
        use proptest::collection::{btree_set, vec};
        use proptest::prelude::*;

        fn axis() -> impl Strategy<Value = OptionAxis> {
            ("[A-Z][a-z]{0,8}", btree_set("[A-Za-z0-9]{1,6}", 1..5))
                .prop_map(|(name, values)| OptionAxis::new(name, values))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: the number of combinations is the product of the axis sizes
            /// and every label is distinct.
            #[test]
            fn count_is_product_of_axis_sizes(axes in vec(axis(), 1..4)) {
                let combos = generate_combinations(&axes).unwrap();
                let expected: usize = axes.iter().map(|a| a.values.len()).product();
                prop_assert_eq!(combos.len(), expected);

                let distinct: HashSet<&str> = combos.iter().map(|c| c.label.as_str()).collect();
                prop_assert_eq!(distinct.len(), expected);
            }

            /// Property: each combination picks exactly one value per axis, in axis order.
            #[test]
            fn each_combination_spans_every_axis(axes in vec(axis(), 1..4)) {
                for combo in generate_combinations(&axes).unwrap() {
                    prop_assert_eq!(combo.values.len(), axes.len());
                    for (value, axis) in combo.values.iter().zip(&axes) {
                        prop_assert!(axis.values.contains(value));
                    }
                }
            }
        }
    }
}
