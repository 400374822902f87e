use crate::model::{AttributeOption, AttributeWithOptions, ProductDetail, SelectedAttribute};

/// The shopper's attribute choices on a product page, at most one option per attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSelection {
    selected: Vec<SelectedAttribute>,
}

impl AttributeSelection {
    /// Starts from the default variant's attribute set, or empty without variants.
    pub fn for_product(product: &ProductDetail) -> Self {
        Self {
            selected: product
                .default_variant()
                .map(|v| v.attribute_set.clone())
                .unwrap_or_default(),
        }
    }

    pub fn selected(&self) -> &[SelectedAttribute] {
        &self.selected
    }

    /// Chooses `option` for `attribute`, replacing an earlier choice in place.
    pub fn select(&mut self, attribute: &AttributeWithOptions, option: &AttributeOption) {
        match self.selected.iter_mut().find(|a| a.id == attribute.id) {
            Some(existing) => existing.selected_option = option.clone(),
            None => self.selected.push(SelectedAttribute {
                id: attribute.id,
                label: attribute.label.clone(),
                selected_option: option.clone(),
            }),
        }
    }

    pub fn remove(&mut self, attribute_id: u64) {
        self.selected.retain(|a| a.id != attribute_id);
    }

    /// Clicking the chosen option clears the attribute; any other option selects it.
    pub fn toggle(&mut self, attribute: &AttributeWithOptions, option: &AttributeOption) {
        if self.is_selected(attribute.id, option.id) {
            self.remove(attribute.id);
        } else {
            self.select(attribute, option);
        }
    }

    pub fn is_selected(&self, attribute_id: u64, option_id: u64) -> bool {
        self.selected
            .iter()
            .any(|a| a.id == attribute_id && a.selected_option.id == option_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fixtures::product_detail;
    use crate::model::ProductVariant;

    fn option(id: u64, value: &str) -> AttributeOption {
        AttributeOption {
            id,
            value: value.to_string(),
            attribute_id: None,
        }
    }

    fn wattage() -> AttributeWithOptions {
        AttributeWithOptions {
            id: 1,
            label: "Wattage".to_string(),
            options: vec![option(10, "300W"), option(11, "400W")],
        }
    }

    fn color() -> AttributeWithOptions {
        AttributeWithOptions {
            id: 2,
            label: "Frame".to_string(),
            options: vec![option(20, "Black"), option(21, "Silver")],
        }
    }

    #[test]
    fn test_starts_from_default_variant() {
        let mut product = product_detail(42, "Panel");
        product.variants = vec![ProductVariant {
            id: 5,
            quantity: 3,
            product_id: None,
            attribute_set: vec![SelectedAttribute {
                id: 1,
                label: "Wattage".to_string(),
                selected_option: option(11, "400W"),
            }],
        }];

        let selection = AttributeSelection::for_product(&product);
        assert!(selection.is_selected(1, 11));
        assert_eq!(selection.selected().len(), 1);

        let empty = AttributeSelection::for_product(&product_detail(43, "Cable"));
        assert!(empty.selected().is_empty());
    }

    #[test]
    fn test_select_replaces_or_appends() {
        let mut selection = AttributeSelection::default();
        selection.select(&wattage(), &option(10, "300W"));
        selection.select(&color(), &option(20, "Black"));
        selection.select(&wattage(), &option(11, "400W"));

        let ids: Vec<(u64, u64)> = selection
            .selected()
            .iter()
            .map(|a| (a.id, a.selected_option.id))
            .collect();
        assert_eq!(ids, vec![(1, 11), (2, 20)]);
    }

    #[test]
    fn test_toggle_same_option_removes() {
        let mut selection = AttributeSelection::default();
        selection.toggle(&color(), &option(21, "Silver"));
        assert!(selection.is_selected(2, 21));

        selection.toggle(&color(), &option(21, "Silver"));
        assert!(selection.selected().is_empty());
    }
}
