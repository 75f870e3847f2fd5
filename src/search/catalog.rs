//! Account type catalog and the filter options derived from it

use serde::Serialize;

/// Label of the synthetic option that clears the filter
pub const ALL_CATEGORIES_LABEL: &str = "All Categories";

/// One entry of the type picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub label: String,
    pub value: String,
}

impl CategoryOption {
    pub fn all() -> Self {
        Self {
            label: ALL_CATEGORIES_LABEL.to_string(),
            value: String::new(),
        }
    }

    pub fn from_label(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: normalize(label),
        }
    }

    pub fn is_all(&self) -> bool {
        self.value.is_empty()
    }
}

/// Option key for a display label: every space becomes an underscore
pub fn normalize(label: &str) -> String {
    label.replace(' ', "_")
}

/// Display label for an option key: every underscore becomes a space
pub fn denormalize(value: &str) -> String {
    value.replace('_', " ")
}

/// Picker options for a catalog, led by the "All Categories" entry
pub fn build_options(categories: &[String]) -> Vec<CategoryOption> {
    std::iter::once(CategoryOption::all())
        .chain(categories.iter().map(|label| CategoryOption::from_label(label)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_replaces_every_space() {
        assert_eq!(normalize("Customer - Direct"), "Customer_-_Direct");
        assert_eq!(normalize("Technology  Partner"), "Technology__Partner");
        assert_eq!(normalize("Prospect"), "Prospect");
    }

    #[test]
    fn test_denormalize_round_trips_labels_with_spaces() {
        for label in ["Customer - Channel", "Installation Partner", " Other ", "Prospect"] {
            let option = CategoryOption::from_label(label);
            assert!(!option.value.contains(' '));
            assert_eq!(option.value.len(), label.len());
            assert_eq!(denormalize(&option.value), label);
        }
    }

    #[test]
    fn test_options_start_with_all() {
        let options = build_options(&["Prospect".to_string(), "Customer - Direct".to_string()]);
        assert_eq!(options.len(), 3);
        assert_eq!(options[0], CategoryOption { label: "All Categories".into(), value: "".into() });
        assert_eq!(options[1], CategoryOption::from_label("Prospect"));
        assert_eq!(options[2].value, "Customer_-_Direct");
    }

    #[test]
    fn test_empty_catalog_still_has_all_option() {
        let options = build_options(&[]);
        assert_eq!(options, vec![CategoryOption::all()]);
        assert!(options[0].is_all());
    }
}
