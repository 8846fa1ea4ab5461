//! List filtering shared by the console's search screens.

/// Case-insensitive substring match used by every search box.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// Keep the items a filter accepts, preserving order.
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;

    fn apply(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().filter(|i| self.matches(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Even;

    impl Filter<u32> for Even {
        fn matches(&self, item: &u32) -> bool {
            item % 2 == 0
        }
    }

    #[test]
    fn search_ignores_case_and_surrounding_blanks() {
        assert!(contains_ci("Pledge West Africa", "  west "));
        assert!(contains_ci("MAT-1234-A", "mat-12"));
        assert!(!contains_ci("Lagos", "abuja"));
    }

    #[test]
    fn apply_keeps_matches_in_order() {
        assert_eq!(Even.apply(vec![4, 1, 2, 7, 8]), [4, 2, 8]);
    }
}
