//! firstResult / maxResults resolution

/// Resolved result window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub first: i32,
    pub max: i32,
    paged: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}

impl Pagination {
    /// Defaults: first = 0, max = unbounded. No cross validation.
    pub fn resolve(first: Option<i32>, max: Option<i32>) -> Self {
        Self {
            first: first.unwrap_or(0),
            max: max.unwrap_or(i32::MAX),
            paged: first.is_some() || max.is_some(),
        }
    }

    /// Whether the client asked for a window at all
    pub fn is_paged(&self) -> bool {
        self.paged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = Pagination::resolve(None, None);
        assert_eq!((page.first, page.max), (0, i32::MAX));
        assert!(!page.is_paged());
    }

    #[test]
    fn test_first_only() {
        let page = Pagination::resolve(Some(10), None);
        assert_eq!((page.first, page.max), (10, i32::MAX));
        assert!(page.is_paged());
    }

    #[test]
    fn test_max_only() {
        let page = Pagination::resolve(None, Some(5));
        assert_eq!((page.first, page.max), (0, 5));
    }

    #[test]
    fn test_values_pass_through_unchecked() {
        let page = Pagination::resolve(Some(-1), Some(0));
        assert_eq!((page.first, page.max), (-1, 0));
    }
}
