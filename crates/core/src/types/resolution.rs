//! Outcome type for lookups that must never fail loudly.

/// Result of a best-effort lookup.
///
/// Read paths (role resolution, permission checks) degrade to the most
/// restrictive answer instead of returning errors. `Resolution` keeps that
/// contract visible in signatures: there is no error variant to propagate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The lookup produced a value.
    Resolved(T),
    /// Nothing could be determined (absent, or the lookup failed).
    Unresolved,
}

impl<T> Resolution<T> {
    /// Convert to an `Option`, dropping the distinction between absent and failed.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unresolved => None,
        }
    }

    /// Returns `true` if a value was resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Map the resolved value.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Resolved(value) => Resolution::Resolved(f(value)),
            Self::Unresolved => Resolution::Unresolved,
        }
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unresolved, Self::Resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_from_option() {
        assert_eq!(Resolution::from(Some(3)), Resolution::Resolved(3));
        assert_eq!(Resolution::<i32>::from(None), Resolution::Unresolved);
    }

    #[test]
    fn test_resolution_map_and_into_option() {
        let doubled = Resolution::Resolved(2).map(|v| v * 2);
        assert!(doubled.is_resolved());
        assert_eq!(doubled.into_option(), Some(4));
        assert_eq!(Resolution::<i32>::Unresolved.into_option(), None);
    }
}
