/// Result of a mutation that may legitimately match nothing.
///
/// `Unchanged` means no row was affected: the target did not exist, or
/// (for `link`) the membership was already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
}

impl Outcome {
    /// Maps an affected-row count to an outcome.
    pub fn from_rows(rows: usize) -> Self {
        if rows == 0 {
            Outcome::Unchanged
        } else {
            Outcome::Changed
        }
    }

    pub fn is_changed(self) -> bool {
        self == Outcome::Changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rows_is_unchanged() {
        assert_eq!(Outcome::from_rows(0), Outcome::Unchanged);
        assert_eq!(Outcome::from_rows(1), Outcome::Changed);
        assert_eq!(Outcome::from_rows(3), Outcome::Changed);
        assert!(!Outcome::Unchanged.is_changed());
    }
}
