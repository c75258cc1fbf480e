//! Comparison operators accepted in filter expressions

use serde::Serialize;

/// Comparison operator of a filter expression or condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
}

impl Operator {
    /// Match order for prefix scanning. Longer tokens come first so that
    /// `gteq` is never read as `gt` followed by `eq`.
    pub const ALL_LONGEST_FIRST: [Operator; 7] = [
        Operator::GreaterThanOrEqual,
        Operator::LessThanOrEqual,
        Operator::Like,
        Operator::NotEquals,
        Operator::Equals,
        Operator::GreaterThan,
        Operator::LessThan,
    ];

    /// The wire token of this operator
    pub fn token(self) -> &'static str {
        match self {
            Operator::Equals => "eq",
            Operator::NotEquals => "neq",
            Operator::GreaterThan => "gt",
            Operator::GreaterThanOrEqual => "gteq",
            Operator::LessThan => "lt",
            Operator::LessThanOrEqual => "lteq",
            Operator::Like => "like",
        }
    }

    /// Look up an operator by its exact token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL_LONGEST_FIRST
            .into_iter()
            .find(|op| op.token() == token)
    }

    /// Match the longest operator token at the start of `input`.
    ///
    /// Returns the operator and the unconsumed remainder.
    pub fn match_prefix(input: &str) -> Option<(Self, &str)> {
        Self::ALL_LONGEST_FIRST
            .into_iter()
            .find_map(|op| input.strip_prefix(op.token()).map(|rest| (op, rest)))
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_first_order() {
        let lengths: Vec<usize> = Operator::ALL_LONGEST_FIRST
            .iter()
            .map(|op| op.token().len())
            .collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn test_match_prefix_prefers_longer_tokens() {
        assert_eq!(
            Operator::match_prefix("gteq_5"),
            Some((Operator::GreaterThanOrEqual, "_5"))
        );
        assert_eq!(
            Operator::match_prefix("lteq_5"),
            Some((Operator::LessThanOrEqual, "_5"))
        );
        assert_eq!(Operator::match_prefix("gt_5"), Some((Operator::GreaterThan, "_5")));
        assert_eq!(Operator::match_prefix("neq_a"), Some((Operator::NotEquals, "_a")));
        assert_eq!(Operator::match_prefix("bt_5"), None);
    }

    #[test]
    fn test_from_token_is_exact() {
        assert_eq!(Operator::from_token("like"), Some(Operator::Like));
        assert_eq!(Operator::from_token("eq"), Some(Operator::Equals));
        assert_eq!(Operator::from_token("gte"), None);
        assert_eq!(Operator::from_token("EQ"), None);
    }

    #[test]
    fn test_tokens_round_trip() {
        for op in Operator::ALL_LONGEST_FIRST {
            assert_eq!(Operator::from_token(op.token()), Some(op));
        }
    }
}
