use std::fmt;

/// Numeric comparison operator of a `rating:` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparator {
    /// Apply the comparison as `lhs <op> rhs`
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn compare(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

impl TryFrom<&str> for Comparator {
    type Error = String;

    /// Parse an operator token; a bare `=` is read as `==`
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "=" | "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            _ => Err(value.to_string()),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `rating:<op><value>` constraint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingFilter {
    pub comparator: Comparator,
    pub value: f64,
}

impl RatingFilter {
    #[must_use]
    pub const fn new(comparator: Comparator, value: f64) -> Self {
        Self { comparator, value }
    }

    /// Whether a gallery rating satisfies the filter
    #[must_use]
    pub fn accepts(&self, rating: f64) -> bool {
        self.comparator.compare(rating, self.value)
    }
}

/// Parsed search intent
///
/// `words` must all match, `filter_words` must not match and win over
/// `words` when both apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub words: Vec<String>,
    pub filter_words: Vec<String>,
    pub rating: Option<RatingFilter>,
}

impl Query {
    /// A query with no constraints matches every gallery
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.filter_words.is_empty() && self.rating.is_none()
    }
}
