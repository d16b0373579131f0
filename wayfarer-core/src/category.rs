//! Location categories used for grouping costs and presentation styling.
//!
//! # Examples
//! ```
//! use wayfarer_core::Category;
//!
//! assert_eq!(Category::Restaurant.as_str(), "restaurant");
//! assert_eq!(Category::Hotel.to_string(), "hotel");
//! ```

/// Broad kind of place a traveller visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Category {
    /// Sights and landmarks.
    Attraction,
    /// Places to eat.
    Restaurant,
    /// Accommodation.
    Hotel,
    /// Shops and markets.
    Shopping,
    /// Stations, airports and other transport hubs.
    Transport,
    /// Tours, classes and other bookable activities.
    Activity,
    /// Anything else.
    #[default]
    Other,
}

impl Category {
    /// Every category in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Attraction,
        Self::Restaurant,
        Self::Hotel,
        Self::Shopping,
        Self::Transport,
        Self::Activity,
        Self::Other,
    ];

    /// Return the category as a lowercase `&str`.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::Category;
    ///
    /// assert_eq!(Category::Shopping.as_str(), "shopping");
    /// ```
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attraction => "attraction",
            Self::Restaurant => "restaurant",
            Self::Hotel => "hotel",
            Self::Shopping => "shopping",
            Self::Transport => "transport",
            Self::Activity => "activity",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Category::Activity.to_string(), Category::Activity.as_str());
    }

    #[rstest]
    #[case("attraction", Category::Attraction)]
    #[case("Restaurant", Category::Restaurant)]
    #[case(" HOTEL ", Category::Hotel)]
    fn parsing_ignores_case_and_padding(#[case] input: &str, #[case] expected: Category) {
        assert_eq!(Category::from_str(input), Ok(expected));
    }

    #[test]
    fn parsing_rejects_unknown() {
        let err = Category::from_str("museum").unwrap_err();
        assert!(err.contains("unknown category"));
    }
}
