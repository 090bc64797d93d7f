/// Star rating definitions
///
/// The catalog encodes a rating as a CSS class word ("One" through "Five")
/// next to the `star-rating` class.
use std::fmt;

/// A one-to-five star rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rating {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl Rating {
    /// Maps a rating class label to a rating
    ///
    /// Returns None for any label outside `One..Five`. Matching is exact,
    /// the catalog always capitalizes the word.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "One" => Some(Self::One),
            "Two" => Some(Self::Two),
            "Three" => Some(Self::Three),
            "Four" => Some(Self::Four),
            "Five" => Some(Self::Five),
            _ => None,
        }
    }

    /// Returns the number of stars
    pub fn value(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
