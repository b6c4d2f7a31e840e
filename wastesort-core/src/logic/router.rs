//! Bin Router
//!
//! Maps a predicted category to the bin it belongs in.

use serde::{Deserialize, Serialize};

use super::labels::ClassLabel;

/// Categories that go to the recycling bin
pub const RECYCLABLE: [ClassLabel; 5] = [
    ClassLabel::BrownGlass,
    ClassLabel::WhiteGlass,
    ClassLabel::Metal,
    ClassLabel::Paper,
    ClassLabel::Cardboard,
];

/// Categories that go to general waste
pub const NON_RECYCLABLE: [ClassLabel; 5] = [
    ClassLabel::Trash,
    ClassLabel::Biological,
    ClassLabel::Shoes,
    ClassLabel::Clothes,
    ClassLabel::Battery,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    Recyclable,
    NonRecyclable,
    Unknown,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Recyclable => "Recyclable",
            Disposition::NonRecyclable => "Non-Recyclable",
            Disposition::Unknown => "Unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Disposition::Recyclable => "♻️",
            Disposition::NonRecyclable => "🗑️",
            Disposition::Unknown => "⚠️",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Disposition::Recyclable => "#10b981",    // Green
            Disposition::NonRecyclable => "#6b7280", // Gray
            Disposition::Unknown => "#f59e0b",       // Yellow
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Route a category to its bin.
///
/// The two sets cover the whole closed label set, so `Unknown` is never
/// returned today. It stays as the answer for a label added to the model
/// without being assigned a bin.
pub fn route(label: ClassLabel) -> Disposition {
    if RECYCLABLE.contains(&label) {
        Disposition::Recyclable
    } else if NON_RECYCLABLE.contains(&label) {
        Disposition::NonRecyclable
    } else {
        Disposition::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_sets_are_disjoint() {
        for label in RECYCLABLE {
            assert!(
                !NON_RECYCLABLE.contains(&label),
                "{} is in both bins",
                label
            );
        }
    }

    #[test]
    fn test_every_label_routes_to_a_bin() {
        for label in ClassLabel::ALL {
            let in_recyclable = RECYCLABLE.contains(&label);
            let in_general = NON_RECYCLABLE.contains(&label);
            assert!(in_recyclable ^ in_general, "{} must be in exactly one bin", label);
            assert_ne!(route(label), Disposition::Unknown);
        }
    }

    #[test]
    fn test_known_routes() {
        assert_eq!(route(ClassLabel::Cardboard), Disposition::Recyclable);
        assert_eq!(route(ClassLabel::WhiteGlass), Disposition::Recyclable);
        assert_eq!(route(ClassLabel::Battery), Disposition::NonRecyclable);
        assert_eq!(route(ClassLabel::Trash), Disposition::NonRecyclable);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Disposition::Recyclable.to_string(), "Recyclable");
        assert_eq!(Disposition::NonRecyclable.to_string(), "Non-Recyclable");
        assert_eq!(Disposition::Unknown.to_string(), "Unknown");
    }
}
