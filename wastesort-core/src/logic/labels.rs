//! Waste Category Labels
//!
//! The closed set of categories the classifier was trained on.
//! Order matters: index `i` of the model output is `ClassLabel::ALL[i]`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassLabel {
    Battery,
    Biological,
    BrownGlass,
    Cardboard,
    Clothes,
    Metal,
    Paper,
    Shoes,
    Trash,
    WhiteGlass,
}

impl ClassLabel {
    /// All labels in model output order
    pub const ALL: [ClassLabel; 10] = [
        ClassLabel::Battery,
        ClassLabel::Biological,
        ClassLabel::BrownGlass,
        ClassLabel::Cardboard,
        ClassLabel::Clothes,
        ClassLabel::Metal,
        ClassLabel::Paper,
        ClassLabel::Shoes,
        ClassLabel::Trash,
        ClassLabel::WhiteGlass,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::Battery => "battery",
            ClassLabel::Biological => "biological",
            ClassLabel::BrownGlass => "brown-glass",
            ClassLabel::Cardboard => "cardboard",
            ClassLabel::Clothes => "clothes",
            ClassLabel::Metal => "metal",
            ClassLabel::Paper => "paper",
            ClassLabel::Shoes => "shoes",
            ClassLabel::Trash => "trash",
            ClassLabel::WhiteGlass => "white-glass",
        }
    }

    /// Label for a classifier output index
    pub fn from_index(index: usize) -> Option<ClassLabel> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown waste category: {0}")]
pub struct UnknownLabel(pub String);

impl std::str::FromStr for ClassLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}
