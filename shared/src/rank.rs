use serde::{Deserialize, Serialize};

const GREATER_KEYWORDS: [&str; 2] = ["greater", "上級"];
const LESSER_KEYWORDS: [&str; 2] = ["lesser", "下級"];

/// Coarse quality tier of a pin's contents, independent of its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Greater,
    Standard,
    Lesser,
}

impl Rank {
    /// Keyword scan over arbitrary text. "Greater" wins when both tiers match.
    pub fn classify(text: &str) -> Self {
        let lowered = text.to_lowercase();
        if GREATER_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            Rank::Greater
        } else if LESSER_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            Rank::Lesser
        } else {
            Rank::Standard
        }
    }
}

/// Rank selection in the filter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankFilter {
    #[default]
    All,
    Greater,
    Standard,
    Lesser,
}

impl RankFilter {
    pub const OPTIONS: [RankFilter; 4] = [
        RankFilter::All,
        RankFilter::Greater,
        RankFilter::Standard,
        RankFilter::Lesser,
    ];

    pub fn matches(self, rank: Rank) -> bool {
        match self {
            RankFilter::All => true,
            RankFilter::Greater => rank == Rank::Greater,
            RankFilter::Standard => rank == Rank::Standard,
            RankFilter::Lesser => rank == Rank::Lesser,
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            RankFilter::All => "ALL",
            RankFilter::Greater => "Greater",
            RankFilter::Standard => "Standard",
            RankFilter::Lesser => "Lesser",
        }
    }

    /// Text color of the button, where it differs from the control default.
    pub fn button_color(self) -> Option<&'static str> {
        match self {
            RankFilter::Greater => Some("#e67e22"),
            RankFilter::Lesser => Some("#7f8c8d"),
            RankFilter::All | RankFilter::Standard => None,
        }
    }
}
