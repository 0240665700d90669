use serde::{Deserialize, Serialize};

/// Denormalized average/count pair displayed on a subject profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRating {
    pub average: f64,
    pub count: i32,
}

impl AggregateRating {
    pub fn empty() -> Self {
        Self {
            average: 0.0,
            count: 0,
        }
    }
}

/// Credibility band derived from how many unique raters reviewed a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReviewBand {
    Unreviewed,  // 0 reviews
    Provisional, // 1-4 reviews
    Reviewed,    // 5-19 reviews
    Trusted,     // 20+ reviews
}

impl ReviewBand {
    pub fn from_review_count(reviews: i32) -> Self {
        if reviews < 1 {
            ReviewBand::Unreviewed
        } else if reviews < 5 {
            ReviewBand::Provisional
        } else if reviews < 20 {
            ReviewBand::Reviewed
        } else {
            ReviewBand::Trusted
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReviewBand::Unreviewed => "unreviewed",
            ReviewBand::Provisional => "provisional",
            ReviewBand::Reviewed => "reviewed",
            ReviewBand::Trusted => "trusted",
        }
    }
}
