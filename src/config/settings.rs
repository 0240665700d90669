use std::ops::RangeInclusive;

/// Bounds applied to every rating submission.
#[derive(Debug, Clone, Copy)]
pub struct RatingSettings {
    pub min_score: i32,
    pub max_score: i32,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            min_score: 1,
            max_score: 5,
        }
    }
}

impl RatingSettings {
    pub fn score_range(&self) -> RangeInclusive<i32> {
        self.min_score..=self.max_score
    }
}

pub struct ImportSettings {
    pub archive_dir: &'static str,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            archive_dir: "cache",
        }
    }
}

pub struct DisplaySettings {
    pub review_preview_limit: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            review_preview_limit: 10,
        }
    }
}

pub struct AppConfig {
    pub rating: RatingSettings,
    pub import: ImportSettings,
    pub display: DisplaySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            rating: RatingSettings::default(),
            import: ImportSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}
