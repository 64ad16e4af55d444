use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four verdicts a user can give a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingScore {
    MustPlay,
    Great,
    Average,
    Skip,
}

impl RatingScore {
    pub const ALL: [RatingScore; 4] = [
        RatingScore::MustPlay,
        RatingScore::Great,
        RatingScore::Average,
        RatingScore::Skip,
    ];

    /// Stored and form value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MustPlay => "MustPlay",
            Self::Great => "Great",
            Self::Average => "Average",
            Self::Skip => "Skip",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MustPlay => "Must Play",
            Self::Great => "Great",
            Self::Average => "Average",
            Self::Skip => "Skip",
        }
    }
}

impl fmt::Display for RatingScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScore(pub String);

impl fmt::Display for UnknownScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rating score: {:?}", self.0)
    }
}

impl std::error::Error for UnknownScore {}

impl FromStr for RatingScore {
    type Err = UnknownScore;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|score| score.as_str() == s)
            .ok_or_else(|| UnknownScore(s.to_string()))
    }
}

/// Per-score vote counts for one game. Scores nobody picked count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RatingTally {
    pub must_play: u32,
    pub great: u32,
    pub average: u32,
    pub skip: u32,
}

impl RatingTally {
    pub fn from_scores<I: IntoIterator<Item = RatingScore>>(scores: I) -> Self {
        let mut tally = Self::default();
        for score in scores {
            match score {
                RatingScore::MustPlay => tally.must_play += 1,
                RatingScore::Great => tally.great += 1,
                RatingScore::Average => tally.average += 1,
                RatingScore::Skip => tally.skip += 1,
            }
        }
        tally
    }

    pub fn count(&self, score: RatingScore) -> u32 {
        match score {
            RatingScore::MustPlay => self.must_play,
            RatingScore::Great => self.great,
            RatingScore::Average => self.average,
            RatingScore::Skip => self.skip,
        }
    }

    pub fn total(&self) -> u32 {
        self.must_play + self.great + self.average + self.skip
    }
}

/// A rating as shown on the "reviewed" account page.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewedGame {
    pub game_id: String,
    pub game_name: String,
    pub score: RatingScore,
    pub rated_at: DateTime<Utc>,
}
