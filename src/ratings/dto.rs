use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single rating. `created_at` is optional on the wire because the
/// deployed backend does not always include it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i64,
    pub recipe_id: i64,
    pub user_id: i64,
    pub stars: u8,
    pub comment: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

/// Body for `POST /ratings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingRequest {
    pub recipe_id: i64,
    pub user_id: i64,
    pub stars: u8,
    pub comment: String,
}

/// Derived aggregate for one recipe. `average` stays unrounded; only
/// the `Display` impl rounds, to one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipeScore {
    pub average: f64,
    pub count: usize,
}

impl RecipeScore {
    pub const EMPTY: RecipeScore = RecipeScore {
        average: 0.0,
        count: 0,
    };

    pub fn from_ratings(ratings: &[Rating]) -> Self {
        if ratings.is_empty() {
            return Self::EMPTY;
        }
        let sum: u32 = ratings.iter().map(|r| u32::from(r.stars)).sum();
        Self {
            average: f64::from(sum) / ratings.len() as f64,
            count: ratings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl fmt::Display for RecipeScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "no ratings yet")
        } else {
            write!(f, "{:.1} ({})", self.average, self.count)
        }
    }
}
