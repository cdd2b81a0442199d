use std::collections::HashMap;

use futures_util::future::join_all;
use tracing::{debug, info};

use super::dto::{CreateRatingRequest, Rating, RecipeScore};
use crate::backend::RecipeBackend;
use crate::error::ApiError;
use crate::recipes::dto::Recipe;
use crate::session::StoredUser;

/// Whether the current user may still rate a recipe. `AlreadyRated`
/// is terminal for that (user, recipe) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingEligibility {
    Eligible,
    AlreadyRated,
}

pub async fn ratings_for(
    backend: &dyn RecipeBackend,
    recipe_id: i64,
) -> Result<Vec<Rating>, ApiError> {
    backend.ratings_for_recipe(recipe_id).await
}

/// Aggregate score for a single recipe. An empty rating set is a
/// valid result, not an error.
pub async fn score_for(
    backend: &dyn RecipeBackend,
    recipe_id: i64,
) -> Result<RecipeScore, ApiError> {
    let ratings = backend.ratings_for_recipe(recipe_id).await?;
    Ok(RecipeScore::from_ratings(&ratings))
}

/// Batch aggregation for the catalog: one fetch per recipe, all issued
/// concurrently and joined together, so latency is bounded by the
/// slowest request rather than the sum. A failed fetch degrades that
/// one recipe to "no ratings" and never aborts the others.
pub async fn scores_for(
    backend: &dyn RecipeBackend,
    recipes: &[Recipe],
) -> HashMap<i64, RecipeScore> {
    let fetches = recipes.iter().map(|recipe| async move {
        match backend.ratings_for_recipe(recipe.id).await {
            Ok(ratings) => (recipe.id, RecipeScore::from_ratings(&ratings)),
            Err(error) => {
                debug!(recipe_id = recipe.id, %error, "rating fetch failed, treating as unrated");
                (recipe.id, RecipeScore::EMPTY)
            }
        }
    });
    join_all(fetches).await.into_iter().collect()
}

/// Check-then-act duplicate guard: scan the recipe's ratings for one
/// by the current user.
pub async fn eligibility(
    backend: &dyn RecipeBackend,
    recipe_id: i64,
    user_id: i64,
) -> Result<RatingEligibility, ApiError> {
    let ratings = backend.ratings_for_recipe(recipe_id).await?;
    if ratings.iter().any(|r| r.user_id == user_id) {
        Ok(RatingEligibility::AlreadyRated)
    } else {
        Ok(RatingEligibility::Eligible)
    }
}

/// Validate locally, run the duplicate guard, then POST the rating.
/// Validation failures never reach the network; a failed POST leaves
/// the user eligible to retry.
pub async fn submit(
    backend: &dyn RecipeBackend,
    user: &StoredUser,
    recipe_id: i64,
    stars: u8,
    comment: &str,
) -> Result<Rating, ApiError> {
    if !(1..=5).contains(&stars) {
        return Err(ApiError::validation("stars", "must be between 1 and 5"));
    }
    let comment = comment.trim();
    if comment.is_empty() {
        return Err(ApiError::validation("comment", "must not be empty"));
    }

    if eligibility(backend, recipe_id, user.id).await? == RatingEligibility::AlreadyRated {
        return Err(ApiError::AlreadyRated);
    }

    let req = CreateRatingRequest {
        recipe_id,
        user_id: user.id,
        stars,
        comment: comment.to_string(),
    };
    let rating = backend.submit_rating(&req).await?;
    info!(recipe_id, user_id = user.id, stars, "rating submitted");
    Ok(rating)
}
