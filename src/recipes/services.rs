use tracing::{debug, info};

use super::dto::{CreateRecipeRequest, Recipe, RecipeDraft, UpdateRecipeRequest};
use crate::backend::RecipeBackend;
use crate::error::ApiError;
use crate::ratings::dto::{Rating, RecipeScore};
use crate::ratings::services::scores_for;
use crate::session::StoredUser;

/// One catalog row: a recipe plus its aggregate score at fetch time.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub recipe: Recipe,
    pub score: RecipeScore,
}

pub fn is_owner(recipe: &Recipe, user: &StoredUser) -> bool {
    recipe.user_id == user.id
}

/// Client-side gate only: it keeps the UI honest, while the backend
/// remains the authoritative enforcer of ownership.
pub fn ensure_owner(recipe: &Recipe, user: &StoredUser) -> Result<(), ApiError> {
    if is_owner(recipe, user) {
        Ok(())
    } else {
        Err(ApiError::NotOwner)
    }
}

/// The caller must have asked the user before constructing `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
    Declined,
}

fn validate_draft(draft: &RecipeDraft) -> Result<(), ApiError> {
    let required: [(&'static str, &str); 5] = [
        ("title", &draft.title),
        ("description", &draft.description),
        ("ingredients", &draft.ingredients),
        ("steps", &draft.steps),
        ("category", &draft.category),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ApiError::validation(field, "is required"));
        }
    }
    Ok(())
}

pub async fn fetch(backend: &dyn RecipeBackend, id: i64) -> Result<Recipe, ApiError> {
    backend.get_recipe(id).await
}

/// Detail view payload. `ratings` is `None` when the rating fetch
/// failed, which callers must render as "no rating data" rather than
/// as an empty rating set.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub ratings: Option<Vec<Rating>>,
}

impl RecipeDetail {
    pub fn score(&self) -> Option<RecipeScore> {
        self.ratings.as_deref().map(RecipeScore::from_ratings)
    }
}

/// Fetch one recipe together with its rating data. A missing recipe
/// propagates `NotFound`; a failed rating fetch degrades to
/// `ratings: None` so the recipe itself still renders.
pub async fn load_detail(
    backend: &dyn RecipeBackend,
    id: i64,
) -> Result<RecipeDetail, ApiError> {
    let recipe = backend.get_recipe(id).await?;
    let ratings = match backend.ratings_for_recipe(id).await {
        Ok(ratings) => Some(ratings),
        Err(error) => {
            debug!(recipe_id = id, %error, "rating fetch failed for detail view");
            None
        }
    };
    Ok(RecipeDetail { recipe, ratings })
}

/// Create a recipe owned by the session user. The owner id is taken
/// from the session, never from caller input.
pub async fn create(
    backend: &dyn RecipeBackend,
    owner: &StoredUser,
    draft: RecipeDraft,
) -> Result<Recipe, ApiError> {
    validate_draft(&draft)?;
    let recipe = backend
        .create_recipe(&CreateRecipeRequest::from_draft(draft, owner.id))
        .await?;
    info!(recipe_id = recipe.id, owner_id = owner.id, "recipe created");
    Ok(recipe)
}

pub async fn update(
    backend: &dyn RecipeBackend,
    user: &StoredUser,
    recipe: &Recipe,
    draft: RecipeDraft,
) -> Result<Recipe, ApiError> {
    ensure_owner(recipe, user)?;
    validate_draft(&draft)?;
    let updated = backend
        .update_recipe(recipe.id, &UpdateRecipeRequest::from(draft))
        .await?;
    info!(recipe_id = updated.id, "recipe updated");
    Ok(updated)
}

/// Returns whether a delete was actually issued; `Declined` makes no
/// request at all. Deleting an id that is already gone surfaces
/// `NotFound`, not a generic failure.
pub async fn delete(
    backend: &dyn RecipeBackend,
    user: &StoredUser,
    recipe: &Recipe,
    confirmation: DeleteConfirmation,
) -> Result<bool, ApiError> {
    if confirmation == DeleteConfirmation::Declined {
        return Ok(false);
    }
    ensure_owner(recipe, user)?;
    backend.delete_recipe(recipe.id).await?;
    info!(recipe_id = recipe.id, "recipe deleted");
    Ok(true)
}

/// Full catalog with aggregate scores, fetched with the concurrent
/// per-recipe rating fan-out.
pub async fn load_catalog(backend: &dyn RecipeBackend) -> Result<Vec<CatalogEntry>, ApiError> {
    let recipes = backend.list_recipes().await?;
    Ok(with_scores(backend, recipes).await)
}

pub async fn load_catalog_by_category(
    backend: &dyn RecipeBackend,
    category: &str,
) -> Result<Vec<CatalogEntry>, ApiError> {
    let recipes = backend.recipes_by_category(category).await?;
    Ok(with_scores(backend, recipes).await)
}

pub async fn load_catalog_by_user(
    backend: &dyn RecipeBackend,
    user_id: i64,
) -> Result<Vec<CatalogEntry>, ApiError> {
    let recipes = backend.recipes_by_user(user_id).await?;
    Ok(with_scores(backend, recipes).await)
}

async fn with_scores(backend: &dyn RecipeBackend, recipes: Vec<Recipe>) -> Vec<CatalogEntry> {
    let scores = scores_for(backend, &recipes).await;
    recipes
        .into_iter()
        .map(|recipe| {
            let score = scores.get(&recipe.id).copied().unwrap_or(RecipeScore::EMPTY);
            CatalogEntry { recipe, score }
        })
        .collect()
}
