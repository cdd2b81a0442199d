mod http;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpBackend;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::ratings::dto::{CreateRatingRequest, Rating};
use crate::recipes::dto::{CreateRecipeRequest, Recipe, UpdateRecipeRequest};
use crate::users::dto::{LoginRequest, RegisterRequest, UpdateProfileRequest, UserResponse};

/// The full REST surface of the recipe service, behind one seam so the
/// service layer can run against the HTTP implementation or an
/// in-memory fake in tests.
///
/// The backend is the authority for every constraint the client also
/// checks (ownership, one rating per user and recipe); nothing here
/// assumes the client-side checks were performed.
#[async_trait]
pub trait RecipeBackend: Send + Sync {
    async fn register(&self, req: &RegisterRequest) -> Result<UserResponse, ApiError>;
    async fn login(&self, req: &LoginRequest) -> Result<UserResponse, ApiError>;
    async fn update_user(&self, id: i64, req: &UpdateProfileRequest)
        -> Result<UserResponse, ApiError>;

    async fn list_recipes(&self) -> Result<Vec<Recipe>, ApiError>;
    async fn recipes_by_category(&self, category: &str) -> Result<Vec<Recipe>, ApiError>;
    async fn recipes_by_user(&self, user_id: i64) -> Result<Vec<Recipe>, ApiError>;
    async fn get_recipe(&self, id: i64) -> Result<Recipe, ApiError>;
    async fn create_recipe(&self, req: &CreateRecipeRequest) -> Result<Recipe, ApiError>;
    async fn update_recipe(&self, id: i64, req: &UpdateRecipeRequest)
        -> Result<Recipe, ApiError>;
    async fn delete_recipe(&self, id: i64) -> Result<(), ApiError>;

    /// Canonical response shape is a bare `[Rating]` array.
    async fn ratings_for_recipe(&self, recipe_id: i64) -> Result<Vec<Rating>, ApiError>;
    async fn submit_rating(&self, req: &CreateRatingRequest) -> Result<Rating, ApiError>;
}
