//! In-memory stand-in for the recipe service, used by the service
//! layer tests. Deliberately does NOT enforce the one-rating-per-user
//! constraint, mirroring a backend without it, so tests can show the
//! client-side duplicate guard is advisory only.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::RecipeBackend;
use crate::error::ApiError;
use crate::ratings::dto::{CreateRatingRequest, Rating};
use crate::recipes::dto::{CreateRecipeRequest, Recipe, UpdateRecipeRequest};
use crate::users::dto::{LoginRequest, RegisterRequest, UpdateProfileRequest, UserResponse};

pub(crate) struct FakeBackend {
    inner: Mutex<Inner>,
    /// How many rating POSTs actually reached the backend.
    pub rating_posts: AtomicUsize,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<(UserResponse, String)>,
    recipes: Vec<Recipe>,
    ratings: Vec<Rating>,
    failing_rating_feeds: HashSet<i64>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
            rating_posts: AtomicUsize::new(0),
        }
    }

    fn alloc_id(inner: &mut Inner) -> i64 {
        let id = inner.next_id;
        inner.next_id += 1;
        id
    }

    pub fn seed_user(&self, username: &str, email: &str, password: &str) -> UserResponse {
        let mut inner = self.inner.lock().unwrap();
        let user = UserResponse {
            id: Self::alloc_id(&mut inner),
            username: username.into(),
            email: email.into(),
        };
        inner.users.push((user.clone(), password.into()));
        user
    }

    pub fn seed_recipe(&self, owner_id: i64, title: &str, category: &str) -> Recipe {
        let mut inner = self.inner.lock().unwrap();
        let recipe = Recipe {
            id: Self::alloc_id(&mut inner),
            title: title.into(),
            description: format!("{title} description"),
            ingredients: "some ingredients".into(),
            steps: "some steps".into(),
            category: category.into(),
            image_url: None,
            user_id: owner_id,
        };
        inner.recipes.push(recipe.clone());
        recipe
    }

    pub fn seed_rating(&self, recipe_id: i64, user_id: i64, stars: u8) -> Rating {
        let mut inner = self.inner.lock().unwrap();
        let rating = Rating {
            id: Self::alloc_id(&mut inner),
            recipe_id,
            user_id,
            stars,
            comment: "seeded".into(),
            created_at: Some(OffsetDateTime::now_utc()),
        };
        inner.ratings.push(rating.clone());
        rating
    }

    /// Make `GET /ratings/recipe/{id}` fail for one recipe.
    pub fn fail_ratings_for(&self, recipe_id: i64) {
        self.inner
            .lock()
            .unwrap()
            .failing_rating_feeds
            .insert(recipe_id);
    }
}

#[async_trait]
impl RecipeBackend for FakeBackend {
    async fn register(&self, req: &RegisterRequest) -> Result<UserResponse, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|(u, _)| u.email == req.email) {
            return Err(ApiError::fetch_failed("/users", "status 409 Conflict"));
        }
        let user = UserResponse {
            id: Self::alloc_id(&mut inner),
            username: req.username.clone(),
            email: req.email.clone(),
        };
        inner.users.push((user.clone(), req.password.clone()));
        Ok(user)
    }

    async fn login(&self, req: &LoginRequest) -> Result<UserResponse, ApiError> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|(u, password)| u.email == req.email && *password == req.password)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| ApiError::fetch_failed("/sessions", "status 401 Unauthorized"))
    }

    async fn update_user(
        &self,
        id: i64,
        req: &UpdateProfileRequest,
    ) -> Result<UserResponse, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner
            .users
            .iter_mut()
            .find(|(u, _)| u.id == id)
            .ok_or(ApiError::NotFound)?;
        entry.0.username = req.username.clone();
        entry.0.email = req.email.clone();
        if let Some(password) = &req.password {
            entry.1 = password.clone();
        }
        Ok(entry.0.clone())
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        Ok(self.inner.lock().unwrap().recipes.clone())
    }

    async fn recipes_by_category(&self, category: &str) -> Result<Vec<Recipe>, ApiError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .recipes
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect())
    }

    async fn recipes_by_user(&self, user_id: i64) -> Result<Vec<Recipe>, ApiError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .recipes
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_recipe(&self, id: i64) -> Result<Recipe, ApiError> {
        self.inner
            .lock()
            .unwrap()
            .recipes
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_recipe(&self, req: &CreateRecipeRequest) -> Result<Recipe, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let recipe = Recipe {
            id: Self::alloc_id(&mut inner),
            title: req.title.clone(),
            description: req.description.clone(),
            ingredients: req.ingredients.clone(),
            steps: req.steps.clone(),
            category: req.category.clone(),
            image_url: req.image_url.clone(),
            user_id: req.user_id,
        };
        inner.recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        id: i64,
        req: &UpdateRecipeRequest,
    ) -> Result<Recipe, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let recipe = inner
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApiError::NotFound)?;
        // id and user_id stay untouched, as on the real backend.
        recipe.title = req.title.clone();
        recipe.description = req.description.clone();
        recipe.ingredients = req.ingredients.clone();
        recipe.steps = req.steps.clone();
        recipe.category = req.category.clone();
        recipe.image_url = req.image_url.clone();
        Ok(recipe.clone())
    }

    async fn delete_recipe(&self, id: i64) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.recipes.len();
        inner.recipes.retain(|r| r.id != id);
        if inner.recipes.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn ratings_for_recipe(&self, recipe_id: i64) -> Result<Vec<Rating>, ApiError> {
        let inner = self.inner.lock().unwrap();
        if inner.failing_rating_feeds.contains(&recipe_id) {
            return Err(ApiError::fetch_failed(
                format!("/ratings/recipe/{recipe_id}"),
                "status 500 Internal Server Error",
            ));
        }
        Ok(inner
            .ratings
            .iter()
            .filter(|r| r.recipe_id == recipe_id)
            .cloned()
            .collect())
    }

    async fn submit_rating(&self, req: &CreateRatingRequest) -> Result<Rating, ApiError> {
        self.rating_posts.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.lock().unwrap();
        let rating = Rating {
            id: Self::alloc_id(&mut inner),
            recipe_id: req.recipe_id,
            user_id: req.user_id,
            stars: req.stars,
            comment: req.comment.clone(),
            created_at: Some(OffsetDateTime::now_utc()),
        };
        inner.ratings.push(rating.clone());
        Ok(rating)
    }
}
