use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::RecipeBackend;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::ratings::dto::{CreateRatingRequest, Rating};
use crate::recipes::dto::{CreateRecipeRequest, Recipe, UpdateRecipeRequest};
use crate::users::dto::{LoginRequest, RegisterRequest, UpdateProfileRequest, UserResponse};

/// reqwest-backed [`RecipeBackend`] with an explicit per-request
/// timeout and status-code to error mapping.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GETs are idempotent, so a connect or timeout failure gets one
    /// retry before surfacing `FetchFailed`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(error) if error.is_connect() || error.is_timeout() => {
                debug!(%url, %error, "GET failed, retrying once");
                self.http
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| ApiError::fetch_failed(&url, e))?
            }
            Err(error) => return Err(ApiError::fetch_failed(&url, error)),
        };
        decode(&url, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::fetch_failed(&url, e))?;
        decode(&url, response).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .http
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::fetch_failed(&url, e))?;
        decode(&url, response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| ApiError::fetch_failed(&url, e))?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status if status.is_success() => Ok(()),
            status => Err(ApiError::fetch_failed(&url, format!("status {status}"))),
        }
    }
}

async fn decode<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(ApiError::NotFound),
        status if status.is_success() => response
            .json::<T>()
            .await
            .map_err(|e| ApiError::fetch_failed(url, e)),
        status => {
            warn!(%url, %status, "backend returned an error status");
            Err(ApiError::fetch_failed(url, format!("status {status}")))
        }
    }
}

#[async_trait]
impl RecipeBackend for HttpBackend {
    async fn register(&self, req: &RegisterRequest) -> Result<UserResponse, ApiError> {
        self.post_json("/users", req).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<UserResponse, ApiError> {
        self.post_json("/sessions", req).await
    }

    async fn update_user(
        &self,
        id: i64,
        req: &UpdateProfileRequest,
    ) -> Result<UserResponse, ApiError> {
        self.put_json(&format!("/users/{id}"), req).await
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        self.get_json("/recipes").await
    }

    async fn recipes_by_category(&self, category: &str) -> Result<Vec<Recipe>, ApiError> {
        self.get_json(&format!("/recipes/category/{category}")).await
    }

    async fn recipes_by_user(&self, user_id: i64) -> Result<Vec<Recipe>, ApiError> {
        self.get_json(&format!("/recipes/user/{user_id}")).await
    }

    async fn get_recipe(&self, id: i64) -> Result<Recipe, ApiError> {
        self.get_json(&format!("/recipes/{id}")).await
    }

    async fn create_recipe(&self, req: &CreateRecipeRequest) -> Result<Recipe, ApiError> {
        self.post_json("/recipes", req).await
    }

    async fn update_recipe(
        &self,
        id: i64,
        req: &UpdateRecipeRequest,
    ) -> Result<Recipe, ApiError> {
        self.put_json(&format!("/recipes/{id}"), req).await
    }

    async fn delete_recipe(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/recipes/{id}")).await
    }

    async fn ratings_for_recipe(&self, recipe_id: i64) -> Result<Vec<Rating>, ApiError> {
        self.get_json(&format!("/ratings/recipe/{recipe_id}")).await
    }

    async fn submit_rating(&self, req: &CreateRatingRequest) -> Result<Rating, ApiError> {
        self.post_json("/ratings", req).await
    }
}
