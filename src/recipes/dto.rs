use serde::{Deserialize, Serialize};

/// A recipe as stored by the backend. `user_id` is the owner and never
/// changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub steps: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub user_id: i64,
}

/// The user-editable recipe fields, shared by the create and update
/// paths. All fields except the image URL are required non-empty.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub steps: String,
    pub category: String,
    pub image_url: Option<String>,
}

/// Body for `POST /recipes`. The owner comes from the session, never
/// from caller input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub steps: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub user_id: i64,
}

/// Body for `PUT /recipes/{id}`. Deliberately carries neither `id` nor
/// `userId`: recipe identity and ownership are immutable, and leaving
/// the fields out of the type makes sending them impossible.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub steps: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CreateRecipeRequest {
    pub fn from_draft(draft: RecipeDraft, owner_id: i64) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            ingredients: draft.ingredients,
            steps: draft.steps,
            category: draft.category,
            image_url: draft.image_url,
            user_id: owner_id,
        }
    }
}

impl From<RecipeDraft> for UpdateRecipeRequest {
    fn from(draft: RecipeDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            ingredients: draft.ingredients,
            steps: draft.steps,
            category: draft.category,
            image_url: draft.image_url,
        }
    }
}
