use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{InterestRepository, PostRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::PostView;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPostsQuery {
    pub user_id: Option<Uuid>,
}

pub struct PostsHandlerState {
    pub posts: PostRepository,
    pub interests: InterestRepository,
    pub users: UserRepository,
}

/// `GET /user-posts` - a user's own posts, newest first
#[get("/user-posts")]
pub async fn get_user_posts(
    query: web::Query<UserPostsQuery>,
    state: web::Data<PostsHandlerState>,
) -> Result<HttpResponse> {
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;

    if !state.users.exists(user_id).await? {
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }

    let posts = state.posts.posts_by_user(user_id).await?;
    let views: Vec<PostView> = posts.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(views))
}

/// `GET /tags` - all interest tags
#[get("/tags")]
pub async fn get_all_tags(state: web::Data<PostsHandlerState>) -> Result<HttpResponse> {
    let tags = state.interests.list_tags().await?;
    Ok(HttpResponse::Ok().json(tags))
}
