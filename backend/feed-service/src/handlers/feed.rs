use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::feed::FeedService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQueryParams {
    pub user_id: Option<Uuid>,
    pub cursor: Option<Uuid>,
    pub limit: Option<u32>,
}

pub struct FeedHandlerState {
    pub service: FeedService,
    pub default_limit: u32,
    pub max_limit: u32,
}

/// `GET /feed` - one ranked, cursor-paginated page of the main feed
#[get("/feed")]
pub async fn get_main_feed(
    query: web::Query<FeedQueryParams>,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;

    let limit = query
        .limit
        .unwrap_or(state.default_limit)
        .min(state.max_limit)
        .max(1);

    debug!(
        %user_id,
        limit,
        cursor = ?query.cursor,
        "feed request"
    );

    let page = state
        .service
        .main_feed(user_id, query.cursor, limit as usize)
        .await?;

    crate::metrics::record_feed_page(page.posts.len());

    Ok(HttpResponse::Ok().json(page))
}
