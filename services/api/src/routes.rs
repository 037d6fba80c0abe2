//! HTTP routes
//!
//! Every response carries a `success` flag; failures go through
//! [`ApiError`](crate::error::ApiError).

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{handle_panic, not_found},
    models::{
        admin::RestoreRequest,
        character::{PurchaseRequest, SelectRequest},
        economy::UpdateCreditsRequest,
        game::PlayGameRequest,
        inventory::AddItemRequest,
        mailbox::{ClaimGiftRequest, SendGiftRequest},
        messaging::SendMessageRequest,
        user::{ActivateRequest, LoginRequest, RegisterRequest, SearchQuery},
    },
    services::users::LoginIdentifier,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/search", get(search_users))
        .route("/users/:user_id", get(get_user))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/activation/activate", post(activate))
        .route("/credits/update", post(update_credits))
        .route("/credits/transactions/:user_id", get(get_transactions))
        .route("/characters/purchase", post(purchase_character))
        .route("/characters/select", post(select_character))
        .route("/inventory/add", post(add_inventory_item))
        .route("/inventory/:user_id", get(get_inventory))
        .route("/messages/send", post(send_message))
        .route("/messages/conversations/:user_id", get(get_conversations))
        .route("/mailbox/send-gift", post(send_gift))
        .route("/mailbox/claim-gift", post(claim_gift))
        .route("/mailbox/:user_id", get(get_mailbox))
        .route("/games/play", post(play_game))
        .route("/admin/stats", get(admin_stats))
        .route("/admin/backup", get(admin_backup))
        .route("/admin/restore", post(admin_restore));

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "status": "ok",
        "message": "SkyParty backend server is running",
        "timestamp": Utc::now(),
    }))
}

/// Create an account
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "User registered successfully",
        "user": user,
    })))
}

/// Log in by email or username
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let identifier = match (payload.email, payload.username) {
        (Some(email), _) if !email.trim().is_empty() => LoginIdentifier::Email(email),
        (_, Some(username)) if !username.trim().is_empty() => LoginIdentifier::Username(username),
        _ => {
            return Err(ApiError::BadRequest(
                "Email or username and password are required".to_string(),
            ));
        }
    };

    let user = state.users.login(identifier, &payload.password).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "user": user,
    })))
}

/// Search users by username
pub async fn search_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let users = state
        .users
        .search(query.query.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(json!({
        "success": true,
        "users": users,
    })))
}

/// Public profile of one user
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = state.users.profile(user_id).await?;

    Ok(Json(json!({
        "success": true,
        "user": user,
    })))
}

/// Redeem an activation code
pub async fn activate(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ActivateRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .users
        .activate(&payload.email, &payload.activation_code)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Account activated successfully",
    })))
}

/// Add or subtract credits
pub async fn update_credits(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateCreditsRequest>,
) -> ApiResult<impl IntoResponse> {
    let new_balance = state
        .economy
        .update_credits(payload.user_id, payload.amount, payload.operation)
        .await?;

    Ok(Json(json!({
        "success": true,
        "newBalance": new_balance,
    })))
}

/// Ledger entries for one user
pub async fn get_transactions(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let transactions = state.economy.transactions(user_id).await?;

    Ok(Json(json!({
        "success": true,
        "transactions": transactions,
    })))
}

/// Buy a character
pub async fn purchase_character(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PurchaseRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .characters
        .purchase(
            payload.user_id,
            &payload.character_id,
            &payload.character_data,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "newBalance": outcome.new_balance,
        "ownedCharacters": outcome.owned_characters,
    })))
}

/// Switch the active character
pub async fn select_character(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SelectRequest>,
) -> ApiResult<impl IntoResponse> {
    let current = state
        .characters
        .select(payload.user_id, &payload.character_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "currentCharacter": current,
    })))
}

/// Items owned by a user
pub async fn get_inventory(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let items = state.inventory.list(user_id).await?;

    Ok(Json(json!({
        "success": true,
        "items": items,
    })))
}

/// Append an item to a user's inventory
pub async fn add_inventory_item(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AddItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let item = state.inventory.add(payload.user_id, payload.item).await?;

    Ok(Json(json!({
        "success": true,
        "item": item,
    })))
}

/// Send a direct message
pub async fn send_message(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = state
        .messaging
        .send_message(
            payload.sender_id,
            payload.recipient_id,
            &payload.content,
            payload.conversation_id,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": message,
    })))
}

/// Conversations a user takes part in
pub async fn get_conversations(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let conversations = state.messaging.conversations(user_id).await?;

    Ok(Json(json!({
        "success": true,
        "conversations": conversations,
    })))
}

/// Gifts in a user's mailbox, newest first
pub async fn get_mailbox(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let items = state.mailbox.list(user_id).await?;

    Ok(Json(json!({
        "success": true,
        "items": items,
    })))
}

/// Send a character or credits gift
pub async fn send_gift(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SendGiftRequest>,
) -> ApiResult<impl IntoResponse> {
    let gift = state
        .mailbox
        .send_gift(
            payload.sender_id,
            payload.recipient_id,
            payload.gift_type,
            payload.gift_data,
            payload.message,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Gift sent successfully",
        "gift": gift,
    })))
}

/// Accept or reject a gift
pub async fn claim_gift(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ClaimGiftRequest>,
) -> ApiResult<impl IntoResponse> {
    let gift = state
        .mailbox
        .claim_gift(payload.user_id, payload.gift_id, payload.action)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Gift {} successfully", payload.action.past_tense()),
        "gift": gift,
    })))
}

/// Record a finished game
pub async fn play_game(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PlayGameRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .games
        .play(payload.user_id, &payload.game_type, payload.earned_credits)
        .await?;

    Ok(Json(json!({
        "success": true,
        "earnedCredits": outcome.earned_credits,
        "newBalance": outcome.new_balance,
        "session": outcome.session,
    })))
}

/// Aggregate counters
pub async fn admin_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stats = state.admin.stats().await?;

    Ok(Json(json!({
        "success": true,
        "stats": stats,
    })))
}

/// Dump every collection
pub async fn admin_backup(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let backup = state.admin.backup().await?;

    Ok(Json(json!({
        "success": true,
        "backup": backup,
    })))
}

/// Overwrite collections from a backup
pub async fn admin_restore(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RestoreRequest>,
) -> ApiResult<impl IntoResponse> {
    let restored = state.admin.restore(payload.backup).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Data restored successfully",
        "restored": restored,
    })))
}
