//! Extractors that reject with the JSON error envelope

use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query};

use crate::error::ApiError;

/// `Json` whose rejection is a 400 envelope
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` whose rejection is a 400 envelope
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `Query` whose rejection is a 400 envelope
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
