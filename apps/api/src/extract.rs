//! Request extractors whose rejections render as [`AppError`], so malformed
//! bodies, query strings and path segments get the usual error envelope.

use axum::extract::{FromRequest, FromRequestParts, Path, Query};
use axum::Json;

use crate::errors::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
