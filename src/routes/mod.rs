pub mod accounts;
pub mod attempts;
pub mod dashboard;
pub mod health;
pub mod quiz;
pub mod tasks;

use axum::extract::FromRequest;
use uuid::Uuid;

use crate::error::{Error, Result};

/// `Json` whose rejections (bad syntax, wrong shape, missing content type)
/// become a 400 in the crate's error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::InvalidRequest("Invalid id".to_string()))
}
