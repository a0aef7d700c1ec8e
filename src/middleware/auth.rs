use axum::{extract::Request, middleware::Next, response::IntoResponse, response::Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::utils::token::decode_token;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub exp: usize,
}

/// The logged-in student, placed in request extensions by [`require_student_auth`].
#[derive(Debug, Clone)]
pub struct AuthStudent {
    pub id: Uuid,
    pub full_name: String,
}

pub async fn require_student_auth(mut req: Request, next: Next) -> Response {
    match authenticate(&req) {
        Ok(student) => {
            req.extensions_mut().insert(student);
            next.run(req).await
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %req.uri().path(), "rejected request");
            err.into_response()
        }
    }
}

fn authenticate(req: &Request) -> Result<AuthStudent, Error> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(Error::Unauthorized("No token provided".to_string()));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(Error::InvalidRequest("Bad authorization header".to_string()));
    };
    let mut parts = auth_str.split(' ');
    let (Some("Bearer"), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::InvalidRequest("Bad authorization header".to_string()));
    };

    let config = crate::config::get_config();
    let claims = decode_token(token, &config.jwt_secret)?;
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| Error::Forbidden("Invalid or expired token".to_string()))?;

    Ok(AuthStudent {
        id,
        full_name: claims.name,
    })
}
