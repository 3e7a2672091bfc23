use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// 404错误页
const NOT_FOUND_PAGE: &str = include_str!("../templates/not_found.html");

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Login required")]
    LoginRequired { next: String },

    #[error("Only the author may edit post {post_id}")]
    NotAuthor { post_id: i64 },

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Validation error: {0}")]
    ValidatorError(#[from] validator::ValidationErrors),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // 未登录的访问重定向到登录页，保留原始目标
            AppError::LoginRequired { next } => {
                let query = serde_urlencoded::to_string([("next", next.as_str())])
                    .unwrap_or_default();
                Redirect::to(&format!("/auth/login/?{}", query)).into_response()
            }
            // 非作者的编辑请求重定向回详情页，而不是 403
            AppError::NotAuthor { post_id } => {
                Redirect::to(&format!("/posts/{}/", post_id)).into_response()
            }
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                    NOT_FOUND_PAGE,
                )
                    .into_response()
            }
            AppError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded").into_response()
            }
            AppError::Authentication(msg) => {
                tracing::debug!("Authentication error: {}", msg);
                error_page(StatusCode::UNAUTHORIZED, &msg)
            }
            AppError::Authorization(msg) => {
                tracing::debug!("Authorization error: {}", msg);
                error_page(StatusCode::FORBIDDEN, &msg)
            }
            AppError::Validation(msg) => error_page(StatusCode::BAD_REQUEST, &msg),
            AppError::ValidatorError(e) => {
                error_page(StatusCode::BAD_REQUEST, &e.to_string())
            }
            AppError::BadRequest(msg) => error_page(StatusCode::BAD_REQUEST, &msg),
            AppError::Conflict(msg) => error_page(StatusCode::CONFLICT, &msg),
            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                )
            }
        }
    }
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{status}</title></head>\n\
         <body><main><h1>{status}</h1><p>{message}</p><p><a href=\"/\">Back to the feed</a></p></main></body>\n</html>",
        status = status.as_u16(),
        message = html_escape(message),
    );
    (status, Html(body)).into_response()
}

/// 模板之外的错误页需要手动转义
fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// 便利函数，用于创建常见错误
impl AppError {
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{} not found", resource))
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::Authentication(msg.to_string())
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::BadRequest(msg.to_string())
    }

    pub fn internal(msg: &str) -> Self {
        Self::Internal(msg.to_string())
    }

    pub fn conflict(msg: &str) -> Self {
        Self::Conflict(msg.to_string())
    }

    pub fn validation(msg: &str) -> Self {
        Self::Validation(msg.to_string())
    }
}

// 从其他错误类型转换
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_required_preserves_target() {
        let response = AppError::LoginRequired {
            next: "/create/".to_string(),
        }
        .into_response();
        assert!(response.status().is_redirection());
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "/auth/login/?next=%2Fcreate%2F");
    }

    #[test]
    fn not_author_redirects_to_detail() {
        let response = AppError::NotAuthor { post_id: 7 }.into_response();
        assert!(response.status().is_redirection());
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "/posts/7/");
    }

    #[test]
    fn not_found_renders_error_page() {
        let response = AppError::not_found("Group").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn escape_handles_markup() {
        assert_eq!(html_escape("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
    }
}
