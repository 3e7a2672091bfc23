use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

use crate::models::comment::CommentForm;
use crate::models::post::PostForm;
use crate::models::user::SignupForm;

/// Field name to messages, ordered so form re-renders are deterministic.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

/// Post form after validation; the group id is parsed but not yet resolved
/// against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// 校验发帖表单；返回规范化后的字段或按字段聚合的错误
pub fn validate_post_form(form: &PostForm, max_text_length: usize) -> Result<ValidatedPost, FieldErrors> {
    let mut errors = FieldErrors::new();

    let text = form.text.as_deref().unwrap_or("").trim().to_string();
    if text.is_empty() {
        push_error(&mut errors, "text", "Post text is required");
    } else if text.len() > max_text_length {
        push_error(
            &mut errors,
            "text",
            &format!("Post text must be at most {} characters", max_text_length),
        );
    }

    let group_id = match form.group.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                push_error(&mut errors, "group", "Select a valid group");
                None
            }
        },
    };

    let image = match form.image.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(url) if url.len() > 500 => {
            push_error(&mut errors, "image", "Image URL is too long");
            None
        }
        Some(url) => Some(url.to_string()),
    };

    if errors.is_empty() {
        Ok(ValidatedPost {
            text,
            group_id,
            image,
        })
    } else {
        Err(errors)
    }
}

/// 校验评论表单
pub fn validate_comment_form(form: &CommentForm, max_text_length: usize) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();

    let text = form.text.as_deref().unwrap_or("").trim().to_string();
    if text.is_empty() {
        push_error(&mut errors, "text", "Comment text is required");
    } else if text.len() > max_text_length {
        push_error(
            &mut errors,
            "text",
            &format!("Comment must be at most {} characters", max_text_length),
        );
    }

    if errors.is_empty() {
        Ok(text)
    } else {
        Err(errors)
    }
}

/// 校验注册表单
pub fn validate_signup_form(form: &SignupForm) -> Result<(), FieldErrors> {
    let mut errors = match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => field_errors_from(&e),
    };

    // 用户名只能包含字母、数字、下划线和连字符
    if !form.username.is_empty() && !USERNAME_REGEX.is_match(&form.username) {
        push_error(
            &mut errors,
            "username",
            "Username may only contain letters, digits, underscores and hyphens",
        );
    }

    if form.password != form.password_confirm {
        push_error(&mut errors, "password_confirm", "Passwords do not match");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// 把 validator 的错误折叠成字段 -> 消息映射
pub fn field_errors_from(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}
