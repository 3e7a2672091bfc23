use handlebars::Handlebars;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::utils::validation::FieldErrors;

/// 页面渲染服务
///
/// Templates are embedded at compile time and registered once at startup;
/// HTML escaping stays on, so post and comment text render as plain text.
#[derive(Clone)]
pub struct RenderService {
    registry: Arc<Handlebars<'static>>,
}

const TEMPLATES: &[(&str, &str)] = &[
    // 布局与局部模板
    ("layout", include_str!("../../templates/layout.hbs")),
    ("post_card", include_str!("../../templates/post_card.hbs")),
    ("pagination", include_str!("../../templates/pagination.hbs")),
    ("form_errors", include_str!("../../templates/form_errors.hbs")),
    ("post_list", include_str!("../../templates/post_list.hbs")),
    // 页面
    ("index", include_str!("../../templates/index.hbs")),
    ("group_list", include_str!("../../templates/group_list.hbs")),
    ("profile", include_str!("../../templates/profile.hbs")),
    ("post_detail", include_str!("../../templates/post_detail.hbs")),
    ("create_post", include_str!("../../templates/create_post.hbs")),
    ("follow", include_str!("../../templates/follow.hbs")),
    ("login", include_str!("../../templates/login.hbs")),
    ("signup", include_str!("../../templates/signup.hbs")),
];

impl RenderService {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();

        for (name, source) in TEMPLATES {
            registry
                .register_template_string(name, *source)
                .map_err(|e| AppError::Internal(format!("Template '{}' failed: {}", name, e)))?;
        }

        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    pub fn render(&self, template: &str, context: &Value) -> Result<String> {
        Ok(self.registry.render(template, context)?)
    }
}

/// 把字段错误摊平成模板可以直接遍历的列表
pub fn flatten_errors(errors: &FieldErrors) -> Value {
    let flat: Vec<Value> = errors
        .iter()
        .flat_map(|(field, messages)| {
            messages.iter().map(move |message| {
                serde_json::json!({ "field": field, "message": message })
            })
        })
        .collect();
    Value::Array(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_templates_register() {
        assert!(RenderService::new().is_ok());
    }

    #[test]
    fn post_list_renders_posts_and_escapes_markup() {
        let render = RenderService::new().unwrap();
        let fragment = render
            .render(
                "post_list",
                &json!({
                    "page_obj": {
                        "items": [{
                            "id": 1,
                            "text": "<script>alert(1)</script>",
                            "image": null,
                            "pub_date": "1 Jan 2026 12:00",
                            "author": "alice",
                            "group": null,
                            "comment_count": 0,
                        }],
                        "number": 1,
                        "total_pages": 1,
                        "has_previous": false,
                        "has_next": false,
                        "previous_page": null,
                        "next_page": null,
                    },
                }),
            )
            .unwrap();

        assert!(fragment.contains("alice"));
        assert!(!fragment.contains("<script>alert"));
        assert!(fragment.contains("&lt;script&gt;"));
    }

    #[test]
    fn index_embeds_the_feed_fragment_unescaped() {
        let render = RenderService::new().unwrap();
        let html = render
            .render(
                "index",
                &json!({
                    "title": "Latest posts",
                    "current_user": "alice",
                    "feed": "<article class=\"post\">cached</article>",
                }),
            )
            .unwrap();

        assert!(html.contains("<article class=\"post\">cached</article>"));
        assert!(html.contains("Latest posts"));
    }

    #[test]
    fn flatten_errors_produces_field_message_pairs() {
        let mut errors = FieldErrors::new();
        errors
            .entry("text".to_string())
            .or_default()
            .push("Post text is required".to_string());

        let flat = flatten_errors(&errors);
        assert_eq!(flat[0]["field"], "text");
        assert_eq!(flat[0]["message"], "Post text is required");
    }
}
