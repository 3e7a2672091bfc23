use once_cell::sync::Lazy;
use regex::Regex;

static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9\-_]*$").unwrap());

/// 从标题生成 URL 友好的 slug
pub fn generate_slug(title: &str) -> String {
    let slug = slug::slugify(title);

    if slug.is_empty() {
        return "untitled".to_string();
    }

    // 限制长度，避免在单词中间截断
    if slug.len() > 100 {
        let mut truncated: String = slug.chars().take(100).collect();
        if let Some(last_hyphen) = truncated.rfind('-') {
            if last_hyphen > 50 {
                truncated = truncated[..last_hyphen].to_string();
            }
        }
        return truncated;
    }

    slug
}

/// 为 slug 添加唯一后缀（如果需要的话）
pub fn make_slug_unique(base_slug: &str, exists: impl Fn(&str) -> bool) -> String {
    if !exists(base_slug) {
        return base_slug.to_string();
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{}-{}", base_slug, counter);
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// 验证 slug 格式是否正确
pub fn is_valid_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > 100 {
        return false;
    }

    if slug.ends_with('-') || slug.contains("--") {
        return false;
    }

    SLUG_REGEX.is_match(slug)
}
