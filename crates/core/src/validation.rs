//! Input validation for client-supplied dashboard and comment fields,
//! plus pagination clamping.

/// Maximum length of a dashboard title in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a comment message in characters.
pub const MAX_COMMENT_LENGTH: usize = 5_000;

/// Default notification page size.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Maximum notification page size.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Validate a dashboard title: non-blank and at most [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Dashboard title must not be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Dashboard title must be at most {MAX_TITLE_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate an embed URL: must be an absolute http(s) URL.
pub fn validate_embed_url(url: &str) -> Result<(), String> {
    let url = url.trim();
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err("embedUrl must be an absolute http(s) URL".to_string())
    }
}

/// Validate a comment body: non-blank and at most [`MAX_COMMENT_LENGTH`] characters.
pub fn validate_comment_message(message: &str) -> Result<(), String> {
    if message.trim().is_empty() {
        return Err("Comment message must not be empty".to_string());
    }
    if message.chars().count() > MAX_COMMENT_LENGTH {
        return Err(format!(
            "Comment message must be at most {MAX_COMMENT_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Clamp a 1-based page number; anything below 1 becomes 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Clamp a page size into `1..=MAX_PAGE_LIMIT`, defaulting to [`DEFAULT_PAGE_LIMIT`].
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n >= 1 => n.min(MAX_PAGE_LIMIT),
        _ => DEFAULT_PAGE_LIMIT,
    }
}

/// Rows to skip before `page`. Saturates instead of overflowing, so an
/// absurd page number simply yields an empty page.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).max(0).saturating_mul(limit.max(0))
}

/// Number of pages needed for `total` items at `limit` per page.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
