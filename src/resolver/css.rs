//! CSS `background-image` 取值解析

use once_cell::sync::Lazy;
use regex::Regex;

static CSS_URL_RE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)]*?))\s*\)"#)
});

/// 取出计算值中的第一个 `url(...)`；`none` 或没有 url 项时返回 `None`。
pub fn parse_css_url(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return None;
    }

    let regex = match CSS_URL_RE.as_ref() {
        Ok(regex) => regex,
        Err(err) => {
            log::error!("❌ CSS url 正则编译失败：{}", err);
            return None;
        }
    };

    let captures = regex.captures(trimmed)?;
    let url = captures
        .get(1)
        .or_else(|| captures.get(2))
        .or_else(|| captures.get(3))?
        .as_str()
        .trim();

    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_and_unquoted_urls() {
        assert_eq!(parse_css_url(r#"url("https://x/a.png")"#).as_deref(), Some("https://x/a.png"));
        assert_eq!(parse_css_url("url('b.png')").as_deref(), Some("b.png"));
        assert_eq!(parse_css_url("url( c.png )").as_deref(), Some("c.png"));
    }

    #[test]
    fn none_and_gradients_yield_nothing() {
        assert_eq!(parse_css_url("none"), None);
        assert_eq!(parse_css_url(""), None);
        assert_eq!(parse_css_url("linear-gradient(red, blue)"), None);
        assert_eq!(parse_css_url("url(\"\")"), None);
    }

    #[test]
    fn first_layer_wins() {
        assert_eq!(
            parse_css_url(r#"linear-gradient(red, blue), url("top.png"), url("bottom.png")"#).as_deref(),
            Some("top.png")
        );
    }

    #[test]
    fn data_url_with_parentheses_free_payload() {
        assert_eq!(
            parse_css_url(r#"url("data:image/png;base64,iVBORw0KGgo=")"#).as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
    }
}
