//! # 响应式图片描述解析（SrcsetSelector）
//!
//! ## 设计思路
//!
//! `srcset` 的比较逻辑只保留这一份：解析器处理 `<img>` / `<source>`，
//! 放大层绑定图片时也走这里，保证两处选出的分辨率一致。
//!
//! ## 实现思路
//!
//! - 以逗号分隔候选项；`data:` URL 内部的逗号属于 URL 本身，遇到空白才结束。
//! - 描述符取首个 token 的数字前缀：`2x` → 2.0，`640w` → 640.0。
//! - 缺失或无数字前缀的描述符按 1.0 处理。
//! - 选择密度最大者，并列时保留先出现的项。

use serde::Serialize;

/// 默认密度。
pub const DEFAULT_DENSITY: f64 = 1.0;

/// `srcset` 中的一个候选项。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SrcsetEntry {
    pub url: String,
    pub density: f64,
}

/// 解析 `srcset` 属性为候选列表（保持原顺序）。
pub fn parse_srcset(attr: &str) -> Vec<SrcsetEntry> {
    let mut entries = Vec::new();
    let mut rest = attr;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }

        let inline_data = rest
            .get(..5)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"));
        let url_end = rest
            .find(|c: char| c.is_whitespace() || (!inline_data && c == ','))
            .unwrap_or(rest.len());

        let raw_url = &rest[..url_end];
        let url = raw_url.trim_end_matches(',');
        rest = &rest[url_end..];

        // URL 自带结尾逗号时该项没有描述符。
        let descriptor = if url.len() != raw_url.len() {
            ""
        } else {
            let descriptor_end = rest.find(',').unwrap_or(rest.len());
            let descriptor = rest[..descriptor_end].trim();
            rest = &rest[descriptor_end..];
            descriptor
        };

        if url.is_empty() {
            continue;
        }

        entries.push(SrcsetEntry {
            url: url.to_string(),
            density: parse_density(descriptor),
        });
    }

    entries
}

/// 选出密度最高的候选 URL；输入为空或缺失时返回 `None`。
pub fn select_best(attr: Option<&str>) -> Option<String> {
    let attr = attr?.trim();
    if attr.is_empty() {
        return None;
    }

    let mut best: Option<SrcsetEntry> = None;
    for entry in parse_srcset(attr) {
        match &best {
            Some(current) if entry.density <= current.density => {}
            _ => best = Some(entry),
        }
    }

    best.map(|entry| entry.url)
}

/// 取描述符首个 token 的数字前缀。
fn parse_density(descriptor: &str) -> f64 {
    let token = descriptor.split_whitespace().next().unwrap_or("");

    let mut end = 0;
    let mut seen_dot = false;
    for (idx, ch) in token.char_indices() {
        let accepted = ch.is_ascii_digit()
            || (ch == '.' && !seen_dot)
            || (idx == 0 && (ch == '+' || ch == '-'));
        if !accepted {
            break;
        }
        seen_dot |= ch == '.';
        end = idx + ch.len_utf8();
    }

    token[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(DEFAULT_DENSITY)
}
