//! `{{ }}` interpolation detection.
//!
//! Turns `"hello {{name}}"` into the single expression source
//! `"hello "+(name)` so the whole value can be parsed at once.

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub has_binding: bool,
    /// Delimiter-free expression source, or the raw text when static.
    pub normalized: String,
}

pub trait BindingDetector {
    fn detect_binding(&self, raw: &str) -> Binding;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MustacheDetector;

lazy_static! {
    // Trailing braces after the first `}}` belong to the expression, which keeps
    // object literals such as `{{ {a: 1} }}` intact.
    static ref MUSTACHE_RE: Regex = Regex::new(r"(?s)\{\{(.+?)\}\}(\}*)").unwrap();
}

impl BindingDetector for MustacheDetector {
    fn detect_binding(&self, raw: &str) -> Binding {
        let mut pieces: Vec<String> = Vec::new();
        let mut last_end = 0;

        for caps in MUSTACHE_RE.captures_iter(raw) {
            let (Some(whole), Some(exp)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let pre = &raw[last_end..whole.start()];
            if !pre.is_empty() {
                pieces.push(quote(pre));
            }
            let spill = caps.get(2).map_or("", |m| m.as_str());
            let exp = format!("{}{}", exp.as_str(), spill);
            pieces.push(format!("({})", exp.trim()));
            last_end = whole.end();
        }

        if pieces.is_empty() {
            return Binding {
                has_binding: false,
                normalized: raw.to_string(),
            };
        }

        let post = &raw[last_end..];
        if !post.is_empty() {
            pieces.push(quote(post));
        }

        Binding {
            has_binding: true,
            normalized: pieces.join("+"),
        }
    }
}

fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
