//! Directive configuration per markup dialect.
//!
//! Each target platform spells its directives differently (`wx:if`, `a:if`,
//! `s-if`, ...). The simplifier only needs the literal attribute names so it
//! can recognise and strip them.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::SimplifyError;

/// Tag the parser gives to synthetic wrapper nodes.
pub const TRANSIENT_TAG: &str = "temp-node";

/// Generic grouping tag understood by every generator.
pub const BLOCK_TAG: &str = "block";

/// Attribute carrying the per-event handler descriptor map.
pub const EVENT_CONFIG_ATTR: &str = "data-eventconfigs";

// ═══════════════════════════════════════════════════════════════════════════════
// MODES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Wx,
    Ali,
    Swan,
    Qq,
    Tt,
    Jd,
    Dd,
    Ios,
    Android,
    Harmony,
}

impl Mode {
    pub const ALL: [Mode; 10] = [
        Mode::Wx,
        Mode::Ali,
        Mode::Swan,
        Mode::Qq,
        Mode::Tt,
        Mode::Jd,
        Mode::Dd,
        Mode::Ios,
        Mode::Android,
        Mode::Harmony,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Wx => "wx",
            Mode::Ali => "ali",
            Mode::Swan => "swan",
            Mode::Qq => "qq",
            Mode::Tt => "tt",
            Mode::Jd => "jd",
            Mode::Dd => "dd",
            Mode::Ios => "ios",
            Mode::Android => "android",
            Mode::Harmony => "harmony",
        }
    }

    /// Directive names for this mode.
    pub fn directives(&self) -> &'static DirectiveConfig {
        // Every mode is inserted when the table is built.
        &DIRECTIVE_TABLE[self]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SimplifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| SimplifyError::UnknownMode(s.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIRECTIVE TABLE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveConfig {
    #[serde(rename = "if")]
    pub if_: String,
    pub elseif: String,
    #[serde(rename = "else")]
    pub else_: String,
    #[serde(rename = "for")]
    pub for_: String,
    pub for_index: String,
    pub for_item: String,
    pub key: String,
    pub model: String,
    pub model_prop: String,
    pub model_event: String,
    pub model_value_path: String,
    pub model_filter: String,
    pub dynamic_class: String,
    pub dynamic_style: String,
    #[serde(rename = "ref")]
    pub ref_: String,
    pub show: String,
}

impl DirectiveConfig {
    fn with(spell: impl Fn(&str) -> String) -> Self {
        DirectiveConfig {
            if_: spell("if"),
            elseif: spell("elif"),
            else_: spell("else"),
            for_: spell("for"),
            for_index: spell("for-index"),
            for_item: spell("for-item"),
            key: spell("key"),
            model: spell("model"),
            model_prop: spell("model-prop"),
            model_event: spell("model-event"),
            model_value_path: spell("model-value-path"),
            model_filter: spell("model-filter"),
            dynamic_class: spell("class"),
            dynamic_style: spell("style"),
            ref_: spell("ref"),
            show: spell("show"),
        }
    }

    /// `wx:if` style spelling.
    pub fn namespaced(prefix: &str) -> Self {
        Self::with(|name| format!("{}:{}", prefix, name))
    }

    /// `s-if` style spelling.
    pub fn dashed(prefix: &str) -> Self {
        Self::with(|name| format!("{}-{}", prefix, name))
    }

    pub fn names(&self) -> [&str; 16] {
        [
            self.if_.as_str(),
            self.elseif.as_str(),
            self.else_.as_str(),
            self.for_.as_str(),
            self.for_index.as_str(),
            self.for_item.as_str(),
            self.key.as_str(),
            self.model.as_str(),
            self.model_prop.as_str(),
            self.model_event.as_str(),
            self.model_value_path.as_str(),
            self.model_filter.as_str(),
            self.dynamic_class.as_str(),
            self.dynamic_style.as_str(),
            self.ref_.as_str(),
            self.show.as_str(),
        ]
    }

    pub fn is_directive(&self, attr_name: &str) -> bool {
        self.names().iter().any(|name| *name == attr_name)
    }
}

lazy_static! {
    static ref DIRECTIVE_TABLE: HashMap<Mode, DirectiveConfig> = {
        let mut m = HashMap::new();
        m.insert(Mode::Wx, DirectiveConfig::namespaced("wx"));
        m.insert(Mode::Ali, DirectiveConfig::namespaced("a"));
        m.insert(Mode::Swan, DirectiveConfig::dashed("s"));
        m.insert(Mode::Qq, DirectiveConfig::namespaced("qq"));
        m.insert(Mode::Tt, DirectiveConfig::namespaced("tt"));
        m.insert(Mode::Jd, DirectiveConfig::namespaced("jd"));
        m.insert(Mode::Dd, DirectiveConfig::namespaced("dd"));
        // Native targets compile from wx-flavoured templates.
        m.insert(Mode::Ios, DirectiveConfig::namespaced("wx"));
        m.insert(Mode::Android, DirectiveConfig::namespaced("wx"));
        m.insert(Mode::Harmony, DirectiveConfig::namespaced("wx"));
        m
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyOptions {
    pub mode: Mode,
    /// Run the output contract check before returning.
    #[serde(default = "default_validate_output")]
    pub validate_output: bool,
}

fn default_validate_output() -> bool {
    true
}

impl SimplifyOptions {
    pub fn new(mode: Mode) -> Self {
        SimplifyOptions {
            mode,
            validate_output: default_validate_output(),
        }
    }
}
