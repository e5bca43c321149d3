//! The compilation stages, in pipeline order.
//!
//! ```text
//! normalize → comparative → resolver → dates → compatibility → overlay
//!           → compatibility (re-check) → fallback
//! ```
//!
//! Each stage is a plain function over borrowed configuration; none of them
//! perform I/O. Orchestration lives in [`crate::compile`].

pub mod calendar;
pub mod compatibility;
pub mod comparative;
pub mod dates;
pub mod fallback;
pub mod normalize;
pub mod overlay;
pub mod resolver;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stage that emitted a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Comparative,
    Resolver,
    Dates,
    Compatibility,
    Overlay,
    Fallback,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Comparative => "comparative",
            Stage::Resolver => "resolver",
            Stage::Dates => "dates",
            Stage::Compatibility => "compatibility",
            Stage::Overlay => "overlay",
            Stage::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// An advisory note about a compilation. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)
    }
}

/// Append `name` unless already present. Returns true when appended.
pub(crate) fn push_unique(list: &mut Vec<String>, name: &str) -> bool {
    if list.iter().any(|existing| existing == name) {
        return false;
    }
    list.push(name.to_string());
    true
}

/// Move `name` to index 0, inserting it if absent.
pub(crate) fn move_to_front(list: &mut Vec<String>, name: &str) {
    if let Some(idx) = list.iter().position(|existing| existing == name) {
        let item = list.remove(idx);
        list.insert(0, item);
    } else {
        list.insert(0, name.to_string());
    }
}
