//! Key-path flattening of document trees.
//!
//! A [`Flattener`] walks a [`DocumentNode`](crate::node::DocumentNode) and
//! writes every leaf into a [`FlatRecord`](crate::node::FlatRecord) under a
//! path built from the enclosing keys. Keys with special meaning in the
//! notice format are looked up in a [`KeyRules`] table, so new quirks can be
//! registered without touching the walk itself.

mod config;
mod engine;
mod rules;

pub use config::create_notice_rules;
pub use engine::Flattener;
pub use rules::{clean_key, KeyRule, KeyRules};
