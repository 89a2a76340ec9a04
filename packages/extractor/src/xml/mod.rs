//! XML handling: conversion of notice files into [`DocumentNode`](crate::node::DocumentNode)
//! trees and helpers for navigating `roxmltree` DOMs.

mod tree;
mod utils;

pub use tree::{element_to_node, parse_document};
pub use utils::{attribute_key, direct_text, element_children, qualified_name};
