//! Key rules: how the flattener treats a (cleaned) mapping key.

use std::collections::{HashMap, HashSet};

/// Treatment of one mapping key during flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRule {
    /// Ignore the key and its whole subtree.
    Drop,
    /// Attach the value to the enclosing element's path.
    TextMerge,
    /// Append paragraph content to the enclosing element's path.
    ParagraphAppend,
    /// Build a deeper path and descend.
    Recurse,
}

/// Strip a single leading `@` (attribute) or `#` (text) marker from a key.
///
/// # Examples
/// ```
/// use ted_extractor::flatten::clean_key;
///
/// assert_eq!(clean_key("@CODE"), "CODE");
/// assert_eq!(clean_key("#text"), "text");
/// assert_eq!(clean_key("TITLE"), "TITLE");
/// ```
#[must_use]
pub fn clean_key(key: &str) -> &str {
    key.strip_prefix('@')
        .or_else(|| key.strip_prefix('#'))
        .unwrap_or(key)
}

/// Table mapping cleaned keys to rules.
///
/// Keys without an entry are recursed into.
#[derive(Debug, Clone, Default)]
pub struct KeyRules {
    rules: HashMap<String, KeyRule>,
    dropped: HashSet<String>,
}

impl KeyRules {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for a cleaned key.
    pub fn register(&mut self, key: impl Into<String>, rule: KeyRule) {
        let key = key.into();
        if rule == KeyRule::Drop {
            self.rules.remove(&key);
            self.dropped.insert(key);
        } else {
            self.dropped.remove(&key);
            self.rules.insert(key, rule);
        }
    }

    /// Mark keys as dropped.
    pub fn drop_keys(&mut self, keys: impl IntoIterator<Item = impl Into<String>>) {
        for key in keys {
            self.register(key, KeyRule::Drop);
        }
    }

    /// Rule for a cleaned key.
    #[must_use]
    pub fn rule_for(&self, key: &str) -> KeyRule {
        if self.dropped.contains(key) {
            return KeyRule::Drop;
        }
        self.rules.get(key).copied().unwrap_or(KeyRule::Recurse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_key_strips_one_marker() {
        assert_eq!(clean_key("@LG"), "LG");
        assert_eq!(clean_key("#text"), "text");
        assert_eq!(clean_key("@@X"), "@X");
        assert_eq!(clean_key(""), "");
    }

    #[test]
    fn test_default_rule_is_recurse() {
        let rules = KeyRules::new();
        assert_eq!(rules.rule_for("TITLE"), KeyRule::Recurse);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut rules = KeyRules::new();
        rules.register("P", KeyRule::ParagraphAppend);
        rules.drop_keys(["FT"]);

        assert_eq!(rules.rule_for("P"), KeyRule::ParagraphAppend);
        assert_eq!(rules.rule_for("FT"), KeyRule::Drop);
    }

    #[test]
    fn test_reregister_replaces_drop() {
        let mut rules = KeyRules::new();
        rules.drop_keys(["P"]);
        rules.register("P", KeyRule::ParagraphAppend);
        assert_eq!(rules.rule_for("P"), KeyRule::ParagraphAppend);
    }

    #[test]
    fn test_register_drop_replaces_rule() {
        let mut rules = KeyRules::new();
        rules.register("text", KeyRule::TextMerge);
        rules.register("text", KeyRule::Drop);
        assert_eq!(rules.rule_for("text"), KeyRule::Drop);
    }
}
