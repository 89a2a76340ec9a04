//! Key rules for TED notice documents.

use super::rules::{KeyRule, KeyRules};

/// Create the rule table for TED notice XML.
///
/// - `text` (from `#text`) merges into the enclosing element's path
/// - `P` paragraphs append to the enclosing element's path
/// - `FT` font/typography markers are dropped with their content
#[must_use]
pub fn create_notice_rules() -> KeyRules {
    let mut rules = KeyRules::new();

    rules.register("text", KeyRule::TextMerge);
    rules.register("P", KeyRule::ParagraphAppend);

    rules.drop_keys(["FT"]);

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_notice_rules() {
        let rules = create_notice_rules();

        assert_eq!(rules.rule_for("text"), KeyRule::TextMerge);
        assert_eq!(rules.rule_for("P"), KeyRule::ParagraphAppend);
        assert_eq!(rules.rule_for("FT"), KeyRule::Drop);
        assert_eq!(rules.rule_for("CODE"), KeyRule::Recurse);
    }
}
