use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::rules::Rule;

/// A tree-sitter grammar described in Rust.
///
/// Rules keep their definition order. The first rule is the start rule of
/// the generated parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grammar {
    name: String,
    rules: IndexMap<String, Rule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extras: Vec<Rule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    conflicts: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    word: Option<String>,
    #[serde(skip)]
    duplicate_rules: Vec<String>,
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: IndexMap::new(),
            extras: Vec::new(),
            conflicts: Vec::new(),
            word: None,
            duplicate_rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        let name = name.into();
        if self.rules.contains_key(&name) {
            self.duplicate_rules.push(name);
        } else {
            self.rules.insert(name, rule);
        }
        self
    }

    #[must_use]
    pub fn extra(mut self, rule: Rule) -> Self {
        self.extras.push(rule);
        self
    }

    #[must_use]
    pub fn conflict<S: Into<String>>(mut self, rules: impl IntoIterator<Item = S>) -> Self {
        self.conflicts
            .push(rules.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn word(mut self, rule: impl Into<String>) -> Self {
        self.word = Some(rule.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_rule(&self) -> Option<&str> {
        self.rules.keys().next().map(String::as_str)
    }

    pub const fn rules(&self) -> &IndexMap<String, Rule> {
        &self.rules
    }

    pub fn word_rule(&self) -> Option<&str> {
        self.word.as_deref()
    }

    /// The C symbol of the accessor the generated parser exports.
    pub fn accessor_symbol(&self) -> String {
        format!("tree_sitter_{}", self.name)
    }

    /// All distinct field names used by the rules, in first-use order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rules
            .values()
            .flat_map(Rule::field_names)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn validate(&self) -> Result<(), GrammarError> {
        if !is_c_identifier(&self.name) {
            return Err(GrammarError::InvalidName(self.name.clone()));
        }
        if self.rules.is_empty() {
            return Err(GrammarError::Empty(self.name.clone()));
        }
        if let Some(name) = self.duplicate_rules.first() {
            return Err(GrammarError::DuplicateRule(name.clone()));
        }
        let referencing = self
            .rules
            .iter()
            .map(|(name, rule)| (name.as_str(), rule))
            .chain(self.extras.iter().map(|rule| ("extras", rule)));
        for (rule_name, rule) in referencing {
            if let Some(symbol) = rule
                .referenced_symbols()
                .into_iter()
                .find(|symbol| !self.rules.contains_key(*symbol))
            {
                return Err(GrammarError::UndefinedSymbol {
                    rule: rule_name.to_owned(),
                    symbol: symbol.to_owned(),
                });
            }
            if rule.has_empty_composite() {
                return Err(GrammarError::EmptyComposite(rule_name.to_owned()));
            }
        }
        if let Some(member) = self
            .conflicts
            .iter()
            .flatten()
            .find(|member| !self.rules.contains_key(*member))
        {
            return Err(GrammarError::UnknownConflictMember(member.clone()));
        }
        match &self.word {
            Some(word) if !self.rules.contains_key(word) => {
                Err(GrammarError::UnknownWordRule(word.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Serializes the grammar to the `grammar.json` format read by the
    /// tree-sitter generator. The grammar is validated first.
    pub fn to_json(&self) -> Result<String, GrammarError> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("The grammar name {0:?} is not a lowercase C identifier")]
    InvalidName(String),
    #[error("The grammar {0} has no rules")]
    Empty(String),
    #[error("The rule {0} is defined more than once")]
    DuplicateRule(String),
    #[error("The rule {rule} references the undefined rule {symbol}")]
    UndefinedSymbol { rule: String, symbol: String },
    #[error("The rule {0} contains a sequence or choice without members")]
    EmptyComposite(String),
    #[error("The conflict member {0} is not a rule")]
    UnknownConflictMember(String),
    #[error("The word rule {0} is not defined")]
    UnknownWordRule(String),
    #[error("Fail to serialize the grammar")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::rules::{field, optional, pattern, seq, string, sym};

    fn tiny() -> Grammar {
        Grammar::new("tiny")
            .extra(pattern(r"\s"))
            .rule(
                "source_file",
                seq([sym("identifier"), optional(field("value", sym("number")))]),
            )
            .rule("identifier", pattern("[a-z]+"))
            .rule("number", pattern(r"\d+"))
    }

    #[test]
    fn serializes_rules_in_definition_order() {
        let json: Value = serde_json::from_str(&tiny().word("identifier").to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "tiny");
        assert_eq!(json["word"], "identifier");
        let rule_names: Vec<_> = json["rules"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(rule_names, ["source_file", "identifier", "number"]);
        assert!(json.get("conflicts").is_none());
        assert_eq!(json["extras"][0]["type"], "PATTERN");
    }

    #[test]
    fn start_rule_and_fields() {
        let grammar = tiny();
        assert_eq!(grammar.start_rule(), Some("source_file"));
        assert_eq!(grammar.field_names(), ["value"]);
        assert_eq!(grammar.accessor_symbol(), "tree_sitter_tiny");
    }

    #[test]
    fn rejects_undefined_symbols() {
        let grammar = tiny().rule("call", seq([sym("identifier"), sym("arguments")]));
        assert!(matches!(
            grammar.validate(),
            Err(GrammarError::UndefinedSymbol { rule, symbol }) if rule == "call" && symbol == "arguments"
        ));
        let grammar = tiny().extra(sym("comment"));
        assert!(matches!(
            grammar.validate(),
            Err(GrammarError::UndefinedSymbol { rule, .. }) if rule == "extras"
        ));
    }

    #[test]
    fn rejects_duplicates_and_bad_names() {
        let grammar = tiny().rule("number", string("0"));
        assert!(matches!(grammar.validate(), Err(GrammarError::DuplicateRule(name)) if name == "number"));
        assert!(matches!(
            Grammar::new("FunC").rule("a", string("a")).validate(),
            Err(GrammarError::InvalidName(_))
        ));
        assert!(matches!(Grammar::new("empty").validate(), Err(GrammarError::Empty(_))));
        assert!(matches!(
            Grammar::new("9lives").rule("a", string("a")).validate(),
            Err(GrammarError::InvalidName(_))
        ));
    }

    #[test]
    fn rejects_unknown_conflicts_and_word() {
        let grammar = tiny().conflict(["identifier", "type_identifier"]);
        assert!(matches!(
            grammar.validate(),
            Err(GrammarError::UnknownConflictMember(member)) if member == "type_identifier"
        ));
        assert!(matches!(
            tiny().word("keyword").to_json(),
            Err(GrammarError::UnknownWordRule(_))
        ));
    }
}
