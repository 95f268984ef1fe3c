//! The tree-sitter rule algebra and the constructors used to write grammars.
//!
//! Every [`Rule`] serializes to the object shape the tree-sitter generator
//! reads from `grammar.json`, e.g. `{"type": "SEQ", "members": [...]}`.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, derive_more::From)]
#[serde(untagged)]
pub enum Precedence {
    Integer(i32),
    Name(String),
}

impl From<&str> for Precedence {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    Blank,
    String {
        value: String,
    },
    Pattern {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
    },
    Symbol {
        name: String,
    },
    Seq {
        members: Vec<Rule>,
    },
    Choice {
        members: Vec<Rule>,
    },
    Repeat {
        content: Box<Rule>,
    },
    Repeat1 {
        content: Box<Rule>,
    },
    Field {
        name: String,
        content: Box<Rule>,
    },
    Alias {
        content: Box<Rule>,
        named: bool,
        value: String,
    },
    Token {
        content: Box<Rule>,
    },
    ImmediateToken {
        content: Box<Rule>,
    },
    Prec {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecLeft {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecRight {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecDynamic {
        value: i32,
        content: Box<Rule>,
    },
}

impl Rule {
    /// Visits this rule and all of its descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Rule)) {
        visit(self);
        match self {
            Self::Blank | Self::String { .. } | Self::Pattern { .. } | Self::Symbol { .. } => {}
            Self::Seq { members } | Self::Choice { members } => {
                for member in members {
                    member.walk(visit);
                }
            }
            Self::Repeat { content }
            | Self::Repeat1 { content }
            | Self::Field { content, .. }
            | Self::Alias { content, .. }
            | Self::Token { content }
            | Self::ImmediateToken { content }
            | Self::Prec { content, .. }
            | Self::PrecLeft { content, .. }
            | Self::PrecRight { content, .. }
            | Self::PrecDynamic { content, .. } => content.walk(visit),
        }
    }

    /// Names of all rules referenced by `SYMBOL` nodes, in visiting order.
    pub fn referenced_symbols(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.walk(&mut |rule| {
            if let Self::Symbol { name } = rule {
                names.push(name.as_str());
            }
        });
        names
    }

    /// Names of all fields declared inside this rule.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.walk(&mut |rule| {
            if let Self::Field { name, .. } = rule {
                names.push(name.as_str());
            }
        });
        names
    }

    pub(crate) fn has_empty_composite(&self) -> bool {
        let mut found = false;
        self.walk(&mut |rule| {
            if let Self::Seq { members } | Self::Choice { members } = rule {
                found |= members.is_empty();
            }
        });
        found
    }
}

pub fn blank() -> Rule {
    Rule::Blank
}

pub fn string(value: impl Into<String>) -> Rule {
    Rule::String {
        value: value.into(),
    }
}

/// A regular expression token. The source uses JavaScript regex syntax.
pub fn pattern(value: impl Into<String>) -> Rule {
    Rule::Pattern {
        value: value.into(),
        flags: None,
    }
}

pub fn sym(name: impl Into<String>) -> Rule {
    Rule::Symbol { name: name.into() }
}

pub fn seq(members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Seq {
        members: members.into_iter().collect(),
    }
}

pub fn choice(members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Choice {
        members: members.into_iter().collect(),
    }
}

pub fn optional(rule: Rule) -> Rule {
    choice([rule, blank()])
}

pub fn repeat(rule: Rule) -> Rule {
    Rule::Repeat {
        content: Box::new(rule),
    }
}

pub fn repeat1(rule: Rule) -> Rule {
    Rule::Repeat1 {
        content: Box::new(rule),
    }
}

pub fn field(name: impl Into<String>, rule: Rule) -> Rule {
    Rule::Field {
        name: name.into(),
        content: Box::new(rule),
    }
}

/// Renames `rule` in the syntax tree to the named node `value`.
pub fn alias(rule: Rule, value: impl Into<String>) -> Rule {
    Rule::Alias {
        content: Box::new(rule),
        named: true,
        value: value.into(),
    }
}

pub fn token(rule: Rule) -> Rule {
    Rule::Token {
        content: Box::new(rule),
    }
}

pub fn immediate_token(rule: Rule) -> Rule {
    Rule::ImmediateToken {
        content: Box::new(rule),
    }
}

pub fn prec(value: impl Into<Precedence>, rule: Rule) -> Rule {
    Rule::Prec {
        value: value.into(),
        content: Box::new(rule),
    }
}

pub fn prec_left(value: impl Into<Precedence>, rule: Rule) -> Rule {
    Rule::PrecLeft {
        value: value.into(),
        content: Box::new(rule),
    }
}

pub fn prec_right(value: impl Into<Precedence>, rule: Rule) -> Rule {
    Rule::PrecRight {
        value: value.into(),
        content: Box::new(rule),
    }
}

pub fn prec_dynamic(value: i32, rule: Rule) -> Rule {
    Rule::PrecDynamic {
        value,
        content: Box::new(rule),
    }
}

/// `rule` repeated at least once, separated by commas.
pub fn comma_sep1(rule: Rule) -> Rule {
    seq([rule.clone(), repeat(seq([string(","), rule]))])
}

/// `rule` repeated any number of times, separated by commas.
pub fn comma_sep(rule: Rule) -> Rule {
    optional(comma_sep1(rule))
}

/// `rule` repeated at least twice, separated by commas.
pub fn comma_sep2(rule: Rule) -> Rule {
    seq([rule.clone(), repeat1(seq([string(","), rule]))])
}
