//! Grammar for the Fift assembler listings produced by the FunC compiler.

use crate::{
    Grammar,
    rules::{Rule, choice, field, optional, pattern, repeat, seq, string, sym, token},
};

/// Body of a `NAME:<{ ... }>` style block.
fn block(opening: &str) -> Rule {
    seq([string(opening), repeat(sym("instruction")), string("}>")])
}

fn named_block(opening: &str) -> Rule {
    seq([
        field("name", sym("identifier")),
        string(opening),
        repeat(sym("instruction")),
        string("}>"),
    ])
}

pub fn grammar() -> Grammar {
    Grammar::new("fift")
        .extra(pattern(r"\s"))
        .extra(sym("comment"))
        .rule(
            "source_file",
            seq([optional(sym("include_directive")), sym("program")]),
        )
        .rule(
            "include_directive",
            seq([string("\""), pattern(r#"[^"]+"#), string("\""), string("include")]),
        )
        .rule("comment", token(seq([string("//"), pattern(r"[^\n]*")])))
        .rule(
            "program",
            seq([
                string("PROGRAM{"),
                repeat(sym("declaration")),
                repeat(sym("definition")),
                string("END>c"),
            ]),
        )
        .rule(
            "declaration",
            choice([
                seq([string("DECLPROC"), field("name", sym("identifier"))]),
                seq([
                    pattern(r"-?\d+"),
                    string("DECLMETHOD"),
                    field("name", sym("identifier")),
                ]),
                sym("global_var"),
            ]),
        )
        .rule(
            "global_var",
            seq([string("DECLGLOBVAR"), field("name", sym("identifier"))]),
        )
        .rule(
            "definition",
            choice([
                sym("proc_definition"),
                sym("proc_inline_definition"),
                sym("proc_ref_definition"),
                sym("method_definition"),
            ]),
        )
        .rule("proc_definition", named_block("PROC:<{"))
        .rule("proc_inline_definition", named_block("PROCINLINE:<{"))
        .rule("proc_ref_definition", named_block("PROCREF:<{"))
        .rule("method_definition", named_block("METHOD:<{"))
        .rule(
            "instruction",
            choice(
                [
                    "identifier",
                    "negative_identifier",
                    "number",
                    "string",
                    "if_statement",
                    "ifjmp_statement",
                    "while_statement",
                    "repeat_statement",
                    "until_statement",
                    "proc_call",
                    "slice_literal",
                    "hex_literal",
                    "stack_ref",
                    "stack_op",
                    "instruction_block",
                ]
                .map(sym),
            ),
        )
        .rule(
            "if_statement",
            seq([
                string("IF:<{"),
                repeat(sym("instruction")),
                string("}>"),
                optional(block("ELSE<{")),
            ]),
        )
        .rule("ifjmp_statement", block("IFJMP:<{"))
        .rule(
            "while_statement",
            seq([
                string("WHILE:<{"),
                repeat(sym("instruction")),
                string("}>DO<{"),
                repeat(sym("instruction")),
                string("}>"),
            ]),
        )
        .rule("repeat_statement", block("REPEAT:<{"))
        .rule("until_statement", block("UNTIL:<{"))
        .rule(
            "proc_call",
            seq([
                sym("identifier"),
                choice([string("CALLDICT"), string("INLINECALLDICT")]),
            ]),
        )
        .rule("instruction_block", block("<{"))
        .rule(
            "slice_literal",
            choice([
                seq([string("b{"), pattern("[01]+"), string("}")]),
                seq([string("x{"), pattern("[0-9a-fA-F_]+"), string("}")]),
                seq([string("B{"), pattern("[0-9a-fA-F_]+"), string("}")]),
            ]),
        )
        .rule("hex_literal", pattern("0[xX][0-9a-fA-F]+"))
        .rule(
            "identifier",
            pattern(r"[~a-zA-Z$_%?][a-zA-Z0-9$_?~.()]*"),
        )
        .rule(
            "negative_identifier",
            seq([string("-"), sym("identifier")]),
        )
        .rule("number", pattern(r"-?\d+"))
        .rule(
            "stack_ref",
            seq([string("s"), string("("), pattern(r"-?\d+"), string(")")]),
        )
        .rule(
            "stack_op",
            seq([
                sym("stack_index"),
                sym("stack_index"),
                optional(sym("stack_ref")),
                sym("identifier"),
            ]),
        )
        .rule("stack_index", seq([string("s"), pattern("[0-9]+")]))
        .rule(
            "string",
            seq([string("\""), pattern(r#"[^"]*"#), string("\"")]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fift_grammar_is_valid() {
        let grammar = grammar();
        grammar.validate().unwrap();
        assert_eq!(grammar.start_rule(), Some("source_file"));
        assert_eq!(grammar.word_rule(), None);
        assert_eq!(grammar.field_names(), ["name"]);
        assert_eq!(grammar.rules().len(), 28);
    }

    #[test]
    fn definitions_share_the_block_shape() {
        let grammar = grammar();
        for name in [
            "proc_definition",
            "proc_inline_definition",
            "proc_ref_definition",
            "method_definition",
        ] {
            let rule = &grammar.rules()[name];
            assert_eq!(rule.referenced_symbols(), ["identifier", "instruction"]);
            assert_eq!(rule.field_names(), ["name"]);
        }
    }
}
