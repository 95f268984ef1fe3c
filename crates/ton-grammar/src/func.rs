//! Grammar for FunC, the TON smart-contract language.

use crate::{
    Grammar,
    rules::{
        Rule, alias, choice, comma_sep, comma_sep1, comma_sep2, field, optional, pattern, prec,
        prec_dynamic, prec_left, prec_right, repeat, repeat1, seq, string, sym, token,
    },
};

const ASSIGNMENT_OPERATORS: [&str; 17] = [
    "=", "+=", "-=", "*=", "/=", "~/=", "^/=", "%=", "~%=", "^%=", "<<=", ">>=", "~>>=", "^>>=",
    "&=", "|=", "^=",
];

fn strings<const N: usize>(values: [&str; N]) -> Rule {
    choice(values.map(string))
}

fn syms<const N: usize>(names: [&str; N]) -> Rule {
    choice(names.map(sym))
}

pub fn grammar() -> Grammar {
    let grammar = Grammar::new("func")
        .conflict(["parameter_list_relaxed", "type_identifier"])
        .conflict(["parameter_list_relaxed", "hole_type"])
        .conflict(["parameter_list_relaxed", "parameter_list"])
        .conflict(["tensor_expression", "tensor_type"])
        .conflict(["typed_tuple", "tuple_type"])
        .extra(pattern(r"\s"))
        .extra(sym("comment"))
        .word("identifier");
    let grammar = top_level(grammar);
    let grammar = functions(grammar);
    let grammar = statements(grammar);
    let grammar = expressions(grammar);
    let grammar = types(grammar);
    common(grammar)
}

fn top_level(grammar: Grammar) -> Grammar {
    grammar
        .rule("source_file", repeat(sym("_top_level_item")))
        .rule(
            "_top_level_item",
            syms([
                "function_declaration",
                "global_var_declarations",
                "import_directive",
                "pragma_directive",
                "constant_declarations",
                "empty_statement",
            ]),
        )
        .rule(
            "import_directive",
            prec_right(
                0,
                seq([
                    string("#include"),
                    repeat1(string(" ")),
                    field("path", sym("string_literal")),
                    optional(string(";")),
                ]),
            ),
        )
        .rule(
            "version_identifier",
            pattern(r"(>=|<=|=|>|<|\^)?([0-9]+)(.[0-9]+)?(.[0-9]+)?"),
        )
        .rule(
            "pragma_directive",
            seq([
                string("#pragma"),
                repeat1(string(" ")),
                choice([
                    seq([
                        field("key", strings(["version", "not-version"])),
                        repeat1(string(" ")),
                        field("value", sym("version_identifier")),
                    ]),
                    field(
                        "key",
                        strings(["allow-post-modification", "compute-asm-ltr"]),
                    ),
                ]),
            ]),
        )
        .rule(
            "global_var_declarations",
            seq([
                string("global"),
                field("decls", comma_sep1(sym("global_var_declaration"))),
                string(";"),
            ]),
        )
        .rule(
            "global_var_declaration",
            seq([
                field("type", optional(sym("_type_hint"))),
                field("name", sym("identifier")),
            ]),
        )
        .rule(
            "constant_declarations",
            seq([
                string("const"),
                field("decls", comma_sep1(sym("constant_declaration"))),
                string(";"),
            ]),
        )
        .rule(
            "constant_declaration",
            seq([
                field("type", optional(sym("_type_hint"))),
                field("name", sym("identifier")),
                string("="),
                field("value", sym("constant_declaration_value")),
            ]),
        )
        .rule("constant_declaration_value", sym("_expression"))
}

fn functions(grammar: Grammar) -> Grammar {
    grammar
        .rule(
            "function_declaration",
            seq([
                field("type_parameters", optional(sym("type_parameters"))),
                field("return_type", sym("_type_hint")),
                field("name", sym("identifier")),
                choice([
                    seq([
                        field("parameters", sym("parameter_list")),
                        field("specifiers", optional(sym("specifiers_list"))),
                        choice([
                            field("body", sym("block_statement")),
                            field("asm_body", sym("asm_function_body")),
                        ]),
                    ]),
                    seq([
                        field("parameters", sym("parameter_list_relaxed")),
                        field("specifiers", optional(sym("specifiers_list"))),
                        string(";"),
                    ]),
                ]),
            ]),
        )
        .rule("impure", string("impure"))
        .rule("inline", strings(["inline", "inline_ref"]))
        .rule(
            "method_id",
            seq([
                string("method_id"),
                optional(seq([
                    string("("),
                    field("value", syms(["number_literal", "string_literal"])),
                    string(")"),
                ])),
            ]),
        )
        .rule(
            "specifiers_list",
            choice([
                seq([
                    sym("impure"),
                    optional(sym("inline")),
                    optional(sym("method_id")),
                ]),
                seq([sym("inline"), optional(sym("method_id"))]),
                sym("method_id"),
            ]),
        )
        .rule(
            "type_parameters",
            seq([
                string("forall"),
                comma_sep(sym("type_parameter")),
                string("->"),
            ]),
        )
        .rule(
            "type_parameter",
            seq([
                optional(string("type")),
                field("name", sym("type_identifier")),
            ]),
        )
        .rule(
            "parameter_list",
            seq([
                string("("),
                comma_sep(sym("parameter_declaration")),
                string(")"),
            ]),
        )
        .rule(
            "parameter_list_relaxed",
            seq([
                string("("),
                comma_sep(choice([
                    sym("parameter_declaration"),
                    field("name", syms(["identifier", "underscore"])),
                ])),
                string(")"),
            ]),
        )
        .rule(
            "parameter_declaration",
            seq([
                field("type", sym("_type_hint")),
                optional(field("name", syms(["identifier", "underscore"]))),
            ]),
        )
        .rule(
            "asm_function_body",
            seq([
                seq([
                    string("asm"),
                    optional(seq([
                        string("("),
                        repeat(sym("identifier")),
                        optional(seq([string("->"), repeat(sym("number_literal"))])),
                        string(")"),
                    ])),
                ]),
                repeat1(sym("string_literal")),
                string(";"),
            ]),
        )
}

fn statements(grammar: Grammar) -> Grammar {
    grammar
        .rule(
            "_statement",
            syms([
                "return_statement",
                "block_statement",
                "expression_statement",
                "empty_statement",
                "repeat_statement",
                "if_statement",
                "do_while_statement",
                "while_statement",
                "try_catch_statement",
            ]),
        )
        .rule(
            "return_statement",
            seq([string("return"), sym("_expression"), string(";")]),
        )
        .rule(
            "block_statement",
            seq([string("{"), repeat(sym("_statement")), string("}")]),
        )
        .rule(
            "expression_statement",
            prec_right(0, seq([sym("_expression"), optional(string(";"))])),
        )
        .rule("empty_statement", string(";"))
        .rule(
            "repeat_statement",
            seq([
                string("repeat"),
                field("count", sym("_expression")),
                field("body", sym("block_statement")),
            ]),
        )
        .rule(
            "if_statement",
            seq([strings(["if", "ifnot"]), sym("_if_statement_contents")]),
        )
        .rule(
            "_if_statement_contents",
            seq([
                field("condition", sym("_expression")),
                field("consequent", sym("block_statement")),
                field(
                    "alternative",
                    optional(choice([
                        seq([string("else"), sym("block_statement")]),
                        seq([
                            strings(["elseif", "elseifnot"]),
                            sym("_if_statement_contents"),
                        ]),
                    ])),
                ),
            ]),
        )
        .rule(
            "do_while_statement",
            seq([
                string("do"),
                field("body", sym("block_statement")),
                string("until"),
                field("postcondition", sym("_expression")),
            ]),
        )
        .rule(
            "while_statement",
            seq([
                string("while"),
                field("precondition", sym("_expression")),
                field("body", sym("block_statement")),
            ]),
        )
        .rule(
            "try_catch_statement",
            seq([
                string("try"),
                field("body", sym("block_statement")),
                sym("catch_clause"),
            ]),
        )
        .rule(
            "catch_clause",
            seq([
                string("catch"),
                field("catch_expr", optional(sym("_expression"))),
                field("catch_body", sym("block_statement")),
            ]),
        )
}

/// Binary operator levels follow the FunC compiler, from `_expr10`
/// (assignment) down to `_expr100` (primary expressions).
fn expressions(grammar: Grammar) -> Grammar {
    grammar
        .rule("_expression", sym("_expr10"))
        .rule(
            "_expr10",
            prec(
                10,
                seq([
                    sym("_expr13"),
                    optional(seq([strings(ASSIGNMENT_OPERATORS), sym("_expr10")])),
                ]),
            ),
        )
        .rule(
            "_expr13",
            prec(
                13,
                seq([
                    sym("_expr15"),
                    optional(seq([
                        string("?"),
                        sym("_expression"),
                        string(":"),
                        sym("_expr13"),
                    ])),
                ]),
            ),
        )
        .rule(
            "_expr15",
            prec(
                15,
                seq([
                    sym("_expr17"),
                    optional(seq([
                        strings(["==", "<", ">", "<=", ">=", "!=", "<=>"]),
                        sym("_expr17"),
                    ])),
                ]),
            ),
        )
        .rule(
            "_expr17",
            prec_left(
                17,
                seq([
                    sym("_expr20"),
                    repeat(seq([strings(["<<", ">>", "~>>", "^>>"]), sym("_expr20")])),
                ]),
            ),
        )
        .rule(
            "_expr20",
            prec_left(
                20,
                seq([
                    optional(string("-")),
                    sym("_expr30"),
                    repeat(seq([strings(["-", "+", "|", "^"]), sym("_expr30")])),
                ]),
            ),
        )
        .rule(
            "_expr30",
            prec_left(
                30,
                seq([
                    sym("_expr75"),
                    repeat(seq([
                        strings(["*", "/", "%", "~/", "^/", "~%", "^%", "/%", "&"]),
                        sym("_expr75"),
                    ])),
                ]),
            ),
        )
        .rule(
            "_expr75",
            prec(75, seq([optional(string("~")), sym("_expr80")])),
        )
        .rule(
            "_expr80",
            prec_left(80, seq([sym("_expr90"), repeat(sym("method_call"))])),
        )
        .rule(
            "method_call",
            prec_left(
                80,
                seq([
                    strings([".", "~"]),
                    field("method_name", sym("identifier")),
                    field("arguments", sym("_expr100")),
                ]),
            ),
        )
        .rule(
            "_expr90",
            prec_left(
                90,
                syms(["_expr100", "local_vars_declaration", "function_application"]),
            ),
        )
        .rule(
            "function_application",
            prec_left(
                90,
                seq([
                    field("callee", sym("_nontype_expr100")),
                    field(
                        "arguments",
                        repeat1(syms([
                            "identifier",
                            "parenthesized_expression",
                            "tensor_expression",
                        ])),
                    ),
                ]),
            ),
        )
        .rule(
            "local_vars_declaration",
            prec_dynamic(90, field("lhs", sym("_var_declaration_lhs"))),
        )
        .rule(
            "tuple_vars_declaration",
            prec(
                100,
                seq([
                    string("["),
                    field("vars", comma_sep1(sym("_var_declaration_lhs"))),
                    optional(string(",")),
                    string("]"),
                ]),
            ),
        )
        .rule(
            "tensor_vars_declaration",
            prec(
                100,
                seq([
                    string("("),
                    field("vars", comma_sep1(sym("_var_declaration_lhs"))),
                    optional(string(",")),
                    string(")"),
                ]),
            ),
        )
        .rule(
            "var_declaration",
            seq([
                field("type", sym("_type_hint")),
                field("name", sym("identifier")),
            ]),
        )
        .rule(
            "_var_declaration_lhs",
            syms([
                "tuple_vars_declaration",
                "tensor_vars_declaration",
                "var_declaration",
            ]),
        )
        .rule(
            "type_expression",
            prec(
                101,
                syms([
                    "primitive_type",
                    "type_identifier",
                    "var_type",
                    "parenthesized_type_expression",
                    "tensor_type_expression",
                    "tuple_type_expression",
                ]),
            ),
        )
        .rule(
            "parenthesized_type_expression",
            prec(
                101,
                seq([string("("), sym("type_expression"), string(")")]),
            ),
        )
        .rule(
            "tensor_type_expression",
            prec(
                101,
                seq([
                    string("("),
                    comma_sep2(sym("type_expression")),
                    string(")"),
                ]),
            ),
        )
        .rule(
            "tuple_type_expression",
            prec(
                101,
                seq([
                    string("["),
                    comma_sep1(sym("type_expression")),
                    string("]"),
                ]),
            ),
        )
        .rule(
            "_nontype_expr100",
            prec(
                100,
                syms([
                    "parenthesized_expression",
                    "tensor_expression",
                    "local_vars_declaration",
                    "typed_tuple",
                    "identifier",
                    "number_literal",
                    "string_literal",
                    "slice_string_literal",
                    "underscore",
                ]),
            ),
        )
        .rule("_expr100", prec(100, syms(["_nontype_expr100"])))
        .rule(
            "parenthesized_expression",
            seq([string("("), sym("_expression"), string(")")]),
        )
        .rule(
            "tensor_expression",
            choice([
                seq([string("("), string(")")]),
                seq([
                    string("("),
                    field("expressions", comma_sep2(sym("_expression"))),
                    string(")"),
                ]),
            ]),
        )
        .rule(
            "typed_tuple",
            seq([
                string("["),
                field("expressions", comma_sep(sym("_expression"))),
                string("]"),
            ]),
        )
}

fn types(grammar: Grammar) -> Grammar {
    grammar
        .rule("_type_hint", syms(["_atomic_type", "function_type"]))
        .rule(
            "function_type",
            prec_right(
                100,
                seq([sym("_atomic_type"), string("->"), sym("_type_hint")]),
            ),
        )
        .rule(
            "_atomic_type",
            syms([
                "primitive_type",
                "var_type",
                "hole_type",
                "type_identifier",
                "tensor_type",
                "tuple_type",
                "_parenthesized_type",
            ]),
        )
        .rule(
            "_parenthesized_type",
            seq([string("("), sym("_type_hint"), string(")")]),
        )
        .rule(
            "primitive_type",
            strings(["int", "cell", "slice", "builder", "cont", "tuple"]),
        )
        .rule(
            "tensor_type",
            choice([
                seq([string("("), string(")")]),
                seq([
                    string("("),
                    field("types", comma_sep2(sym("_type_hint"))),
                    string(")"),
                ]),
            ]),
        )
        .rule(
            "tuple_type",
            seq([
                string("["),
                field("types", comma_sep(sym("_type_hint"))),
                string("]"),
            ]),
        )
        .rule("var_type", string("var"))
        .rule("hole_type", alias(sym("underscore"), "hole_type"))
        .rule("type_identifier", alias(sym("identifier"), "type_identifier"))
}

fn common(grammar: Grammar) -> Grammar {
    grammar
        .rule(
            "number_literal",
            choice([
                token(seq([
                    optional(string("-")),
                    choice([
                        seq([string("0x"), pattern("[0-9a-fA-F]+")]),
                        pattern("[0-9]+"),
                    ]),
                ])),
                sym("number_string_literal"),
            ]),
        )
        .rule("string_literal", pattern(r#""[^"]*""#))
        .rule("number_string_literal", pattern(r#""[^"]*"[Hhcu]"#))
        .rule("slice_string_literal", pattern(r#""[^"]*"[sa]"#))
        .rule(
            "identifier",
            pattern(r"`[^`]+`|[a-zA-Z0-9_\$%][^\s\+\-\*\/%,\.;\(\)\{\}\[\]=\|\^\~]*"),
        )
        .rule("underscore", string("_"))
        // Nested `{- -}` comments are not supported by the generator.
        .rule(
            "comment",
            token(choice([
                seq([string(";;"), pattern(r"[^\r\n]*")]),
                seq([string("//"), pattern(r"[^\r\n]*")]),
                seq([
                    string("{-"),
                    pattern(r"[^-]*\-+([^-}][^-]*\-+)*"),
                    string("}"),
                ]),
                seq([
                    string("/*"),
                    pattern(r"[^*]*\*+([^/*][^*]*\*+)*"),
                    string("/"),
                ]),
            ])),
        )
}
