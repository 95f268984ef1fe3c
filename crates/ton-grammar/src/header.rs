//! C header declaring a grammar's accessor for foreign callers.

use crate::Grammar;

/// Renders the include-guarded header declaring the accessor of `grammar`.
pub fn render(grammar: &Grammar) -> String {
    let guard = format!("TREE_SITTER_{}_H_", grammar.name().to_ascii_uppercase());
    let symbol = grammar.accessor_symbol();
    format!(
        "#ifndef {guard}
#define {guard}

typedef struct TSLanguage TSLanguage;

#ifdef __cplusplus
extern \"C\" {{
#endif

const TSLanguage *{symbol}(void);

#ifdef __cplusplus
}}
#endif

#endif // {guard}
"
    )
}

/// File name conventionally used for the header of `grammar`.
pub fn file_name(grammar: &Grammar) -> String {
    format!("tree-sitter-{}.h", grammar.name())
}
