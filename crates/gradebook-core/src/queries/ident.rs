//! Identifier quoting

/// Quote an SQL identifier, doubling any embedded double quote
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"qualifier"."column"`
pub fn qualified(qualifier: &str, column: &str) -> String {
    format!("{}.{}", quote_ident(qualifier), quote_ident(column))
}
