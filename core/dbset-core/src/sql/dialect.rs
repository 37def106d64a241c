//! SQL dialects and placeholder translation
//!
//! Drivers bind `:name` placeholders natively, except the positional dialect
//! (PostgreSQL) which needs `$N`. Translation rewrites every bounded
//! occurrence of a registered param token to the param's 1-based list
//! position:
//!
//! ```text
//! params [a, b]:  x = :a and y = :a and z = :b
//!             →   x = $1 and y = $1 and z = $2
//! ```

use serde::{Deserialize, Serialize};

/// Characters allowed right after a placeholder token.
const TOKEN_DELIMITERS: &[u8] = b" ,()=|[]";

/// Dialect of the bound connection or transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Generic,
    Postgres,
    Oracle,
    MySql,
    SqlServer,
    Sqlite,
}

impl Dialect {
    /// Whether named placeholders must be rewritten to `$N`.
    pub fn uses_positional_placeholders(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Rewrites `:name` tokens for this dialect. `names` is the registered
    /// param list; numbering follows list position, not text order.
    pub fn translate<'n, I>(self, sql: &str, names: I) -> String
    where
        I: IntoIterator<Item = &'n str>,
    {
        if !self.uses_positional_placeholders() {
            return sql.to_string();
        }

        let mut out = sql.to_string();
        for (i, name) in names.into_iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            out = replace_token(&out, &format!(":{name}"), &format!("${}", i + 1));
        }
        out
    }
}

/// Replaces every occurrence of `token` that ends at a delimiter or at the end
/// of `sql`. An occurrence followed by any other character is a prefix of a
/// longer identifier and is kept.
pub fn replace_token(sql: &str, token: &str, replacement: &str) -> String {
    if token.is_empty() {
        return sql.to_string();
    }

    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;
    while let Some(pos) = rest.find(token) {
        let after = &rest[pos + token.len()..];
        let bounded = after
            .as_bytes()
            .first()
            .is_none_or(|b| TOKEN_DELIMITERS.contains(b));

        out.push_str(&rest[..pos]);
        out.push_str(if bounded { replacement } else { token });
        rest = after;
    }
    out.push_str(rest);
    out
}
