use crate::error::{DbsetError, DbsetResult};
use sqlparser::ast::{Expr, SelectItem, SetExpr, Statement};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};

/// SQL parser — sqlparser-rs
///
/// Static discovery of result columns and bind tokens. Only used for
/// pre-declaring fields and auto-registering params; execution never
/// depends on it.
pub struct SqlParser {
    dialect: GenericDialect,
}

impl SqlParser {
    pub fn new() -> Self {
        Self {
            dialect: GenericDialect {},
        }
    }

    /// SQL 문자열을 AST로 파싱
    pub fn parse(&self, sql: &str) -> DbsetResult<Vec<Statement>> {
        Parser::parse_sql(&self.dialect, sql).map_err(|e| DbsetError::SqlParse {
            message: e.to_string(),
            sql: sql.to_string(),
        })
    }

    /// Column names of the first SELECT's projection. Aliases win over
    /// column names; wildcards and unaliased expressions are skipped.
    pub fn discover_columns(&self, sql: &str) -> DbsetResult<Vec<String>> {
        let statements = self.parse(sql)?;
        let mut columns = Vec::new();

        let Some(Statement::Query(query)) = statements.first() else {
            return Ok(columns);
        };
        let SetExpr::Select(select) = query.body.as_ref() else {
            return Ok(columns);
        };

        for item in &select.projection {
            match item {
                SelectItem::ExprWithAlias { alias, .. } => columns.push(alias.value.clone()),
                SelectItem::UnnamedExpr(Expr::Identifier(ident)) => {
                    columns.push(ident.value.clone())
                }
                SelectItem::UnnamedExpr(Expr::CompoundIdentifier(parts)) => {
                    if let Some(last) = parts.last() {
                        columns.push(last.value.clone());
                    }
                }
                _ => {}
            }
        }
        Ok(columns)
    }

    /// Names of `:identifier` bind tokens in first-seen order, without
    /// duplicates. Tokens inside literals and comments and `::` casts are
    /// not bind tokens.
    pub fn discover_params(&self, sql: &str) -> DbsetResult<Vec<String>> {
        let tokens = Tokenizer::new(&self.dialect, sql)
            .tokenize()
            .map_err(|e| DbsetError::SqlParse {
                message: e.to_string(),
                sql: sql.to_string(),
            })?;

        let mut names: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        };

        let mut iter = tokens.iter().peekable();
        while let Some(token) = iter.next() {
            match token {
                Token::Colon => {
                    if let Some(Token::Word(word)) = iter.peek() {
                        push(&word.value);
                        iter.next();
                    }
                }
                Token::Placeholder(p) => {
                    if let Some(name) = p.strip_prefix(':') {
                        push(name);
                    }
                }
                _ => {}
            }
        }
        Ok(names)
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Result columns of a SELECT; see [`SqlParser::discover_columns`].
pub fn discover_columns(sql: &str) -> DbsetResult<Vec<String>> {
    SqlParser::new().discover_columns(sql)
}

/// Bind tokens of a statement; see [`SqlParser::discover_params`].
pub fn discover_params(sql: &str) -> DbsetResult<Vec<String>> {
    SqlParser::new().discover_params(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_select() {
        let parser = SqlParser::new();
        let statements = parser.parse("SELECT * FROM users").unwrap();
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Statement::Query(_)));
    }

    #[test]
    fn test_parse_error_carries_sql() {
        let parser = SqlParser::new();
        let err = parser.parse("SELECT * FORM users").unwrap_err();
        match err {
            DbsetError::SqlParse { sql, .. } => assert_eq!(sql, "SELECT * FORM users"),
            other => panic!("expected SqlParse, got {other:?}"),
        }
    }

    #[test]
    fn test_discover_columns() {
        let cols = discover_columns(
            "select id, name as customer, t.code, count(*) from t",
        )
        .unwrap();
        assert_eq!(cols, vec!["id", "customer", "code"]);
    }

    #[test]
    fn test_discover_columns_wildcard_only() {
        let cols = discover_columns("select * from t").unwrap();
        assert!(cols.is_empty());
    }

    #[test]
    fn test_discover_columns_non_select() {
        let cols = discover_columns("delete from t where id = 1").unwrap();
        assert!(cols.is_empty());
    }

    #[test]
    fn test_discover_params_first_seen_order() {
        let params = discover_params(
            "select * from t where b = :b and a = :a and c = :b",
        )
        .unwrap();
        assert_eq!(params, vec!["b", "a"]);
    }

    #[test]
    fn test_discover_params_skips_literals_and_casts() {
        let params = discover_params(
            "select x::int from t where s = ':fake' and id = :id -- :comment",
        )
        .unwrap();
        assert_eq!(params, vec!["id"]);
    }
}
