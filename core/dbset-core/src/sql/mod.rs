// SQL 모듈 진입점: text buffer, macros, dialect translation, static discovery
pub mod dialect;
pub mod macros;
pub mod parser;
pub mod text;

pub use dialect::{Dialect, replace_token};
pub use macros::{Macro, Macros};
pub use parser::{SqlParser, discover_columns, discover_params};
pub use text::{SqlText, normalize_newlines};
