//! # DBSet — cursor-style data access
//!
//! DBSet는 SQL 조각과 매크로로 문장을 조립하고, 방향성 파라미터를 바인딩하여
//! 연결 또는 트랜잭션에서 실행한 뒤, 결과를 메모리 상의 탐색 가능한 행 집합으로
//! 적재하는 DataSet 엔진입니다.
//!
//! ## 주요 특징
//!
//! - **SQL assembly**: fragments → `&macro` substitution → master-detail wrapping
//!   → dialect placeholder translation (`:name` → `$N`)
//! - **Directional params**: IN / OUT / INOUT, CLOB/BLOB flags, per-index batches
//! - **Cursor**: `first` / `next` / `previous` / `last` / `bof` / `eof` / `locate`
//! - **Record binding**: `#[derive(Record)]`, no runtime reflection
//! - **Drivers**: any [`driver::Connection`]; SQLite adapter behind the `sqlite` feature
//!
//! ## 빠른 시작
//!
//! ```rust
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> dbset_core::DbsetResult<()> {
//! use dbset_core::{DataSet, Record};
//! use dbset_core::driver::sqlite::SqliteConnection;
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     id: i64,
//!     #[dbset(column = "NAME")]
//!     name: String,
//! }
//!
//! let conn = SqliteConnection::open_in_memory()?;
//! conn.execute_batch(
//!     "CREATE TABLE users (id INTEGER, name TEXT);
//!      INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob');",
//! )?;
//!
//! let mut ds = DataSet::new(&conn);
//! ds.add_sql("select id, name from users")
//!     .add_sql("where id >= :min_id")
//!     .set_input_param("min_id", 1);
//! ds.open()?;
//!
//! let users: Vec<User> = ds.to_vec()?;
//! assert_eq!(users.len(), 2);
//! assert_eq!(users[1].name, "Bob");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```
//!
//! ## 모듈 구조
//!
//! - [`dataset`] — DataSet, fields, params, rows, master-detail link
//! - [`sql`] — text buffer, macros, dialect translation, static discovery
//! - [`driver`] — session/connection traits and drivers
//! - [`api`] — record binding traits
//! - [`variant`] — dynamically typed value
//! - [`context`] — cancellation and deadlines

extern crate self as dbset_core;

pub mod api;
pub mod context;
pub mod dataset;
pub mod driver;
pub mod error;
pub mod sql;
pub mod variant;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use api::{BindTarget, FromRow, FromVariant, RowView};
pub use context::{CancelHandle, Context};
pub use dataset::DataSet;
pub use dataset::field::{DataKind, Field, FieldRef};
pub use dataset::param::{Param, ParamDirection, ParamOut};
pub use driver::{Connection, ExecResult, Session};
pub use error::{DbsetError, DbsetResult};
pub use sql::Dialect;
pub use variant::Variant;

// Re-export derive macros
pub use dbset_derive::Record;
