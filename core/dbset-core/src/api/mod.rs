//! API 모듈 — record binding traits
//!
//! FromRow, FromVariant, BindTarget 트레이트 제공

pub mod traits;

pub use traits::{BindTarget, FromRow, FromVariant, RowView, bind_column};
