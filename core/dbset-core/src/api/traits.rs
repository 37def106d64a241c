//! API 트레이트 정의 — record binding
//!
//! `FromVariant` converts one value into a destination field type,
//! `FromRow` binds a whole record from the current row (usually derived with
//! `#[derive(Record)]`), and `BindTarget` covers both destination shapes
//! accepted by [`DataSet::bind_to`](crate::DataSet::bind_to).

use crate::dataset::DataSet;
use crate::dataset::row::Row;
use crate::error::{DbsetError, DbsetResult};
use crate::variant::Variant;
use chrono::NaiveDateTime;

static NULL: Variant = Variant::Null;

/// Read-only view of the row being bound.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'r> {
    row: &'r Row,
}

impl<'r> RowView<'r> {
    pub fn new(row: &'r Row) -> Self {
        Self { row }
    }

    /// Value of a column (case-insensitive); null when the column is absent.
    pub fn value(&self, column: &str) -> &'r Variant {
        self.row.get(column).unwrap_or(&NULL)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.row.get(column).is_some()
    }

    pub fn row(&self) -> &'r Row {
        self.row
    }
}

/// Variant에서 Rust 타입으로 변환하는 트레이트
pub trait FromVariant: Sized {
    fn from_variant(value: &Variant) -> DbsetResult<Self>;

    /// Nullable destinations are left untouched when the source is null.
    fn is_nullable() -> bool {
        false
    }
}

/// Binds a record from the current row.
pub trait FromRow: Default {
    fn bind_row(&mut self, row: &RowView<'_>) -> DbsetResult<()>;
}

/// Destination accepted by `DataSet::bind_to`: a single record (derived)
/// or a `Vec` of records.
pub trait BindTarget {
    fn bind_from(&mut self, ds: &mut DataSet<'_>) -> DbsetResult<()>;
}

impl<T: FromRow> BindTarget for Vec<T> {
    fn bind_from(&mut self, ds: &mut DataSet<'_>) -> DbsetResult<()> {
        ds.bind_remaining(self)
    }
}

/// Assigns one column to one record field. Used by derived `FromRow` impls.
pub fn bind_column<T: FromVariant>(
    slot: &mut T,
    row: &RowView<'_>,
    column: &str,
    field: &str,
) -> DbsetResult<()> {
    let value = row.value(column);
    if T::is_nullable() && value.is_null() {
        return Ok(());
    }
    *slot = T::from_variant(value).map_err(|e| DbsetError::Binding {
        field: field.to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

// 기본 타입 구현
macro_rules! impl_from_variant {
    ($($ty:ty => $accessor:ident),* $(,)?) => {
        $(
            impl FromVariant for $ty {
                fn from_variant(value: &Variant) -> DbsetResult<Self> {
                    Ok(value.$accessor())
                }
            }
        )*
    };
}

impl_from_variant! {
    i8 => as_i8,
    i16 => as_i16,
    i32 => as_i32,
    i64 => as_i64,
    u8 => as_u8,
    u16 => as_u16,
    u32 => as_u32,
    u64 => as_u64,
    f32 => as_float32,
    f64 => as_float64,
    String => as_string,
    bool => as_bool,
    Variant => as_value,
}

impl FromVariant for NaiveDateTime {
    fn from_variant(value: &Variant) -> DbsetResult<Self> {
        if value.is_null() {
            return Ok(NaiveDateTime::default());
        }
        value.as_datetime().ok_or_else(|| DbsetError::TypeMismatch {
            expected: "DateTime".to_string(),
            actual: format!("{value:?}"),
        })
    }
}

// Option<T> 구현
impl<T: FromVariant> FromVariant for Option<T> {
    fn from_variant(value: &Variant) -> DbsetResult<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(T::from_variant(value)?))
        }
    }

    fn is_nullable() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::row::RowColumns;
    use std::sync::Arc;

    fn row() -> Row {
        Row::new(
            Arc::new(RowColumns::new(["ID", "NAME", "NOTE", "AT"])),
            vec![
                Variant::Int64(5),
                Variant::from("Ann"),
                Variant::Null,
                Variant::from("yesterday"),
            ],
        )
    }

    #[test]
    fn scalar_conversions() {
        assert_eq!(i32::from_variant(&Variant::from("12")).unwrap(), 12);
        assert_eq!(String::from_variant(&Variant::Int64(3)).unwrap(), "3");
        assert!(bool::from_variant(&Variant::Int8(1)).unwrap());
        assert_eq!(
            Variant::from_variant(&Variant::from("x")).unwrap(),
            Variant::from("x")
        );
    }

    #[test]
    fn option_is_nullable() {
        assert!(Option::<i64>::is_nullable());
        assert!(!i64::is_nullable());
        assert_eq!(Option::<i64>::from_variant(&Variant::Null).unwrap(), None);
    }

    #[test]
    fn bind_column_skips_null_into_option() {
        let row = row();
        let view = RowView::new(&row);
        let mut note = Some("kept".to_string());
        bind_column(&mut note, &view, "NOTE", "note").unwrap();
        assert_eq!(note.as_deref(), Some("kept"));

        let mut id = 0i64;
        bind_column(&mut id, &view, "id", "id").unwrap();
        assert_eq!(id, 5);
    }

    #[test]
    fn bind_column_reports_field_on_failure() {
        let row = row();
        let view = RowView::new(&row);
        let mut at = NaiveDateTime::default();
        let err = bind_column(&mut at, &view, "AT", "at").unwrap_err();
        assert!(matches!(err, DbsetError::Binding { ref field, .. } if field == "at"));
    }

    #[test]
    fn missing_column_reads_as_null() {
        let row = row();
        let view = RowView::new(&row);
        assert!(!view.contains("MISSING"));
        assert!(view.value("MISSING").is_null());
    }
}
