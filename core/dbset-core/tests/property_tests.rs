//! Property-based tests — cursor invariants and placeholder translation

use dbset_core::context::Context;
use dbset_core::driver::{
    BindArg, BufferedCursor, ColumnMeta, Connection, ExecResult, PreparedStatement, RowCursor,
    ScanKind, Session,
};
use dbset_core::sql::replace_token;
use dbset_core::{DataSet, DbsetResult, Dialect, Variant};
use proptest::prelude::*;

struct FixedRows(usize);

struct NoopStatement;

impl PreparedStatement for NoopStatement {
    fn execute(&mut self, _ctx: Option<&Context>, _args: &[BindArg]) -> DbsetResult<ExecResult> {
        Ok(ExecResult::with_rows_affected(0))
    }
}

impl Session for FixedRows {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn query(
        &self,
        _ctx: Option<&Context>,
        _sql: &str,
        _args: &[BindArg],
    ) -> DbsetResult<Box<dyn RowCursor + '_>> {
        let rows = (0..self.0).map(|i| vec![Variant::Int64(i as i64)]).collect();
        Ok(Box::new(BufferedCursor::new(
            vec![ColumnMeta::new("N", ScanKind::Int64)],
            rows,
        )))
    }

    fn prepare(
        &self,
        _ctx: Option<&Context>,
        _sql: &str,
    ) -> DbsetResult<Box<dyn PreparedStatement + '_>> {
        Ok(Box::new(NoopStatement))
    }
}

impl Connection for FixedRows {
    fn ping(&self, _ctx: Option<&Context>) -> DbsetResult<()> {
        Ok(())
    }

    fn reopen(&self) -> DbsetResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Step {
    First,
    Next,
    Previous,
    Last,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::First),
        Just(Step::Next),
        Just(Step::Previous),
        Just(Step::Last),
    ]
}

proptest! {
    #[test]
    fn next_until_eof_visits_every_row(count in 0usize..40) {
        let conn = FixedRows(count);
        let mut ds = DataSet::new(&conn);
        ds.add_sql("select n from t");
        ds.open().unwrap();

        let mut visited = 0;
        while !ds.eof() {
            prop_assert_eq!(ds.recno(), ds.index() + 1);
            prop_assert_eq!(ds.field_by_name("N").unwrap().as_i64(), visited as i64);
            visited += 1;
            ds.next();
        }
        prop_assert_eq!(visited, ds.count());
    }

    #[test]
    fn cursor_stays_consistent(count in 1usize..20, steps in prop::collection::vec(step(), 0..60)) {
        let conn = FixedRows(count);
        let mut ds = DataSet::new(&conn);
        ds.add_sql("select n from t");
        ds.open().unwrap();

        for s in steps {
            match s {
                Step::First => ds.first(),
                Step::Next => ds.next(),
                Step::Previous => ds.previous(),
                Step::Last => ds.last(),
            }
            prop_assert_eq!(ds.recno(), ds.index() + 1);
            prop_assert!(ds.recno() >= 1 && ds.recno() <= count + 1);
            prop_assert_eq!(ds.bof(), ds.recno() == 1);
            prop_assert_eq!(ds.eof(), ds.recno() > count);
        }
    }

    #[test]
    fn translation_never_touches_longer_identifiers(
        name in "[a-z]{1,6}",
        suffix in "[a-z0-9_]{1,4}",
    ) {
        let sql = format!("v = :{name}{suffix}");
        prop_assert_eq!(replace_token(&sql, &format!(":{name}"), "$1"), sql.clone());

        let conn = FixedRows(0);
        let mut ds = DataSet::new(&conn);
        ds.add_sql(sql.clone()).set_input_param(&name, 1);
        prop_assert_eq!(ds.sql(), sql);
    }

    #[test]
    fn translation_is_idempotent(names in prop::collection::btree_set("[a-z]{1,5}", 1..5)) {
        let sql = names
            .iter()
            .map(|n| format!("{n} = :{n}"))
            .collect::<Vec<_>>()
            .join(" and ");

        let conn = FixedRows(0);
        let mut ds = DataSet::new(&conn);
        ds.add_sql(sql);
        for n in &names {
            ds.set_input_param(n, 0);
        }
        let once = ds.sql();
        prop_assert!(!once.contains(':'));
        prop_assert_eq!(Dialect::Postgres.translate(&once, names.iter().map(String::as_str)), once);
    }
}
