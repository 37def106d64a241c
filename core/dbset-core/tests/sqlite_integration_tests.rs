//! SQLite 통합 테스트 — DataSet over a real database file
#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use dbset_core::driver::Connection;
use dbset_core::driver::sqlite::{SqliteConfig, SqliteConnection};
use dbset_core::{Context, DataSet, DbsetError, Dialect, Record, Variant};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::{NamedTempFile, TempDir};

#[derive(Debug, Default, Record)]
struct Order {
    id: i64,
    customer: String,
    amount: f64,
    note: Option<String>,
    #[dbset(column = "CREATED_AT")]
    created: chrono::NaiveDateTime,
    paid: bool,
}

fn setup(dir: &TempDir, dialect: Dialect) -> SqliteConnection {
    let mut config = SqliteConfig::file(dir.path().join("orders.db"));
    config.dialect = dialect;
    let conn = SqliteConnection::open(config).unwrap();
    conn.execute_batch(
        "CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            customer VARCHAR(40),
            amount REAL,
            note TEXT,
            created_at DATETIME,
            paid BOOLEAN
        );
        CREATE TABLE lines (order_id INTEGER, sku TEXT, qty INTEGER);
        INSERT INTO orders VALUES (1, 'acme', 10.5, NULL, '2024-03-01 09:30:00', 1);
        INSERT INTO orders VALUES (2, 'globex', 99.0, 'rush', '2024-03-02 10:00:00', 0);
        INSERT INTO lines VALUES (1, 'A-1', 2), (1, 'B-7', 1), (2, 'C-3', 5);",
    )
    .unwrap();
    conn
}

#[test]
fn test_open_and_bind_records() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Sqlite);

    let mut ds = DataSet::new(&conn);
    ds.add_sql("select * from orders")
        .add_sql("where amount >= :min")
        .add_sql("order by id")
        .set_input_param("min", 0);
    ds.open().unwrap();
    assert_eq!(ds.count(), 2);

    let orders: Vec<Order> = ds.to_vec().unwrap();
    assert_eq!(orders[0].customer, "acme");
    assert_eq!(orders[0].note, None);
    assert!(orders[0].paid);
    assert_eq!(
        orders[0].created,
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    );
    assert_eq!(orders[1].note.as_deref(), Some("rush"));
    assert_eq!(orders[1].amount, 99.0);
}

#[test]
fn test_postgres_style_placeholders_bind_positionally() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Postgres);

    let mut ds = DataSet::new(&conn);
    ds.add_sql("select id from orders where customer = :name or customer = :other or id = :id")
        .set_input_param("name", "acme")
        .set_input_param("other", "nobody")
        .set_input_param("id", 2);
    assert_eq!(
        ds.sql(),
        "select id from orders where customer = $1 or customer = $2 or id = $3"
    );
    ds.open().unwrap();
    assert_eq!(ds.count(), 2);
}

#[test]
fn test_exec_batch_and_delete() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Sqlite);

    let mut insert = DataSet::new(&conn);
    insert
        .add_sql("insert into lines (order_id, sku, qty) values (:order_id, :sku, :qty)")
        .set_input_param("order_id", 2)
        .set_input_param_batch("sku", ["X-1", "X-2", "X-3"])
        .set_input_param_batch("qty", [1, 2, 3]);
    assert_eq!(insert.exec_batch(3).unwrap(), 3);

    let mut remove = DataSet::new(&conn);
    remove
        .add_sql("delete from lines where order_id = :id")
        .set_input_param("id", 2);
    assert_eq!(remove.delete().unwrap(), 4);
}

#[test]
fn test_exec_batch_fails_fast_on_constraint() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Sqlite);

    let mut insert = DataSet::new(&conn);
    insert
        .add_sql("insert into orders (id, customer) values (:id, :customer)")
        .set_input_param("customer", "dup")
        .set_input_param_batch("id", [3, 1, 4]);
    assert!(insert.exec_batch(3).is_err());

    let mut check = DataSet::new(&conn);
    check.add_sql("select id from orders where customer = 'dup'");
    check.open().unwrap();
    assert_eq!(check.count(), 1);
    assert!(check.locate("id", 3).unwrap());
}

#[test]
fn test_exec_reports_last_insert_id() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Sqlite);

    let mut ds = DataSet::new(&conn);
    ds.add_sql("insert into orders (customer, amount) values (:c, :a)")
        .set_input_param("c", "initech")
        .set_input_param("a", 1.25f64);
    let result = ds.exec().unwrap();
    assert_eq!(result.rows_affected, Some(1));
    assert_eq!(result.last_insert_id, Some(3));
}

#[test]
fn test_lob_params_round_trip() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Sqlite);
    conn.execute_batch("CREATE TABLE docs (id INTEGER, body CLOB, data BLOB)")
        .unwrap();

    let mut ds = DataSet::new(&conn);
    ds.add_sql("insert into docs values (:id, :body, :data)")
        .set_input_param("id", 1)
        .set_input_param_clob("body", "long text")
        .set_input_param_blob("data", vec![0u8, 1, 2]);
    ds.exec().unwrap();

    let mut read = DataSet::new(&conn);
    read.add_sql("select body, data from docs");
    read.open().unwrap();
    assert_eq!(read.field_by_name("BODY").unwrap().as_string(), "long text");
    assert_eq!(read.field_by_name("data").unwrap().as_bytes(), vec![0, 1, 2]);
}

#[test]
fn test_master_detail_over_sqlite() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Sqlite);

    let master = Rc::new(RefCell::new(DataSet::new(&conn)));
    master.borrow_mut().add_sql("select id from orders order by id");
    master.borrow_mut().open().unwrap();

    let mut detail = DataSet::new(&conn);
    detail
        .add_sql("select order_id, sku from lines")
        .add_master_source(&master)
        .add_master_fields(["ID"])
        .add_detail_fields(["order_id"]);
    detail.open().unwrap();
    assert_eq!(detail.count(), 2);

    master.borrow_mut().next();
    detail.open().unwrap();
    assert_eq!(detail.count(), 1);
    assert_eq!(detail.field_by_name("sku").unwrap().as_string(), "C-3");
}

#[test]
fn test_reconnects_after_connection_loss() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Sqlite);

    let mut ds = DataSet::new(&conn);
    ds.add_sql("select * from orders");
    conn.close();
    assert!(conn.ping(None).is_err());

    ds.open().unwrap();
    assert_eq!(ds.count(), 2);
    assert!(conn.is_open());
}

#[test]
fn test_exec_does_not_reconnect() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Sqlite);
    conn.close();

    let mut ds = DataSet::new(&conn);
    ds.add_sql("delete from orders");
    assert!(matches!(ds.exec(), Err(DbsetError::ConnectionClosed)));
}

const LONG_COUNT: &str = "with recursive c(x) as (select 1 union all select x + 1 from c where x < 30000000)";

#[test]
fn test_deadline_interrupts_running_query() {
    let conn = SqliteConnection::open_in_memory().unwrap();
    let mut ds = DataSet::new(&conn);
    ds.add_sql(LONG_COUNT).add_sql("select max(x) as n from c");

    let started = Instant::now();
    let result = ds.open_with_context(&Context::with_timeout(Duration::from_millis(50)));
    assert!(matches!(result, Err(DbsetError::DeadlineExceeded)), "{result:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(ds.is_empty());

    // 연결은 계속 사용 가능
    ds.close_and_clear_sql();
    ds.add_sql("select 1 as one");
    ds.open().unwrap();
    assert_eq!(ds.count(), 1);
}

#[test]
fn test_deadline_interrupts_running_exec() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Sqlite);
    conn.execute_batch("CREATE TABLE big (x INTEGER)").unwrap();

    let mut ds = DataSet::new(&conn);
    ds.add_sql("insert into big (x)")
        .add_sql("with recursive c(x) as (select 1 union all select x + 1 from c where x < 5000000)")
        .add_sql("select x from c");

    let started = Instant::now();
    let result = ds.exec_with_context(&Context::with_timeout(Duration::from_millis(50)));
    assert!(matches!(result, Err(DbsetError::DeadlineExceeded)), "{result:?}");
    assert!(started.elapsed() < Duration::from_secs(3));

    let mut count = DataSet::new(&conn);
    count.add_sql("select count(*) as n from big");
    count.open().unwrap();
    assert_eq!(count.field_by_name("n").unwrap().as_i64(), 0);
}

#[test]
fn test_cancel_from_another_thread() {
    let conn = SqliteConnection::open_in_memory().unwrap();
    let ctx = Context::background();
    let handle = ctx.cancel_handle();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        handle.cancel();
    });

    let mut ds = DataSet::new(&conn);
    ds.add_sql(LONG_COUNT).add_sql("select max(x) as n from c");
    let result = ds.open_with_context(&ctx);
    canceller.join().unwrap();
    assert!(matches!(result, Err(DbsetError::Cancelled)), "{result:?}");
}

#[test]
fn test_postgres_token_on_both_sides_of_a_fragment_join() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Postgres);

    let mut ds = DataSet::new(&conn);
    ds.add_sql("select id from orders where id >= :lo")
        .add_sql("and id <= :lo order by id")
        .set_input_param("lo", 2);
    let sql = ds.sql();
    assert!(sql.contains(":lo\n"), "{sql}");
    assert!(sql.contains("<= $1"), "{sql}");

    ds.open().unwrap();
    assert_eq!(ds.count(), 1);
    assert_eq!(ds.field_by_name("id").unwrap().as_i64(), 2);
}

#[test]
fn test_transaction_commit_and_rollback() {
    let dir = TempDir::new().unwrap();
    let conn = setup(&dir, Dialect::Sqlite);

    {
        let tx = conn.begin().unwrap();
        let mut ds = DataSet::with_transaction(&tx);
        ds.add_sql("delete from orders where id = :id").set_input_param("id", 1);
        assert_eq!(ds.delete().unwrap(), 1);
        drop(ds);
        tx.rollback().unwrap();
    }
    {
        let tx = conn.begin().unwrap();
        let mut ds = DataSet::with_transaction(&tx);
        ds.add_sql("delete from orders where id = :id").set_input_param("id", 2);
        ds.exec().unwrap();
        drop(ds);
        tx.commit().unwrap();
    }

    let mut ds = DataSet::new(&conn);
    ds.add_sql("select id from orders");
    ds.open().unwrap();
    assert_eq!(ds.count(), 1);
    assert_eq!(ds.field_by_name("id").unwrap().as_value(), Variant::Int64(1));
}

#[test]
fn test_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"log_queries": true, "dialect": "sqlite"}}"#).unwrap();

    let config = SqliteConfig::from_file(file.path()).unwrap();
    assert!(config.log_queries);
    let conn = SqliteConnection::open(config).unwrap();

    let mut ds = DataSet::new(&conn);
    ds.add_sql("select 1 as one");
    ds.open().unwrap();
    assert_eq!(ds.field_by_name("ONE").unwrap().as_i32(), 1);
}

#[test]
fn test_invalid_config_is_serialization_error() {
    assert!(matches!(
        SqliteConfig::from_json_str("{ nope"),
        Err(DbsetError::Serialization(_))
    ));
}
