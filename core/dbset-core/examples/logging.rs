//! 로깅 시스템 사용 예제
//!
//! 실행: RUST_LOG=dbset=trace cargo run --example logging --features logging

use dbset_core::DataSet;
use dbset_core::driver::sqlite::{SqliteConfig, SqliteConnection};

fn main() -> dbset_core::DbsetResult<()> {
    // 로깅 초기화
    #[cfg(feature = "logging")]
    dbset_core::logging::init();

    println!("=== DBSet 로깅 예제 ===\n");
    println!("log_queries = true 이면 SQL과 파라미터가 info 레벨로 출력됩니다.");
    println!("  RUST_LOG=dbset::sql=info     - 실행 SQL");
    println!("  RUST_LOG=dbset::params=info  - 바인딩 파라미터");
    println!("  RUST_LOG=dbset::dataset=debug - 커서/조립 진단\n");

    let config = SqliteConfig {
        log_queries: true,
        ..SqliteConfig::in_memory()
    };
    let conn = SqliteConnection::open(config)?;
    conn.execute_batch("CREATE TABLE events (id INTEGER, kind TEXT)")?;

    let mut ds = DataSet::new(&conn);
    ds.add_sql("insert into events values (:id, :kind)")
        .set_input_param("id", 1)
        .set_input_param("kind", "login");
    ds.exec()?;

    let mut query = DataSet::new(&conn);
    query
        .add_sql("select * from events where kind = :kind")
        .set_input_param("kind", "login");
    query.print_params();
    query.open()?;

    println!("\n=== 예제 완료: {}건 조회 ===", query.count());
    println!("\n주의: logging feature가 활성화되어야 로그가 출력됩니다.");
    Ok(())
}
