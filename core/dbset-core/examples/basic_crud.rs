//! 기본 CRUD 작업 예제
//!
//! 실행: cargo run --example basic_crud

use dbset_core::driver::sqlite::SqliteConnection;
use dbset_core::{DataSet, Record};

#[derive(Debug, Default, Record)]
struct User {
    id: i64,
    name: String,
    email: Option<String>,
}

fn main() -> dbset_core::DbsetResult<()> {
    println!("=== DBSet 기본 CRUD 예제 ===\n");

    // 1. 인메모리 데이터베이스 생성
    println!("1. 연결 생성...");
    let conn = SqliteConnection::open_in_memory()?;
    conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, email TEXT)")?;
    println!("   ✓ users 테이블 생성 완료\n");

    // 2. 데이터 삽입 (Create) — 배치 실행
    println!("2. 데이터 삽입...");
    let mut insert = DataSet::new(&conn);
    insert
        .add_sql("insert into users (id, name, email) values (:id, :name, :email)")
        .set_input_param_batch("id", [1, 2, 3])
        .set_input_param_batch("name", ["Alice", "Bob", "Charlie"])
        .set_input_param_batch("email", [Some("alice@example.com"), None, None]);
    let inserted = insert.exec_batch(3)?;
    println!("   ✓ {inserted}개 레코드 삽입 완료\n");

    // 3. 데이터 조회 (Read)
    println!("3. 데이터 조회...");
    let mut query = DataSet::new(&conn);
    query.add_sql("select id, name, email from users order by id");
    query.open()?;
    while !query.eof() {
        println!(
            "   #{} {} <{}>",
            query.field_by_name("id")?.as_i64(),
            query.field_by_name("name")?.as_string(),
            query.field_by_name("email")?.as_string()
        );
        query.next();
    }
    println!();

    // 4. 데이터 수정 (Update)
    println!("4. 데이터 수정...");
    let mut update = DataSet::new(&conn);
    update
        .add_sql("update users set name = :name where id = :id")
        .set_input_param("name", "Alice Updated")
        .set_input_param("id", 1);
    println!("   실행 SQL: {}", update.sql_with_literals());
    update.exec()?;

    query.open()?;
    let users: Vec<User> = query.to_vec()?;
    println!("   {:?} (수정됨)\n", users[0]);

    // 5. 데이터 삭제 (Delete)
    println!("5. 데이터 삭제...");
    let mut delete = DataSet::new(&conn);
    delete
        .add_sql("delete from users where id = :id")
        .set_input_param("id", 2);
    println!("   ✓ {}개 레코드 삭제\n", delete.delete()?);

    query.open()?;
    println!("=== 완료: {}개 레코드 남음 ===", query.count());
    Ok(())
}
