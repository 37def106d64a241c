//! 트랜잭션 / 마스터-디테일 사용 예제
//!
//! 실행: cargo run --example transactions

use dbset_core::DataSet;
use dbset_core::driver::sqlite::SqliteConnection;
use std::cell::RefCell;
use std::rc::Rc;

fn main() -> dbset_core::DbsetResult<()> {
    println!("=== DBSet 트랜잭션 예제 ===\n");

    let conn = SqliteConnection::open_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE accounts (id INTEGER, owner TEXT, balance INTEGER);
         CREATE TABLE transfers (account_id INTEGER, amount INTEGER);
         INSERT INTO accounts VALUES (1, 'alice', 1000), (2, 'bob', 2000);",
    )?;

    // 1. 커밋되는 트랜잭션
    println!("1. 이체 트랜잭션...");
    {
        let tx = conn.begin()?;
        let mut ds = DataSet::with_transaction(&tx);
        ds.add_sql("update accounts set balance = balance + :delta where id = :id");
        for (id, delta) in [(1, -300), (2, 300)] {
            ds.set_input_param("delta", delta).set_input_param("id", id);
            ds.exec()?;
        }
        let mut log = DataSet::with_transaction(&tx);
        log.add_sql("insert into transfers values (:account_id, :amount)")
            .set_input_param_batch("account_id", [1, 2])
            .set_input_param_batch("amount", [-300, 300]);
        log.exec_batch(2)?;
        drop((ds, log));
        tx.commit()?;
        println!("   ✓ 커밋 완료\n");
    }

    // 2. drop 시 롤백되는 트랜잭션
    println!("2. 롤백 트랜잭션...");
    {
        let tx = conn.begin()?;
        let mut ds = DataSet::with_transaction(&tx);
        ds.add_sql("delete from accounts");
        println!("   삭제 {}건 (롤백 예정)", ds.delete()?);
    }
    println!("   ✓ drop 시 자동 롤백\n");

    // 3. 마스터-디테일
    println!("3. 계좌별 이체 내역...");
    let master = Rc::new(RefCell::new(DataSet::new(&conn)));
    master
        .borrow_mut()
        .add_sql("select id, owner, balance from accounts order by id");
    master.borrow_mut().open()?;

    let mut detail = DataSet::new(&conn);
    detail
        .add_sql("select account_id, amount from transfers")
        .add_master_source(&master)
        .add_master_fields(["ID"])
        .add_detail_fields(["account_id"]);

    while !master.borrow().eof() {
        detail.open()?;
        {
            let m = master.borrow();
            println!(
                "   {} (잔액 {}): 이체 {}건, 금액 {}",
                m.field_by_name("owner")?.as_string(),
                m.field_by_name("balance")?.as_i64(),
                detail.count(),
                detail.field_by_name("amount")?.as_i64()
            );
        }
        master.borrow_mut().next();
    }

    println!("\n=== 예제 완료 ===");
    Ok(())
}
