//! Tests for exec_iter and UnnamedPortal

use std::env;
use zero_postgres::handler::CollectHandler;
use zero_postgres::tokio::Conn;

async fn get_conn() -> Conn {
    let mut db_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/postgres".to_string());
    if !db_url.contains("sslmode=") {
        if db_url.contains('?') {
            db_url.push_str("&sslmode=disable");
        } else {
            db_url.push_str("?sslmode=disable");
        }
    }
    Conn::new(db_url.as_str())
        .await
        .expect("Failed to connect")
}

#[tokio::test]
async fn test_exec_iter_basic() {
    let mut conn = get_conn().await;

    let stmt = conn
        .prepare("SELECT generate_series(1, 5) as n")
        .await
        .unwrap();

    let total: i32 = conn
        .exec_iter(&stmt, (), |portal| async move {
            let mut handler = CollectHandler::new();
            let has_more = portal.fetch(0, &mut handler).await?; // 0 = fetch all
            assert!(!has_more, "Expected all rows fetched");
            let rows: Vec<(i32,)> = handler.into_rows();
            Ok(rows.iter().map(|(n,)| n).sum())
        })
        .await
        .unwrap();

    assert_eq!(total, 15); // 1+2+3+4+5
}

#[tokio::test]
async fn test_exec_iter_batched() {
    let mut conn = get_conn().await;

    let stmt = conn
        .prepare("SELECT generate_series(1, 10) as n")
        .await
        .unwrap();

    let (batch_count, all_rows): (i32, Vec<i32>) = conn
        .exec_iter(&stmt, (), |portal| async {
            let mut batches = 0;
            let mut collected = Vec::new();
            loop {
                let mut handler = CollectHandler::new();
                let has_more = portal.fetch(3, &mut handler).await?; // fetch 3 at a time
                let rows: Vec<(i32,)> = handler.into_rows();
                collected.extend(rows.iter().map(|(n,)| *n));
                batches += 1;
                if !has_more {
                    break;
                }
            }
            Ok((batches, collected))
        })
        .await
        .unwrap();

    assert_eq!(all_rows, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    assert_eq!(batch_count, 4); // 3+3+3+1 rows in 4 batches
}

#[tokio::test]
async fn test_exec_iter_empty_result() {
    let mut conn = get_conn().await;

    let stmt = conn.prepare("SELECT 1 WHERE false").await.unwrap();

    let row_count: usize = conn
        .exec_iter(&stmt, (), |portal| async move {
            let mut handler = CollectHandler::new();
            let has_more = portal.fetch(0, &mut handler).await?;
            assert!(!has_more, "Expected completion on empty result");
            let rows: Vec<(i32,)> = handler.into_rows();
            Ok(rows.len())
        })
        .await
        .unwrap();

    assert_eq!(row_count, 0);
}

#[tokio::test]
async fn test_exec_iter_with_params() {
    let mut conn = get_conn().await;

    let stmt = conn
        .prepare("SELECT generate_series(1, $1) as n")
        .await
        .unwrap();

    let total: i32 = conn
        .exec_iter(&stmt, (5i32,), |portal| async move {
            let mut handler = CollectHandler::new();
            portal.fetch(0, &mut handler).await?;
            let rows: Vec<(i32,)> = handler.into_rows();
            Ok(rows.iter().map(|(n,)| n).sum())
        })
        .await
        .unwrap();

    assert_eq!(total, 15);
}

#[tokio::test]
async fn test_exec_iter_closure_returns_value() {
    let mut conn = get_conn().await;

    let stmt = conn.prepare("SELECT 42 as answer").await.unwrap();

    let answer: i32 = conn
        .exec_iter(&stmt, (), |portal| async move {
            let mut handler = CollectHandler::new();
            portal.fetch(0, &mut handler).await?;
            let rows: Vec<(i32,)> = handler.into_rows();
            Ok(rows[0].0)
        })
        .await
        .unwrap();

    assert_eq!(answer, 42);
}

#[tokio::test]
async fn test_exec_iter_with_raw_sql() {
    let mut conn = get_conn().await;

    let total: i32 = conn
        .exec_iter("SELECT generate_series(1, 5) as n", (), |portal| async move {
            let mut handler = CollectHandler::new();
            portal.fetch(0, &mut handler).await?;
            let rows: Vec<(i32,)> = handler.into_rows();
            Ok(rows.iter().map(|(n,)| n).sum())
        })
        .await
        .unwrap();

    assert_eq!(total, 15);
}

#[tokio::test]
async fn test_exec_iter_with_raw_sql_and_params() {
    let mut conn = get_conn().await;

    let total: i32 = conn
        .exec_iter(
            "SELECT generate_series(1, $1) as n",
            (5i32,),
            |portal| async move {
                let mut handler = CollectHandler::new();
                portal.fetch(0, &mut handler).await?;
                let rows: Vec<(i32,)> = handler.into_rows();
                Ok(rows.iter().map(|(n,)| n).sum())
            },
        )
        .await
        .unwrap();

    assert_eq!(total, 15);
}

#[tokio::test]
async fn test_exec_iter_raw_sql_batched() {
    let mut conn = get_conn().await;

    let (batch_count, all_rows): (i32, Vec<i32>) = conn
        .exec_iter("SELECT generate_series(1, 10) as n", (), |portal| async {
            let mut batches = 0;
            let mut collected = Vec::new();
            loop {
                let mut handler = CollectHandler::new();
                let has_more = portal.fetch(3, &mut handler).await?; // fetch 3 at a time
                let rows: Vec<(i32,)> = handler.into_rows();
                collected.extend(rows.iter().map(|(n,)| *n));
                batches += 1;
                if !has_more {
                    break;
                }
            }
            Ok((batches, collected))
        })
        .await
        .unwrap();

    assert_eq!(all_rows, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    assert_eq!(batch_count, 4); // 3+3+3+1 rows in 4 batches
}
