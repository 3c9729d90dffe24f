use async_trait::async_trait;
use chrono::DateTime;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqlitePoolOptions, SqliteQueryResult},
};

use super::{NewOrder, Order, OrderStore, StoreError, now};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        order_ref TEXT NOT NULL UNIQUE,
        student_name TEXT NOT NULL,
        student_class TEXT NOT NULL,
        items TEXT NOT NULL,
        total_price INTEGER NOT NULL,
        created_at INTEGER NOT NULL
    )
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, order_ref, student_name, student_class, items, total_price, created_at FROM orders";

#[derive(FromRow)]
struct OrderRow {
    id: i64,
    order_ref: String,
    student_name: String,
    student_class: String,
    items: String,
    total_price: i64,
    created_at: i64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            reference: row.order_ref,
            student_name: row.student_name,
            student_class: row.student_class,
            items_summary: row.items,
            total_price: row.total_price,
            created_at: DateTime::from_timestamp_millis(row.created_at).unwrap_or_default(),
        }
    }
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        // every connection to an in-memory database sees its own empty database
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(database_url)
                .await?
        } else {
            SqlitePool::connect(database_url).await?
        };

        let store = Self { pool };
        store.create_table().await?;

        Ok(store)
    }

    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }

    async fn create_table(&self) -> Result<SqliteQueryResult, StoreError> {
        Ok(sqlx::query(CREATE_TABLE).execute(&self.pool).await?)
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let created_at = now();

        let result = sqlx::query(
            "INSERT INTO orders (order_ref, student_name, student_class, items, total_price, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&order.reference)
        .bind(&order.student_name)
        .bind(&order.student_class)
        .bind(&order.items_summary)
        .bind(order.total_price)
        .bind(created_at.timestamp_millis())
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(StoreError::DuplicateReference(order.reference));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Order {
            id: result.last_insert_rowid(),
            reference: order.reference,
            student_name: order.student_name,
            student_class: order.student_class,
            items_summary: order.items_summary,
            total_price: order.total_price,
            created_at,
        })
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE order_ref = ?"))
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Order::from))
    }

    async fn list_newest_first(&self) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order(reference: &str, total_price: i64) -> NewOrder {
        NewOrder {
            reference: reference.to_string(),
            student_name: "Asha".to_string(),
            student_class: "10B".to_string(),
            items_summary: "Masala Pasta".to_string(),
            total_price,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = SqliteStore::in_memory().await.unwrap();

        let inserted = store.insert(new_order("#AB12C", 90)).await.unwrap();
        let found = store.find_by_reference("#AB12C").await.unwrap().unwrap();

        assert_eq!(inserted, found);
        assert_eq!(found.total_price, 90);
        assert!(store.find_by_reference("#ZZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_reference_rejected() {
        let store = SqliteStore::in_memory().await.unwrap();

        store.insert(new_order("#AB12C", 90)).await.unwrap();
        let second = store.insert(new_order("#AB12C", 40)).await;

        assert!(matches!(second, Err(StoreError::DuplicateReference(r)) if r == "#AB12C"));
        assert_eq!(store.list_newest_first().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_listing_is_newest_first() {
        let store = SqliteStore::in_memory().await.unwrap();

        let first = store.insert(new_order("#AAAAA", 10)).await.unwrap();
        let second = store.insert(new_order("#BBBBB", 20)).await.unwrap();
        let third = store.insert(new_order("#CCCCC", 30)).await.unwrap();

        assert!(first.id < second.id && second.id < third.id);

        let refs: Vec<String> = store
            .list_newest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.reference)
            .collect();
        assert_eq!(refs, ["#CCCCC", "#BBBBB", "#AAAAA"]);
    }
}
