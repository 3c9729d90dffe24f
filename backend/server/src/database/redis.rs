//! # Redis
//!
//! Alternative order store for deployments that already run Redis.
//!
//! - `orders` hash: reference to JSON encoded order
//! - `orders:next_id` counter: sequential ids
//!
//! `HSETNX` on the reference is atomic, so a taken reference is rejected
//! without overwriting the existing order. A rejected insert still consumes
//! an id, which leaves a gap in the sequence.
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

use super::{NewOrder, Order, OrderStore, StoreError, now, sort_newest_first};

const ORDERS_KEY: &str = "orders";
const NEXT_ID_KEY: &str = "orders:next_id";

pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(100));

        let client = Client::open(redis_url)?;
        let connection = client.get_connection_manager_with_config(config).await?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl OrderStore for RedisStore {
    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut connection = self.connection.clone();

        let id: i64 = connection.incr(NEXT_ID_KEY, 1).await?;
        let order = Order {
            id,
            reference: order.reference,
            student_name: order.student_name,
            student_class: order.student_class,
            items_summary: order.items_summary,
            total_price: order.total_price,
            created_at: now(),
        };

        let payload = encode_order(&order)?;
        let inserted: bool = connection
            .hset_nx(ORDERS_KEY, &order.reference, payload)
            .await?;

        claimed(inserted, order)
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Order>, StoreError> {
        let mut connection = self.connection.clone();

        let payload: Option<String> = connection.hget(ORDERS_KEY, reference).await?;

        payload.as_deref().map(decode_order).transpose()
    }

    async fn list_newest_first(&self) -> Result<Vec<Order>, StoreError> {
        let mut connection = self.connection.clone();

        let payloads: Vec<String> = connection.hvals(ORDERS_KEY).await?;
        let mut orders = payloads
            .iter()
            .map(|payload| decode_order(payload))
            .collect::<Result<Vec<Order>, _>>()?;

        sort_newest_first(&mut orders);

        Ok(orders)
    }
}

fn encode_order(order: &Order) -> Result<String, StoreError> {
    Ok(serde_json::to_string(order)?)
}

fn decode_order(payload: &str) -> Result<Order, StoreError> {
    Ok(serde_json::from_str(payload)?)
}

/// `HSETNX` answers false when the reference field already exists.
fn claimed(inserted: bool, order: Order) -> Result<Order, StoreError> {
    if !inserted {
        return Err(StoreError::DuplicateReference(order.reference));
    }

    Ok(order)
}
