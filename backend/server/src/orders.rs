//! # Orders
//!
//! Submission, confirmation lookup and the staff listing.
//!
//! ## Submission
//!
//! 1. Trim name and class, reject empty name, class or item selection
//! 2. Resolve ids against the catalog in submission order, dropping unknown
//!    ids and repeats
//! 3. Total the prices, join the names with `", "`
//! 4. Mint a reference and insert, minting a new one when the store reports
//!    the reference as taken
//!
//! Unknown ids being dropped means a selection of only unknown ids still
//! produces an order, with an empty summary and a total of 0.
//!
//! ## Staff listing
//!
//! Gated by the shared staff key, compared in constant time.
use std::sync::Arc;

use menu::{Catalog, MenuItem};
use tracing::{info, warn};

use crate::{
    database::{NewOrder, Order, OrderStore, StoreError},
    error::AppError,
    utils::{generate_reference, keys_match},
};

pub const MAX_REFERENCE_ATTEMPTS: usize = 5;

pub type ReferenceGenerator = Box<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub student_name: String,
    pub student_class: String,
    pub item_ids: Vec<String>,
}

pub struct OrderService {
    catalog: Catalog,
    store: Arc<dyn OrderStore>,
    staff_key: String,
    generator: ReferenceGenerator,
}

impl OrderService {
    pub fn new(catalog: Catalog, store: Arc<dyn OrderStore>, staff_key: &str) -> Self {
        Self {
            catalog,
            store,
            staff_key: staff_key.to_string(),
            generator: Box::new(|| generate_reference(&mut rand::thread_rng())),
        }
    }

    pub fn with_generator(mut self, generator: ReferenceGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn submit(&self, submission: Submission) -> Result<Order, AppError> {
        let student_name = submission.student_name.trim();
        let student_class = submission.student_class.trim();

        if student_name.is_empty() {
            return Err(AppError::Validation("Please enter the student's name".into()));
        }
        if student_class.is_empty() {
            return Err(AppError::Validation("Please enter the class".into()));
        }
        if submission.item_ids.is_empty() {
            return Err(AppError::Validation("Please select at least one item".into()));
        }

        let chosen = resolve_items(&self.catalog, &submission.item_ids);
        if chosen.len() < submission.item_ids.len() {
            info!(
                "Dropped {} unknown or repeated item ids",
                submission.item_ids.len() - chosen.len()
            );
        }

        let total_price: i64 = chosen.iter().map(|item| i64::from(item.price)).sum();
        let items_summary = chosen
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        for _ in 0..MAX_REFERENCE_ATTEMPTS {
            let new_order = NewOrder {
                reference: (self.generator)(),
                student_name: student_name.to_string(),
                student_class: student_class.to_string(),
                items_summary: items_summary.clone(),
                total_price,
            };

            match self.store.insert(new_order).await {
                Ok(order) => {
                    info!("Order {} placed, total {}", order.reference, order.total_price);
                    return Ok(order);
                }
                Err(StoreError::DuplicateReference(reference)) => {
                    warn!("Reference {reference} already taken, generating another");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::ReferenceExhausted(MAX_REFERENCE_ATTEMPTS))
    }

    pub async fn find(&self, reference: &str) -> Result<Order, AppError> {
        self.store
            .find_by_reference(reference)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn list_for_staff(&self, key: Option<&str>) -> Result<Vec<Order>, AppError> {
        let authorized = key.is_some_and(|key| keys_match(key, &self.staff_key));
        if !authorized {
            warn!("Rejected staff listing request with a missing or wrong key");
            return Err(AppError::Unauthorized);
        }

        Ok(self.store.list_newest_first().await?)
    }
}

/// Catalog items for `ids`, in submission order, each at most once.
pub fn resolve_items<'a>(catalog: &'a Catalog, ids: &[String]) -> Vec<&'a MenuItem> {
    let mut chosen: Vec<&MenuItem> = Vec::with_capacity(ids.len());

    for id in ids {
        if let Some(item) = catalog.find_by_id(id) {
            if !chosen.iter().any(|c| c.id == item.id) {
                chosen.push(item);
            }
        }
    }

    chosen
}
