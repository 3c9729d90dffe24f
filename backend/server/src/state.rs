use std::sync::Arc;

use anyhow::Error;
use menu::{Catalog, load_catalog};
use tracing::info;

use super::{config::Config, database::init_store, orders::OrderService, views::Views};

pub struct State {
    pub config: Config,
    pub orders: OrderService,
    pub views: Views,
}

impl State {
    pub async fn new(config: Config) -> Result<Arc<Self>, Error> {
        let catalog = match &config.menu_path {
            Some(path) => {
                info!("Loading menu from {path}");
                load_catalog(path)?
            }
            None => Catalog::default(),
        };
        info!("Menu items: {}", catalog.list_items().len());

        let store = init_store(&config.database_url).await?;
        let orders = OrderService::new(catalog, store, &config.staff_key);

        Ok(Self::with_service(config, orders)?)
    }

    pub fn with_service(config: Config, orders: OrderService) -> Result<Arc<Self>, tera::Error> {
        Ok(Arc::new(Self {
            config,
            orders,
            views: Views::new()?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config(database_url: &str, menu_path: Option<&str>) -> Config {
        Config {
            port: 0,
            database_url: database_url.to_string(),
            staff_key: "staff-secret".to_string(),
            menu_path: menu_path.map(str::to_string),
        }
    }

    fn menu_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[tokio::test]
    async fn test_default_menu() {
        let state = State::new(config("sqlite::memory:", None)).await.unwrap();

        assert_eq!(state.orders.catalog().list_items().len(), 4);
    }

    #[tokio::test]
    async fn test_menu_from_file() {
        let file = menu_file(
            r#"[
                {"id": "a", "name": "Idli", "price": 25, "image": "idli.jpg"},
                {"id": "b", "name": "Dosa", "price": 35, "image": "dosa.jpg"}
            ]"#,
        );
        let path = file.path().to_str().unwrap();

        let state = State::new(config("sqlite::memory:", Some(path))).await.unwrap();

        let names: Vec<&str> = state
            .orders
            .catalog()
            .list_items()
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, ["Idli", "Dosa"]);
    }

    #[tokio::test]
    async fn test_bad_menu_fails_startup() {
        let duplicate = menu_file(
            r#"[
                {"id": "a", "name": "Idli", "price": 25, "image": ""},
                {"id": "a", "name": "Dosa", "price": 35, "image": ""}
            ]"#,
        );
        let path = duplicate.path().to_str().unwrap();
        assert!(State::new(config("sqlite::memory:", Some(path))).await.is_err());

        let missing = config("sqlite::memory:", Some("/nonexistent/menu.json"));
        assert!(State::new(missing).await.is_err());
    }

    #[tokio::test]
    async fn test_unsupported_database_fails_startup() {
        let result = State::new(config("postgres://localhost/orders", None)).await;

        assert!(result.is_err());
    }
}
