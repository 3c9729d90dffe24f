//! # Menu
//!
//! The fixed list of purchasable canteen items.
//!
//! Loaded once at process start, either from the built-in default or from a
//! JSON file, and never mutated afterwards. Orders store item names rather
//! than ids, so both ids and names must be unique within a catalog.
use std::{collections::HashSet, fs, path::Path};

use anyhow::{Error, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: u32,
    #[serde(rename = "image")]
    pub image_ref: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<MenuItem>,
}

impl Catalog {
    pub fn new(items: Vec<MenuItem>) -> Result<Self, Error> {
        if items.is_empty() {
            bail!("Catalog has no items");
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for item in &items {
            if item.id.is_empty() || item.name.is_empty() {
                bail!("Catalog item with empty id or name");
            }
            if !ids.insert(item.id.as_str()) {
                bail!("Duplicate item id {}", item.id);
            }
            if !names.insert(item.name.as_str()) {
                bail!("Duplicate item name {}", item.name);
            }
        }

        Ok(Self { items })
    }

    /// Items in the order they were defined.
    pub fn list_items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn find_by_id(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            items: default_items(),
        }
    }
}

pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, Error> {
    let data = fs::read(path.as_ref())?;
    let items: Vec<MenuItem> = serde_json::from_slice(&data)?;

    Catalog::new(items)
}

fn item(id: &str, name: &str, price: u32, image_ref: &str) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        price,
        image_ref: image_ref.to_string(),
    }
}

fn default_items() -> Vec<MenuItem> {
    vec![
        item(
            "1",
            "Veg Grilled Sandwich",
            40,
            "https://images.unsplash.com/photo-1528735602780-2552fd46c7af?w=500",
        ),
        item(
            "2",
            "Spicy Chicken Burger",
            80,
            "https://images.unsplash.com/photo-1568901346375-23c9450c58cd?w=500",
        ),
        item(
            "3",
            "Fresh Orange Juice",
            30,
            "https://images.unsplash.com/photo-1621506289937-a8e4df240d0b?w=500",
        ),
        item(
            "4",
            "Masala Pasta",
            90,
            "https://images.unsplash.com/photo-1551183053-bf91b1dca103?w=500",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = Catalog::default();
        let ids: Vec<&str> = catalog.list_items().iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids, ["1", "2", "3", "4"]);
        assert!(Catalog::new(catalog.list_items().to_vec()).is_ok());
    }

    #[test]
    fn test_find_by_id() {
        let catalog = Catalog::default();

        assert_eq!(catalog.find_by_id("3").unwrap().name, "Fresh Orange Juice");
        assert_eq!(catalog.find_by_id("3").unwrap().price, 30);
        assert!(catalog.find_by_id("99").is_none());
        assert!(catalog.find_by_id("").is_none());
    }

    #[test]
    fn test_rejects_duplicates() {
        let dup_id = vec![item("1", "Tea", 10, ""), item("1", "Coffee", 15, "")];
        assert!(Catalog::new(dup_id).is_err());

        let dup_name = vec![item("1", "Tea", 10, ""), item("2", "Tea", 15, "")];
        assert!(Catalog::new(dup_name).is_err());

        assert!(Catalog::new(Vec::new()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "a", "name": "Idli", "price": 25, "image": "idli.jpg"}},
                {{"id": "b", "name": "Dosa", "price": 35, "image": "dosa.jpg"}}
            ]"#
        )
        .unwrap();

        let catalog = load_catalog(file.path()).unwrap();

        assert_eq!(catalog.list_items().len(), 2);
        assert_eq!(catalog.list_items()[1].name, "Dosa");
        assert_eq!(catalog.find_by_id("a").unwrap().image_ref, "idli.jpg");
    }

    #[test]
    fn test_load_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(load_catalog(file.path()).is_err());
        assert!(load_catalog("/nonexistent/menu.json").is_err());
    }
}
