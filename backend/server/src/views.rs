//! # Views
//!
//! HTML pages rendered with Tera. Templates are compiled into the binary and
//! auto-escaped, so student-entered text is safe to echo back.
use menu::MenuItem;
use serde::Serialize;
use tera::{Context, Tera};

use crate::database::Order;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("success.html", include_str!("../templates/success.html")),
    (
        "staff_dashboard.html",
        include_str!("../templates/staff_dashboard.html"),
    ),
];

/// Order as shown to people, on pages and in the JSON listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRecord {
    pub reference: String,
    pub student_name: String,
    pub student_class: String,
    pub items: String,
    pub total_price: i64,
    pub created_at: String,
}

impl From<&Order> for OrderRecord {
    fn from(order: &Order) -> Self {
        Self {
            reference: order.reference.clone(),
            student_name: order.student_name.clone(),
            student_class: order.student_class.clone(),
            items: order.items_summary.clone(),
            total_price: order.total_price,
            created_at: order.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// What the student typed, echoed back when the form is rejected.
#[derive(Debug, Default)]
pub struct FormValues<'a> {
    pub student_name: &'a str,
    pub student_class: &'a str,
    pub selected: &'a [String],
}

pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;

        Ok(Self { tera })
    }

    pub fn index(
        &self,
        menu: &[MenuItem],
        form: &FormValues,
        error: Option<&str>,
    ) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("menu", menu);
        context.insert("student_name", form.student_name);
        context.insert("student_class", form.student_class);
        context.insert("selected", form.selected);
        context.insert("error", &error);

        self.tera.render("index.html", &context)
    }

    pub fn success(&self, order: &OrderRecord) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("order", order);

        self.tera.render("success.html", &context)
    }

    pub fn staff_dashboard(&self, orders: &[OrderRecord]) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("orders", orders);

        self.tera.render("staff_dashboard.html", &context)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use menu::Catalog;

    use super::*;

    fn record(name: &str) -> OrderRecord {
        OrderRecord::from(&Order {
            id: 1,
            reference: "#AB12C".to_string(),
            student_name: name.to_string(),
            student_class: "10B".to_string(),
            items_summary: "Masala Pasta".to_string(),
            total_price: 90,
            created_at: Utc.with_ymd_and_hms(2025, 3, 4, 9, 5, 59).unwrap(),
        })
    }

    #[test]
    fn test_record_formats_timestamp() {
        assert_eq!(record("Asha").created_at, "2025-03-04 09:05");
    }

    #[test]
    fn test_index_lists_menu_and_keeps_selection() {
        let views = Views::new().unwrap();
        let catalog = Catalog::default();
        let selected = vec!["2".to_string()];
        let form = FormValues {
            student_name: "Asha",
            student_class: "",
            selected: &selected,
        };

        let html = views
            .index(catalog.list_items(), &form, Some("Please enter the class"))
            .unwrap();

        assert!(html.contains("Spicy Chicken Burger"));
        assert!(html.contains(r#"value="Asha""#));
        assert!(html.contains(r#"value="2" checked"#));
        assert!(!html.contains(r#"value="1" checked"#));
        assert!(html.contains("Please enter the class"));
    }

    #[test]
    fn test_student_text_is_escaped() {
        let views = Views::new().unwrap();

        let html = views.success(&record("<script>alert(1)</script>")).unwrap();

        assert!(html.contains("#AB12C"));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_empty_dashboard() {
        let views = Views::new().unwrap();

        let html = views.staff_dashboard(&[]).unwrap();

        assert!(html.contains("No orders yet."));
    }
}
