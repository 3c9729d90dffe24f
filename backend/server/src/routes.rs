use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{self, Path, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use menu::MenuItem;
use serde::Deserialize;

use crate::{
    error::AppError,
    orders::Submission,
    state::State,
    utils::success_path,
    views::{FormValues, OrderRecord},
};

#[derive(Deserialize)]
pub struct StaffQuery {
    key: Option<String>,
}

pub async fn index_handler(
    extract::State(state): extract::State<Arc<State>>,
) -> Result<Html<String>, AppError> {
    let menu = state.orders.catalog().list_items();
    let html = state.views.index(menu, &FormValues::default(), None)?;

    Ok(Html(html))
}

/// Form fields arrive as pairs so repeated `items` keep their order.
pub async fn submit_handler(
    extract::State(state): extract::State<Arc<State>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let submission = parse_submission(fields);

    match state.orders.submit(submission.clone()).await {
        Ok(order) => Ok(Redirect::to(&success_path(&order.reference)).into_response()),
        Err(AppError::Validation(message)) => {
            let form = FormValues {
                student_name: &submission.student_name,
                student_class: &submission.student_class,
                selected: &submission.item_ids,
            };
            let menu = state.orders.catalog().list_items();
            let html = state.views.index(menu, &form, Some(message.as_str()))?;

            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn success_handler(
    extract::State(state): extract::State<Arc<State>>,
    Path(reference): Path<String>,
) -> Result<Html<String>, AppError> {
    let order = state.orders.find(&reference).await?;
    let html = state.views.success(&OrderRecord::from(&order))?;

    Ok(Html(html))
}

pub async fn staff_handler(
    extract::State(state): extract::State<Arc<State>>,
    Query(query): Query<StaffQuery>,
) -> Result<Html<String>, AppError> {
    let records = staff_records(&state, query).await?;
    let html = state.views.staff_dashboard(&records)?;

    Ok(Html(html))
}

pub async fn api_orders_handler(
    extract::State(state): extract::State<Arc<State>>,
    Query(query): Query<StaffQuery>,
) -> Result<Json<Vec<OrderRecord>>, AppError> {
    Ok(Json(staff_records(&state, query).await?))
}

pub async fn api_menu_handler(
    extract::State(state): extract::State<Arc<State>>,
) -> Json<Vec<MenuItem>> {
    Json(state.orders.catalog().list_items().to_vec())
}

async fn staff_records(state: &State, query: StaffQuery) -> Result<Vec<OrderRecord>, AppError> {
    let orders = state.orders.list_for_staff(query.key.as_deref()).await?;

    Ok(orders.iter().map(OrderRecord::from).collect())
}

fn parse_submission(fields: Vec<(String, String)>) -> Submission {
    let mut submission = Submission::default();

    for (name, value) in fields {
        match name.as_str() {
            "student_name" => submission.student_name = value,
            "class_section" => submission.student_class = value,
            "items" => submission.item_ids.push(value),
            _ => {}
        }
    }

    submission
}
