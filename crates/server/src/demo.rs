//! Callbacks served by the bundled demo application.

use dispatch::{CallbackError, CallbackRegistry, DispatchError};
use serde_json::{json, Value};
use shared::domain::ComponentRef;

pub(crate) fn register_callbacks(registry: &mut CallbackRegistry) -> Result<(), DispatchError> {
    // Button click counter.
    registry.register_typed(
        ComponentRef::new("out", "children"),
        vec![ComponentRef::new("btn", "n_clicks")],
        vec![],
        |(clicks,): (Option<i64>,)| clicks.unwrap_or(0) + 1,
    )?;

    registry.register_typed(
        ComponentRef::new("greeting", "children"),
        vec![ComponentRef::new("submit", "n_clicks")],
        vec![ComponentRef::new("name", "value")],
        |(_clicks, name): (Option<i64>, Option<String>)| match name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("Hello, {name}!"),
            _ => "Hello!".to_string(),
        },
    )?;

    registry.register(
        ComponentRef::new("total", "children"),
        vec![ComponentRef::new("table", "data")],
        vec![ComponentRef::new("column", "value")],
        sum_column,
    )?;

    Ok(())
}

/// Sums one numeric column of a list-of-records table.
fn sum_column(args: Vec<Value>) -> Result<Value, CallbackError> {
    let [rows, column] = <[Value; 2]>::try_from(args).map_err(|args| {
        CallbackError::InvalidArguments(format!("expected 2 arguments, got {}", args.len()))
    })?;
    let column = column
        .as_str()
        .ok_or_else(|| CallbackError::InvalidArguments("column must be a string".into()))?;
    let rows = rows
        .as_array()
        .ok_or_else(|| CallbackError::InvalidArguments("table data must be a list".into()))?;

    let mut total = 0.0;
    for row in rows {
        match row.get(column) {
            Some(Value::Number(n)) => total += n.as_f64().unwrap_or_default(),
            Some(Value::Null) | None => {}
            Some(other) => {
                return Err(CallbackError::failed(format!(
                    "column '{column}' holds a non-numeric value: {other}"
                )))
            }
        }
    }
    Ok(json!({ "column": column, "total": total }))
}
