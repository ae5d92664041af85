//! Admin stock commands.

use std::io::{self, Write};

use football_store_client::{InventorySync, StockForm, SyncError};
use football_store_core::{InventoryId, Size, StockStatus};

use super::{CommandError, Context, finish};

/// Fields to change on an existing row; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct StockEdit {
    pub product: Option<String>,
    pub size: Option<Size>,
    pub quantity: Option<String>,
}

async fn open(ctx: &Context) -> Result<InventorySync, CommandError> {
    let inventory = InventorySync::new(ctx.api.clone(), &ctx.session)?;
    let result = inventory.load().await;
    finish(inventory.take_events(), result)?;
    Ok(inventory)
}

fn print_rows(rows: &[football_store_client::api::types::InventoryRow]) -> Result<(), CommandError> {
    let mut out = io::stdout().lock();
    for row in rows {
        writeln!(
            out,
            "{:>5}  {:<32} {:<4} {:>5}  {}",
            row.id,
            row.product.name,
            row.size,
            row.quantity,
            StockStatus::for_quantity(row.quantity),
        )?;
    }
    Ok(())
}

/// List stock rows, optionally filtered by product name.
///
/// # Errors
///
/// Returns an error if the session is not an admin's or the list cannot be loaded.
pub async fn list(ctx: &Context, search: Option<&str>) -> Result<(), CommandError> {
    let inventory = open(ctx).await?;
    let rows = match search {
        Some(query) => inventory.search(query),
        None => inventory.items(),
    };
    print_rows(&rows)
}

/// Create a row, or replace row `editing`.
///
/// # Errors
///
/// Returns validation, conflict and request failures.
pub async fn submit(
    ctx: &Context,
    form: &StockForm,
    editing: Option<InventoryId>,
) -> Result<(), CommandError> {
    let inventory = open(ctx).await?;
    let result = inventory.submit(form, editing).await;
    finish(inventory.take_events(), result)?;
    print_rows(&inventory.items())
}

/// Replace a row, keeping the fields not given.
///
/// # Errors
///
/// Returns an error if the row does not exist or the submission fails.
pub async fn edit(ctx: &Context, id: InventoryId, edit: StockEdit) -> Result<(), CommandError> {
    let inventory = open(ctx).await?;
    let Some(row) = inventory.get(id) else {
        return Err(SyncError::NotFound(format!("stock row {id}")).into());
    };

    let current = StockForm::from_row(&row);
    let form = StockForm {
        product_id: edit.product.unwrap_or(current.product_id),
        size: edit.size.unwrap_or(current.size),
        quantity: edit.quantity.unwrap_or(current.quantity),
    };
    let result = inventory.submit(&form, Some(id)).await;
    finish(inventory.take_events(), result)?;
    print_rows(&inventory.items())
}

/// Set a row's quantity in place.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn set_quantity(ctx: &Context, id: InventoryId, quantity: u32) -> Result<(), CommandError> {
    let inventory = open(ctx).await?;
    let result = inventory.set_quantity(id, quantity).await;
    finish(inventory.take_events(), result)?;
    print_rows(&inventory.items())
}

/// Delete a row.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete(ctx: &Context, id: InventoryId) -> Result<(), CommandError> {
    let inventory = open(ctx).await?;
    let result = inventory.delete_row(id).await;
    finish(inventory.take_events(), result)?;
    print_rows(&inventory.items())
}

/// Print stock figures.
///
/// # Errors
///
/// Returns an error if the list cannot be loaded.
pub async fn stats(ctx: &Context) -> Result<(), CommandError> {
    let stats = open(ctx).await?.stats();
    let mut out = io::stdout().lock();
    writeln!(out, "Total items:    {}", stats.total_items)?;
    writeln!(out, "Low stock:      {}", stats.low_stock)?;
    writeln!(out, "Out of stock:   {}", stats.out_of_stock)?;
    writeln!(out, "Stock value:    {}", stats.total_value)?;
    Ok(())
}
