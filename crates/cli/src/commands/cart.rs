//! Cart commands.

use std::io::{self, Write};

use football_store_client::{AddToCart, CartSync, Checkout, ShippingAddress};
use football_store_core::CartItemId;

use super::{CommandError, Context, finish};

async fn open(ctx: &Context) -> Result<CartSync, CommandError> {
    let user = ctx.session.require_user()?;
    let cart = CartSync::new(ctx.api.clone(), user);
    let result = cart.load().await;
    finish(cart.take_events(), result)?;
    Ok(cart)
}

fn print(cart: &CartSync) -> Result<(), CommandError> {
    let mut out = io::stdout().lock();
    for item in cart.items() {
        let print_name = match (&item.player, &item.number) {
            (Some(player), Some(number)) => format!(" [{player} #{number}]"),
            (Some(player), None) => format!(" [{player}]"),
            (None, Some(number)) => format!(" [#{number}]"),
            (None, None) => String::new(),
        };
        writeln!(
            out,
            "{:>5}  {:<32} {:<4} x{:<3} {}{print_name}",
            item.id,
            item.product.name,
            item.size,
            item.quantity,
            item.product.price.times(item.quantity),
        )?;
    }
    writeln!(
        out,
        "{} item(s), subtotal {}",
        cart.item_count(),
        cart.subtotal()
    )?;
    Ok(())
}

/// List the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let cart = open(ctx).await?;
    print(&cart)
}

/// Add one unit to a line.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn increment(ctx: &Context, id: CartItemId) -> Result<(), CommandError> {
    let cart = open(ctx).await?;
    if !cart.can_increment(id) {
        tracing::warn!(%id, "Line is missing or already at the maximum quantity");
    }
    let result = cart.increment(id).await;
    finish(cart.take_events(), result)?;
    print(&cart)
}

/// Take one unit from a line.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn decrement(ctx: &Context, id: CartItemId) -> Result<(), CommandError> {
    let cart = open(ctx).await?;
    if !cart.can_decrement(id) {
        tracing::warn!(%id, "Line is missing or already at the minimum quantity");
    }
    let result = cart.decrement(id).await;
    finish(cart.take_events(), result)?;
    print(&cart)
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn set_quantity(ctx: &Context, id: CartItemId, quantity: i64) -> Result<(), CommandError> {
    let cart = open(ctx).await?;
    let result = cart.set_quantity(id, quantity).await;
    if matches!(result, Ok(false)) {
        tracing::warn!(%id, quantity, "Quantity rejected");
    }
    finish(cart.take_events(), result)?;
    print(&cart)
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn remove(ctx: &Context, id: CartItemId) -> Result<(), CommandError> {
    let cart = open(ctx).await?;
    let result = cart.remove(id).await;
    finish(cart.take_events(), result)?;
    print(&cart)
}

/// Put a product in the cart.
///
/// # Errors
///
/// Returns an error if the quantity is invalid or the request fails.
pub async fn add(ctx: &Context, line: AddToCart) -> Result<(), CommandError> {
    let user = ctx.session.require_user()?;
    let cart = CartSync::new(ctx.api.clone(), user);
    let result = cart.add(line).await;
    finish(cart.take_events(), result)?;
    print(&cart)
}

/// Apply an optional discount code and place the order.
///
/// # Errors
///
/// Returns an error if the coupon is rejected, the address is incomplete or
/// the order fails.
pub async fn checkout(
    ctx: &Context,
    coupon: Option<&str>,
    address: &ShippingAddress,
) -> Result<(), CommandError> {
    let cart = open(ctx).await?;
    let mut checkout = Checkout::new(&cart);

    if let Some(code) = coupon {
        let result = checkout.apply_coupon(code).await;
        finish(cart.take_events(), result)?;
    }

    let mut out = io::stdout().lock();
    writeln!(out, "subtotal {}", checkout.subtotal())?;
    if let Some(coupon) = checkout.coupon() {
        writeln!(out, "discount ({}%) -{}", coupon.percentage, checkout.discount())?;
    }
    drop(out);

    let result = checkout.place_order(address).await;
    let order = finish(cart.take_events(), result)?;
    writeln!(io::stdout().lock(), "order {} placed, total {}", order.id, order.total)?;
    Ok(())
}
