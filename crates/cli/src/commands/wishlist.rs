//! Wishlist commands.

use std::io::{self, Write};

use football_store_client::WishlistSync;
use football_store_core::{ProductId, WishlistItemId};

use super::{CommandError, Context, finish};

fn controller(ctx: &Context) -> Result<WishlistSync, CommandError> {
    let user = ctx.session.require_user()?;
    Ok(WishlistSync::new(ctx.api.clone(), user))
}

async fn open(ctx: &Context) -> Result<WishlistSync, CommandError> {
    let wishlist = controller(ctx)?;
    let result = wishlist.load().await;
    finish(wishlist.take_events(), result)?;
    Ok(wishlist)
}

fn print(wishlist: &WishlistSync) -> Result<(), CommandError> {
    let mut out = io::stdout().lock();
    for item in wishlist.items() {
        writeln!(
            out,
            "{:>5}  #{:<5} {:<32} {}",
            item.id, item.product.id, item.product.name, item.product.price
        )?;
    }
    writeln!(out, "{} saved product(s)", wishlist.len())?;
    Ok(())
}

/// List the wishlist.
///
/// # Errors
///
/// Returns an error if the wishlist cannot be loaded.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    print(&open(ctx).await?)
}

/// Save a product.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn add(ctx: &Context, product_id: ProductId) -> Result<(), CommandError> {
    let wishlist = controller(ctx)?;
    let result = wishlist.add(product_id).await;
    finish(wishlist.take_events(), result)?;
    print(&wishlist)
}

/// Remove an entry.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn remove(ctx: &Context, id: WishlistItemId) -> Result<(), CommandError> {
    let wishlist = open(ctx).await?;
    let result = wishlist.remove(id).await;
    finish(wishlist.take_events(), result)?;
    print(&wishlist)
}

/// Save or unsave a product.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn toggle(ctx: &Context, product_id: ProductId) -> Result<(), CommandError> {
    let wishlist = controller(ctx)?;
    let result = wishlist.toggle(product_id).await;
    let saved = finish(wishlist.take_events(), result)?;
    tracing::info!(%product_id, saved, "Wishlist toggled");
    print(&wishlist)
}

/// Ask the server whether a product is saved.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn check(ctx: &Context, product_id: ProductId) -> Result<(), CommandError> {
    let wishlist = controller(ctx)?;
    let saved = wishlist.contains(product_id).await?;
    let answer = if saved { "in" } else { "not in" };
    writeln!(io::stdout().lock(), "Product #{product_id} is {answer} the wishlist")?;
    Ok(())
}
