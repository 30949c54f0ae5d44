use chrono::Utc;

use crate::{
    common::error::{LedgerError, ValidationError},
    domain::{
        cart::CartLedger,
        order::{NewOrder, OrderId, ShippingAddress},
    },
    io::store::SnapshotStore,
    remote::catalog::{Catalog, CatalogBackend},
};

/// Turns the cart into a pending order. The cart is cleared only once the
/// store has accepted the order; a failed create leaves it untouched and
/// returns `Ok(None)`.
pub async fn place_order<S, B>(
    cart: &mut CartLedger<S>,
    catalog: &Catalog<B>,
    user_id: &str,
    shipping_address: ShippingAddress,
) -> Result<Option<OrderId>, LedgerError>
where
    S: SnapshotStore,
    B: CatalogBackend,
{
    if cart.cart().is_empty() {
        return Err(ValidationError::EmptyCart.into());
    }

    let order = NewOrder::from_cart(user_id, cart.cart(), shipping_address, Utc::now());
    let Some(id) = catalog.create_order(&order).await else {
        return Ok(None);
    };

    cart.clear_cart()?;
    tracing::debug!(order = %id, total = %order.total, "order placed, cart cleared");
    Ok(Some(id))
}
