use serde::{Deserialize, Serialize};

use crate::{
    common::{
        error::{LedgerError, ValidationError},
        money::Money,
        observer::Observers,
    },
    domain::product::Product,
    io::store::{self, CART_KEY, SnapshotStore},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.product.price * self.quantity
    }
}

/// Cart contents with a derived total. `total` is rewritten from the lines
/// after every change and is never adjusted on its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartLine>,
    total: Money,
}

impl Cart {
    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Units across all lines, as shown on the cart badge.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.items.iter().find(|l| l.product.id == product_id)
    }

    fn recompute_total(&mut self) {
        self.total = self.items.iter().map(CartLine::line_total).sum();
    }

    /// Sum of the line totals, or `None` if any product or the sum leaves
    /// the `Money` range.
    fn checked_total(&self) -> Option<Money> {
        self.items.iter().try_fold(Money::zero(), |acc, l| {
            acc.checked_add(l.product.price.checked_mul(l.quantity)?)
        })
    }
}

/// Cart state plus its persistence. Each mutation recomputes the total,
/// writes the whole cart under the `cart` key and then notifies observers.
#[derive(Debug)]
pub struct CartLedger<S: SnapshotStore> {
    cart: Cart,
    store: S,
    observers: Observers<Cart>,
}

impl<S: SnapshotStore> CartLedger<S> {
    /// Restores the last saved cart, or starts empty. The stored total is
    /// not trusted and is recomputed from the lines.
    pub fn open(store: S) -> Result<Self, LedgerError> {
        let mut cart: Cart = store::load_json_or_default(&store, CART_KEY)?;
        cart.items.retain(|l| l.quantity > 0);
        cart.recompute_total();
        tracing::debug!(lines = cart.line_count(), total = %cart.total, "cart restored");
        Ok(Self {
            cart,
            store,
            observers: Observers::default(),
        })
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&Cart) + Send + 'static,
    {
        self.observers.subscribe(callback);
    }

    /// Adds `quantity` units, merging into an existing line for the same
    /// product. A zero quantity changes nothing.
    pub fn add_to_cart(&mut self, product: Product, quantity: u32) -> Result<(), LedgerError> {
        if quantity == 0 {
            return Ok(());
        }
        let mut next = self.cart.clone();
        match next.items.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(ValidationError::AmountOutOfRange)?;
            }
            None => next.items.push(CartLine { product, quantity }),
        }
        self.commit(next)
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> Result<(), LedgerError> {
        if self.cart.line(product_id).is_none() {
            return Ok(());
        }
        let mut next = self.cart.clone();
        next.items.retain(|l| l.product.id != product_id);
        self.commit(next)
    }

    /// Sets the quantity of an existing line. Zero is rejected rather than
    /// clamped; use `remove_from_cart` to drop a line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), LedgerError> {
        if quantity == 0 {
            return Err(ValidationError::NonPositiveQuantity.into());
        }
        let mut next = self.cart.clone();
        let Some(line) = next.items.iter_mut().find(|l| l.product.id == product_id) else {
            return Ok(());
        };
        line.quantity = quantity;
        self.commit(next)
    }

    pub fn clear_cart(&mut self) -> Result<(), LedgerError> {
        self.commit(Cart::default())
    }

    /// Prices and persists `next`, and only then makes it the current cart.
    /// On any error the current cart is left as it was.
    fn commit(&mut self, mut next: Cart) -> Result<(), LedgerError> {
        next.total = next
            .checked_total()
            .ok_or(ValidationError::AmountOutOfRange)?;
        store::save_json(&mut self.store, CART_KEY, &next)?;
        self.cart = next;
        tracing::debug!(lines = self.cart.line_count(), total = %self.cart.total, "cart saved");
        self.observers.notify(&self.cart);
        Ok(())
    }
}
