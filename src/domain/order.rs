use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    common::money::Money,
    domain::cart::{Cart, CartLine},
};

pub type OrderId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

/// An order before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<CartLine>,
    pub total: Money,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewOrder {
    /// Freezes the current cart contents into a pending order.
    pub fn from_cart(
        user_id: impl Into<String>,
        cart: &Cart,
        shipping_address: ShippingAddress,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            items: cart.items().to_vec(),
            total: cart.total(),
            status: OrderStatus::Pending,
            shipping_address,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(self, id: impl Into<OrderId>) -> Order {
        Order {
            id: id.into(),
            user_id: self.user_id,
            items: self.items,
            total: self.total,
            status: self.status,
            shipping_address: self.shipping_address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub items: Vec<CartLine>,
    pub total: Money,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
