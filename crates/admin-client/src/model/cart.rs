//! Upstream carts and their flattened line items.
//!
//! The carts feed nests products inside carts. Dashboard views work on one
//! row per product, tagged with the owning cart and user.

use serde::{Deserialize, Serialize};

/// One product inside an upstream cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    /// Product identifier.
    pub id: u64,
    /// Product title.
    pub title: String,
    /// Unit price.
    pub price: f64,
    /// Units in the cart.
    pub quantity: u32,
    /// `price * quantity` as reported upstream.
    pub total: f64,
    /// Discount applied to this line.
    #[serde(default)]
    pub discount_percentage: f64,
    /// Total after discount.
    #[serde(default)]
    pub discounted_total: f64,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail: String,
}

/// A cart as served by the carts feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart identifier.
    pub id: u64,
    /// Owning user in the upstream system.
    pub user_id: u64,
    /// Products in cart order.
    #[serde(default)]
    pub products: Vec<CartProduct>,
}

/// A product row tagged with its cart and user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product identifier.
    pub product_id: u64,
    /// Product title.
    pub title: String,
    /// Unit price.
    pub price: f64,
    /// Units in the cart.
    pub quantity: u32,
    /// Line total before discount.
    pub total: f64,
    /// Discount applied to this line.
    pub discount_percentage: f64,
    /// Line total after discount.
    pub discounted_total: f64,
    /// Thumbnail URL.
    pub thumbnail: String,
    /// Owning cart.
    pub cart_id: u64,
    /// Owning upstream user.
    pub user_id: u64,
}

impl CartLineItem {
    fn from_product(cart_id: u64, user_id: u64, product: CartProduct) -> Self {
        Self {
            product_id: product.id,
            title: product.title,
            price: product.price,
            quantity: product.quantity,
            total: product.total,
            discount_percentage: product.discount_percentage,
            discounted_total: product.discounted_total,
            thumbnail: product.thumbnail,
            cart_id,
            user_id,
        }
    }
}

/// Flatten carts into line items, preserving cart order then product order.
///
/// # Examples
/// ```
/// use admin_client::{Cart, flatten_carts};
///
/// let carts = vec![Cart { id: 1, user_id: 7, products: Vec::new() }];
/// assert!(flatten_carts(carts).is_empty());
/// ```
#[must_use]
pub fn flatten_carts(carts: Vec<Cart>) -> Vec<CartLineItem> {
    carts
        .into_iter()
        .flat_map(|cart| {
            let Cart {
                id,
                user_id,
                products,
            } = cart;
            products
                .into_iter()
                .map(move |product| CartLineItem::from_product(id, user_id, product))
        })
        .collect()
}
