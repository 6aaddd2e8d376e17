//! Where each record lives in the document store.
//!
//! ```text
//! products/<product_id>
//! orders/<order_id>
//! notifications/<notification_id>
//! users/<uid>
//! users/<uid>/cart/<product_id>
//! users/<uid>/addresses/<address_id>
//! ```

use common::{NotificationId, OrderId, ProductId, UserId};
use document_store::{CollectionPath, DocumentPath};

pub const PRODUCTS: &str = "products";
pub const ORDERS: &str = "orders";
pub const NOTIFICATIONS: &str = "notifications";
pub const USERS: &str = "users";

const CART: &str = "cart";
const ADDRESSES: &str = "addresses";

pub fn product(id: &ProductId) -> DocumentPath {
    DocumentPath::new(PRODUCTS, id.as_str())
}

pub fn order(id: &OrderId) -> DocumentPath {
    DocumentPath::new(ORDERS, id.as_str())
}

pub fn notification(id: &NotificationId) -> DocumentPath {
    DocumentPath::new(NOTIFICATIONS, id.as_str())
}

pub fn user(uid: &UserId) -> DocumentPath {
    DocumentPath::new(USERS, uid.as_str())
}

/// The cart of one user.
pub fn cart(uid: &UserId) -> CollectionPath {
    user(uid).collection(CART)
}

/// One cart line, keyed by the product it holds.
pub fn cart_line(uid: &UserId, product_id: &ProductId) -> DocumentPath {
    cart(uid).doc(product_id.as_str())
}

pub fn addresses(uid: &UserId) -> CollectionPath {
    user(uid).collection(ADDRESSES)
}
