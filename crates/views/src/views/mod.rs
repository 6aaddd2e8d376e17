//! Read models for the signed-in user's screens.

mod cart;
mod incoming_orders;
mod my_orders;
mod notifications;
mod profile;

pub use cart::CartView;
pub use incoming_orders::IncomingOrdersView;
pub use my_orders::MyOrdersView;
pub use notifications::NotificationsView;
pub use profile::ProfileView;
