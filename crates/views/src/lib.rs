//! Live views for one signed-in user.
//!
//! Each view is a [`ReadModel`] kept current by a document store snapshot
//! listener:
//! - [`LiveView`] owns the listener registration and a position counter
//! - [`CartView`], [`MyOrdersView`], [`IncomingOrdersView`],
//!   [`NotificationsView`], and [`ProfileView`] hold the state
//! - [`Session`] groups the views of one user and tears them down on logout

pub mod error;
pub mod live;
pub mod read_model;
pub mod session;
pub mod views;

pub use error::{Result, ViewError};
pub use live::{LiveView, ViewPosition};
pub use read_model::ReadModel;
pub use session::Session;
pub use views::{CartView, IncomingOrdersView, MyOrdersView, NotificationsView, ProfileView};
