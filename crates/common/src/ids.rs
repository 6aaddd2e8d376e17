use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a string-backed identifier newtype.
///
/// Document ids are opaque strings assigned by the store (or by the
/// authentication provider for users), so the wrappers only add type
/// safety on top of `String`.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier is empty (not yet assigned).
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a registered user (farmer or consumer).
    UserId
);

string_id!(
    /// Identifier of a product document.
    ProductId
);

string_id!(
    /// Identifier of an order document.
    OrderId
);

string_id!(
    /// Identifier of a notification document.
    NotificationId
);

string_id!(
    /// Identifier of an address in a user's address book.
    AddressId
);

impl OrderId {
    /// Generates a new order identifier.
    ///
    /// Format is `ORD-<unix millis>-<8 hex chars>`. The millisecond prefix
    /// keeps ids roughly sortable; the random suffix keeps two checkouts in
    /// the same millisecond apart.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("ORD-{millis}-{}", &suffix[..8]))
    }
}
