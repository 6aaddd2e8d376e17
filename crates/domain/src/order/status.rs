//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──┬──► Dikonfirmasi ──┬──► Dikirim ──► Selesai
///           │                   │       ▲
///           ├───────────────────┼───────┘
///           └───────────────────┴──► Dibatalkan
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Placed by the consumer, awaiting the farmer.
    #[default]
    Pending,

    /// Accepted by the farmer.
    Dikonfirmasi,

    /// Handed to the courier.
    Dikirim,

    /// Receipt confirmed by the consumer (terminal state).
    Selesai,

    /// Cancelled by the farmer (terminal state).
    Dibatalkan,
}

impl OrderStatus {
    /// Returns true if an order in this status may move to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (*self, next),
            (Pending, Dikonfirmasi | Dikirim | Dibatalkan)
                | (Dikonfirmasi, Dikirim | Dibatalkan)
                | (Dikirim, Selesai)
        )
    }

    /// The farmer's "advance" step from this status, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Dikonfirmasi),
            OrderStatus::Dikonfirmasi => Some(OrderStatus::Dikirim),
            OrderStatus::Dikirim => Some(OrderStatus::Selesai),
            OrderStatus::Selesai | OrderStatus::Dibatalkan => None,
        }
    }

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Selesai | OrderStatus::Dibatalkan)
    }

    /// Orders shown under "ongoing" in the consumer's order list.
    pub fn is_ongoing(&self) -> bool {
        !self.is_terminal()
    }

    /// Orders shown under "finished" in the consumer's order list.
    pub fn is_finished(&self) -> bool {
        matches!(self, OrderStatus::Selesai)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Dikonfirmasi => "Dikonfirmasi",
            OrderStatus::Dikirim => "Dikirim",
            OrderStatus::Selesai => "Selesai",
            OrderStatus::Dibatalkan => "Dibatalkan",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Dikonfirmasi" => Ok(OrderStatus::Dikonfirmasi),
            "Dikirim" => Ok(OrderStatus::Dikirim),
            "Selesai" => Ok(OrderStatus::Selesai),
            "Dibatalkan" => Ok(OrderStatus::Dibatalkan),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 5] = [Pending, Dikonfirmasi, Dikirim, Selesai, Dibatalkan];

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), Pending);
    }

    #[test]
    fn test_allowed_transitions() {
        let allowed: Vec<(OrderStatus, OrderStatus)> = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();

        assert_eq!(
            allowed,
            vec![
                (Pending, Dikonfirmasi),
                (Pending, Dikirim),
                (Pending, Dibatalkan),
                (Dikonfirmasi, Dikirim),
                (Dikonfirmasi, Dibatalkan),
                (Dikirim, Selesai),
            ]
        );
    }

    #[test]
    fn test_next_follows_happy_path() {
        assert_eq!(Pending.next(), Some(Dikonfirmasi));
        assert_eq!(Dikonfirmasi.next(), Some(Dikirim));
        assert_eq!(Dikirim.next(), Some(Selesai));
        assert_eq!(Selesai.next(), None);
        assert_eq!(Dibatalkan.next(), None);

        for status in ALL {
            if let Some(next) = status.next() {
                assert!(status.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_buckets() {
        assert!(Pending.is_ongoing());
        assert!(Dikirim.is_ongoing());
        assert!(!Selesai.is_ongoing());
        assert!(!Dibatalkan.is_ongoing());

        assert!(Selesai.is_finished());
        assert!(!Dibatalkan.is_finished());
    }

    #[test]
    fn test_parse_and_display() {
        for status in ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }
}
