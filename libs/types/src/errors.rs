//! Error types for order state transitions

use crate::ids::OrderId;
use thiserror::Error;

/// Order-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Order {order_id} already in terminal state: {status}")]
    AlreadyTerminal {
        order_id: OrderId,
        status: &'static str,
    },

    #[error("Invalid size: {0}")]
    InvalidSize(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::OrderIdSequence;

    #[test]
    fn test_order_error_display() {
        let mut ids = OrderIdSequence::new();
        let err = OrderError::AlreadyTerminal {
            order_id: ids.next_id(),
            status: "filled",
        };
        assert_eq!(err.to_string(), "Order 1 already in terminal state: filled");
    }

    #[test]
    fn test_invalid_size_display() {
        assert_eq!(OrderError::InvalidSize(0).to_string(), "Invalid size: 0");
    }
}
