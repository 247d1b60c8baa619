//! The closed set of bus subjects.

use std::fmt;
use std::str::FromStr;

/// Every subject an event can be published or consumed under.
///
/// The set is closed: adding an event kind means adding a variant here and
/// registering a payload type for it via [`crate::EventData`]. The string
/// forms are the wire-level topic names and must never change shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    UserCreated,
    UserUpdated,
    UserDeleted,
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    CouponCreated,
    CouponUpdated,
    CouponDeleted,
    CartCreated,
    CartUpdated,
    CartDeleted,
    OrderCreated,
    OrderUpdated,
    OrderDeleted,
    OrderDeletedCart,
}

impl Subject {
    /// All subjects, in declaration order.
    pub const ALL: [Subject; 16] = [
        Subject::UserCreated,
        Subject::UserUpdated,
        Subject::UserDeleted,
        Subject::ProductCreated,
        Subject::ProductUpdated,
        Subject::ProductDeleted,
        Subject::CouponCreated,
        Subject::CouponUpdated,
        Subject::CouponDeleted,
        Subject::CartCreated,
        Subject::CartUpdated,
        Subject::CartDeleted,
        Subject::OrderCreated,
        Subject::OrderUpdated,
        Subject::OrderDeleted,
        Subject::OrderDeletedCart,
    ];

    /// The fixed wire-level subject string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Subject::UserCreated => "user:created",
            Subject::UserUpdated => "user:updated",
            Subject::UserDeleted => "user:deleted",
            Subject::ProductCreated => "product:created",
            Subject::ProductUpdated => "product:updated",
            Subject::ProductDeleted => "product:deleted",
            Subject::CouponCreated => "coupon:created",
            Subject::CouponUpdated => "coupon:updated",
            Subject::CouponDeleted => "coupon:deleted",
            Subject::CartCreated => "cart:created",
            Subject::CartUpdated => "cart:updated",
            Subject::CartDeleted => "cart:deleted",
            Subject::OrderCreated => "order:created",
            Subject::OrderUpdated => "order:updated",
            Subject::OrderDeleted => "order:deleted",
            Subject::OrderDeletedCart => "order:deletedCart",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unregistered subject string.
#[derive(Debug, thiserror::Error)]
#[error("unknown subject: {0}")]
pub struct UnknownSubject(pub String);

impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .iter()
            .find(|subject| subject.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownSubject(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_strings_round_trip() {
        for subject in Subject::ALL {
            let parsed: Subject = subject.as_str().parse().unwrap();
            assert_eq!(parsed, subject);
        }
    }

    #[test]
    fn test_subject_strings_are_unique() {
        for (i, a) in Subject::ALL.iter().enumerate() {
            for b in &Subject::ALL[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[test]
    fn test_unknown_subject_is_rejected() {
        assert!("user:exploded".parse::<Subject>().is_err());
        assert!("".parse::<Subject>().is_err());
    }
}
