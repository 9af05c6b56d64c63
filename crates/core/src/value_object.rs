//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: they represent
/// concepts where identity doesn't matter, only the values. Two value objects
/// with the same values are the same value.
///
/// - **Value object**: no identity ([`crate::Money`], [`crate::Timestamp`], an
///   invoice line item)
/// - **Entity**: has identity (a customer record with a `CustomerId`)
///
/// To "modify" a value object, create a new one with the new values. The trait
/// requires `Clone` (values are copied, not referenced), `PartialEq` (compared
/// by attributes), and `Debug` (logging, testing).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
