//! Business logic services for admin.

pub mod selection;
