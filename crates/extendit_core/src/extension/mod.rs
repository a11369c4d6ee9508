//! Extension point contracts.
//!
//! This module defines the holder downstream extension scopes wrap and the
//! type-descriptor layer that decides which types a scope accepts. There is
//! no runtime reflection; assignability is registered per scope.

pub mod point;
pub mod scope;
