//! Extension point holder and its type-erased capability.
//!
//! # Responsibility
//! - Record what an extension scope operates on: a live value or a type.
//! - Expose a typed view on the holder and an erased view through `ExtensionPoint`.
//!
//! # Invariants
//! - Exactly one construction path per holder; the value path never sets an
//!   explicit type.
//! - An explicit type is always assignable to the scope and kept exactly as given.
//! - Holders are immutable after construction.

use crate::extension::scope::{Scope, TypeDescriptor};
use log::debug;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Capability shared by every extension point, independent of its scope.
pub trait ExtensionPoint: Send + Sync {
    /// The forwarded value, erased.
    fn extended_value(&self) -> &dyn Any;

    /// The forwarded type: explicit type, else the value's concrete type, else
    /// the declared scope type.
    fn extended_type(&self) -> TypeDescriptor;
}

/// Holder that downstream extension scopes wrap to learn what they extend.
///
/// ```
/// use extendit_core::{ExtensionPointBase, TypeDescriptor};
///
/// struct Digits(ExtensionPointBase<u32>);
///
/// impl Digits {
///     fn count(&self) -> u32 {
///         self.0.extended_value().checked_ilog10().unwrap_or(0) + 1
///     }
/// }
///
/// let digits = Digits(ExtensionPointBase::new(1234));
/// assert_eq!(digits.count(), 4);
/// assert_eq!(digits.0.extended_type(), TypeDescriptor::of::<u32>());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionPointBase<T: Scope> {
    value: T,
    explicit_type: Option<TypeDescriptor>,
}

impl<T: Scope> ExtensionPointBase<T> {
    /// Creates an extension point from the extended value.
    pub fn new(value: T) -> Self {
        Self {
            value,
            explicit_type: None,
        }
    }

    /// Creates an extension point from the extended type alone.
    ///
    /// The held value is `T::default()`.
    ///
    /// # Errors
    /// - `MissingType` when no descriptor is supplied.
    /// - `IncompatibleType` when `ty` is not assignable to `T`.
    pub fn from_type(
        ty: impl Into<Option<TypeDescriptor>>,
    ) -> Result<Self, ExtensionPointError> {
        let Some(ty) = ty.into() else {
            debug!(
                "event=extension_point_rejected module=extension status=error reason=missing_type scope={}",
                T::scope_type()
            );
            return Err(ExtensionPointError::MissingType);
        };

        if !T::is_assignable_from(&ty) {
            debug!(
                "event=extension_point_rejected module=extension status=error reason=incompatible_type scope={} type={}",
                T::scope_type(),
                ty
            );
            return Err(ExtensionPointError::IncompatibleType {
                scope: T::scope_type(),
                actual: ty,
            });
        }

        Ok(Self {
            value: T::default(),
            explicit_type: Some(ty),
        })
    }

    /// The forwarded value, typed.
    pub fn extended_value(&self) -> &T {
        &self.value
    }

    /// The forwarded type, resolved like `ExtensionPoint::extended_type`.
    pub fn extended_type(&self) -> TypeDescriptor {
        self.explicit_type
            .or_else(|| self.value.runtime_type())
            .unwrap_or_else(T::scope_type)
    }

    /// Type given at construction, `None` for holders built from a value.
    pub fn explicit_type(&self) -> Option<TypeDescriptor> {
        self.explicit_type
    }

    /// Gives back the held value, `T::default()` for type-built holders.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Scope> ExtensionPoint for ExtensionPointBase<T> {
    fn extended_value(&self) -> &dyn Any {
        &self.value
    }

    fn extended_type(&self) -> TypeDescriptor {
        ExtensionPointBase::extended_type(self)
    }
}

impl<T: Scope> From<T> for ExtensionPointBase<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Scope> TryFrom<TypeDescriptor> for ExtensionPointBase<T> {
    type Error = ExtensionPointError;

    fn try_from(ty: TypeDescriptor) -> Result<Self, Self::Error> {
        Self::from_type(ty)
    }
}

/// Extension point construction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionPointError {
    MissingType,
    IncompatibleType {
        scope: TypeDescriptor,
        actual: TypeDescriptor,
    },
}

impl Display for ExtensionPointError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingType => write!(f, "extension point type must be provided"),
            Self::IncompatibleType { scope, actual } => {
                write!(f, "type `{actual}` is not assignable to scope `{scope}`")
            }
        }
    }
}

impl Error for ExtensionPointError {}
