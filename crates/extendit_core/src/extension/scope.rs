//! Type descriptors and the scope contracts an extension point is generic over.
//!
//! # Responsibility
//! - Name concrete types at runtime through `TypeDescriptor`.
//! - Decide which descriptors may stand in for a scope (`Scope::is_assignable_from`).
//! - Report the concrete type behind a held value, including through `dyn` roots.
//!
//! # Invariants
//! - Descriptor equality is `TypeId` equality; names are informational only.
//! - Value scopes are never empty, so they always report their own type.
//! - Reference scopes admit exactly the types registered on their `Lineage`.

use serde::{Serialize, Serializer};
use std::any::{Any, TypeId};
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Runtime handle naming one concrete (or trait-object) type.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    /// Describes `X`. Unsized types such as `dyn Trait` are accepted.
    pub fn of<X: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<X>(),
            name: std::any::type_name::<X>(),
        }
    }

    /// Describes the concrete type behind `value`, looking through `dyn` roots.
    pub fn of_val<X: Extendable + ?Sized>(value: &X) -> Self {
        <X as Extendable>::concrete_type(value)
    }

    /// Compiler-assigned identity; equality is defined on this alone.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name as reported by the compiler.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns whether this descriptor names `X`.
    pub fn is<X: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<X>()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypeDescriptor").field(&self.name).finish()
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Serialized as the type name; `TypeId` is not stable across builds.
impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// Object-safe access to the concrete type of a value.
///
/// Implemented for every sized `Any + Send + Sync` type. Make it a supertrait
/// of a lineage root (`trait Shape: Extendable {}`) so `dyn Shape` reports the
/// concrete type it was built from.
pub trait Extendable: Any + Send + Sync {
    fn concrete_type(&self) -> TypeDescriptor;
}

impl<X: Any + Send + Sync> Extendable for X {
    fn concrete_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<X>()
    }
}

/// Explicit assignability table for reference scopes.
///
/// Sized types admit only themselves. Trait-object roots register their
/// members with [`lineage!`](crate::lineage).
pub trait Lineage: 'static {
    /// Declared type reported for an empty reference scope.
    fn root_type() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }

    /// Returns whether `ty` may stand in for this root.
    fn admits(ty: &TypeDescriptor) -> bool;
}

impl<X: Extendable> Lineage for X {
    fn admits(ty: &TypeDescriptor) -> bool {
        ty.is::<X>()
    }
}

/// Conversion of a registered member into its lineage root.
///
/// Generated by [`lineage!`](crate::lineage) next to `Lineage::admits`, so a
/// type converts into a root exactly when the root admits it.
#[doc(hidden)]
pub trait Admits<M>: Lineage {
    fn upcast(member: Arc<M>) -> Arc<Self>;
}

impl<X: Extendable> Admits<X> for X {
    fn upcast(member: Arc<X>) -> Arc<X> {
        member
    }
}

/// Registers a trait-object lineage root and the concrete types assignable to it.
///
/// The root itself is always admitted. Members are listed explicitly; nested
/// lineages are not followed. Only listed members can be wrapped in a
/// [`Member`] of the root.
///
/// ```
/// use extendit_core::{lineage, Extendable, Lineage, TypeDescriptor};
///
/// trait Shape: Extendable {}
/// struct Circle;
/// impl Shape for Circle {}
///
/// lineage!(dyn Shape => Circle);
///
/// assert!(<dyn Shape as Lineage>::admits(&TypeDescriptor::of::<Circle>()));
/// assert!(!<dyn Shape as Lineage>::admits(&TypeDescriptor::of::<u8>()));
/// ```
#[macro_export]
macro_rules! lineage {
    ($root:ty => $($member:ty),+ $(,)?) => {
        impl $crate::Lineage for $root {
            fn admits(ty: &$crate::TypeDescriptor) -> bool {
                ty.is::<$root>() $(|| ty.is::<$member>())+
            }
        }

        $(
            impl $crate::Admits<$member> for $root {
                fn upcast(member: ::std::sync::Arc<$member>) -> ::std::sync::Arc<$root> {
                    member
                }
            }
        )+
    };
}

/// Shared handle to a value from `B`'s lineage.
///
/// Built only from admitted types, so the concrete type behind it always
/// passes `B::admits`.
///
/// ```compile_fail
/// use extendit_core::{lineage, Extendable, Member};
///
/// trait Shape: Extendable {}
/// struct Circle;
/// struct Blob;
/// impl Shape for Circle {}
/// impl Shape for Blob {}
///
/// lineage!(dyn Shape => Circle);
///
/// let _ = Member::<dyn Shape>::new(Blob);
/// ```
pub struct Member<B: ?Sized>(Arc<B>);

impl<B: Lineage + Extendable + ?Sized> Member<B> {
    /// Moves `value` into a new shared allocation.
    pub fn new<M>(value: M) -> Self
    where
        B: Admits<M>,
    {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an existing allocation, keeping pointer identity.
    pub fn from_arc<M>(value: Arc<M>) -> Self
    where
        B: Admits<M>,
    {
        Self(B::upcast(value))
    }

    /// Underlying shared pointer to the root.
    pub fn as_arc(&self) -> &Arc<B> {
        &self.0
    }

    /// Returns whether both handles point at the same allocation.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<B: ?Sized> Clone for Member<B> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<B: ?Sized> Deref for Member<B> {
    type Target = B;

    fn deref(&self) -> &B {
        &self.0
    }
}

impl<B: Extendable + ?Sized> Debug for Member<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Member")
            .field(&<B as Extendable>::concrete_type(&self.0))
            .finish()
    }
}

/// Pointer identity, like `Member::ptr_eq`.
impl<B: ?Sized> PartialEq for Member<B> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A type usable as the generic scope of an extension point.
///
/// The default value is what a holder built from a type descriptor carries.
pub trait Scope: Default + Send + Sync + 'static {
    /// Static declared type of the scope.
    fn scope_type() -> TypeDescriptor;

    /// Returns whether a holder for this scope may be built from `ty`.
    fn is_assignable_from(ty: &TypeDescriptor) -> bool;

    /// Concrete type of the held value, `None` when the value is absent.
    fn runtime_type(&self) -> Option<TypeDescriptor>;
}

/// Implements [`Scope`] for value kinds: types that always hold a value.
///
/// ```
/// use extendit_core::{value_scope, Scope, TypeDescriptor};
///
/// #[derive(Default)]
/// struct Meters(f64);
///
/// value_scope!(Meters);
///
/// assert_eq!(Meters::scope_type(), TypeDescriptor::of::<Meters>());
/// ```
#[macro_export]
macro_rules! value_scope {
    ($($scope:ty),+ $(,)?) => {
        $(
            impl $crate::Scope for $scope {
                fn scope_type() -> $crate::TypeDescriptor {
                    $crate::TypeDescriptor::of::<$scope>()
                }

                fn is_assignable_from(ty: &$crate::TypeDescriptor) -> bool {
                    ty.is::<$scope>()
                }

                fn runtime_type(&self) -> ::std::option::Option<$crate::TypeDescriptor> {
                    ::std::option::Option::Some($crate::TypeDescriptor::of::<$scope>())
                }
            }
        )+
    };
}

value_scope!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    String, ()
);

/// Reference scope: either empty or a member of `B`'s lineage.
impl<B> Scope for Option<Member<B>>
where
    B: Lineage + Extendable + ?Sized,
{
    fn scope_type() -> TypeDescriptor {
        B::root_type()
    }

    fn is_assignable_from(ty: &TypeDescriptor) -> bool {
        B::admits(ty)
    }

    fn runtime_type(&self) -> Option<TypeDescriptor> {
        self.as_deref().map(<B as Extendable>::concrete_type)
    }
}

#[cfg(test)]
mod tests {
    use super::{Extendable, Lineage, Member, Scope, TypeDescriptor};
    use std::any::Any;
    use std::collections::HashSet;
    use std::sync::Arc;

    trait Vehicle: Extendable {}

    struct Car;
    struct Truck;
    struct Boat;

    impl Vehicle for Car {}
    impl Vehicle for Truck {}

    crate::lineage!(dyn Vehicle => Car, Truck);

    #[test]
    fn descriptors_compare_by_type_identity() {
        assert_eq!(TypeDescriptor::of::<u32>(), TypeDescriptor::of::<u32>());
        assert_ne!(TypeDescriptor::of::<u32>(), TypeDescriptor::of::<i32>());
        assert_ne!(TypeDescriptor::of::<dyn Any>(), TypeDescriptor::of::<u32>());

        let set: HashSet<_> = [TypeDescriptor::of::<u8>(), TypeDescriptor::of::<u8>()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display_prints_type_name() {
        assert_eq!(TypeDescriptor::of::<u64>().to_string(), "u64");
        assert!(TypeDescriptor::of::<dyn Vehicle>().name().contains("Vehicle"));
    }

    #[test]
    fn of_val_looks_through_trait_objects() {
        let vehicle: Arc<dyn Vehicle> = Arc::new(Truck);
        assert_eq!(
            TypeDescriptor::of_val(vehicle.as_ref()),
            TypeDescriptor::of::<Truck>()
        );
    }

    #[test]
    fn sized_lineage_admits_only_itself() {
        assert!(<Boat as Lineage>::admits(&TypeDescriptor::of::<Boat>()));
        assert!(!<Boat as Lineage>::admits(&TypeDescriptor::of::<Car>()));
        assert_eq!(<Boat as Lineage>::root_type(), TypeDescriptor::of::<Boat>());
    }

    #[test]
    fn registered_lineage_admits_root_and_members() {
        assert!(<dyn Vehicle as Lineage>::admits(&TypeDescriptor::of::<dyn Vehicle>()));
        assert!(<dyn Vehicle as Lineage>::admits(&TypeDescriptor::of::<Car>()));
        assert!(<dyn Vehicle as Lineage>::admits(&TypeDescriptor::of::<Truck>()));
        assert!(!<dyn Vehicle as Lineage>::admits(&TypeDescriptor::of::<Boat>()));
        assert!(!<dyn Vehicle as Lineage>::admits(&TypeDescriptor::of::<dyn Any>()));
    }

    #[test]
    fn value_scope_reports_own_type_for_zero_value() {
        assert_eq!(0_i32.runtime_type(), Some(TypeDescriptor::of::<i32>()));
        assert_eq!(String::new().runtime_type(), Some(TypeDescriptor::of::<String>()));
        assert!(!i32::is_assignable_from(&TypeDescriptor::of::<i64>()));
    }

    #[test]
    fn reference_scope_reports_root_when_empty() {
        let empty: Option<Member<dyn Vehicle>> = None;
        assert_eq!(empty.runtime_type(), None);
        assert_eq!(
            <Option<Member<dyn Vehicle>>>::scope_type(),
            TypeDescriptor::of::<dyn Vehicle>()
        );

        let car = Some(Member::<dyn Vehicle>::new(Car));
        assert_eq!(car.runtime_type(), Some(TypeDescriptor::of::<Car>()));
    }

    #[test]
    fn member_types_are_always_admitted_by_their_root() {
        let members = [
            Member::<dyn Vehicle>::new(Car),
            Member::<dyn Vehicle>::new(Truck),
        ];
        for member in &members {
            let ty = TypeDescriptor::of_val(&**member);
            assert!(<dyn Vehicle as Lineage>::admits(&ty));
            assert!(<Option<Member<dyn Vehicle>>>::is_assignable_from(&ty));
        }
    }

    #[test]
    fn member_keeps_allocation_identity() {
        let truck = Arc::new(Truck);
        let member = Member::<dyn Vehicle>::from_arc(Arc::clone(&truck));
        let copy = member.clone();

        assert!(Member::ptr_eq(&member, &copy));
        assert_eq!(member, copy);
        assert!(!Member::ptr_eq(&member, &Member::new(Truck)));
        assert_eq!(
            format!("{member:?}"),
            format!("Member({:?})", TypeDescriptor::of::<Truck>())
        );
        assert_eq!(Arc::strong_count(&truck), 3);
    }
}
