//! Component trait and type-erased component access
//!
//! A component is one independently serializable capability of a chunk
//! (blocks, biomes, height maps, ...). Every component has a fixed storage
//! key and establishes its shape at construction; `set` never changes it.

use chunkform_core::{Error, Result, Tag};
use std::any::{type_name, Any};
use std::fmt;

/// A typed chunk component
pub trait Component: Clone + fmt::Debug + Send + Sync + 'static {
    /// Key the component is stored under in the universal tree
    const STORAGE_KEY: &'static str;

    /// The value the component wraps
    type Value: Clone + fmt::Debug + Send + 'static;

    /// Current value
    fn get(&self) -> &Self::Value;

    /// Replace the value
    ///
    /// Fails with [`Error::StructuralMismatch`] if `value` does not fit the
    /// component's shape; the stored value is then unchanged.
    fn set(&mut self, value: Self::Value) -> Result<()>;

    /// Encode for the universal tree
    fn to_tag(&self) -> Tag;

    /// Decode from the universal tree
    fn from_tag(tag: &Tag) -> Result<Self>;
}

/// A value whose concrete type is known only at runtime
pub struct BoxedValue {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl BoxedValue {
    /// Box `value`, remembering its type name for error reporting
    pub fn new<T: Any + Send>(value: T) -> Self {
        BoxedValue {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the boxed type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Take the value back out if it is a `T`
    pub fn downcast<T: Any>(self) -> std::result::Result<T, Self> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(v) => Ok(*v),
            Err(value) => Err(BoxedValue { value, type_name }),
        }
    }
}

impl fmt::Debug for BoxedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Object-safe view of a [`Component`]
pub trait AnyComponent: fmt::Debug + Send + Sync {
    /// Storage key of the concrete component
    fn storage_key(&self) -> &'static str;

    /// Type name of the concrete component's value
    fn value_type_name(&self) -> &'static str;

    /// Encode for the universal tree
    fn to_tag(&self) -> Tag;

    /// Replace the value from a type-erased box
    ///
    /// Fails with [`Error::TypeMismatch`] if the box does not hold the
    /// component's value type.
    fn set_boxed(&mut self, value: BoxedValue) -> Result<()>;

    /// Downcasting support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcasting support
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Clone behind the trait object
    fn clone_boxed(&self) -> Box<dyn AnyComponent>;
}

impl<C: Component> AnyComponent for C {
    fn storage_key(&self) -> &'static str {
        C::STORAGE_KEY
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<C::Value>()
    }

    fn to_tag(&self) -> Tag {
        Component::to_tag(self)
    }

    fn set_boxed(&mut self, value: BoxedValue) -> Result<()> {
        match value.downcast::<C::Value>() {
            Ok(v) => self.set(v),
            Err(other) => Err(Error::type_mismatch(
                type_name::<C::Value>(),
                other.type_name(),
            )),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn AnyComponent> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn AnyComponent> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}
