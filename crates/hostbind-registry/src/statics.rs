//! Static property access.
//!
//! Static properties are declared on class descriptors and stored in the
//! [`Runtime`]. The target of an access is a class name, `self` or
//! `parent`; the latter two resolve against the class the access is made
//! from. Lookups walk the inheritance chain to the declaring class.

use std::sync::Arc;

use hostbind_core::convert::IntoValue;
use hostbind_core::{PropertyError, Runtime, TypeHash, Value};

use crate::class::{ClassDescriptor, PropertyDecl, Visibility};
use crate::registry::ClassRegistry;

/// The class part of a static property access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticTarget<'n> {
    /// `self::$prop`
    SelfClass,
    /// `parent::$prop`
    Parent,
    /// `Name::$prop`
    Class(&'n str),
}

impl<'n> StaticTarget<'n> {
    pub fn parse(target: &'n str) -> Self {
        if target.eq_ignore_ascii_case("self") {
            StaticTarget::SelfClass
        } else if target.eq_ignore_ascii_case("parent") {
            StaticTarget::Parent
        } else {
            StaticTarget::Class(target)
        }
    }
}

struct Resolved {
    declaring: Arc<ClassDescriptor>,
    decl: PropertyDecl,
}

impl Resolved {
    fn slot(&self) -> TypeHash {
        TypeHash::from_static_property(self.declaring.type_hash(), &self.decl.name)
    }
}

fn scope_class(
    registry: &ClassRegistry,
    scope: Option<&str>,
    keyword: &'static str,
) -> Result<Arc<ClassDescriptor>, PropertyError> {
    let scope = scope.ok_or(PropertyError::NoClassScope(keyword))?;
    registry
        .get(scope)
        .ok_or_else(|| PropertyError::UnknownClass(scope.to_string()))
}

fn resolve(
    registry: &ClassRegistry,
    target: &str,
    property: &str,
    scope: Option<&str>,
) -> Result<Resolved, PropertyError> {
    let class = match StaticTarget::parse(target) {
        StaticTarget::SelfClass => scope_class(registry, scope, "self")?,
        StaticTarget::Parent => {
            let current = scope_class(registry, scope, "parent")?;
            registry
                .parent_of(&current)
                .ok_or_else(|| PropertyError::NoParentClass {
                    class: current.qualified_name(),
                    property: property.to_string(),
                })?
        }
        StaticTarget::Class(name) => registry
            .get(name)
            .ok_or_else(|| PropertyError::UnknownClass(name.to_string()))?,
    };

    let mut current = Some(Arc::clone(&class));
    while let Some(candidate) = current {
        if let Some(decl) = candidate.find_property(property) {
            let decl = decl.clone();
            let resolved = Resolved {
                declaring: candidate,
                decl,
            };
            check_access(registry, &resolved, scope)?;
            return Ok(resolved);
        }
        current = registry.parent_of(&candidate);
    }

    Err(PropertyError::UnknownProperty {
        class: class.qualified_name(),
        property: property.to_string(),
    })
}

fn check_access(
    registry: &ClassRegistry,
    resolved: &Resolved,
    scope: Option<&str>,
) -> Result<(), PropertyError> {
    let declaring = &resolved.declaring;
    let name = &resolved.decl.name;
    if !resolved.decl.is_static {
        return Err(PropertyError::NotStatic {
            class: declaring.qualified_name(),
            property: name.clone(),
        });
    }

    let scope = scope.and_then(|s| registry.get(s));
    match resolved.decl.visibility {
        Visibility::Public => Ok(()),
        Visibility::Private => match scope {
            Some(scope) if scope.type_hash() == declaring.type_hash() => Ok(()),
            _ => Err(PropertyError::PrivateAccess {
                class: declaring.qualified_name(),
                property: name.clone(),
            }),
        },
        Visibility::Protected => match scope {
            Some(scope)
                if registry.is_subclass_of(&scope, declaring.type_hash())
                    || registry.is_subclass_of(declaring, scope.type_hash()) =>
            {
                Ok(())
            }
            _ => Err(PropertyError::ProtectedAccess {
                class: declaring.qualified_name(),
                property: name.clone(),
            }),
        },
    }
}

/// Assign a static property.
///
/// `scope` names the class the assignment is made from; it is required for
/// `self` and `parent` and decides access to non-public properties. The
/// value's heap reference, if any, passes to the property; on failure it is
/// released.
pub fn update_static_property<V: IntoValue>(
    rt: &mut Runtime,
    registry: &ClassRegistry,
    target: &str,
    property: &str,
    value: V,
    scope: Option<&str>,
) -> Result<(), PropertyError> {
    let value = value.into_value();
    match resolve(registry, target, property, scope) {
        Ok(resolved) => {
            tracing::debug!(
                class = %resolved.declaring.name(),
                property,
                value = value.type_name(),
                "static property assigned"
            );
            rt.store_static(resolved.slot(), value);
            Ok(())
        }
        Err(err) => {
            if let Some(handle) = value.heap_handle() {
                rt.heap.release(handle);
            }
            Err(err)
        }
    }
}

/// Read a static property; unassigned properties yield their declared default.
pub fn read_static_property(
    rt: &Runtime,
    registry: &ClassRegistry,
    target: &str,
    property: &str,
    scope: Option<&str>,
) -> Result<Value, PropertyError> {
    let resolved = resolve(registry, target, property, scope)?;
    Ok(rt
        .static_value(resolved.slot())
        .cloned()
        .unwrap_or(resolved.decl.default))
}
