//! `Test\Declare`: one method per declared native return type.
//!
//! Each method returns a literal of a native type and lets the conversion
//! into the value box do the widening.

use std::sync::Arc;

use hostbind_core::{NativeError, RegistrationError};
use hostbind_registry::{ClassDescriptor, ClassRegistry, MethodContext, MethodFlags, MethodTable};

pub const NAMESPACE: &str = "Test";
pub const CLASS_NAME: &str = "Declare";

/// Native int.
fn test_declare1(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let a: i32 = 1;
    ctx.set_return(a);
    Ok(())
}

/// Native unsigned int.
fn test_declare2(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let a: u32 = 1;
    ctx.set_return(a);
    Ok(())
}

fn test_declare3(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let a: f64 = 1.0;
    ctx.set_return(a);
    Ok(())
}

fn test_declare4(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let a: f64 = 1.0;
    ctx.set_return(a);
    Ok(())
}

/// Signed byte.
fn test_declare5(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let a = b'A' as i8;
    ctx.set_return(a);
    Ok(())
}

/// Unsigned byte, zero-extended.
fn test_declare6(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let a: u8 = b'A';
    ctx.set_return(a);
    Ok(())
}

pub fn methods() -> MethodTable {
    let none = MethodFlags::empty();
    MethodTable::new()
        .method("testDeclare1", vec![], none, test_declare1)
        .method("testDeclare2", vec![], none, test_declare2)
        .method("testDeclare3", vec![], none, test_declare3)
        .method("testDeclare4", vec![], none, test_declare4)
        .method("testDeclare5", vec![], none, test_declare5)
        .method("testDeclare6", vec![], none, test_declare6)
}

pub fn init(registry: &mut ClassRegistry) -> Result<Arc<ClassDescriptor>, RegistrationError> {
    registry.install(ClassDescriptor::register(CLASS_NAME, NAMESPACE, methods())?)
}
