//! Native classes built on the adapter layer.
//!
//! - **native_implements** - `Test\Oo\OoNativeImplements`, a class declaring
//!   every host capability with placeholder bodies
//! - **declare** - `Test\Declare`, methods returning each declared native
//!   return type
//!
//! # Usage
//!
//! Each module exposes an `init` function that registers its class:
//!
//! ```
//! use hostbind_registry::ClassRegistry;
//!
//! let mut registry = ClassRegistry::new();
//! hostbind_modules::init(&mut registry).unwrap();
//! assert!(registry.get("Test\\Oo\\OoNativeImplements").is_some());
//! ```

pub mod declare;
pub mod native_implements;

pub use native_implements::OoNativeImplements;

use hostbind_core::RegistrationError;
use hostbind_registry::ClassRegistry;

/// Register every class in this crate.
pub fn init(registry: &mut ClassRegistry) -> Result<(), RegistrationError> {
    native_implements::init(registry)?;
    declare::init(registry)?;
    Ok(())
}
