//! VM manifest model
//!
//! Typed KubeVirt-style resources built by the VM creation wizard:
//! the `VirtualMachine` custom resource, the template catalog entry it is
//! compiled from, and quantity helpers for storage sizes.

pub mod error;
pub mod quantity;
pub mod template;
pub mod vm;

pub use error::*;
pub use quantity::*;
pub use template::*;
pub use vm::*;
