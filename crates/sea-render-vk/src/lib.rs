// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
//! Vulkan device bootstrap and offscreen render-target allocation.
//!
//! [`DeviceContext`] drives a [`Driver`] through instance, physical device,
//! queue family and logical device selection, then allocates
//! [`OffscreenTarget`]s on it. [`AshDriver`] talks to the system Vulkan
//! runtime through `ash`.

pub mod context;
pub mod driver;
pub mod error;
pub mod loader;
pub mod offscreen;
pub mod report;
pub mod select;

#[cfg(test)]
mod mock;

pub use context::{DeviceContext, InstanceConfig, MIN_API_VERSION};
pub use driver::Driver;
pub use error::{BootstrapError, LoaderError, ResourceError};
pub use loader::AshDriver;
pub use offscreen::{OffscreenTarget, COLOR_FORMAT};
pub use report::{ApiVersion, CapabilityReport};
pub use select::{find_memory_type, FirstMatch, Select};
