// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use sea_render::RenderSize;
use thiserror::Error;

/// The Vulkan runtime could not be loaded.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct LoaderError(pub String);

#[derive(Debug, Error)]
pub enum BootstrapError {
  #[error("Vulkan loader unavailable: {0}")]
  LoaderUnavailable(#[source] LoaderError),

  #[error("Failed to create instance: {0}")]
  InstanceCreationFailed(vk::Result),

  #[error("Failed to enumerate physical devices: {0}")]
  PhysicalDeviceEnumeration(vk::Result),

  #[error("No Vulkan physical devices found")]
  NoPhysicalDevice,

  #[error("No graphics queue family on the selected physical device")]
  NoGraphicsQueueFamily,

  #[error("Failed to create logical device: {0}")]
  DeviceCreationFailed(vk::Result),

  #[error("Device context is already initialized")]
  AlreadyInitialized,
}

impl BootstrapError {
  /// Stage label used in the one-line process diagnostic.
  pub fn stage(&self) -> &'static str {
    match self {
      BootstrapError::LoaderUnavailable(_) => "loader",
      BootstrapError::InstanceCreationFailed(_) | BootstrapError::AlreadyInitialized => "instance",
      BootstrapError::PhysicalDeviceEnumeration(_)
      | BootstrapError::NoPhysicalDevice
      | BootstrapError::NoGraphicsQueueFamily
      | BootstrapError::DeviceCreationFailed(_) => "device",
    }
  }
}

/// Offscreen resource creation failed. Handles created before the failing
/// step stay registered on the context and are released by its teardown.
#[derive(Debug, Error)]
pub enum ResourceError {
  #[error("Device context is not initialized")]
  NotInitialized,

  #[error("Offscreen target extent must be non-zero, got {0}")]
  ZeroExtent(RenderSize),

  #[error("Failed to create command pool: {0}")]
  CommandPool(vk::Result),

  #[error("Failed to allocate command buffer: {0}")]
  CommandBuffer(vk::Result),

  #[error("Failed to create image: {0}")]
  Image(vk::Result),

  #[error("No device-local memory type in bitmask 0b{type_bits:b}")]
  MemoryType { type_bits: u32 },

  #[error("Failed to allocate image memory: {0}")]
  Allocation(vk::Result),

  #[error("Failed to bind image memory: {0}")]
  Bind(vk::Result),

  #[error("Failed to create image view: {0}")]
  View(vk::Result),
}

impl ResourceError {
  pub fn stage(&self) -> &'static str {
    match self {
      ResourceError::NotInitialized => "device",
      ResourceError::CommandPool(_) => "command pool",
      ResourceError::CommandBuffer(_) => "command buffers",
      ResourceError::ZeroExtent(_) | ResourceError::Image(_) => "image",
      ResourceError::MemoryType { .. } | ResourceError::Allocation(_) | ResourceError::Bind(_) => "memory",
      ResourceError::View(_) => "image view",
    }
  }
}
