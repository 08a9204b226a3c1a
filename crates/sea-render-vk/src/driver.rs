// SPDX-License-Identifier: CEPL-1.0
//! The seam between the bootstrap/allocator logic and the GPU API.
//!
//! [`Driver`] mirrors the handful of Vulkan entry points this crate calls.
//! Handles are plain `ash::vk` handles; the implementation keeps whatever
//! dispatch tables it needs behind them. [`AshDriver`](crate::loader::AshDriver)
//! is the real one.
//!
//! # Safety
//! Every `unsafe fn` here expects its handle arguments to have been returned by
//! the same driver and not yet destroyed, and create-info structs to be valid
//! for the duration of the call (the usual Vulkan valid-usage rules).

use ash::prelude::VkResult;
use ash::vk;

use crate::error::LoaderError;

pub trait Driver {
  /// Resolves global entry points. Must succeed before any other call.
  fn initialize(&mut self) -> Result<(), LoaderError>;

  /// Creates the instance and loads instance-level entry points through it.
  unsafe fn create_instance(&mut self, info: &vk::InstanceCreateInfo<'_>) -> VkResult<vk::Instance>;

  unsafe fn enumerate_physical_devices(&self, instance: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>>;

  unsafe fn physical_device_properties(&self, phys: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties;

  unsafe fn queue_family_properties(&self, phys: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;

  unsafe fn memory_properties(&self, phys: vk::PhysicalDevice) -> vk::PhysicalDeviceMemoryProperties;

  /// Creates the logical device and loads device-level entry points through it.
  unsafe fn create_device(
    &mut self,
    phys: vk::PhysicalDevice,
    info: &vk::DeviceCreateInfo<'_>,
  ) -> VkResult<vk::Device>;

  unsafe fn get_device_queue(&self, device: vk::Device, family: u32, index: u32) -> vk::Queue;

  unsafe fn create_command_pool(
    &mut self,
    device: vk::Device,
    info: &vk::CommandPoolCreateInfo<'_>,
  ) -> VkResult<vk::CommandPool>;

  unsafe fn allocate_command_buffers(
    &mut self,
    device: vk::Device,
    info: &vk::CommandBufferAllocateInfo<'_>,
  ) -> VkResult<Vec<vk::CommandBuffer>>;

  unsafe fn create_image(&mut self, device: vk::Device, info: &vk::ImageCreateInfo<'_>) -> VkResult<vk::Image>;

  unsafe fn image_memory_requirements(&self, device: vk::Device, image: vk::Image) -> vk::MemoryRequirements;

  unsafe fn allocate_memory(
    &mut self,
    device: vk::Device,
    info: &vk::MemoryAllocateInfo<'_>,
  ) -> VkResult<vk::DeviceMemory>;

  unsafe fn bind_image_memory(
    &mut self,
    device: vk::Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    offset: vk::DeviceSize,
  ) -> VkResult<()>;

  unsafe fn create_image_view(
    &mut self,
    device: vk::Device,
    info: &vk::ImageViewCreateInfo<'_>,
  ) -> VkResult<vk::ImageView>;

  unsafe fn destroy_image_view(&mut self, device: vk::Device, view: vk::ImageView);

  unsafe fn free_memory(&mut self, device: vk::Device, memory: vk::DeviceMemory);

  unsafe fn destroy_image(&mut self, device: vk::Device, image: vk::Image);

  /// Also frees every command buffer allocated from `pool`.
  unsafe fn destroy_command_pool(&mut self, device: vk::Device, pool: vk::CommandPool);

  /// Drops the device-level dispatch table with the device.
  unsafe fn destroy_device(&mut self, device: vk::Device);

  /// Drops the instance-level dispatch table with the instance.
  unsafe fn destroy_instance(&mut self, instance: vk::Instance);
}
