// SPDX-License-Identifier: CEPL-1.0
//! Runtime-loaded Vulkan entry points, resolved in three phases.
//!
//! [`GlobalFns`] comes from the dynamically loaded runtime, [`InstanceFns`]
//! can only be produced by a `GlobalFns` creating an instance, and
//! [`DeviceFns`] only by an `InstanceFns` creating a device. The types make it
//! impossible to load a later phase before its predecessor.

use ash::prelude::VkResult;
use ash::{vk, Entry};
use tracing::debug;

use crate::driver::Driver;
use crate::error::LoaderError;

/// Phase 1: global entry points (`vkCreateInstance`, enumeration).
pub struct GlobalFns {
  entry: Entry,
}

/// Phase 2: entry points dispatched through a live instance.
pub struct InstanceFns {
  instance: ash::Instance,
}

/// Phase 3: entry points dispatched through a live device.
pub struct DeviceFns {
  device: ash::Device,
}

impl GlobalFns {
  pub fn load() -> Result<Self, LoaderError> {
    // SAFETY: the runtime library is kept alive by the returned Entry.
    let entry = unsafe { Entry::load() }.map_err(|e| LoaderError(e.to_string()))?;
    Ok(Self { entry })
  }

  /// # Safety
  /// `info` must satisfy the `vkCreateInstance` valid-usage rules.
  pub unsafe fn create_instance(&self, info: &vk::InstanceCreateInfo<'_>) -> VkResult<InstanceFns> {
    let instance = unsafe { self.entry.create_instance(info, None) }?;
    debug!("loaded instance entry points for {:?}", instance.handle());
    Ok(InstanceFns { instance })
  }
}

impl InstanceFns {
  pub fn handle(&self) -> vk::Instance {
    self.instance.handle()
  }

  /// # Safety
  /// `phys` must come from this instance; `info` must satisfy the
  /// `vkCreateDevice` valid-usage rules.
  pub unsafe fn create_device(&self, phys: vk::PhysicalDevice, info: &vk::DeviceCreateInfo<'_>) -> VkResult<DeviceFns> {
    let device = unsafe { self.instance.create_device(phys, info, None) }?;
    debug!("loaded device entry points for {:?}", device.handle());
    Ok(DeviceFns { device })
  }
}

impl DeviceFns {
  pub fn handle(&self) -> vk::Device {
    self.device.handle()
  }
}

/// [`Driver`] backed by the system Vulkan runtime.
#[derive(Default)]
pub struct AshDriver {
  global: Option<GlobalFns>,
  instance: Option<InstanceFns>,
  device: Option<DeviceFns>,
}

impl AshDriver {
  pub fn new() -> Self {
    Self::default()
  }

  fn instance_fns(&self, instance: vk::Instance) -> VkResult<&ash::Instance> {
    match &self.instance {
      Some(fns) if fns.handle() == instance => Ok(&fns.instance),
      _ => Err(vk::Result::ERROR_INITIALIZATION_FAILED),
    }
  }

  fn any_instance_fns(&self) -> Option<&ash::Instance> {
    self.instance.as_ref().map(|fns| &fns.instance)
  }

  fn device_fns(&self, device: vk::Device) -> VkResult<&ash::Device> {
    match &self.device {
      Some(fns) if fns.handle() == device => Ok(&fns.device),
      _ => Err(vk::Result::ERROR_INITIALIZATION_FAILED),
    }
  }
}

impl Driver for AshDriver {
  fn initialize(&mut self) -> Result<(), LoaderError> {
    if self.global.is_none() {
      self.global = Some(GlobalFns::load()?);
    }
    Ok(())
  }

  unsafe fn create_instance(&mut self, info: &vk::InstanceCreateInfo<'_>) -> VkResult<vk::Instance> {
    let global = self.global.as_ref().ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)?;
    let fns = unsafe { global.create_instance(info) }?;
    let handle = fns.handle();
    self.instance = Some(fns);
    Ok(handle)
  }

  unsafe fn enumerate_physical_devices(&self, instance: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>> {
    let fns = self.instance_fns(instance)?;
    unsafe { fns.enumerate_physical_devices() }
  }

  unsafe fn physical_device_properties(&self, phys: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties {
    match self.any_instance_fns() {
      Some(fns) => unsafe { fns.get_physical_device_properties(phys) },
      None => vk::PhysicalDeviceProperties::default(),
    }
  }

  unsafe fn queue_family_properties(&self, phys: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
    match self.any_instance_fns() {
      Some(fns) => unsafe { fns.get_physical_device_queue_family_properties(phys) },
      None => Vec::new(),
    }
  }

  unsafe fn memory_properties(&self, phys: vk::PhysicalDevice) -> vk::PhysicalDeviceMemoryProperties {
    match self.any_instance_fns() {
      Some(fns) => unsafe { fns.get_physical_device_memory_properties(phys) },
      None => vk::PhysicalDeviceMemoryProperties::default(),
    }
  }

  unsafe fn create_device(&mut self, phys: vk::PhysicalDevice, info: &vk::DeviceCreateInfo<'_>) -> VkResult<vk::Device> {
    let instance = self.instance.as_ref().ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)?;
    let fns = unsafe { instance.create_device(phys, info) }?;
    let handle = fns.handle();
    self.device = Some(fns);
    Ok(handle)
  }

  unsafe fn get_device_queue(&self, device: vk::Device, family: u32, index: u32) -> vk::Queue {
    match self.device_fns(device) {
      Ok(d) => unsafe { d.get_device_queue(family, index) },
      Err(_) => vk::Queue::null(),
    }
  }

  unsafe fn create_command_pool(&mut self, device: vk::Device, info: &vk::CommandPoolCreateInfo<'_>) -> VkResult<vk::CommandPool> {
    let d = self.device_fns(device)?;
    unsafe { d.create_command_pool(info, None) }
  }

  unsafe fn allocate_command_buffers(
    &mut self,
    device: vk::Device,
    info: &vk::CommandBufferAllocateInfo<'_>,
  ) -> VkResult<Vec<vk::CommandBuffer>> {
    let d = self.device_fns(device)?;
    unsafe { d.allocate_command_buffers(info) }
  }

  unsafe fn create_image(&mut self, device: vk::Device, info: &vk::ImageCreateInfo<'_>) -> VkResult<vk::Image> {
    let d = self.device_fns(device)?;
    unsafe { d.create_image(info, None) }
  }

  unsafe fn image_memory_requirements(&self, device: vk::Device, image: vk::Image) -> vk::MemoryRequirements {
    match self.device_fns(device) {
      Ok(d) => unsafe { d.get_image_memory_requirements(image) },
      Err(_) => vk::MemoryRequirements::default(),
    }
  }

  unsafe fn allocate_memory(&mut self, device: vk::Device, info: &vk::MemoryAllocateInfo<'_>) -> VkResult<vk::DeviceMemory> {
    let d = self.device_fns(device)?;
    unsafe { d.allocate_memory(info, None) }
  }

  unsafe fn bind_image_memory(
    &mut self,
    device: vk::Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    offset: vk::DeviceSize,
  ) -> VkResult<()> {
    let d = self.device_fns(device)?;
    unsafe { d.bind_image_memory(image, memory, offset) }
  }

  unsafe fn create_image_view(&mut self, device: vk::Device, info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView> {
    let d = self.device_fns(device)?;
    unsafe { d.create_image_view(info, None) }
  }

  unsafe fn destroy_image_view(&mut self, device: vk::Device, view: vk::ImageView) {
    if let Ok(d) = self.device_fns(device) {
      unsafe { d.destroy_image_view(view, None) };
    }
  }

  unsafe fn free_memory(&mut self, device: vk::Device, memory: vk::DeviceMemory) {
    if let Ok(d) = self.device_fns(device) {
      unsafe { d.free_memory(memory, None) };
    }
  }

  unsafe fn destroy_image(&mut self, device: vk::Device, image: vk::Image) {
    if let Ok(d) = self.device_fns(device) {
      unsafe { d.destroy_image(image, None) };
    }
  }

  unsafe fn destroy_command_pool(&mut self, device: vk::Device, pool: vk::CommandPool) {
    if let Ok(d) = self.device_fns(device) {
      unsafe { d.destroy_command_pool(pool, None) };
    }
  }

  unsafe fn destroy_device(&mut self, device: vk::Device) {
    if self.device_fns(device).is_err() {
      return;
    }
    if let Some(fns) = self.device.take() {
      unsafe { fns.device.destroy_device(None) };
    }
  }

  unsafe fn destroy_instance(&mut self, instance: vk::Instance) {
    if self.instance_fns(instance).is_err() {
      return;
    }
    // STRICT ORDER: the device table must already be gone.
    debug_assert!(self.device.is_none(), "instance destroyed while device is alive");
    if let Some(fns) = self.instance.take() {
      unsafe { fns.instance.destroy_instance(None) };
    }
  }
}
