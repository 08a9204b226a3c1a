// SPDX-License-Identifier: CEPL-1.0
//! Recording [`Driver`] used by the unit tests.

use std::collections::HashSet;

use ash::prelude::VkResult;
use ash::vk::{self, Handle};

use crate::driver::Driver;
use crate::error::LoaderError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Call {
  Initialize,
  CreateInstance,
  CreateDevice,
  CreateCommandPool,
  AllocateCommandBuffers,
  CreateImage,
  AllocateMemory,
  BindImageMemory,
  CreateImageView,
  DestroyImageView,
  FreeMemory,
  DestroyImage,
  DestroyCommandPool,
  DestroyDevice,
  DestroyInstance,
}

pub struct MockDevice {
  pub properties: vk::PhysicalDeviceProperties,
  pub queue_families: Vec<vk::QueueFamilyProperties>,
  pub memory: vk::PhysicalDeviceMemoryProperties,
}

impl MockDevice {
  pub fn new(name: &str, families: &[vk::QueueFlags]) -> Self {
    let mut properties = vk::PhysicalDeviceProperties {
      api_version: vk::make_api_version(0, 1, 3, 250),
      vendor_id: 0x1002,
      device_id: 0x73bf,
      device_type: vk::PhysicalDeviceType::DISCRETE_GPU,
      ..Default::default()
    };
    for (dst, b) in properties.device_name.iter_mut().zip(name.bytes()) {
      *dst = b as std::ffi::c_char;
    }
    let queue_families = families
      .iter()
      .map(|&queue_flags| vk::QueueFamilyProperties { queue_flags, queue_count: 1, ..Default::default() })
      .collect();
    Self { properties, queue_families, memory: Default::default() }
      .with_memory_types(&[vk::MemoryPropertyFlags::DEVICE_LOCAL, vk::MemoryPropertyFlags::HOST_VISIBLE])
  }

  pub fn graphics(name: &str) -> Self {
    Self::new(name, &[vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER])
  }

  pub fn with_memory_types(mut self, flags: &[vk::MemoryPropertyFlags]) -> Self {
    self.memory = vk::PhysicalDeviceMemoryProperties { memory_type_count: flags.len() as u32, ..Default::default() };
    for (slot, &f) in self.memory.memory_types.iter_mut().zip(flags) {
      slot.property_flags = f;
    }
    self
  }
}

/// Copy of the image parameters the allocator asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageRequest {
  pub image_type: vk::ImageType,
  pub format: vk::Format,
  pub extent: vk::Extent3D,
  pub mip_levels: u32,
  pub array_layers: u32,
  pub samples: vk::SampleCountFlags,
  pub tiling: vk::ImageTiling,
  pub usage: vk::ImageUsageFlags,
  pub sharing_mode: vk::SharingMode,
  pub initial_layout: vk::ImageLayout,
}

// ImageSubresourceRange has no PartialEq; tests compare fields.
#[derive(Clone, Copy, Debug)]
pub struct ViewRequest {
  pub image: vk::Image,
  pub view_type: vk::ImageViewType,
  pub format: vk::Format,
  pub range: vk::ImageSubresourceRange,
}

pub struct MockDriver {
  pub devices: Vec<MockDevice>,
  pub fail: Option<Call>,
  pub enumerate_error: Option<vk::Result>,
  /// Report success from `allocate_command_buffers` but hand back no buffers.
  pub no_command_buffers: bool,
  pub image_requirements: vk::MemoryRequirements,

  pub calls: Vec<Call>,
  live: HashSet<u64>,
  next_handle: u64,

  pub api_version: Option<u32>,
  pub application_name: Option<String>,
  pub device_queue: Option<(u32, u32, f32)>,
  pub device_phys: Option<vk::PhysicalDevice>,
  pub pool: Option<(u32, vk::CommandPoolCreateFlags)>,
  pub buffers: Option<(vk::CommandBufferLevel, u32)>,
  pub image: Option<ImageRequest>,
  pub allocation: Option<(vk::DeviceSize, u32)>,
  pub bind: Option<(vk::Image, vk::DeviceMemory, vk::DeviceSize)>,
  pub view: Option<ViewRequest>,
}

impl MockDriver {
  pub fn new(devices: Vec<MockDevice>) -> Self {
    Self {
      devices,
      fail: None,
      enumerate_error: None,
      no_command_buffers: false,
      image_requirements: vk::MemoryRequirements { size: 800 * 600 * 4, alignment: 256, memory_type_bits: 0b11 },
      calls: Vec::new(),
      live: HashSet::new(),
      next_handle: 0x100,
      api_version: None,
      application_name: None,
      device_queue: None,
      device_phys: None,
      pool: None,
      buffers: None,
      image: None,
      allocation: None,
      bind: None,
      view: None,
    }
  }

  pub fn failing_at(mut self, call: Call) -> Self {
    self.fail = Some(call);
    self
  }

  pub fn count(&self, call: Call) -> usize {
    self.calls.iter().filter(|&&c| c == call).count()
  }

  pub fn position(&self, call: Call) -> Option<usize> {
    self.calls.iter().position(|&c| c == call)
  }

  pub fn live_handles(&self) -> usize {
    self.live.len()
  }

  fn record(&mut self, call: Call) -> VkResult<()> {
    self.calls.push(call);
    if self.fail == Some(call) {
      Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY)
    } else {
      Ok(())
    }
  }

  fn mint<H: Handle>(&mut self) -> H {
    self.next_handle += 1;
    self.live.insert(self.next_handle);
    H::from_raw(self.next_handle)
  }

  fn release<H: Handle>(&mut self, handle: H) {
    let raw = handle.as_raw();
    assert!(raw != 0, "null handle released");
    assert!(self.live.remove(&raw), "handle 0x{raw:x} released twice or never created");
  }

  fn device(&self, phys: vk::PhysicalDevice) -> &MockDevice {
    &self.devices[phys.as_raw() as usize - 1]
  }
}

impl Driver for MockDriver {
  fn initialize(&mut self) -> Result<(), LoaderError> {
    self.record(Call::Initialize).map_err(|_| LoaderError("libvulkan.so.1: cannot open shared object file".into()))
  }

  unsafe fn create_instance(&mut self, info: &vk::InstanceCreateInfo<'_>) -> VkResult<vk::Instance> {
    self.record(Call::CreateInstance)?;
    // SAFETY: the caller keeps the application info alive for the call.
    let app = unsafe { &*info.p_application_info };
    self.api_version = Some(app.api_version);
    if !app.p_application_name.is_null() {
      let name = unsafe { std::ffi::CStr::from_ptr(app.p_application_name) };
      self.application_name = Some(name.to_string_lossy().into_owned());
    }
    Ok(self.mint())
  }

  unsafe fn enumerate_physical_devices(&self, _instance: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>> {
    if let Some(err) = self.enumerate_error {
      return Err(err);
    }
    // Physical devices are not owned, so they are not tracked as live.
    Ok((1..=self.devices.len() as u64).map(vk::PhysicalDevice::from_raw).collect())
  }

  unsafe fn physical_device_properties(&self, phys: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties {
    self.device(phys).properties
  }

  unsafe fn queue_family_properties(&self, phys: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
    self.device(phys).queue_families.clone()
  }

  unsafe fn memory_properties(&self, phys: vk::PhysicalDevice) -> vk::PhysicalDeviceMemoryProperties {
    self.device(phys).memory
  }

  unsafe fn create_device(&mut self, phys: vk::PhysicalDevice, info: &vk::DeviceCreateInfo<'_>) -> VkResult<vk::Device> {
    self.record(Call::CreateDevice)?;
    assert_eq!(info.queue_create_info_count, 1);
    // SAFETY: one queue create info with `queue_count` priorities.
    let q = unsafe { &*info.p_queue_create_infos };
    let priority = unsafe { *q.p_queue_priorities };
    self.device_queue = Some((q.queue_family_index, q.queue_count, priority));
    self.device_phys = Some(phys);
    Ok(self.mint())
  }

  unsafe fn get_device_queue(&self, _device: vk::Device, family: u32, index: u32) -> vk::Queue {
    vk::Queue::from_raw(0x9000 + (family as u64) * 16 + index as u64)
  }

  unsafe fn create_command_pool(&mut self, _device: vk::Device, info: &vk::CommandPoolCreateInfo<'_>) -> VkResult<vk::CommandPool> {
    self.record(Call::CreateCommandPool)?;
    self.pool = Some((info.queue_family_index, info.flags));
    Ok(self.mint())
  }

  unsafe fn allocate_command_buffers(
    &mut self,
    _device: vk::Device,
    info: &vk::CommandBufferAllocateInfo<'_>,
  ) -> VkResult<Vec<vk::CommandBuffer>> {
    self.record(Call::AllocateCommandBuffers)?;
    self.buffers = Some((info.level, info.command_buffer_count));
    if self.no_command_buffers {
      return Ok(Vec::new());
    }
    // Buffers die with their pool; only hand out handles.
    Ok((0..info.command_buffer_count as u64).map(|i| vk::CommandBuffer::from_raw(0x7000 + i)).collect())
  }

  unsafe fn create_image(&mut self, _device: vk::Device, info: &vk::ImageCreateInfo<'_>) -> VkResult<vk::Image> {
    self.record(Call::CreateImage)?;
    self.image = Some(ImageRequest {
      image_type: info.image_type,
      format: info.format,
      extent: info.extent,
      mip_levels: info.mip_levels,
      array_layers: info.array_layers,
      samples: info.samples,
      tiling: info.tiling,
      usage: info.usage,
      sharing_mode: info.sharing_mode,
      initial_layout: info.initial_layout,
    });
    Ok(self.mint())
  }

  unsafe fn image_memory_requirements(&self, _device: vk::Device, _image: vk::Image) -> vk::MemoryRequirements {
    self.image_requirements
  }

  unsafe fn allocate_memory(&mut self, _device: vk::Device, info: &vk::MemoryAllocateInfo<'_>) -> VkResult<vk::DeviceMemory> {
    self.record(Call::AllocateMemory)?;
    self.allocation = Some((info.allocation_size, info.memory_type_index));
    Ok(self.mint())
  }

  unsafe fn bind_image_memory(
    &mut self,
    _device: vk::Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    offset: vk::DeviceSize,
  ) -> VkResult<()> {
    self.record(Call::BindImageMemory)?;
    self.bind = Some((image, memory, offset));
    Ok(())
  }

  unsafe fn create_image_view(&mut self, _device: vk::Device, info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView> {
    self.record(Call::CreateImageView)?;
    self.view = Some(ViewRequest {
      image: info.image,
      view_type: info.view_type,
      format: info.format,
      range: info.subresource_range,
    });
    Ok(self.mint())
  }

  unsafe fn destroy_image_view(&mut self, _device: vk::Device, view: vk::ImageView) {
    self.calls.push(Call::DestroyImageView);
    self.release(view);
  }

  unsafe fn free_memory(&mut self, _device: vk::Device, memory: vk::DeviceMemory) {
    self.calls.push(Call::FreeMemory);
    self.release(memory);
  }

  unsafe fn destroy_image(&mut self, _device: vk::Device, image: vk::Image) {
    self.calls.push(Call::DestroyImage);
    self.release(image);
  }

  unsafe fn destroy_command_pool(&mut self, _device: vk::Device, pool: vk::CommandPool) {
    self.calls.push(Call::DestroyCommandPool);
    self.release(pool);
  }

  unsafe fn destroy_device(&mut self, device: vk::Device) {
    self.calls.push(Call::DestroyDevice);
    self.release(device);
  }

  unsafe fn destroy_instance(&mut self, instance: vk::Instance) {
    self.calls.push(Call::DestroyInstance);
    self.release(instance);
  }
}
