// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use sea_render::RenderSize;
use tracing::debug;

use crate::driver::Driver;
use crate::error::ResourceError;
use crate::select::{find_memory_type, Select};

pub const COLOR_FORMAT: vk::Format = vk::Format::R8G8B8A8_UNORM;

/// Offscreen color target: command pool/buffer plus an RGBA8 image with
/// device-local memory and a view. Owned by the `DeviceContext` that created
/// it; handles are null until their creation step succeeds.
#[derive(Debug)]
pub struct OffscreenTarget {
  command_pool: vk::CommandPool,
  command_buffer: vk::CommandBuffer,
  color_image: vk::Image,
  color_memory: vk::DeviceMemory,
  color_view: vk::ImageView,
  extent: vk::Extent3D,
  format: vk::Format,
}

impl OffscreenTarget {
  pub(crate) fn empty(size: RenderSize) -> Self {
    Self {
      command_pool: vk::CommandPool::null(),
      command_buffer: vk::CommandBuffer::null(),
      color_image: vk::Image::null(),
      color_memory: vk::DeviceMemory::null(),
      color_view: vk::ImageView::null(),
      extent: vk::Extent3D { width: size.width, height: size.height, depth: 1 },
      format: COLOR_FORMAT,
    }
  }

  pub fn command_pool(&self) -> vk::CommandPool {
    self.command_pool
  }
  pub fn command_buffer(&self) -> vk::CommandBuffer {
    self.command_buffer
  }
  pub fn color_image(&self) -> vk::Image {
    self.color_image
  }
  pub fn color_memory(&self) -> vk::DeviceMemory {
    self.color_memory
  }
  pub fn color_view(&self) -> vk::ImageView {
    self.color_view
  }
  pub fn extent(&self) -> vk::Extent3D {
    self.extent
  }
  pub fn format(&self) -> vk::Format {
    self.format
  }

  /// Runs the creation steps in order, storing each handle as soon as it
  /// exists. Stops at the first failure without releasing anything.
  ///
  /// # Safety
  /// `device` and `phys` must be the live handles `driver` bootstrapped, and
  /// `queue_family` a family of `phys`.
  pub(crate) unsafe fn allocate<D: Driver, S: Select>(
    &mut self,
    driver: &mut D,
    policy: &S,
    device: vk::Device,
    phys: vk::PhysicalDevice,
    queue_family: u32,
  ) -> Result<(), ResourceError> {
    // --- Command pool + one primary buffer ---
    let pool_info = vk::CommandPoolCreateInfo {
      s_type: vk::StructureType::COMMAND_POOL_CREATE_INFO,
      queue_family_index: queue_family,
      flags: vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
      ..Default::default()
    };
    self.command_pool = unsafe { driver.create_command_pool(device, &pool_info) }.map_err(ResourceError::CommandPool)?;

    let alloc_info = vk::CommandBufferAllocateInfo {
      s_type: vk::StructureType::COMMAND_BUFFER_ALLOCATE_INFO,
      command_pool: self.command_pool,
      level: vk::CommandBufferLevel::PRIMARY,
      command_buffer_count: 1,
      ..Default::default()
    };
    let bufs = unsafe { driver.allocate_command_buffers(device, &alloc_info) }.map_err(ResourceError::CommandBuffer)?;
    self.command_buffer = bufs
      .first()
      .copied()
      .ok_or(ResourceError::CommandBuffer(vk::Result::ERROR_UNKNOWN))?;

    // --- Color image ---
    let img_ci = vk::ImageCreateInfo {
      s_type: vk::StructureType::IMAGE_CREATE_INFO,
      image_type: vk::ImageType::TYPE_2D,
      format: self.format,
      extent: self.extent,
      mip_levels: 1,
      array_layers: 1,
      samples: vk::SampleCountFlags::TYPE_1,
      tiling: vk::ImageTiling::OPTIMAL,
      usage: vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_SRC,
      sharing_mode: vk::SharingMode::EXCLUSIVE,
      initial_layout: vk::ImageLayout::UNDEFINED,
      ..Default::default()
    };
    self.color_image = unsafe { driver.create_image(device, &img_ci) }.map_err(ResourceError::Image)?;

    // --- Device-local memory, bound at offset 0 ---
    let mem_req = unsafe { driver.image_memory_requirements(device, self.color_image) };
    let mem_props = unsafe { driver.memory_properties(phys) };
    let mem_type_idx = find_memory_type(
      policy,
      &mem_props,
      mem_req.memory_type_bits,
      vk::MemoryPropertyFlags::DEVICE_LOCAL,
    )
    .ok_or(ResourceError::MemoryType { type_bits: mem_req.memory_type_bits })?;
    debug!(
      "offscreen image needs {} bytes, memory type {} (bits 0b{:b})",
      mem_req.size, mem_type_idx, mem_req.memory_type_bits
    );

    let alloc = vk::MemoryAllocateInfo {
      s_type: vk::StructureType::MEMORY_ALLOCATE_INFO,
      allocation_size: mem_req.size,
      memory_type_index: mem_type_idx,
      ..Default::default()
    };
    self.color_memory = unsafe { driver.allocate_memory(device, &alloc) }.map_err(ResourceError::Allocation)?;
    unsafe { driver.bind_image_memory(device, self.color_image, self.color_memory, 0) }.map_err(ResourceError::Bind)?;

    // --- View ---
    let sub = vk::ImageSubresourceRange {
      aspect_mask: vk::ImageAspectFlags::COLOR,
      base_mip_level: 0,
      level_count: 1,
      base_array_layer: 0,
      layer_count: 1,
    };
    let view_ci = vk::ImageViewCreateInfo {
      s_type: vk::StructureType::IMAGE_VIEW_CREATE_INFO,
      image: self.color_image,
      view_type: vk::ImageViewType::TYPE_2D,
      format: self.format,
      subresource_range: sub,
      ..Default::default()
    };
    self.color_view = unsafe { driver.create_image_view(device, &view_ci) }.map_err(ResourceError::View)?;
    Ok(())
  }

  /// Destroys whatever was created, newest first, and nulls the handles.
  ///
  /// # Safety
  /// `device` must still be alive and must be the device these handles were
  /// created on.
  pub(crate) unsafe fn release<D: Driver>(&mut self, driver: &mut D, device: vk::Device) {
    unsafe {
      if self.color_view != vk::ImageView::null() {
        driver.destroy_image_view(device, self.color_view);
        self.color_view = vk::ImageView::null();
      }
      if self.color_memory != vk::DeviceMemory::null() {
        driver.free_memory(device, self.color_memory);
        self.color_memory = vk::DeviceMemory::null();
      }
      if self.color_image != vk::Image::null() {
        driver.destroy_image(device, self.color_image);
        self.color_image = vk::Image::null();
      }
      // Buffers go with their pool.
      if self.command_pool != vk::CommandPool::null() {
        driver.destroy_command_pool(device, self.command_pool);
        self.command_pool = vk::CommandPool::null();
      }
      self.command_buffer = vk::CommandBuffer::null();
    }
  }
}
