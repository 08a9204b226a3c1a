// SPDX-License-Identifier: CEPL-1.0
//! Device bootstrap and the ownership tree rooted at [`DeviceContext`].
//!
//! ```text
//! instance
//! └── device
//!     ├── graphics queue (not owned)
//!     └── offscreen targets: view, memory, image, command pool
//! ```
//!
//! Everything created through the context stays registered on it, including
//! handles from a half-finished `init` or `create_offscreen_target`, and is
//! released by [`DeviceContext::cleanup`] children first.

use std::ffi::CString;

use ash::vk;
use sea_render::RenderSize;
use tracing::{debug, info};

use crate::driver::Driver;
use crate::error::{BootstrapError, ResourceError};
use crate::offscreen::OffscreenTarget;
use crate::report::{ApiVersion, CapabilityReport};
use crate::select::{select_queue_family, FirstMatch, Select};

/// Minimum Vulkan version requested at instance creation.
pub const MIN_API_VERSION: u32 = vk::API_VERSION_1_2;

/// Application/engine identity sent with `vkCreateInstance`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceConfig {
  pub application_name: CString,
  pub application_version: ApiVersion,
  pub engine_name: CString,
  pub engine_version: ApiVersion,
}

impl Default for InstanceConfig {
  fn default() -> Self {
    Self {
      application_name: CString::from(c"sea"),
      application_version: ApiVersion::new(1, 0, 0),
      engine_name: CString::default(),
      engine_version: ApiVersion::new(1, 0, 0),
    }
  }
}

/// Instance, physical device, logical device and graphics queue, plus every
/// resource allocated through them. Move-only; dropping it tears it down.
pub struct DeviceContext<D: Driver, S: Select = FirstMatch> {
  driver: D,
  policy: S,

  instance: vk::Instance,
  physical_device: vk::PhysicalDevice,
  device: vk::Device,
  graphics_queue: vk::Queue,
  graphics_queue_family: u32,

  report: Option<CapabilityReport>,
  targets: Vec<OffscreenTarget>,
}

impl<D: Driver> DeviceContext<D> {
  pub fn new(driver: D) -> Self {
    Self::with_policy(driver, FirstMatch)
  }
}

impl<D: Driver, S: Select> DeviceContext<D, S> {
  pub fn with_policy(driver: D, policy: S) -> Self {
    Self {
      driver,
      policy,
      instance: vk::Instance::null(),
      physical_device: vk::PhysicalDevice::null(),
      device: vk::Device::null(),
      graphics_queue: vk::Queue::null(),
      graphics_queue_family: 0,
      report: None,
      targets: Vec::new(),
    }
  }

  pub fn driver(&self) -> &D {
    &self.driver
  }
  pub fn instance(&self) -> vk::Instance {
    self.instance
  }
  pub fn physical_device(&self) -> vk::PhysicalDevice {
    self.physical_device
  }
  pub fn device(&self) -> vk::Device {
    self.device
  }
  pub fn graphics_queue(&self) -> vk::Queue {
    self.graphics_queue
  }
  pub fn graphics_queue_family(&self) -> u32 {
    self.graphics_queue_family
  }
  pub fn report(&self) -> Option<&CapabilityReport> {
    self.report.as_ref()
  }
  pub fn targets(&self) -> &[OffscreenTarget] {
    &self.targets
  }

  /// True once a device and queue exist.
  pub fn is_ready(&self) -> bool {
    self.device != vk::Device::null() && self.graphics_queue != vk::Queue::null()
  }

  /// Loader → instance → physical device → queue family → device → queue.
  /// Stops at the first failing step; whatever exists stays on the context
  /// until [`cleanup`](Self::cleanup). Errors are returned, not logged at
  /// `error` level; reporting them is the caller's job.
  pub fn init(&mut self, cfg: &InstanceConfig) -> Result<(), BootstrapError> {
    let res = self.bootstrap(cfg);
    if let Err(e) = &res {
      debug!("vulkan bootstrap stopped: {e}");
    }
    res
  }

  fn bootstrap(&mut self, cfg: &InstanceConfig) -> Result<(), BootstrapError> {
    if self.instance != vk::Instance::null() {
      return Err(BootstrapError::AlreadyInitialized);
    }

    self.driver.initialize().map_err(BootstrapError::LoaderUnavailable)?;

    // --- Instance (instance-level entry points load with it) ---
    let app_info = vk::ApplicationInfo {
      s_type: vk::StructureType::APPLICATION_INFO,
      p_application_name: cfg.application_name.as_ptr(),
      application_version: cfg.application_version.to_raw(),
      p_engine_name: cfg.engine_name.as_ptr(),
      engine_version: cfg.engine_version.to_raw(),
      api_version: MIN_API_VERSION,
      ..Default::default()
    };
    let inst_info = vk::InstanceCreateInfo {
      s_type: vk::StructureType::INSTANCE_CREATE_INFO,
      p_application_info: &app_info,
      ..Default::default()
    };
    // SAFETY: app_info and the config strings outlive the call.
    self.instance =
      unsafe { self.driver.create_instance(&inst_info) }.map_err(BootstrapError::InstanceCreationFailed)?;
    debug!("instance {:?} created", self.instance);

    // --- Physical device ---
    // SAFETY: instance was just created by this driver.
    let devices = unsafe { self.driver.enumerate_physical_devices(self.instance) }
      .map_err(BootstrapError::PhysicalDeviceEnumeration)?;
    let phys_idx = self
      .policy
      .select(&devices, |_, _| true)
      .ok_or(BootstrapError::NoPhysicalDevice)?;
    self.physical_device = devices[phys_idx];
    debug!("picked physical device {} of {}", phys_idx, devices.len());

    // --- Graphics queue family ---
    // SAFETY: physical_device was enumerated from our instance.
    let families = unsafe { self.driver.queue_family_properties(self.physical_device) };
    let family = select_queue_family(&self.policy, &families).ok_or(BootstrapError::NoGraphicsQueueFamily)?;

    // --- Device + queue (device-level entry points load with it) ---
    let priorities = [1.0_f32];
    let qinfo = vk::DeviceQueueCreateInfo {
      s_type: vk::StructureType::DEVICE_QUEUE_CREATE_INFO,
      queue_family_index: family,
      queue_count: 1,
      p_queue_priorities: priorities.as_ptr(),
      ..Default::default()
    };
    let dinfo = vk::DeviceCreateInfo {
      s_type: vk::StructureType::DEVICE_CREATE_INFO,
      queue_create_info_count: 1,
      p_queue_create_infos: &qinfo,
      ..Default::default()
    };
    // SAFETY: qinfo and priorities outlive the call; family belongs to phys.
    self.device = unsafe { self.driver.create_device(self.physical_device, &dinfo) }
      .map_err(BootstrapError::DeviceCreationFailed)?;
    self.graphics_queue_family = family;
    // SAFETY: device was created with one queue in `family`.
    self.graphics_queue = unsafe { self.driver.get_device_queue(self.device, family, 0) };

    // --- Capability report (info only) ---
    // SAFETY: physical_device is still valid; the instance is alive.
    let props = unsafe { self.driver.physical_device_properties(self.physical_device) };
    let report = CapabilityReport::new(&props, &families, family);
    for line in report.to_string().lines() {
      info!("{line}");
    }
    self.report = Some(report);
    Ok(())
  }

  /// Creates an offscreen RGBA8 target of `size` on the graphics queue family.
  /// On failure the partially built target stays registered and is released by
  /// [`cleanup`](Self::cleanup).
  pub fn create_offscreen_target(&mut self, size: RenderSize) -> Result<&OffscreenTarget, ResourceError> {
    if !self.is_ready() {
      return Err(ResourceError::NotInitialized);
    }
    if size.is_empty() {
      return Err(ResourceError::ZeroExtent(size));
    }

    self.targets.push(OffscreenTarget::empty(size));
    let Self { driver, policy, targets, device, physical_device, graphics_queue_family, .. } = self;
    let idx = targets.len() - 1;

    // SAFETY: device/physical_device are the live handles from bootstrap.
    let res = unsafe { targets[idx].allocate(driver, policy, *device, *physical_device, *graphics_queue_family) };
    match res {
      Ok(()) => {
        info!("offscreen target ready ({}, {:?})", size, targets[idx].format());
        Ok(&targets[idx])
      }
      Err(e) => {
        debug!("offscreen target {} stopped: {e}", size);
        Err(e)
      }
    }
  }

  /// Releases targets (newest first), then the device, then the instance, and
  /// resets every handle to null. Calling it again does nothing.
  pub fn cleanup(&mut self) {
    if self.device != vk::Device::null() {
      while let Some(mut target) = self.targets.pop() {
        // SAFETY: the device that owns the target is still alive.
        unsafe { target.release(&mut self.driver, self.device) };
      }
      debug!("destroying device {:?}", self.device);
      // SAFETY: every child of the device has been released above.
      unsafe { self.driver.destroy_device(self.device) };
    }
    self.targets.clear();
    self.device = vk::Device::null();
    self.graphics_queue = vk::Queue::null();

    if self.instance != vk::Instance::null() {
      debug!("destroying instance {:?}", self.instance);
      // SAFETY: the device is gone; nothing else hangs off the instance.
      unsafe { self.driver.destroy_instance(self.instance) };
    }
    self.instance = vk::Instance::null();
    self.physical_device = vk::PhysicalDevice::null();
    self.graphics_queue_family = 0;
    self.report = None;
  }
}

impl<D: Driver, S: Select> Drop for DeviceContext<D, S> {
  fn drop(&mut self) {
    self.cleanup();
  }
}
