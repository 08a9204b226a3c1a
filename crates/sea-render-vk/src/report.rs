// SPDX-License-Identifier: CEPL-1.0
//! Human-readable summary of the selected GPU. Info only; nothing reads it
//! back.

use std::fmt;

use ash::vk;

/// A packed Vulkan API version word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApiVersion(u32);

impl ApiVersion {
  pub const fn from_raw(raw: u32) -> Self {
    Self(raw)
  }

  pub fn new(major: u32, minor: u32, patch: u32) -> Self {
    Self(vk::make_api_version(0, major, minor, patch))
  }

  pub fn major(&self) -> u32 {
    vk::api_version_major(self.0)
  }
  pub fn minor(&self) -> u32 {
    vk::api_version_minor(self.0)
  }
  pub fn patch(&self) -> u32 {
    vk::api_version_patch(self.0)
  }

  pub fn to_raw(&self) -> u32 {
    self.0
  }
}

impl fmt::Display for ApiVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
  }
}

pub fn device_type_label(t: vk::PhysicalDeviceType) -> &'static str {
  match t {
    vk::PhysicalDeviceType::INTEGRATED_GPU => "Integrated GPU",
    vk::PhysicalDeviceType::DISCRETE_GPU => "Discrete GPU",
    vk::PhysicalDeviceType::VIRTUAL_GPU => "Virtual GPU",
    vk::PhysicalDeviceType::CPU => "CPU",
    _ => "Unknown",
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueFamilyLine {
  pub index: u32,
  pub flags: vk::QueueFlags,
  pub count: u32,
}

#[derive(Clone, Debug)]
pub struct CapabilityReport {
  pub device_name: String,
  pub device_type: vk::PhysicalDeviceType,
  pub vendor_id: u32,
  pub device_id: u32,
  pub api_version: ApiVersion,
  pub queue_families: Vec<QueueFamilyLine>,
  pub graphics_queue_family: u32,
}

impl CapabilityReport {
  pub fn new(
    props: &vk::PhysicalDeviceProperties,
    families: &[vk::QueueFamilyProperties],
    graphics_queue_family: u32,
  ) -> Self {
    let device_name = props
      .device_name_as_c_str()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|_| "<unnamed>".to_owned());

    let queue_families = families
      .iter()
      .enumerate()
      .map(|(i, q)| QueueFamilyLine {
        index: i as u32,
        flags: q.queue_flags,
        count: q.queue_count,
      })
      .collect();

    Self {
      device_name,
      device_type: props.device_type,
      vendor_id: props.vendor_id,
      device_id: props.device_id,
      api_version: ApiVersion::from_raw(props.api_version),
      queue_families,
      graphics_queue_family,
    }
  }

  pub fn device_type_label(&self) -> &'static str {
    device_type_label(self.device_type)
  }
}

impl fmt::Display for CapabilityReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "device: {}", self.device_name)?;
    writeln!(f, "type: {}", self.device_type_label())?;
    writeln!(f, "vendor id: 0x{:04x}", self.vendor_id)?;
    writeln!(f, "device id: 0x{:04x}", self.device_id)?;
    writeln!(f, "api version: {}", self.api_version)?;
    for q in &self.queue_families {
      writeln!(
        f,
        "queue family {}: flags=0x{:x} ({:?}) count={}",
        q.index,
        q.flags.as_raw(),
        q.flags,
        q.count
      )?;
    }
    write!(f, "graphics queue family: {}", self.graphics_queue_family)
  }
}
