// SPDX-License-Identifier: CEPL-1.0
use std::ffi::CString;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use sea_render::RenderSize;
use sea_render_vk::{ApiVersion, InstanceConfig};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppCfg {
    pub instance: InstanceCfg,
    pub target: TargetCfg,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InstanceCfg {
    pub application_name: String,
    pub application_version: [u32; 3],
    pub engine_name: String,
    pub engine_version: [u32; 3],
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TargetCfg {
    pub width: u32,
    pub height: u32,
}

impl Default for InstanceCfg {
    fn default() -> Self {
        InstanceCfg {
            application_name: "sea".to_owned(),
            application_version: [1, 0, 0],
            engine_name: String::new(),
            engine_version: [1, 0, 0],
        }
    }
}

impl Default for TargetCfg {
    fn default() -> Self {
        TargetCfg {
            width: 800,
            height: 600,
        }
    }
}

impl InstanceCfg {
    pub fn to_instance_config(&self) -> Result<InstanceConfig> {
        Ok(InstanceConfig {
            application_name: CString::new(self.application_name.as_str())
                .context("application_name contains a NUL byte")?,
            application_version: packed_version(self.application_version)
                .context("application_version out of range")?,
            engine_name: CString::new(self.engine_name.as_str())
                .context("engine_name contains a NUL byte")?,
            engine_version: packed_version(self.engine_version).context("engine_version out of range")?,
        })
    }
}

/// Vulkan packs major/minor/patch into 7/10/12 bits; wider parts would spill.
fn packed_version([major, minor, patch]: [u32; 3]) -> Result<ApiVersion> {
    ensure!(major <= 0x7f, "major {major} > 127");
    ensure!(minor <= 0x3ff, "minor {minor} > 1023");
    ensure!(patch <= 0xfff, "patch {patch} > 4095");
    Ok(ApiVersion::new(major, minor, patch))
}

impl TargetCfg {
    /// CLI values win over the file.
    pub fn size(&self, width: Option<u32>, height: Option<u32>) -> RenderSize {
        RenderSize::new(width.unwrap_or(self.width), height.unwrap_or(self.height))
    }
}

/// A missing file means defaults; anything unreadable or malformed is an error.
pub fn load_cfg(path: &Path) -> Result<AppCfg> {
    match fs::read_to_string(path) {
        Ok(s) => toml::from_str::<AppCfg>(&s).with_context(|| format!("parse {}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("no config at {}, using defaults", path.display());
            Ok(AppCfg::default())
        }
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}
