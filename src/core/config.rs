//! Configuration for bridge construction and engine resource tuning
//!
//! The hosting display yields a density and a device profile. The profile only
//! parameterizes the engine's internal resource budgets; the bridge itself
//! never looks at it again after construction.

use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// What the hosting display and device report at construction time
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayContext {
    /// Display density ratio (physical pixels per logical unit)
    pub density: f32,
    pub available_processors: i32,
    /// Memory currently available to the process, in bytes
    pub available_memory: i64,
    /// Total device memory in bytes, when the platform can report it
    pub total_memory: Option<i64>,
}

impl DisplayContext {
    pub fn new(density: f32) -> Self {
        let processors = std::thread::available_parallelism()
            .map(|n| n.get() as i32)
            .unwrap_or(1);
        Self {
            density,
            available_processors: processors,
            available_memory: 2048 * MIB as i64,
            total_memory: None,
        }
    }

    pub fn with_processors(mut self, processors: i32) -> Self {
        self.available_processors = processors;
        self
    }

    pub fn with_memory(mut self, available: i64, total: Option<i64>) -> Self {
        self.available_memory = available;
        self.total_memory = total;
        self
    }

    /// Validates the reported values; total memory falls back to available memory
    pub fn device_profile(&self) -> Result<DeviceProfile> {
        if self.available_processors < 0 {
            return Err(MapError::InvalidArgument(
                "availableProcessors cannot be negative.".to_string(),
            ));
        }
        let total_memory = self.total_memory.unwrap_or(self.available_memory);
        if total_memory < 0 {
            return Err(MapError::InvalidArgument(
                "totalMemory cannot be negative.".to_string(),
            ));
        }
        Ok(DeviceProfile {
            available_processors: self.available_processors as u32,
            total_memory: total_memory as u64,
        })
    }
}

/// Validated CPU/memory profile handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub available_processors: u32,
    pub total_memory: u64,
}

impl DeviceProfile {
    /// Picks the resource tier matching this device
    pub fn resource_profile(&self) -> ResourceProfile {
        if self.total_memory < 1024 * MIB || self.available_processors <= 2 {
            ResourceProfile::Low
        } else if self.total_memory >= 4096 * MIB && self.available_processors >= 8 {
            ResourceProfile::High
        } else {
            ResourceProfile::Balanced
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResourceProfile {
    Low,
    Balanced,
    High,
    Custom(ResourceBudget),
}

impl ResourceProfile {
    pub fn resolve(&self) -> ResourceBudget {
        match self {
            Self::Low => ResourceBudget {
                tile_cache_bytes: 32 * MIB,
                worker_threads: 1,
                glyph_atlas_max_bytes: 512_000,
                max_concurrent_requests: 4,
            },
            Self::Balanced => ResourceBudget {
                tile_cache_bytes: 128 * MIB,
                worker_threads: 2,
                glyph_atlas_max_bytes: 2_000_000,
                max_concurrent_requests: 8,
            },
            Self::High => ResourceBudget {
                tile_cache_bytes: 512 * MIB,
                worker_threads: 4,
                glyph_atlas_max_bytes: 8_000_000,
                max_concurrent_requests: 16,
            },
            Self::Custom(budget) => budget.clone(),
        }
    }
}

impl Default for ResourceProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

/// Engine-internal resource limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBudget {
    pub tile_cache_bytes: u64,
    pub worker_threads: u32,
    pub glyph_atlas_max_bytes: u64,
    pub max_concurrent_requests: u32,
}

impl Default for ResourceBudget {
    fn default() -> Self {
        ResourceProfile::default().resolve()
    }
}

/// Options applied to the engine right after construction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeOptions {
    pub api_base_url: Option<String>,
    pub style_url: Option<String>,
    pub debug: bool,
    pub fps_overlay: bool,
    /// Overrides the tier derived from the device profile
    pub resource_profile: Option<ResourceProfile>,
}

impl BridgeOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_style_url(mut self, url: impl Into<String>) -> Self {
        self.style_url = Some(url.into());
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn budget_for(&self, device: &DeviceProfile) -> ResourceBudget {
        self.resource_profile
            .clone()
            .unwrap_or_else(|| device.resource_profile())
            .resolve()
    }
}
