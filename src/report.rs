//! Report model: one struct per section, every attribute resolved through
//! its probe chain exactly once per run. `None` means no probe answered;
//! the presentation layer decides how to spell that out.

use serde::Serialize;

use crate::{board, cache, cpu, gpu, memory};

#[derive(Clone, Debug, Serialize)]
pub struct CpuReport {
    pub vendor: Option<String>,
    pub brand: Option<String>,
    pub family: Option<u32>,
    pub model: Option<u32>,
    pub stepping: Option<u32>,
    pub physical_cores: Option<u32>,
    pub logical_processors: Option<u32>,
    pub current_clock: Option<String>,
    pub max_clock: Option<String>,
    pub clock_limit: Option<String>,
    pub caches: Vec<cache::CacheRow>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BoardReport {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub bus_specs: String,
    pub bios_brand: Option<String>,
    pub bios_version: Option<String>,
    pub bios_date: Option<String>,
    pub chipset: Vec<board::ChipsetRow>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MemoryReport {
    pub kind: Option<String>,
    pub size: Option<String>,
    pub channels: Option<String>,
    pub frequency: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GraphicsReport {
    pub name: Option<String>,
    pub board_manufacturer: Option<String>,
    pub tdp: Option<String>,
    pub base_clock: Option<String>,
    pub vram_size: Option<String>,
    pub vram_type: Option<String>,
    pub vram_vendor: Option<String>,
    pub vram_bus_width: Option<String>,
}

/// The full inventory. Sections the user did not select stay `None` and
/// serialize as `null`.
#[derive(Clone, Debug, Serialize)]
pub struct HardwareReport {
    pub generated: String,
    pub cpu: Option<CpuReport>,
    pub mainboard: Option<BoardReport>,
    pub memory: Option<MemoryReport>,
    pub graphics: Option<GraphicsReport>,
}

pub fn collect_cpu() -> CpuReport {
    let id = cpu::identity();
    let clocks = cpu::clocks();
    CpuReport {
        vendor: id
            .as_ref()
            .map(|i| cpu::vendor_name(&i.vendor_id).to_string()),
        brand: id.as_ref().and_then(|i| {
            if i.brand.is_empty() { None } else { Some(i.brand.clone()) }
        }),
        family: id.as_ref().map(|i| i.family),
        model: id.as_ref().map(|i| i.model),
        stepping: id.as_ref().map(|i| i.stepping),
        physical_cores: cpu::physical_cores(),
        logical_processors: cpu::logical_processors(),
        current_clock: clocks.map(|c| format!("{} MHz", c.current_mhz)),
        max_clock: clocks.map(|c| format!("{} MHz", c.max_mhz)),
        clock_limit: clocks.map(|c| format!("{} MHz", c.limit_mhz)),
        caches: cache::build_rows(&cache::enumerate()),
    }
}

pub fn collect_board() -> BoardReport {
    BoardReport {
        manufacturer: board::manufacturer(),
        model: board::model(),
        bus_specs: board::bus_specs(),
        bios_brand: board::bios_brand(),
        bios_version: board::bios_version(),
        bios_date: board::bios_date(),
        chipset: board::chipset_rows(),
    }
}

pub fn collect_memory() -> MemoryReport {
    MemoryReport {
        kind: memory::resolve_type(),
        size: memory::resolve_size(),
        channels: memory::resolve_channels(),
        frequency: memory::resolve_frequency(),
    }
}

pub fn collect_graphics() -> GraphicsReport {
    GraphicsReport {
        name: gpu::name(),
        board_manufacturer: gpu::board_manufacturer(),
        tdp: gpu::tdp(),
        base_clock: gpu::base_clock(),
        vram_size: gpu::vram_size(),
        vram_type: gpu::vram_type(),
        vram_vendor: gpu::vram_vendor(),
        vram_bus_width: gpu::vram_bus_width(),
    }
}
