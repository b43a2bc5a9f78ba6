//! Graphics attribute resolvers.
//!
//! Every attribute runs a fixed probe chain: vendor SDKs first (they know
//! the silicon), DXGI and WMI as vendor-neutral last resorts. A chain that
//! comes up empty means the report shows the attribute as unknown.

use crate::adl::AdlSession;
use crate::igcl::IgclSession;
use crate::{chain, dxgi, ids, nvapi, nvgpu, vendors};

/// One `Win32_VideoController` row, reduced to the fields the chains use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmiAdapter {
    pub name: Option<String>,
    pub pnp_device_id: Option<String>,
    pub adapter_ram: Option<u64>,
    pub compatibility: Option<String>,
}

impl WmiAdapter {
    fn is_pci(&self) -> bool {
        self.pnp_device_id
            .as_deref()
            .is_some_and(|id| id.contains("PCI\\"))
    }

    fn ram(&self) -> u64 {
        self.adapter_ram.unwrap_or(0)
    }
}

/// Pick the adapter most likely to be the real GPU: prefer PCI devices
/// over software/USB adapters, then the one with the most VRAM. Ties keep
/// the earlier row.
pub fn best_adapter(adapters: &[WmiAdapter]) -> Option<&WmiAdapter> {
    let mut best: Option<&WmiAdapter> = None;
    for a in adapters {
        let better = match best {
            None => true,
            Some(b) => {
                (a.is_pci() && !b.is_pci())
                    || (a.is_pci() == b.is_pci() && a.ram() > b.ram())
            }
        };
        if better {
            best = Some(a);
        }
    }
    best
}

/// `"8 GBytes"` above 1 GB, `"128 MBytes"` below.
pub fn format_vram(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb >= 1024.0 {
        format!("{:.0} GBytes", mb / 1024.0)
    } else {
        format!("{mb:.0} MBytes")
    }
}

#[cfg(windows)]
fn wmi_adapters() -> Vec<WmiAdapter> {
    #[derive(serde::Deserialize)]
    struct Row {
        #[serde(rename = "Name")]
        name: Option<String>,
        #[serde(rename = "PNPDeviceID")]
        pnp_device_id: Option<String>,
        #[serde(rename = "AdapterRAM")]
        adapter_ram: Option<u64>,
        #[serde(rename = "AdapterCompatibility")]
        compatibility: Option<String>,
    }
    crate::wmi_util::query::<Row>(
        "SELECT Name, PNPDeviceID, AdapterRAM, AdapterCompatibility FROM Win32_VideoController",
    )
    .unwrap_or_default()
    .into_iter()
    .map(|r| WmiAdapter {
        name: r.name,
        pnp_device_id: r.pnp_device_id,
        adapter_ram: r.adapter_ram,
        compatibility: r.compatibility,
    })
    .collect()
}

#[cfg(not(windows))]
fn wmi_adapters() -> Vec<WmiAdapter> {
    Vec::new()
}

pub fn name() -> Option<String> {
    chain::first_hit(&[
        &nvgpu::name,
        &|| AdlSession::try_open().and_then(|s| s.adapter_name()),
        &|| IgclSession::try_open().and_then(|s| s.device_name()),
        &|| {
            let adapters = wmi_adapters();
            best_adapter(&adapters).and_then(|a| a.name.clone())
        },
    ])
}

/// Board partner (ASUS, MSI, ...), resolved from the PCI subsystem vendor
/// wherever it can be found. The raw driver vendor string is the last word.
pub fn board_manufacturer() -> Option<String> {
    chain::first_hit(&[
        &|| {
            let adapters = wmi_adapters();
            let id = best_adapter(&adapters)?.pnp_device_id.clone()?;
            let sub = ids::subsystem_vendor(&id)?;
            vendors::board_partner(sub).map(str::to_string)
        },
        &|| {
            let subsys = nvgpu::pci_subsystem_id()?;
            vendors::board_partner((subsys >> 16) as u16).map(str::to_string)
        },
        &|| {
            let pnp = AdlSession::try_open()?.pnp_string()?;
            let sub = ids::subsystem_vendor(&pnp)?;
            vendors::board_partner(sub).map(str::to_string)
        },
        &|| {
            // integrated Intel never shows up through the NVIDIA/AMD paths
            let adapters = wmi_adapters();
            let id = adapters.iter().find_map(|a| {
                a.pnp_device_id
                    .as_deref()
                    .filter(|id| id.contains("VEN_8086"))
            })?;
            let sub = ids::subsystem_vendor(id)?;
            vendors::board_partner(sub).map(str::to_string)
        },
        &|| {
            let adapters = wmi_adapters();
            best_adapter(&adapters)?.compatibility.clone()
        },
    ])
}

/// Board power limit. NVML only; the AMD and Intel control libraries do
/// not expose a TDP, so a miss here is final.
pub fn tdp() -> Option<String> {
    let mw = nvgpu::power_limit_max_mw()?;
    Some(format!("{:.1} W", f64::from(mw) / 1000.0))
}

pub fn base_clock() -> Option<String> {
    chain::first_hit(&[
        &|| nvgpu::max_graphics_clock_mhz().map(|mhz| format!("{mhz} MHz")),
        &|| {
            let mhz = AdlSession::try_open()?.engine_clock_mhz()?;
            Some(format!("{mhz} MHz"))
        },
        &|| {
            let mhz = IgclSession::try_open()?.max_frequency_mhz()?;
            Some(format!("{mhz} MHz"))
        },
    ])
}

pub fn vram_size() -> Option<String> {
    chain::first_hit(&[
        &|| nvgpu::memory_total_bytes(),
        &|| AdlSession::try_open()?.memory_size_bytes(),
        &|| IgclSession::try_open()?.memory_size_bytes(),
        &dxgi::video_memory_bytes,
        &|| {
            let adapters = wmi_adapters();
            best_adapter(&adapters)?.adapter_ram.filter(|&b| b > 0)
        },
    ])
    .map(format_vram)
}

pub fn vram_type() -> Option<String> {
    chain::first_hit(&[
        &|| {
            let code = nvapi::ram_type_code()?;
            vendors::nv_ram_type(code).map(str::to_string)
        },
        &|| AdlSession::try_open()?.memory_type(),
        &|| {
            let code = IgclSession::try_open()?.memory_type_code()?;
            vendors::igcl_memory_type(code).map(str::to_string)
        },
    ])
}

/// Memory chip maker. NVIDIA-only; neither ADL nor IGCL reports it.
pub fn vram_vendor() -> Option<String> {
    let code = nvapi::ram_maker_code()?;
    vendors::nv_ram_maker(code).map(str::to_string)
}

pub fn vram_bus_width() -> Option<String> {
    chain::first_hit(&[
        &|| nvgpu::memory_bus_width_bits(),
        &|| IgclSession::try_open()?.memory_bus_width_bits(),
    ])
    .map(|bits| format!("{bits} bits"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(pnp: &str, ram: u64) -> WmiAdapter {
        WmiAdapter {
            name: Some(format!("adapter {pnp}")),
            pnp_device_id: Some(pnp.to_string()),
            adapter_ram: Some(ram),
            compatibility: None,
        }
    }

    #[test]
    fn best_adapter_prefers_pci() {
        let list = vec![
            adapter(r"USB\VID_1234&PID_5678", 4 << 30),
            adapter(r"PCI\VEN_10DE&DEV_2489", 1 << 30),
        ];
        let best = best_adapter(&list).unwrap();
        assert_eq!(best.pnp_device_id.as_deref(), Some(r"PCI\VEN_10DE&DEV_2489"));
    }

    #[test]
    fn best_adapter_prefers_bigger_ram_within_class() {
        let list = vec![
            adapter(r"PCI\VEN_8086&DEV_4680", 128 << 20),
            adapter(r"PCI\VEN_10DE&DEV_2489", 8 << 30),
        ];
        let best = best_adapter(&list).unwrap();
        assert_eq!(best.pnp_device_id.as_deref(), Some(r"PCI\VEN_10DE&DEV_2489"));
    }

    #[test]
    fn best_adapter_tie_keeps_first() {
        let list = vec![
            adapter(r"PCI\VEN_10DE&DEV_2489", 8 << 30),
            adapter(r"PCI\VEN_1002&DEV_73BF", 8 << 30),
        ];
        let best = best_adapter(&list).unwrap();
        assert_eq!(best.pnp_device_id.as_deref(), Some(r"PCI\VEN_10DE&DEV_2489"));
    }

    #[test]
    fn best_adapter_empty() {
        assert_eq!(best_adapter(&[]), None);
    }

    #[test]
    fn vram_formatting() {
        assert_eq!(format_vram(8 << 30), "8 GBytes");
        assert_eq!(format_vram(128 << 20), "128 MBytes");
        assert_eq!(format_vram(12 << 30), "12 GBytes");
        // exactly 1 GB crosses into GBytes
        assert_eq!(format_vram(1 << 30), "1 GBytes");
    }
}
