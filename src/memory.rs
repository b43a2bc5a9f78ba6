//! System memory attributes: type, installed size, channel layout and the
//! real DRAM clock.

use crate::vendors;

/// One `Win32_PhysicalMemory` row, reduced to what the resolvers read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryModule {
    pub smbios_type: u16,
    pub data_width: u16,
    /// XMP/EXPO-aware clock in MT/s, zero when the BIOS does not report it.
    pub configured_clock: u32,
    /// Rated clock in MT/s.
    pub speed: u32,
}

/// Memory type from the first module with a non-zero SMBIOS code. A code
/// the table does not know still names the row "Unknown"; only an empty
/// module list is a miss.
pub fn memory_type(modules: &[MemoryModule]) -> Option<String> {
    if modules.is_empty() {
        return None;
    }
    let code = modules
        .iter()
        .map(|m| m.smbios_type)
        .find(|&c| c != 0)
        .unwrap_or(0);
    Some(vendors::smbios_memory_type(code).to_string())
}

/// `"N x W-bit"` from the module count and the last reported data width.
/// This counts sticks, not populated channels; the original tool showed
/// the same figure.
pub fn channel_config(modules: &[MemoryModule]) -> Option<String> {
    let count = modules.len();
    let width = modules
        .iter()
        .map(|m| m.data_width)
        .filter(|&w| w > 0)
        .next_back()
        .unwrap_or(0);
    if count == 0 || width == 0 {
        return None;
    }
    Some(format!("{count} x {width}-bit"))
}

/// Real DRAM clock: the best module transfer rate halved, since DDR moves
/// two transfers per clock. 2666 MT/s reads as "1333.0 MHz".
pub fn dram_frequency(modules: &[MemoryModule]) -> Option<String> {
    let best = modules
        .iter()
        .map(|m| if m.configured_clock > 0 { m.configured_clock } else { m.speed })
        .max()
        .unwrap_or(0);
    if best == 0 {
        return None;
    }
    Some(format!("{:.1} MHz", f64::from(best) / 2.0))
}

/// Installed memory rounded to whole GBytes.
pub fn format_installed(kilobytes: u64) -> String {
    let gib = kilobytes as f64 / (1024.0 * 1024.0);
    format!("{:.0} GBytes", gib)
}

#[cfg(windows)]
mod probes {
    use super::MemoryModule;
    use crate::wmi_util;
    use windows::Win32::System::SystemInformation::GetPhysicallyInstalledSystemMemory;

    pub fn modules() -> Option<Vec<MemoryModule>> {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(rename = "SMBIOSMemoryType")]
            smbios_type: Option<u16>,
            #[serde(rename = "DataWidth")]
            data_width: Option<u16>,
            #[serde(rename = "ConfiguredClockSpeed")]
            configured_clock: Option<u32>,
            #[serde(rename = "Speed")]
            speed: Option<u32>,
        }
        let rows = wmi_util::query::<Row>(
            "SELECT SMBIOSMemoryType, DataWidth, ConfiguredClockSpeed, Speed \
             FROM Win32_PhysicalMemory",
        )?;
        Some(
            rows.into_iter()
                .map(|r| MemoryModule {
                    smbios_type: r.smbios_type.unwrap_or(0),
                    data_width: r.data_width.unwrap_or(0),
                    configured_clock: r.configured_clock.unwrap_or(0),
                    speed: r.speed.unwrap_or(0),
                })
                .collect(),
        )
    }

    /// Firmware-reported installed memory in kilobytes.
    pub fn installed_kilobytes() -> Option<u64> {
        let mut kb: u64 = 0;
        unsafe { GetPhysicallyInstalledSystemMemory(&mut kb) }.ok()?;
        if kb == 0 { None } else { Some(kb) }
    }
}

#[cfg(windows)]
pub use probes::{installed_kilobytes, modules};

#[cfg(not(windows))]
pub fn modules() -> Option<Vec<MemoryModule>> {
    None
}

#[cfg(not(windows))]
pub fn installed_kilobytes() -> Option<u64> {
    None
}

/// Live resolvers over the module probe.
pub fn resolve_type() -> Option<String> {
    memory_type(&modules()?)
}

pub fn resolve_size() -> Option<String> {
    installed_kilobytes().map(format_installed)
}

pub fn resolve_channels() -> Option<String> {
    channel_config(&modules()?)
}

pub fn resolve_frequency() -> Option<String> {
    dram_frequency(&modules()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(smbios_type: u16, width: u16, configured: u32, speed: u32) -> MemoryModule {
        MemoryModule { smbios_type, data_width: width, configured_clock: configured, speed }
    }

    #[test]
    fn type_uses_first_nonzero_code() {
        let mods = vec![module(0, 64, 0, 0), module(26, 64, 0, 0), module(34, 64, 0, 0)];
        assert_eq!(memory_type(&mods).as_deref(), Some("DDR4"));
    }

    #[test]
    fn type_unmapped_code_still_succeeds() {
        let mods = vec![module(99, 64, 0, 0)];
        assert_eq!(memory_type(&mods).as_deref(), Some("Unknown"));
        // all-zero codes keep the row too
        let mods = vec![module(0, 64, 0, 0)];
        assert_eq!(memory_type(&mods).as_deref(), Some("Unknown"));
    }

    #[test]
    fn type_needs_at_least_one_module() {
        assert_eq!(memory_type(&[]), None);
    }

    #[test]
    fn channels_count_sticks_with_last_width() {
        let mods = vec![module(26, 64, 0, 0), module(26, 64, 0, 0)];
        assert_eq!(channel_config(&mods).as_deref(), Some("2 x 64-bit"));
    }

    #[test]
    fn channels_fail_without_width() {
        let mods = vec![module(26, 0, 0, 0)];
        assert_eq!(channel_config(&mods), None);
        assert_eq!(channel_config(&[]), None);
    }

    #[test]
    fn frequency_is_half_the_transfer_rate() {
        let mods = vec![module(26, 64, 2666, 3200)];
        assert_eq!(dram_frequency(&mods).as_deref(), Some("1333.0 MHz"));
    }

    #[test]
    fn frequency_prefers_configured_clock_per_module() {
        // configured wins on its module even when the rated speed is higher
        let mods = vec![module(26, 64, 3600, 4000), module(26, 64, 0, 3200)];
        assert_eq!(dram_frequency(&mods).as_deref(), Some("1800.0 MHz"));
    }

    #[test]
    fn frequency_needs_a_clock() {
        assert_eq!(dram_frequency(&[module(26, 64, 0, 0)]), None);
        assert_eq!(dram_frequency(&[]), None);
    }

    #[test]
    fn installed_rounds_to_gbytes() {
        assert_eq!(format_installed(32 * 1024 * 1024), "32 GBytes");
        // firmware rounds oddly; 31.9 GB reads as 32
        assert_eq!(format_installed(33_454_080), "32 GBytes");
    }
}
