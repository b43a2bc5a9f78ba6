//! NVIDIA queries through NVML. The wrapper loads `nvml.dll` at runtime,
//! so a machine without the NVIDIA driver just answers `None` everywhere.
//!
//! Each probe opens its own NVML handle, asks device 0 one question and
//! drops the handle. Multi-GPU ordering is whatever the driver reports.

#[cfg(windows)]
mod imp {
    use nvml_wrapper::Nvml;
    use nvml_wrapper::enum_wrappers::device::Clock;

    fn with_device<T>(f: impl FnOnce(&nvml_wrapper::Device) -> Option<T>) -> Option<T> {
        let nvml = Nvml::init().ok()?;
        let device = nvml.device_by_index(0).ok()?;
        f(&device)
    }

    pub fn name() -> Option<String> {
        with_device(|d| d.name().ok())
    }

    /// Upper board power limit in milliwatts.
    pub fn power_limit_max_mw() -> Option<u32> {
        with_device(|d| {
            d.power_management_limit_constraints()
                .ok()
                .map(|c| c.max_limit)
        })
    }

    /// Maximum graphics clock in MHz.
    pub fn max_graphics_clock_mhz() -> Option<u32> {
        with_device(|d| d.max_clock_info(Clock::Graphics).ok())
    }

    pub fn memory_total_bytes() -> Option<u64> {
        with_device(|d| d.memory_info().ok().map(|m| m.total))
    }

    pub fn memory_bus_width_bits() -> Option<u32> {
        with_device(|d| d.memory_bus_width().ok())
    }

    /// PCI subsystem id; upper 16 bits carry the board partner vendor.
    pub fn pci_subsystem_id() -> Option<u32> {
        with_device(|d| d.pci_info().ok().and_then(|p| p.pci_sub_system_id))
    }
}

#[cfg(windows)]
pub use imp::*;

#[cfg(not(windows))]
mod imp {
    pub fn name() -> Option<String> {
        None
    }
    pub fn power_limit_max_mw() -> Option<u32> {
        None
    }
    pub fn max_graphics_clock_mhz() -> Option<u32> {
        None
    }
    pub fn memory_total_bytes() -> Option<u64> {
        None
    }
    pub fn memory_bus_width_bits() -> Option<u32> {
        None
    }
    pub fn pci_subsystem_id() -> Option<u32> {
        None
    }
}

#[cfg(not(windows))]
pub use imp::*;
