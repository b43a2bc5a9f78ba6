//! CPU identification: CPUID strings, family/model decoding, core counts
//! and the CPU0 clock triple.

/// CPUID-derived identity. `family` and `model` are the combined values
/// (extended fields already folded in).
#[derive(Debug, Clone, serde::Serialize)]
pub struct CpuIdentity {
    pub vendor_id: String,
    pub brand: String,
    pub family: u32,
    pub model: u32,
    pub stepping: u32,
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn identity() -> Option<CpuIdentity> {
    let cpuid = raw_cpuid::CpuId::new();
    let vendor_id = cpuid.get_vendor_info()?.as_str().to_string();
    let brand = cpuid
        .get_processor_brand_string()
        .map(|b| b.as_str().trim_start().to_string())
        .unwrap_or_default();
    let feat = cpuid.get_feature_info()?;
    Some(CpuIdentity {
        vendor_id,
        brand,
        family: u32::from(feat.family_id()),
        model: u32::from(feat.model_id()),
        stepping: u32::from(feat.stepping_id()),
    })
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub fn identity() -> Option<CpuIdentity> {
    None
}

/// CPUID vendor id string → friendly vendor name.
pub fn vendor_name(vendor_id: &str) -> &'static str {
    match vendor_id {
        "AuthenticAMD" => "AMD",
        "GenuineIntel" => "Intel",
        "CentaurHauls" => "VIA",
        _ => "Unknown",
    }
}

/// Intel client microarchitecture by family 6 model number. Used as the
/// chipset generation name since the PCH tracks the CPU generation.
pub fn intel_microarch(family: u32, model: u32) -> Option<&'static str> {
    if family != 6 {
        return None;
    }
    match model {
        0x2A | 0x2D => Some("Sandy Bridge"),
        0x3A | 0x3E => Some("Ivy Bridge"),
        0x3C | 0x3F | 0x45 | 0x46 => Some("Haswell"),
        0x3D | 0x47 | 0x4F | 0x56 => Some("Broadwell"),
        0x4E | 0x55 | 0x5E => Some("Skylake"),
        0x8E | 0x9E => Some("Kaby Lake"),
        0xA5 | 0xA6 => Some("Comet Lake"),
        0x7D | 0x7E => Some("Ice Lake"),
        0x8C | 0x8D => Some("Tiger Lake"),
        0xA7 => Some("Rocket Lake"),
        0x97 | 0x9A => Some("Alder Lake"),
        0xB7 | 0xBA | 0xBF => Some("Raptor Lake"),
        _ => None,
    }
}

/// Chipset model name driven by the CPU vendor and brand. Modern AMD and
/// Intel platforms put the northbridge on the CPU die, so the CPU is the
/// best available witness for the chipset generation.
pub fn chipset_model(vendor: &str, brand: &str, family: u32, model: u32) -> String {
    match vendor {
        "AMD" => {
            if brand.contains("Ryzen") {
                "Ryzen SOC".to_string()
            } else {
                "AMD SoC".to_string()
            }
        }
        "Intel" => intel_microarch(family, model)
            .unwrap_or("Intel Chipset")
            .to_string(),
        other => format!("{other} Chipset"),
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CpuClocks {
    pub current_mhz: u32,
    pub max_mhz: u32,
    pub limit_mhz: u32,
}

#[cfg(windows)]
mod win {
    use super::CpuClocks;
    use windows::Win32::System::Power::{CallNtPowerInformation, ProcessorInformation};
    use windows::Win32::System::SystemInformation::{
        GetActiveProcessorCount, GetActiveProcessorGroupCount,
        GetLogicalProcessorInformationEx, GetSystemInfo, RelationProcessorCore,
        SYSTEM_INFO, SYSTEM_LOGICAL_PROCESSOR_INFORMATION_EX,
    };

    const ALL_GROUPS: u16 = 0xFFFF;

    pub fn physical_cores() -> Option<u32> {
        let mut len: u32 = 0;
        unsafe {
            let _ = GetLogicalProcessorInformationEx(RelationProcessorCore, None, &mut len);
        }
        if len == 0 {
            return None;
        }
        let mut buf = vec![0u8; len as usize];
        unsafe {
            GetLogicalProcessorInformationEx(
                RelationProcessorCore,
                Some(buf.as_mut_ptr() as *mut SYSTEM_LOGICAL_PROCESSOR_INFORMATION_EX),
                &mut len,
            )
        }
        .ok()?;

        let mut cores = 0u32;
        let mut offset = 0usize;
        while offset + std::mem::size_of::<u32>() < len as usize {
            let entry = unsafe {
                &*(buf.as_ptr().add(offset) as *const SYSTEM_LOGICAL_PROCESSOR_INFORMATION_EX)
            };
            if entry.Size == 0 {
                break;
            }
            if entry.Relationship == RelationProcessorCore {
                cores += 1;
            }
            offset += entry.Size as usize;
        }
        if cores == 0 { None } else { Some(cores) }
    }

    pub fn logical_processors() -> Option<u32> {
        let groups = unsafe { GetActiveProcessorGroupCount() };
        if groups > 0 {
            let total: u32 = (0..groups)
                .map(|g| unsafe { GetActiveProcessorCount(g) })
                .sum();
            if total > 0 {
                return Some(total);
            }
        }
        let mut info = SYSTEM_INFO::default();
        unsafe { GetSystemInfo(&mut info) };
        if info.dwNumberOfProcessors > 0 {
            Some(info.dwNumberOfProcessors)
        } else {
            None
        }
    }

    // Layout matches the power management ABI for per-processor clock data.
    #[repr(C)]
    #[derive(Clone, Copy, Default)]
    struct ProcessorPowerInformation {
        number: u32,
        max_mhz: u32,
        current_mhz: u32,
        mhz_limit: u32,
        max_idle_state: u32,
        current_idle_state: u32,
    }

    pub fn clocks() -> Option<CpuClocks> {
        let count = unsafe { GetActiveProcessorCount(ALL_GROUPS) };
        if count == 0 {
            return None;
        }
        let mut info = vec![ProcessorPowerInformation::default(); count as usize];
        let bytes = std::mem::size_of_val(info.as_slice()) as u32;
        let status = unsafe {
            CallNtPowerInformation(
                ProcessorInformation,
                None,
                0,
                Some(info.as_mut_ptr() as *mut _),
                bytes,
            )
        };
        if status.is_err() {
            return None;
        }
        let cpu0 = info.first()?;
        Some(CpuClocks {
            current_mhz: cpu0.current_mhz,
            max_mhz: cpu0.max_mhz,
            limit_mhz: cpu0.mhz_limit,
        })
    }
}

#[cfg(windows)]
pub use win::{clocks, logical_processors, physical_cores};

#[cfg(not(windows))]
pub fn physical_cores() -> Option<u32> {
    None
}

#[cfg(not(windows))]
pub fn logical_processors() -> Option<u32> {
    None
}

#[cfg(not(windows))]
pub fn clocks() -> Option<CpuClocks> {
    None
}
