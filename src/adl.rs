//! AMD Display Library access for Radeon adapters.
//!
//! `atiadlxx.dll` ships with the AMD driver and is loaded at runtime; no
//! driver means no session. A session binds to the first active adapter
//! and every query goes against that index.

#[cfg(windows)]
mod imp {
    use libloading::{Library, Symbol};
    use std::ffi::{CStr, c_void};

    const ADL_OK: i32 = 0;

    // Layouts fixed by the AMD driver ABI.
    #[repr(C)]
    #[derive(Clone, Copy)]
    struct AdapterInfo {
        size: i32,
        adapter_index: i32,
        udid: [u8; 256],
        bus_number: i32,
        device_number: i32,
        function_number: i32,
        vendor_id: i32,
        adapter_name: [u8; 256],
        display_name: [u8; 256],
        present: i32,
        exist: i32,
        driver_path: [u8; 256],
        driver_path_ext: [u8; 256],
        pnp_string: [u8; 256],
        os_display_index: i32,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct AdlMemoryInfo {
        memory_size: i64,
        memory_type: [u8; 256],
        memory_bandwidth: i64,
    }

    #[repr(C)]
    #[derive(Clone, Copy, Default)]
    struct AdlPmActivity {
        size: i32,
        engine_clock: i32,
        memory_clock: i32,
        vddc: i32,
        activity_percent: i32,
        current_performance_level: i32,
        current_bus_speed: i32,
        current_bus_lanes: i32,
        maximum_bus_lanes: i32,
        reserved: i32,
    }

    type MallocCallback = unsafe extern "system" fn(i32) -> *mut c_void;
    type MainControlCreate = unsafe extern "C" fn(MallocCallback, i32) -> i32;
    type MainControlDestroy = unsafe extern "C" fn() -> i32;
    type NumberOfAdaptersGet = unsafe extern "C" fn(*mut i32) -> i32;
    type AdapterInfoGet = unsafe extern "C" fn(*mut AdapterInfo, i32) -> i32;
    type AdapterActiveGet = unsafe extern "C" fn(i32, *mut i32) -> i32;
    type MemoryInfoGet = unsafe extern "C" fn(i32, *mut AdlMemoryInfo) -> i32;
    type CurrentActivityGet = unsafe extern "C" fn(i32, *mut AdlPmActivity) -> i32;

    unsafe extern "system" fn adl_malloc(size: i32) -> *mut c_void {
        unsafe { libc::malloc(size as usize) }
    }

    fn c_str(bytes: &[u8]) -> Option<String> {
        let s = CStr::from_bytes_until_nul(bytes).ok()?.to_str().ok()?;
        let s = s.trim();
        if s.is_empty() { None } else { Some(s.to_string()) }
    }

    pub struct AdlSession {
        lib: Library,
        adapter_index: i32,
        adapter_name: Option<String>,
        pnp_string: Option<String>,
    }

    impl AdlSession {
        /// Load the driver library and bind to the first active adapter.
        pub fn try_open() -> Option<Self> {
            let lib = unsafe {
                Library::new("atiadlxx.dll")
                    .or_else(|_| Library::new("atiadlxy.dll"))
                    .ok()?
            };
            unsafe {
                let create: Symbol<MainControlCreate> =
                    lib.get(b"ADL_Main_Control_Create\0").ok()?;
                let destroy: Symbol<MainControlDestroy> =
                    lib.get(b"ADL_Main_Control_Destroy\0").ok()?;
                let count_get: Symbol<NumberOfAdaptersGet> =
                    lib.get(b"ADL_Adapter_NumberOfAdapters_Get\0").ok()?;
                let info_get: Symbol<AdapterInfoGet> =
                    lib.get(b"ADL_Adapter_AdapterInfo_Get\0").ok()?;
                let active_get: Symbol<AdapterActiveGet> =
                    lib.get(b"ADL_Adapter_Active_Get\0").ok()?;

                if create(adl_malloc, 1) != ADL_OK {
                    return None;
                }
                // past this point every bail-out must run destroy

                let mut count: i32 = 0;
                if count_get(&mut count) != ADL_OK || count <= 0 {
                    destroy();
                    return None;
                }
                let mut adapters: Vec<AdapterInfo> =
                    vec![std::mem::zeroed(); count as usize];
                let bytes = std::mem::size_of::<AdapterInfo>() as i32 * count;
                if info_get(adapters.as_mut_ptr(), bytes) != ADL_OK {
                    destroy();
                    return None;
                }
                let active = adapters.iter().find(|a| {
                    let mut status: i32 = 0;
                    a.adapter_index >= 0
                        && active_get(a.adapter_index, &mut status) == ADL_OK
                        && status != 0
                });
                let Some(adapter) = active else {
                    destroy();
                    return None;
                };

                let adapter_index = adapter.adapter_index;
                let adapter_name = c_str(&adapter.adapter_name);
                let pnp_string = c_str(&adapter.pnp_string);
                Some(AdlSession { lib, adapter_index, adapter_name, pnp_string })
            }
        }

        pub fn adapter_name(&self) -> Option<String> {
            self.adapter_name.clone()
        }

        /// Raw PNP string, carries the SUBSYS token for partner lookup.
        pub fn pnp_string(&self) -> Option<String> {
            self.pnp_string.clone()
        }

        pub fn memory_size_bytes(&self) -> Option<u64> {
            let mut info: AdlMemoryInfo = unsafe { std::mem::zeroed() };
            unsafe {
                let get: Symbol<MemoryInfoGet> =
                    self.lib.get(b"ADL_Adapter_MemoryInfo_Get\0").ok()?;
                if get(self.adapter_index, &mut info) != ADL_OK {
                    return None;
                }
            }
            u64::try_from(info.memory_size).ok().filter(|&b| b > 0)
        }

        pub fn memory_type(&self) -> Option<String> {
            let mut info: AdlMemoryInfo = unsafe { std::mem::zeroed() };
            unsafe {
                let get: Symbol<MemoryInfoGet> =
                    self.lib.get(b"ADL_Adapter_MemoryInfo_Get\0").ok()?;
                if get(self.adapter_index, &mut info) != ADL_OK {
                    return None;
                }
            }
            c_str(&info.memory_type)
        }

        /// Current engine clock in MHz (driver reports 10 kHz units).
        pub fn engine_clock_mhz(&self) -> Option<u32> {
            let mut activity = AdlPmActivity {
                size: std::mem::size_of::<AdlPmActivity>() as i32,
                ..Default::default()
            };
            unsafe {
                let get: Symbol<CurrentActivityGet> =
                    self.lib.get(b"ADL_Overdrive5_CurrentActivity_Get\0").ok()?;
                if get(self.adapter_index, &mut activity) != ADL_OK {
                    return None;
                }
            }
            if activity.engine_clock <= 0 {
                return None;
            }
            Some(activity.engine_clock as u32 / 100)
        }
    }

    impl Drop for AdlSession {
        fn drop(&mut self) {
            unsafe {
                if let Ok(destroy) =
                    self.lib.get::<MainControlDestroy>(b"ADL_Main_Control_Destroy\0")
                {
                    destroy();
                }
            }
        }
    }
}

#[cfg(windows)]
pub use imp::AdlSession;

#[cfg(not(windows))]
pub struct AdlSession;

#[cfg(not(windows))]
impl AdlSession {
    pub fn try_open() -> Option<Self> {
        None
    }
    pub fn adapter_name(&self) -> Option<String> {
        None
    }
    pub fn pnp_string(&self) -> Option<String> {
        None
    }
    pub fn memory_size_bytes(&self) -> Option<u64> {
        None
    }
    pub fn memory_type(&self) -> Option<String> {
        None
    }
    pub fn engine_clock_mhz(&self) -> Option<u32> {
        None
    }
}
