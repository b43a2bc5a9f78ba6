//! Intel Graphics Control Library access for integrated and Arc GPUs.
//!
//! `ControlLib.dll` ships with the Intel graphics driver. A session binds
//! to the first enumerated graphics-type device; the API handle is closed
//! on drop.

#[cfg(windows)]
mod imp {
    use libloading::{Library, Symbol};
    use std::ffi::{CStr, c_void};

    const CTL_RESULT_SUCCESS: u32 = 0;
    const CTL_DEVICE_TYPE_GRAPHICS: u32 = 1;

    type ApiHandle = *mut c_void;
    type DeviceHandle = *mut c_void;

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct InitArgs {
        size: u32,
        version: u32,
        flags: u32,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct DeviceProperties {
        size: u32,
        version: u32,
        device_id: *mut c_void,
        device_id_size: u32,
        device_type: u32,
        name: [u8; 256],
        driver_version: *mut c_void,
        driver_version_size: u32,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct MemProperties {
        size: u32,
        version: u32,
        physical_size: u64,
        memory_type: i32,
        bus_width: u32,
        num_channels: u32,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct FreqProperties {
        size: u32,
        version: u32,
        can_control: u32,
        min: f64,
        max: f64,
    }

    type CtlInit = unsafe extern "C" fn(*mut InitArgs, *mut ApiHandle) -> u32;
    type CtlClose = unsafe extern "C" fn(ApiHandle) -> u32;
    type CtlEnumDevices = unsafe extern "C" fn(ApiHandle, *mut u32, *mut DeviceHandle) -> u32;
    type CtlGetDeviceProperties = unsafe extern "C" fn(DeviceHandle, *mut DeviceProperties) -> u32;
    type CtlGetMemProperties = unsafe extern "C" fn(DeviceHandle, *mut MemProperties) -> u32;
    type CtlGetFreqProperties = unsafe extern "C" fn(DeviceHandle, *mut FreqProperties) -> u32;

    fn c_str(bytes: &[u8]) -> Option<String> {
        let s = CStr::from_bytes_until_nul(bytes).ok()?.to_str().ok()?;
        let s = s.trim();
        if s.is_empty() { None } else { Some(s.to_string()) }
    }

    pub struct IgclSession {
        lib: Library,
        api: ApiHandle,
        device: DeviceHandle,
        device_name: Option<String>,
    }

    impl IgclSession {
        pub fn try_open() -> Option<Self> {
            let lib = unsafe {
                Library::new("ControlLib.dll")
                    .or_else(|_| Library::new("igcl.dll"))
                    .ok()?
            };
            unsafe {
                let init: Symbol<CtlInit> = lib.get(b"ctlInit\0").ok()?;
                let close: Symbol<CtlClose> = lib.get(b"ctlClose\0").ok()?;
                let enum_devices: Symbol<CtlEnumDevices> = lib.get(b"ctlEnumDevices\0").ok()?;
                let get_props: Symbol<CtlGetDeviceProperties> =
                    lib.get(b"ctlGetDeviceProperties\0").ok()?;

                let mut args = InitArgs {
                    size: std::mem::size_of::<InitArgs>() as u32,
                    version: 0,
                    flags: 0,
                };
                let mut api: ApiHandle = std::ptr::null_mut();
                if init(&mut args, &mut api) != CTL_RESULT_SUCCESS || api.is_null() {
                    return None;
                }

                let mut count: u32 = 0;
                if enum_devices(api, &mut count, std::ptr::null_mut()) != CTL_RESULT_SUCCESS
                    || count == 0
                {
                    close(api);
                    return None;
                }
                let mut devices: Vec<DeviceHandle> =
                    vec![std::ptr::null_mut(); count as usize];
                if enum_devices(api, &mut count, devices.as_mut_ptr()) != CTL_RESULT_SUCCESS {
                    close(api);
                    return None;
                }

                // first graphics-type device wins; display-only adapters skipped
                let mut found = None;
                for &device in devices.iter().take(count as usize) {
                    let mut props: DeviceProperties = std::mem::zeroed();
                    props.size = std::mem::size_of::<DeviceProperties>() as u32;
                    if get_props(device, &mut props) == CTL_RESULT_SUCCESS
                        && props.device_type == CTL_DEVICE_TYPE_GRAPHICS
                    {
                        found = Some((device, c_str(&props.name)));
                        break;
                    }
                }
                let Some((device, device_name)) = found else {
                    close(api);
                    return None;
                };
                Some(IgclSession { lib, api, device, device_name })
            }
        }

        pub fn device_name(&self) -> Option<String> {
            self.device_name.clone()
        }

        fn mem_properties(&self) -> Option<MemProperties> {
            let mut props: MemProperties = unsafe { std::mem::zeroed() };
            props.size = std::mem::size_of::<MemProperties>() as u32;
            unsafe {
                let get: Symbol<CtlGetMemProperties> =
                    self.lib.get(b"ctlGetMemProperties\0").ok()?;
                if get(self.device, &mut props) != CTL_RESULT_SUCCESS {
                    return None;
                }
            }
            Some(props)
        }

        pub fn memory_size_bytes(&self) -> Option<u64> {
            let props = self.mem_properties()?;
            if props.physical_size == 0 { None } else { Some(props.physical_size) }
        }

        pub fn memory_type_code(&self) -> Option<u32> {
            let props = self.mem_properties()?;
            u32::try_from(props.memory_type).ok()
        }

        pub fn memory_bus_width_bits(&self) -> Option<u32> {
            let props = self.mem_properties()?;
            if props.bus_width == 0 { None } else { Some(props.bus_width) }
        }

        /// Maximum frequency in MHz.
        pub fn max_frequency_mhz(&self) -> Option<u32> {
            let mut props: FreqProperties = unsafe { std::mem::zeroed() };
            props.size = std::mem::size_of::<FreqProperties>() as u32;
            unsafe {
                let get: Symbol<CtlGetFreqProperties> =
                    self.lib.get(b"ctlGetFreqProperties\0").ok()?;
                if get(self.device, &mut props) != CTL_RESULT_SUCCESS {
                    return None;
                }
            }
            if props.max <= 0.0 {
                return None;
            }
            Some(props.max as u32)
        }
    }

    impl Drop for IgclSession {
        fn drop(&mut self) {
            unsafe {
                if let Ok(close) = self.lib.get::<CtlClose>(b"ctlClose\0") {
                    close(self.api);
                }
            }
        }
    }
}

#[cfg(windows)]
pub use imp::IgclSession;

#[cfg(not(windows))]
pub struct IgclSession;

#[cfg(not(windows))]
impl IgclSession {
    pub fn try_open() -> Option<Self> {
        None
    }
    pub fn device_name(&self) -> Option<String> {
        None
    }
    pub fn memory_size_bytes(&self) -> Option<u64> {
        None
    }
    pub fn memory_type_code(&self) -> Option<u32> {
        None
    }
    pub fn memory_bus_width_bits(&self) -> Option<u32> {
        None
    }
    pub fn max_frequency_mhz(&self) -> Option<u32> {
        None
    }
}
