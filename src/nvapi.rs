//! Undocumented NVAPI entry points for VRAM chip type and maker.
//!
//! These two queries have no NVML equivalent. They are resolved through
//! `nvapi_QueryInterface` by fixed interface ids, the same ids every
//! GPU information tool has shipped for a decade. Any miss along the
//! way (no driver, no export, call failure) is a silent `None`.

#[cfg(windows)]
mod imp {
    use libloading::Library;

    const ID_INITIALIZE: u32 = 0x0150_E828;
    const ID_ENUM_PHYSICAL_GPUS: u32 = 0xE5AC_921F;
    const ID_GET_RAM_TYPE: u32 = 0x57F7_CAAC;
    const ID_GET_RAM_MAKER: u32 = 0x42AE_A16A;

    const NVAPI_MAX_PHYSICAL_GPUS: usize = 64;

    type QueryInterface = unsafe extern "C" fn(u32) -> *const std::ffi::c_void;
    type Initialize = unsafe extern "C" fn() -> i32;
    type EnumPhysicalGpus =
        unsafe extern "C" fn(*mut *mut std::ffi::c_void, *mut i32) -> i32;
    type GpuQueryI32 = unsafe extern "C" fn(*mut std::ffi::c_void, *mut i32) -> i32;

    fn load() -> Option<Library> {
        unsafe {
            Library::new("nvapi64.dll")
                .or_else(|_| Library::new("nvapi.dll"))
                .ok()
        }
    }

    /// Run one per-GPU u32 query against the first physical GPU.
    fn query_first_gpu(interface_id: u32) -> Option<u32> {
        let lib = load()?;
        unsafe {
            let query: libloading::Symbol<QueryInterface> =
                lib.get(b"nvapi_QueryInterface\0").ok()?;
            let init_ptr = query(ID_INITIALIZE);
            if init_ptr.is_null() {
                return None;
            }
            let init: Initialize = std::mem::transmute(init_ptr);
            if init() != 0 {
                return None;
            }
            let enum_ptr = query(ID_ENUM_PHYSICAL_GPUS);
            if enum_ptr.is_null() {
                return None;
            }
            let enum_gpus: EnumPhysicalGpus = std::mem::transmute(enum_ptr);
            let mut handles = [std::ptr::null_mut(); NVAPI_MAX_PHYSICAL_GPUS];
            let mut count: i32 = 0;
            if enum_gpus(handles.as_mut_ptr(), &mut count) != 0 || count <= 0 {
                return None;
            }
            let fn_ptr = query(interface_id);
            if fn_ptr.is_null() {
                return None;
            }
            let gpu_query: GpuQueryI32 = std::mem::transmute(fn_ptr);
            let mut value: i32 = 0;
            if gpu_query(handles[0], &mut value) != 0 {
                return None;
            }
            u32::try_from(value).ok()
        }
    }

    pub fn ram_type_code() -> Option<u32> {
        query_first_gpu(ID_GET_RAM_TYPE)
    }

    pub fn ram_maker_code() -> Option<u32> {
        query_first_gpu(ID_GET_RAM_MAKER)
    }
}

#[cfg(windows)]
pub use imp::*;

#[cfg(not(windows))]
mod imp {
    pub fn ram_type_code() -> Option<u32> {
        None
    }
    pub fn ram_maker_code() -> Option<u32> {
        None
    }
}

#[cfg(not(windows))]
pub use imp::*;
