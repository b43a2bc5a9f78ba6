//! Vendor-neutral VRAM size through DXGI, the last probe before WMI.

#[cfg(windows)]
mod imp {
    use windows::Win32::Graphics::Dxgi::{CreateDXGIFactory, IDXGIFactory};

    const MB: u64 = 1024 * 1024;

    /// Video memory of the first adapter, in bytes.
    ///
    /// Integrated GPUs often report zero dedicated memory; then the shared
    /// pool stands in, capped at 128 MB when it is plainly the whole system
    /// RAM window rather than a carve-out.
    pub fn video_memory_bytes() -> Option<u64> {
        unsafe {
            let factory: IDXGIFactory = CreateDXGIFactory().ok()?;
            let adapter = factory.EnumAdapters(0).ok()?;
            let desc = adapter.GetDesc().ok()?;
            let dedicated = desc.DedicatedVideoMemory as u64;
            if dedicated > 0 {
                return Some(dedicated);
            }
            let shared = desc.SharedSystemMemory as u64;
            if shared == 0 {
                return None;
            }
            if shared > 512 * MB {
                Some(128 * MB)
            } else {
                Some(shared)
            }
        }
    }
}

#[cfg(windows)]
pub use imp::video_memory_bytes;

#[cfg(not(windows))]
pub fn video_memory_bytes() -> Option<u64> {
    None
}
