use std::io::{self, Error};
#[cfg(not(miri))]
use std::mem;
#[cfg(not(miri))]
use std::ptr;

#[cfg(not(miri))]
use windows_sys::Win32::System::Memory::{
    VirtualAlloc, VirtualFree, MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_READWRITE,
};
#[cfg(not(miri))]
use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

pub fn page_size() -> usize {
    #[cfg(miri)]
    {
        4096
    }
    #[cfg(not(miri))]
    unsafe {
        let mut info: SYSTEM_INFO = mem::zeroed();
        GetSystemInfo(&mut info);
        let size = info.dwPageSize as usize;
        if size == 0 {
            4096
        } else {
            size
        }
    }
}

pub struct MmapInner {
    ptr: *mut std::ffi::c_void,
    len: usize,
}

impl MmapInner {
    /// Creates a new zero-filled anonymous memory mapping.
    ///
    /// # Safety
    ///
    /// This function is unsafe because it calls `VirtualAlloc`. `len` must
    /// be non-zero.
    pub unsafe fn map_anon(len: usize) -> io::Result<MmapInner> {
        #[cfg(miri)]
        {
            use std::alloc::{alloc_zeroed, Layout};
            // Miri doesn't support VirtualAlloc; fall back to std::alloc.
            // alloc_zeroed preserves the zero-fill guarantee.
            let layout = Layout::from_size_align(len, page_size())
                .map_err(|_| Error::from(io::ErrorKind::InvalidInput))?;
            let ptr = unsafe { alloc_zeroed(layout) };
            if ptr.is_null() {
                return Err(Error::from(io::ErrorKind::OutOfMemory));
            }
            Ok(MmapInner {
                ptr: ptr.cast::<std::ffi::c_void>(),
                len,
            })
        }
        #[cfg(not(miri))]
        {
            // MEM_RESERVE | MEM_COMMIT yields usable, zero-filled pages.
            let ptr = unsafe {
                VirtualAlloc(ptr::null(), len, MEM_COMMIT | MEM_RESERVE, PAGE_READWRITE)
            };

            if ptr.is_null() {
                return Err(Error::last_os_error());
            }

            Ok(MmapInner { ptr, len })
        }
    }

    pub const fn ptr(&self) -> *mut u8 {
        self.ptr.cast::<u8>()
    }

    pub const fn len(&self) -> usize {
        self.len
    }
}

impl Drop for MmapInner {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }
        #[cfg(miri)]
        unsafe {
            use std::alloc::{dealloc, Layout};
            let layout = Layout::from_size_align_unchecked(self.len, page_size());
            dealloc(self.ptr.cast::<u8>(), layout);
        }
        #[cfg(not(miri))]
        unsafe {
            VirtualFree(self.ptr, 0, MEM_RELEASE);
        }
    }
}

unsafe impl Send for MmapInner {}
unsafe impl Sync for MmapInner {}
