use std::ffi::c_void;
use std::fs::File;
use std::num::NonZeroUsize;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use nix::sys::mman::{MapFlags, ProtFlags};

use crate::config::Loader;

/// Error returned when an ELF file cannot be brought into memory.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// File open/read error.
    #[error("{0}: {1}")]
    File(PathBuf, std::io::Error),

    /// Memory mapping error.
    #[error("{0}: mmap failed: {1}")]
    Mmap(PathBuf, nix::Error),

    /// File larger than the address space.
    #[error("{0}: file too large to be mapped")]
    TooLarge(PathBuf),
}

/// Content of an ELF file, either read into a buffer or mapped read-only.
pub enum Image {
    /// Content read into memory.
    Buffer(Vec<u8>),

    /// Content mapped from the file.
    Mapped(Mapping),
}

impl Deref for Image {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Buffer(buf) => buf,
            Self::Mapped(mapping) => mapping,
        }
    }
}

/// Loads the content of the file at `path`.
#[tracing::instrument(
    name = "LoadImage",
    skip_all,
    fields(path = %path.display(), ?loader)
)]
pub fn load_image(path: &Path, loader: Loader) -> Result<Image, LoadError> {
    let image = match loader {
        Loader::Read => std::fs::read(path)
            .map(Image::Buffer)
            .map_err(|e| LoadError::File(path.to_path_buf(), e))?,
        Loader::Mmap => Mapping::new(path)?.map_or(Image::Buffer(Vec::new()), Image::Mapped),
    };

    tracing::debug!(len = image.len(), "loaded image");

    Ok(image)
}

/// Read-only private mapping of a whole file, unmapped on drop.
pub struct Mapping {
    addr: NonNull<c_void>,
    len: NonZeroUsize,
}

impl Mapping {
    /// Maps the file at `path`, or returns `None` if the file is empty.
    fn new(path: &Path) -> Result<Option<Self>, LoadError> {
        let file = File::open(path).map_err(|e| LoadError::File(path.to_path_buf(), e))?;

        let len = file
            .metadata()
            .map_err(|e| LoadError::File(path.to_path_buf(), e))?
            .len();

        let len = usize::try_from(len).map_err(|_| LoadError::TooLarge(path.to_path_buf()))?;

        // empty files cannot be mapped
        let Some(len) = NonZeroUsize::new(len) else {
            return Ok(None);
        };

        // SAFETY: the mapping is private and read-only; its content is only
        // exposed through shared slices bound to the `Mapping` lifetime.
        let addr = unsafe {
            nix::sys::mman::mmap(
                None,
                len,
                ProtFlags::PROT_READ,
                MapFlags::MAP_PRIVATE,
                &file,
                0,
            )
        }
        .map_err(|e| LoadError::Mmap(path.to_path_buf(), e))?;

        Ok(Some(Self { addr, len }))
    }
}

impl Deref for Mapping {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: `addr` points to `len` readable bytes until `self` drops.
        unsafe { std::slice::from_raw_parts(self.addr.as_ptr().cast::<u8>(), self.len.get()) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: the region was mapped by `Mapping::new` and is no longer
        // borrowed.
        if let Err(e) = unsafe { nix::sys::mman::munmap(self.addr, self.len.get()) } {
            tracing::warn!("munmap failed: {e}");
        }
    }
}
