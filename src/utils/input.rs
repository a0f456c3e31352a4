use memmap2::Mmap;
use std::fs::{self, File};
use std::ops::Deref;
use std::path::Path;

/// Raw upload bytes, either read into memory or memory-mapped.
pub enum InputBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for InputBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            InputBytes::Owned(bytes) => bytes,
            InputBytes::Mapped(mmap) => mmap,
        }
    }
}

impl InputBytes {
    pub fn is_mapped(&self) -> bool {
        matches!(self, InputBytes::Mapped(_))
    }
}

/// Read a file, mapping it when it is larger than `mmap_threshold` bytes.
pub fn read_input<P: AsRef<Path>>(path: P, mmap_threshold: u64) -> std::io::Result<InputBytes> {
    let path = path.as_ref();
    let file_size = fs::metadata(path)?.len();

    if file_size > mmap_threshold {
        let file = File::open(path)?;
        // the file must not be truncated while the map is alive
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(InputBytes::Mapped(mmap))
    } else {
        Ok(InputBytes::Owned(fs::read(path)?))
    }
}
