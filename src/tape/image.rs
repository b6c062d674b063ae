use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

use memmap::{Mmap, MmapOptions};

/// Provide backing storage (file or memory) for tape images.
pub enum Image {
    ReadOnlyMap(Mmap),
    Memory(Box<[u8]>),
}

impl Image {
    pub fn from_bytes(bytes: &[u8]) -> Image {
        Image::Memory(bytes.to_vec().into_boxed_slice())
    }

    /// Open a tape image.  Regular files are mapped read-only.  Anything
    /// else (pipes, character devices, procfs entries, empty files) is read
    /// into memory, since its reported length says nothing about its contents
    /// and zero-length mappings are refused by the OS.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Image> {
        let mut file = File::open(path)?;
        let metadata = file.metadata()?;
        if metadata.is_file() && metadata.len() > 0 {
            let mmap = unsafe { MmapOptions::new().map(&file)? };
            return Ok(Image::ReadOnlyMap(mmap));
        }
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(Image::Memory(bytes.into_boxed_slice()))
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Image::ReadOnlyMap(mmap) => &mmap[..],
            Image::Memory(array) => &array[..],
        }
    }

    /// Read the image from the beginning.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x02, 0x00, 0xAA, 0xBB]).unwrap();
        file.flush().unwrap();

        let image = Image::open(file.path()).unwrap();
        assert!(matches!(image, Image::ReadOnlyMap(_)));
        let mut contents = Vec::new();
        image.reader().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, vec![0x02, 0x00, 0xAA, 0xBB]);
    }

    #[test]
    fn test_memory_image() {
        let image = Image::from_bytes(&[0x00, 0x00]);
        assert_eq!(image.len(), 2);
        assert_eq!(*image.reader().get_ref(), &[0x00u8, 0x00][..]);
    }

    #[test]
    fn test_open_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let image = Image::open(file.path()).unwrap();
        assert!(image.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_open_fifo() {
        use std::process::Command;
        use std::thread;

        let dir = tempfile::tempdir().unwrap();
        let fifo = dir.path().join("tape.fifo");
        let status = Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());

        // A FIFO reports a length of zero no matter what flows through it.
        let writer_path = fifo.clone();
        let writer = thread::spawn(move || {
            let mut pipe = std::fs::OpenOptions::new()
                .write(true)
                .open(writer_path)
                .unwrap();
            pipe.write_all(&[0x02, 0x00, 0xAA, 0xBB]).unwrap();
        });

        let image = Image::open(&fifo).unwrap();
        writer.join().unwrap();
        assert!(matches!(image, Image::Memory(_)));
        assert_eq!(image.as_bytes(), &[0x02, 0x00, 0xAA, 0xBB]);

        let mut tzx = Vec::new();
        let summary =
            crate::tape::convert(image.reader(), &mut tzx, crate::Strictness::Strict).unwrap();
        assert_eq!(summary.blocks, 1);
        assert_eq!(summary.payload_bytes, 2);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = Image::open(dir.path().join("missing.tap")).err().unwrap();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }
}
