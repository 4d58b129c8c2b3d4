use crate::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use xse::Rom;

/// ROM image loaded from disk. Writes stay in memory until `save`.
#[derive(Debug)]
pub struct FileRom {
    path: PathBuf,
    image: Vec<u8>,
}

impl FileRom {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let image = fs::read(path).map_err(|e| Error::Open(path.display().to_string(), e))?;
        tracing::debug!("loaded {} (0x{:X} bytes)", path.display(), image.len());
        Ok(FileRom {
            path: path.to_path_buf(),
            image,
        })
    }

    pub fn save(&self) -> Result<(), Error> {
        fs::write(&self.path, &self.image)
            .map_err(|e| Error::Write(self.path.display().to_string(), e))?;
        tracing::debug!("saved {}", self.path.display());
        Ok(())
    }
}

impl Rom for FileRom {
    fn read_from(&self, offset: u32) -> &[u8] {
        self.image.read_from(offset)
    }

    fn write_at(&mut self, offset: u32, bytes: &[u8]) -> Result<(), xse::Error> {
        self.image.write_at(offset, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_write_save() {
        let path = std::env::temp_dir().join(format!("xsec-rom-{}.gba", std::process::id()));
        fs::write(&path, [0xFFu8; 8]).unwrap();

        let mut rom = FileRom::load(&path).unwrap();
        assert_eq!(rom.len(), 8);
        rom.write_at(2, &[0x02]).unwrap();
        assert!(rom.write_at(8, &[0x02]).is_err());
        rom.save().unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![0xFF, 0xFF, 0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file() {
        let result = FileRom::load(Path::new("/nonexistent/rom.gba"));
        assert!(matches!(result, Err(Error::Open(..))));
    }
}
