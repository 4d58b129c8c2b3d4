use crate::error::Error;
use crate::rom::Rom;

#[derive(Debug, Clone)]
struct Section {
    begin: u32,
    end: u32, // exclusive
    name: String,
}

impl Section {
    fn new(begin: u32, end: u32, name: &str) -> Self {
        Self {
            begin,
            end,
            name: name.to_string(),
        }
    }

    fn overlaps(&self, begin: u32, end: u32) -> bool {
        begin < self.end && self.begin < end
    }
}

/// Tracks which parts of the ROM the current compile has claimed.
#[derive(Debug, Default)]
pub struct Allocator {
    map: Vec<Section>,
}

impl Allocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim memory at a specific address
    pub fn reserve(&mut self, addr: u32, size: usize, name: &str) -> Result<(), Error> {
        if size == 0 {
            return Ok(());
        }
        let end = addr
            .checked_add(size as u32)
            .ok_or_else(|| Error::OutOfRange(addr, size))?;

        if let Some(section) = self.map.iter().find(|s| s.overlaps(addr, end)) {
            tracing::debug!("{name} overlaps {}", section.name);
            return Err(Error::AddressConflict(name.to_string(), addr, end - 1));
        }

        let pos = self.map.partition_point(|s| s.begin < addr);
        self.map.insert(pos, Section::new(addr, end, name));
        Ok(())
    }

    /// Claim the first run of `size` fill bytes at or after `from` that no
    /// other block has claimed.
    pub fn find<R: Rom + ?Sized>(
        &mut self,
        rom: &R,
        from: u32,
        size: usize,
        fill: u8,
        name: &str,
    ) -> Result<u32, Error> {
        let image = rom.read_from(0);
        let mut addr = from as usize;
        loop {
            let end = addr + size;
            if end > image.len() {
                return Err(Error::NoFreeSpace(name.to_string(), size));
            }

            // Move past claimed sections
            if let Some(section) = self.map.iter().find(|s| s.overlaps(addr as u32, end as u32)) {
                addr = section.end as usize;
                continue;
            }

            // Restart after the last byte that is not free
            if let Some(pos) = image[addr..end].iter().rposition(|&b| b != fill) {
                addr += pos + 1;
                continue;
            }

            tracing::debug!("{name}: {size} bytes at 0x{addr:X}");
            self.reserve(addr as u32, size, name)?;
            return Ok(addr as u32);
        }
    }
}
