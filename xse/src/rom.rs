use crate::ast::Directive;
use crate::decompile::{BlockKind, Decompiler};
use crate::error::Error;
use arch::FillByte;

/// Byte-addressable ROM image.
pub trait Rom {
    /// Bytes from `offset` to the end of the image; empty when out of range.
    fn read_from(&self, offset: u32) -> &[u8];

    fn write_at(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Error>;

    fn len(&self) -> usize {
        self.read_from(0).len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Rom for Vec<u8> {
    fn read_from(&self, offset: u32) -> &[u8] {
        self.get(offset as usize..).unwrap_or(&[])
    }

    fn write_at(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Error> {
        let start = offset as usize;
        let end = start + bytes.len();
        if end > self.len() {
            return Err(Error::OutOfRange(offset, bytes.len()));
        }
        self[start..end].copy_from_slice(bytes);
        Ok(())
    }
}

/// Ranges `(offset, length)` a directive covers in `rom`.
pub fn ranges<R: Rom + ?Sized>(rom: &R, directive: &Directive) -> Vec<(u32, usize)> {
    let chased = |start: u32, kind: BlockKind| {
        let mut decompiler = Decompiler::new(rom);
        let block = decompiler.block(start, kind);
        vec![(block.address, block.bytes.len())]
    };
    match *directive {
        Directive::Erase { offset, length } => vec![(offset, length as usize)],
        Directive::EraseRange { start, end } => {
            vec![(start, end.saturating_sub(start) as usize)]
        }
        Directive::Remove(offset) => chased(offset, BlockKind::Script),
        Directive::RemoveMart(offset) => chased(offset, BlockKind::Shop),
        Directive::RemoveMove(offset) => chased(offset, BlockKind::Movement),
        Directive::RemoveAll(offset) => Decompiler::new(rom)
            .run(offset)
            .blocks
            .values()
            .map(|block| (block.address, block.bytes.len()))
            .collect(),
    }
}

/// Overwrites everything a directive covers with the fill byte.
pub fn apply<R: Rom + ?Sized>(
    rom: &mut R,
    directive: &Directive,
    fill: FillByte,
) -> Result<Vec<(u32, usize)>, Error> {
    let ranges = ranges(rom, directive);
    for &(offset, length) in &ranges {
        tracing::debug!("erase 0x{offset:X}+{length}");
        rom.write_at(offset, &vec![fill.byte(); length])?;
    }
    Ok(ranges)
}
