mod allocator;

pub use allocator::Allocator;

use crate::ast::{Block, Command, Directive, Encoding, Origin, Program, Value};
use crate::error::Error;
use crate::rom::Rom;
use arch::charset::{Charset, BRAILLE, TEXT};
use arch::{FillByte, ParamType, Pointer};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    pub autobank: bool,
    pub text: &'a Charset,
    pub braille: &'a Charset,
}

impl Default for Options<'static> {
    fn default() -> Self {
        Options {
            autobank: true,
            text: &TEXT,
            braille: &BRAILLE,
        }
    }
}

/// One source command as placed in the ROM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub address: u32,
    pub size: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledBlock {
    pub label: Option<String>,
    pub address: u32,
    pub bytes: Vec<u8>,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Compiled {
    pub blocks: Vec<CompiledBlock>,
    pub symbols: IndexMap<String, u32>,
    pub directives: Vec<Directive>,
    pub fill: FillByte,
}

impl Compiled {
    pub fn write<R: Rom + ?Sized>(&self, rom: &mut R) -> Result<(), Error> {
        for block in &self.blocks {
            rom.write_at(block.address, &block.bytes)?;
        }
        Ok(())
    }
}

/// A block before placement.
struct Encoded {
    bytes: Vec<u8>,
    // first byte of every command
    starts: Vec<usize>,
    // byte offset of every parameter, per command
    offsets: Vec<Vec<usize>>,
    address: u32,
}

pub fn compile<R: Rom + ?Sized>(
    program: &Program,
    rom: &R,
    options: &Options,
) -> Result<Compiled, Error> {
    let errors = program.errors();
    if errors > 0 {
        return Err(Error::Diagnostics(errors));
    }

    // 1. Encode
    let mut encoded = program
        .blocks
        .iter()
        .map(|block| encode_block(block, options))
        .collect::<Result<Vec<_>, _>>()?;

    // 2. Place static blocks, then dynamic ones in declaration order
    let mut allocator = Allocator::new();
    for (block, enc) in program.blocks.iter().zip(encoded.iter_mut()) {
        if let Origin::Static(addr) = block.origin {
            allocator.reserve(addr, enc.bytes.len(), &block.origin.to_string())?;
            enc.address = addr;
        }
    }
    let mut cursor = program.ledger.base().unwrap_or(0);
    let mut addresses = IndexMap::new();
    for (label, idx) in program.ledger.declared() {
        let size = encoded[idx].bytes.len();
        let name = format!("@{label}");
        let addr = allocator.find(rom, cursor, size, program.fill.byte(), &name)?;
        cursor = addr + size as u32;
        encoded[idx].address = addr;
        addresses.insert(label, addr);
    }

    // 3. Patch placeholders
    for (label, sites) in program.ledger.sites() {
        let Some(&addr) = addresses.get(label) else {
            continue;
        };
        let pointer = Pointer::from_raw(addr).to_bytes(options.autobank);
        for site in sites {
            let enc = &mut encoded[site.block];
            let offset = enc.offsets[site.command][site.param];
            enc.bytes[offset..offset + pointer.len()].copy_from_slice(&pointer);
        }
    }

    let blocks = program
        .blocks
        .iter()
        .zip(encoded)
        .map(|(block, enc)| CompiledBlock {
            label: block.label().map(str::to_string),
            lines: lines(block, &enc),
            address: enc.address,
            bytes: enc.bytes,
        })
        .collect();

    Ok(Compiled {
        blocks,
        symbols: program.symbols.clone(),
        directives: program.directives.clone(),
        fill: program.fill,
    })
}

fn lines(block: &Block, enc: &Encoded) -> Vec<Line> {
    let mut starts = enc.starts.clone();
    starts.push(enc.bytes.len());
    block
        .commands
        .iter()
        .zip(starts.windows(2))
        .map(|(command, range)| Line {
            address: enc.address + range[0] as u32,
            size: range[1] - range[0],
            text: command.to_string(),
        })
        .collect()
}

fn encode_block(block: &Block, options: &Options) -> Result<Encoded, Error> {
    let mut enc = Encoded {
        bytes: Vec::new(),
        starts: Vec::new(),
        offsets: Vec::new(),
        address: 0,
    };
    for command in &block.commands {
        enc.starts.push(enc.bytes.len());
        let offsets = encode_command(command, options, &mut enc.bytes)?;
        enc.offsets.push(offsets);
    }
    Ok(enc)
}

fn encode_command(
    command: &Command,
    options: &Options,
    bytes: &mut Vec<u8>,
) -> Result<Vec<usize>, Error> {
    if let Encoding::Opcode(opcode) = command.encoding {
        bytes.push(opcode);
    }
    let mut offsets = Vec::new();
    for param in &command.params {
        offsets.push(bytes.len());
        match &param.value {
            Value::Literal(value) => match param.ty {
                ParamType::Byte => bytes.push(*value as u8),
                ParamType::Word => bytes.extend((*value as u16).to_le_bytes()),
                ParamType::Dword => bytes.extend(value.to_le_bytes()),
                ParamType::Pointer => {
                    bytes.extend(Pointer::from_raw(*value).to_bytes(options.autobank))
                }
                ParamType::Str | ParamType::Symbol | ParamType::Command => {}
            },
            Value::Dynamic(_) => bytes.extend([0; 4]),
            Value::Text(text) => {
                let charset = match command.encoding {
                    Encoding::Braille => options.braille,
                    _ => options.text,
                };
                let encoded = charset
                    .encode(text)
                    .map_err(|ch| Error::MissingGlyph(ch, command.span.line()))?;
                bytes.extend(encoded);
            }
        }
    }
    Ok(offsets)
}
