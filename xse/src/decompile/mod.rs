mod pattern;

use crate::rom::Rom;
use arch::charset::{Charset, BRAILLE, TEXT};
use arch::command::{by_opcode, Template};
use arch::{ParamType, Pointer};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// How the bytes at an address are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BlockKind {
    Script,
    Text,
    Braille,
    Shop,
    Movement,
}

/// A decoded parameter. `value` is the raw value read from the ROM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operand {
    pub name: &'static str,
    pub ty: ParamType,
    pub value: u32,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            ParamType::Pointer => write!(f, "{}", Pointer::from_raw(self.value)),
            _ => write!(f, "0x{:X}", self.value),
        }
    }
}

/// A decoded command, or a macro folded from several (`opcode` is `None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub name: &'static str,
    pub opcode: Option<u8>,
    pub params: Vec<Operand>,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for param in &self.params {
            write!(f, " {param}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Content {
    Script(Vec<Command>),
    Text(String),
    Braille(String),
    Shop(Vec<u16>),
    Movement(Vec<u8>),
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Script(commands) => commands.iter().try_for_each(|c| writeln!(f, "{c}")),
            Content::Text(text) => writeln!(f, "= \"{text}\""),
            Content::Braille(text) => writeln!(f, "#braille \"{text}\""),
            Content::Shop(items) => items
                .iter()
                .try_for_each(|item| writeln!(f, "#raw word 0x{item:X}")),
            Content::Movement(steps) => steps
                .iter()
                .try_for_each(|step| writeln!(f, "#raw 0x{step:X}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub address: u32,
    pub kind: BlockKind,
    pub bytes: Vec<u8>,
    pub content: Content,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Decompiled {
    pub blocks: IndexMap<u32, Block>,
    pub text: String,
}

/// Walks a ROM image from a script, following every pointer it can
/// classify. Each address is decoded at most once.
pub struct Decompiler<'a> {
    image: &'a [u8],
    text: &'a Charset,
    braille: &'a Charset,
    seen: HashSet<u32>,
    queue: VecDeque<(u32, BlockKind)>,
}

impl<'a> Decompiler<'a> {
    pub fn new<R: Rom + ?Sized>(rom: &'a R) -> Self {
        Decompiler {
            image: rom.read_from(0),
            text: &TEXT,
            braille: &BRAILLE,
            seen: HashSet::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn with_charsets(mut self, text: &'a Charset, braille: &'a Charset) -> Self {
        self.text = text;
        self.braille = braille;
        self
    }

    /// Decodes everything reachable from the script at `start`.
    pub fn run(mut self, start: u32) -> Decompiled {
        self.queue
            .push_back((Pointer::from_raw(start).offset(), BlockKind::Script));

        let mut blocks = IndexMap::new();
        while let Some((address, kind)) = self.queue.pop_front() {
            if !self.seen.insert(address) {
                continue;
            }
            let block = self.block(address, kind);
            blocks.insert(address, block);
        }
        tracing::debug!("decompiled {} blocks from 0x{start:X}", blocks.len());

        let text = blocks
            .values()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Decompiled { blocks, text }
    }

    /// Decodes one block. Pointers found in a script are queued for `run`.
    pub fn block(&mut self, address: u32, kind: BlockKind) -> Block {
        let data = self.image.get(address as usize..).unwrap_or(&[]);
        let (content, len) = match kind {
            BlockKind::Script => {
                let (commands, len) = self.script(data);
                (Content::Script(pattern::resugar(commands)), len)
            }
            BlockKind::Text => {
                let (text, len) = self.text.decode(data);
                (Content::Text(text), len)
            }
            BlockKind::Braille => {
                let (text, len) = self.braille.decode(data);
                (Content::Braille(text), len)
            }
            BlockKind::Shop => {
                let (items, len) = shop(data);
                (Content::Shop(items), len)
            }
            BlockKind::Movement => {
                let steps = movement(data);
                let len = steps.len();
                (Content::Movement(steps), len)
            }
        };
        tracing::trace!("{kind:?} at 0x{address:X}: {len} bytes");

        Block {
            address,
            kind,
            bytes: data[..len].to_vec(),
            text: format!("#org 0x{address:X}\n{content}"),
            content,
        }
    }

    fn script(&mut self, data: &[u8]) -> (Vec<Command>, usize) {
        let mut commands = Vec::new();
        let mut pos = 0;
        while let Some(&opcode) = data.get(pos) {
            let Some(template) = by_opcode(opcode) else {
                tracing::trace!("unknown opcode 0x{opcode:02X}");
                break;
            };
            let Some((params, size)) = decode_params(template, &data[pos + 1..]) else {
                tracing::trace!("{} runs past the end of the ROM", template.name);
                break;
            };
            pos += 1 + size;

            let command = Command {
                name: template.name,
                opcode: Some(opcode),
                params,
            };
            self.chase(&command);
            commands.push(command);
            if template.terminal {
                break;
            }
        }
        (commands, pos)
    }

    fn chase(&mut self, command: &Command) {
        let kind = command.params.first().map(|p| p.value);
        for param in command.params.iter().filter(|p| p.ty == ParamType::Pointer) {
            let Some(target) = pointee(command.name, param.name, kind) else {
                continue;
            };
            if !Pointer::is_rom(param.value) {
                continue;
            }
            let offset = Pointer::from_raw(param.value).offset();
            if !self.seen.contains(&offset) {
                self.queue.push_back((offset, target));
            }
        }
    }
}

/// What a pointer parameter points at, by command and parameter name.
fn pointee(command: &str, param: &str, first: Option<u32>) -> Option<BlockKind> {
    match (command, param) {
        ("trainerbattle", "intro" | "defeat") => Some(BlockKind::Text),
        ("trainerbattle", "extra") => match first {
            Some(0x1 | 0x2) => Some(BlockKind::Script),
            _ => Some(BlockKind::Text),
        },
        ("trainerbattle", "continue") => Some(BlockKind::Script),
        (_, "script") => Some(BlockKind::Script),
        (_, "text") => Some(BlockKind::Text),
        (_, "braille") => Some(BlockKind::Braille),
        (_, "items") => Some(BlockKind::Shop),
        (_, "movements") => Some(BlockKind::Movement),
        _ => None,
    }
}

/// Reads the present parameters of `template`. `None` if the data ends
/// first.
fn decode_params(template: &Template, data: &[u8]) -> Option<(Vec<Operand>, usize)> {
    let mut values: Vec<Option<u32>> = Vec::new();
    let mut params = Vec::new();
    let mut pos = 0;
    for param in template.params {
        let width = param.ty.width();
        if width == 0 || !param.is_present(&values) {
            values.push(None);
            continue;
        }
        let bytes = data.get(pos..pos + width)?;
        let value = bytes
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | b as u32);
        pos += width;
        values.push(Some(value));
        params.push(Operand {
            name: param.name,
            ty: param.ty,
            value,
        });
    }
    Some((params, pos))
}

/// Item words up to a leading `0xFF` (left alone) or a `0x0000` word (kept).
fn shop(data: &[u8]) -> (Vec<u16>, usize) {
    let mut items = Vec::new();
    let mut pos = 0;
    while let Some(word) = data.get(pos..pos + 2) {
        if word[0] == 0xFF {
            break;
        }
        let item = u16::from_le_bytes([word[0], word[1]]);
        items.push(item);
        pos += 2;
        if item == 0 {
            break;
        }
    }
    (items, pos)
}

/// Movement bytes up to `0xFF` (left alone) or `0xFE` (kept).
fn movement(data: &[u8]) -> Vec<u8> {
    let mut steps = Vec::new();
    for &step in data {
        if step == 0xFF {
            break;
        }
        steps.push(step);
        if step == 0xFE {
            break;
        }
    }
    steps
}

pub fn decompile<R: Rom + ?Sized>(rom: &R, start: u32) -> Decompiled {
    Decompiler::new(rom).run(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(parts: &[(usize, &[u8])]) -> Vec<u8> {
        let mut rom = vec![0xFFu8; 0x40];
        for (at, bytes) in parts {
            rom[*at..*at + bytes.len()].copy_from_slice(bytes);
        }
        rom
    }

    fn kinds(decompiled: &Decompiled) -> Vec<(u32, BlockKind)> {
        decompiled
            .blocks
            .values()
            .map(|block| (block.address, block.kind))
            .collect()
    }

    #[test]
    fn stops_after_terminal() {
        let rom = image(&[(0, &[0x6A, 0x02, 0x6A])]);
        let block = Decompiler::new(&rom).block(0, BlockKind::Script);
        assert_eq!(block.bytes, vec![0x6A, 0x02]);
        assert_eq!(block.text, "#org 0x0\nlock\nend\n");
    }

    #[test]
    fn stops_at_unknown_opcode() {
        let rom = image(&[(0, &[0x6A, 0xF0, 0x02])]);
        let block = Decompiler::new(&rom).block(0, BlockKind::Script);
        assert_eq!(block.bytes, vec![0x6A]);
    }

    #[test]
    fn stops_at_truncated_command() {
        let rom = vec![0x6A, 0x16, 0x50];
        let block = Decompiler::new(&rom).block(0, BlockKind::Script);
        assert_eq!(block.bytes, vec![0x6A]);
    }

    #[test]
    fn msgbox_and_text() {
        let rom = image(&[
            (0x00, &[0x0F, 0x00, 0x10, 0x00, 0x00, 0x08, 0x09, 0x06, 0x02]),
            (0x10, &[0xC2, 0xDD, 0xFF]),
        ]);
        let decompiled = decompile(&rom, 0x08000000);
        assert_eq!(
            kinds(&decompiled),
            vec![(0x0, BlockKind::Script), (0x10, BlockKind::Text)]
        );
        assert_eq!(
            decompiled.text,
            "#org 0x0\nmsgbox 0x10 0x6\nend\n\n#org 0x10\n= \"Hi\"\n"
        );
        assert_eq!(decompiled.blocks[&0x10].bytes, vec![0xC2, 0xDD, 0xFF]);
    }

    #[test]
    fn cycles_visit_once() {
        // 0x00: call 0x08; end   0x08: goto 0x00
        let rom = image(&[
            (0x00, &[0x04, 0x08, 0x00, 0x00, 0x08, 0x02]),
            (0x08, &[0x05, 0x00, 0x00, 0x00, 0x08]),
        ]);
        let decompiled = decompile(&rom, 0);
        assert_eq!(
            kinds(&decompiled),
            vec![(0x0, BlockKind::Script), (0x8, BlockKind::Script)]
        );
    }

    #[test]
    fn ram_pointers_are_not_followed() {
        let rom = image(&[(0x00, &[0x04, 0x00, 0x00, 0x00, 0x02, 0x02])]);
        let decompiled = decompile(&rom, 0);
        assert_eq!(decompiled.blocks.len(), 1);
        assert_eq!(decompiled.text, "#org 0x0\ncall 0x2000000\nend\n");
    }

    #[test]
    fn shop_and_movement() {
        let rom = image(&[
            (0x00, &[0x86, 0x10, 0x00, 0x00, 0x08]),
            (0x05, &[0x4F, 0xFF, 0x00, 0x20, 0x00, 0x00, 0x08, 0x02]),
            (0x10, &[0x0D, 0x00, 0x0E, 0x00, 0x00, 0x00, 0x0F, 0x00]),
            (0x20, &[0x10, 0x11, 0xFF]),
        ]);
        let decompiled = decompile(&rom, 0);
        assert_eq!(
            kinds(&decompiled),
            vec![
                (0x0, BlockKind::Script),
                (0x10, BlockKind::Shop),
                (0x20, BlockKind::Movement)
            ]
        );
        assert_eq!(decompiled.blocks[&0x10].content, Content::Shop(vec![0xD, 0xE, 0x0]));
        assert_eq!(decompiled.blocks[&0x10].bytes.len(), 6);
        assert_eq!(decompiled.blocks[&0x20].text, "#org 0x20\n#raw 0x10\n#raw 0x11\n");
    }

    #[test]
    fn shop_stops_at_ff() {
        assert_eq!(shop(&[0x0D, 0x00, 0xFF, 0x00]), (vec![0xD], 2));
    }

    #[test]
    fn trainerbattle_pointers() {
        // kind 1: intro, defeat, then a script to run after the battle
        let rom = image(&[
            (
                0x00,
                &[
                    0x5C, 0x01, 0x05, 0x00, 0x00, 0x00, //
                    0x20, 0x00, 0x00, 0x08, //
                    0x24, 0x00, 0x00, 0x08, //
                    0x28, 0x00, 0x00, 0x08, //
                    0x02,
                ],
            ),
            (0x20, &[0xC2, 0xFF]),
            (0x24, &[0xDD, 0xFF]),
            (0x28, &[0x02]),
        ]);
        let decompiled = decompile(&rom, 0);
        assert_eq!(
            kinds(&decompiled),
            vec![
                (0x00, BlockKind::Script),
                (0x20, BlockKind::Text),
                (0x24, BlockKind::Text),
                (0x28, BlockKind::Script)
            ]
        );
        assert_eq!(
            decompiled.blocks[&0x0].content,
            Content::Script(vec![
                Command {
                    name: "trainerbattle",
                    opcode: Some(0x5C),
                    params: vec![
                        Operand { name: "kind", ty: ParamType::Byte, value: 0x1 },
                        Operand { name: "trainer", ty: ParamType::Word, value: 0x5 },
                        Operand { name: "local", ty: ParamType::Word, value: 0x0 },
                        Operand { name: "intro", ty: ParamType::Pointer, value: 0x08000020 },
                        Operand { name: "defeat", ty: ParamType::Pointer, value: 0x08000024 },
                        Operand { name: "extra", ty: ParamType::Pointer, value: 0x08000028 },
                    ],
                },
                Command {
                    name: "end",
                    opcode: Some(0x02),
                    params: vec![],
                },
            ])
        );
    }

    #[test]
    fn braille_block() {
        let rom = image(&[(0x00, &[0x78, 0x10, 0x00, 0x00, 0x08, 0x02]), (0x10, &[0x0D, 0x06, 0xFF])]);
        let decompiled = decompile(&rom, 0);
        assert_eq!(decompiled.blocks[&0x10].text, "#org 0x10\n#braille \"HI\"\n");
    }

    #[test]
    fn custom_charsets() {
        let codes: [&[u8]; 2] = [&[0x01], &[0x02]];
        let text = Charset::new([(codes[0], "a"), (codes[1], "b")], false);
        let dots = Charset::new([(codes[0], "o")], false);
        let rom = image(&[
            (0x00, &[0x0F, 0x00, 0x10, 0x00, 0x00, 0x08, 0x09, 0x06, 0x78, 0x20, 0x00, 0x00, 0x08, 0x02]),
            (0x10, &[0x02, 0x01, 0xFF]),
            (0x20, &[0x01, 0x01, 0xFF]),
        ]);
        let decompiled = Decompiler::new(&rom).with_charsets(&text, &dots).run(0);
        assert_eq!(decompiled.blocks[&0x10].text, "#org 0x10\n= \"ba\"\n");
        assert_eq!(decompiled.blocks[&0x20].text, "#org 0x20\n#braille \"oo\"\n");
    }
}
