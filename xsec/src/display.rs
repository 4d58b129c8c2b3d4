use color_print::cprintln;
use xse::ast::Directive;
use xse::{Compiled, CompiledBlock};

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_block(block: &CompiledBlock) {
    match &block.label {
        Some(label) => cprintln!(
            "+----------+ <green>@{}</green> : 0x{:X} ({} bytes)",
            label,
            block.address,
            block.bytes.len()
        ),
        None => cprintln!(
            "+----------+ <red>0x{:X}</red> ({} bytes)",
            block.address,
            block.bytes.len()
        ),
    }
    for line in &block.lines {
        let start = (line.address - block.address) as usize;
        let bytes = block.bytes.get(start..start + line.size).unwrap_or(&[]);
        // Long text lines only show their first bytes
        let mut shown = hex(&bytes[..bytes.len().min(8)]);
        if bytes.len() > 8 {
            shown.push_str(" ..");
        }
        cprintln!("| 0x{:07X} : {:<26} {}", line.address, shown, line.text);
    }
}

/// Listing of everything a compile placed, in address order.
pub fn print_dump(compiled: &Compiled) {
    println!("+-[Blocks]-+-----------------------------------------------------------------------");
    let mut blocks: Vec<_> = compiled.blocks.iter().collect();
    blocks.sort_by_key(|block| block.address);
    for block in blocks {
        print_block(block);
    }

    if !compiled.symbols.is_empty() {
        println!("+-[Symbols]+-----------------------------------------------------------------------");
        for (name, value) in &compiled.symbols {
            cprintln!("| <m>{}</m> = 0x{:X}", name, value);
        }
    }

    if !compiled.directives.is_empty() {
        println!("+-[Erase]--+-----------------------------------------------------------------------");
        for directive in &compiled.directives {
            let text = match directive {
                Directive::Erase { offset, length } => format!("#erase 0x{offset:X} 0x{length:X}"),
                Directive::EraseRange { start, end } => {
                    format!("#eraserange 0x{start:X} 0x{end:X}")
                }
                Directive::Remove(offset) => format!("#remove 0x{offset:X}"),
                Directive::RemoveAll(offset) => format!("#removeall 0x{offset:X}"),
                Directive::RemoveMart(offset) => format!("#removemart 0x{offset:X}"),
                Directive::RemoveMove(offset) => format!("#removemove 0x{offset:X}"),
            };
            cprintln!("| <y>{}</y>", text);
        }
    }
    println!("+----------+-----------------------------------------------------------------------");
}
