use xse::ast::Resolver;
use xse::grammer::token::Span;
use xse::{build, compile, Compiled, Error, Options, Program, Severity};

fn program(code: &str) -> Program {
    let program = build(code, Resolver::new());
    for diagnostic in &program.diagnostics {
        println!("{}: {:?}", diagnostic.span, diagnostic.error);
    }
    program
}

fn errors(code: &str) -> Vec<Error> {
    program(code)
        .diagnostics
        .into_iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| d.error)
        .collect()
}

fn compile_on(code: &str, rom: &Vec<u8>) -> Compiled {
    match compile(&program(code), rom, &Options::default()) {
        Ok(compiled) => compiled,
        Err(e) => panic!("{code:?}: {e}"),
    }
}

fn blank_rom() -> Vec<u8> {
    vec![0xFF; 0x90_0000]
}

fn bytes(code: &str) -> Vec<u8> {
    compile_on(code, &blank_rom()).blocks[0].bytes.clone()
}

macro_rules! case {
    ($name:ident, $code:expr, [$($byte:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            assert_eq!(bytes($code), vec![$($byte),*]);
        }
    };
}

// Encoding
case!(setvar_end, "#org 0x800000\nsetvar 0x4050 0x1\nend", [0x16, 0x50, 0x40, 0x01, 0x00, 0x02]);
case!(raw_tags, "#org 0x800000\n#raw 0x1 0x2 word 0x3 0x4", [0x01, 0x02, 0x03, 0x00, 0x04]);
case!(raw_pointer, "#org 0x800000\n#raw pointer 0x800000", [0x00, 0x00, 0x80, 0x08]);
case!(biased_pointer, "#org 0x800000\ngoto 0x08800010", [0x05, 0x10, 0x00, 0x80, 0x08]);
case!(if_goto, "#org 0x800000\nif 0x1 goto 0x800000", [0x06, 0x01, 0x00, 0x00, 0x80, 0x08]);
case!(if_call, "#org 0x800000\nif 0x1 call 0x800000", [0x07, 0x01, 0x00, 0x00, 0x80, 0x08]);
case!(synonym, "#org 0x800000\njump 0x800000", [0x05, 0x00, 0x00, 0x80, 0x08]);
case!(symbol, "#define FLAG 0x200\n#org 0x800000\nsetflag FLAG", [0x29, 0x00, 0x02]);
case!(raw_symbol_named_like_tag, "#define B 0x5\n#org 0x800000\n#raw B 0x1", [0x05, 0x01]);
case!(
    msgbox,
    "#org 0x800000\nmsgbox 0x800010 0x6",
    [0x0F, 0x00, 0x10, 0x00, 0x80, 0x08, 0x09, 0x06]
);
case!(text, "#org 0x800000\n= \"Hi [player]\\n\"", [0xC2, 0xDD, 0x00, 0xFD, 0x01, 0xFE, 0xFF]);
case!(
    trainerbattle_kind3,
    "#org 0x800000\ntrainerbattle 0x3 0x1 0x0 0x800000",
    [0x5C, 0x03, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x08]
);

// Hoisting: directives apply to the whole script wherever they appear
case!(define_after_use, "#org 0x800000\nsetflag FLAG\n#define FLAG 0x200", [0x29, 0x00, 0x02]);
case!(alias_after_use, "#org 0x800000\nleave\n#alias leave end", [0x02]);

#[test]
fn dynamic_after_use() {
    let compiled = compile_on("#org @main\nend\n#dynamic 0x720000", &blank_rom());
    assert_eq!(compiled.blocks[0].address, 0x720000);
}

#[test]
fn dynamic_scenario() {
    let compiled = compile_on("#dynamic 0x720000\n#org @1\nend\n", &blank_rom());
    assert_eq!(compiled.blocks.len(), 1);
    let block = &compiled.blocks[0];
    assert_eq!(block.label.as_deref(), Some("1"));
    assert_eq!(block.address, 0x720000);
    assert_eq!(block.bytes.len(), 1);

    let mut rom = blank_rom();
    rom[0x720000] = 0x00;
    let compiled = compile_on("#dynamic 0x720000\n#org @1\nend\n", &rom);
    assert_eq!(compiled.blocks[0].address, 0x720001);
}

#[test]
fn dynamic_pointers_are_patched() {
    let code = "#dynamic 0x720000\n#org @main\nmsgbox @text 0x6\ngoto @main\n#org @text\n= \"Hi\"";
    let compiled = compile_on(code, &blank_rom());
    let main = &compiled.blocks[0];
    let text = &compiled.blocks[1];
    assert_eq!(main.address, 0x720000);
    assert_eq!(text.address, 0x720000 + 13);
    assert_eq!(
        main.bytes,
        vec![
            0x0F, 0x00, 0x0D, 0x00, 0x72, 0x08, // loadpointer 0x0 @text
            0x09, 0x06, // callstd 0x6
            0x05, 0x00, 0x00, 0x72, 0x08, // goto @main
        ]
    );
}

#[test]
fn allocations_never_overlap() {
    let mut rom = blank_rom();
    for addr in [0x720003, 0x720009, 0x72000A, 0x720020] {
        rom[addr] = 0x00;
    }
    let code = "#dynamic 0x720000\n\
        #org @a\nsetvar 0x4050 0x1\nend\n\
        #org @b\nend\n\
        #org @c\nsetvar 0x4050 0x1\n\
        #org 0x720010\nsetvar 0x1 0x1\nsetvar 0x2 0x2\nend\n\
        #org @d\n= \"Hello\"";
    let compiled = compile_on(code, &rom);

    let mut ranges: Vec<_> = compiled
        .blocks
        .iter()
        .map(|b| (b.address, b.address + b.bytes.len() as u32))
        .collect();
    ranges.sort();
    for pair in ranges.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "{:X?} overlaps {:X?}", pair[0], pair[1]);
    }
    for block in compiled.blocks.iter().filter(|b| b.label.is_some()) {
        let range = block.address as usize..block.address as usize + block.bytes.len();
        assert!(rom[range].iter().all(|&b| b == 0xFF), "{:?}", block.label);
    }
}

#[test]
fn no_free_space() {
    let rom = vec![0xFF; 0x720004];
    let result = compile(
        &program("#dynamic 0x720000\n#org @big\nsetvar 0x4050 0x1\nend"),
        &rom,
        &Options::default(),
    );
    assert_eq!(result.unwrap_err(), Error::NoFreeSpace("@big".to_string(), 6));
}

#[test]
fn zero_fill() {
    let mut rom = vec![0x00; 0x720010];
    rom[0x720000] = 0xFF;
    let compiled = compile_on("#freespace 0x0\n#dynamic 0x720000\n#org @a\nend", &rom);
    assert_eq!(compiled.blocks[0].address, 0x720001);
}

// Arity
#[test]
fn arity_boundary() {
    assert_eq!(
        errors("#org 0x800000\nsetvar 0x4050"),
        vec![Error::MissingParams("setvar".to_string(), 2, 1)]
    );
    assert!(errors("#org 0x800000\nsetvar 0x4050 0x1").is_empty());

    let program = program("#org 0x800000\nsetvar 0x4050 0x1 0x2 0x3");
    assert_eq!(program.diagnostics.len(), 1);
    assert_eq!(program.diagnostics[0].error, Error::ExtraParams("setvar".to_string(), 2));
    assert_eq!(program.diagnostics[0].span, Span::new(1, 18, 25));
}

#[test]
fn trainerbattle_arity() {
    assert!(errors("#org 0x800000\ntrainerbattle 0x0 0x1 0x0 0x800000 0x800010").is_empty());
    assert_eq!(
        errors("#org 0x800000\ntrainerbattle 0x3 0x1 0x0 0x800000 0x800010"),
        vec![Error::ExtraParams("trainerbattle".to_string(), 4)]
    );
    assert_eq!(
        errors("#org 0x800000\ntrainerbattle 0x1 0x1 0x0 0x800000 0x800010"),
        vec![Error::MissingParams("trainerbattle".to_string(), 6, 5)]
    );
}

// Ledger
#[test]
fn ledger_errors() {
    assert_eq!(
        errors("#dynamic 0x720000\n#org @a\nend\n#org @a\nend"),
        vec![Error::DuplicateLabel("a".to_string())]
    );
    assert_eq!(
        errors("#dynamic 0x720000\n#org @a\ngoto @nowhere\ncall @nowhere"),
        vec![
            Error::UnknownLabel("nowhere".to_string()),
            Error::UnknownLabel("nowhere".to_string())
        ]
    );
    assert_eq!(
        errors("#org @a\ngoto @a"),
        vec![Error::MissingBase("a".to_string()), Error::MissingBase("a".to_string())]
    );
}

#[test]
fn configured_base() {
    let program = build("#org @a\nend", Resolver::new().with_base(Some(0x08740000)));
    let compiled = compile(&program, &blank_rom(), &Options::default()).unwrap();
    assert_eq!(compiled.blocks[0].address, 0x740000);
}

#[test]
fn errors_refuse_compile() {
    let program = program("#org 0x800000\nsetvar 0x4050\n0x1");
    assert_eq!(program.errors(), 2);
    let result = compile(&program, &blank_rom(), &Options::default());
    assert_eq!(result.unwrap_err(), Error::Diagnostics(2));
}

#[test]
fn write_blocks() {
    let mut rom = blank_rom();
    let compiled = compile_on("#org 0x800000\nsetvar 0x4050 0x1\nend", &rom);
    compiled.write(&mut rom).unwrap();
    assert_eq!(&rom[0x800000..0x800007], &[0x16, 0x50, 0x40, 0x01, 0x00, 0x02, 0xFF]);
}
