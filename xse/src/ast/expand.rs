use super::resolver::{Operand, Resolver};
use super::Encoding;
use crate::grammer::token::Span;
use arch::command::lookup;
use arch::macros::{
    BATTLE_STYLE_BASE, ITEM_VARS, NAV_SPECIAL, NAV_VAR, STD_GIVEITEM2, STD_GIVEITEM3,
};
use arch::{MacroKind, ParamType};

impl Resolver {
    pub(super) fn expand(
        &mut self,
        kind: MacroKind,
        operands: Vec<(ParamType, Operand)>,
        span: Span,
    ) {
        let mut args = operands.into_iter().map(|(_, operand)| operand);
        let mut next = || args.next().unwrap_or(Operand::Value(0));
        let value = Operand::Value;

        match kind {
            MacroKind::Text => {
                let text = next();
                self.push("=", Encoding::Text, vec![(ParamType::Str, text)], span);
            }
            MacroKind::Braille => {
                let text = next();
                self.push("#braille", Encoding::Braille, vec![(ParamType::Str, text)], span);
            }
            MacroKind::Msgbox => {
                let (text, style) = (next(), next());
                self.emit("loadpointer", vec![value(0x0), text], span);
                self.emit("callstd", vec![style], span);
            }
            MacroKind::GiveItem => {
                let (item, amount, function) = (next(), next(), next());
                self.emit("copyvarifnotzero", vec![value(ITEM_VARS[0]), item], span);
                self.emit("copyvarifnotzero", vec![value(ITEM_VARS[1]), amount], span);
                self.emit("callstd", vec![function], span);
            }
            MacroKind::GiveItem2 => {
                let (item, amount, song) = (next(), next(), next());
                self.emit("copyvarifnotzero", vec![value(ITEM_VARS[0]), item], span);
                self.emit("copyvarifnotzero", vec![value(ITEM_VARS[1]), amount], span);
                self.emit("copyvarifnotzero", vec![value(ITEM_VARS[2]), song], span);
                self.emit("callstd", vec![value(STD_GIVEITEM2)], span);
            }
            MacroKind::GiveItem3 => {
                let decoration = next();
                self.emit("copyvarifnotzero", vec![value(ITEM_VARS[0]), decoration], span);
                self.emit("callstd", vec![value(STD_GIVEITEM3)], span);
            }
            MacroKind::WildBattle => {
                let (species, level, item) = (next(), next(), next());
                self.emit("setwildbattle", vec![species, level, item], span);
                self.emit("dowildbattle", vec![], span);
            }
            MacroKind::WildBattle2 => {
                let (species, level, item, style) = (next(), next(), next(), next());
                let special = match style {
                    Operand::Value(style) => value(BATTLE_STYLE_BASE + style),
                    other => other,
                };
                self.emit("setwildbattle", vec![species, level, item], span);
                self.emit("special", vec![special], span);
                self.emit("waitstate", vec![], span);
            }
            MacroKind::RegisterNav => {
                let trainer = next();
                self.emit("setvar", vec![value(NAV_VAR), trainer], span);
                self.emit("special", vec![value(NAV_SPECIAL)], span);
            }
            _ => {}
        }
    }

    /// Appends one command of an expansion, typed by its table entry.
    fn emit(&mut self, name: &str, operands: Vec<Operand>, span: Span) {
        let Some(template) = lookup(name) else {
            return;
        };
        let Some(opcode) = template.opcode() else {
            return;
        };
        let typed = template
            .params
            .iter()
            .map(|param| param.ty)
            .zip(operands)
            .collect();
        self.push(template.name, Encoding::Opcode(opcode), typed, span);
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Program, Resolver, Value};

    fn expand(code: &str) -> Vec<(String, Vec<Value>)> {
        let program: Program = crate::build(&format!("#org 0x800000\n{code}"), Resolver::new());
        assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);
        program.blocks[0]
            .commands
            .iter()
            .map(|c| {
                let values = c.params.iter().map(|p| p.value.clone()).collect();
                (c.name.to_string(), values)
            })
            .collect()
    }

    macro_rules! case {
        ($name:ident, $code:expr, [$(($cmd:expr, [$($v:expr),*])),*]) => {
            #[test]
            fn $name() {
                let expect: Vec<(String, Vec<Value>)> =
                    vec![$(($cmd.to_string(), vec![$(Value::Literal($v)),*])),*];
                assert_eq!(expand($code), expect);
            }
        };
    }

    case!(msgbox, "msgbox 0x880000 0x6", [("loadpointer", [0x0, 0x880000]), ("callstd", [0x6])]);
    case!(
        giveitem,
        "giveitem 0xD 0x1 0x1",
        [
            ("copyvarifnotzero", [0x8000, 0xD]),
            ("copyvarifnotzero", [0x8001, 0x1]),
            ("callstd", [0x1])
        ]
    );
    case!(
        giveitem2,
        "giveitem2 0xD 0x1 0x13E",
        [
            ("copyvarifnotzero", [0x8000, 0xD]),
            ("copyvarifnotzero", [0x8001, 0x1]),
            ("copyvarifnotzero", [0x8002, 0x13E]),
            ("callstd", [0x9])
        ]
    );
    case!(
        giveitem3,
        "giveitem3 0x5",
        [("copyvarifnotzero", [0x8000, 0x5]), ("callstd", [0x7])]
    );
    case!(
        wildbattle,
        "wildbattle 0x19 0x5 0x0",
        [("setwildbattle", [0x19, 0x5, 0x0]), ("dowildbattle", [])]
    );
    case!(
        wildbattle2,
        "wildbattle2 0x19 0x5 0x0 0x2",
        [
            ("setwildbattle", [0x19, 0x5, 0x0]),
            ("special", [0x139]),
            ("waitstate", [])
        ]
    );
    case!(
        registernav,
        "registernav 0x3",
        [("setvar", [0x8004, 0x3]), ("special", [0xEA])]
    );

    #[test]
    fn msgbox_with_label() {
        let program = crate::build(
            "#dynamic 0x720000\n#org @main\nmsgbox @text 0x6\n#org @text\n= \"Hi\"",
            Resolver::new(),
        );
        assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);
        let sites: Vec<_> = program.ledger.sites().collect();
        assert_eq!(sites.len(), 1);
        let (label, sites) = sites[0];
        assert_eq!(label, "text");
        assert_eq!((sites[0].block, sites[0].command, sites[0].param), (0, 0, 1));
    }
}
