use super::{Command, Operand};
use arch::command::lookup;
use arch::macros::{
    BATTLE_STYLE_BASE, ITEM_VARS, NAV_SPECIAL, NAV_VAR, STD_GIVEITEM2, STD_GIVEITEM3,
};

/// One parameter position of a command in a pattern.
#[derive(Debug, Clone, Copy)]
pub(super) enum Slot {
    /// The decoded value must equal this literal.
    Exact(u32),
    /// The value becomes parameter `n` of the macro, optionally mapped.
    /// A mapping that yields `None` rejects the match.
    Capture(usize, Option<fn(u32) -> Option<u32>>),
}

use Slot::{Capture, Exact};

/// Command sequence the compiler emits for one macro.
#[derive(Debug)]
pub(super) struct Pattern {
    pub name: &'static str,
    pub steps: &'static [(&'static str, &'static [Slot])],
}

fn battle_style(special: u32) -> Option<u32> {
    special
        .checked_sub(BATTLE_STYLE_BASE)
        .filter(|style| *style <= 0xFF)
}

const fn cap(n: usize) -> Slot {
    Capture(n, None)
}

/// Longest first, so that a sequence is claimed by the largest macro it
/// belongs to.
#[rustfmt::skip]
pub(super) static PATTERNS: &[Pattern] = &[
    Pattern {
        name: "giveitem2",
        steps: &[
            ("copyvarifnotzero", &[Exact(ITEM_VARS[0]), cap(0)]),
            ("copyvarifnotzero", &[Exact(ITEM_VARS[1]), cap(1)]),
            ("copyvarifnotzero", &[Exact(ITEM_VARS[2]), cap(2)]),
            ("callstd", &[Exact(STD_GIVEITEM2)]),
        ],
    },
    Pattern {
        name: "giveitem",
        steps: &[
            ("copyvarifnotzero", &[Exact(ITEM_VARS[0]), cap(0)]),
            ("copyvarifnotzero", &[Exact(ITEM_VARS[1]), cap(1)]),
            ("callstd", &[cap(2)]),
        ],
    },
    Pattern {
        name: "wildbattle2",
        steps: &[
            ("setwildbattle", &[cap(0), cap(1), cap(2)]),
            ("special", &[Capture(3, Some(battle_style))]),
            ("waitstate", &[]),
        ],
    },
    Pattern {
        name: "giveitem3",
        steps: &[
            ("copyvarifnotzero", &[Exact(ITEM_VARS[0]), cap(0)]),
            ("callstd", &[Exact(STD_GIVEITEM3)]),
        ],
    },
    Pattern {
        name: "msgbox",
        steps: &[
            ("loadpointer", &[Exact(0x0), cap(0)]),
            ("callstd", &[cap(1)]),
        ],
    },
    Pattern {
        name: "wildbattle",
        steps: &[
            ("setwildbattle", &[cap(0), cap(1), cap(2)]),
            ("dowildbattle", &[]),
        ],
    },
    Pattern {
        name: "registernav",
        steps: &[
            ("setvar", &[Exact(NAV_VAR), cap(0)]),
            ("special", &[Exact(NAV_SPECIAL)]),
        ],
    },
];

impl Pattern {
    /// Matches the pattern against the start of `commands` and builds the
    /// macro command on success.
    fn matches(&self, commands: &[Command]) -> Option<Command> {
        let template = lookup(self.name)?;
        if commands.len() < self.steps.len() {
            return None;
        }

        let mut captured = vec![None; template.params.len()];
        for ((name, slots), command) in self.steps.iter().zip(commands) {
            if command.name != *name || command.params.len() != slots.len() {
                return None;
            }
            for (slot, operand) in slots.iter().zip(&command.params) {
                match *slot {
                    Exact(value) if operand.value == value => {}
                    Exact(_) => return None,
                    Capture(n, map) => {
                        let value = match map {
                            Some(map) => map(operand.value)?,
                            None => operand.value,
                        };
                        *captured.get_mut(n)? = Some(value);
                    }
                }
            }
        }

        let params = template
            .params
            .iter()
            .zip(captured)
            .map(|(param, value)| {
                value.map(|value| Operand {
                    name: param.name,
                    ty: param.ty,
                    value,
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Command {
            name: template.name,
            opcode: None,
            params,
        })
    }
}

/// Folds expanded command sequences back into their macros, scanning left
/// to right.
pub(super) fn resugar(commands: Vec<Command>) -> Vec<Command> {
    let mut out = Vec::with_capacity(commands.len());
    let mut idx = 0;
    'scan: while idx < commands.len() {
        for pattern in PATTERNS {
            if let Some(command) = pattern.matches(&commands[idx..]) {
                tracing::trace!("{} at command {}", pattern.name, idx);
                out.push(command);
                idx += pattern.steps.len();
                continue 'scan;
            }
        }
        out.push(commands[idx].clone());
        idx += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(name: &str, values: &[u32]) -> Command {
        let template = lookup(name).unwrap();
        let params = template
            .params
            .iter()
            .zip(values)
            .map(|(param, value)| Operand {
                name: param.name,
                ty: param.ty,
                value: *value,
            })
            .collect();
        Command {
            name: template.name,
            opcode: template.opcode(),
            params,
        }
    }

    fn names(commands: &[Command]) -> Vec<String> {
        commands.iter().map(|c| c.to_string()).collect()
    }

    macro_rules! case {
        ($name:ident, [$(($cmd:expr, [$($v:expr),*])),*], [$($expect:expr),*]) => {
            #[test]
            fn $name() {
                let commands = vec![$(cmd($cmd, &[$($v),*])),*];
                assert_eq!(names(&resugar(commands)), vec![$($expect.to_string()),*]);
            }
        };
    }

    case!(
        msgbox,
        [("loadpointer", [0x0, 0x08800000]), ("callstd", [0x6]), ("end", [])],
        ["msgbox 0x800000 0x6", "end"]
    );
    case!(
        loadpointer_other_bank,
        [("loadpointer", [0x1, 0x08800000]), ("callstd", [0x6])],
        ["loadpointer 0x1 0x800000", "callstd 0x6"]
    );
    case!(
        giveitem2_beats_giveitem,
        [
            ("copyvarifnotzero", [0x8000, 0xD]),
            ("copyvarifnotzero", [0x8001, 0x1]),
            ("copyvarifnotzero", [0x8002, 0x13E]),
            ("callstd", [0x9])
        ],
        ["giveitem2 0xD 0x1 0x13E"]
    );
    case!(
        giveitem,
        [
            ("copyvarifnotzero", [0x8000, 0xD]),
            ("copyvarifnotzero", [0x8001, 0x1]),
            ("callstd", [0x1])
        ],
        ["giveitem 0xD 0x1 0x1"]
    );
    case!(
        giveitem3,
        [("copyvarifnotzero", [0x8000, 0x5]), ("callstd", [0x7])],
        ["giveitem3 0x5"]
    );
    case!(
        wildbattle2,
        [("setwildbattle", [0x19, 0x5, 0x0]), ("special", [0x139]), ("waitstate", [])],
        ["wildbattle2 0x19 0x5 0x0 0x2"]
    );
    case!(
        special_below_style_base,
        [("setwildbattle", [0x19, 0x5, 0x0]), ("special", [0x10]), ("waitstate", [])],
        ["setwildbattle 0x19 0x5 0x0", "special 0x10", "waitstate"]
    );
    case!(
        wildbattle,
        [("lock", []), ("setwildbattle", [0x19, 0x5, 0x0]), ("dowildbattle", [])],
        ["lock", "wildbattle 0x19 0x5 0x0"]
    );
    case!(
        registernav,
        [("setvar", [0x8004, 0x3]), ("special", [0xEA]), ("setvar", [0x8004, 0x3])],
        ["registernav 0x3", "setvar 0x8004 0x3"]
    );

    #[test]
    fn longest_first() {
        let lengths: Vec<_> = PATTERNS.iter().map(|p| p.steps.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }
}
