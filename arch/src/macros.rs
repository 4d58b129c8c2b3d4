use crate::command::Template;
use crate::param::{byte, command, dword, ptr, symbol, text, word, Param};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Directive and macro families. Each variant is handled explicitly by the
/// resolver; the table below only carries the parameter lists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum MacroKind {
    #[strum(to_string = "#org")]
    Org,
    #[strum(to_string = "#dynamic")]
    Dynamic,
    #[strum(to_string = "#define")]
    Define,
    #[strum(to_string = "#undefine")]
    Undefine,
    #[strum(to_string = "#undefineall")]
    UndefineAll,
    #[strum(to_string = "#alias")]
    Alias,
    #[strum(to_string = "#freespace")]
    FreeSpace,
    #[strum(to_string = "#break")]
    Break,
    #[strum(to_string = "=")]
    Text,
    #[strum(to_string = "#braille")]
    Braille,
    #[strum(to_string = "#erase")]
    Erase,
    #[strum(to_string = "#eraserange")]
    EraseRange,
    #[strum(to_string = "#remove")]
    Remove,
    #[strum(to_string = "#removeall")]
    RemoveAll,
    #[strum(to_string = "#removemart")]
    RemoveMart,
    #[strum(to_string = "#removemove")]
    RemoveMove,
    Msgbox,
    GiveItem,
    GiveItem2,
    GiveItem3,
    WildBattle,
    WildBattle2,
    RegisterNav,
}

impl MacroKind {
    /// Directives act on the resolver state and emit no bytes themselves.
    pub fn is_directive(&self) -> bool {
        !matches!(
            self,
            MacroKind::Text
                | MacroKind::Braille
                | MacroKind::Msgbox
                | MacroKind::GiveItem
                | MacroKind::GiveItem2
                | MacroKind::GiveItem3
                | MacroKind::WildBattle
                | MacroKind::WildBattle2
                | MacroKind::RegisterNav
        )
    }
}

/// Scripts pass item arguments to the standard functions through these vars.
pub const ITEM_VARS: [u32; 3] = [0x8000, 0x8001, 0x8002];
pub const NAV_VAR: u32 = 0x8004;
pub const NAV_SPECIAL: u32 = 0xEA;
pub const STD_GIVEITEM2: u32 = 0x9;
pub const STD_GIVEITEM3: u32 = 0x7;
/// `special` number of the first scripted wild battle style.
pub const BATTLE_STYLE_BASE: u32 = 0x137;

const FILL_CHOICES: &[u32] = &[0x00, 0xFF];

const ORG: &[Param] = &[ptr("offset")];
const DYNAMIC: &[Param] = &[ptr("base").fixed()];
const DEFINE: &[Param] = &[symbol("name"), dword("value").literal()];
const UNDEFINE: &[Param] = &[symbol("name")];
const ALIAS: &[Param] = &[command("name"), command("target")];
const FREESPACE: &[Param] = &[byte("fill").literal().choices(FILL_CHOICES)];
const TEXT: &[Param] = &[text("text")];
const ERASE: &[Param] = &[ptr("offset").fixed(), dword("length")];
const ERASERANGE: &[Param] = &[ptr("start").fixed(), ptr("end").fixed()];
const REMOVE: &[Param] = &[ptr("offset").fixed()];
const MSGBOX: &[Param] = &[ptr("text"), byte("type")];
const GIVEITEM: &[Param] = &[word("item"), word("amount"), byte("function")];
const GIVEITEM2: &[Param] = &[word("item"), word("amount"), word("song")];
const GIVEITEM3: &[Param] = &[word("decoration")];
const WILDBATTLE: &[Param] = &[word("species"), byte("level"), word("item")];
const WILDBATTLE2: &[Param] = &[word("species"), byte("level"), word("item"), byte("style")];
const REGISTERNAV: &[Param] = &[word("trainer")];

#[rustfmt::skip]
pub static MACROS: &[Template] = &[
    Template::macro_(MacroKind::Org, "#org", ORG),
    Template::macro_(MacroKind::Dynamic, "#dynamic", DYNAMIC).hoisted(),
    Template::macro_(MacroKind::Define, "#define", DEFINE).hoisted(),
    Template::macro_(MacroKind::Undefine, "#undefine", UNDEFINE).hoisted(),
    Template::macro_(MacroKind::UndefineAll, "#undefineall", &[]).hoisted(),
    Template::macro_(MacroKind::Alias, "#alias", ALIAS).hoisted(),
    Template::macro_(MacroKind::FreeSpace, "#freespace", FREESPACE).hoisted(),
    Template::macro_(MacroKind::Break, "#break", &[]),
    Template::macro_(MacroKind::Text, "=", TEXT),
    Template::macro_(MacroKind::Braille, "#braille", TEXT),
    Template::macro_(MacroKind::Erase, "#erase", ERASE),
    Template::macro_(MacroKind::EraseRange, "#eraserange", ERASERANGE),
    Template::macro_(MacroKind::Remove, "#remove", REMOVE),
    Template::macro_(MacroKind::RemoveAll, "#removeall", REMOVE),
    Template::macro_(MacroKind::RemoveMart, "#removemart", REMOVE),
    Template::macro_(MacroKind::RemoveMove, "#removemove", REMOVE),
    Template::macro_(MacroKind::Msgbox, "msgbox", MSGBOX),
    Template::macro_(MacroKind::GiveItem, "giveitem", GIVEITEM),
    Template::macro_(MacroKind::GiveItem2, "giveitem2", GIVEITEM2),
    Template::macro_(MacroKind::GiveItem3, "giveitem3", GIVEITEM3),
    Template::macro_(MacroKind::WildBattle, "wildbattle", WILDBATTLE),
    Template::macro_(MacroKind::WildBattle2, "wildbattle2", WILDBATTLE2),
    Template::macro_(MacroKind::RegisterNav, "registernav", REGISTERNAV),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{lookup, Kind};
    use std::str::FromStr;

    #[test]
    fn names_match_kinds() {
        for template in MACROS {
            let Kind::Macro(kind) = template.kind else {
                panic!("{} is not a macro", template.name);
            };
            assert_eq!(kind.to_string(), template.name);
            assert_eq!(MacroKind::from_str(template.name), Ok(kind));
        }
    }

    #[test]
    fn hoisted_set() {
        let hoisted: Vec<_> = MACROS.iter().filter(|t| t.hoist).map(|t| t.name).collect();
        assert_eq!(
            hoisted,
            vec!["#dynamic", "#define", "#undefine", "#undefineall", "#alias", "#freespace"]
        );
    }

    #[test]
    fn expansions_are_not_directives() {
        assert!(MacroKind::Org.is_directive());
        assert!(!MacroKind::Msgbox.is_directive());
        assert!(lookup("msgbox").is_some());
    }
}
