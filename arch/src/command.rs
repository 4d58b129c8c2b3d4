use crate::macros::{MacroKind, MACROS};
use crate::param::{byte, dword, ptr, word, Param};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How an entry of the table is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Binary command with its opcode byte.
    Command(u8),
    /// Directive or macro handled by the resolver.
    Macro(MacroKind),
    /// Synonym of another entry.
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub kind: Kind,
    pub params: &'static [Param],
    pub hoist: bool,
    pub terminal: bool,
}

impl Template {
    pub const fn command(opcode: u8, name: &'static str, params: &'static [Param]) -> Self {
        Template {
            name,
            kind: Kind::Command(opcode),
            params,
            hoist: false,
            terminal: false,
        }
    }

    pub const fn macro_(kind: MacroKind, name: &'static str, params: &'static [Param]) -> Self {
        Template {
            name,
            kind: Kind::Macro(kind),
            params,
            hoist: false,
            terminal: false,
        }
    }

    pub const fn redirect(name: &'static str, to: &'static str) -> Self {
        Template {
            name,
            kind: Kind::Redirect(to),
            params: &[],
            hoist: false,
            terminal: false,
        }
    }

    pub const fn terminal(self) -> Self {
        Template {
            terminal: true,
            ..self
        }
    }

    pub const fn hoisted(self) -> Self {
        Template {
            hoist: true,
            ..self
        }
    }

    pub fn opcode(&self) -> Option<u8> {
        match self.kind {
            Kind::Command(opcode) => Some(opcode),
            _ => None,
        }
    }

    pub fn redirect_to(&self) -> Option<&'static str> {
        match self.kind {
            Kind::Redirect(to) => Some(to),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// trainerbattle: the battle kind decides how many trailing pointers follow

fn kind_of(before: &[Option<u32>]) -> Option<u32> {
    before.first().copied().flatten()
}

fn tb_second(before: &[Option<u32>]) -> bool {
    kind_of(before) != Some(0x3)
}

fn tb_third(before: &[Option<u32>]) -> bool {
    matches!(kind_of(before), Some(0x1 | 0x2 | 0x4 | 0x6 | 0x7 | 0x8))
}

fn tb_fourth(before: &[Option<u32>]) -> bool {
    matches!(kind_of(before), Some(0x6 | 0x8))
}

const TRAINERBATTLE: &[Param] = &[
    byte("kind"),
    word("trainer"),
    word("local"),
    ptr("intro"),
    ptr("defeat").when(tb_second),
    ptr("extra").when(tb_third),
    ptr("continue").when(tb_fourth),
];

macro_rules! cmd {
    ($op:expr, $name:expr $(, $param:expr)* $(,)?) => {
        Template::command($op, $name, &[$($param),*])
    };
}

#[rustfmt::skip]
pub static COMMANDS: &[Template] = &[
    cmd!(0x00, "nop"),
    cmd!(0x01, "nop1"),
    cmd!(0x02, "end").terminal(),
    cmd!(0x03, "return").terminal(),
    cmd!(0x04, "call", ptr("script")),
    cmd!(0x05, "goto", ptr("script")).terminal(),
    cmd!(0x06, "if1", byte("condition"), ptr("script")),
    cmd!(0x07, "if2", byte("condition"), ptr("script")),
    cmd!(0x08, "gotostd", byte("function")).terminal(),
    cmd!(0x09, "callstd", byte("function")),
    cmd!(0x0A, "gotostdif", byte("condition"), byte("function")),
    cmd!(0x0B, "callstdif", byte("condition"), byte("function")),
    cmd!(0x0C, "jumpram").terminal(),
    cmd!(0x0D, "killscript").terminal(),
    cmd!(0x0E, "setbyte", byte("value")),
    cmd!(0x0F, "loadpointer", byte("bank"), ptr("text")),
    cmd!(0x10, "setbyte2", byte("bank"), byte("value")),
    cmd!(0x11, "writebytetooffset", byte("value"), ptr("offset")),
    cmd!(0x12, "loadbytefrompointer", byte("bank"), ptr("offset")),
    cmd!(0x13, "setfarbyte", byte("bank"), ptr("offset")),
    cmd!(0x14, "copyscriptbanks", byte("dest"), byte("source")),
    cmd!(0x15, "copybyte", ptr("dest"), ptr("source")),
    cmd!(0x16, "setvar", word("var"), word("value")),
    cmd!(0x17, "addvar", word("var"), word("value")),
    cmd!(0x18, "subvar", word("var"), word("value")),
    cmd!(0x19, "copyvar", word("dest"), word("source")),
    cmd!(0x1A, "copyvarifnotzero", word("dest"), word("source")),
    cmd!(0x1B, "comparebanks", word("bank1"), word("bank2")),
    cmd!(0x1C, "comparebanktobyte", byte("bank"), byte("value")),
    cmd!(0x1D, "comparebanktofarbyte", byte("bank"), ptr("offset")),
    cmd!(0x1E, "comparefarbytetobank", ptr("offset"), byte("bank")),
    cmd!(0x1F, "comparefarbytetobyte", ptr("offset"), byte("value")),
    cmd!(0x20, "comparefarbytes", ptr("offset1"), ptr("offset2")),
    cmd!(0x21, "compare", word("var"), word("value")),
    cmd!(0x22, "comparevars", word("var1"), word("var2")),
    cmd!(0x23, "callasm", ptr("routine")),
    cmd!(0x24, "cmd24", ptr("routine")),
    cmd!(0x25, "special", word("number")),
    cmd!(0x26, "special2", word("var"), word("number")),
    cmd!(0x27, "waitstate"),
    cmd!(0x28, "pause", word("delay")),
    cmd!(0x29, "setflag", word("flag")),
    cmd!(0x2A, "clearflag", word("flag")),
    cmd!(0x2B, "checkflag", word("flag")),
    cmd!(0x2C, "cmd2c", word("unknown1"), word("unknown2")),
    cmd!(0x2D, "checkdailyflags"),
    cmd!(0x2E, "resetvars"),
    cmd!(0x2F, "sound", word("sound")),
    cmd!(0x30, "checksound"),
    cmd!(0x31, "fanfare", word("song")),
    cmd!(0x32, "waitfanfare"),
    cmd!(0x33, "playsong", word("song"), byte("unknown")),
    cmd!(0x34, "playsong2", word("song")),
    cmd!(0x35, "fadedefault"),
    cmd!(0x36, "fadesong", word("song")),
    cmd!(0x37, "fadeout", byte("speed")),
    cmd!(0x38, "fadein", byte("speed")),
    cmd!(0x39, "warp", byte("bank"), byte("map"), byte("exit"), word("x"), word("y")),
    cmd!(0x3A, "warpmuted", byte("bank"), byte("map"), byte("exit"), word("x"), word("y")),
    cmd!(0x3B, "warpwalk", byte("bank"), byte("map"), byte("exit"), word("x"), word("y")),
    cmd!(0x3C, "warphole", byte("bank"), byte("map")),
    cmd!(0x3D, "warpteleport", byte("bank"), byte("map"), byte("exit"), word("x"), word("y")),
    cmd!(0x3E, "warp3", byte("bank"), byte("map"), byte("exit"), word("x"), word("y")),
    cmd!(0x3F, "setwarpplace", byte("bank"), byte("map"), byte("exit"), word("x"), word("y")),
    cmd!(0x40, "warp4", byte("bank"), byte("map"), byte("exit"), word("x"), word("y")),
    cmd!(0x41, "warp5", byte("bank"), byte("map"), byte("exit"), word("x"), word("y")),
    cmd!(0x42, "getplayerpos", word("varx"), word("vary")),
    cmd!(0x43, "countpokemon"),
    cmd!(0x44, "additem", word("item"), word("quantity")),
    cmd!(0x45, "removeitem", word("item"), word("quantity")),
    cmd!(0x46, "checkitemroom", word("item"), word("quantity")),
    cmd!(0x47, "checkitem", word("item"), word("quantity")),
    cmd!(0x48, "checkitemtype", word("item")),
    cmd!(0x49, "addpcitem", word("item"), word("quantity")),
    cmd!(0x4A, "checkpcitem", word("item"), word("quantity")),
    cmd!(0x4B, "adddecoration", word("decoration")),
    cmd!(0x4C, "removedecoration", word("decoration")),
    cmd!(0x4D, "testdecoration", word("decoration")),
    cmd!(0x4E, "checkdecoration", word("decoration")),
    cmd!(0x4F, "applymovement", word("people"), ptr("movements")),
    cmd!(0x50, "applymovementpos", word("people"), ptr("movements")),
    cmd!(0x51, "waitmovement", word("people")),
    cmd!(0x52, "waitmovementpos", word("people"), byte("x"), byte("y")),
    cmd!(0x53, "hidesprite", word("people")),
    cmd!(0x54, "hidespritepos", word("people"), byte("x"), byte("y")),
    cmd!(0x55, "showsprite", word("people")),
    cmd!(0x56, "showspritepos", word("people"), byte("x"), byte("y")),
    cmd!(0x57, "movesprite", word("people"), word("x"), word("y")),
    cmd!(0x58, "spritevisible", word("people"), byte("bank"), byte("map")),
    cmd!(0x59, "spriteinvisible", word("people"), byte("bank"), byte("map")),
    cmd!(0x5A, "faceplayer"),
    cmd!(0x5B, "spriteface", word("people"), byte("facing")),
    Template::command(0x5C, "trainerbattle", TRAINERBATTLE),
    cmd!(0x5D, "repeattrainerbattle"),
    cmd!(0x5E, "endtrainerbattle"),
    cmd!(0x5F, "endtrainerbattle2"),
    cmd!(0x60, "checktrainerflag", word("trainer")),
    cmd!(0x61, "cleartrainerflag", word("trainer")),
    cmd!(0x62, "settrainerflag", word("trainer")),
    cmd!(0x63, "movesprite2", word("people"), word("x"), word("y")),
    cmd!(0x64, "moveoffscreen", word("people")),
    cmd!(0x65, "spritebehave", word("people"), byte("behaviour")),
    cmd!(0x66, "waitmsg"),
    cmd!(0x67, "preparemsg", ptr("text")),
    cmd!(0x68, "closeonkeypress"),
    cmd!(0x69, "lockall"),
    cmd!(0x6A, "lock"),
    cmd!(0x6B, "releaseall"),
    cmd!(0x6C, "release"),
    cmd!(0x6D, "waitkeypress"),
    cmd!(0x6E, "yesnobox", byte("x"), byte("y")),
    cmd!(0x6F, "multichoice", byte("x"), byte("y"), byte("list"), byte("cancel")),
    cmd!(0x70, "multichoice2", byte("x"), byte("y"), byte("list"), byte("default"), byte("cancel")),
    cmd!(0x71, "multichoice3", byte("x"), byte("y"), byte("list"), byte("perrow"), byte("cancel")),
    cmd!(0x72, "showbox", byte("x"), byte("y"), byte("width"), byte("height")),
    cmd!(0x73, "hidebox", byte("x"), byte("y"), byte("width"), byte("height")),
    cmd!(0x74, "clearbox", byte("x"), byte("y"), byte("width"), byte("height")),
    cmd!(0x75, "showpokepic", word("species"), byte("x"), byte("y")),
    cmd!(0x76, "hidepokepic"),
    cmd!(0x77, "showcontestwinner", byte("winner")),
    cmd!(0x78, "braille", ptr("braille")),
    cmd!(0x79, "givepokemon", word("species"), byte("level"), word("item"), dword("unknown1"), dword("unknown2"), byte("unknown3")),
    cmd!(0x7A, "giveegg", word("species")),
    cmd!(0x7B, "setpkmnpp", byte("slot"), byte("attack"), word("pp")),
    cmd!(0x7C, "checkattack", word("attack")),
    cmd!(0x7D, "bufferpokemon", byte("buffer"), word("species")),
    cmd!(0x7E, "bufferfirstpokemon", byte("buffer")),
    cmd!(0x7F, "bufferpartypokemon", byte("buffer"), word("slot")),
    cmd!(0x80, "bufferitem", byte("buffer"), word("item")),
    cmd!(0x81, "bufferdecoration", byte("buffer"), word("decoration")),
    cmd!(0x82, "bufferattack", byte("buffer"), word("attack")),
    cmd!(0x83, "buffernumber", byte("buffer"), word("var")),
    cmd!(0x84, "bufferstd", byte("buffer"), word("var")),
    cmd!(0x85, "bufferstring", byte("buffer"), ptr("text")),
    cmd!(0x86, "pokemart", ptr("items")),
    cmd!(0x87, "pokemart2", ptr("items")),
    cmd!(0x88, "pokemart3", ptr("items")),
    cmd!(0x89, "pokecasino", word("var")),
    cmd!(0x8A, "cmd8a", byte("unknown1"), byte("unknown2"), byte("unknown3")),
    cmd!(0x8B, "choosecontestpkmn"),
    cmd!(0x8C, "startcontest"),
    cmd!(0x8D, "showcontestresults"),
    cmd!(0x8E, "contestlinktransfer"),
    cmd!(0x8F, "random", word("limit")),
    cmd!(0x90, "givemoney", dword("amount"), byte("check")),
    cmd!(0x91, "paymoney", dword("amount"), byte("check")),
    cmd!(0x92, "checkmoney", dword("amount"), byte("check")),
    cmd!(0x93, "showmoney", byte("x"), byte("y"), byte("check")),
    cmd!(0x94, "hidemoney", byte("x"), byte("y")),
    cmd!(0x95, "updatemoney", byte("x"), byte("y"), byte("check")),
    cmd!(0x96, "cmd96", word("unknown")),
    cmd!(0x97, "fadescreen", byte("effect")),
    cmd!(0x98, "fadescreendelay", byte("effect"), byte("delay")),
    cmd!(0x99, "darken", word("size")),
    cmd!(0x9A, "lighten", byte("size")),
    cmd!(0x9B, "preparemsg2", ptr("text")),
    cmd!(0x9C, "doanimation", word("animation")),
    cmd!(0x9D, "setanimation", byte("animation"), word("var")),
    cmd!(0x9E, "checkanimation", word("animation")),
    cmd!(0x9F, "sethealingplace", word("place")),
    cmd!(0xA0, "checkgender"),
    cmd!(0xA1, "cry", word("species"), word("effect")),
    cmd!(0xA2, "setmaptile", word("x"), word("y"), word("tile"), word("attribute")),
    cmd!(0xA3, "resetweather"),
    cmd!(0xA4, "setweather", word("weather")),
    cmd!(0xA5, "doweather"),
    cmd!(0xA6, "cmda6", byte("unknown")),
    cmd!(0xA7, "setmapfooter", word("footer")),
    cmd!(0xA8, "spritelevelup", word("people"), byte("bank"), byte("map"), byte("unknown")),
    cmd!(0xA9, "restorespritelevel", word("people"), byte("bank"), byte("map")),
    cmd!(0xAA, "createsprite", byte("sprite"), byte("people"), word("x"), word("y"), byte("behaviour"), byte("facing")),
    cmd!(0xAB, "spriteface2", byte("people"), byte("facing")),
    cmd!(0xAC, "setdooropened", word("x"), word("y")),
    cmd!(0xAD, "setdoorclosed", word("x"), word("y")),
    cmd!(0xAE, "doorchange"),
    cmd!(0xAF, "setdooropened2", word("x"), word("y")),
    cmd!(0xB0, "setdoorclosed2", word("x"), word("y")),
    cmd!(0xB1, "cmdb1", byte("unknown1"), word("unknown2"), byte("unknown3"), word("unknown4")),
    cmd!(0xB2, "cmdb2"),
    cmd!(0xB3, "checkcoins", word("var")),
    cmd!(0xB4, "givecoins", word("coins")),
    cmd!(0xB5, "removecoins", word("coins")),
    cmd!(0xB6, "setwildbattle", word("species"), byte("level"), word("item")),
    cmd!(0xB7, "dowildbattle"),
    cmd!(0xB8, "setvirtualaddress", ptr("offset")),
    cmd!(0xB9, "virtualgoto", ptr("script")).terminal(),
    cmd!(0xBA, "virtualcall", ptr("script")),
    cmd!(0xBB, "virtualgotoif", byte("condition"), ptr("script")),
    cmd!(0xBC, "virtualcallif", byte("condition"), ptr("script")),
    cmd!(0xBD, "virtualmsgbox", ptr("text")),
    cmd!(0xBE, "virtualloadpointer", ptr("text")),
    cmd!(0xBF, "virtualbuffer", byte("buffer"), ptr("text")),
    cmd!(0xC0, "showcoins", byte("x"), byte("y")),
    cmd!(0xC1, "hidecoins", byte("x"), byte("y")),
    cmd!(0xC2, "updatecoins", byte("x"), byte("y")),
    cmd!(0xC3, "cmdc3", byte("unknown")),
    cmd!(0xC4, "warp6", byte("bank"), byte("map"), byte("exit"), word("x"), word("y")),
    cmd!(0xC5, "waitcry"),
    cmd!(0xC6, "bufferboxname", byte("buffer"), word("box")),
    cmd!(0xC7, "textcolor", byte("color")),
    cmd!(0xC8, "cmdc8", ptr("unknown")),
    cmd!(0xC9, "cmdc9"),
    cmd!(0xCA, "signmsg"),
    cmd!(0xCB, "normalmsg"),
    cmd!(0xCC, "comparehiddenvar", byte("var"), dword("value")),
    cmd!(0xCD, "setobedience", word("slot")),
    cmd!(0xCE, "checkobedience", word("slot")),
    cmd!(0xCF, "executeram").terminal(),
    cmd!(0xD0, "setworldmapflag", word("flag")),
    cmd!(0xD1, "warpteleport2", byte("bank"), byte("map"), byte("exit"), word("x"), word("y")),
    cmd!(0xD2, "setcatchlocation", word("slot"), byte("location")),
    cmd!(0xD3, "braille2", ptr("braille")),
    cmd!(0xD4, "bufferitems", byte("buffer"), word("item"), word("quantity")),
    cmd!(0xD5, "cmdd5", word("unknown")),
];

/// Synonyms accepted in source.
pub static REDIRECTS: &[Template] = &[
    Template::redirect("jump", "goto"),
    Template::redirect("gosub", "call"),
    Template::redirect("message", "preparemsg"),
    Template::redirect("msgboxsign", "signmsg"),
    Template::redirect("msgboxnormal", "normalmsg"),
    Template::redirect("storevar", "buffernumber"),
    Template::redirect("jumpstd", "gotostd"),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static Template>> = Lazy::new(|| {
    COMMANDS
        .iter()
        .chain(MACROS.iter())
        .chain(REDIRECTS.iter())
        .map(|template| (template.name, template))
        .collect()
});

static BY_OPCODE: Lazy<HashMap<u8, &'static Template>> = Lazy::new(|| {
    COMMANDS
        .iter()
        .filter_map(|template| template.opcode().map(|op| (op, template)))
        .collect()
});

/// Looks up a command, macro or synonym by its source name.
pub fn lookup(name: &str) -> Option<&'static Template> {
    BY_NAME.get(name.to_ascii_lowercase().as_str()).copied()
}

pub fn by_opcode(opcode: u8) -> Option<&'static Template> {
    BY_OPCODE.get(&opcode).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamType;

    #[test]
    fn opcodes_are_unique() {
        for (idx, template) in COMMANDS.iter().enumerate() {
            assert_eq!(template.opcode(), Some(idx as u8), "{}", template.name);
        }
        assert_eq!(BY_OPCODE.len(), COMMANDS.len());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("SetVar").and_then(|t| t.opcode()), Some(0x16));
        assert!(lookup("#org").is_some());
        assert!(lookup("nosuchcommand").is_none());
    }

    #[test]
    fn redirects_point_to_entries() {
        for template in REDIRECTS {
            let to = template.redirect_to().unwrap();
            assert!(lookup(to).is_some(), "{} -> {}", template.name, to);
        }
    }

    #[test]
    fn trainerbattle_arity() {
        let tb = lookup("trainerbattle").unwrap();
        let count = |kind: u32| {
            let mut values = vec![Some(kind)];
            for param in &tb.params[1..] {
                let present = param.is_present(&values);
                values.push(present.then_some(0));
            }
            values.iter().filter(|v| v.is_some()).count()
        };
        assert_eq!(count(0x0), 5);
        assert_eq!(count(0x3), 4);
        assert_eq!(count(0x1), 6);
        assert_eq!(count(0x6), 7);
    }

    #[test]
    fn param_types() {
        let setvar = lookup("setvar").unwrap();
        assert_eq!(setvar.params.iter().map(|p| p.ty.width()).sum::<usize>(), 4);
        assert!(lookup("end").unwrap().params.is_empty());
        assert_eq!(lookup("trainerbattle").unwrap().params[3].ty, ParamType::Pointer);
    }
}
