use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ParamType {
    Byte,
    Word,
    Dword,
    Pointer,
    #[strum(to_string = "string")]
    Str,
    Symbol,
    Command,
}

impl ParamType {
    /// Encoded width in bytes. Non-numeric types occupy no fixed width.
    pub fn width(&self) -> usize {
        match self {
            ParamType::Byte => 1,
            ParamType::Word => 2,
            ParamType::Dword | ParamType::Pointer => 4,
            ParamType::Str | ParamType::Symbol | ParamType::Command => 0,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.width() > 0
    }
}

/// Width tag accepted inside `#raw` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
pub enum TypeTag {
    #[strum(to_string = "byte", serialize = "b")]
    Byte,
    #[strum(to_string = "word", serialize = "w")]
    Word,
    #[strum(to_string = "dword", serialize = "d")]
    Dword,
    #[strum(to_string = "pointer", serialize = "ptr", serialize = "p")]
    Pointer,
}

impl From<TypeTag> for ParamType {
    fn from(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Byte => ParamType::Byte,
            TypeTag::Word => ParamType::Word,
            TypeTag::Dword => ParamType::Dword,
            TypeTag::Pointer => ParamType::Pointer,
        }
    }
}

/// Syntactic shape of an argument, used for type checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArgKind {
    Number,
    Dynamic,
    Symbol,
    Word,
    #[strum(to_string = "string")]
    Text,
}

/// Decides whether a conditional parameter is present, given the values of
/// the parameters before it (`None` when absent or unresolved).
pub type Predicate = fn(&[Option<u32>]) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub ty: ParamType,
    pub choices: Option<&'static [u32]>,
    pub allow_dynamic: Option<bool>,
    pub allow_symbol: Option<bool>,
    pub present_if: Option<Predicate>,
}

impl Param {
    pub const fn new(name: &'static str, ty: ParamType) -> Self {
        Param {
            name,
            ty,
            choices: None,
            allow_dynamic: None,
            allow_symbol: None,
            present_if: None,
        }
    }

    pub const fn choices(self, choices: &'static [u32]) -> Self {
        Param {
            choices: Some(choices),
            ..self
        }
    }

    pub const fn fixed(self) -> Self {
        Param {
            allow_dynamic: Some(false),
            ..self
        }
    }

    pub const fn literal(self) -> Self {
        Param {
            allow_symbol: Some(false),
            ..self
        }
    }

    pub const fn when(self, pred: Predicate) -> Self {
        Param {
            present_if: Some(pred),
            ..self
        }
    }

    pub fn is_present(&self, before: &[Option<u32>]) -> bool {
        self.present_if.map_or(true, |pred| pred(before))
    }

    /// Argument shapes this parameter accepts.
    pub fn accepts(&self) -> Vec<ArgKind> {
        let mut kinds = match self.ty {
            ParamType::Str => vec![ArgKind::Text],
            ParamType::Symbol => vec![ArgKind::Symbol],
            ParamType::Command => vec![ArgKind::Word],
            _ => vec![ArgKind::Number],
        };
        if self.ty == ParamType::Pointer && self.allow_dynamic != Some(false) {
            kinds.push(ArgKind::Dynamic);
        }
        if self.ty.is_numeric() && self.allow_symbol != Some(false) {
            kinds.push(ArgKind::Symbol);
        }
        kinds
    }
}

pub const fn byte(name: &'static str) -> Param {
    Param::new(name, ParamType::Byte)
}

pub const fn word(name: &'static str) -> Param {
    Param::new(name, ParamType::Word)
}

pub const fn dword(name: &'static str) -> Param {
    Param::new(name, ParamType::Dword)
}

pub const fn ptr(name: &'static str) -> Param {
    Param::new(name, ParamType::Pointer)
}

pub const fn text(name: &'static str) -> Param {
    Param::new(name, ParamType::Str)
}

pub const fn symbol(name: &'static str) -> Param {
    Param::new(name, ParamType::Symbol)
}

pub const fn command(name: &'static str) -> Param {
    Param::new(name, ParamType::Command)
}
