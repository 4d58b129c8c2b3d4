pub mod charset;
pub mod command;
pub mod fill;
pub mod macros;
pub mod param;
pub mod pointer;

pub use command::{lookup, Kind, Template};
pub use fill::FillByte;
pub use macros::MacroKind;
pub use param::{ArgKind, Param, ParamType, TypeTag};
pub use pointer::Pointer;
