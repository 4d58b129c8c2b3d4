use super::ledger::{Ledger, Site};
use super::{Block, Command, Directive, Encoding, Origin, Param, Program, Value};
use crate::error::{Diagnostic, Error};
use crate::grammer::ast::{self, Arg, Item, ItemKind};
use crate::grammer::token::Span;
use arch::command::{lookup, Kind, Template};
use arch::param::Param as ParamSpec;
use arch::{FillByte, MacroKind, ParamType, Pointer};
use indexmap::IndexMap;

/// A checked argument, one per present parameter.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Operand {
    Value(u32),
    Label(String, Span),
    Text(String),
    Name(String),
}

/// State for building one script.
#[derive(Debug, Default)]
pub struct Resolver {
    symbols: IndexMap<String, u32>,
    aliases: IndexMap<String, String>,
    ledger: Ledger,
    blocks: Vec<Block>,
    directives: Vec<Directive>,
    fill: FillByte,
    diagnostics: Vec<Diagnostic>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dynamic base used until the script sets its own with `#dynamic`.
    pub fn with_base(mut self, base: Option<u32>) -> Self {
        self.ledger = Ledger::new(base.map(|raw| Pointer::from_raw(raw).offset()));
        self
    }

    pub fn with_fill(mut self, fill: FillByte) -> Self {
        self.fill = fill;
        self
    }

    pub fn build(mut self, items: Vec<Item>) -> Program {
        let items = self.until_break(items);

        // First pass: hoisted directives in source order
        for item in items.iter().filter(|item| is_hoisted(item)) {
            self.item(item);
        }

        // Second pass: everything else in source order
        for item in items.iter().filter(|item| !is_hoisted(item)) {
            self.item(item);
        }

        self.diagnostics.extend(self.ledger.validate());
        tracing::debug!(
            "built {} blocks, {} symbols, {} diagnostics",
            self.blocks.len(),
            self.symbols.len(),
            self.diagnostics.len()
        );

        Program {
            blocks: self.blocks,
            symbols: self.symbols,
            ledger: self.ledger,
            directives: self.directives,
            fill: self.fill,
            diagnostics: self.diagnostics,
        }
    }

    pub(super) fn error(&mut self, e: Error, span: Span) {
        self.diagnostics.push(Diagnostic::error(e, span));
    }

    fn warn(&mut self, e: Error, span: Span) {
        self.diagnostics.push(Diagnostic::warn(e, span));
    }

    /// Drops everything from the first `#break` on.
    fn until_break(&mut self, mut items: Vec<Item>) -> Vec<Item> {
        let stop = items.iter().position(|item| {
            item.name()
                .and_then(|name| lookup(&name.text))
                .map_or(false, |t| t.kind == Kind::Macro(MacroKind::Break))
        });
        if let Some(stop) = stop {
            tracing::debug!("#break on line {}", items[stop].span.line());
            let ignored = items.len() - stop - 1;
            if ignored > 0 {
                let note = Diagnostic::info(Error::IgnoredAfterBreak(ignored), items[stop].span);
                self.diagnostics.push(note);
            }
            items.truncate(stop);
        }
        items
    }

    /// Follows aliases and synonyms down to a command or macro.
    fn resolve(&self, name: &str) -> Result<&'static Template, Error> {
        let mut current = name.to_ascii_lowercase();
        for _ in 0..=self.aliases.len() + 1 {
            if let Some(target) = self.aliases.get(&current) {
                current = target.clone();
                continue;
            }
            let template =
                lookup(&current).ok_or_else(|| Error::UnknownCommand(name.to_string()))?;
            match template.redirect_to() {
                Some(to) => current = to.to_string(),
                None => return Ok(template),
            }
        }
        Err(Error::AliasLoop(name.to_string()))
    }
}

fn is_hoisted(item: &Item) -> bool {
    item.name()
        .and_then(|name| lookup(&name.text))
        .map_or(false, |t| t.hoist)
}

// ----------------------------------------------------------------------------
// Items
// ----------------------------------------------------------------------------

impl Resolver {
    fn item(&mut self, item: &Item) {
        let (name, args) = match &item.kind {
            ItemKind::Macro { name, args } | ItemKind::Command { name, args } => (name, args),
            ItemKind::Raw { args } => return self.raw(args, item.span),
            ItemKind::If { .. } => return self.item(&item.clone().lower()),
        };
        let template = match self.resolve(&name.text) {
            Ok(template) => template,
            Err(e) => return self.error(e, name.span),
        };
        let Some(operands) = self.check(template, args, item.span) else {
            return;
        };
        match template.kind {
            Kind::Command(opcode) => {
                if self.require_block(item.span) {
                    self.push(template.name, Encoding::Opcode(opcode), operands, item.span);
                }
            }
            Kind::Macro(kind) if kind.is_directive() => self.directive(kind, operands, item.span),
            Kind::Macro(kind) => {
                if self.require_block(item.span) {
                    self.expand(kind, operands, item.span);
                }
            }
            // resolve() follows synonyms
            Kind::Redirect(_) => {}
        }
    }

    fn raw(&mut self, args: &[(Option<arch::TypeTag>, Arg)], span: Span) {
        let mut operands = Vec::new();
        let mut ok = true;
        for (tag, arg) in args {
            let ty = tag.map_or(ParamType::Byte, ParamType::from);
            let spec = ParamSpec::new("value", ty);
            match self.operand("#raw", &spec, arg) {
                Some(operand) => operands.push((ty, operand)),
                None => ok = false,
            }
        }
        if ok && self.require_block(span) {
            self.push("#raw", Encoding::Raw, operands, span);
        }
    }

    fn directive(&mut self, kind: MacroKind, operands: Vec<(ParamType, Operand)>, span: Span) {
        let mut values = operands.into_iter().map(|(_, operand)| operand);
        let mut next = || values.next();
        let offset = |operand: Option<Operand>| match operand {
            Some(Operand::Value(raw)) => Pointer::from_raw(raw).offset(),
            _ => 0,
        };
        match kind {
            MacroKind::Org => {
                let origin = match next() {
                    Some(Operand::Label(label, label_span)) => {
                        self.ledger.declare(&label, self.blocks.len(), label_span);
                        Origin::Dynamic(label)
                    }
                    operand => Origin::Static(offset(operand)),
                };
                tracing::trace!("block {} at {}", self.blocks.len(), origin);
                self.blocks.push(Block {
                    origin,
                    commands: Vec::new(),
                    span,
                });
            }
            MacroKind::Dynamic => {
                let base = offset(next());
                self.ledger.set_base(base);
            }
            MacroKind::Define => {
                if let (Some(Operand::Name(name)), Some(Operand::Value(value))) = (next(), next()) {
                    if self.symbols.insert(name.clone(), value).is_some() {
                        self.warn(Error::RedefinedSymbol(name), span);
                    }
                }
            }
            MacroKind::Undefine => {
                if let Some(Operand::Name(name)) = next() {
                    if self.symbols.shift_remove(&name).is_none() {
                        self.warn(Error::UndefinedSymbol(name), span);
                    }
                }
            }
            MacroKind::UndefineAll => self.symbols.clear(),
            MacroKind::Alias => {
                if let (Some(Operand::Name(name)), Some(Operand::Name(target))) = (next(), next())
                {
                    match self.resolve(&target) {
                        Ok(_) => {
                            self.aliases.insert(name, target);
                        }
                        Err(e) => self.error(e, span),
                    }
                }
            }
            MacroKind::FreeSpace => {
                if let Some(Operand::Value(fill)) = next() {
                    if let Ok(fill) = FillByte::try_from(fill as u8) {
                        self.fill = fill;
                    }
                }
            }
            MacroKind::Erase => {
                let offset = offset(next());
                let length = match next() {
                    Some(Operand::Value(length)) => length,
                    _ => 0,
                };
                self.directives.push(Directive::Erase { offset, length });
            }
            MacroKind::EraseRange => {
                let start = offset(next());
                let end = offset(next());
                self.directives.push(Directive::EraseRange { start, end });
            }
            MacroKind::Remove => self.directives.push(Directive::Remove(offset(next()))),
            MacroKind::RemoveAll => self.directives.push(Directive::RemoveAll(offset(next()))),
            MacroKind::RemoveMart => self.directives.push(Directive::RemoveMart(offset(next()))),
            MacroKind::RemoveMove => self.directives.push(Directive::RemoveMove(offset(next()))),
            // #break never gets here; everything else is an expansion
            _ => {}
        }
    }

    fn require_block(&mut self, span: Span) -> bool {
        if self.blocks.is_empty() {
            self.error(Error::OutsideBlock, span);
            false
        } else {
            true
        }
    }

    /// Appends a command to the open block, recording dynamic placeholders.
    pub(super) fn push(
        &mut self,
        name: &'static str,
        encoding: Encoding,
        operands: Vec<(ParamType, Operand)>,
        span: Span,
    ) {
        let Some(block) = self.blocks.len().checked_sub(1) else {
            return;
        };
        let command = self.blocks[block].commands.len();
        let mut params = Vec::new();
        for (param, (ty, operand)) in operands.into_iter().enumerate() {
            let value = match operand {
                Operand::Value(value) => Value::Literal(value),
                Operand::Label(label, span) => {
                    let site = Site {
                        block,
                        command,
                        param,
                        span,
                    };
                    self.ledger.refer(&label, site);
                    Value::Dynamic(label)
                }
                Operand::Text(text) | Operand::Name(text) => Value::Text(text),
            };
            params.push(Param { value, ty });
        }
        self.blocks[block].commands.push(Command {
            name,
            encoding,
            params,
            span,
        });
    }
}

// ----------------------------------------------------------------------------
// Argument checks
// ----------------------------------------------------------------------------

impl Resolver {
    /// Checks arity and types. `None` when the item has to be dropped.
    fn check(
        &mut self,
        template: &'static Template,
        args: &[Arg],
        span: Span,
    ) -> Option<Vec<(ParamType, Operand)>> {
        let mut values: Vec<Option<u32>> = Vec::new();
        let mut operands = Vec::new();
        let mut rest = args.iter();
        let mut expected = 0;
        let mut ok = true;

        for param in template.params {
            if !param.is_present(&values) {
                values.push(None);
                continue;
            }
            expected += 1;
            let operand = rest
                .next()
                .and_then(|arg| self.operand(template.name, param, arg));
            match operand {
                Some(operand) => {
                    values.push(match operand {
                        Operand::Value(value) => Some(value),
                        _ => None,
                    });
                    operands.push((param.ty, operand));
                }
                None => {
                    ok = false;
                    values.push(None);
                }
            }
        }

        if args.len() < expected {
            let e = Error::MissingParams(template.name.to_string(), expected, args.len());
            self.error(e, span);
            return None;
        }
        if let (Some(first), Some(last)) = (args.get(expected), args.last()) {
            let e = Error::ExtraParams(template.name.to_string(), expected);
            self.error(e, first.span.to(last.span));
            return None;
        }
        ok.then_some(operands)
    }

    fn operand(&mut self, owner: &str, param: &ParamSpec, arg: &Arg) -> Option<Operand> {
        let kind = arg.value.kind();
        let accepts = param.accepts();
        if !accepts.contains(&kind) {
            let e = Error::TypeMismatch(owner.to_string(), param.name.to_string(), accepts, kind);
            self.error(e, arg.span);
            return None;
        }
        match &arg.value {
            ast::Value::Number(value) => self.literal(owner, param, *value, arg.span),
            ast::Value::Symbol(name) if param.ty == ParamType::Symbol => {
                Some(Operand::Name(name.clone()))
            }
            ast::Value::Symbol(name) => match self.symbols.get(name).copied() {
                Some(value) => self.literal(owner, param, value, arg.span),
                None => {
                    self.error(Error::UndefinedSymbol(name.clone()), arg.span);
                    None
                }
            },
            ast::Value::Dynamic(label) => Some(Operand::Label(label.clone(), arg.span)),
            ast::Value::Text(text) => Some(Operand::Text(text.clone())),
            ast::Value::Word(word) => Some(Operand::Name(word.clone())),
        }
    }

    fn literal(&mut self, owner: &str, param: &ParamSpec, value: u32, span: Span) -> Option<Operand> {
        if let Some(choices) = param.choices {
            if !choices.contains(&value) {
                let e = Error::InvalidChoice(owner.to_string(), param.name.to_string(), value);
                self.error(e, span);
                return None;
            }
        }
        let max = match param.ty {
            ParamType::Byte => 0xFF,
            ParamType::Word => 0xFFFF,
            _ => u32::MAX,
        };
        if value > max {
            self.error(Error::ValueOverflow(param.ty, value), span);
            return None;
        }
        Some(Operand::Value(value))
    }
}
