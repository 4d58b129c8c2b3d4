use crate::error::{Diagnostic, Error};
use crate::grammer::token::Span;
use indexmap::IndexMap;

/// A placeholder that receives a dynamic offset once it is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub block: usize,
    pub command: usize,
    pub param: usize,
    pub span: Span,
}

/// Dynamic offsets: where each `@label` is declared and where it is used.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    base: Option<u32>,
    declared: IndexMap<String, (usize, Span)>,
    duplicates: Vec<(String, Span)>,
    sites: IndexMap<String, Vec<Site>>,
}

impl Ledger {
    pub fn new(base: Option<u32>) -> Self {
        Ledger {
            base,
            ..Default::default()
        }
    }

    pub fn base(&self) -> Option<u32> {
        self.base
    }

    pub fn set_base(&mut self, base: u32) {
        self.base = Some(base);
    }

    pub fn declare(&mut self, label: &str, block: usize, span: Span) {
        if self.declared.contains_key(label) {
            self.duplicates.push((label.to_string(), span));
        } else {
            self.declared.insert(label.to_string(), (block, span));
        }
    }

    pub fn refer(&mut self, label: &str, site: Site) {
        self.sites.entry(label.to_string()).or_default().push(site);
    }

    /// Declared labels in declaration order with their block index.
    pub fn declared(&self) -> impl Iterator<Item = (&str, usize)> {
        self.declared
            .iter()
            .map(|(label, (block, _))| (label.as_str(), *block))
    }

    pub fn sites(&self) -> impl Iterator<Item = (&str, &[Site])> {
        self.sites
            .iter()
            .map(|(label, sites)| (label.as_str(), sites.as_slice()))
    }

    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut errors = Vec::new();
        for (label, span) in &self.duplicates {
            errors.push(Diagnostic::error(Error::DuplicateLabel(label.clone()), *span));
        }
        for (label, sites) in &self.sites {
            if !self.declared.contains_key(label) {
                for site in sites {
                    let e = Error::UnknownLabel(label.clone());
                    errors.push(Diagnostic::error(e, site.span));
                }
            }
        }
        if self.base.is_none() {
            let declarations = self.declared.iter().map(|(label, (_, span))| (label, *span));
            let references = self
                .sites
                .iter()
                .flat_map(|(label, sites)| sites.iter().map(move |site| (label, site.span)));
            for (label, span) in declarations.chain(references) {
                errors.push(Diagnostic::error(Error::MissingBase(label.clone()), span));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(row: usize) -> Site {
        Site {
            block: 0,
            command: 0,
            param: 0,
            span: Span::new(row, 0, 1),
        }
    }

    #[test]
    fn duplicate_declaration() {
        let mut ledger = Ledger::new(Some(0x720000));
        ledger.declare("main", 0, Span::new(0, 5, 10));
        ledger.declare("main", 1, Span::new(3, 5, 10));
        let errors = ledger.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error, Error::DuplicateLabel("main".to_string()));
        assert_eq!(errors[0].span.line(), 4);
        assert_eq!(ledger.declared().collect::<Vec<_>>(), vec![("main", 0)]);
    }

    #[test]
    fn unknown_reported_per_site() {
        let mut ledger = Ledger::new(Some(0x720000));
        ledger.refer("text", site(1));
        ledger.refer("text", site(2));
        let errors = ledger.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.error == Error::UnknownLabel("text".to_string())));
    }

    #[test]
    fn missing_base_everywhere() {
        let mut ledger = Ledger::default();
        ledger.declare("main", 0, Span::new(0, 5, 10));
        ledger.refer("main", site(1));
        ledger.refer("main", site(2));
        let errors = ledger.validate();
        let lines: Vec<_> = errors.iter().map(|e| e.span.line()).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert!(errors
            .iter()
            .all(|e| e.error == Error::MissingBase("main".to_string())));
    }
}
