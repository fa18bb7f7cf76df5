//! Rebinding rules
//!
//! A [`RuleSet`] is built once from the configuration document and never
//! changes afterwards. Each [`Rule`] names a referencing module suffix and one
//! or more [`Target`]s; each target names a defining module suffix and the
//! module that should supply the symbol instead.

use crate::{
    MAX_REPLACEMENT_PATH,
    config::{Document, Node, NodeId},
    error::{ConfigError, parse_error},
    flags::AuditFlags,
    suffix::ends_with,
};

/// A defining module suffix and the module that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    suffix: Box<[u8]>,
    replacement: Box<[u8]>,
}

impl Target {
    /// Suffix the defining module's name must end with.
    #[inline]
    pub fn suffix(&self) -> &[u8] {
        &self.suffix
    }

    /// Path of the already loaded module to resolve the symbol in.
    #[inline]
    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }
}

/// A referencing module suffix and its targets, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    source: Box<[u8]>,
    targets: Vec<Target>,
}

impl Rule {
    /// Suffix the referencing module's name must end with.
    #[inline]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    #[inline]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}

/// The immutable set of rules, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Builds a rule set from the text of a configuration document.
    ///
    /// The document must be a mapping whose keys are scalars and whose values
    /// are mappings of scalars to scalars. Nothing is kept from a document that
    /// violates this anywhere; the first violation in document order is reported.
    ///
    /// # Examples
    /// ```
    /// use elf_rebind::RuleSet;
    ///
    /// let rules = RuleSet::parse(b"libA.so:\n  libB.so: /opt/libC.so\n").unwrap();
    /// assert_eq!(rules.find(b"/x/libA.so", b"/y/libB.so"), Some(&b"/opt/libC.so"[..]));
    /// ```
    pub fn parse(text: &[u8]) -> Result<Self, ConfigError> {
        let text = std::str::from_utf8(text).map_err(|_| parse_error("document is not UTF-8"))?;
        let doc = Document::load(text)?;
        let Some(Node::Mapping(pairs)) = doc.root() else {
            return Err(match doc.root() {
                None => ConfigError::EmptyDocument,
                Some(_) => ConfigError::RootNotMapping,
            });
        };
        let rules = pairs
            .iter()
            .map(|&(key, value)| Rule::from_nodes(&doc, key, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSet { rules })
    }

    /// Finds the replacement module for a symbol referenced from `source` and
    /// defined in `target`.
    ///
    /// Rules are tried in document order and targets in document order within
    /// a rule; the first pair whose suffixes both match wins.
    pub fn find(&self, source: &[u8], target: &[u8]) -> Option<&[u8]> {
        self.rules
            .iter()
            .filter(|rule| ends_with(source, &rule.source))
            .flat_map(|rule| rule.targets.iter())
            .find(|t| ends_with(target, &t.suffix))
            .map(Target::replacement)
    }

    /// Which bindings of a module named `name` can ever be rebound.
    ///
    /// `BIND_FROM` is set when `name` matches some rule's source suffix and
    /// `BIND_TO` when it matches some target suffix.
    pub fn audit_flags(&self, name: &[u8]) -> AuditFlags {
        self.rules.iter().fold(AuditFlags::empty(), |mut flags, rule| {
            if ends_with(name, &rule.source) {
                flags |= AuditFlags::BIND_FROM;
            }
            if rule.targets.iter().any(|t| ends_with(name, &t.suffix)) {
                flags |= AuditFlags::BIND_TO;
            }
            flags
        })
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Rule {
    fn from_nodes(doc: &Document, key: NodeId, value: NodeId) -> Result<Self, ConfigError> {
        let Node::Scalar(source) = doc.node(key) else {
            return Err(ConfigError::NonScalarKey);
        };
        let Node::Mapping(pairs) = doc.node(value) else {
            return Err(ConfigError::NestedValueNotMapping);
        };
        if source.is_empty() {
            return Err(ConfigError::EmptyScalar);
        }
        let targets = pairs
            .iter()
            .map(|&(key, value)| Target::from_nodes(doc, key, value))
            .collect::<Result<Vec<_>, _>>()?;
        if targets.is_empty() {
            return Err(ConfigError::EmptyRule);
        }
        Ok(Rule {
            source: source.clone(),
            targets,
        })
    }
}

impl Target {
    fn from_nodes(doc: &Document, key: NodeId, value: NodeId) -> Result<Self, ConfigError> {
        let (Node::Scalar(suffix), Node::Scalar(replacement)) = (doc.node(key), doc.node(value))
        else {
            return Err(ConfigError::NonScalarNestedEntry);
        };
        if suffix.is_empty() || replacement.is_empty() {
            return Err(ConfigError::EmptyScalar);
        }
        if replacement.len() > MAX_REPLACEMENT_PATH {
            return Err(ConfigError::PathTooLong {
                len: replacement.len(),
            });
        }
        Ok(Target {
            suffix: suffix.clone(),
            replacement: replacement.clone(),
        })
    }
}
