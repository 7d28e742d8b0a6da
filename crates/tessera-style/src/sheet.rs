#![forbid(unsafe_code)]

//! Stylesheet overlays: pseudo-class rules, container queries, keyframes.
//!
//! A [`StyleSheet`] contributes three cascade layers on top of an element's
//! inline style. Rules apply in insertion order, later rules winning.
//!
//! # Example
//! ```
//! use tessera_style::sheet::{ElementRef, StyleSheet};
//! use tessera_style::Style;
//!
//! let mut sheet = StyleSheet::new();
//! sheet.add_pseudo_rule("button:focus", Style::new().with("color", "yellow")).unwrap();
//!
//! let inline = Style::new();
//! let el = ElementRef::new("ok", "button", &[], &inline);
//! let overlay = sheet.pseudo_overlay(&el, Some("ok"), None);
//! assert_eq!(overlay.str("color"), Some("yellow"));
//! ```

use std::collections::HashMap;
use std::fmt;

use tessera_core::geometry::Size;

use crate::animation::Keyframes;
use crate::value::Style;

/// Rejected selector or container condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Empty or malformed selector text.
    InvalidSelector(String),
    /// Pseudo-class other than `:focus` / `:hover`.
    UnsupportedPseudoClass(String),
    /// Malformed `(min-width: N)` style condition.
    InvalidCondition(String),
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSelector(s) => write!(f, "invalid selector: {s}"),
            Self::UnsupportedPseudoClass(s) => write!(f, "unsupported pseudo-class: {s}"),
            Self::InvalidCondition(s) => write!(f, "invalid container condition: {s}"),
        }
    }
}

impl std::error::Error for SelectorError {}

/// The element being resolved, as seen by selectors.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    pub id: &'a str,
    /// Element type name (`button`, `container`, ...).
    pub kind: &'a str,
    pub classes: &'a [String],
    pub inline: &'a Style,
}

impl<'a> ElementRef<'a> {
    pub fn new(id: &'a str, kind: &'a str, classes: &'a [String], inline: &'a Style) -> Self {
        Self {
            id,
            kind,
            classes,
            inline,
        }
    }
}

/// An ancestor of the element being resolved, nearest first.
#[derive(Debug, Clone, Copy)]
pub struct Ancestor<'a> {
    pub id: &'a str,
    pub kind: &'a str,
    pub classes: &'a [String],
    /// Laid-out size, if the ancestor has been laid out this frame.
    pub size: Option<Size>,
}

/// A simple selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `*`
    Universal,
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `button`
    Type(String),
}

impl Selector {
    pub fn parse(s: &str) -> Result<Self, SelectorError> {
        let s = s.trim();
        let valid = |name: &str| {
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        };
        let (ctor, name): (fn(String) -> Self, &str) = if s == "*" {
            return Ok(Self::Universal);
        } else if let Some(id) = s.strip_prefix('#') {
            (Self::Id, id)
        } else if let Some(class) = s.strip_prefix('.') {
            (Self::Class, class)
        } else {
            (Self::Type, s)
        };
        if !valid(name) {
            return Err(SelectorError::InvalidSelector(s.to_string()));
        }
        Ok(ctor(name.to_string()))
    }

    fn matches_parts(&self, id: &str, kind: &str, classes: &[String]) -> bool {
        match self {
            Self::Universal => true,
            Self::Id(want) => want == id,
            Self::Class(want) => classes.iter().any(|c| c == want),
            Self::Type(want) => want == kind,
        }
    }

    pub fn matches(&self, el: &ElementRef<'_>) -> bool {
        self.matches_parts(el.id, el.kind, el.classes)
    }

    pub fn matches_ancestor(&self, a: &Ancestor<'_>) -> bool {
        self.matches_parts(a.id, a.kind, a.classes)
    }
}

/// Interaction pseudo-classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    Focus,
    Hover,
}

/// `selector:pseudo { style }`
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoRule {
    pub selector: Selector,
    pub pseudo: PseudoClass,
    pub style: Style,
}

/// Size bounds a container must satisfy. Every present bound must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerCondition {
    pub min_width: Option<u16>,
    pub max_width: Option<u16>,
    pub min_height: Option<u16>,
    pub max_height: Option<u16>,
}

impl ContainerCondition {
    pub fn matches(&self, size: Size) -> bool {
        self.min_width.is_none_or(|v| size.width >= v)
            && self.max_width.is_none_or(|v| size.width <= v)
            && self.min_height.is_none_or(|v| size.height >= v)
            && self.max_height.is_none_or(|v| size.height <= v)
    }

    /// Parse `"(min-width: 40) and (max-height: 10)"`.
    pub fn parse(s: &str) -> Result<Self, SelectorError> {
        let err = || SelectorError::InvalidCondition(s.to_string());
        let mut cond = Self::default();
        for clause in s.split(" and ") {
            let inner = clause
                .trim()
                .strip_prefix('(')
                .and_then(|c| c.strip_suffix(')'))
                .ok_or_else(err)?;
            let (key, value) = inner.split_once(':').ok_or_else(err)?;
            let value: u16 = value.trim().parse().map_err(|_| err())?;
            let slot = match key.trim() {
                "min-width" => &mut cond.min_width,
                "max-width" => &mut cond.max_width,
                "min-height" => &mut cond.min_height,
                "max-height" => &mut cond.max_height,
                _ => return Err(err()),
            };
            *slot = Some(value);
        }
        Ok(cond)
    }
}

/// `@container [name] (condition) { target { style } }`
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerRule {
    /// Which ancestor is the container; `None` means the nearest sized one.
    pub container: Option<Selector>,
    pub condition: ContainerCondition,
    pub target: Selector,
    pub style: Style,
}

impl ContainerRule {
    pub fn new(target: Selector, condition: ContainerCondition, style: Style) -> Self {
        Self {
            container: None,
            condition,
            target,
            style,
        }
    }

    #[must_use]
    pub fn within(mut self, container: Selector) -> Self {
        self.container = Some(container);
        self
    }

    /// Whether the rule applies to `el` given its ancestor chain.
    pub fn applies(&self, el: &ElementRef<'_>, ancestors: &[Ancestor<'_>]) -> bool {
        if !self.target.matches(el) {
            return false;
        }
        let container = ancestors.iter().find(|a| {
            a.size.is_some()
                && self
                    .container
                    .as_ref()
                    .is_none_or(|sel| sel.matches_ancestor(a))
        });
        container
            .and_then(|a| a.size)
            .is_some_and(|size| self.condition.matches(size))
    }
}

/// Rules and keyframes contributing to the cascade.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pseudo_rules: Vec<PseudoRule>,
    container_rules: Vec<ContainerRule>,
    keyframes: HashMap<String, Keyframes>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule from text such as `"#save:hover"` or `".item:focus"`.
    pub fn add_pseudo_rule(&mut self, selector: &str, style: Style) -> Result<(), SelectorError> {
        let (base, pseudo) = selector
            .rsplit_once(':')
            .ok_or_else(|| SelectorError::InvalidSelector(selector.to_string()))?;
        let pseudo = match pseudo.trim() {
            "focus" => PseudoClass::Focus,
            "hover" => PseudoClass::Hover,
            other => return Err(SelectorError::UnsupportedPseudoClass(other.to_string())),
        };
        self.pseudo_rules.push(PseudoRule {
            selector: Selector::parse(base)?,
            pseudo,
            style,
        });
        Ok(())
    }

    pub fn add_container_rule(&mut self, rule: ContainerRule) {
        self.container_rules.push(rule);
    }

    /// Register keyframes under `name`, replacing any previous set.
    pub fn add_keyframes(&mut self, name: impl Into<String>, keyframes: Keyframes) {
        self.keyframes.insert(name.into(), keyframes);
    }

    pub fn keyframes(&self, name: &str) -> Option<&Keyframes> {
        self.keyframes.get(name)
    }

    pub fn pseudo_rules(&self) -> &[PseudoRule] {
        &self.pseudo_rules
    }

    pub fn container_rules(&self) -> &[ContainerRule] {
        &self.container_rules
    }

    /// Merged style of every pseudo rule active for `el`.
    pub fn pseudo_overlay(
        &self,
        el: &ElementRef<'_>,
        focused: Option<&str>,
        hovered: Option<&str>,
    ) -> Style {
        let mut out = Style::new();
        for rule in &self.pseudo_rules {
            let target = match rule.pseudo {
                PseudoClass::Focus => focused,
                PseudoClass::Hover => hovered,
            };
            if target == Some(el.id) && rule.selector.matches(el) {
                out.merge(&rule.style);
            }
        }
        out
    }

    /// Merged style of every container rule satisfied for `el`.
    pub fn container_overlay(&self, el: &ElementRef<'_>, ancestors: &[Ancestor<'_>]) -> Style {
        let mut out = Style::new();
        for rule in &self.container_rules {
            if rule.applies(el, ancestors) {
                out.merge(&rule.style);
            }
        }
        out
    }
}
