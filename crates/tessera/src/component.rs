#![forbid(unsafe_code)]

//! The render contract and the component registry.
//!
//! A component renders into `bounds` of a [`CellTarget`] using its resolved
//! [`Style`]; everything it shows is expressed as cell writes. Components
//! declare what else they can do with a [`Capabilities`] set instead of
//! implementing a tower of marker traits.

use std::collections::BTreeMap;
use std::fmt;

use tessera_core::{Rect, Size};
use tessera_render::CellTarget;
use tessera_style::Style;

bitflags::bitflags! {
    /// Optional behaviors a component supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u16 {
        const FOCUSABLE   = 0b0000_0001;
        const CLICKABLE   = 0b0000_0010;
        /// Receives key events while focused.
        const INTERACTIVE = 0b0000_0100;
        const SCROLLABLE  = 0b0000_1000;
        const TEXT_INPUT  = 0b0001_0000;
        /// Has children laid out by the flex engine.
        const CONTAINER   = 0b0010_0000;
    }
}

/// Per-frame state shared by every component render.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderContext<'a> {
    pub focused: Option<&'a str>,
    pub hovered: Option<&'a str>,
    pub now_ms: f64,
}

impl<'a> RenderContext<'a> {
    pub fn new(now_ms: f64) -> Self {
        Self {
            now_ms,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn focused(mut self, id: &'a str) -> Self {
        self.focused = Some(id);
        self
    }

    #[must_use]
    pub fn hovered(mut self, id: &'a str) -> Self {
        self.hovered = Some(id);
        self
    }

    pub fn is_focused(&self, id: &str) -> bool {
        self.focused == Some(id)
    }

    pub fn is_hovered(&self, id: &str) -> bool {
        self.hovered == Some(id)
    }
}

/// Something that can draw itself into a cell grid.
pub trait Renderable {
    /// Draw into `bounds`. Writes outside `bounds` are a contract violation;
    /// wrap the target in a [`ClipBuffer`](tessera_render::ClipBuffer) when
    /// that cannot be guaranteed.
    fn render(
        &self,
        bounds: Rect,
        style: &Style,
        target: &mut dyn CellTarget,
        ctx: &RenderContext<'_>,
    );

    /// Preferred size, used by layout as a hint.
    fn intrinsic_size(&self, _ctx: &RenderContext<'_>) -> Size {
        Size::new(0, 0)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}

/// Builds a component from its element attributes.
pub type ComponentFactory = fn(&Style) -> Box<dyn Renderable>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A component type of this name is already registered.
    Duplicate(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(name) => write!(f, "component type {name:?} is already registered"),
        }
    }
}

impl std::error::Error for RegistryError {}

#[derive(Clone, Copy)]
struct Registration {
    factory: ComponentFactory,
    capabilities: Capabilities,
}

/// Maps element type names to factories and declared capabilities.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    entries: BTreeMap<String, Registration>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v.capabilities)))
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with the built-in `text` and `panel` components.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, capabilities, factory) in crate::builtin::BUILTINS {
            registry.entries.insert(
                name.to_string(),
                Registration {
                    factory,
                    capabilities,
                },
            );
        }
        registry
    }

    pub fn register(
        &mut self,
        name: &str,
        capabilities: Capabilities,
        factory: ComponentFactory,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.entries.insert(
            name.to_string(),
            Registration {
                factory,
                capabilities,
            },
        );
        Ok(())
    }

    /// Instantiate a component; `None` for unknown types.
    pub fn create(&self, name: &str, props: &Style) -> Option<Box<dyn Renderable>> {
        self.entries.get(name).map(|r| (r.factory)(props))
    }

    /// Declared capabilities of a type.
    pub fn capabilities(&self, name: &str) -> Option<Capabilities> {
        self.entries.get(name).map(|r| r.capabilities)
    }

    /// Whether `name` is registered with every capability in `required`.
    pub fn supports(&self, name: &str, required: Capabilities) -> bool {
        self.capabilities(name).is_some_and(|c| c.contains(required))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered type names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
