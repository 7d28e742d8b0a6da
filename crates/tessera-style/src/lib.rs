#![forbid(unsafe_code)]

//! Style cascade: property bags, timing functions, keyframe animations,
//! transitions, stylesheet overlays, and layout-prop derivation.
//!
//! # Example
//! ```
//! use tessera_style::{ElementRef, ResolveContext, Style, StyleResolver, Theme};
//! use tessera_render::PackedRgba;
//!
//! let mut resolver = StyleResolver::new(Theme::dark());
//! let parent = Style::new().with("color", "red").with("flex-direction", "row");
//! let inline = Style::new();
//! let child = resolver.resolve(
//!     &ElementRef::new("label", "text", &[], &inline),
//!     Some(&parent),
//!     &ResolveContext::new(0.0),
//! );
//! // `color` inherits as a string and is resolved by the child.
//! assert_eq!(child.color("color"), Some(PackedRgba::rgb(255, 0, 0)));
//! assert!(!child.contains("flexDirection"));
//! ```

pub mod animation;
pub mod layout;
pub mod resolver;
pub mod sheet;
pub mod theme;
pub mod timing;
pub mod transition;
pub mod value;

pub use animation::{
    AnimationDirection, AnimationSpec, AnimationState, FillMode, IterationCount, Keyframe,
    Keyframes, animated_style,
};
pub use layout::{Dimension, FlexDirection, LayoutProps, compute_layout_props};
pub use resolver::{INHERITED_PROPERTIES, ResolveContext, StyleResolver};
pub use sheet::{Ancestor, ContainerCondition, ContainerRule, ElementRef, Selector, StyleSheet};
pub use theme::{Theme, TypeDefaults};
pub use timing::{StepPosition, TimingFunction};
pub use transition::{TransitionSpec, TransitionState};
pub use value::{Spacing, Style, StyleValue, ValueParseError};
