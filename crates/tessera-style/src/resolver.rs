#![forbid(unsafe_code)]

//! The style cascade.
//!
//! [`StyleResolver::resolve`] merges, in order:
//!
//! 1. theme defaults
//! 2. element-type defaults
//! 3. whitelisted properties inherited from the resolved parent
//! 4. the element's inline style
//! 5. with a stylesheet: pseudo-class rules, container queries, then the
//!    running keyframe animation
//! 6. color / animation / transition normalization, then transition change
//!    detection against the previous frame
//! 7. in-flight transition values
//! 8. padding / margin side merging
//!
//! Animation and transition trackers persist across frames in an arena keyed
//! by element id. Parents must be resolved before their children.

use std::collections::HashMap;

use tessera_render::PackedRgba;
use tessera_render::color::{CacheStats, ColorCache, ColorSpace};

use crate::animation::{AnimationSpec, AnimationState, Keyframes};
use crate::sheet::{Ancestor, ElementRef, StyleSheet};
use crate::theme::{Theme, TypeDefaults};
use crate::transition::{TransitionSpec, TransitionState};
use crate::value::{Spacing, Style, StyleValue};

/// Properties a child copies from its resolved parent. Layout and sizing
/// properties are never inherited.
pub const INHERITED_PROPERTIES: [&str; 8] = [
    "color",
    "background",
    "fontWeight",
    "fontStyle",
    "textDecoration",
    "dim",
    "reverse",
    "borderColor",
];

const SPACING_SHORTHANDS: [&str; 2] = ["padding", "margin"];
const SIDES: [&str; 4] = ["Top", "Right", "Bottom", "Left"];

/// Whether a property holds a color.
pub fn is_color_property(name: &str) -> bool {
    name == "color" || name == "background" || name.ends_with("Color")
}

/// Per-frame inputs to the cascade.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub stylesheet: Option<&'a StyleSheet>,
    pub focused: Option<&'a str>,
    pub hovered: Option<&'a str>,
    /// Nearest ancestor first.
    pub ancestors: &'a [Ancestor<'a>],
    /// Frame timestamp in milliseconds.
    pub now_ms: f64,
}

impl<'a> ResolveContext<'a> {
    pub fn new(now_ms: f64) -> Self {
        Self {
            stylesheet: None,
            focused: None,
            hovered: None,
            ancestors: &[],
            now_ms,
        }
    }

    #[must_use]
    pub fn stylesheet(mut self, sheet: &'a StyleSheet) -> Self {
        self.stylesheet = Some(sheet);
        self
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

    #[must_use]
    pub fn ancestors(mut self, ancestors: &'a [Ancestor<'a>]) -> Self {
        self.ancestors = ancestors;
        self
    }
}

#[derive(Debug, Default)]
struct ElementState {
    animation: Option<AnimationState>,
    /// Keyframes with colors already resolved; `None` for an unknown name.
    keyframes: Option<Keyframes>,
    transitions: TransitionState,
}

/// Resolves per-element styles and owns the animation/transition arena.
#[derive(Debug)]
pub struct StyleResolver {
    theme: Theme,
    type_defaults: TypeDefaults,
    color_space: ColorSpace,
    colors: ColorCache,
    states: HashMap<String, ElementState>,
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl StyleResolver {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            type_defaults: TypeDefaults::default(),
            color_space: ColorSpace::default(),
            colors: ColorCache::default(),
            states: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_type_defaults(mut self, defaults: TypeDefaults) -> Self {
        self.type_defaults = defaults;
        self
    }

    /// Color space used for animated and transitioned colors.
    #[must_use]
    pub fn with_color_space(mut self, space: ColorSpace) -> Self {
        self.color_space = space;
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn color_cache_stats(&self) -> CacheStats {
        self.colors.stats()
    }

    /// Number of elements with live animation/transition trackers.
    pub fn tracked_elements(&self) -> usize {
        self.states.len()
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    /// Drop trackers for an unmounted element.
    pub fn clear_element(&mut self, id: &str) {
        self.states.remove(id);
    }

    /// Drop every tracker and cached color.
    pub fn clear(&mut self) {
        self.states.clear();
        self.colors.clear();
    }

    /// Resolve the final style of `el` for this frame.
    pub fn resolve(
        &mut self,
        el: &ElementRef<'_>,
        parent: Option<&Style>,
        ctx: &ResolveContext<'_>,
    ) -> Style {
        let mut style = self.theme.default_style();

        if let Some(defaults) = self.type_defaults.get(el.kind) {
            style.merge(defaults);
        }

        if let Some(parent) = parent {
            for name in INHERITED_PROPERTIES {
                if let Some(value) = parent.get(name) {
                    style.insert_raw(name.to_string(), value.clone());
                }
            }
        }

        style.merge(el.inline);

        if let Some(sheet) = ctx.stylesheet {
            style.merge(&sheet.pseudo_overlay(el, ctx.focused, ctx.hovered));
            style.merge(&sheet.container_overlay(el, ctx.ancestors));
        }

        let animation = normalize_animation(&mut style);
        let transitions = normalize_transitions(&mut style);

        if let Some(sheet) = ctx.stylesheet
            && let Some(spec) = &animation
            && let Some(overlay) = self.animate(el.id, spec, sheet, ctx.now_ms)
        {
            style.merge(&overlay);
        }

        normalize_colors(&mut self.colors, &mut style);

        if animation.is_none() && transitions.is_empty() {
            self.states.remove(el.id);
        } else {
            let state = self.states.entry(el.id.to_string()).or_default();
            if animation.is_none() {
                state.animation = None;
                state.keyframes = None;
            }
            state
                .transitions
                .detect_changes(&transitions, &style, ctx.now_ms, self.color_space);
            state.transitions.apply(&mut style, ctx.now_ms, self.color_space);
        }

        merge_spacing_sides(&mut style);
        style
    }

    fn animate(
        &mut self,
        id: &str,
        spec: &AnimationSpec,
        sheet: &StyleSheet,
        now_ms: f64,
    ) -> Option<Style> {
        let state = self.states.entry(id.to_string()).or_default();
        let restart = state.animation.as_ref().is_none_or(|a| a.spec != *spec);
        if restart {
            state.animation = Some(AnimationState::new(spec.clone(), now_ms));
            state.keyframes = match sheet.keyframes(&spec.name) {
                Some(frames) => Some(frames.map_styles(|s| {
                    let mut s = s.clone();
                    normalize_colors(&mut self.colors, &mut s);
                    s
                })),
                None => {
                    tracing::debug!(target: "tessera::style", name = %spec.name, "unknown keyframes");
                    None
                }
            };
        }
        let keyframes = state.keyframes.as_ref()?;
        state.animation.as_mut()?.style_at(keyframes, now_ms, self.color_space)
    }
}

/// Parse a string `animation` into [`StyleValue::Animation`]; invalid or
/// `none` declarations are removed.
fn normalize_animation(style: &mut Style) -> Option<AnimationSpec> {
    let parsed = match style.get("animation")? {
        StyleValue::Animation(spec) => Some(spec.clone()),
        StyleValue::Str(text) if text.trim() == "none" => None,
        StyleValue::Str(text) => AnimationSpec::parse(text)
            .map_err(|err| {
                tracing::debug!(target: "tessera::style", %err, "dropping animation declaration");
            })
            .ok(),
        _ => None,
    };
    match parsed {
        Some(spec) => {
            style.insert_raw("animation".to_string(), StyleValue::Animation(spec.clone()));
            Some(spec)
        }
        None => {
            style.remove("animation");
            None
        }
    }
}

fn normalize_transitions(style: &mut Style) -> Vec<TransitionSpec> {
    let specs = match style.get("transition") {
        None => return Vec::new(),
        Some(StyleValue::Transition(list)) => list.clone(),
        Some(StyleValue::Str(text)) if text.trim() == "none" => Vec::new(),
        Some(StyleValue::Str(text)) => TransitionSpec::parse_list(text).unwrap_or_else(|err| {
            tracing::debug!(target: "tessera::style", %err, "dropping transition declaration");
            Vec::new()
        }),
        Some(_) => Vec::new(),
    };
    if specs.is_empty() {
        style.remove("transition");
    } else {
        style.insert_raw("transition".to_string(), StyleValue::Transition(specs.clone()));
    }
    specs
}

/// Resolve color strings on color properties. Malformed colors become
/// opaque white.
fn normalize_colors(colors: &mut ColorCache, style: &mut Style) {
    let resolved: Vec<(String, PackedRgba)> = style
        .iter()
        .filter(|(name, _)| is_color_property(name))
        .filter_map(|(name, value)| match value {
            StyleValue::Str(text) => Some((name.to_string(), colors.resolve(text))),
            _ => None,
        })
        .collect();
    for (name, color) in resolved {
        style.insert_raw(name, StyleValue::Color(color));
    }
}

/// Fold `paddingTop` etc. into the `padding` spacing value and delete the
/// per-side keys. Per-side values override the shorthand base.
fn merge_spacing_sides(style: &mut Style) {
    for base in SPACING_SHORTHANDS {
        let side_keys = SIDES.map(|side| format!("{base}{side}"));
        let has_sides = side_keys.iter().any(|k| style.contains(k));
        if !has_sides && !style.contains(base) {
            continue;
        }
        let mut spacing = style.spacing(base).unwrap_or(Spacing::ZERO);
        let sides = side_keys.map(|k| style.remove(&k).and_then(|v| v.as_number()));
        let [top, right, bottom, left] = sides;
        if let Some(v) = top {
            spacing.top = v;
        }
        if let Some(v) = right {
            spacing.right = v;
        }
        if let Some(v) = bottom {
            spacing.bottom = v;
        }
        if let Some(v) = left {
            spacing.left = v;
        }
        style.insert_raw(base.to_string(), StyleValue::Spacing(spacing));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element<'a>(id: &'a str, kind: &'a str, inline: &'a Style) -> ElementRef<'a> {
        ElementRef::new(id, kind, &[], inline)
    }

    #[test]
    fn layers_apply_in_order() {
        let mut resolver = StyleResolver::new(Theme::dark());
        let inline = Style::new().with("flexDirection", "row");
        let style = resolver.resolve(&element("c", "container", &inline), None, &ResolveContext::new(0.0));
        assert_eq!(style.str("display"), Some("flex"));
        assert_eq!(style.str("flexDirection"), Some("row"));
        assert_eq!(style.str("fontWeight"), Some("normal"));
        assert_eq!(style.color("color"), Some(PackedRgba::rgb(220, 220, 220)));
    }

    #[test]
    fn only_whitelisted_properties_inherit() {
        let mut resolver = StyleResolver::default();
        let parent = Style::new()
            .with("color", PackedRgba::rgb(255, 0, 0))
            .with("flexDirection", "row")
            .with("width", 40.0)
            .with("dim", true);
        let inline = Style::new();
        let child = resolver.resolve(&element("t", "text", &inline), Some(&parent), &ResolveContext::new(0.0));
        assert_eq!(child.color("color"), Some(PackedRgba::rgb(255, 0, 0)));
        assert_eq!(child.bool("dim"), Some(true));
        assert_ne!(child.str("flexDirection"), Some("row"));
        assert!(!child.contains("width"));
    }

    #[test]
    fn color_strings_resolve_and_malformed_falls_back_to_white() {
        let mut resolver = StyleResolver::default();
        let inline = Style::new()
            .with("color", "#ff0000")
            .with("border-color", "no-such-color");
        let style = resolver.resolve(&element("a", "text", &inline), None, &ResolveContext::new(0.0));
        assert_eq!(style.color("color"), Some(PackedRgba::rgb(255, 0, 0)));
        assert_eq!(style.color("borderColor"), Some(PackedRgba::WHITE));
    }

    #[test]
    fn spacing_sides_override_shorthand() {
        let mut resolver = StyleResolver::default();
        let inline = Style::new()
            .with("padding", 1.0)
            .with("padding-left", 3.0)
            .with("marginTop", "2");
        let style = resolver.resolve(&element("a", "text", &inline), None, &ResolveContext::new(0.0));
        assert_eq!(style.spacing("padding"), Some(Spacing::new(1.0, 1.0, 1.0, 3.0)));
        assert_eq!(style.spacing("margin"), Some(Spacing::new(2.0, 0.0, 0.0, 0.0)));
        assert!(!style.contains("paddingLeft"));
        assert!(!style.contains("marginTop"));
    }

    #[test]
    fn animations_need_a_stylesheet() {
        let mut resolver = StyleResolver::default();
        let inline = Style::new().with("animation", "fade 1s linear");
        let style = resolver.resolve(&element("a", "text", &inline), None, &ResolveContext::new(0.0));
        assert!(matches!(style.get("animation"), Some(StyleValue::Animation(_))));
        assert!(!style.contains("opacity"));
    }

    #[test]
    fn unknown_keyframes_contribute_nothing() {
        let mut resolver = StyleResolver::default();
        let sheet = StyleSheet::new();
        let inline = Style::new().with("animation", "ghost 1s");
        let ctx = ResolveContext::new(0.0).stylesheet(&sheet);
        let style = resolver.resolve(&element("a", "text", &inline), None, &ctx);
        assert_eq!(style.str("fontWeight"), Some("normal"));
        assert!(resolver.is_tracked("a"));
    }

    #[test]
    fn removing_declarations_drops_tracker() {
        let mut resolver = StyleResolver::default();
        let animated = Style::new().with("transition", "color 1s");
        resolver.resolve(&element("a", "text", &animated), None, &ResolveContext::new(0.0));
        assert_eq!(resolver.tracked_elements(), 1);

        let plain = Style::new();
        resolver.resolve(&element("a", "text", &plain), None, &ResolveContext::new(16.0));
        assert_eq!(resolver.tracked_elements(), 0);

        resolver.resolve(&element("b", "text", &animated), None, &ResolveContext::new(0.0));
        resolver.clear_element("b");
        assert!(!resolver.is_tracked("b"));
    }

    #[test]
    fn transition_strings_normalize() {
        let mut resolver = StyleResolver::default();
        let inline = Style::new().with("transition", "color 200ms, width 1s");
        let style = resolver.resolve(&element("a", "text", &inline), None, &ResolveContext::new(0.0));
        match style.get("transition") {
            Some(StyleValue::Transition(list)) => assert_eq!(list.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        let bad = Style::new().with("transition", "color 1s bogus");
        let style = resolver.resolve(&element("b", "text", &bad), None, &ResolveContext::new(0.0));
        assert!(!style.contains("transition"));
    }
}
