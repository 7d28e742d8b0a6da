//! A full frame: cascade, component render, canvas compositing, and diff.

use tessera::prelude::*;
use tessera::{Panel, PixelCanvas, coalesce_runs};
use tessera_canvas::CompositorConfig;
use tessera_style::{ContainerCondition, ContainerRule, Selector, StyleSheet};

fn resolve(
    resolver: &mut StyleResolver,
    sheet: &StyleSheet,
    id: &str,
    kind: &str,
    inline: &Style,
    parent: Option<&Style>,
    now: f64,
) -> Style {
    let ctx = ResolveContext::new(now).stylesheet(sheet);
    resolver.resolve(&ElementRef::new(id, kind, &[], inline), parent, &ctx)
}

#[test]
fn panel_with_text_renders_and_diffs_minimally() {
    let registry = ComponentRegistry::with_builtins();
    let mut resolver = StyleResolver::new(Theme::dark());
    let sheet = StyleSheet::default();
    let mut screen = DualBuffer::new(12, 4);

    let panel_props = Style::new()
        .with("border", "rounded")
        .with("color", "#00ff00");
    let label_props = Style::new().with("content", "ready");

    let mut draw = |screen: &mut DualBuffer, content: &str, now: f64| {
        let panel_style = resolve(&mut resolver, &sheet, "panel", "panel", &panel_props, None, now);
        let label_inline = label_props.clone().with("content", content);
        let label_style = resolve(
            &mut resolver,
            &sheet,
            "label",
            "text",
            &label_inline,
            Some(&panel_style),
            now,
        );
        let ctx = RenderContext::new(now);
        let bounds = Rect::new(0, 0, 12, 4);
        registry
            .create("panel", &panel_props)
            .unwrap()
            .render(bounds, &panel_style, screen.current_mut(), &ctx);
        let content = Panel::content_area(bounds, &panel_style);
        registry
            .create("text", &label_inline)
            .unwrap()
            .render(content, &label_style, screen.current_mut(), &ctx);
        label_style
    };

    let label_style = draw(&mut screen, "ready", 0.0);
    // Text inherits the panel's color.
    assert_eq!(label_style.color("color"), Some(PackedRgba::rgb(0, 255, 0)));
    let first = screen.swap_and_get_diff();
    assert!(!first.is_empty());
    assert_eq!(screen.previous().row_text(0), "╭──────────╮");
    assert_eq!(screen.previous().row_text(1), "│ready     │");

    draw(&mut screen, "ready", 16.0);
    assert!(screen.swap_and_get_diff().is_empty());

    draw(&mut screen, "rest", 32.0);
    let diff = screen.swap_and_get_diff();
    let runs = coalesce_runs(&diff);
    assert_eq!(runs.len(), 1);
    assert_eq!(screen.previous().row_text(1), "│rest      │");
}

#[test]
fn container_query_changes_component_style() {
    let mut resolver = StyleResolver::new(Theme::dark());
    let mut sheet = StyleSheet::default();
    let wide = ContainerCondition {
        min_width: Some(40),
        ..ContainerCondition::default()
    };
    sheet.add_container_rule(ContainerRule::new(
        Selector::Type("text".into()),
        wide,
        Style::new().with("font-weight", "bold"),
    ));

    let inline = Style::new();
    let narrow = [tessera_style::Ancestor {
        id: "root",
        kind: "container",
        classes: &[],
        size: Some(Size::new(20, 5)),
    }];
    let roomy = [tessera_style::Ancestor {
        size: Some(Size::new(80, 5)),
        ..narrow[0]
    }];
    let ctx = ResolveContext::new(0.0).stylesheet(&sheet);
    let small = resolver.resolve(
        &ElementRef::new("t", "text", &[], &inline),
        None,
        &ctx.ancestors(&narrow),
    );
    let big = resolver.resolve(
        &ElementRef::new("t", "text", &[], &inline),
        None,
        &ctx.ancestors(&roomy),
    );
    assert!(!tessera::cell_style(&small).flags.contains(tessera::StyleFlags::BOLD));
    assert!(tessera::cell_style(&big).flags.contains(tessera::StyleFlags::BOLD));
}

#[test]
fn canvas_shares_the_frame_with_components() {
    let registry = ComponentRegistry::with_builtins();
    let mut screen = DualBuffer::new(6, 3);
    let mut canvas = PixelCanvas::for_area(Rect::new(0, 0, 4, 1));
    canvas.line_colored(0, 1, 7, 1, Some(PackedRgba::rgb(255, 128, 0)));

    let style = Style::new().with("border", "single");
    registry.create("panel", &style).unwrap().render(
        Rect::new(0, 0, 6, 3),
        &style,
        screen.current_mut(),
        &RenderContext::new(0.0),
    );
    canvas.render(Rect::new(1, 1, 4, 1), screen.current_mut(), &CompositorConfig::default());
    screen.swap_and_get_diff();
    assert_eq!(screen.previous().row_text(1), "│▄▄▄▄│");
    assert_eq!(
        screen.previous().get(2, 1).and_then(|c| c.fg),
        Some(PackedRgba::rgb(255, 128, 0))
    );
}
