//! Integration tests for qos-core drawing primitives.

use proptest::prelude::*;
use qos_core::{
    Canvas, Color, DrawCommand, Palette, Point, RecordingCanvas, Rect, Size, TextStyle,
    Transform2D,
};

// =============================================================================
// Recording and serialization
// =============================================================================

#[test]
fn test_recorded_frame_serializes_to_json() {
    let mut canvas = RecordingCanvas::new();
    canvas.fill_rect(Rect::new(0.0, 0.0, 100.0, 40.0), Color::VOID);
    canvas.draw_path(
        &[Point::new(0.0, 20.0), Point::new(50.0, 10.0), Point::new(100.0, 20.0)],
        Palette::Cyan.color(),
        1.0,
    );
    canvas.draw_text("Quantum OS", Point::new(4.0, 4.0), &TextStyle::new(Color::WHITE));

    let json = serde_json::to_string(canvas.commands()).expect("serialize");
    let back: Vec<DrawCommand> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, canvas.commands());
}

#[test]
fn test_painter_inside_transform_leaves_stack_balanced() {
    let mut canvas = RecordingCanvas::new();
    let logical = Rect::from_size(Size::new(1200.0, 300.0));
    let screen = Rect::new(0.0, 2.0, 80.0, 10.0);

    canvas.push_transform(Transform2D::fit(logical, screen));
    canvas.push_clip(logical);
    canvas.fill_circle(Point::new(600.0, 150.0), 3.0, Palette::Gold.color());
    canvas.pop_clip();
    canvas.pop_transform();

    assert_eq!(canvas.transform_depth(), 0);
    assert_eq!(canvas.clip_depth(), 0);
    assert_eq!(canvas.command_count(), 1);
}

// =============================================================================
// Property tests
// =============================================================================

proptest! {
    #[test]
    fn prop_fit_keeps_points_inside_target(
        x in 0.0f32..=1200.0,
        y in 0.0f32..=300.0,
        w in 1.0f32..200.0,
        h in 1.0f32..60.0,
    ) {
        let to = Rect::new(3.0, 1.0, w, h);
        let t = Transform2D::fit(Rect::from_size(Size::new(1200.0, 300.0)), to);
        let p = t.apply(Point::new(x, y));
        prop_assert!(p.x >= to.x - 1e-3 && p.x <= to.right() + 1e-3);
        prop_assert!(p.y >= to.y - 1e-3 && p.y <= to.bottom() + 1e-3);
    }

    #[test]
    fn prop_color_new_always_in_unit_range(r in -5.0f32..5.0, g in -5.0f32..5.0, b in -5.0f32..5.0) {
        let c = Color::rgb(r, g, b);
        for ch in [c.r, c.g, c.b, c.a] {
            prop_assert!((0.0..=1.0).contains(&ch));
        }
    }
}
