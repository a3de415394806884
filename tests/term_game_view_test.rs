use qaboom::core::{GameState, SessionConfig};
use qaboom::term::{bloch_color, AnchorY, GameView, Rgb, Viewport};
use qaboom::types::{Command, Position};

#[test]
fn term_view_renders_border_corners() {
    let snap = GameState::new(SessionConfig::seeded(1)).snapshot();
    let view = GameView::default().with_anchor_y(AnchorY::Top);

    // 6 cells × 2 columns plus border => 14 × 14
    let fb = view.render(&snap, Viewport::new(14, 14));

    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(13, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 13).unwrap().ch, '└');
    assert_eq!(fb.get(13, 13).unwrap().ch, '┘');
}

#[test]
fn term_view_draws_active_piece_in_bloch_colors() {
    let mut game = GameState::new(SessionConfig::seeded(1));
    game.start().unwrap();
    // Lower the piece so both cells are on the board.
    game.apply_command(Command::SoftDrop);
    let snap = game.snapshot();
    let active = snap.active.unwrap();

    let view = GameView::default().with_anchor_y(AnchorY::Top);
    let vp = Viewport::new(14, 14);
    let layout = view.layout(vp);
    let fb = view.render(&snap, vp);

    let (px, py) = view.cell_origin(layout, active.anchor);
    let expected = match active.piece {
        qaboom::core::PieceView::QubitPair { first, .. } => bloch_color(first.theta, first.phi),
        other => panic!("opening piece should be a pair, got {other:?}"),
    };
    assert_eq!(fb.get(px, py).unwrap().style.bg, expected);
    assert_eq!(fb.get(px + 1, py).unwrap().style.bg, expected);
}

#[test]
fn term_view_empty_cell_is_dotted() {
    let snap = GameState::new(SessionConfig::seeded(1)).snapshot();
    let view = GameView::default().with_anchor_y(AnchorY::Top);
    let vp = Viewport::new(14, 14);
    let fb = view.render(&snap, vp);
    let (px, py) = view.cell_origin(view.layout(vp), Position::new(0, 11));
    assert_eq!(fb.get(px, py).unwrap().ch, '·');
    assert_ne!(fb.get(px, py).unwrap().style.bg, Rgb::BLACK);
}
