use super::*;

#[test]
fn layers_are_ordered_bottom_to_top() {
    assert!(Layer::Background < Layer::Static);
    assert!(Layer::Static < Layer::Interactive);
    assert!(Layer::Interactive < Layer::Overlay);
    assert!(Layer::Overlay < Layer::Marquee);
}

#[test]
fn marker_layer_assignment() {
    assert_eq!(marker_layer(false, false, false), Layer::Static);
    assert_eq!(marker_layer(true, false, false), Layer::Interactive);
    assert_eq!(marker_layer(false, true, false), Layer::Interactive);
    assert_eq!(marker_layer(false, false, true), Layer::Interactive);
}

#[test]
fn new_set_is_fully_dirty() {
    let dirty = DirtyLayers::default();
    assert!(Layer::ALL.iter().all(|l| dirty.is_dirty(*l)));
}

#[test]
fn take_returns_dirty_layers_in_order() {
    let mut dirty = DirtyLayers::none();
    dirty.mark(Layer::Marquee);
    dirty.mark(Layer::Interactive);
    assert_eq!(dirty.lowest(), Some(Layer::Interactive));
    assert_eq!(dirty.take(), vec![Layer::Interactive, Layer::Marquee]);
    assert!(dirty.is_clean());
    assert!(dirty.take().is_empty());
}

#[test]
fn marquee_only_change_is_cheap() {
    let mut dirty = DirtyLayers::none();
    dirty.mark(Layer::Marquee);
    assert!(!dirty.is_dirty(Layer::Static));
    assert_eq!(dirty.take(), vec![Layer::Marquee]);
}
