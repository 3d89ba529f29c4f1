use super::*;

#[test]
fn all_is_bbox_plus_render() {
    assert_eq!(ItemState::ALL, ItemState::BBOX_VALID | ItemState::RENDER_VALID);
    assert!(ItemState::ALL.is_complete());
    assert!(!ItemState::BBOX_VALID.is_complete());
    assert!(!ItemState::ALL.contains(ItemState::INVALID));
}

#[test]
fn none_is_empty_and_default() {
    assert!(ItemState::NONE.is_empty());
    assert_eq!(ItemState::default(), ItemState::NONE);
    assert_eq!(RenderFlags::default(), RenderFlags::empty());
}

#[test]
fn subtree_state_is_intersection() {
    let parts = [ItemState::ALL, ItemState::BBOX_VALID, ItemState::ALL];
    let best = parts.iter().fold(ItemState::ALL, |acc, s| acc & *s);
    assert_eq!(best, ItemState::BBOX_VALID);
}
