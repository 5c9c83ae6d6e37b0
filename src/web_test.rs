use std::cell::Cell;

use super::*;

fn counted(builds: &Cell<u32>, value: u32) -> impl FnOnce() -> Result<u32, ()> + '_ {
    move || {
        builds.set(builds.get() + 1);
        Ok(value)
    }
}

#[test]
fn repeated_frames_reuse_scaled_image() {
    let builds = Cell::new(0);
    let mut cache = ScaleCache::default();
    for _ in 0..100 {
        assert_eq!(cache.get_or_try_insert_with((1, 200, 160), counted(&builds, 7)), Ok(&7));
    }
    assert_eq!(builds.get(), 1);
}

#[test]
fn new_revision_or_size_rebuilds() {
    let builds = Cell::new(0);
    let mut cache = ScaleCache::default();
    cache.get_or_try_insert_with((1, 200, 160), counted(&builds, 1)).unwrap();
    assert_eq!(cache.get_or_try_insert_with((2, 200, 160), counted(&builds, 2)), Ok(&2));
    assert_eq!(cache.get_or_try_insert_with((2, 100, 80), counted(&builds, 3)), Ok(&3));
    assert_eq!(builds.get(), 3);
}

#[test]
fn failed_build_leaves_cache_empty() {
    let mut cache: ScaleCache<u32> = ScaleCache::default();
    cache.get_or_try_insert_with((1, 10, 10), || Ok::<_, ()>(5)).unwrap();
    assert_eq!(cache.get_or_try_insert_with((2, 10, 10), || Err("decode")), Err("decode"));
    assert!(cache.is_empty());
}

#[test]
fn invalidate_forces_rebuild() {
    let builds = Cell::new(0);
    let mut cache = ScaleCache::default();
    cache.get_or_try_insert_with((1, 10, 10), counted(&builds, 1)).unwrap();
    cache.invalidate();
    assert!(cache.is_empty());
    cache.get_or_try_insert_with((1, 10, 10), counted(&builds, 1)).unwrap();
    assert_eq!(builds.get(), 2);
}

#[test]
fn target_size_rounds_and_never_collapses() {
    assert_eq!(target_size(Rect::new(0.0, 0.0, 199.6, 160.2)), (200, 160));
    assert_eq!(target_size(Rect::new(5.0, 5.0, 0.0, 0.2)), (1, 1));
}
