//! World scrolling

use crate::pool::{ObjectPool, Poolable};

/// Move every active entry left by `dx` and deactivate those whose right
/// edge has crossed `despawn_x`. Returns how many were deactivated.
pub fn scroll_pool<T: Poolable>(pool: &mut ObjectPool<T>, dx: f32, despawn_x: f32) -> usize {
    let mut despawned = Vec::new();
    for (handle, item) in pool.iter_active_mut() {
        item.body_mut().center.x -= dx;
        if item.body().max().x < despawn_x {
            despawned.push(handle);
        }
    }
    for &handle in &despawned {
        pool.deactivate(handle);
    }
    despawned.len()
}
