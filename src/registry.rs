//! In-memory shape registry.
//!
//! Owns every committed [`Shape`] in insertion order. Insertion order doubles
//! as draw order and, reversed, as hit-test priority. Ids are random UUID v4
//! tokens checked against every id this registry has ever issued, so an id
//! is never handed out twice even after its shape is removed.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashSet;

use uuid::Uuid;

use crate::geometry::{ImagePlacement, Point};
use crate::hit;
use crate::shape::{Geometry, Shape, ShapeEdit, ShapeId, ShapeKind, ShapeStyle};

/// Addresses a shape for removal: by id, or by position in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKey {
    Id(ShapeId),
    Index(usize),
}

impl From<ShapeId> for ShapeKey {
    fn from(id: ShapeId) -> Self {
        Self::Id(id)
    }
}

impl From<&ShapeId> for ShapeKey {
    fn from(id: &ShapeId) -> Self {
        Self::Id(id.clone())
    }
}

impl From<&str> for ShapeKey {
    fn from(id: &str) -> Self {
        Self::Id(ShapeId::from(id))
    }
}

impl From<usize> for ShapeKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Ordered store of committed shapes.
#[derive(Debug, Default)]
pub struct ShapeRegistry {
    shapes: Vec<Shape>,
    issued: HashSet<ShapeId>,
}

impl ShapeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new shape and return a copy of the stored record.
    pub fn store(
        &mut self,
        kind: ShapeKind,
        canvas: Geometry,
        image: Geometry,
        style: ShapeStyle,
        image_bound: bool,
    ) -> Shape {
        let shape = Shape {
            id: self.next_id(),
            kind,
            canvas,
            image,
            style,
            timestamp: now_millis(),
            image_bound,
        };
        self.shapes.push(shape.clone());
        shape
    }

    fn next_id(&mut self) -> ShapeId {
        loop {
            let id = ShapeId(Uuid::new_v4().to_string());
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    #[must_use]
    pub fn find_by_id(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| &s.id == id)
    }

    /// The topmost shape under `p` (canvas space).
    #[must_use]
    pub fn find_at_position(&self, p: Point) -> Option<&Shape> {
        hit::topmost_at(&self.shapes, p)
    }

    /// Remove a shape by id or index, returning the removed record.
    pub fn remove(&mut self, key: impl Into<ShapeKey>) -> Option<Shape> {
        let index = match key.into() {
            ShapeKey::Id(id) => self.shapes.iter().position(|s| s.id == id)?,
            ShapeKey::Index(i) if i < self.shapes.len() => i,
            ShapeKey::Index(_) => return None,
        };
        Some(self.shapes.remove(index))
    }

    /// Remove every shape. Issued ids stay reserved.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// All shapes in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Shape] {
        &self.shapes
    }

    /// Apply an inspector edit. Returns the updated record, or `None` if the
    /// shape doesn't exist or the replacement geometry has the wrong variant.
    pub fn update(&mut self, id: &ShapeId, edit: &ShapeEdit, placement: Option<&ImagePlacement>) -> Option<Shape> {
        let shape = self.shapes.iter_mut().find(|s| &s.id == id)?;
        if let Some(image) = &edit.image {
            let same_variant = matches!(
                (&shape.image, image),
                (Geometry::Rect(_), Geometry::Rect(_)) | (Geometry::Path(_), Geometry::Path(_))
            );
            if !same_variant {
                return None;
            }
            let image = match image {
                Geometry::Rect(r) => Geometry::Rect(r.normalized()),
                Geometry::Path(_) => image.clone(),
            };
            shape.canvas = if shape.image_bound { image.to_canvas(placement) } else { image.clone() };
            shape.image = image;
        }
        shape.style.merge(&edit.style);
        Some(shape.clone())
    }

    /// Recompute canvas geometry of image-bound shapes from their image
    /// geometry under `placement`.
    pub fn reproject(&mut self, placement: &ImagePlacement) {
        for shape in self.shapes.iter_mut().filter(|s| s.image_bound) {
            shape.canvas = shape.image.to_canvas(Some(placement));
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn now_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
