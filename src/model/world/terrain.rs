//! Ground surfaces the controller stands on.
//!
//! Everything here is immutable once registered; the per-tick code only ever
//! asks "where does this ray hit", mostly with straight-down rays.

use anyhow::{bail, ensure, Context, Result};
use glam::{Affine3A, Vec3};
use tracing::{debug, info, warn};

use crate::utils::{ray_triangle, Aabb, Ray, RayHit};

/// Anything a ray can be cast against
pub trait TerrainSurface {
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit>;

    /// Short name for logs
    fn label(&self) -> &str {
        "surface"
    }
}

/// Largest bucket grid side; keeps memory bounded for huge meshes
const MAX_GRID_CELLS: usize = 256;

/// Coarse XZ grid of triangle indices. A vertical ray only has to test the
/// triangles whose XZ bounds cover its cell.
#[derive(Debug, Clone)]
struct BucketGrid {
    min_x: f32,
    min_z: f32,
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<u32>>,
}

impl BucketGrid {
    fn build(bounds: &Aabb, vertices: &[Vec3], triangles: &[[u32; 3]]) -> Self {
        let side = ((triangles.len() as f32).sqrt().ceil() as usize).clamp(1, MAX_GRID_CELLS);
        let size = bounds.size();
        let cell_size = (size.x.max(size.z) / side as f32).max(1e-3);
        let cols = ((size.x / cell_size).ceil() as usize).clamp(1, MAX_GRID_CELLS);
        let rows = ((size.z / cell_size).ceil() as usize).clamp(1, MAX_GRID_CELLS);

        let mut grid = Self {
            min_x: bounds.min.x,
            min_z: bounds.min.z,
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        };

        for (i, tri) in triangles.iter().enumerate() {
            let mut tb = Aabb::empty();
            for &idx in tri {
                tb.include(vertices[idx as usize]);
            }
            let (c0, r0) = grid.cell_of(tb.min.x, tb.min.z);
            let (c1, r1) = grid.cell_of(tb.max.x, tb.max.z);
            for r in r0..=r1 {
                for c in c0..=c1 {
                    grid.cells[r * cols + c].push(i as u32);
                }
            }
        }
        grid
    }

    /// Cell containing (x, z), clamped onto the grid
    fn cell_of(&self, x: f32, z: f32) -> (usize, usize) {
        let c = ((x - self.min_x) / self.cell_size).floor().max(0.0) as usize;
        let r = ((z - self.min_z) / self.cell_size).floor().max(0.0) as usize;
        (c.min(self.cols - 1), r.min(self.rows - 1))
    }

    fn candidates(&self, x: f32, z: f32) -> &[u32] {
        let (c, r) = self.cell_of(x, z);
        &self.cells[r * self.cols + c]
    }
}

/// Static triangulated collision mesh (valley terrain, rocks, props)
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    label: String,
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    bounds: Aabb,
    grid: BucketGrid,
}

impl TerrainMesh {
    /// Build from raw position / index buffers, validating both.
    pub fn new(label: impl Into<String>, positions: &[[f32; 3]], indices: &[u32]) -> Result<Self> {
        let label = label.into();
        ensure!(!indices.is_empty(), "terrain mesh '{label}' has no triangles");
        if indices.len() % 3 != 0 {
            bail!(
                "terrain mesh '{label}': index count {} is not a multiple of 3",
                indices.len()
            );
        }

        let vertices: Vec<Vec3> = positions.iter().map(|p| Vec3::from_array(*p)).collect();
        if let Some(i) = vertices.iter().position(|v| !v.is_finite()) {
            bail!("terrain mesh '{label}': vertex {i} is not finite ({:?})", vertices[i]);
        }

        let triangles = indices
            .chunks_exact(3)
            .enumerate()
            .map(|(t, tri)| {
                for &idx in tri {
                    if idx as usize >= vertices.len() {
                        bail!(
                            "index {idx} out of range ({} vertices) in triangle {t}",
                            vertices.len()
                        );
                    }
                }
                Ok([tri[0], tri[1], tri[2]])
            })
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("invalid index buffer for terrain mesh '{label}'"))?;

        Ok(Self::from_parts(label, vertices, triangles))
    }

    /// Regular grid of `cols` x `rows` quads with `spacing` between samples,
    /// starting at the XZ origin, heights from `height(x, z)`.
    pub fn from_heightfield<F>(
        label: impl Into<String>,
        cols: usize,
        rows: usize,
        spacing: f32,
        height: F,
    ) -> Result<Self>
    where
        F: Fn(f32, f32) -> f32,
    {
        ensure!(cols > 0 && rows > 0, "heightfield needs at least one quad");
        ensure!(spacing > 0.0, "heightfield spacing must be positive, got {spacing}");

        let mut positions = Vec::with_capacity((cols + 1) * (rows + 1));
        for r in 0..=rows {
            for c in 0..=cols {
                let x = c as f32 * spacing;
                let z = r as f32 * spacing;
                positions.push([x, height(x, z), z]);
            }
        }

        let stride = (cols + 1) as u32;
        let mut indices = Vec::with_capacity(cols * rows * 6);
        for r in 0..rows as u32 {
            for c in 0..cols as u32 {
                let i0 = r * stride + c;
                let i1 = i0 + 1;
                let i2 = i0 + stride;
                let i3 = i2 + 1;
                indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            }
        }

        Self::new(label, &positions, &indices)
    }

    fn from_parts(label: String, vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let mut bounds = Aabb::empty();
        for v in &vertices {
            bounds.include(*v);
        }
        let grid = BucketGrid::build(&bounds, &vertices, &triangles);
        debug!(
            mesh = %label,
            triangles = triangles.len(),
            grid_cols = grid.cols,
            grid_rows = grid.rows,
            "built terrain mesh"
        );
        Self { label, vertices, triangles, bounds, grid }
    }

    /// Apply a world transform to every vertex
    pub fn transformed(self, transform: Affine3A) -> Self {
        let vertices = self
            .vertices
            .iter()
            .map(|v| transform.transform_point3(*v))
            .collect();
        Self::from_parts(self.label, vertices, self.triangles)
    }

    /// Scale uniformly so the larger XZ extent equals `target_size`, centre on
    /// the XZ origin and lift so the lowest vertex sits at `base_height`.
    pub fn fit_footprint(self, target_size: f32, base_height: f32) -> Self {
        let size = self.bounds.size();
        let extent = size.x.max(size.z);
        if !(extent > 0.0) || !(target_size > 0.0) {
            warn!(mesh = %self.label, extent, target_size, "cannot fit degenerate footprint, leaving mesh as is");
            return self;
        }

        let scale = target_size / extent;
        let center = (self.bounds.min + self.bounds.max) * 0.5;
        let translation = Vec3::new(
            -center.x * scale,
            base_height - self.bounds.min.y * scale,
            -center.z * scale,
        );
        self.transformed(Affine3A::from_scale_rotation_translation(
            Vec3::splat(scale),
            glam::Quat::IDENTITY,
            translation,
        ))
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn test_triangles<'a, I>(&self, ray: &Ray, max_distance: f32, tris: I) -> Option<RayHit>
    where
        I: IntoIterator<Item = &'a u32>,
    {
        let mut best: Option<f32> = None;
        for &ti in tris {
            let [a, b, c] = self.triangles[ti as usize];
            let hit = ray_triangle(
                ray,
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
            );
            if let Some(t) = hit {
                if t <= max_distance && best.map_or(true, |b| t < b) {
                    best = Some(t);
                }
            }
        }
        best.map(|t| RayHit { distance: t, point: ray.at(t) })
    }
}

impl TerrainSurface for TerrainMesh {
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let vertical = ray.dir.x.abs() < 1e-6 && ray.dir.z.abs() < 1e-6;
        if vertical {
            if !self.bounds.contains_xz(ray.origin.x, ray.origin.z) {
                return None;
            }
            let tris = self.grid.candidates(ray.origin.x, ray.origin.z);
            return self.test_triangles(ray, max_distance, tris);
        }

        let all: Vec<u32> = (0..self.triangles.len() as u32).collect();
        self.test_triangles(ray, max_distance, &all)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Horizontal catch-all floor, infinite unless given a half extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub height: f32,
    /// Square footprint around the origin; None = endless
    pub half_extent: Option<f32>,
}

impl GroundPlane {
    pub fn new(height: f32) -> Self {
        Self { height, half_extent: None }
    }

    pub fn bounded(height: f32, half_extent: f32) -> Self {
        Self { height, half_extent: Some(half_extent.abs()) }
    }
}

impl TerrainSurface for GroundPlane {
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        if ray.dir.y.abs() < 1e-6 {
            return None;
        }
        let t = (self.height - ray.origin.y) / ray.dir.y;
        if !(t >= 0.0 && t <= max_distance) {
            return None;
        }
        let point = ray.at(t);
        if let Some(h) = self.half_extent {
            if point.x.abs() > h || point.z.abs() > h {
                return None;
            }
        }
        Some(RayHit { distance: t, point })
    }

    fn label(&self) -> &str {
        "ground plane"
    }
}

/// Registry of every collidable surface. Surfaces may arrive late (async
/// world load); until then every query misses.
#[derive(Default)]
pub struct TerrainSet {
    surfaces: Vec<Box<dyn TerrainSurface>>,
}

impl TerrainSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: TerrainSurface + 'static>(&mut self, surface: S) {
        info!(surface = surface.label(), index = self.surfaces.len(), "registered terrain surface");
        self.surfaces.push(Box::new(surface));
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Nearest hit over all registered surfaces
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        self.surfaces
            .iter()
            .filter_map(|s| s.raycast(ray, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Height of the first surface straight below `origin`
    pub fn cast_down(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        self.raycast(&Ray::down(origin), max_distance).map(|hit| hit.point.y)
    }
}
