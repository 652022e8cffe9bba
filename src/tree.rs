//! Procedural golden-rain tree: branch geometry plus a pre-rendered raster.
//!
//! The whole tree is regenerated whenever the viewport changes; there is no
//! incremental patching. `TreeCache` swaps in a complete new `Tree` so a
//! reader never sees a half-built one.

use crate::colors::{ROOTS, TRUNK};
use crate::config::Viewport;
use crate::raster::{hex, Canvas, Rgb};
use crate::sprites::PixelGrid;
use rand::prelude::*;
use std::f32::consts::FRAC_PI_2;
use tracing::debug;

/// Deepest level that still sprouts children
const MAX_DEPTH: u8 = 3;
/// Height of the trunk's top as a fraction of the viewport
const TRUNK_TOP: f32 = 0.42;
/// Reference viewport height the size constants were tuned at
const REFERENCE_HEIGHT: f32 = 800.0;

/// (height offset as trunk fraction, angle offset from vertical, length as trunk fraction, thickness)
const SEEDS: [(f32, f32, f32, f32); 7] = [
    (0.0, 0.0, 0.5, 30.0),
    (0.25, -0.4, 0.45, 24.0),
    (0.25, 0.4, 0.45, 24.0),
    (0.12, -0.8, 0.4, 18.0),
    (0.12, 0.8, 0.4, 18.0),
    (0.05, -1.1, 0.32, 14.0),
    (0.05, 1.1, 0.32, 14.0),
];

static FOLIAGE_PATTERNS: [PixelGrid; 2] = [
    PixelGrid {
        rows: &[
            "00111100", "01122110", "11222211", "12222221", "12222221", "11222211", "01122110",
            "00111100",
        ],
        colors: &[],
    },
    PixelGrid {
        rows: &[
            "00011100", "01122210", "11222221", "12222221", "12222211", "01222210", "01112110",
            "00011000",
        ],
        colors: &[],
    },
];

/// (outline, fill) pairs; the first three are leaf greens, the rest blooms and pods
pub const FOLIAGE_COLOR_SETS: [(Rgb, Rgb); 8] = [
    (hex(0x1B5E20), hex(0x2E7D32)),
    (hex(0x2E7D32), hex(0x43A047)),
    (hex(0x33691E), hex(0x558B2F)),
    (hex(0xE65100), hex(0xFF8F00)),
    (hex(0xBF360C), hex(0xE8830C)),
    (hex(0xC62828), hex(0xD4566A)),
    (hex(0xF57F17), hex(0xFFD700)),
    (hex(0xF9A825), hex(0xFFEE58)),
];

#[derive(Clone, Debug, PartialEq)]
pub struct FoliageCluster {
    pub x: f32,
    pub y: f32,
    pub pattern: usize,
    pub color_set: usize,
    pub scale: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeBranch {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub thickness: f32,
    pub depth: u8,
    pub foliage: Vec<FoliageCluster>,
}

impl TreeBranch {
    pub fn length(&self) -> f32 {
        ((self.x2 - self.x1).powi(2) + (self.y2 - self.y1).powi(2)).sqrt()
    }
}

/// Landmarks other subsystems need from the tree
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canopy {
    pub trunk_x: f32,
    pub base_y: f32,
    pub width: f32,
    pub height: f32,
    pub top: f32,
}

impl Canopy {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let (width, height, top) = viewport.canopy();
        Self {
            trunk_x: viewport.trunk_x(),
            base_y: viewport.ground_y(),
            width,
            height,
            top,
        }
    }

    /// Random point in the crown, `spread` of its width and `depth` of its height
    pub fn random_point(&self, rng: &mut StdRng, spread: f32, depth: f32) -> (f32, f32) {
        (
            self.trunk_x + (rng.gen::<f32>() - 0.5) * self.width * spread,
            self.top + rng.gen::<f32>() * self.height * depth,
        )
    }
}

/// Generated geometry plus its composited raster
#[derive(Debug)]
pub struct Tree {
    pub viewport: Viewport,
    pub canopy: Canopy,
    pub branches: Vec<TreeBranch>,
    pub raster: Canvas,
}

/// A branch waiting to be grown
struct BranchTask {
    x: f32,
    y: f32,
    angle: f32,
    length: f32,
    thickness: f32,
    depth: u8,
}

/// Build the branch set and rasterize it
pub fn generate(viewport: Viewport, rng: &mut StdRng) -> Tree {
    let canopy = Canopy::for_viewport(viewport);
    let k = viewport.height / REFERENCE_HEIGHT;
    let trunk_height = canopy.base_y - viewport.height * TRUNK_TOP;
    let foliage_floor = canopy.base_y - 100.0 * k;

    let mut branches = Vec::with_capacity(SEEDS.len() * 86);
    // Use a stack instead of recursion
    let mut stack: Vec<BranchTask> = SEEDS
        .iter()
        .rev()
        .map(|&(rise, offset, length, thickness)| BranchTask {
            x: canopy.trunk_x,
            y: canopy.base_y - trunk_height * rise,
            angle: -FRAC_PI_2 + offset,
            length: trunk_height * length,
            thickness: thickness * k,
            depth: 0,
        })
        .collect();

    while let Some(task) = stack.pop() {
        let x2 = task.x + task.angle.cos() * task.length;
        let y2 = task.y + task.angle.sin() * task.length;
        let foliage = scatter_foliage(rng, x2, y2, task.length, task.depth, foliage_floor, k);

        if task.depth < MAX_DEPTH {
            let (count, spread) = match task.depth {
                0 => (5, 1.8),
                1 => (4, 1.2),
                _ => (3, 0.9),
            };
            for i in (0..count).rev() {
                let offset = (i as f32 / (count - 1) as f32 - 0.5) * spread;
                stack.push(BranchTask {
                    x: x2,
                    y: y2,
                    angle: task.angle + offset + (rng.gen::<f32>() - 0.5) * 0.25,
                    length: task.length * rng.gen_range(0.5..0.75),
                    thickness: task.thickness * 0.55,
                    depth: task.depth + 1,
                });
            }
        }

        branches.push(TreeBranch {
            x1: task.x,
            y1: task.y,
            x2,
            y2,
            thickness: task.thickness,
            depth: task.depth,
            foliage,
        });
    }

    let raster = rasterize(viewport, &canopy, &branches, rng);
    debug!(
        width = viewport.width,
        height = viewport.height,
        branches = branches.len(),
        "generated tree"
    );
    Tree {
        viewport,
        canopy,
        branches,
        raster,
    }
}

fn scatter_foliage(
    rng: &mut StdRng,
    cx: f32,
    cy: f32,
    radius: f32,
    depth: u8,
    floor: f32,
    k: f32,
) -> Vec<FoliageCluster> {
    let count = match depth {
        0 => 6,
        1 => 8,
        _ => 5,
    };
    (0..count)
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let dist = rng.gen::<f32>() * radius;
            FoliageCluster {
                x: cx + angle.cos() * dist,
                y: (cy + angle.sin() * dist).min(floor),
                pattern: rng.gen_range(0..FOLIAGE_PATTERNS.len()),
                color_set: rng.gen_range(0..FOLIAGE_COLOR_SETS.len()),
                scale: rng.gen_range(3.0..5.5) * k,
            }
        })
        .collect()
}

/// Composite trunk, roots, branches (shallow first) and foliage on top
fn rasterize(viewport: Viewport, canopy: &Canopy, branches: &[TreeBranch], rng: &mut StdRng) -> Canvas {
    let mut canvas = Canvas::new(viewport.width as usize, viewport.height as usize);
    let k = viewport.height / REFERENCE_HEIGHT;
    let px = (3.0 * k).max(1.0);
    let top = viewport.height * TRUNK_TOP;
    let trunk_w = (55.0 * k).max(2.0);

    let mut y = canopy.base_y;
    while y > top {
        let taper = 1.0 - (canopy.base_y - y) / (canopy.base_y - top) * 0.4;
        let w = trunk_w * taper;
        let mut x = -w / 2.0;
        while x < w / 2.0 {
            let bark = TRUNK[rng.gen_range(0..TRUNK.len())];
            canvas.fill_rect(canopy.trunk_x + x, y, px, px, bark, 1.0);
            x += px;
        }
        y -= px;
    }

    for i in [-2i32, -1, 1, 2] {
        let len = (30.0 + i.abs() as f32 * 20.0) * k;
        let dir = i.signum() as f32;
        let mut s = 0.0;
        while s < len {
            let root = ROOTS[rng.gen_range(0..ROOTS.len())];
            canvas.fill_rect(
                canopy.trunk_x + i as f32 * 15.0 * k + s * dir,
                canopy.base_y - 5.0 * k + s * 0.15,
                px * 1.5,
                px,
                root,
                1.0,
            );
            s += px;
        }
    }

    let mut ordered: Vec<&TreeBranch> = branches.iter().collect();
    ordered.sort_by_key(|b| b.depth);

    for branch in &ordered {
        let steps = ((branch.length() / px) as usize).max(10);
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let bx = branch.x1 + (branch.x2 - branch.x1) * t;
            let by = branch.y1 + (branch.y2 - branch.y1) * t;
            let bw = (branch.thickness * (1.0 - t * 0.5)).max(1.0);
            let bark = TRUNK[rng.gen_range(0..TRUNK.len())];
            canvas.fill_rect(bx - bw / 2.0, by - bw / 2.0, bw, px, bark, 1.0);
        }
    }

    for branch in &ordered {
        for cluster in &branch.foliage {
            draw_cluster(&mut canvas, cluster);
        }
    }

    canvas
}

fn draw_cluster(canvas: &mut Canvas, cluster: &FoliageCluster) {
    let pattern = &FOLIAGE_PATTERNS[cluster.pattern];
    let (outline, fill) = FOLIAGE_COLOR_SETS[cluster.color_set];
    let s = cluster.scale;
    let (half_w, half_h) = (pattern.width() as f32 * s / 2.0, pattern.height() as f32 * s / 2.0);
    for (col, row, index) in pattern.cells() {
        let color = if index == 1 { outline } else { fill };
        canvas.fill_rect(
            cluster.x + col as f32 * s - half_w,
            cluster.y + row as f32 * s - half_h,
            s,
            s,
            color,
            1.0,
        );
    }
}

/// Owner of the current tree. Only `rebuild` writes; every rebuild is a
/// whole new `Tree`.
#[derive(Debug, Default)]
pub struct TreeCache {
    tree: Option<Tree>,
    generation: u64,
}

impl TreeCache {
    #[cfg(test)]
    pub fn get(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// Bumped on every rebuild
    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rebuild(&mut self, viewport: Viewport, rng: &mut StdRng) -> &Tree {
        self.generation += 1;
        debug!(generation = self.generation, "tree cache rebuilt");
        self.tree.insert(generate(viewport, rng))
    }

    /// Current tree, regenerating when missing or built for another size
    pub fn ensure(&mut self, viewport: Viewport, rng: &mut StdRng) -> &Tree {
        if self.tree.as_ref().map_or(true, |t| t.viewport != viewport) {
            self.rebuild(viewport, rng);
        }
        self.tree.get_or_insert_with(|| generate(viewport, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::{generate, Canopy, TreeCache, FOLIAGE_COLOR_SETS, MAX_DEPTH};
    use crate::config::Viewport;
    use rand::prelude::*;

    #[test]
    fn branch_counts_follow_fan_out() {
        let mut rng = StdRng::seed_from_u64(1);
        let tree = generate(Viewport::new(120, 80), &mut rng);
        // Each seed: 1 + 5 + 5*4 + 5*4*3
        assert_eq!(tree.branches.len(), 7 * 86);
        assert_eq!(tree.branches.iter().filter(|b| b.depth == 0).count(), 7);
        assert!(tree.branches.iter().all(|b| b.depth <= MAX_DEPTH));
    }

    #[test]
    fn children_shrink() {
        let mut rng = StdRng::seed_from_u64(2);
        let tree = generate(Viewport::new(100, 100), &mut rng);
        let max_by_depth = |d: u8| {
            tree.branches
                .iter()
                .filter(|b| b.depth == d)
                .map(|b| b.thickness)
                .fold(0.0f32, f32::max)
        };
        for d in 1..=MAX_DEPTH {
            assert!(max_by_depth(d) < max_by_depth(d - 1));
        }
    }

    #[test]
    fn foliage_counts_and_floor() {
        let vp = Viewport::new(160, 90);
        let mut rng = StdRng::seed_from_u64(3);
        let tree = generate(vp, &mut rng);
        let floor = vp.ground_y() - 100.0 * vp.height / 800.0;
        for b in &tree.branches {
            let expected = match b.depth {
                0 => 6,
                1 => 8,
                _ => 5,
            };
            assert_eq!(b.foliage.len(), expected);
            assert!(b.foliage.iter().all(|c| c.y <= floor + 1e-3));
            assert!(b.foliage.iter().all(|c| c.color_set < FOLIAGE_COLOR_SETS.len()));
        }
    }

    #[test]
    fn raster_has_trunk_at_centre() {
        let vp = Viewport::new(120, 80);
        let mut rng = StdRng::seed_from_u64(4);
        let tree = generate(vp, &mut rng);
        assert_eq!(tree.raster.width(), 120);
        assert!(tree.raster.get(60, vp.ground_y() as i32 - 2).is_some());
        // Corners stay transparent
        assert!(tree.raster.get(0, 0).is_none());
    }

    #[test]
    fn canopy_points_stay_in_crown() {
        let canopy = Canopy::for_viewport(Viewport::new(100, 60));
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let (x, y) = canopy.random_point(&mut rng, 0.85, 0.6);
            assert!((x - canopy.trunk_x).abs() <= canopy.width * 0.85 / 2.0);
            assert!(y >= canopy.top && y <= canopy.top + canopy.height * 0.6);
        }
    }

    #[test]
    fn rebuild_never_reuses_old_geometry() {
        let a = Viewport::new(120, 60);
        let b = Viewport::new(60, 120);
        let mut rng = StdRng::seed_from_u64(6);
        let mut cache = TreeCache::default();

        let first = cache.ensure(a, &mut rng).branches.clone();
        let gen_a = cache.generation();
        cache.ensure(b, &mut rng);
        assert_eq!(cache.generation(), gen_a + 1);
        assert_eq!(cache.get().unwrap().viewport, b);

        let again = cache.ensure(a, &mut rng).branches.clone();
        assert_eq!(cache.generation(), gen_a + 2);
        assert_ne!(first, again);
        // Same size twice in a row is served from the cache
        cache.ensure(a, &mut rng);
        assert_eq!(cache.generation(), gen_a + 2);
    }
}
