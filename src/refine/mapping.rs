//! Parametric cell maps: (u, v, w) in the reference element to (x, y, z).
//!
//! Two flavours share one evaluation signature and are chosen at divider
//! construction time:
//!
//! * [`MappingType::LengthScale`]: the corner (multi)linear map composed
//!   with a C¹ transfinite parameter warp. Every edge carries a monotone
//!   cubic Hermite reparameterisation whose endpoint derivatives come from
//!   the two adjacent vertex length scales, so subdivision points crowd
//!   toward small-length-scale corners; the warps are blended into faces
//!   and the interior with weights that vanish on non-adjacent boundary
//!   entities, which keeps face points exactly on their face.
//! * [`MappingType::Lagrange`]: the standard cubic Lagrange bases
//!   (20-node tet, 64-node hex, 40-node prism, 30-node collapsed-lattice
//!   pyramid) over nodes synthesised from the corner map.
//!
//! With all length scales equal the warp is the identity and the two
//! flavours agree to round-off.
//!
//! Pyramids use collapsed coordinates: `(a, b)` span the full base square
//! on every layer and `w` runs base-to-apex, so `point((a, b, 1))` is the
//! apex regardless of `(a, b)`.

/// Which map flavour a divider builds for each coarse cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MappingType {
    /// Length-scale-weighted Hermite-style map (smooth graded refinement).
    LengthScale,
    /// Cubic Lagrange map; length scales are not consulted.
    Lagrange,
}

/// Monotone cubic reparameterisation of [0, 1] with prescribed endpoint
/// derivatives. Derivatives are clamped to [0.5, 1.5], which keeps the
/// cubic strictly increasing.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EdgeWarp {
    w0: f64,
    w1: f64,
}

impl EdgeWarp {
    /// Warp for an edge running from a vertex with length scale `ls0` to
    /// one with `ls1`. Equal scales give the identity.
    pub fn new(ls0: f64, ls1: f64) -> Self {
        let w0 = (2.0 * ls0 / (ls0 + ls1)).clamp(0.5, 1.5);
        let w1 = (2.0 * ls1 / (ls0 + ls1)).clamp(0.5, 1.5);
        EdgeWarp { w0, w1 }
    }

    pub fn identity() -> Self {
        EdgeWarp { w0: 1.0, w1: 1.0 }
    }

    /// H(s) with H(0)=0, H(1)=1, H'(0)=w0, H'(1)=w1.
    pub fn apply(&self, s: f64) -> f64 {
        let (w0, w1) = (self.w0, self.w1);
        w0 * s + (3.0 - 2.0 * w0 - w1) * s * s + (w0 + w1 - 2.0) * s * s * s
    }

    /// H(s) − s, the warp displacement.
    pub fn shift(&self, s: f64) -> f64 {
        self.apply(s) - s
    }
}

// ---------------------------------------------------------------------------
// Linear corner maps
// ---------------------------------------------------------------------------

fn lerp3(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [
        a[0] + t * (b[0] - a[0]),
        a[1] + t * (b[1] - a[1]),
        a[2] + t * (b[2] - a[2]),
    ]
}

fn weighted_sum(corners: &[[f64; 3]], weights: &[f64]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (c, &w) in corners.iter().zip(weights.iter()) {
        out[0] += w * c[0];
        out[1] += w * c[1];
        out[2] += w * c[2];
    }
    out
}

fn tet_linear(corners: &[[f64; 3]; 4], uvw: [f64; 3]) -> [f64; 3] {
    let [u, v, w] = uvw;
    weighted_sum(corners, &[1.0 - u - v - w, u, v, w])
}

fn hex_trilinear(corners: &[[f64; 3]; 8], uvw: [f64; 3]) -> [f64; 3] {
    let [u, v, w] = uvw;
    let (um, vm, wm) = (1.0 - u, 1.0 - v, 1.0 - w);
    weighted_sum(
        corners,
        &[
            um * vm * wm,
            u * vm * wm,
            u * v * wm,
            um * v * wm,
            um * vm * w,
            u * vm * w,
            u * v * w,
            um * v * w,
        ],
    )
}

fn prism_linear(corners: &[[f64; 3]; 6], uvw: [f64; 3]) -> [f64; 3] {
    let [u, v, w] = uvw;
    let b0 = 1.0 - u - v;
    let wm = 1.0 - w;
    weighted_sum(
        corners,
        &[b0 * wm, u * wm, v * wm, b0 * w, u * w, v * w],
    )
}

fn quad_bilinear(corners: &[[f64; 3]], a: f64, b: f64) -> [f64; 3] {
    let (am, bm) = (1.0 - a, 1.0 - b);
    weighted_sum(corners, &[am * bm, a * bm, a * b, am * b])
}

/// Collapsed-coordinate pyramid map: bilinear base blended toward the apex.
fn pyr_collapsed(corners: &[[f64; 3]; 5], uvw: [f64; 3]) -> [f64; 3] {
    let [a, b, w] = uvw;
    let base = quad_bilinear(&corners[..4], a, b);
    lerp3(base, corners[4], w)
}

// ---------------------------------------------------------------------------
// Cubic Lagrange bases
// ---------------------------------------------------------------------------

/// 1D Lagrange basis function `a` of degree `m` with nodes at r/m.
fn lagrange_1d(m: usize, a: usize, x: f64) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let xa = a as f64 / m as f64;
    let mut out = 1.0;
    for r in 0..=m {
        if r != a {
            let xr = r as f64 / m as f64;
            out *= (x - xr) / (xa - xr);
        }
    }
    out
}

/// Simplex-lattice factor: `Π_{r<k} (3x − r)/(k − r)` for a cubic lattice.
fn bary_factor(k: u32, x: f64) -> f64 {
    let mut out = 1.0;
    for r in 0..k {
        out *= (3.0 * x - r as f64) / (k - r) as f64;
    }
    out
}

// ---------------------------------------------------------------------------
// Per-shape maps
// ---------------------------------------------------------------------------

/// Tetrahedron map. Reference corners (0,0,0), (1,0,0), (0,1,0), (0,0,1).
#[derive(Clone, Debug)]
pub(crate) enum TetMap {
    LengthScale {
        corners: [[f64; 3]; 4],
        warps: [EdgeWarp; 6],
    },
    /// 20 cubic nodes indexed by the barycentric lattice n0+n1+n2+n3 = 3.
    Lagrange { nodes: Vec<([u32; 4], [f64; 3])> },
}

/// Tet edge table: vertex pairs in the order 01, 02, 03, 12, 13, 23.
pub(crate) const TET_EDGES: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

const TET_REF: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

impl TetMap {
    pub fn new(mapping: MappingType, corners: [[f64; 3]; 4], scales: [f64; 4]) -> Self {
        match mapping {
            MappingType::LengthScale => {
                let warps =
                    TET_EDGES.map(|[i, j]| EdgeWarp::new(scales[i], scales[j]));
                TetMap::LengthScale { corners, warps }
            }
            MappingType::Lagrange => {
                let mut nodes = Vec::with_capacity(20);
                for n0 in (0..=3u32).rev() {
                    for n1 in 0..=3 - n0 {
                        for n2 in 0..=3 - n0 - n1 {
                            let n3 = 3 - n0 - n1 - n2;
                            let b = [n1 as f64 / 3.0, n2 as f64 / 3.0, n3 as f64 / 3.0];
                            nodes.push(([n0, n1, n2, n3], tet_linear(&corners, b)));
                        }
                    }
                }
                TetMap::Lagrange { nodes }
            }
        }
    }

    pub fn point(&self, uvw: [f64; 3]) -> [f64; 3] {
        match self {
            TetMap::LengthScale { corners, warps } => {
                let b = [1.0 - uvw[0] - uvw[1] - uvw[2], uvw[0], uvw[1], uvw[2]];
                let mut p = uvw;
                for (e, warp) in TET_EDGES.iter().zip(warps.iter()) {
                    let (bi, bj) = (b[e[0]], b[e[1]]);
                    let denom = bi + bj;
                    if denom > 1e-12 {
                        let shift = denom * denom * warp.shift(bj / denom);
                        for d in 0..3 {
                            p[d] += shift * (TET_REF[e[1]][d] - TET_REF[e[0]][d]);
                        }
                    }
                }
                tet_linear(corners, p)
            }
            TetMap::Lagrange { nodes } => {
                let b = [
                    1.0 - uvw[0] - uvw[1] - uvw[2],
                    uvw[0],
                    uvw[1],
                    uvw[2],
                ];
                let mut out = [0.0; 3];
                for (lattice, pos) in nodes {
                    let mut weight = 1.0;
                    for m in 0..4 {
                        weight *= bary_factor(lattice[m], b[m]);
                    }
                    for d in 0..3 {
                        out[d] += weight * pos[d];
                    }
                }
                out
            }
        }
    }
}

/// Hexahedron map. Reference element [0,1]³ with the usual corner order
/// (bottom face counter-clockwise, then top face).
#[derive(Clone, Debug)]
pub(crate) enum HexMap {
    LengthScale {
        corners: [[f64; 3]; 8],
        // Warps for the u-, v- and w-parallel edge quadruples.
        u_warps: [EdgeWarp; 4],
        v_warps: [EdgeWarp; 4],
        w_warps: [EdgeWarp; 4],
    },
    /// 64 cubic nodes on the 4×4×4 tensor lattice, x-fastest.
    Lagrange { nodes: Vec<[f64; 3]> },
}

/// Edges parallel to each axis, ordered so that the bilinear blend weights
/// below line up: (low,low), (high,low), (low,high), (high,high) in the
/// two transverse coordinates.
const HEX_U_EDGES: [[usize; 2]; 4] = [[0, 1], [3, 2], [4, 5], [7, 6]];
const HEX_V_EDGES: [[usize; 2]; 4] = [[0, 3], [1, 2], [4, 7], [5, 6]];
const HEX_W_EDGES: [[usize; 2]; 4] = [[0, 4], [1, 5], [3, 7], [2, 6]];

fn quad_blend(s: f64, t: f64) -> [f64; 4] {
    [
        (1.0 - s) * (1.0 - t),
        s * (1.0 - t),
        (1.0 - s) * t,
        s * t,
    ]
}

impl HexMap {
    pub fn new(mapping: MappingType, corners: [[f64; 3]; 8], scales: [f64; 8]) -> Self {
        match mapping {
            MappingType::LengthScale => HexMap::LengthScale {
                corners,
                u_warps: HEX_U_EDGES.map(|[i, j]| EdgeWarp::new(scales[i], scales[j])),
                v_warps: HEX_V_EDGES.map(|[i, j]| EdgeWarp::new(scales[i], scales[j])),
                w_warps: HEX_W_EDGES.map(|[i, j]| EdgeWarp::new(scales[i], scales[j])),
            },
            MappingType::Lagrange => {
                let mut nodes = Vec::with_capacity(64);
                for k in 0..4 {
                    for j in 0..4 {
                        for i in 0..4 {
                            nodes.push(hex_trilinear(
                                &corners,
                                [i as f64 / 3.0, j as f64 / 3.0, k as f64 / 3.0],
                            ));
                        }
                    }
                }
                HexMap::Lagrange { nodes }
            }
        }
    }

    pub fn point(&self, uvw: [f64; 3]) -> [f64; 3] {
        match self {
            HexMap::LengthScale {
                corners,
                u_warps,
                v_warps,
                w_warps,
            } => {
                let [u, v, w] = uvw;
                let mut warped = [u, v, w];
                for (blend, (warp, coord)) in [
                    (quad_blend(v, w), (u_warps, 0usize)),
                    (quad_blend(u, w), (v_warps, 1)),
                    (quad_blend(u, v), (w_warps, 2)),
                ] {
                    let s = uvw[coord];
                    let mut shift = 0.0;
                    for e in 0..4 {
                        shift += blend[e] * warp[e].shift(s);
                    }
                    warped[coord] += shift;
                }
                hex_trilinear(corners, warped)
            }
            HexMap::Lagrange { nodes } => {
                let [u, v, w] = uvw;
                let mut out = [0.0; 3];
                let mut idx = 0;
                for k in 0..4 {
                    let lk = lagrange_1d(3, k, w);
                    for j in 0..4 {
                        let lj = lagrange_1d(3, j, v);
                        for i in 0..4 {
                            let weight = lagrange_1d(3, i, u) * lj * lk;
                            for d in 0..3 {
                                out[d] += weight * nodes[idx][d];
                            }
                            idx += 1;
                        }
                    }
                }
                out
            }
        }
    }
}

/// Prism map. Triangle coordinates (u, v) with u+v ≤ 1, layer coordinate w.
#[derive(Clone, Debug)]
pub(crate) enum PrismMap {
    LengthScale {
        corners: [[f64; 3]; 6],
        bottom_warps: [EdgeWarp; 3],
        top_warps: [EdgeWarp; 3],
        vertical_warps: [EdgeWarp; 3],
    },
    /// 40 nodes: cubic triangle lattice × four layers.
    Lagrange {
        nodes: Vec<([u32; 3], usize, [f64; 3])>,
    },
}

/// In-plane triangle edge pairs (barycentric indices): 01, 02, 12.
const PRISM_TRI_EDGES: [[usize; 2]; 3] = [[0, 1], [0, 2], [1, 2]];
const TRI_REF: [[f64; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];

impl PrismMap {
    pub fn new(mapping: MappingType, corners: [[f64; 3]; 6], scales: [f64; 6]) -> Self {
        match mapping {
            MappingType::LengthScale => PrismMap::LengthScale {
                corners,
                bottom_warps: PRISM_TRI_EDGES.map(|[i, j]| EdgeWarp::new(scales[i], scales[j])),
                top_warps: PRISM_TRI_EDGES
                    .map(|[i, j]| EdgeWarp::new(scales[i + 3], scales[j + 3])),
                vertical_warps: [
                    EdgeWarp::new(scales[0], scales[3]),
                    EdgeWarp::new(scales[1], scales[4]),
                    EdgeWarp::new(scales[2], scales[5]),
                ],
            },
            MappingType::Lagrange => {
                let mut nodes = Vec::with_capacity(40);
                for layer in 0..4usize {
                    for n0 in (0..=3u32).rev() {
                        for n1 in 0..=3 - n0 {
                            let n2 = 3 - n0 - n1;
                            let uvw = [n1 as f64 / 3.0, n2 as f64 / 3.0, layer as f64 / 3.0];
                            nodes.push(([n0, n1, n2], layer, prism_linear(&corners, uvw)));
                        }
                    }
                }
                PrismMap::Lagrange { nodes }
            }
        }
    }

    pub fn point(&self, uvw: [f64; 3]) -> [f64; 3] {
        match self {
            PrismMap::LengthScale {
                corners,
                bottom_warps,
                top_warps,
                vertical_warps,
            } => {
                let [u, v, w] = uvw;
                let b = [1.0 - u - v, u, v];
                let mut plane = [u, v];
                for (e, (bot, top)) in PRISM_TRI_EDGES
                    .iter()
                    .zip(bottom_warps.iter().zip(top_warps.iter()))
                {
                    let denom = b[e[0]] + b[e[1]];
                    if denom > 1e-12 {
                        let s = b[e[1]] / denom;
                        let shift =
                            denom * denom * ((1.0 - w) * bot.shift(s) + w * top.shift(s));
                        for d in 0..2 {
                            plane[d] += shift * (TRI_REF[e[1]][d] - TRI_REF[e[0]][d]);
                        }
                    }
                }
                let mut wp = w;
                for (i, warp) in vertical_warps.iter().enumerate() {
                    wp += b[i] * warp.shift(w);
                }
                prism_linear(corners, [plane[0], plane[1], wp])
            }
            PrismMap::Lagrange { nodes } => {
                let [u, v, w] = uvw;
                let b = [1.0 - u - v, u, v];
                let mut out = [0.0; 3];
                for (lattice, layer, pos) in nodes {
                    let mut weight = lagrange_1d(3, *layer, w);
                    for m in 0..3 {
                        weight *= bary_factor(lattice[m], b[m]);
                    }
                    for d in 0..3 {
                        out[d] += weight * pos[d];
                    }
                }
                out
            }
        }
    }
}

/// Pyramid map in collapsed coordinates; vertex 4 is the apex at w = 1.
#[derive(Clone, Debug)]
pub(crate) enum PyrMap {
    LengthScale {
        corners: [[f64; 3]; 5],
        // Base edges paired per direction, then the four lateral edges.
        a_warps: [EdgeWarp; 2],
        b_warps: [EdgeWarp; 2],
        lateral_warps: [EdgeWarp; 4],
    },
    /// 30 nodes in shrinking layers: 16 + 9 + 4 + 1.
    Lagrange { layers: [Vec<[f64; 3]>; 4] },
}

impl PyrMap {
    pub fn new(mapping: MappingType, corners: [[f64; 3]; 5], scales: [f64; 5]) -> Self {
        match mapping {
            MappingType::LengthScale => PyrMap::LengthScale {
                corners,
                a_warps: [
                    EdgeWarp::new(scales[0], scales[1]),
                    EdgeWarp::new(scales[3], scales[2]),
                ],
                b_warps: [
                    EdgeWarp::new(scales[0], scales[3]),
                    EdgeWarp::new(scales[1], scales[2]),
                ],
                lateral_warps: [
                    EdgeWarp::new(scales[0], scales[4]),
                    EdgeWarp::new(scales[1], scales[4]),
                    EdgeWarp::new(scales[2], scales[4]),
                    EdgeWarp::new(scales[3], scales[4]),
                ],
            },
            MappingType::Lagrange => {
                let layers = std::array::from_fn(|c| {
                    let side = 4 - c;
                    let mut layer = Vec::with_capacity(side * side);
                    for j in 0..side {
                        for i in 0..side {
                            let denom = (side - 1).max(1) as f64;
                            layer.push(pyr_collapsed(
                                &corners,
                                [i as f64 / denom, j as f64 / denom, c as f64 / 3.0],
                            ));
                        }
                    }
                    layer
                });
                PyrMap::Lagrange { layers }
            }
        }
    }

    pub fn point(&self, uvw: [f64; 3]) -> [f64; 3] {
        match self {
            PyrMap::LengthScale {
                corners,
                a_warps,
                b_warps,
                lateral_warps,
            } => {
                let [a, b, w] = uvw;
                let ap = a + (1.0 - b) * a_warps[0].shift(a) + b * a_warps[1].shift(a);
                let bp = b + (1.0 - a) * b_warps[0].shift(b) + a * b_warps[1].shift(b);
                let blend = quad_blend(a, b);
                // quad_blend orders corners (0,0), (1,0), (0,1), (1,1);
                // lateral warps are per base corner 0, 1, 2, 3.
                let mut wp = w;
                wp += blend[0] * lateral_warps[0].shift(w);
                wp += blend[1] * lateral_warps[1].shift(w);
                wp += blend[3] * lateral_warps[2].shift(w);
                wp += blend[2] * lateral_warps[3].shift(w);
                pyr_collapsed(corners, [ap, bp, wp])
            }
            PyrMap::Lagrange { layers } => {
                let [a, b, w] = uvw;
                let mut out = [0.0; 3];
                for (c, layer) in layers.iter().enumerate() {
                    let lw = lagrange_1d(3, c, w);
                    let m = 3 - c;
                    let side = 4 - c;
                    for j in 0..side {
                        let lb = lagrange_1d(m, j, b);
                        for i in 0..side {
                            let weight = lw * lb * lagrange_1d(m, i, a);
                            let pos = layer[j * side + i];
                            for d in 0..3 {
                                out[d] += weight * pos[d];
                            }
                        }
                    }
                }
                out
            }
        }
    }
}
