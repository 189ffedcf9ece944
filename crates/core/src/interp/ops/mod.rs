//! Content stream operator implementations.
//!
//! Operators are grouped by category:
//! - `graphics_state` - Transforms and line style (cm, w, J, j, M, d, gs)
//! - `color` - Color space and values (G, g, RG, rg, K, k, CS, cs, SC, SCN, sc, scn)
//! - `path` - Path construction and painting (m, l, c, v, y, h, re, S, s, f, F, f\*, B, B\*, b, b\*, n, W, W\*)
//! - `text` - Text positioning and showing (Tf, Td, TD, Tm, T\*, Tj, TJ, ', ")
//! - `xobject` - XObjects, shadings, inline images and marked-content points (Do, sh, BI, MP, DP)

mod color;
mod graphics_state;
mod path;
mod text;
mod xobject;

// Each module adds an impl block to Executor, so nothing is re-exported.
