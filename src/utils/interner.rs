//! Global String Interner
//!
//! Converts strings into compact integer [`Symbol`]s for fast comparison
//! and hashing. Property names and shader keywords are interned once and
//! compared as integers on every hot-path lookup afterwards.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

/// Global interner instance.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// A compact integer identifier for an interned string.
pub type Symbol = Spur;

/// Interns a string, returning its [`Symbol`].
///
/// Returns the existing symbol when the string was interned before.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up the [`Symbol`] of an already-interned string.
///
/// Returns `None` without allocating when the string was never interned —
/// which also means no property or keyword under that name can exist.
#[inline]
#[must_use]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a [`Symbol`] back to its string.
#[inline]
#[must_use]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

/// Pre-interns keyword and property names used by the built-in passes so
/// the first frame does not pay interning costs on the hot path.
pub fn preload_common_names() {
    let common = [
        // Backend capability keywords
        "UV_ORIGIN_TOP_LEFT",
        "DEPTH_ZERO_TO_ONE",
        "CLIP_Y_INVERTED",
        // Pass tags
        "RenderOrder",
        "Opaque",
        "Transparent",
        "DepthOnly",
        "ShadowCaster",
        // Global uniform names
        "prowl_MatV",
        "prowl_MatP",
        "prowl_MatVP",
        "prowl_MatInvV",
        "prowl_MatInvP",
        "prowl_PrevMatVP",
        "prowl_Time",
        "prowl_Resolution",
        "prowl_FogParams",
        "prowl_AmbientColor",
        "prowl_CameraPosition",
        "prowl_DepthTexture",
        "prowl_ShadowAtlas",
        // Common values
        "1",
        "true",
    ];

    for name in common {
        intern(name);
    }
}
