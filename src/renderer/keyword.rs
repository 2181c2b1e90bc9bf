//! Shader Keyword System
//!
//! A [`KeywordState`] is a set of `KEY=VALUE` defines selecting one shader
//! variant out of a pass's permutation space. Keys and values are interned
//! [`Symbol`]s stored in a sorted vector, so two states holding the same
//! pairs are equal and hash identically no matter the insertion order.
//!
//! # Usage
//!
//! ```rust
//! use prowl::renderer::keyword::KeywordState;
//!
//! let mut keywords = KeywordState::new();
//! keywords.set_key("HAS_NORMAL_MAP", "1");
//! keywords.set_key("MAX_LIGHTS", "8");
//!
//! // Stable hash for pipeline cache lookup
//! let hash = keywords.variant_hash();
//! # let _ = hash;
//! ```
//!
//! # Backend defaults
//!
//! [`KeywordState::for_backend`] derives the capability keywords that
//! paper over backend conventions (UV origin, clip depth range, clip-space
//! Y direction) so variants can be written once and specialized per API.

use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::Xxh3;

use crate::utils::interner::{self, Symbol};

/// Per-backend default keyword states, derived once on first request.
///
/// The map is read-mostly after startup; the write lock is only taken
/// on the first lookup per backend.
static BACKEND_DEFAULTS: LazyLock<RwLock<FxHashMap<wgpu::Backend, KeywordState>>> =
    LazyLock::new(|| RwLock::new(FxHashMap::default()));

/// An ordered set of shader keyword defines.
///
/// Internally a `Vec<(Symbol, Symbol)>` kept sorted by key symbol, which
/// makes equality, hashing, and variant lookup insertion-order independent
/// by construction.
#[derive(Debug, Clone, Default)]
pub struct KeywordState {
    pairs: Vec<(Symbol, Symbol)>,
}

impl KeywordState {
    /// Creates an empty keyword state.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Creates a keyword state with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
        }
    }

    /// Derives the capability keywords for a graphics backend.
    ///
    /// These exist so shader variants can normalize the differences
    /// between the GL conventions (UV origin bottom-left, -1..1 clip
    /// depth) and the Vulkan/Metal/D3D family. Re-derivable at startup
    /// for whichever backend the device was created on.
    #[must_use]
    pub fn for_backend(backend: wgpu::Backend) -> Self {
        let mut state = Self::with_capacity(3);
        let is_gl = backend == wgpu::Backend::Gl;
        state.set_key("UV_ORIGIN_TOP_LEFT", if is_gl { "0" } else { "1" });
        state.set_key("DEPTH_ZERO_TO_ONE", if is_gl { "0" } else { "1" });
        state.set_key(
            "CLIP_Y_INVERTED",
            if backend == wgpu::Backend::Vulkan { "1" } else { "0" },
        );
        state
    }

    /// Cached per-backend default state (see [`Self::for_backend`]).
    #[must_use]
    pub fn default_for(backend: wgpu::Backend) -> KeywordState {
        if let Some(state) = BACKEND_DEFAULTS.read().get(&backend) {
            return state.clone();
        }
        let state = Self::for_backend(backend);
        BACKEND_DEFAULTS.write().insert(backend, state.clone());
        state
    }

    /// Upserts a keyword (maintains sorted order).
    pub fn set_key(&mut self, key: &str, value: &str) {
        let key_sym = interner::intern(key);
        let value_sym = interner::intern(value);
        self.set_symbol(key_sym, value_sym);
    }

    /// Upserts a keyword by pre-interned symbols.
    #[inline]
    pub fn set_symbol(&mut self, key: Symbol, value: Symbol) {
        match self.pairs.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(idx) => self.pairs[idx].1 = value,
            Err(idx) => self.pairs.insert(idx, (key, value)),
        }
    }

    /// Looks up a keyword, falling back to `default` when absent.
    #[must_use]
    pub fn get_key<'a>(&self, key: &str, default: &'a str) -> Cow<'a, str> {
        match interner::get(key).and_then(|sym| self.get_symbol(sym)) {
            Some(value) => Cow::Borrowed(interner::resolve(value)),
            None => Cow::Borrowed(default),
        }
    }

    /// Looks up a keyword's value symbol.
    #[inline]
    #[must_use]
    pub fn get_symbol(&self, key: Symbol) -> Option<Symbol> {
        self.pairs
            .binary_search_by_key(&key, |&(k, _)| k)
            .ok()
            .map(|idx| self.pairs[idx].1)
    }

    /// Checks whether a keyword is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        interner::get(key)
            .is_some_and(|sym| self.pairs.binary_search_by_key(&sym, |&(k, _)| k).is_ok())
    }

    /// Removes a keyword. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(sym) = interner::get(key) else {
            return false;
        };
        match self.pairs.binary_search_by_key(&sym, |&(k, _)| k) {
            Ok(idx) => {
                self.pairs.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns a new state with `add`'s pairs overlaid on `source`.
    ///
    /// Neither input is mutated; conflicting keys take `add`'s value.
    #[must_use]
    pub fn combine(source: &KeywordState, add: &KeywordState) -> KeywordState {
        let mut result = source.clone();
        for &(key, value) in &add.pairs {
            result.set_symbol(key, value);
        }
        result
    }

    /// Number of defined keywords.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates all pairs as symbols, in sorted key order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &(Symbol, Symbol)> {
        self.pairs.iter()
    }

    /// Iterates all pairs as strings, in sorted key order.
    pub fn iter_strings(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.pairs
            .iter()
            .map(|&(k, v)| (interner::resolve(k), interner::resolve(v)))
    }

    /// Removes every keyword.
    #[inline]
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Content hash used as the variant key in pipeline caching.
    ///
    /// Hashes the resolved strings (not symbol ids) in sorted order, so
    /// the value is stable for a given pair set within a process run and
    /// insertion-order independent.
    #[must_use]
    pub fn variant_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for &(key, value) in &self.pairs {
            hasher.update(interner::resolve(key).as_bytes());
            hasher.update(b"=");
            hasher.update(interner::resolve(value).as_bytes());
            hasher.update(b";");
        }
        hasher.digest()
    }
}

impl Hash for KeywordState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pairs.hash(state);
    }
}

impl PartialEq for KeywordState {
    fn eq(&self, other: &Self) -> bool {
        self.pairs == other.pairs
    }
}

impl Eq for KeywordState {}

impl From<&[(&str, &str)]> for KeywordState {
    fn from(pairs: &[(&str, &str)]) -> Self {
        let mut result = Self::with_capacity(pairs.len());
        for (k, v) in pairs {
            result.set_key(k, v);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut keywords = KeywordState::new();
        keywords.set_key("HAS_MAP", "1");

        assert!(keywords.contains("HAS_MAP"));
        assert_eq!(keywords.get_key("HAS_MAP", "0"), "1");
        assert_eq!(keywords.get_key("HAS_AO_MAP", "0"), "0");
    }

    #[test]
    fn upsert_overwrites() {
        let mut keywords = KeywordState::new();
        keywords.set_key("MAX_LIGHTS", "4");
        keywords.set_key("MAX_LIGHTS", "8");

        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords.get_key("MAX_LIGHTS", ""), "8");
    }

    #[test]
    fn pairs_stay_sorted() {
        let mut keywords = KeywordState::new();
        keywords.set_key("B", "1");
        keywords.set_key("A", "1");
        keywords.set_key("C", "1");

        let symbols: Vec<_> = keywords.iter().map(|&(k, _)| k).collect();
        assert!(
            symbols.windows(2).all(|w| w[0] < w[1]),
            "keys should be sorted by symbol value"
        );
    }
}
