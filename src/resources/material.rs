//! Materials
//!
//! A material pairs a shader pass with its baked property values and the
//! keyword state selecting which variant of the pass to use. Per-draw
//! property overrides are layered on top by the command buffer at bind
//! time ([`PropertyState::apply_override`] semantics).

use std::sync::Arc;

use crate::renderer::keyword::KeywordState;
use crate::renderer::properties::PropertyState;
use crate::renderer::shader::ShaderPass;

#[derive(Clone)]
pub struct Material {
    pub name: String,
    /// Main pass (tagged `RenderOrder=Opaque` or `=Transparent`).
    pub pass: Arc<ShaderPass>,
    /// Depth-only pass; present iff the object draws in the pre-pass.
    pub depth_pass: Option<Arc<ShaderPass>>,
    /// Shadow-caster pass; present iff the object casts shadows.
    pub shadow_pass: Option<Arc<ShaderPass>>,
    pub properties: PropertyState,
    pub keywords: KeywordState,
}

impl Material {
    #[must_use]
    pub fn new(name: &str, pass: Arc<ShaderPass>) -> Self {
        Self {
            name: name.to_string(),
            pass,
            depth_pass: None,
            shadow_pass: None,
            properties: PropertyState::new(),
            keywords: KeywordState::new(),
        }
    }

    /// Enables a keyword, switching which variant this material draws with.
    pub fn enable_keyword(&mut self, key: &str, value: &str) {
        self.keywords.set_key(key, value);
    }

    pub fn disable_keyword(&mut self, key: &str) {
        self.keywords.remove(key);
    }
}
