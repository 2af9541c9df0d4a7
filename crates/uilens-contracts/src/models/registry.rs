use indexmap::IndexMap;

pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub provider: String,
    pub capabilities: Vec<String>,
    pub max_output_tokens: u32,
}

impl ModelSpec {
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|item| item == capability)
    }
}

/// Known generative models, in preference order. The first model supporting
/// a capability is its default.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name.trim().trim_start_matches("models/"))
    }

    pub fn by_capability(&self, capability: &str) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| model.supports(capability))
            .cloned()
            .collect()
    }

    pub fn ensure(&self, name: &str, capability: &str) -> Option<ModelSpec> {
        let model = self.get(name)?;
        if model.supports(capability) {
            return Some(model.clone());
        }
        None
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    let mut insert = |name: &str, capabilities: &[&str], max_output_tokens: u32| {
        map.insert(
            name.to_string(),
            ModelSpec {
                name: name.to_string(),
                provider: "gemini".to_string(),
                capabilities: capabilities
                    .iter()
                    .map(|item| (*item).to_string())
                    .collect(),
                max_output_tokens,
            },
        );
    };

    insert(DEFAULT_VISION_MODEL, &["vision", "text"], 8192);
    insert("gemini-2.5-pro", &["vision", "text"], 8192);
    insert("gemini-2.0-flash", &["vision", "text"], 8192);
    insert("gemini-2.0-flash-lite", &["text"], 8192);

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_prefers_flash_for_vision() {
        let registry = ModelRegistry::default();
        let vision = registry.by_capability("vision");
        assert_eq!(vision[0].name, DEFAULT_VISION_MODEL);
        assert!(vision.iter().all(|model| model.provider == "gemini"));
    }

    #[test]
    fn get_accepts_models_prefix() {
        let registry = ModelRegistry::default();
        assert!(registry.get("models/gemini-2.5-pro").is_some());
        assert!(registry.ensure("gemini-2.0-flash-lite", "vision").is_none());
    }
}
