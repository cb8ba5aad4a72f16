use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::script::ScriptConverter;
use super::AssetStep;

/// Turn scenario text into TyranoScript
pub struct ScriptStep {
    converter: ScriptConverter,
}

impl ScriptStep {
    pub fn new(converter: ScriptConverter) -> Self {
        Self { converter }
    }
}

#[async_trait]
impl AssetStep for ScriptStep {
    fn name(&self) -> &str {
        "text->ks"
    }

    async fn apply(&self, input_path: &Path, dst_dir: &Path, base_name: &str) -> Result<bool> {
        self.converter.convert(input_path, dst_dir, base_name)
    }
}
