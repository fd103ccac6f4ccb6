//! The people to greet, read from `[modules.audience]`.

use pulse::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AudienceConfig {
    pub names: Vec<String>,
}

impl Default for AudienceConfig {
    fn default() -> Self {
        Self {
            names: vec!["world".to_string()],
        }
    }
}

pub struct Audience {
    names: Vec<String>,
}

impl Audience {
    async fn init(ctx: ModuleContext) -> Result<Self, BoxError> {
        let config: AudienceConfig = ctx.get_config()?;
        info!(count = config.names.len(), "Audience assembled");
        Ok(Self {
            names: config.names,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl ModuleInstance for Audience {}

pub fn audience() -> ModuleEntry {
    define_module! {
        name: "audience",
        description: "Names to greet.",
        init: Audience::init,
    }
}

register_module!(AUDIENCE = audience);
