//! Greets everyone in the audience when activated.

use async_trait::async_trait;
use pulse::prelude::*;
use serde::Deserialize;

use crate::audience::Audience;
use crate::loud::Loud;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GreeterConfig {
    pub greeting: String,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello".to_string(),
        }
    }
}

pub struct Greeter {
    lines: Vec<String>,
}

impl Greeter {
    async fn init(ctx: ModuleContext) -> Result<Self, BoxError> {
        let config: GreeterConfig = ctx.get_config()?;
        let audience = ctx
            .module_as::<Audience>("audience")
            .ok_or("audience module is not active")?;
        let loud = ctx.module_as::<Loud>("loud");

        let lines: Vec<String> = audience
            .names()
            .iter()
            .map(|name| {
                let line = format!("{}, {name}", config.greeting);
                match &loud {
                    Some(loud) => loud.apply(&line),
                    None => line,
                }
            })
            .collect();

        for line in &lines {
            info!("{line}");
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[async_trait]
impl ModuleInstance for Greeter {
    async fn on_unload(&self) {
        info!(greeted = self.lines.len(), "Goodbye");
    }
}

pub fn greeter() -> ModuleEntry {
    define_module! {
        name: "greeter",
        description: "Greets the audience.",
        requires: ["audience"],
        optional: ["loud"],
        init: Greeter::init,
    }
}

register_module!(GREETER = greeter);
