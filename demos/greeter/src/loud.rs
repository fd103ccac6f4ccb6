//! Optional style module: shouts.

use pulse::prelude::*;

pub struct Loud;

impl Loud {
    pub fn apply(&self, line: &str) -> String {
        format!("{}!", line.to_uppercase())
    }
}

impl ModuleInstance for Loud {}

pub fn loud() -> ModuleEntry {
    define_module! {
        name: "loud",
        description: "Uppercases greetings.",
        init: |_ctx: ModuleContext| async { Ok::<_, BoxError>(Loud) },
    }
}

register_module!(LOUD = loud);
