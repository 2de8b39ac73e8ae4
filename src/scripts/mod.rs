//! Step scripts as configuration data.
//!
//! Each [`StepId`] maps to a shell template. The built-in set installs a
//! MySQL Cluster tarball; any step can be replaced from the `[scripts]`
//! table of the run configuration. Templates are expanded with a
//! [`ScriptContext`] right before they are sent to a node.

mod builtin;
mod context;
mod step;


use anyhow::{bail, Result};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

pub use context::{find_references, sql_escape, ScriptContext, KNOWN_VARIABLES};
pub use step::StepId;

/// Template text for every step
#[derive(Debug, Clone)]
pub struct ScriptCatalog {
    templates: HashMap<StepId, String>,
}

impl Default for ScriptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScriptCatalog {
    /// Catalog of the built-in templates
    pub fn builtin() -> Self {
        let templates = StepId::all()
            .iter()
            .map(|&step| (step, builtin::template(step).to_string()))
            .collect();
        Self { templates }
    }

    /// Built-in catalog with some steps replaced.
    ///
    /// Keys are step names such as `fetch_package`. An unknown step name is
    /// an error. `${...}` references that are not orchestrator variables are
    /// allowed, since the remote shell may define them, but are logged.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self> {
        let mut catalog = Self::builtin();

        for (name, template) in overrides {
            let step: StepId = match name.parse() {
                Ok(step) => step,
                Err(e) => bail!("Invalid [scripts] entry: {e}"),
            };

            if template.trim().is_empty() {
                bail!("Script override for '{name}' is empty");
            }

            for reference in find_references(template) {
                if !KNOWN_VARIABLES.contains(&reference.as_str()) {
                    warn!(
                        step = name.as_str(),
                        variable = reference.as_str(),
                        "script override references a variable the orchestrator does not set"
                    );
                }
            }

            debug!(step = name.as_str(), "using script override");
            catalog.templates.insert(step, template.clone());
        }

        Ok(catalog)
    }

    pub fn template(&self, step: StepId) -> &str {
        self.templates
            .get(&step)
            .map(String::as_str)
            .unwrap_or_else(|| builtin::template(step))
    }

    /// Expand the template for `step` with `context`
    pub fn render(&self, step: StepId, context: &ScriptContext) -> String {
        context.expand(self.template(step))
    }
}
