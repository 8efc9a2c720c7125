//! Render a prompt template for inspection.

use anyhow::Result;
use storefront_site::{Bindings, PromptRegistry};

/// Run the prompt command.
pub fn run(name: &str, set: &[String]) -> Result<()> {
    let registry = PromptRegistry::new();
    let bindings = parse_bindings(set)?;

    let prompt = registry.render(name, &bindings).map_err(|e| {
        anyhow::anyhow!("{} (available: {})", e, registry.names().join(", "))
    })?;

    if let Some(template) = registry.get(name) {
        tracing::debug!("System instruction: {}", template.system_prompt);
    }
    print!("{}", prompt);

    Ok(())
}

fn parse_bindings(set: &[String]) -> Result<Bindings> {
    set.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.trim().to_string(), value.to_string()))
                .ok_or_else(|| anyhow::anyhow!("Expected KEY=VALUE, got '{}'", pair))
        })
        .collect()
}
