//! Key command: show the environment variable name for schema keys.

use envcraft::resolve_env_key;

pub fn run(names: &[String], prefix: &str) -> anyhow::Result<()> {
    for line in render(names, prefix) {
        println!("{}", line);
    }
    Ok(())
}

pub fn render(names: &[String], prefix: &str) -> Vec<String> {
    names
        .iter()
        .map(|name| format!("{}\t{}", name, resolve_env_key(name, None, prefix)))
        .collect()
}
