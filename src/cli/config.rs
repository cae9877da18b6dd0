use anyhow::Result;
use soulform::LoadedConfig;

pub fn cmd_config(loaded: &LoadedConfig) -> Result<()> {
    let source = if loaded.found { "file" } else { "defaults" };
    println!("# {} ({})", loaded.path.display(), source);
    print!("{}", serde_yaml::to_string(&loaded.config)?);
    Ok(())
}
