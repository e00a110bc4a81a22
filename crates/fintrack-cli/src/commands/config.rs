//! Config command implementation

use std::path::Path;

use anyhow::Result;
use fintrack_core::config::default_config_path;
use fintrack_core::prompts::default_prompts_dir;
use fintrack_core::NarrativeConfig;

pub fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let config = NarrativeConfig::load(config_path)?;
    print!("{}", render_config(&config, config_path));
    Ok(())
}

/// Effective configuration, with the API key masked
pub fn render_config(config: &NarrativeConfig, config_path: Option<&Path>) -> String {
    let source = config_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .filter(|p| p.exists())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(built-in defaults)".to_string());

    let status = match config.credential() {
        Some(_) => "enabled".to_string(),
        None if config.is_placeholder() => {
            "disabled (placeholder API key, rule-based insights only)".to_string()
        }
        None => "disabled (no API key, rule-based insights only)".to_string(),
    };

    let prompts = default_prompts_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unavailable)".to_string());

    let mut out = String::new();
    out.push('\n');
    out.push_str("⚙️  Narrative Configuration\n");
    out.push_str("   ─────────────────────────────────────────────\n");
    out.push_str(&format!("   Config file:     {}\n", source));
    out.push_str(&format!("   Host:            {}\n", config.host));
    out.push_str(&format!("   Model:           {}\n", config.model));
    out.push_str(&format!("   Max tokens:      {}\n", config.max_tokens));
    out.push_str(&format!("   Temperature:     {}\n", config.temperature));
    out.push_str(&format!("   Timeout:         {}s\n", config.timeout.as_secs_f32()));
    out.push_str(&format!("   API key:         {}\n", config.masked_api_key()));
    out.push_str(&format!("   Remote insights: {}\n", status));
    out.push_str(&format!("   Prompt overrides: {}\n", prompts));
    out.push('\n');
    out
}
