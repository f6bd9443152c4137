//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use super::EffectArgs;
use crate::config::Config;
use crate::engine::FfmpegEngine;
use crate::error::{Result, SlowverbError};
use crate::graph;
use crate::naming;
use crate::orchestrator::ProcessingOrchestrator;
use crate::params::{matching_preset, PRESETS};

/// Process one audio file and write the result.
pub async fn process(
    input: &Path,
    effects: &EffectArgs,
    output_dir: Option<&Path>,
    ffmpeg: Option<&Path>,
    timeout_ms: Option<u64>,
) -> Result<()> {
    let params = effects.resolve()?;

    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| SlowverbError::UnsupportedFormat {
            format: input.display().to_string(),
        })?;

    if !naming::is_supported_input(&file_name) {
        return Err(SlowverbError::UnsupportedFormat {
            format: naming::extension(&file_name).unwrap_or_else(|| "(none)".to_string()),
        });
    }

    let mut config = Config::from_env()?;
    if let Some(path) = ffmpeg {
        config = config.with_ffmpeg_path(path);
    }
    if let Some(ms) = timeout_ms {
        config = config.with_execute_timeout((ms > 0).then(|| Duration::from_millis(ms)));
    }

    let engine = FfmpegEngine::new(&config.engine)
        .await
        .map_err(|e| SlowverbError::Config {
            reason: format!("could not prepare the engine: {}", e),
        })?;

    if !engine.is_available().await {
        return Err(SlowverbError::Config {
            reason: format!("ffmpeg not found at '{}'", config.engine.ffmpeg_path.display()),
        });
    }

    info!("Processing {} ({})", input.display(), params);
    let data = tokio::fs::read(input).await?;

    let orchestrator = ProcessingOrchestrator::from_config(&engine, &config);
    let mut last_percent = None;
    let artifact = orchestrator
        .run(data, &file_name, &params, |percent: u8, status: &str| {
            if last_percent != Some(percent) {
                last_percent = Some(percent);
                println!("[{:>3}%] {}", percent, status);
            }
        })
        .await?;

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let path = artifact.write_to_dir(&dir).await?;
    println!("Saved: {} ({} bytes)", path.display(), artifact.len());

    Ok(())
}

/// Print the compiled filter graph.
pub fn show_graph(effects: &EffectArgs, json: bool) -> Result<()> {
    let params = effects.resolve()?;
    let filter_graph = graph::compile(&params);

    if json {
        let value = serde_json::json!({
            "params": params,
            "preset": matching_preset(&params).map(|p| p.id),
            "stages": filter_graph,
            "graph": filter_graph.serialize(),
            "suffix": naming::suffix(&params),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Effects: {}", params);
    if let Some(preset) = matching_preset(&params) {
        println!("Preset:  {} ({})", preset.name, preset.id);
    }
    println!("Graph:   {}", filter_graph);
    println!("Suffix:  {}", naming::suffix(&params));

    Ok(())
}

/// List the built-in presets.
pub fn list_presets(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(PRESETS)?);
        return Ok(());
    }

    println!("{:<18} {:<26} {:>6} {:>6} {:>7}", "ID", "NAME", "TEMPO", "PITCH", "REVERB");
    println!("{:-<67}", "");
    for preset in PRESETS {
        println!(
            "{:<18} {:<26} {:>6.2} {:>+6} {:>6}%",
            preset.id, preset.name, preset.tempo, preset.pitch_semitones, preset.reverb_percent
        );
    }

    Ok(())
}
