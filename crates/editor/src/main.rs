use std::path::PathBuf;

use carve_editor_lib::command::execute_json_batch;
use carve_editor_lib::fixtures;
use carve_editor_lib::harness::TestHarness;
use carve_editor_lib::state::EditorSettings;

struct Args {
    settings: Option<PathBuf>,
    script: Option<PathBuf>,
    save_settings: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        settings: None,
        script: None,
        save_settings: false,
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--settings" if i + 1 < args.len() => {
                parsed.settings = Some(PathBuf::from(&args[i + 1]));
                i += 1;
            }
            "--script" if i + 1 < args.len() => {
                parsed.script = Some(PathBuf::from(&args[i + 1]));
                i += 1;
            }
            "--save-settings" => parsed.save_settings = true,
            other => tracing::warn!("Ignoring argument {other}"),
        }
        i += 1;
    }
    parsed
}

fn load_settings(path: Option<&PathBuf>) -> EditorSettings {
    match path {
        Some(path) => match EditorSettings::load_from(path) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::error!("Failed to load settings from {}: {e}", path.display());
                EditorSettings::default()
            }
        },
        None => EditorSettings::load(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carve_editor=info,carve_editor_lib=info".into()),
        )
        .init();

    let args = parse_args();
    let settings = load_settings(args.settings.as_ref());
    if args.save_settings {
        match settings.save() {
            Ok(()) => tracing::info!("Saved settings"),
            Err(e) => tracing::error!("Failed to save settings: {e}"),
        }
    }

    let script = match &args.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to read script {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => fixtures::demo_script(),
    };

    let mut harness = match TestHarness::with_settings(settings) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to create solid: {e}");
            std::process::exit(1);
        }
    };

    match execute_json_batch(&mut harness, &script) {
        Ok(responses) => {
            let failed = responses.iter().filter(|r| !r.success).count();
            match serde_json::to_string_pretty(&responses) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("Failed to serialize responses: {e}"),
            }
            tracing::info!("{} commands, {failed} failed", responses.len());
        }
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
