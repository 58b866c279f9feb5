//! Entry point for Phong3D.
//! Logging + command-line configuration, then hands over to `platform`.

use std::path::PathBuf;

use anyhow::Result;
use platform::RunConfig;

fn parse_backend_arg(args: &[String]) -> wgpu::Backends {
    // Accept: --gpu-backend=auto|vulkan|dx12|metal|gl
    let mut backends = wgpu::Backends::all(); // default = auto
    for arg in args {
        if let Some(val) = arg.strip_prefix("--gpu-backend=") {
            backends = match val.to_ascii_lowercase().as_str() {
                "auto" => wgpu::Backends::all(),
                "vulkan" | "vk" => wgpu::Backends::VULKAN,
                "dx12" | "d3d12" => wgpu::Backends::DX12,
                "metal" | "mtl" => wgpu::Backends::METAL,
                "gl" | "opengl" | "gles" => wgpu::Backends::GL,
                other => {
                    log::warn!("Unknown backend '{}', falling back to auto.", other);
                    wgpu::Backends::all()
                }
            };
        }
    }
    backends
}

fn parse_switch(args: &[String], name: &str) -> bool {
    // --name[=on|off], off by default
    for arg in args {
        if arg == name {
            return true;
        }
        if let Some(val) = arg.strip_prefix(name).and_then(|v| v.strip_prefix('=')) {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn parse_size_args(args: &[String]) -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let defaults = RunConfig::default();
    let ww = w.unwrap_or(defaults.width).max(1);
    let hh = h.unwrap_or(defaults.height).max(1);
    (ww, hh)
}

fn parse_path_arg(args: &[String], prefix: &str) -> Option<PathBuf> {
    args.iter()
        .rev()
        .find_map(|arg| arg.strip_prefix(prefix))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn parse_config(args: &[String]) -> RunConfig {
    let defaults = RunConfig::default();
    let (width, height) = parse_size_args(args);
    RunConfig {
        backends: parse_backend_arg(args),
        show_fps: parse_switch(args, "--show-fps"),
        width,
        height,
        assets_dir: parse_path_arg(args, "--assets=").unwrap_or(defaults.assets_dir),
        model: parse_path_arg(args, "--model="),
        flip_uvs: parse_switch(args, "--flip-uvs"),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_config(&args);
    log::info!(
        "Starting Phong3D. Backend: {:?}, show_fps={}, window_size={}x{}, assets={:?}, model={:?}",
        config.backends,
        config.show_fps,
        config.width,
        config.height,
        config.assets_dir,
        config.model
    );

    platform::run_with_renderer(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
