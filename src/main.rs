#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use glam::Vec3;
    use log::info;

    use translucent_cubes::{app, build_cube_grid, parse_color, ViewerConfig, WindowInitError};

    /// Render-on-demand viewer for a 2x2x2 grid of translucent cubes.
    #[derive(Parser, Debug)]
    #[command(name = "translucent-cubes", version)]
    pub struct Cli {
        /// Build the scene and print a summary without opening a window.
        #[arg(long)]
        headless: bool,

        /// Print the built scene as JSON (implies --headless).
        #[arg(long)]
        json: bool,

        /// Keep the camera gliding after a drag ends.
        #[arg(long)]
        damping: bool,

        /// Initial window width in logical pixels.
        #[arg(long)]
        width: Option<u32>,

        /// Initial window height in logical pixels.
        #[arg(long)]
        height: Option<u32>,

        /// Opacity of every cube, between 0 and 1.
        #[arg(long)]
        opacity: Option<f32>,

        /// Distance of each cube center from the origin along every axis.
        #[arg(long)]
        spacing: Option<f32>,

        /// Background color: a CSS name or `#rrggbb`.
        #[arg(long, value_parser = parse_background)]
        background: Option<Vec3>,

        /// JSON viewer configuration; flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Log at debug level.
        #[arg(short, long)]
        verbose: bool,
    }

    fn parse_background(value: &str) -> Result<Vec3, String> {
        parse_color(value).map_err(|err| err.to_string())
    }

    impl Cli {
        fn load_config(&self) -> Result<ViewerConfig> {
            let mut config = match &self.config {
                Some(path) => ViewerConfig::from_json_file(path)?,
                None => ViewerConfig::default(),
            };
            if self.damping {
                config.controls.damping = true;
            }
            if let Some(width) = self.width {
                config.window_width = width;
            }
            if let Some(height) = self.height {
                config.window_height = height;
            }
            if let Some(opacity) = self.opacity {
                config.grid.opacity = opacity.clamp(0.0, 1.0);
            }
            if let Some(spacing) = self.spacing {
                config.grid.spacing = spacing;
            }
            if let Some(background) = self.background {
                config.background = background;
            }
            Ok(config)
        }
    }

    pub fn main() {
        let cli = Cli::parse();
        let level = if cli.verbose { "debug" } else { "warn" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

        if let Err(err) = run(&cli) {
            eprintln!("Error: {err:?}");
            std::process::exit(1);
        }
    }

    fn run(cli: &Cli) -> Result<()> {
        let config = cli.load_config()?;
        if cli.headless || cli.json {
            return run_headless(&config, cli.json);
        }

        info!("opening {}x{} window", config.window_width, config.window_height);
        match app::run(config.clone()) {
            Ok(()) => Ok(()),
            Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
                eprintln!(
                    "{err}. Falling back to --headless mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                run_headless(&config, false)
            }
            Err(err) => Err(err),
        }
    }

    fn run_headless(config: &ViewerConfig, json: bool) -> Result<()> {
        let scene = build_cube_grid(config);
        if json {
            let text = serde_json::to_string_pretty(&scene).context("failed to encode scene")?;
            println!("{text}");
        } else {
            for line in scene.summary_lines() {
                println!("{line}");
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn flags_override_defaults() {
            let cli = Cli::parse_from([
                "translucent-cubes",
                "--damping",
                "--opacity",
                "1.5",
                "--spacing",
                "1.2",
                "--background",
                "black",
            ]);
            let config = cli.load_config().unwrap();
            assert!(config.controls.damping);
            assert_eq!(config.grid.opacity, 1.0);
            assert_eq!(config.grid.spacing, 1.2);
            assert_eq!(config.background, Vec3::ZERO);
            assert_eq!(config.window_width, 1280);
        }

        #[test]
        fn rejects_unknown_background() {
            let result = Cli::try_parse_from(["translucent-cubes", "--background", "mauve"]);
            assert!(result.is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    cli::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {}
