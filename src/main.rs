use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use fdie::config::EditorConfig;
use fdie::data::LoaderRegistry;
use fdie::display::{self, DisplayMapping};
use fdie::test_image::{self, Pattern};
use fdie::{EditSession, Geometry, MaskMode};

#[derive(Parser, Debug)]
#[command(
    name = "fdie",
    about = "Edit a grayscale image by masking its Fourier spectrum"
)]
struct Cli {
    /// Image to edit (PNG, JPEG, BMP, TIFF, WebP or 2D .npy)
    #[arg(required_unless_present = "pattern", conflicts_with = "pattern")]
    input: Option<PathBuf>,
    /// Use a generated test image instead of an input file
    #[arg(long, value_enum)]
    pattern: Option<PatternArg>,
    /// Edge length of the generated test image
    #[arg(long, default_value_t = fdie::constants::DEFAULT_TEST_SIZE)]
    size: usize,
    /// Where to write the reconstructed image
    #[arg(short, long, default_value = "fdie-output.png")]
    output: PathBuf,
    /// Also write the masked log-magnitude spectrum here
    #[arg(long)]
    spectrum_output: Option<PathBuf>,
    /// Path to a JSON configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Mask mode; overrides the configured default
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Rectangle mask as x1,y1,x2,y2 (repeatable)
    #[arg(long, value_parser = parse_rect)]
    rect: Vec<Geometry>,
    /// Circle mask as cx,cy,r (repeatable)
    #[arg(long, value_parser = parse_circle)]
    circle: Vec<Geometry>,
    /// Free-draw cell as row,col; all points form a single mask
    #[arg(long, value_parser = parse_point)]
    point: Vec<(i64, i64)>,
    /// Mask intensity in [0, 2]; overrides the configured default
    #[arg(long)]
    intensity: Option<f64>,
    /// How to map the reconstruction to 8-bit; overrides the configured default
    #[arg(long, value_enum)]
    display: Option<DisplayArg>,
}

#[derive(Clone, Debug, ValueEnum)]
enum PatternArg {
    Impulse,
    Gradient,
    Checkerboard,
    Grating,
    Rings,
}

impl From<PatternArg> for Pattern {
    fn from(value: PatternArg) -> Self {
        match value {
            PatternArg::Impulse => Pattern::Impulse,
            PatternArg::Gradient => Pattern::Gradient,
            PatternArg::Checkerboard => Pattern::Checkerboard,
            PatternArg::Grating => Pattern::Grating,
            PatternArg::Rings => Pattern::Rings,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
enum ModeArg {
    Attenuate,
    Isolate,
}

impl From<ModeArg> for MaskMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Attenuate => MaskMode::Attenuate,
            ModeArg::Isolate => MaskMode::Isolate,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
enum DisplayArg {
    Normalize,
    Clip,
}

impl From<DisplayArg> for DisplayMapping {
    fn from(value: DisplayArg) -> Self {
        match value {
            DisplayArg::Normalize => DisplayMapping::Normalize,
            DisplayArg::Clip => DisplayMapping::Clip,
        }
    }
}

fn parse_ints<const N: usize>(value: &str) -> Result<[i64; N], String> {
    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<i64>().map_err(|e| format!("{:?}: {}", p, e)))
        .collect::<Result<Vec<_>, _>>()?;
    parts.try_into().map_err(|parts: Vec<i64>| {
        format!("expected {} comma-separated integers, got {}", N, parts.len())
    })
}

fn parse_rect(value: &str) -> Result<Geometry, String> {
    let [x1, y1, x2, y2] = parse_ints(value)?;
    Ok(Geometry::rectangle(x1, y1, x2, y2))
}

fn parse_circle(value: &str) -> Result<Geometry, String> {
    let [cx, cy, radius] = parse_ints(value)?;
    Ok(Geometry::circle(cx, cy, radius))
}

fn parse_point(value: &str) -> Result<(i64, i64), String> {
    let [row, col] = parse_ints(value)?;
    Ok((row, col))
}

/// Read the optional config at `path`, falling back to defaults.
///
/// Runs before the logger exists, so a failure is returned as a message for
/// the caller to print instead of being logged.
fn read_fallback_config(path: Option<&Path>) -> (EditorConfig, Option<String>) {
    match path {
        Some(path) if path.exists() => match EditorConfig::load_from_path(path) {
            Ok(config) => (config, None),
            Err(e) => (
                EditorConfig::default(),
                Some(format!("ignoring config file {}: {}", path.display(), e)),
            ),
        },
        _ => (EditorConfig::default(), None),
    }
}

fn load_config(cli: &Cli) -> Result<EditorConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::load_from_path(path)?,
        None => {
            let default_path = EditorConfig::default_path();
            let (config, warning) = read_fallback_config(default_path.as_deref());
            if let Some(warning) = warning {
                eprintln!("warning: {}", warning);
            }
            config
        }
    };
    if let Some(mode) = cli.mode.clone() {
        config.default_mode = mode.into();
    }
    if let Some(intensity) = cli.intensity {
        config.default_intensity = intensity;
    }
    if let Some(mapping) = cli.display.clone() {
        config.display = mapping.into();
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();
    log::debug!("Using configuration: {:?}", config);

    let image = match (&cli.input, cli.pattern.clone()) {
        (Some(path), _) => LoaderRegistry::new().load_path(path)?,
        (None, Some(pattern)) => {
            let pattern = Pattern::from(pattern);
            log::info!(
                "Generating {} test image ({}x{})",
                pattern.name(),
                cli.size,
                cli.size
            );
            test_image::generate(pattern, cli.size, cli.size)
        }
        (None, None) => return Err("either an input file or --pattern is required".into()),
    };

    let mut session = EditSession::new().with_default_intensity(config.effective_intensity());
    session.set_active_mode(config.default_mode);
    session.load(image.view())?;

    let mut shapes: Vec<Geometry> = cli.rect.iter().chain(&cli.circle).cloned().collect();
    if !cli.point.is_empty() {
        shapes.push(Geometry::freeform(cli.point.iter().copied()));
    }
    for geometry in shapes {
        let id = session.add_mask(geometry)?;
        if let Some(mask) = session.mask(id) {
            log::info!("Mask {}: {}", id, mask.label());
        }
    }

    let reconstruction = session.current_reconstruction()?;
    display::save_gray(config.display.apply(reconstruction.view()).view(), &cli.output)?;
    eprintln!("wrote reconstruction to {}", cli.output.display());

    if let Some(path) = &cli.spectrum_output {
        let spectrum = session.masked_spectrum_display()?;
        display::save_gray(display::normalize_for_display(spectrum.view()).view(), path)?;
        eprintln!("wrote masked spectrum to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shapes() {
        assert_eq!(parse_rect("6, 5,2,1").unwrap(), Geometry::rectangle(2, 1, 6, 5));
        assert_eq!(parse_circle("4,4,-2").unwrap(), Geometry::circle(4, 4, 2));
        assert_eq!(parse_point("3,7").unwrap(), (3, 7));
        assert!(parse_circle("1,2").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_broken_default_config_is_reported() {
        let dir = std::env::temp_dir().join(format!("fdie-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(EditorConfig::default_filename());
        std::fs::write(&path, "{ not json").unwrap();

        let (config, warning) = read_fallback_config(Some(&path));
        assert_eq!(config, EditorConfig::default());
        assert!(warning.unwrap().contains("Failed to parse configuration"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_default_config_is_silent() {
        let (config, warning) = read_fallback_config(Some(Path::new("/no/such/fdie.json")));
        assert_eq!(config, EditorConfig::default());
        assert!(warning.is_none());

        let (_, warning) = read_fallback_config(None);
        assert!(warning.is_none());
    }
}
