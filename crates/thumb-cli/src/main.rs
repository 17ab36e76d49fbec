//! Thumbnail Studio CLI
//!
//! Renders a thumbnail headlessly: builds an editing session from a
//! template and command-line arguments, then writes the PNG export.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use thumb_core::template::{GALLERY, NAMED_TEMPLATES};
use thumb_core::{ElementId, IconKey, ShapeKind, parse_background_value};
use thumb_editor::{EditorConfig, EditorSession};
use thumb_render::FontBook;

#[derive(Parser, Debug)]
#[command(name = "thumb-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render video thumbnails without a browser", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a thumbnail to a PNG file
    Render(RenderArgs),

    /// List the template gallery and URL template keys
    Templates,

    /// List icon and shape keys
    Elements,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Output PNG path
    #[arg(short, long)]
    out: PathBuf,

    /// Viewport width the frame is fitted to (1280 gives a full-size frame)
    #[arg(long, default_value_t = 1280.0)]
    viewport_width: f32,

    /// Template key or gallery name
    #[arg(short, long, conflicts_with = "background")]
    template: Option<String>,

    /// CSS background: a color or a `linear-gradient(...)`
    #[arg(short, long)]
    background: Option<String>,

    /// Background image file, drawn to cover the frame
    #[arg(long)]
    background_image: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    subtitle: Option<String>,

    /// Add a text element (repeatable)
    #[arg(long = "text")]
    texts: Vec<String>,

    /// Add an image element from a file (repeatable)
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Add a shape by key, e.g. `rectangle` (repeatable)
    #[arg(long = "shape")]
    shapes: Vec<String>,

    /// Add an icon by key, e.g. `fa-heart` (repeatable)
    #[arg(long = "icon")]
    icons: Vec<String>,

    /// Font file used for all text; system fonts only fill missing glyphs
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Commands::Render(args) => {
            let out = args.out.clone();
            let session = build_session(&args)?;
            let exported = session.export().context("export failed")?;
            fs::write(&out, &exported.bytes)
                .with_context(|| format!("writing {}", out.display()))?;
            println!(
                "{} ({}x{}, {} bytes)",
                out.display(),
                exported.width,
                exported.height,
                exported.bytes.len()
            );
        }
        Commands::Templates => {
            for t in NAMED_TEMPLATES.iter() {
                println!("{:<20} {}", t.key, t.background);
            }
            for t in GALLERY.iter() {
                println!("{:<20} {}", t.name, t.background);
            }
        }
        Commands::Elements => {
            for shape in ShapeKind::ALL {
                println!("shape  {:<16} {}", shape.key(), shape.label());
            }
            for icon in IconKey::all() {
                println!("icon   {:<16} {}", icon.key(), icon.emoji());
            }
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Apply the arguments in page order: template or background first (a
/// template clears the scene), then text, then added elements.
fn build_session(args: &RenderArgs) -> Result<EditorSession> {
    let config = EditorConfig::default();
    let mut session = match &args.font {
        Some(path) => {
            let fonts = FontBook::from_font_data(read(path)?)
                .with_context(|| format!("font {}", path.display()))?
                .with_fallbacks(FontBook::system(&config.font_family));
            EditorSession::new(config, fonts)
        }
        None => EditorSession::with_system_fonts(config),
    };
    session.initialize(args.viewport_width);

    if let Some(key) = &args.template
        && !session.apply_template_key(key)?
    {
        bail!("unknown template {key:?}; see `thumb-cli templates`");
    }
    if let Some(css) = &args.background {
        let background =
            parse_background_value(css).with_context(|| format!("background {css:?}"))?;
        session.set_background(background);
    }
    if let Some(path) = &args.background_image {
        session
            .set_background_image_bytes(&read(path)?)
            .with_context(|| format!("background image {}", path.display()))?;
    }

    if let Some(title) = &args.title {
        session.set_text_content(ElementId::title(), title);
    }
    if let Some(subtitle) = &args.subtitle {
        session.set_text_content(ElementId::subtitle(), subtitle);
    }

    for text in &args.texts {
        let id = session.add_text();
        session.set_text_content(id, text);
    }
    for key in &args.shapes {
        let Some(shape) = ShapeKind::from_key(key) else {
            bail!("unknown shape {key:?}; see `thumb-cli elements`");
        };
        session.add_shape(shape);
    }
    for key in &args.icons {
        session.add_icon(IconKey::resolve(key));
    }
    for path in &args.images {
        session
            .add_image_bytes(&read(path)?)
            .with_context(|| format!("image {}", path.display()))?;
    }

    session.select(None);
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use thumb_core::{Background, ElementKind};

    fn args(extra: &[&str]) -> RenderArgs {
        let argv = ["thumb-cli", "render", "--out", "out.png"]
            .into_iter()
            .chain(extra.iter().copied());
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Render(args) => args,
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn template_and_background_conflict() {
        let argv = [
            "thumb-cli",
            "render",
            "--out",
            "a.png",
            "--template",
            "bold-red",
            "--background",
            "#000",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn repeated_elements_collect() {
        let a = args(&["--text", "one", "--text", "two", "--shape", "circle"]);
        assert_eq!(a.texts, vec!["one", "two"]);
        assert_eq!(a.shapes, vec!["circle"]);
        assert_eq!(a.viewport_width, 1280.0);
    }

    #[test]
    fn session_follows_arguments() {
        let a = args(&[
            "--template",
            "dark-professional",
            "--title",
            "Big News",
            "--text",
            "extra",
            "--shape",
            "oval",
        ]);
        let session = build_session(&a).unwrap();
        let scene = session.scene();
        assert_eq!(scene.title().as_text().unwrap().content, "Big News");
        assert_eq!(scene.free_ids().len(), 2);
        assert_eq!(scene.selected(), None);
        assert!(matches!(scene.background(), Background::Gradient(_)));
        assert!(scene.free_ids().iter().any(|id| matches!(
            scene.get(*id).map(|el| &el.kind),
            Some(ElementKind::Shape(_))
        )));
    }

    #[test]
    fn unreadable_font_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("thumb-cli-font-{}.ttf", std::process::id()));
        fs::write(&path, b"definitely not a font").unwrap();
        let a = args(&["--font", path.to_str().unwrap()]);
        let err = build_session(&a).err().expect("expected an error");
        fs::remove_file(&path).unwrap();
        assert!(format!("{err:#}").contains("font unavailable"));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let a = args(&["--template", "no-such-template"]);
        assert!(build_session(&a).is_err());
    }
}
