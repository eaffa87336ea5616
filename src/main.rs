mod convert;
mod error;
mod jsx;
mod parser;
mod serialiser;
mod srt;
mod style;

use crate::convert::{ConvertOpts, Destination, Source};
use crate::parser::ParseOpts;
use crate::serialiser::ScriptOpts;
use crate::srt::LineJoin;
use crate::style::{Color, DropShadow, LineBreak, Preset, Stroke};

use anyhow::Result;
use chrono::Local;
use clap::Parser as ClapParser;
use log::{debug, error, info, LevelFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => (),
        Err(err) => {
            error!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                error!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Convert SRT subtitles into an After Effects caption script")]
struct Cli {
    #[arg(
        value_name = "INPUT",
        help = "The SRT file to read, or '-' to read from standard input."
    )]
    input: String,
    #[arg(
        value_name = "OUTPUT",
        help = "The script to write, or '-' for standard output. Defaults to <input>_ae_import.jsx next to the input."
    )]
    output: Option<String>,
    #[arg(long, value_enum, default_value = "outlined", help = "Style preset.")]
    preset: Preset,
    #[arg(long, default_value = "Captions", help = "Name of the created composition.")]
    comp_name: String,
    #[arg(long, default_value_t = 1920, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,
    #[arg(long, default_value_t = 1080, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,
    #[arg(long, default_value_t = 30.0, value_parser = positive)]
    fps: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        value_parser = non_negative,
        help = "Seconds appended to the composition after the last caption."
    )]
    padding: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Distance between the captions and the bottom edge, in pixels."
    )]
    bottom_margin: f64,
    #[arg(long, help = "Font family, overriding the preset.")]
    font: Option<String>,
    #[arg(long, value_parser = positive, help = "Font size, overriding the preset.")]
    font_size: Option<f64>,
    #[arg(long, value_name = "COLOR", help = "Text color as #RRGGBB, 'white' or 'black'.")]
    text_color: Option<Color>,
    #[arg(long, value_name = "COLOR", help = "Stroke color; enables the stroke.")]
    stroke_color: Option<Color>,
    #[arg(long, value_parser = positive, help = "Stroke width; enables the stroke.")]
    stroke_width: Option<f64>,
    #[arg(long, conflicts_with_all = ["stroke_color", "stroke_width"], help = "Disable the text stroke.")]
    no_stroke: bool,
    #[arg(long, help = "Add a drop shadow to every caption.")]
    drop_shadow: bool,
    #[arg(long, help = "Join multi-line captions into a single line.")]
    join_lines: bool,
    #[arg(long, value_enum, help = "Escape used for line breaks inside captions.")]
    line_break: Option<LineBreak>,
    #[arg(long, value_name = "BYTES", help = "Refuse inputs larger than this.")]
    max_input_size: Option<usize>,
    #[arg(long, help = "Leave out the generation time comment.")]
    no_timestamp: bool,
    #[arg(short, long, conflicts_with = "quiet", help = "Log debugging output.")]
    verbose: bool,
    #[arg(short, long, help = "Only log warnings and errors.")]
    quiet: bool,
}

fn positive(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{}` isn't a number", s))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("`{}` must be greater than zero", s))
    }
}

fn non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{}` isn't a number", s))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("`{}` must not be negative", s))
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn script_opts(cli: &Cli) -> ScriptOpts {
    let mut style = cli.preset.style();
    if let Some(font) = &cli.font {
        style.font = font.clone();
    }
    if let Some(size) = cli.font_size {
        style.font_size = size;
    }
    if let Some(color) = cli.text_color {
        style.color = color;
    }
    if cli.no_stroke {
        style.stroke = None;
    } else if cli.stroke_color.is_some() || cli.stroke_width.is_some() {
        let base = style.stroke.unwrap_or(Stroke {
            color: Color::BLACK,
            width: 3.0,
        });
        style.stroke = Some(Stroke {
            color: cli.stroke_color.unwrap_or(base.color),
            width: cli.stroke_width.unwrap_or(base.width),
        });
    }
    if cli.drop_shadow && style.drop_shadow.is_none() {
        style.drop_shadow = Some(DropShadow::default());
    }
    if cli.join_lines {
        style.line_join = LineJoin::Space;
    }
    if let Some(line_break) = cli.line_break {
        style.line_break = line_break;
    }
    debug!(
        "Style: font '{}' size {} color {}, stroke {}",
        style.font,
        style.font_size,
        style.color,
        style
            .stroke
            .map(|s| format!("{} width {}", s.color, s.width))
            .unwrap_or_else(|| "none".to_string())
    );

    ScriptOpts {
        comp_name: cli.comp_name.clone(),
        width: cli.width,
        height: cli.height,
        fps: cli.fps,
        padding: cli.padding,
        bottom_margin: cli.bottom_margin,
        style,
        generated_at: if cli.no_timestamp {
            None
        } else {
            Some(Local::now())
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let source = Source::from_arg(&cli.input);
    let destination = Destination::resolve(cli.output.as_deref(), &source);

    info!("Converting SRT to After Effects JSX...");
    if let Source::File(path) = &source {
        info!("Input:  {}", path.display());
    }
    if let Destination::File(path) = &destination {
        info!("Output: {}", path.display());
    }

    let opts = ConvertOpts {
        parse: ParseOpts {
            max_input_len: cli.max_input_size,
        },
        script: script_opts(&cli),
    };
    let summary = convert::convert(&source, &destination, &opts)?;

    if summary.skipped > 0 {
        info!(
            "Converted {} captions, skipped {} malformed entries",
            summary.captions, summary.skipped
        );
    } else {
        info!("Converted {} captions", summary.captions);
    }
    if let Destination::File(path) = &destination {
        info!(
            "To use in After Effects: File > Scripts > Run Script File... and select {}",
            path.display()
        );
    }
    Ok(())
}
