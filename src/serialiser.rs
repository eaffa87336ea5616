use crate::jsx;
use crate::srt::{self, CaptionRecord};
use crate::style::Style;

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

#[derive(Debug, Clone)]
pub struct ScriptOpts {
    pub comp_name: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Seconds added after the last cue when sizing the composition.
    pub padding: f64,
    /// Distance between the text anchor and the bottom edge, in pixels.
    pub bottom_margin: f64,
    pub style: Style,
    /// Written as a comment only; never affects the generated statements.
    pub generated_at: Option<DateTime<Local>>,
}

impl Default for ScriptOpts {
    fn default() -> Self {
        Self {
            comp_name: "Captions".to_string(),
            width: 1920,
            height: 1080,
            fps: 30.0,
            padding: 2.0,
            bottom_margin: 100.0,
            style: Style::default(),
            generated_at: None,
        }
    }
}

/// Renders the complete script in memory.
pub fn render(captions: &[CaptionRecord], opts: &ScriptOpts) -> Result<String> {
    let mut buf = Vec::new();
    write_script(&mut buf, captions, opts).context("Failed to render script.")?;
    String::from_utf8(buf).context("Rendered script is not valid UTF-8.")
}

fn write_script<W: Write>(
    buf: &mut W,
    captions: &[CaptionRecord],
    opts: &ScriptOpts,
) -> Result<()> {
    write_header(buf, captions, opts)?;
    write_style(buf, &opts.style)?;
    for (idx, caption) in captions.iter().enumerate() {
        write_caption(buf, idx + 1, caption, opts)?;
    }
    writeln!(buf)?;
    writeln!(buf, "// Alert completion")?;
    writeln!(
        buf,
        "alert(\"Caption import complete! {} text layers created.\");",
        captions.len()
    )?;
    Ok(())
}

fn write_header<W: Write>(
    buf: &mut W,
    captions: &[CaptionRecord],
    opts: &ScriptOpts,
) -> Result<()> {
    writeln!(buf, "// Auto-generated After Effects script from SRT file")?;
    if let Some(generated_at) = opts.generated_at {
        writeln!(
            buf,
            "// Generated on: {}",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;
    }
    writeln!(buf)?;
    writeln!(buf, "// Create new composition")?;
    writeln!(
        buf,
        "var comp = app.project.items.addComp({}, {}, {}, 1, {}, {});",
        jsx::string_literal(&[opts.comp_name.clone()], opts.style.line_break),
        opts.width,
        opts.height,
        jsx::seconds(srt::max_end(captions) + opts.padding),
        jsx::number(opts.fps)
    )?;
    writeln!(buf)?;
    Ok(())
}

fn write_style<W: Write>(buf: &mut W, style: &Style) -> Result<()> {
    writeln!(buf, "// Style settings")?;
    writeln!(buf, "var fontSize = {};", jsx::number(style.font_size))?;
    writeln!(
        buf,
        "var fontFamily = {};",
        jsx::string_literal(&[style.font.clone()], style.line_break)
    )?;
    writeln!(buf, "var textColor = {};", jsx::color(style.color))?;
    if let Some(stroke) = style.stroke {
        writeln!(buf, "var strokeColor = {};", jsx::color(stroke.color))?;
        writeln!(buf, "var strokeWidth = {};", jsx::number(stroke.width))?;
    }
    writeln!(buf)?;
    writeln!(buf, "// Add captions")?;
    Ok(())
}

fn write_caption<W: Write>(
    buf: &mut W,
    n: usize,
    caption: &CaptionRecord,
    opts: &ScriptOpts,
) -> Result<()> {
    let style = &opts.style;
    let text = jsx::string_literal(&caption.lines(style.line_join), style.line_break);

    writeln!(buf)?;
    writeln!(
        buf,
        "// Caption {}: {}",
        n,
        jsx::escape(&caption.sequence_id, style.line_break)
    )?;
    writeln!(buf, "var textLayer{} = comp.layers.addText({});", n, text)?;
    writeln!(
        buf,
        "var textProp{n} = textLayer{n}.property(\"Source Text\");",
        n = n
    )?;
    writeln!(buf, "var textDocument{n} = textProp{n}.value;", n = n)?;
    writeln!(buf, "textDocument{}.fontSize = fontSize;", n)?;
    writeln!(buf, "textDocument{}.font = fontFamily;", n)?;
    writeln!(buf, "textDocument{}.fillColor = textColor;", n)?;
    if style.stroke.is_some() {
        writeln!(buf, "textDocument{}.strokeColor = strokeColor;", n)?;
        writeln!(buf, "textDocument{}.strokeWidth = strokeWidth;", n)?;
        writeln!(buf, "textDocument{}.strokeOverFill = false;", n)?;
        writeln!(buf, "textDocument{}.applyStroke = true;", n)?;
    }
    writeln!(
        buf,
        "textDocument{}.justification = ParagraphJustification.CENTER_JUSTIFY;",
        n
    )?;
    writeln!(buf, "textProp{n}.setValue(textDocument{n});", n = n)?;
    writeln!(buf)?;

    writeln!(buf, "// Position and timing")?;
    let (start, end) = (jsx::seconds(caption.start_secs), jsx::seconds(caption.end_secs));
    writeln!(buf, "textLayer{}.startTime = {};", n, start)?;
    writeln!(buf, "textLayer{}.outPoint = {};", n, end)?;
    writeln!(buf, "textLayer{}.inPoint = {};", n, start)?;
    writeln!(buf)?;

    writeln!(buf, "// Position at bottom center")?;
    writeln!(
        buf,
        "var textPosition{n} = textLayer{n}.property(\"Transform\").property(\"Position\");",
        n = n
    )?;
    writeln!(
        buf,
        "textPosition{}.setValue([{}, {}]);",
        n,
        jsx::number(f64::from(opts.width) / 2.0),
        jsx::number(f64::from(opts.height) - opts.bottom_margin)
    )?;

    if let Some(shadow) = style.drop_shadow {
        writeln!(buf)?;
        writeln!(
            buf,
            "var dropShadow{n} = textLayer{n}.property(\"Effects\").addProperty(\"Drop Shadow\");",
            n = n
        )?;
        for (name, value) in &[
            ("Opacity", shadow.opacity),
            ("Direction", shadow.direction),
            ("Distance", shadow.distance),
            ("Softness", shadow.softness),
        ] {
            writeln!(
                buf,
                "dropShadow{}.property(\"{}\").setValue({});",
                n,
                name,
                jsx::number(*value)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srt::LineJoin;
    use crate::style::{LineBreak, Preset};
    use chrono::TimeZone;

    fn caption(seq: &str, start_secs: f64, end_secs: f64, text: &[&str]) -> CaptionRecord {
        CaptionRecord {
            sequence_id: seq.to_string(),
            start_secs,
            end_secs,
            text: text.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn sample() -> Vec<CaptionRecord> {
        vec![
            caption("1", 1.0, 3.0, &["Hello world"]),
            caption("2", 4.5, 6.0, &["Second line"]),
        ]
    }

    fn comp_duration(script: &str) -> f64 {
        let line = script
            .lines()
            .find(|l| l.starts_with("var comp = "))
            .expect("no composition statement");
        let args: Vec<&str> = line.split(", ").collect();
        args[4].parse().expect("duration is not a number")
    }

    #[test]
    fn emits_one_block_per_caption_in_order() {
        let script = render(&sample(), &ScriptOpts::default()).unwrap();

        assert_eq!(script.matches("comp.layers.addText(").count(), 2);
        let first = script
            .find("var textLayer1 = comp.layers.addText(\"Hello world\");")
            .unwrap();
        let second = script
            .find("var textLayer2 = comp.layers.addText(\"Second line\");")
            .unwrap();
        assert!(first < second);
        assert!(script.contains("textLayer2.startTime = 4.500;"));
        assert!(script.contains("textLayer2.outPoint = 6.000;"));
        assert!(script.contains("textLayer2.inPoint = 4.500;"));
        assert!(script.contains("textPosition1.setValue([960, 980]);"));
    }

    #[test]
    fn composition_covers_last_cue_plus_padding() {
        let script = render(&sample(), &ScriptOpts::default()).unwrap();

        assert!(script.contains(
            "var comp = app.project.items.addComp(\"Captions\", 1920, 1080, 1, 8.000, 30);"
        ));
        assert!(comp_duration(&script) >= 8.0);
    }

    #[test]
    fn ends_with_layer_count_alert() {
        let script = render(&sample(), &ScriptOpts::default()).unwrap();
        assert!(script.ends_with(
            "alert(\"Caption import complete! 2 text layers created.\");\n"
        ));
    }

    #[test]
    fn escapes_quotes_in_captions_and_names() {
        let opts = ScriptOpts {
            comp_name: "My \"Comp\"".to_string(),
            ..ScriptOpts::default()
        };
        let caps = vec![caption("1", 0.0, 1.0, &["He said \"hi\""])];
        let script = render(&caps, &opts).unwrap();

        assert!(script.contains(r#"comp.layers.addText("He said \"hi\"");"#));
        assert!(script.contains(r#"addComp("My \"Comp\"", "#));
    }

    #[test]
    fn line_handling_follows_style() {
        let caps = vec![caption("1", 0.0, 1.0, &["top", "bottom"])];

        let script = render(&caps, &ScriptOpts::default()).unwrap();
        assert!(script.contains(r#"addText("top\nbottom")"#));

        let mut opts = ScriptOpts::default();
        opts.style.line_break = LineBreak::Cr;
        let script = render(&caps, &opts).unwrap();
        assert!(script.contains(r#"addText("top\rbottom")"#));

        opts.style.line_join = LineJoin::Space;
        let script = render(&caps, &opts).unwrap();
        assert!(script.contains(r#"addText("top bottom")"#));
    }

    #[test]
    fn stroke_and_shadow_follow_preset() {
        let outlined = render(&sample(), &ScriptOpts::default()).unwrap();
        assert!(outlined.contains("var fontFamily = \"Arial-BoldMT\";"));
        assert!(outlined.contains("var strokeWidth = 3;"));
        assert!(outlined.contains("textDocument1.applyStroke = true;"));
        assert!(!outlined.contains("Drop Shadow"));

        let opts = ScriptOpts {
            style: Preset::Classic.style(),
            ..ScriptOpts::default()
        };
        let classic = render(&sample(), &opts).unwrap();
        assert!(classic.contains("var fontFamily = \"Arial\";"));
        assert!(!classic.contains("strokeColor"));
        assert!(classic.contains("dropShadow2.property(\"Softness\").setValue(10);"));
    }

    #[test]
    fn rendering_is_deterministic_apart_from_timestamp() {
        let mut opts = ScriptOpts::default();
        let first = render(&sample(), &opts).unwrap();
        let second = render(&sample(), &opts).unwrap();
        assert_eq!(first, second);
        assert!(!first.contains("Generated on:"));

        opts.generated_at = Some(Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
        let stamped = render(&sample(), &opts).unwrap();
        assert!(stamped.contains("// Generated on: 2024-05-01 12:30:00\n"));
        let without_stamp: String = stamped
            .lines()
            .filter(|l| !l.starts_with("// Generated on:"))
            .map(|l| format!("{}\n", l))
            .collect();
        assert_eq!(without_stamp, first);
    }
}
