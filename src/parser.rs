use crate::error::ConvertError;
use crate::srt::CaptionRecord;

use anyhow::{Context, Result};
use log::debug;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::space0;
use nom::error::VerboseError;
use nom::sequence::delimited;
use nom::IResult;
use regex::Regex;

/// Any run of whitespace holding at least one blank line ends a block.
const BLOCK_SEPARATOR: &str = r"\n\s*\n";

#[derive(Debug, Clone, Default)]
pub struct ParseOpts {
    /// Reject documents longer than this many bytes.
    pub max_input_len: Option<usize>,
}

/// A block that was dropped instead of becoming a caption.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedBlock {
    /// 1-based position of the block in the document.
    pub position: usize,
    pub first_line: String,
    pub error: ConvertError,
}

#[derive(Debug, Default)]
pub struct ParsedSubtitles {
    pub captions: Vec<CaptionRecord>,
    pub skipped: Vec<SkippedBlock>,
}

pub struct Parser {
    separator: Regex,
    opts: ParseOpts,
}

impl Parser {
    pub fn new(opts: ParseOpts) -> Result<Self> {
        let separator = Regex::new(BLOCK_SEPARATOR).context("Invalid block separator regex.")?;
        Ok(Self { separator, opts })
    }

    /// Splits `input` into blocks and parses each one.
    ///
    /// Malformed blocks never fail the whole document; they end up in
    /// `ParsedSubtitles::skipped`. The only error is an oversized input.
    pub fn parse(&self, input: &str) -> Result<ParsedSubtitles> {
        if let Some(max) = self.opts.max_input_len {
            if input.len() > max {
                return Err(ConvertError::InputTooLarge {
                    len: input.len(),
                    max,
                }
                .into());
            }
        }

        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        let normalised = input.replace("\r\n", "\n").replace('\r', "\n");
        let document = normalised.trim();

        let mut parsed = ParsedSubtitles::default();
        if document.is_empty() {
            return Ok(parsed);
        }

        for (idx, block) in self.separator.split(document).enumerate() {
            match parse_block(block) {
                Ok(caption) => parsed.captions.push(caption),
                Err(error) => parsed.skipped.push(SkippedBlock {
                    position: idx + 1,
                    first_line: block.lines().next().unwrap_or("").trim().to_string(),
                    error,
                }),
            }
        }

        debug!(
            "Parsed {} captions, skipped {} blocks",
            parsed.captions.len(),
            parsed.skipped.len()
        );
        Ok(parsed)
    }
}

fn parse_block(block: &str) -> Result<CaptionRecord, ConvertError> {
    let lines: Vec<&str> = block.lines().map(str::trim).collect();
    if lines.len() < 3 {
        return Err(ConvertError::MalformedBlock(format!(
            "expected at least 3 lines, found {}",
            lines.len()
        )));
    }

    let (show_at, hide_at) = match timing_line(lines[1]) {
        Ok((_, times)) => times,
        Err(_) => {
            return Err(ConvertError::MalformedBlock(format!(
                "expected a timing line, found '{}'",
                lines[1]
            )))
        }
    };
    let start_secs = parse_timestamp(show_at)?;
    let end_secs = parse_timestamp(hide_at)?;
    if end_secs <= start_secs {
        return Err(ConvertError::MalformedBlock(format!(
            "end time {} is not after start time {}",
            hide_at, show_at
        )));
    }

    Ok(CaptionRecord {
        sequence_id: lines[0].to_string(),
        start_secs,
        end_secs,
        text: lines[2..].iter().map(|l| l.to_string()).collect(),
    })
}

/// Matches `<timestamp> --> <timestamp>`, ignoring anything after the
/// second timestamp (such as position coordinates).
fn timing_line(input: &str) -> IResult<&str, (&str, &str), VerboseError<&str>> {
    let (input, _) = space0(input)?;
    let (input, show_at) = timestamp_token(input)?;
    let (input, _) = delimited(space0, tag("-->"), space0)(input)?;
    let (input, hide_at) = timestamp_token(input)?;

    Ok((input, (show_at, hide_at)))
}

fn timestamp_token(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    take_while1(|c: char| c.is_ascii_digit() || c == ':' || c == ',' || c == '.')(input)
}

/// Converts `HH:MM:SS,mmm` into seconds since zero.
pub fn parse_timestamp(ts: &str) -> Result<f64, ConvertError> {
    let malformed = || ConvertError::MalformedTimestamp(ts.to_string());

    let normalised = ts.trim().replace(',', ".");
    let fields: Vec<&str> = normalised.split(':').collect();
    if fields.len() != 3 {
        return Err(malformed());
    }

    let hours: u64 = fields[0].parse().map_err(|_| malformed())?;
    let minutes: u64 = fields[1].parse().map_err(|_| malformed())?;
    let seconds: f64 = fields[2].parse().map_err(|_| malformed())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(malformed());
    }

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}
