/// One parsed subtitle cue.
///
/// Line breaks are kept as separate entries in `text` rather than as raw
/// newlines, so output formats decide how a break is spelled.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionRecord {
    pub(crate) sequence_id: String,
    pub(crate) start_secs: f64,
    pub(crate) end_secs: f64,
    pub(crate) text: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    /// Keep every source line; boundaries become line-break escapes.
    Preserve,
    /// Collapse all lines into one, separated by a single space.
    Space,
}

impl CaptionRecord {
    /// The display lines of this caption after applying `join`.
    pub fn lines(&self, join: LineJoin) -> Vec<String> {
        match join {
            LineJoin::Preserve => self.text.clone(),
            LineJoin::Space => vec![self.text.join(" ")],
        }
    }
}

/// The latest end time over all captions, or zero when there are none.
pub fn max_end(captions: &[CaptionRecord]) -> f64 {
    captions.iter().map(|c| c.end_secs).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caption(end_secs: f64, text: &[&str]) -> CaptionRecord {
        CaptionRecord {
            sequence_id: "1".to_string(),
            start_secs: 0.0,
            end_secs,
            text: text.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn space_join_collapses_lines() {
        let cap = caption(1.0, &["first", "second"]);
        assert_eq!(cap.lines(LineJoin::Space), vec!["first second"]);
        assert_eq!(cap.lines(LineJoin::Preserve), vec!["first", "second"]);
    }

    #[test]
    fn max_end_picks_latest_cue() {
        let caps = vec![caption(6.0, &["a"]), caption(3.0, &["b"])];
        assert_eq!(max_end(&caps), 6.0);
        assert_eq!(max_end(&[]), 0.0);
    }
}
