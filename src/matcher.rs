use crate::model::Preset;
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32Str};

pub struct PresetMatcher {
    matcher: Matcher,
}

impl Default for PresetMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetMatcher {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    /// Indices of presets whose name matches `query`, best match first.
    pub fn search(&mut self, query: &str, presets: &[Preset]) -> Vec<usize> {
        let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);
        let mut buf = Vec::new();

        let mut scored: Vec<(usize, u32)> = presets
            .iter()
            .enumerate()
            .filter_map(|(i, preset)| {
                let haystack = Utf32Str::new(&preset.name, &mut buf);
                pattern.score(haystack, &mut self.matcher).map(|score| (i, score))
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(i, _)| i).collect()
    }
}
