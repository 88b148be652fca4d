use crate::config::MalformedLinePolicy;
use crate::error::DockError;
use crate::model::{Locator, ParsedItem, TileOptions, SMALL_SPACER_SENTINEL, SPACER_LABEL, SPACER_SENTINEL};
use log::{debug, info};
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::path::Path;

// Running, non-persistent apps show up with a double-quoted URL in the path column.
const RUNNING_ENTRY_PATTERN: &str = r#"^"[A-Za-z][A-Za-z0-9+.-]*://"#;

pub struct ListingParser {
    home: String,
    policy: MalformedLinePolicy,
    running_entry: Regex,
}

impl ListingParser {
    pub fn new(home: &Path, policy: MalformedLinePolicy) -> Result<Self, DockError> {
        let running_entry = Regex::new(RUNNING_ENTRY_PATTERN)
            .map_err(|e| DockError::ParseFailed(e.to_string()))?;
        let home = home.to_string_lossy().trim_end_matches('/').to_string();
        Ok(Self { home, policy, running_entry })
    }

    /// Parses the output of `dockutil --list` into items, in listing order.
    pub fn parse(&self, report: &str) -> Result<Vec<ParsedItem>, DockError> {
        let mut items = Vec::new();

        for (index, line) in report.lines().enumerate() {
            // Tabs are field separators, so a leading tab marks an empty label.
            let line = line.trim_matches(|c: char| c.is_whitespace() && c != '\t');
            if line.trim().is_empty() {
                continue;
            }
            match self.parse_line(line) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(reason) => match self.policy {
                    MalformedLinePolicy::Skip => {
                        debug!("Skipping line {}: {}", index + 1, reason);
                    }
                    MalformedLinePolicy::Fail => {
                        return Err(DockError::ParseFailed(format!("line {}: {}", index + 1, reason)));
                    }
                },
            }
        }

        info!("ListingParser: parsed {} items", items.len());
        Ok(items)
    }

    /// `Ok(None)` means the record was filtered out on purpose.
    fn parse_line(&self, line: &str) -> Result<Option<ParsedItem>, String> {
        let fields: Vec<&str> = line.splitn(4, '\t').collect();
        if fields.len() < 2 {
            return Err("expected at least two tab-separated fields".to_string());
        }

        let label = fields[0].trim();
        let raw_locator = fields[1].trim();
        let raw_options = fields
            .get(3)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let options = raw_options.as_deref().map(TileOptions::parse).unwrap_or_default();

        if options.is_recents() {
            debug!("Dropping recent items entry {:?}", label);
            return Ok(None);
        }
        if self.running_entry.is_match(raw_locator) {
            debug!("Dropping running app entry {:?}", label);
            return Ok(None);
        }

        let is_spacer = raw_locator == SPACER_SENTINEL
            || raw_locator == SMALL_SPACER_SENTINEL
            || options.is_spacer()
            || label == SPACER_LABEL;
        if is_spacer {
            let label = if label.is_empty() { SPACER_LABEL } else { label };
            let small = raw_locator == SMALL_SPACER_SENTINEL || options.is_small_spacer();
            return Ok(Some(ParsedItem::new(label, Locator::Spacer { small }, raw_options)));
        }

        if label.is_empty() {
            return Err("empty label".to_string());
        }
        if raw_locator.is_empty() {
            return Err(format!("empty locator for {:?}", label));
        }

        let locator = Locator::Path(self.clean_locator(raw_locator));
        Ok(Some(ParsedItem::new(label, locator, raw_options)))
    }

    fn clean_locator(&self, raw: &str) -> String {
        let Some(rest) = raw.strip_prefix("file://") else {
            return raw.to_string();
        };
        let rest = rest.strip_prefix("localhost").unwrap_or(rest);

        let decoded = match percent_decode_str(rest).decode_utf8() {
            Ok(path) => path.into_owned(),
            Err(e) => {
                debug!("Could not decode {:?} ({}), keeping it undecoded", raw, e);
                rest.to_string()
            }
        };

        let path = if decoded.len() > 1 {
            decoded.trim_end_matches('/')
        } else {
            decoded.as_str()
        };
        self.abbreviate_home(path)
    }

    fn abbreviate_home(&self, path: &str) -> String {
        if self.home.is_empty() {
            return path.to_string();
        }
        match path.strip_prefix(self.home.as_str()) {
            Some("") => "~".to_string(),
            Some(rest) if rest.starts_with('/') => format!("~{}", rest),
            _ => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ListingParser {
        ListingParser::new(Path::new("/Users/alice"), MalformedLinePolicy::Skip).unwrap()
    }

    fn path_of(item: &ParsedItem) -> &str {
        match &item.locator {
            Locator::Path(p) => p,
            Locator::Spacer { .. } => panic!("expected a path locator"),
        }
    }

    #[test]
    fn test_plain_line() {
        let items = parser()
            .parse("Safari\tfile:///Applications/Safari.app/\tpersistentApps\t/Users/alice/Library/Preferences/com.apple.dock.plist")
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Safari");
        assert_eq!(path_of(&items[0]), "/Applications/Safari.app");
    }

    #[test]
    fn test_home_abbreviation() {
        let items = parser()
            .parse("Downloads\tfile:///Users/alice/Downloads\tpersistentOthers\nHome\tfile:///Users/alice/\tpersistentOthers")
            .unwrap();
        assert_eq!(path_of(&items[0]), "~/Downloads");
        assert_eq!(path_of(&items[1]), "~");
    }

    #[test]
    fn test_sibling_of_home_is_not_abbreviated() {
        let items = parser().parse("X\tfile:///Users/alicex/Docs").unwrap();
        assert_eq!(path_of(&items[0]), "/Users/alicex/Docs");
    }

    #[test]
    fn test_percent_decoding() {
        let items = parser()
            .parse("Visual Studio Code\tfile:///Applications/Visual%20Studio%20Code.app/")
            .unwrap();
        assert_eq!(path_of(&items[0]), "/Applications/Visual Studio Code.app");
    }

    #[test]
    fn test_bad_utf8_falls_back_to_undecoded() {
        let items = parser().parse("Odd\tfile:///Applications/Odd%FF.app/").unwrap();
        assert_eq!(path_of(&items[0]), "/Applications/Odd%FF.app");
    }

    #[test]
    fn test_recents_and_running_entries_are_dropped() {
        let report = "Recent Applications\tfile:///x\tpersistentOthers\ttile-type = recents-tile;\n\
                      Terminal\t\"file:///System/Applications/Utilities/Terminal.app/\"\trecentApps\n\
                      Mail\tfile:///System/Applications/Mail.app/\tpersistentApps";
        let items = parser().parse(report).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Mail");
    }

    #[test]
    fn test_options_field_keeps_tabs() {
        let items = parser()
            .parse("Docs\tfile:///Users/alice/Documents/\tpersistentOthers\ttile-type = directory-tile;\tshowas = 2;")
            .unwrap();
        assert_eq!(
            items[0].raw_options.as_deref(),
            Some("tile-type = directory-tile;\tshowas = 2;")
        );
    }

    #[test]
    fn test_spacers_are_not_cleaned() {
        let report = "\tspacer-tile\tpersistentApps\n\
                      Spacer\tfile:///whatever\tpersistentApps\n\
                      \tsmall-spacer-tile\tpersistentApps\ttile-type = small-spacer-tile;";
        let items = parser().parse(report).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.label == "Spacer"));
        assert_eq!(items[0].locator, Locator::Spacer { small: false });
        assert_eq!(items[1].locator, Locator::Spacer { small: false });
        assert_eq!(items[2].locator, Locator::Spacer { small: true });
    }

    #[test]
    fn test_small_spacer_without_options() {
        let items = parser().parse("\tsmall-spacer-tile\tpersistentApps").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].locator, Locator::Spacer { small: true });
        assert_eq!(items[0].raw_options, None);
    }

    #[test]
    fn test_skip_policy_drops_malformed_lines() {
        let items = parser().parse("garbage\nMail\tfile:///System/Applications/Mail.app/\n\n").unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_fail_policy_reports_line_number() {
        let strict = ListingParser::new(Path::new("/Users/alice"), MalformedLinePolicy::Fail).unwrap();
        let err = strict
            .parse("Mail\tfile:///System/Applications/Mail.app/\ngarbage")
            .unwrap_err();
        match err {
            DockError::ParseFailed(detail) => assert!(detail.starts_with("line 2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_every_well_formed_line_yields_one_record() {
        let lines = [
            ("A", "file:///Applications/A.app/"),
            ("B", "/opt/b"),
            ("C", "https://example.com"),
        ];
        let report: String = lines
            .iter()
            .map(|(l, p)| format!("{}\t{}\n", l, p))
            .collect();
        let items = parser().parse(&report).unwrap();
        assert_eq!(items.len(), lines.len());
        for (item, (label, _)) in items.iter().zip(lines.iter()) {
            assert_eq!(item.label, *label);
        }
    }
}
