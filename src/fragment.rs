use crate::error::DockError;
use crate::model::{Locator, ParsedItem, SMALL_SPACER_SENTINEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    /// Embedded single quotes become `'\''`.
    #[default]
    Escape,
    /// Paths are wrapped as-is, embedded single quotes included.
    Legacy,
}

impl QuoteStyle {
    pub fn from_config(escape_single_quotes: bool) -> Self {
        if escape_single_quotes { QuoteStyle::Escape } else { QuoteStyle::Legacy }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FragmentBuilder {
    quote_style: QuoteStyle,
}

impl FragmentBuilder {
    pub fn new(quote_style: QuoteStyle) -> Self {
        Self { quote_style }
    }

    /// Builds the argument string that follows `dockutil --add`.
    pub fn build(&self, item: &ParsedItem) -> Result<String, DockError> {
        let path = match &item.locator {
            Locator::Path(path) if !item.is_spacer() => path,
            _ => return Ok(spacer_fragment(item)),
        };

        let mut tokens: Vec<String> = Vec::new();
        let path: String = path.chars().filter(|c| *c != '"' && *c != '\\').collect();
        if path.trim().is_empty() {
            return Err(DockError::ConstructionFailed(format!("{:?} has an empty path", item.label)));
        }
        tokens.push(self.quote_path(&path));

        let options = item.options();
        if let Some(view) = options.get("showas").and_then(view_flag) {
            tokens.push(format!("--view {}", view));
        }
        if options.is_folder() {
            if let Some(display) = options.get("displayas").and_then(display_flag) {
                tokens.push(format!("--display {}", display));
            }
        }
        if let Some(sort) = options.get("arrangement").and_then(sort_flag) {
            tokens.push(format!("--sort {}", sort));
        }

        Ok(tokens.join(" "))
    }

    fn quote_path(&self, path: &str) -> String {
        if path == "~" {
            return path.to_string();
        }
        if !needs_quoting(path) {
            return path.to_string();
        }
        match self.quote_style {
            QuoteStyle::Escape => format!("'{}'", path.replace('\'', r"'\''")),
            QuoteStyle::Legacy => format!("'{}'", path),
        }
    }
}

/// Anything outside this set means something to `sh` and must be quoted.
/// A leading `~` is left bare so the shell can expand it.
fn needs_quoting(path: &str) -> bool {
    !path
        .chars()
        .all(|c| c.is_alphanumeric() || "/._-+,:@%~=".contains(c))
}

fn spacer_fragment(item: &ParsedItem) -> String {
    let small = matches!(item.locator, Locator::Spacer { small: true })
        || item
            .raw_options
            .as_deref()
            .is_some_and(|o| o.contains(SMALL_SPACER_SENTINEL));
    format!("'' --type {}", if small { "small-spacer" } else { "spacer" })
}

fn view_flag(value: &str) -> Option<&'static str> {
    match value {
        "1" => Some("fan"),
        "2" => Some("grid"),
        "3" => Some("list"),
        _ => None,
    }
}

fn display_flag(value: &str) -> Option<&'static str> {
    match value {
        "0" => Some("stack"),
        "1" => Some("folder"),
        _ => None,
    }
}

fn sort_flag(value: &str) -> Option<&'static str> {
    match value {
        "1" => Some("name"),
        "2" => Some("dateadded"),
        "3" => Some("datemodified"),
        "4" => Some("datecreated"),
        "5" => Some("kind"),
        _ => None,
    }
}
