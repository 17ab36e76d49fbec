//! Start-up parameters carried in the page location.
//!
//! Two query parameters are recognised: `mode=advanced` opens the
//! interactive editor, and `template=<key>` applies a named template. Both
//! are read once; the caller then replaces the visible location with the
//! cleaned one so a reload does not re-apply them.

use crate::template::NamedTemplate;
use url::Url;

/// Editor mode requested by the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Simple,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StartupParams {
    pub mode: EditorMode,
    pub template: Option<&'static NamedTemplate>,
    /// Location to show after consuming the parameters (path only), when
    /// anything was consumed.
    pub cleaned_location: Option<String>,
}

impl StartupParams {
    /// Read parameters from a full location such as
    /// `https://host/editor?mode=advanced&template=bold-red`.
    pub fn from_location(location: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(location)?;
        let mut params = StartupParams::default();
        let mut consumed = false;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "mode" if value == "advanced" => {
                    params.mode = EditorMode::Advanced;
                    consumed = true;
                }
                "template" => match NamedTemplate::lookup(&value) {
                    Some(t) => {
                        params.template = Some(t);
                        consumed = true;
                    }
                    None => log::warn!("ignoring unknown template {value:?}"),
                },
                _ => {}
            }
        }

        if consumed {
            params.cleaned_location = Some(url.path().to_string());
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_mode_and_template() {
        let p = StartupParams::from_location(
            "https://thumbs.example/editor?mode=advanced&template=golden-energy",
        )
        .unwrap();
        assert_eq!(p.mode, EditorMode::Advanced);
        assert_eq!(p.template.map(|t| t.key), Some("golden-energy"));
        assert_eq!(p.cleaned_location.as_deref(), Some("/editor"));
    }

    #[test]
    fn unknown_values_are_ignored() {
        let p = StartupParams::from_location("https://thumbs.example/?mode=expert&template=nope")
            .unwrap();
        assert_eq!(p, StartupParams::default());
    }

    #[test]
    fn plain_location_is_left_alone() {
        let p = StartupParams::from_location("https://thumbs.example/index.html").unwrap();
        assert_eq!(p.cleaned_location, None);
    }
}
