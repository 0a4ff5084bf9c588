//! Request parameters.

use serde::Deserialize;

use griddle_common::{parse_component, GriddleError, GriddleResult, SizeSpec};
use renderer::SettingsOverrides;

/// Query parameters accepted on `GET /` and pretty URLs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestParams {
    #[serde(alias = "width")]
    pub w: Option<String>,
    #[serde(alias = "height")]
    pub h: Option<String>,
    /// Newline separated `w,h` pairs; turns the request into a batch.
    pub sizes: Option<String>,
    /// Present (with any value but an explicit "no") to send as attachment.
    pub download: Option<String>,
    /// Accepted for compatibility, has no effect.
    pub src: Option<String>,
    #[serde(flatten)]
    pub style: SettingsOverrides,
}

impl RequestParams {
    pub fn wants_download(&self) -> bool {
        flag_present(self.download.as_deref())
    }

    pub fn has_size(&self) -> bool {
        self.w.is_some() || self.h.is_some()
    }

    /// Width and height as given, before clamping.
    pub fn size(&self) -> GriddleResult<(i64, i64)> {
        let width = self
            .w
            .as_deref()
            .ok_or_else(|| GriddleError::invalid("width", "missing"))?;
        let height = self
            .h
            .as_deref()
            .ok_or_else(|| GriddleError::invalid("height", "missing"))?;
        Ok((parse_component("width", width)?, parse_component("height", height)?))
    }
}

/// JSON body of `POST /batch`.
///
/// ```json
/// { "sizes": [[300, 250], "728,90"], "download": true, "grid1-size": "20" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub sizes: Vec<SizeSpec>,
    #[serde(default)]
    pub download: bool,
    #[serde(flatten)]
    pub style: SettingsOverrides,
}

/// `?download`, `?download=1` and `?download=true` all count; `0`, `false`,
/// `no` and `off` do not.
fn flag_present(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
    }
}
