//! Recorded HTTP interactions
//!
//! Reads cassettes written by go-vcr style recorders. Only the fields the
//! fixture loader needs are decoded; headers, durations and the rest of the
//! recording are ignored.
//!
//! ```yaml
//! version: 2
//! interactions:
//!   - id: 0
//!     request:
//!       url: https://api.3commas.io/public/api/ver1/deals/2376446537/show
//!       method: GET
//!     response:
//!       body: '{"id":2376446537, ...}'
//!       code: 200
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::errors::{MockError, MockResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cassette {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub request: RecordedRequest,
    pub response: RecordedResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordedResponse {
    pub code: u16,
    #[serde(default)]
    pub body: String,
}

impl Interaction {
    pub fn new(method: &str, url: &str, code: u16, body: impl Into<String>) -> Self {
        Self {
            request: RecordedRequest {
                method: method.to_string(),
                url: url.to_string(),
            },
            response: RecordedResponse {
                code,
                body: body.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.response.code)
    }

    pub fn is_read(&self) -> bool {
        self.request.method.eq_ignore_ascii_case("GET")
    }
}

/// Path the cassette is actually read from: recorders save `name` as
/// `name.yaml`, so a path without an extension gets one.
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("yaml")
    }
}

impl Cassette {
    /// Parse cassette text. JSON is accepted for `.json` files, YAML otherwise.
    pub fn parse(contents: &str, json: bool) -> Result<Self, String> {
        if json {
            serde_json::from_str(contents).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(contents).map_err(|e| e.to_string())
        }
    }

    pub async fn load(path: &Path) -> MockResult<Self> {
        let resolved = resolve_path(path);
        let contents = tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| MockError::CassetteLoad {
                path: path.display().to_string(),
                reason: format!("{}: {}", resolved.display(), e),
            })?;
        let json = resolved
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        Self::parse(&contents, json).map_err(|reason| MockError::CassetteLoad {
            path: path.display().to_string(),
            reason,
        })
    }
}
