use fake::Dummy;
use serde::{Deserialize, Serialize};

/// Defines dog record structure as returned by the service.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    pub id: String,
    pub img: String,
    pub name: String,
    pub age: u32,
    pub zip_code: String,
    pub breed: String,
}

/// Defines one page of search results: matching ids plus continuation cursors.
///
#[derive(Clone, Debug, Default, Dummy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub result_ids: Vec<String>,
    #[serde(default)]
    pub total: u64,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// Defines authenticated user structure.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize)]
pub struct User {
    pub name: String,
    pub email: String,
}
