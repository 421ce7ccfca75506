/// Loading of the standards and comparisons listings from the backend.
///
/// Both fetches run concurrently and the catalog is usable only when both succeed. A failure
/// of either is kept as one opaque message until a manual reload succeeds; nothing is retried
/// automatically.
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::model::{Listing, Process, Standard, StandardsListing};
use pm_common::http::StandardsApiClient;

const STANDARDS_PATH: &str = "/standards/all";
const COMPARISONS_PATH: &str = "/comparisons";
const PROCESSES_PATH: &str = "/processes";

/// Everything the comparison engine needs from the backend.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub standards: Vec<Standard>,
    /// Server-side comparisons; kept as-is and only counted
    pub comparisons: Value,
}

impl Catalog {
    pub fn standard(&self, slug: &str) -> Option<&Standard> {
        self.standards.iter().find(|s| s.slug == slug)
    }

    pub fn comparison_count(&self) -> usize {
        count_entries(&self.comparisons)
    }
}

/// Current catalog, or why it could not be loaded.
#[derive(Debug, Clone)]
pub enum CatalogState {
    Ready(Catalog),
    Failed(String),
}

impl CatalogState {
    pub fn from_result(result: Result<Catalog, AppError>) -> Self {
        match result {
            Ok(catalog) => CatalogState::Ready(catalog),
            Err(e) => CatalogState::Failed(e.to_string()),
        }
    }

    pub fn ready(&self) -> Result<&Catalog, String> {
        match self {
            CatalogState::Ready(catalog) => Ok(catalog),
            CatalogState::Failed(message) => Err(format!(
                "{message}. Call reload_standards to try again."
            )),
        }
    }
}

/// Fetch both listings concurrently.
pub async fn load(client: &StandardsApiClient) -> Result<Catalog, AppError> {
    let standards = client.get_json::<StandardsListing>(STANDARDS_PATH);
    let comparisons = client.get_json::<Value>(COMPARISONS_PATH);

    let (listing, comparisons) = futures::future::try_join(standards, comparisons)
        .await
        .map_err(|e| {
            warn!(error = %e, "catalog fetch failed");
            AppError::Fetch(e.to_string())
        })?;

    let catalog = Catalog {
        standards: listing.into_items(),
        comparisons,
    };
    info!(
        standards = catalog.standards.len(),
        comparisons = catalog.comparison_count(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Fetch the tailored process recommendations. Not cached; each call hits the backend.
pub async fn load_processes(client: &StandardsApiClient) -> Result<Vec<Process>, AppError> {
    let processes = client
        .get_json::<Listing<Process>>(PROCESSES_PATH)
        .await
        .map_err(|e| {
            warn!(error = %e, "process fetch failed");
            AppError::Fetch(e.to_string())
        })?
        .into_items();
    info!(processes = processes.len(), "processes loaded");
    Ok(processes)
}

/// Number of comparison records, whichever envelope the backend used.
fn count_entries(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map
            .get("data")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::fixtures::catalog;

    #[test]
    fn comparison_count_accepts_both_shapes() {
        let bare = Catalog {
            standards: vec![],
            comparisons: json!([{"topic": "Risk"}, {"topic": "Quality"}]),
        };
        assert_eq!(bare.comparison_count(), 2);

        let wrapped = Catalog {
            standards: vec![],
            comparisons: json!({"data": [{"topic": "Risk"}]}),
        };
        assert_eq!(wrapped.comparison_count(), 1);

        assert_eq!(Catalog::default().comparison_count(), 0);
    }

    #[test]
    fn failed_state_reports_single_message() {
        let state = CatalogState::from_result(Err(AppError::Fetch("connection refused".into())));
        let err = state.ready().unwrap_err();
        assert!(err.starts_with("unable to load comparison data: connection refused"));
        assert!(err.contains("reload_standards"));
    }

    #[test]
    fn ready_state_finds_standards_by_slug() {
        let state = CatalogState::from_result(Ok(Catalog {
            standards: catalog(),
            comparisons: Value::Null,
        }));
        let ready = state.ready().unwrap();
        assert!(ready.standard("prince2").is_some());
        assert!(ready.standard("agilepm").is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_fails_the_whole_load() {
        let config = pm_common::http::StandardsApiConfig::new(
            "http://127.0.0.1:9",
            std::time::Duration::from_millis(500),
            1024,
        );
        let client = StandardsApiClient::new(config).unwrap();
        let err = load(&client).await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_fails_process_listing() {
        let config = pm_common::http::StandardsApiConfig::new(
            "http://127.0.0.1:9",
            std::time::Duration::from_millis(500),
            1024,
        );
        let client = StandardsApiClient::new(config).unwrap();
        let err = load_processes(&client).await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
    }
}
