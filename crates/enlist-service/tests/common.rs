//! Common test utilities for enlist integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use axum::Router;
use axum_test::TestServer;
use serde_json::Value;
use tempfile::TempDir;

use enlist_core::{Fields, ProjectId};
use enlist_service::{create_router, AppState, ServiceConfig};
use enlist_store::StoreFactory;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for seeding and inspecting documents.
    pub store: StoreFactory,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The service API key for service-to-service requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let project_id = ProjectId::new("test-project").expect("valid project id");
        let store =
            StoreFactory::open(temp_dir.path(), project_id.clone()).expect("Failed to open store");

        let service_api_key = "test-service-key".to_string();

        let mut config = ServiceConfig::with_project(project_id);
        config.data_dir = temp_dir.path().to_path_buf();
        config.service_api_key = Some(service_api_key.clone());

        let state = AppState::new(store.clone(), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            _temp_dir: temp_dir,
            service_api_key,
        }
    }

    /// Write `data` into `collection/id`.
    pub fn seed(&self, collection: &str, id: &str, data: Value) {
        let fields: Fields = data.as_object().cloned().expect("seed data must be an object");
        let handle = self.store.connect().expect("store reachable");
        assert!(handle.upsert(collection, id, &fields).is_saved());
    }

    /// Current balance of `collection/id`.
    pub fn balance(&self, collection: &str, id: &str) -> f64 {
        self.store
            .connect()
            .expect("store reachable")
            .get_by_id(collection, id)
            .expect("document exists")
            .balance()
            .expect("numeric balance")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
