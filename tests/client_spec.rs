use speculate2::speculate;

speculate! {
    use std::sync::Arc;

    use uuid::Uuid;

    use dashboard_core::auth::AuthGate;
    use dashboard_core::models::*;
    use dashboard_core::{
        ConcurrencyPolicy, Dashboard, DashboardConfig, DashboardError, Database, RecordStore,
        StoreError, Table,
    };
    use partnership_dashboard::api::{create_router, AppState};
    use partnership_dashboard::client::HttpStore;

    /// Serve a fresh database on an ephemeral port and return its base URL.
    async fn spawn_server(gate: AuthGate) -> (Database, String) {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate test database");

        let app = create_router(AppState::new(db.clone(), gate));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (db, format!("http://{addr}"))
    }

    describe "http store" {
        it "logs in and uses the token" {
            tokio_test::block_on(async {
                let (_db, url) = spawn_server(AuthGate::new(Some("hunter2".into()), "s3cret")).await;

                let anonymous = HttpStore::new(&url);
                let err = anonymous.list(Table::Ideas, &Default::default()).await.unwrap_err();
                assert!(matches!(err, StoreError::Rejected(ref m) if m == "Unauthorized"));

                let token = anonymous.login("hunter2").await.unwrap();
                let store = HttpStore::new(&url).with_token(Some(token));
                assert!(store.list(Table::Ideas, &Default::default()).await.unwrap().is_empty());
            });
        }

        it "reports a missing row as none" {
            tokio_test::block_on(async {
                let (_db, url) = spawn_server(AuthGate::open()).await;
                let store = HttpStore::new(&url);
                assert!(store.get(Table::Projects, Uuid::new_v4()).await.unwrap().is_none());
            });
        }

        it "drives the dashboard end to end" {
            tokio_test::block_on(async {
                let (db, url) = spawn_server(AuthGate::open()).await;
                let mut dash = Dashboard::new(Arc::new(HttpStore::new(&url)));

                let p1 = dash.create_project(CreateProjectInput::new("P1")).await.unwrap();
                dash.open_project(p1.id).await.unwrap();
                let t1 = dash.create_task(CreateTaskInput::new(p1.id, "T1")).await.unwrap();

                let done = dash.toggle_task(t1.id).await.unwrap();
                assert_eq!(done.status, TaskStatus::Complete);
                let stored = db.get_row(Table::Tasks, t1.id).unwrap().unwrap();
                assert_eq!(stored["status"], serde_json::json!("complete"));

                dash.add_comment("Sam", "Kicked off").await.unwrap();
                assert_eq!(dash.comment_counts().for_project(p1.id), 1);
            });
        }

        it "surfaces conflicts from the server" {
            tokio_test::block_on(async {
                let (_db, url) = spawn_server(AuthGate::open()).await;
                let config = DashboardConfig {
                    concurrency: ConcurrencyPolicy::RejectStale,
                    ..Default::default()
                };
                let mut a = Dashboard::with_config(Arc::new(HttpStore::new(&url)), config.clone());
                let mut b = Dashboard::with_config(Arc::new(HttpStore::new(&url)), config);

                let i1 = a.create_idea(CreateIdeaInput::new("I1")).await.unwrap();
                b.load_ideas().await.unwrap();

                a.set_idea_status(i1.id, IdeaStatus::Evaluating).await.unwrap();
                let err = b.set_idea_status(i1.id, IdeaStatus::Archived).await.unwrap_err();
                assert!(matches!(err, DashboardError::Store(StoreError::Conflict { .. })));
                assert_eq!(b.ideas()[0].status, IdeaStatus::New);
            });
        }
    }
}
