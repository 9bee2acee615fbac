use speculate2::speculate;

speculate! {
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use dashboard_core::auth::{derive_token, AuthGate};
    use dashboard_core::{Database, Table};
    use partnership_dashboard::api::{create_router, AppState};

    fn setup_db() -> Database {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate test database");
        db
    }

    fn open_server(db: &Database) -> TestServer {
        TestServer::new(create_router(AppState::new(db.clone(), AuthGate::open())))
            .expect("Failed to start test server")
    }

    fn locked_server(db: &Database) -> TestServer {
        let gate = AuthGate::new(Some("hunter2".to_string()), "s3cret");
        TestServer::new(create_router(AppState::new(db.clone(), gate)))
            .expect("Failed to start test server")
    }

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }

    describe "health" {
        it "answers without a token" {
            tokio_test::block_on(async {
                let server = locked_server(&setup_db());
                let response = server.get("/api/health").await;
                response.assert_status(StatusCode::OK);
                assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
            });
        }
    }

    describe "auth" {
        it "rejects API calls without a token" {
            tokio_test::block_on(async {
                let server = locked_server(&setup_db());
                let response = server.post("/api/records/ideas/search").json(&json!({})).await;
                response.assert_status(StatusCode::UNAUTHORIZED);
                assert_eq!(response.json::<Value>()["error"], json!("Unauthorized"));
            });
        }

        it "rejects a wrong password" {
            tokio_test::block_on(async {
                let server = locked_server(&setup_db());
                let response = server.post("/api/auth").json(&json!({ "password": "guess" })).await;
                response.assert_status(StatusCode::UNAUTHORIZED);
                assert_eq!(response.json::<Value>()["error"], json!("Invalid password"));
            });
        }

        it "issues the session token as a week-long cookie" {
            tokio_test::block_on(async {
                let server = locked_server(&setup_db());
                let response = server.post("/api/auth").json(&json!({ "password": "hunter2" })).await;
                response.assert_status(StatusCode::OK);

                let expected = derive_token("hunter2", "s3cret");
                let body = response.json::<Value>();
                assert_eq!(body["success"], json!(true));
                assert_eq!(body["token"], json!(expected));

                let cookie = response.header(header::SET_COOKIE);
                let cookie = cookie.to_str().unwrap();
                assert!(cookie.starts_with(&format!("auth-token={expected}")));
                assert!(cookie.contains("HttpOnly"));
                assert!(cookie.contains("Max-Age=604800"));
            });
        }

        it "accepts the token as a bearer header" {
            tokio_test::block_on(async {
                let server = locked_server(&setup_db());
                let token = derive_token("hunter2", "s3cret");
                let response = server
                    .post("/api/records/ideas/search")
                    .add_header(header::AUTHORIZATION, bearer(&token))
                    .json(&json!({}))
                    .await;
                response.assert_status(StatusCode::OK);
                assert_eq!(response.json::<Value>(), json!([]));
            });
        }

        it "accepts the token as a cookie" {
            tokio_test::block_on(async {
                let server = locked_server(&setup_db());
                let token = derive_token("hunter2", "s3cret");
                let cookie = HeaderValue::from_str(&format!("theme=dark; auth-token={token}")).unwrap();
                let response = server
                    .post("/api/records/projects/search")
                    .add_header(header::COOKIE, cookie)
                    .json(&json!({}))
                    .await;
                response.assert_status(StatusCode::OK);
            });
        }

        it "rejects a token minted with another secret" {
            tokio_test::block_on(async {
                let server = locked_server(&setup_db());
                let forged = derive_token("hunter2", "default-secret");
                let response = server
                    .post("/api/records/ideas/search")
                    .add_header(header::AUTHORIZATION, bearer(&forged))
                    .json(&json!({}))
                    .await;
                response.assert_status(StatusCode::UNAUTHORIZED);
            });
        }

        it "sends page requests to the login page" {
            tokio_test::block_on(async {
                let server = locked_server(&setup_db());
                let response = server.get("/ideas").await;
                response.assert_status(StatusCode::SEE_OTHER);
                assert_eq!(response.header(header::LOCATION), "/login");
            });
        }

        it "lets static assets through" {
            tokio_test::block_on(async {
                let server = locked_server(&setup_db());
                let response = server.get("/favicon.ico").await;
                response.assert_status(StatusCode::NOT_FOUND);
            });
        }

        it "admits everyone when no password is set" {
            tokio_test::block_on(async {
                let server = open_server(&setup_db());
                let response = server.post("/api/records/ideas/search").json(&json!({})).await;
                response.assert_status(StatusCode::OK);
            });
        }
    }

    describe "records" {
        it "creates, reads, updates, and deletes an idea" {
            tokio_test::block_on(async {
                let server = open_server(&setup_db());

                let created = server
                    .post("/api/records/ideas")
                    .json(&json!({ "title": "Partner webinar", "priority": "high" }))
                    .await;
                created.assert_status(StatusCode::CREATED);
                let row = created.json::<Value>();
                assert_eq!(row["status"], json!("new"));
                let id = row["id"].as_str().unwrap().to_string();

                let fetched = server.get(&format!("/api/records/ideas/{id}")).await;
                fetched.assert_status(StatusCode::OK);
                assert_eq!(fetched.json::<Value>()["title"], json!("Partner webinar"));

                server
                    .patch(&format!("/api/records/ideas/{id}"))
                    .json(&json!({ "fields": { "status": "approved" } }))
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
                let fetched = server.get(&format!("/api/records/ideas/{id}")).await;
                assert_eq!(fetched.json::<Value>()["status"], json!("approved"));

                server
                    .delete(&format!("/api/records/ideas/{id}"))
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
                server
                    .get(&format!("/api/records/ideas/{id}"))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            });
        }

        it "filters and orders searches" {
            tokio_test::block_on(async {
                let server = open_server(&setup_db());
                let project = server
                    .post("/api/records/projects")
                    .json(&json!({ "name": "Reseller launch" }))
                    .await
                    .json::<Value>();
                for title in ["a", "b"] {
                    server
                        .post("/api/records/tasks")
                        .json(&json!({ "project_id": project["id"], "title": title }))
                        .await
                        .assert_status(StatusCode::CREATED);
                }

                let rows = server
                    .post("/api/records/tasks/search")
                    .json(&json!({
                        "filters": [{ "column": "project_id", "value": project["id"] }],
                        "order": { "column": "created_at", "ascending": false },
                    }))
                    .await
                    .json::<Vec<Value>>();
                let titles: Vec<&str> = rows.iter().map(|r| r["title"].as_str().unwrap()).collect();
                assert_eq!(titles, vec!["b", "a"]);
            });
        }

        it "reports an unknown table as not found" {
            tokio_test::block_on(async {
                let server = open_server(&setup_db());
                let response = server.post("/api/records/users").json(&json!({ "name": "x" })).await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(response.json::<Value>()["error"], json!("unknown table `users`"));
            });
        }

        it "reports a stale update as a conflict" {
            tokio_test::block_on(async {
                let server = open_server(&setup_db());
                let row = server
                    .post("/api/records/projects")
                    .json(&json!({ "name": "Reseller launch" }))
                    .await
                    .json::<Value>();
                let id = row["id"].as_str().unwrap();

                let response = server
                    .patch(&format!("/api/records/projects/{id}"))
                    .json(&json!({
                        "fields": { "status": "review" },
                        "last_seen": "2000-01-01T00:00:00Z",
                    }))
                    .await;
                response.assert_status(StatusCode::CONFLICT);
            });
        }

        it "reports constraint violations as unprocessable" {
            tokio_test::block_on(async {
                let server = open_server(&setup_db());
                let response = server
                    .post("/api/records/ideas")
                    .json(&json!({ "title": "x", "ranking": 9 }))
                    .await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
            });
        }

        it "refuses to edit comments" {
            tokio_test::block_on(async {
                let server = open_server(&setup_db());
                let idea = server
                    .post("/api/records/ideas")
                    .json(&json!({ "title": "x" }))
                    .await
                    .json::<Value>();
                let comment = server
                    .post("/api/records/comments")
                    .json(&json!({ "idea_id": idea["id"], "author": "Sam", "content": "hi" }))
                    .await
                    .json::<Value>();
                let id = comment["id"].as_str().unwrap();

                server
                    .patch(&format!("/api/records/comments/{id}"))
                    .json(&json!({ "fields": { "content": "edited" } }))
                    .await
                    .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                server
                    .delete(&format!("/api/records/comments/{id}"))
                    .await
                    .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
            });
        }
    }

    describe "setup" {
        it "migrates on request" {
            tokio_test::block_on(async {
                let server = open_server(&setup_db());
                let response = server.post("/api/setup").json(&json!({ "action": "migrate" })).await;
                response.assert_status(StatusCode::OK);
                assert_eq!(response.json::<Value>()["success"], json!(true));
            });
        }

        it "seeds sample data" {
            tokio_test::block_on(async {
                let db = setup_db();
                let server = open_server(&db);
                server
                    .post("/api/setup")
                    .json(&json!({ "action": "seed-data" }))
                    .await
                    .assert_status(StatusCode::OK);

                let ideas = db.list_rows(Table::Ideas, &Default::default()).unwrap();
                let projects = db.list_rows(Table::Projects, &Default::default()).unwrap();
                assert!(!ideas.is_empty());
                assert!(!projects.is_empty());
            });
        }

        it "rejects unknown actions" {
            tokio_test::block_on(async {
                let server = open_server(&setup_db());
                let response = server.post("/api/setup").json(&json!({ "action": "drop-all" })).await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(response.json::<Value>()["error"], json!("Unknown action: drop-all"));
            });
        }
    }
}
