use std::fs;
use std::path::Path;

use axum::http::StatusCode;
use axum_test::TestServer;
use modelshelf::api::{create_router, AppState};
use modelshelf::config::Settings;
use modelshelf::db::Database;
use modelshelf::i18n::Translations;
use modelshelf::models::*;
use serde_json::Value;
use tempfile::TempDir;

struct Fixture {
    server: TestServer,
    root: TempDir,
}

fn setup() -> Fixture {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let translations = Translations::builtin().expect("Failed to load translations");
    let app = create_router(AppState::new(db, Settings::default(), translations));
    Fixture {
        server: TestServer::new(app).expect("Failed to create test server"),
        root: tempfile::tempdir().expect("Failed to create temp dir"),
    }
}

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"solid").unwrap();
}

async fn create_test_library(fixture: &Fixture) -> Library {
    fixture
        .server
        .post("/api/v1/libraries")
        .json(&CreateLibraryInput {
            name: "Test Library".to_string(),
            path: fixture.root.path().to_string_lossy().into_owned(),
        })
        .await
        .json::<Library>()
}

async fn create_test_model(fixture: &Fixture, library: &Library, path: &str) -> Model {
    let response = fixture
        .server
        .post(&format!("/api/v1/libraries/{}/models", library.id))
        .json(&CreateModelInput {
            name: None,
            path: path.to_string(),
            license: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Model>()
}

async fn scan_and_wait(fixture: &Fixture, model: &Model) -> Value {
    let response = fixture
        .server
        .post(&format!("/api/v1/models/{}/scan", model.id))
        .add_query_param("wait", "true")
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let fixture = setup();
        let response = fixture.server.get("/api/v1/health").await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");
    }
}

mod libraries {
    use super::*;

    #[tokio::test]
    async fn creates_and_lists_libraries() {
        let fixture = setup();
        let library = create_test_library(&fixture).await;

        let response = fixture.server.get("/api/v1/libraries").await;
        response.assert_status_ok();
        let libraries: Vec<Library> = response.json();
        assert_eq!(libraries.len(), 1);
        assert_eq!(libraries[0].id, library.id);
    }

    #[tokio::test]
    async fn rejects_relative_path_with_bad_request() {
        let fixture = setup();
        let response = fixture
            .server
            .post("/api/v1/libraries")
            .json(&CreateLibraryInput {
                name: "Relative".to_string(),
                path: "relative/path".to_string(),
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("absolute"));
    }

    #[tokio::test]
    async fn rejects_duplicate_path_with_bad_request() {
        let fixture = setup();
        create_test_library(&fixture).await;

        let response = fixture
            .server
            .post("/api/v1/libraries")
            .json(&CreateLibraryInput {
                name: "Duplicate".to_string(),
                path: fixture.root.path().to_string_lossy().into_owned(),
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("already exists"));
    }

    #[tokio::test]
    async fn returns_not_found_for_unknown_library() {
        let fixture = setup();
        let response = fixture
            .server
            .get(&format!("/api/v1/libraries/{}", uuid::Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deletes_a_library() {
        let fixture = setup();
        let library = create_test_library(&fixture).await;

        fixture
            .server
            .delete(&format!("/api/v1/libraries/{}", library.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        fixture
            .server
            .get(&format!("/api/v1/libraries/{}", library.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

mod models {
    use super::*;

    #[tokio::test]
    async fn creating_a_model_requires_a_known_library() {
        let fixture = setup();
        let response = fixture
            .server
            .post(&format!("/api/v1/libraries/{}/models", uuid::Uuid::new_v4()))
            .json(&CreateModelInput {
                name: None,
                path: "benchy".to_string(),
                license: None,
            })
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lists_models_in_a_library() {
        let fixture = setup();
        touch(fixture.root.path(), "benchy/benchy.stl");
        let library = create_test_library(&fixture).await;
        let model = create_test_model(&fixture, &library, "benchy").await;

        let response = fixture
            .server
            .get(&format!("/api/v1/libraries/{}/models", library.id))
            .await;
        response.assert_status_ok();
        let models: Vec<Model> = response.json();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, model.id);
        assert_eq!(models[0].name, "benchy");
    }

    #[tokio::test]
    async fn updates_the_license() {
        let fixture = setup();
        touch(fixture.root.path(), "benchy/benchy.stl");
        let library = create_test_library(&fixture).await;
        let model = create_test_model(&fixture, &library, "benchy").await;

        let response = fixture
            .server
            .put(&format!("/api/v1/models/{}", model.id))
            .json(&UpdateModelInput {
                name: None,
                license: Some("MIT".to_string()),
            })
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Model>().license.as_deref(), Some("MIT"));
    }

    #[tokio::test]
    async fn model_detail_includes_library_and_tags() {
        let fixture = setup();
        touch(fixture.root.path(), "boats/benchy/benchy.stl");
        let library = create_test_library(&fixture).await;
        let model = create_test_model(&fixture, &library, "boats/benchy").await;
        scan_and_wait(&fixture, &model).await;

        let response = fixture
            .server
            .get(&format!("/api/v1/models/{}", model.id))
            .await;
        response.assert_status_ok();
        let detail: ModelDetail = response.json();
        assert_eq!(detail.library.id, library.id);
        assert!(detail.tags.contains(&"boats".to_string()));
        assert!(!detail.parts.is_empty());
    }
}

mod scanning {
    use super::*;

    #[tokio::test]
    async fn queues_a_scan_by_default() {
        let fixture = setup();
        touch(fixture.root.path(), "benchy/benchy.stl");
        let library = create_test_library(&fixture).await;
        let model = create_test_model(&fixture, &library, "benchy").await;

        let response = fixture
            .server
            .post(&format!("/api/v1/models/{}/scan", model.id))
            .await;

        response.assert_status(StatusCode::ACCEPTED);
        assert_eq!(response.json::<Value>()["status"], "queued");
    }

    #[tokio::test]
    async fn scans_inline_when_waiting() {
        let fixture = setup();
        touch(fixture.root.path(), "cutter/a.stl");
        touch(fixture.root.path(), "cutter/b.obj");
        touch(fixture.root.path(), "cutter/files/c.stl");
        let library = create_test_library(&fixture).await;
        let model = create_test_model(&fixture, &library, "cutter").await;

        let summary = scan_and_wait(&fixture, &model).await;

        let mut filenames: Vec<String> = summary["parts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["filename"].as_str().unwrap().to_string())
            .collect();
        filenames.sort();
        assert_eq!(filenames, vec!["a.stl", "b.obj", "files/c.stl"]);
    }

    #[tokio::test]
    async fn missing_directory_is_unprocessable() {
        let fixture = setup();
        let library = create_test_library(&fixture).await;
        let model = create_test_model(&fixture, &library, "not-on-disk").await;

        let response = fixture
            .server
            .post(&format!("/api/v1/models/{}/scan", model.id))
            .add_query_param("wait", "true")
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_model_is_not_found() {
        let fixture = setup();
        let response = fixture
            .server
            .post(&format!("/api/v1/models/{}/scan", uuid::Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod parts {
    use super::*;

    #[tokio::test]
    async fn groups_parts_by_filename_prefix() {
        let fixture = setup();
        let library = create_test_library(&fixture).await;
        touch(fixture.root.path(), "robot/arm_left.stl");
        touch(fixture.root.path(), "robot/arm_right.stl");
        touch(fixture.root.path(), "robot/body.stl");
        let model = create_test_model(&fixture, &library, "robot").await;

        scan_and_wait(&fixture, &model).await;

        let response = fixture
            .server
            .get(&format!("/api/v1/models/{}/parts/grouped", model.id))
            .await;
        response.assert_status_ok();
        let grouped: Value = response.json();

        let groups = grouped["groups"].as_array().unwrap();
        let arm = groups.iter().find(|g| g["key"] == "arm").expect("arm group");
        assert!(arm["files"].as_array().unwrap().len() >= 2);
        assert!(grouped["ungrouped"]
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["filename"] != "arm_left.stl"));
    }

    #[tokio::test]
    async fn grouped_parts_for_unknown_model_is_not_found() {
        let fixture = setup();
        fixture
            .server
            .get(&format!("/api/v1/models/{}/parts/grouped", uuid::Uuid::new_v4()))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

mod tags_and_problems {
    use super::*;

    #[tokio::test]
    async fn replaces_and_removes_tags() {
        // No directory on disk, so the scan queued on creation fails before
        // it can add tags of its own.
        let fixture = setup();
        let library = create_test_library(&fixture).await;
        let model = create_test_model(&fixture, &library, "benchy").await;

        let response = fixture
            .server
            .put(&format!("/api/v1/models/{}/tags", model.id))
            .json(&SetTagsInput {
                tags: vec!["boats".to_string(), "calibration".to_string()],
            })
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Vec<String>>(), vec!["boats", "calibration"]);

        fixture
            .server
            .delete(&format!("/api/v1/models/{}/tags/boats", model.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let tags: Vec<String> = fixture
            .server
            .get(&format!("/api/v1/models/{}/tags", model.id))
            .await
            .json();
        assert_eq!(tags, vec!["calibration"]);
    }

    #[tokio::test]
    async fn flags_and_resolves_problems() {
        let fixture = setup();
        touch(fixture.root.path(), "benchy/benchy.stl");
        let library = create_test_library(&fixture).await;
        let model = create_test_model(&fixture, &library, "benchy").await;

        let response = fixture
            .server
            .post(&format!("/api/v1/models/{}/problems", model.id))
            .json(&CreateProblemInput {
                category: ProblemCategory::Missing,
                note: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let problem: Problem = response.json();

        fixture
            .server
            .delete(&format!("/api/v1/problems/{}", problem.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let problems: Vec<Problem> = fixture
            .server
            .get(&format!("/api/v1/models/{}/problems", model.id))
            .await
            .json();
        assert!(problems.is_empty());
    }
}

mod badges {
    use super::*;

    #[tokio::test]
    async fn renders_new_and_problem_badges() {
        let fixture = setup();
        touch(fixture.root.path(), "benchy/benchy.stl");
        let library = create_test_library(&fixture).await;
        let model = create_test_model(&fixture, &library, "benchy").await;
        fixture
            .server
            .put(&format!("/api/v1/models/{}/tags", model.id))
            .json(&SetTagsInput {
                tags: vec!["!new".to_string()],
            })
            .await;
        fixture
            .server
            .post(&format!("/api/v1/models/{}/problems", model.id))
            .json(&CreateProblemInput {
                category: ProblemCategory::Other,
                note: Some("check supports".to_string()),
            })
            .await;

        let response = fixture
            .server
            .get(&format!("/api/v1/models/{}/badges", model.id))
            .await;
        response.assert_status_ok();
        let html = response.text();

        assert!(html.starts_with(r#"<span class="status-badges">"#));
        let new_at = html.find("bg-info").expect("new badge");
        let warning_at = html.find("text-warning").expect("warning badge");
        assert!(new_at < warning_at);
    }

    #[tokio::test]
    async fn renders_empty_container_without_status() {
        let fixture = setup();
        let library = create_test_library(&fixture).await;
        let model = create_test_model(&fixture, &library, "not-on-disk").await;

        let html = fixture
            .server
            .get(&format!("/api/v1/models/{}/badges", model.id))
            .await
            .text();

        assert_eq!(html, r#"<span class="status-badges"></span>"#);
    }
}

mod licenses {
    use super::*;

    #[tokio::test]
    async fn lists_ten_licenses_with_selection() {
        let fixture = setup();
        let response = fixture
            .server
            .get("/api/v1/licenses")
            .add_query_param("selected", "CC0-1.0")
            .await;

        response.assert_status_ok();
        let options: Vec<Value> = response.json();
        assert_eq!(options.len(), 10);
        let selected: Vec<_> = options.iter().filter(|o| o["selected"] == true).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["id"], "CC0-1.0");
        assert_eq!(selected[0]["label"], "Creative Commons Zero 1.0 Universal");
    }

    #[tokio::test]
    async fn renders_option_markup() {
        let fixture = setup();
        let html = fixture
            .server
            .get("/api/v1/licenses/options")
            .add_query_param("selected", "MIT")
            .await
            .text();

        assert_eq!(html.matches("<option").count(), 10);
        assert!(html.contains(r#"<option value="MIT" selected="selected">MIT License</option>"#));
    }
}
