#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::Value;

    use crate::certificate::handlers::{INVALID_FILE_TYPE, NO_FILE_PART, NO_FILE_SELECTED};
    use crate::certificate::identifier::{CertificateId, IdentifierDeriver, SeededSuffix};
    use crate::certificate::record::Record;
    use crate::config::AppConfig;
    use crate::generators::{DocumentRenderer, RenderError, Variant};
    use crate::{configure_routes, AppState};

    const BOUNDARY: &str = "----certificate-test-boundary";

    struct PlainRenderer;

    impl DocumentRenderer for PlainRenderer {
        fn render(
            &self,
            record: &Record,
            identifier: &CertificateId,
            _variant: Variant,
            output_path: &Path,
        ) -> Result<(), RenderError> {
            let body = format!("%PDF-1.7\n{}\n{}\n", record.person_name, identifier);
            fs::write(output_path, body).map_err(|source| RenderError::WriteOutput {
                path: output_path.to_path_buf(),
                source,
            })
        }
    }

    fn test_state(root: &Path) -> AppState {
        let config = AppConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            upload_dir: root.join("uploads"),
            generated_dir: root.join("generated"),
            render_config_path: PathBuf::from("unused.json"),
            typst_bin: PathBuf::from("typst"),
            cors_allowed_origins: Vec::new(),
        };
        let state = AppState::with_renderer(
            config,
            Arc::new(PlainRenderer),
            IdentifierDeriver::new(Arc::new(SeededSuffix::new(11))),
        );
        state.prepare_dirs().unwrap();
        state
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                    name, filename
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body.into_bytes()
    }

    fn upload_request(parts: &[(&str, Option<&str>, &str)]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/certificates")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body(parts))
    }

    fn raw_csv_upload_request(filename: &str, content: &[u8]) -> test::TestRequest {
        let mut body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"csv_file\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
            BOUNDARY, filename
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        test::TestRequest::post()
            .uri("/api/certificates")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    const VALID_CSV: &str = "Person Name,Course Name,Course Description,Course Date\n\
        Alice Smith,Python Programming,Learn Python basics,2023-01-15\n\
        Bob Johnson,Advanced Web Development,Master front-end and back-end,2023-02-20\n";

    #[actix_web::test]
    async fn test_upload_valid_csv_generates_all() {
        let dir = tempfile::tempdir().unwrap();
        let state = web::Data::new(test_state(dir.path()));
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = upload_request(&[
            ("csv_file", Some("valid_data.csv"), VALID_CSV),
            ("variant", None, "classic"),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["summary"], "all_succeeded");
        assert_eq!(body["message"], "Successfully generated all certificates!");
        assert_eq!(body["processed_message"], "Processed 2 rows.");

        let generated = body["generated"].as_array().unwrap();
        assert_eq!(generated.len(), 2);
        let first = generated[0]["file_name"].as_str().unwrap();
        assert!(first.starts_with("AS-PythonPr-150123-"));
        assert_eq!(generated[0]["url"], format!("/generated/{}", first));
        assert!(generated[1]["file_name"]
            .as_str()
            .unwrap()
            .starts_with("BJ-Advanced-200223-"));

        assert_eq!(fs::read_dir(dir.path().join("generated")).unwrap().count(), 2);
        assert_eq!(fs::read_dir(dir.path().join("uploads")).unwrap().count(), 1);
    }

    #[actix_web::test]
    async fn test_upload_without_file_part() {
        let dir = tempfile::tempdir().unwrap();
        let state = web::Data::new(test_state(dir.path()));
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = upload_request(&[("variant", None, "modern")]).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], NO_FILE_PART);
    }

    #[actix_web::test]
    async fn test_upload_with_empty_filename() {
        let dir = tempfile::tempdir().unwrap();
        let state = web::Data::new(test_state(dir.path()));
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = upload_request(&[("csv_file", Some(""), "")]).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], NO_FILE_SELECTED);
    }

    #[actix_web::test]
    async fn test_upload_rejects_non_csv() {
        let dir = tempfile::tempdir().unwrap();
        let state = web::Data::new(test_state(dir.path()));
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = upload_request(&[("csv_file", Some("test.txt"), "this is not a csv")]).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], INVALID_FILE_TYPE);
        assert_eq!(fs::read_dir(dir.path().join("uploads")).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn test_upload_missing_column_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let state = web::Data::new(test_state(dir.path()));
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let csv = "Person Name,Course Description,Course Date\n\
                   Charlie Brown,Introduction to ML,2023-03-10\n";
        let req = upload_request(&[("csv_file", Some("missing.CSV"), csv)]).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "MissingColumns");
        assert_eq!(
            body["message"],
            "CSV file is missing required columns: Course Name"
        );
        assert_eq!(fs::read_dir(dir.path().join("generated")).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn test_upload_headers_only_is_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let state = web::Data::new(test_state(dir.path()));
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let csv = "Person Name,Course Name,Course Description,Course Date\n";
        let req = upload_request(&[("csv_file", Some("empty.csv"), csv)]).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "EmptyInput");
        assert_eq!(body["message"], "CSV file is empty or could not be parsed.");
        assert_eq!(fs::read_dir(dir.path().join("generated")).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn test_upload_unparseable_csv_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = web::Data::new(test_state(dir.path()));
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = raw_csv_upload_request("broken.csv", b"Person Name,\xff\xfe Course\n").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "BadRequest");
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Error parsing CSV file: "), "{}", message);
        assert!(message.ends_with(". Please ensure it's a valid CSV."), "{}", message);
        assert_eq!(fs::read_dir(dir.path().join("generated")).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn test_serve_generated_certificate() {
        let dir = tempfile::tempdir().unwrap();
        let state = web::Data::new(test_state(dir.path()));
        let name = "AS-PythonPr-150123-000001.pdf";
        fs::write(dir.path().join("generated").join(name), b"%PDF-1.7\n").unwrap();

        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/generated/{}", name))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/pdf"
        );

        let req = test::TestRequest::get()
            .uri("/generated/AS-PythonPr-150123-999999.pdf")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/generated/upload.csv")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let state = web::Data::new(test_state(dir.path()));
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
