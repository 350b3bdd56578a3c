//! End-to-end tests: the full router, shield included, driven in-process

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, LazyLock};
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use platform::clock::ManualClock;
    use platform::crypto::to_base64;
    use platform::password::ClearTextPassword;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::app::AppState;
    use crate::config::AppConfig;
    use crate::sweep::sweep_once;

    const PASSWORD: &str = "s3cret-pass";

    static ADMIN_HASH: LazyLock<String> = LazyLock::new(|| {
        ClearTextPassword::new(PASSWORD.to_owned())
            .unwrap()
            .hash()
            .unwrap()
            .as_phc_string()
            .to_owned()
    });

    struct Harness {
        app: Router,
        state: AppState,
        clock: Arc<ManualClock>,
    }

    fn harness() -> Harness {
        let config = AppConfig::from_lookup(|key| match key {
            "ADMIN_PASSWORD_HASH" => Some(ADMIN_HASH.clone()),
            "JWT_SECRET" => Some(to_base64(&[5u8; 32])),
            _ => None,
        })
        .unwrap();
        let clock = ManualClock::new(1_700_000_000_000);
        let state = AppState::new(&config, clock.clone());
        Harness {
            app: state.router(),
            state,
            clock,
        }
    }

    impl Harness {
        async fn send(&self, req: Request<Body>) -> Response {
            self.app.clone().oneshot(req).await.unwrap()
        }

        async fn get(&self, uri: &str, ip: &str) -> Response {
            self.send(
                Request::get(uri)
                    .header("x-forwarded-for", ip)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
        }

        async fn post(&self, uri: &str, ip: &str, body: Value) -> Response {
            self.send(post_json(uri, ip, body, None)).await
        }

        async fn login(&self, password: &str, ip: &str) -> Response {
            self.post("/api/auth/login", ip, json!({ "password": password }))
                .await
        }

        async fn admin_token(&self, ip: &str) -> String {
            let res = self.login(PASSWORD, ip).await;
            assert_eq!(res.status(), StatusCode::OK);
            json_body(res).await["token"].as_str().unwrap().to_owned()
        }

        /// Fetch a captcha and work out its answer from the question
        async fn solved_captcha(&self, ip: &str) -> (String, i64) {
            let body = json_body(self.get("/api/captcha", ip).await).await;
            let question = body["question"].as_str().unwrap();
            let parts: Vec<&str> = question.split_whitespace().collect();
            let (a, b): (i64, i64) = (parts[0].parse().unwrap(), parts[2].parse().unwrap());
            let answer = match parts[1] {
                "+" => a + b,
                "-" => a - b,
                _ => a * b,
            };
            (body["token"].as_str().unwrap().to_owned(), answer)
        }
    }

    fn post_json(uri: &str, ip: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::post(uri)
            .header("x-forwarded-for", ip)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_captcha_comment_flow() {
        let h = harness();
        let ip = "198.51.100.1";
        let (token, answer) = h.solved_captcha(ip).await;

        let submission = json!({
            "name": "Sara",
            "text": "Thank you <b>all</b>",
            "captchaToken": token,
            "captchaAnswer": answer,
        });
        let res = h.post("/api/comments", ip, submission.clone()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["comment"]["name"], "Sara");
        assert_eq!(
            body["comment"]["text"],
            "Thank you &lt;b&gt;all&lt;&#x2F;b&gt;"
        );

        let res = h.post("/api/comments", ip, submission).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await["error"],
            "فشل التحقق - CAPTCHA verification failed"
        );

        let comments = json_body(h.get("/api/comments", ip).await).await;
        assert_eq!(comments.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_comment_checks_captcha_before_fields() {
        let h = harness();
        let ip = "198.51.100.2";

        let res = h
            .post("/api/comments", ip, json!({"name": "Sara", "text": "hi"}))
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await["error"],
            "فشل التحقق - CAPTCHA verification failed"
        );

        let (token, answer) = h.solved_captcha(ip).await;
        let res = h
            .post(
                "/api/comments",
                ip,
                json!({"name": "Sara", "text": "t".repeat(501), "captchaToken": token, "captchaAnswer": answer}),
            )
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], "Input too long");
    }

    #[tokio::test]
    async fn test_empty_captcha_answer_spends_token() {
        let h = harness();
        let ip = "198.51.100.6";
        let (token, answer) = h.solved_captcha(ip).await;

        let res = h
            .post(
                "/api/comments",
                ip,
                json!({"name": "Sara", "text": "hi", "captchaToken": token, "captchaAnswer": ""}),
            )
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = h
            .post(
                "/api/comments",
                ip,
                json!({"name": "Sara", "text": "hi", "captchaToken": token, "captchaAnswer": answer}),
            )
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await["error"],
            "فشل التحقق - CAPTCHA verification failed"
        );
    }

    #[tokio::test]
    async fn test_expired_captcha_fails() {
        let h = harness();
        let ip = "198.51.100.3";
        let (token, answer) = h.solved_captcha(ip).await;
        h.clock.advance(Duration::from_secs(5 * 60 + 1));

        let res = h
            .post(
                "/api/comments",
                ip,
                json!({"name": "Sara", "text": "hi", "captchaToken": token, "captchaAnswer": answer}),
            )
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_five_failed_logins_then_blocked() {
        let h = harness();
        let ip = "1.2.3.4";

        for _ in 0..5 {
            let res = h.login("wrong-password", ip).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(json_body(res).await["error"], "Invalid credentials");
        }

        let res = h.login(PASSWORD, ip).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(res).await["error"],
            "Too many failed attempts. Try again later."
        );

        let res = h.get("/api/stats", ip).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = h.login(PASSWORD, "1.2.3.5").await;
        assert_eq!(res.status(), StatusCode::OK);

        h.clock.advance(Duration::from_secs(3600));
        let res = h.get("/api/stats", ip).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rce_attempt_blocks_ip() {
        let h = harness();
        let ip = "198.51.100.4";

        let res = h
            .post(
                "/api/articles/65a1b2c3d4e5f60718293a4b/comments",
                ip,
                json!({"text": "require('child_process')"}),
            )
            .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(res).await["error"],
            "Access denied - Security violation"
        );

        let res = h.get("/api/stats", ip).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_general_limit_on_api_only() {
        let h = harness();
        let ip = "198.51.100.5";

        for _ in 0..100 {
            assert_eq!(h.get("/api/stats", ip).await.status(), StatusCode::OK);
        }
        let res = h.get("/api/stats", ip).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            json_body(res).await["error"],
            "Too many requests, please try again later."
        );

        let res = h.get("/app.js", ip).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(text(res).await, "Not Found");

        h.clock.advance(Duration::from_secs(15 * 60));
        assert_eq!(h.get("/api/stats", ip).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_spoofed_forwarded_entry_keeps_block() {
        let h = harness();

        for n in 0..5 {
            let res = h.login("wrong-password", &format!("7.7.7.{n}, 1.2.3.4")).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }

        let res = h.login(PASSWORD, "8.8.8.8, 1.2.3.4").await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(res).await["error"],
            "Too many failed attempts. Try again later."
        );
    }

    #[tokio::test]
    async fn test_spoofed_forwarded_entry_shares_limit_window() {
        let h = harness();

        for n in 0..100 {
            let ip = format!("9.9.{}.{}, 5.5.5.5", n / 250, n % 250);
            assert_eq!(h.get("/api/stats", &ip).await.status(), StatusCode::OK);
        }
        let res = h.get("/api/stats", "9.9.9.9, 5.5.5.5").await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_replay_rejected_within_window() {
        let h = harness();
        let ip = "198.51.100.6";
        let request = || {
            Request::post("/api/stats/view")
                .header("x-forwarded-for", ip)
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap()
        };

        assert_eq!(h.send(request()).await.status(), StatusCode::OK);
        let res = h.send(request()).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(res).await["error"], "Duplicate request");

        h.clock.advance(Duration::from_secs(5 * 60));
        let res = h.send(request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["views"], 2);
    }

    #[tokio::test]
    async fn test_session_dies_on_fourth_ip() {
        let h = harness();
        let token = h.admin_token("10.1.0.1").await;
        let article = json!({"titleAr": "عنوان", "contentAr": "نص"});

        for ip in ["10.1.0.1", "10.1.0.2", "10.1.0.3"] {
            let res = h
                .send(post_json("/api/articles", ip, article.clone(), Some(&token)))
                .await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = h
            .send(post_json("/api/articles", "10.1.0.4", article.clone(), Some(&token)))
            .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(res).await["error"],
            "Session invalid - too many IP changes"
        );

        let res = h
            .send(post_json("/api/articles", "10.1.0.1", article, Some(&token)))
            .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await["error"], "Session expired");
    }

    #[tokio::test]
    async fn test_admin_article_lifecycle() {
        let h = harness();
        let ip = "10.2.0.1";
        let token = h.admin_token(ip).await;

        let res = h
            .send(post_json(
                "/api/articles",
                ip,
                json!({
                    "titleAr": "حقوق",
                    "contentAr": "محتوى",
                    "image": "https://cdn.example.org/cover.jpg",
                    "imagePosition": "30",
                }),
                None,
            ))
            .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = h
            .send(post_json(
                "/api/articles",
                ip,
                json!({
                    "titleAr": "حقوق",
                    "contentAr": "محتوى",
                    "image": "https://cdn.example.org/cover.jpg",
                    "imagePosition": "30",
                }),
                Some(&token),
            ))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let article = json_body(res).await;
        let id = article["_id"].as_str().unwrap().to_owned();
        assert_eq!(article["title"]["en"], "حقوق");
        assert_eq!(article["author"]["en"], "Anonymous");
        assert_eq!(article["imagePosition"], 30);
        assert_eq!(article["image"], "https://cdn.example.org/cover.jpg");

        let listed = json_body(h.get("/api/articles", ip).await).await;
        assert_eq!(listed[0]["_id"], id.as_str());

        for expected in 1..=2 {
            let res = h
                .post(&format!("/api/articles/{id}/like"), ip, json!({}))
                .await;
            assert_eq!(json_body(res).await["likes"], expected);
        }

        let res = h
            .post(&format!("/api/articles/{id}/comments"), ip, json!({"text": "شكرا"}))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["name"], "زائر");

        let delete = |uri: String| {
            Request::delete(uri)
                .header("x-forwarded-for", ip)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap()
        };
        let res = h.send(delete(format!("/api/articles/{id}"))).await;
        assert_eq!(json_body(res).await["success"], true);

        let res = h.send(delete(format!("/api/articles/{id}"))).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(res).await["error"], "Article not found");

        let res = h.send(delete("/api/articles/not-an-id".to_owned())).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], "Invalid article ID");
    }

    #[tokio::test]
    async fn test_upload_returns_data_url() {
        let h = harness();
        let ip = "10.3.0.1";
        let token = h.admin_token(ip).await;

        let upload = |mime: &str| {
            let body = format!(
                "--XBOUNDARY\r\n\
                 Content-Disposition: form-data; name=\"image\"; filename=\"a.png\"\r\n\
                 Content-Type: {mime}\r\n\r\n\
                 PNGDATA\r\n\
                 --XBOUNDARY--\r\n"
            );
            Request::post("/api/upload")
                .header("x-forwarded-for", ip)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
                .body(Body::from(body))
                .unwrap()
        };

        let res = h.send(upload("image/png")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(
            body["url"],
            format!("data:image/png;base64,{}", to_base64(b"PNGDATA"))
        );

        let res = h.send(upload("image/svg+xml")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await["error"],
            "نوع الملف غير مدعوم. الأنواع المسموحة: JPEG, PNG, GIF, WebP"
        );
    }

    #[tokio::test]
    async fn test_stats_and_fallbacks() {
        let h = harness();
        let ip = "198.51.100.7";

        let stats = json_body(h.get("/api/stats", ip).await).await;
        assert_eq!(stats, json!({"views": 150, "likes": 42}));
        let stats = json_body(h.post("/api/stats/like", ip, json!({})).await).await;
        assert_eq!(stats["likes"], 43);

        let res = h.get("/api/nope", ip).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(res).await["error"], "API endpoint not found");

        let res = h.get("/wp-admin/setup.php", ip).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(text(res).await, "Not Found");
    }

    #[tokio::test]
    async fn test_mutation_limit_per_path() {
        let h = harness();
        let ip = "198.51.100.8";

        for _ in 0..10 {
            let res = h.post("/api/stats/view", ip, json!({})).await;
            assert_eq!(res.status(), StatusCode::OK);
        }
        let res = h.post("/api/stats/view", ip, json!({})).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            json_body(res).await["error"],
            "Too many submissions, please wait a moment."
        );

        let res = h.post("/api/stats/like", ip, json!({})).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sweep_evicts_expired_records() {
        let h = harness();
        h.solved_captcha("198.51.100.9").await;
        h.admin_token("198.51.100.9").await;
        let _ = h.login("nope", "198.51.100.10").await;

        h.clock.advance(Duration::from_secs(25 * 3600));
        let summary = sweep_once(&h.state).await;
        assert_eq!(summary.captchas, 1);
        assert_eq!(summary.sessions, 1);
        assert_eq!(summary.shield.reputation, 1);
        assert!(summary.total() >= 3);
    }
}
