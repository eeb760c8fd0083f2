use crate::common::{TestApp, content, routes};
use serde_json::json;

mod banner_creation {
    use super::*;

    #[tokio::test]
    async fn admin_can_create_a_banner() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;

        let res = app
            .post_with_token(
                routes::BANNERS,
                &json!({
                    "tag_ids": [5, 7],
                    "feature_id": 1,
                    "content": content("spring"),
                    "is_active": true,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["banner_id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn created_banner_shows_up_in_listing() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;

        let id = app.create_banner(&token, 1, &[7, 5], content("spring")).await;

        let res = app.get_with_token(routes::BANNERS, &token).await;
        assert_eq!(res.status, 200);
        let banners = res.body.as_array().unwrap();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0]["banner_id"], id);
        assert_eq!(banners[0]["feature_id"], 1);
        assert_eq!(banners[0]["tag_ids"], json!([5, 7]));
        assert_eq!(banners[0]["content"], content("spring"));
        assert_eq!(banners[0]["is_active"], true);
    }

    #[tokio::test]
    async fn is_active_defaults_to_true() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;

        let res = app
            .post_with_token(
                routes::BANNERS,
                &json!({
                    "tag_ids": [1],
                    "feature_id": 1,
                    "content": content("a"),
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let list = app.get_with_token(routes::BANNERS, &token).await;
        assert_eq!(list.body[0]["is_active"], true);
    }

    #[tokio::test]
    async fn banner_without_tags_is_allowed() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;

        let id = app.create_banner(&token, 3, &[], content("bare")).await;

        let res = app.get_with_token(routes::BANNERS, &token).await;
        assert_eq!(res.body[0]["banner_id"], id);
        assert_eq!(res.body[0]["tag_ids"], json!([]));
    }

    #[tokio::test]
    async fn rejects_non_object_content() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;

        let res = app
            .post_with_token(
                routes::BANNERS,
                &json!({
                    "tag_ids": [1],
                    "feature_id": 1,
                    "content": "just a string",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_missing_feature_id() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;

        let res = app
            .post_with_token(
                routes::BANNERS,
                &json!({ "tag_ids": [1], "content": content("a") }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let app = TestApp::spawn().await;
        let token = app.create_user(false).await;

        let res = app
            .post_with_token(
                routes::BANNERS,
                &json!({ "tag_ids": [1], "feature_id": 1, "content": content("a") }),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::BANNERS,
                &json!({ "tag_ids": [1], "feature_id": 1, "content": content("a") }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_token(
                routes::BANNERS,
                &json!({ "tag_ids": [1], "feature_id": 1, "content": content("a") }),
                "not-a-jwt",
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod banner_listing {
    use super::*;

    /// Banners A(f=1,{1}), B(f=1,{2}) and C(f=2,{1}).
    async fn seed(app: &TestApp, token: &str) -> (i32, i32, i32) {
        let a = app.create_banner(token, 1, &[1], content("a")).await;
        let b = app.create_banner(token, 1, &[2], content("b")).await;
        let c = app.create_banner(token, 2, &[1], content("c")).await;
        (a, b, c)
    }

    #[tokio::test]
    async fn filters_by_feature_and_tag() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let (a, _, _) = seed(&app, &token).await;

        let res = app
            .get_with_token(&format!("{}?feature_id=1&tag_id=1", routes::BANNERS), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.banner_ids(), vec![a]);
    }

    #[tokio::test]
    async fn filters_by_tag_only() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let (a, _, c) = seed(&app, &token).await;

        let res = app
            .get_with_token(&format!("{}?tag_id=1", routes::BANNERS), &token)
            .await;

        assert_eq!(res.banner_ids(), vec![a, c]);
    }

    #[tokio::test]
    async fn filters_by_feature_only() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let (a, b, _) = seed(&app, &token).await;

        let res = app
            .get_with_token(&format!("{}?feature_id=1", routes::BANNERS), &token)
            .await;

        assert_eq!(res.banner_ids(), vec![a, b]);
    }

    #[tokio::test]
    async fn no_filter_returns_everything_in_id_order() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let (a, b, c) = seed(&app, &token).await;

        let res = app.get_with_token(routes::BANNERS, &token).await;

        assert_eq!(res.banner_ids(), vec![a, b, c]);
    }

    #[tokio::test]
    async fn paginates_with_limit_and_offset() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let (_, b, c) = seed(&app, &token).await;

        let res = app
            .get_with_token(&format!("{}?limit=2&offset=1", routes::BANNERS), &token)
            .await;
        assert_eq!(res.banner_ids(), vec![b, c]);

        let res = app
            .get_with_token(&format!("{}?limit=1", routes::BANNERS), &token)
            .await;
        assert_eq!(res.banner_ids().len(), 1);

        let res = app
            .get_with_token(&format!("{}?offset=1", routes::BANNERS), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.banner_ids(), vec![b, c]);
    }

    #[tokio::test]
    async fn unknown_tag_yields_empty_list() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        seed(&app, &token).await;

        let res = app
            .get_with_token(&format!("{}?tag_id=999", routes::BANNERS), &token)
            .await;

        assert_eq!(res.status, 200);
        assert!(res.banner_ids().is_empty());
    }

    #[tokio::test]
    async fn rejects_negative_limit() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;

        let res = app
            .get_with_token(&format!("{}?limit=-1", routes::BANNERS), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let app = TestApp::spawn().await;
        let token = app.create_user(false).await;

        let res = app.get_with_token(routes::BANNERS, &token).await;

        assert_eq!(res.status, 403);
    }
}

mod banner_update {
    use super::*;

    #[tokio::test]
    async fn replaces_the_tag_set() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let id = app.create_banner(&token, 1, &[5, 7], content("a")).await;

        let res = app
            .patch_with_token(&routes::banner(id), &json!({ "tag_ids": [9] }), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let list = app.get_with_token(routes::BANNERS, &token).await;
        assert_eq!(list.body[0]["tag_ids"], json!([9]));
    }

    #[tokio::test]
    async fn updates_only_the_given_fields() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let id = app.create_banner(&token, 1, &[5], content("a")).await;

        let res = app
            .patch_with_token(
                &routes::banner(id),
                &json!({ "is_active": false, "content": content("b") }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200);

        let list = app.get_with_token(routes::BANNERS, &token).await;
        let banner = &list.body[0];
        assert_eq!(banner["feature_id"], 1);
        assert_eq!(banner["tag_ids"], json!([5]));
        assert_eq!(banner["content"], content("b"));
        assert_eq!(banner["is_active"], false);
    }

    #[tokio::test]
    async fn empty_tag_list_keeps_existing_tags() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let id = app.create_banner(&token, 1, &[5, 7], content("a")).await;

        let res = app
            .patch_with_token(&routes::banner(id), &json!({ "tag_ids": [] }), &token)
            .await;
        assert_eq!(res.status, 200);

        let list = app.get_with_token(routes::BANNERS, &token).await;
        assert_eq!(list.body[0]["tag_ids"], json!([5, 7]));
    }

    #[tokio::test]
    async fn empty_payload_still_touches_updated_at() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let id = app.create_banner(&token, 1, &[5], content("a")).await;

        let before = app.get_with_token(routes::BANNERS, &token).await.body[0]["updated_at"]
            .as_str()
            .unwrap()
            .parse::<chrono::DateTime<chrono::Utc>>()
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let res = app
            .patch_with_token(&routes::banner(id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 200);

        let after = app.get_with_token(routes::BANNERS, &token).await.body[0]["updated_at"]
            .as_str()
            .unwrap()
            .parse::<chrono::DateTime<chrono::Utc>>()
            .unwrap();
        assert!(after > before);
    }

    #[tokio::test]
    async fn returns_404_for_missing_banner() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;

        let res = app
            .patch_with_token(&routes::banner(4242), &json!({ "is_active": false }), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn rejects_array_content() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let id = app.create_banner(&token, 1, &[5], content("a")).await;

        let res = app
            .patch_with_token(&routes::banner(id), &json!({ "content": [1, 2] }), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let app = TestApp::spawn().await;
        let admin = app.create_user(true).await;
        let user = app.create_user(false).await;
        let id = app.create_banner(&admin, 1, &[5], content("a")).await;

        let res = app
            .patch_with_token(&routes::banner(id), &json!({ "is_active": false }), &user)
            .await;

        assert_eq!(res.status, 403);
    }
}

mod banner_deletion {
    use super::*;

    #[tokio::test]
    async fn deletes_an_existing_banner() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let id = app.create_banner(&token, 1, &[5], content("a")).await;

        let res = app.delete_with_token(&routes::banner(id), &token).await;
        assert_eq!(res.status, 204);

        let list = app.get_with_token(routes::BANNERS, &token).await;
        assert!(list.banner_ids().is_empty());

        let by_tag = app
            .get_with_token(&format!("{}?tag_id=5", routes::BANNERS), &token)
            .await;
        assert!(by_tag.banner_ids().is_empty());
    }

    #[tokio::test]
    async fn second_delete_returns_404() {
        let app = TestApp::spawn().await;
        let token = app.create_user(true).await;
        let id = app.create_banner(&token, 1, &[5], content("a")).await;

        let first = app.delete_with_token(&routes::banner(id), &token).await;
        assert_eq!(first.status, 204);

        let second = app.delete_with_token(&routes::banner(id), &token).await;
        assert_eq!(second.status, 404);
        assert_eq!(second.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let app = TestApp::spawn().await;
        let admin = app.create_user(true).await;
        let user = app.create_user(false).await;
        let id = app.create_banner(&admin, 1, &[5], content("a")).await;

        let res = app.delete_with_token(&routes::banner(id), &user).await;

        assert_eq!(res.status, 403);
    }
}
