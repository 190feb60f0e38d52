use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Server};
use searchfill_core::{
    FieldConfig, FieldDriver, FieldEvent, FormConfig, FormHost, MemoryField, MemoryForm,
    RecordingView, SearchableField,
};
use searchfill_remote::SuggestionClient;

const FORM: &str = r#"
[[field]]
name = "projectName"
fill_url = "/fillProjectNameItems"
fill_depends_on = "serverId projectName"
debounce_ms = 20

[[field]]
name = "repositoryName"
fill_url = "/fillRepositoryNameItems"
fill_depends_on = "serverId projectName repositoryName"
method = "get"
mode = { kind = "map", value_identifier = "slug", value_field = "repo-slug" }
"#;

fn form() -> MemoryForm {
    MemoryForm::new()
        .with_field(MemoryField::new("serverId").value("1"))
        .with_field(MemoryField::new("projectName").depends_on("serverId projectName"))
        .with_field(
            MemoryField::new("repositoryName").depends_on("serverId projectName repositoryName"),
        )
        .with_field(MemoryField::new("repositorySlug").id("repo-slug"))
}

fn field(config: &FormConfig, name: &str) -> SearchableField {
    SearchableField::from_config(config.field(name).unwrap().clone()).unwrap()
}

#[tokio::test]
async fn test_project_suggestions_and_blur_cascade() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/fillProjectNameItems")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("serverId".into(), "1".into()),
            Matcher::UrlEncoded("projectName".into(), "pro".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "ok", "data": [{"name": "Project 1"}, {"name": "Project 2"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let config = FormConfig::from_toml_str(FORM).unwrap();
    let client = Arc::new(SuggestionClient::new(&server.url()).unwrap());
    let mut host = form();
    let repo = host.field("repositoryName").unwrap();
    host.set_value(&repo, "stale-repo");
    let mut driver = FieldDriver::new(field(&config, "projectName"), client, host, RecordingView::new());

    driver.type_text("p").unwrap();
    driver.type_text("pr").unwrap();
    driver.type_text("pro").unwrap();
    driver.step().await.unwrap().unwrap();
    driver.step().await.unwrap().unwrap();

    assert_eq!(driver.field().current_labels(), vec!["Project 1", "Project 2"]);
    assert_eq!(driver.view().visible(), ["Project 1", "Project 2"]);

    driver.dispatch(FieldEvent::Blur).unwrap();

    assert!(driver.field().store().is_empty());
    let host = driver.host();
    let project = host.field("projectName").unwrap();
    assert_eq!(host.value(&repo).as_deref(), Some(""));
    assert_eq!(host.change_count(&repo), 1);
    assert_eq!(host.change_count(&project), 1);
}

#[tokio::test]
async fn test_repository_label_resolves_to_slug() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/fillRepositoryNameItems")
        .match_query(Matcher::UrlEncoded("repositoryName".into(), "my".into()))
        .with_status(200)
        .with_body(
            r#"{"data": {"values": [
                {"name": "My Repo", "slug": "my-repo"},
                {"name": "My Other", "slug": "my-other"}
            ]}}"#,
        )
        .create_async()
        .await;

    let config = FormConfig::from_toml_str(FORM).unwrap();
    let client = Arc::new(SuggestionClient::new(&server.url()).unwrap());
    let mut driver = FieldDriver::new(
        field(&config, "repositoryName"),
        client,
        form(),
        RecordingView::new(),
    );

    driver.type_text("my").unwrap();
    driver.step().await.unwrap().unwrap();
    assert_eq!(driver.field().current_labels(), vec!["My Repo", "My Other"]);

    let name = driver.host().field("repositoryName").unwrap();
    driver.host_mut().set_value(&name, "My Repo");
    driver.dispatch(FieldEvent::Change).unwrap();
    let slug = driver.host().field_by_id("repo-slug").unwrap();
    assert_eq!(driver.host().value(&slug).as_deref(), Some("my-repo"));

    driver.host_mut().set_value(&name, "typed-by-hand");
    driver.dispatch(FieldEvent::Change).unwrap();
    assert_eq!(driver.host().value(&slug).as_deref(), Some("typed-by-hand"));
}

#[tokio::test]
async fn test_server_error_empties_list_suggestions() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("POST", "/search")
        .match_body(Matcher::UrlEncoded("q".into(), "good".into()))
        .with_status(200)
        .with_body(r#"{"data": [{"name": "Good"}]}"#)
        .create_async()
        .await;
    let _err = server
        .mock("POST", "/search")
        .match_body(Matcher::UrlEncoded("q".into(), "bad".into()))
        .with_status(500)
        .create_async()
        .await;

    let config = FieldConfig::list("q", "/search")
        .depends_on("q")
        .with_debounce(Duration::from_millis(10));
    let host = MemoryForm::new().with_field(MemoryField::new("q"));
    let client = Arc::new(SuggestionClient::new(&server.url()).unwrap());
    let mut driver = FieldDriver::new(
        SearchableField::from_config(config).unwrap(),
        client,
        host,
        RecordingView::new(),
    );

    driver.type_text("good").unwrap();
    driver.step().await.unwrap().unwrap();
    driver.step().await.unwrap().unwrap();
    assert_eq!(driver.field().current_labels(), vec!["Good"]);

    driver.type_text("bad").unwrap();
    driver.step().await.unwrap().unwrap();
    driver.step().await.unwrap().unwrap();
    assert!(driver.field().store().is_empty());
    assert!(driver.view().visible().is_empty());
}
