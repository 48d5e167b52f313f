//! End-to-end snapshot behavior against an in-memory hub.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use hubkit::effects::mock::{Method, MockHttpClient};
use hubkit::{
    AggregateProgress, Error, HubClient, HubOptions, Repository, TransferCallback, TransferMode,
    TransferProgress,
};
use serde_json::json;
use tempfile::TempDir;

const ENDPOINT: &str = "https://hub.test";

struct Fixture {
    _dir: TempDir,
    http: Arc<MockHttpClient>,
    client: HubClient<MockHttpClient>,
}

fn fixture(options: impl FnOnce(HubOptions) -> HubOptions) -> Fixture {
    let dir = tempfile::Builder::new()
        .prefix("hubkit-test-")
        .tempdir()
        .expect("Failed to create temp dir");
    let http = Arc::new(MockHttpClient::new());
    let options = options(HubOptions::default().endpoint(ENDPOINT).download_base(dir.path()));
    let client = HubClient::with_shared_client(Arc::clone(&http), options);
    Fixture {
        _dir: dir,
        http,
        client,
    }
}

fn serve_repo(http: &MockHttpClient, id: &str, files: &[&str]) {
    let siblings: Vec<_> = files.iter().map(|f| json!({ "rfilename": f })).collect();
    http.respond_json(
        format!("{ENDPOINT}/api/models/{id}"),
        &json!({ "id": id, "siblings": siblings }),
    );
    for file in files {
        http.respond_chunked(
            format!("{ENDPOINT}/{id}/resolve/main/{file}"),
            format!("contents of {file}").repeat(8),
            16,
        );
    }
}

fn recorder() -> (
    Arc<Mutex<Vec<AggregateProgress>>>,
    impl Fn(&AggregateProgress) + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |p: &AggregateProgress| sink.lock().unwrap().push(*p))
}

fn assert_monotonic_and_complete_once(updates: &[AggregateProgress]) {
    assert!(!updates.is_empty());
    for pair in updates.windows(2) {
        assert!(pair[1].completed >= pair[0].completed, "progress went backwards: {pair:?}");
    }
    for update in updates {
        assert!(update.completed <= update.total);
    }
    let complete: Vec<_> = updates.iter().filter(|p| p.is_complete()).collect();
    assert_eq!(complete.len(), 1, "completion reported more than once");
    assert!(updates.last().unwrap().is_complete());
}

#[tokio::test]
async fn json_pattern_selects_only_json_files() {
    let fx = fixture(|o| o);
    serve_repo(&fx.http, "owner/name", &["config.json", "model.bin", "vocab.json"]);

    let selected: BTreeSet<_> = fx
        .client
        .select_files("owner/name", "*.json")
        .await
        .unwrap()
        .into_iter()
        .collect();

    assert_eq!(
        selected,
        BTreeSet::from(["config.json".to_string(), "vocab.json".to_string()])
    );
}

#[tokio::test]
async fn snapshot_downloads_every_listed_file_without_patterns() {
    let fx = fixture(|o| o);
    let files: Vec<String> = (0..16).map(|i| format!("shard-{i:02}.bin")).collect();
    let names: Vec<&str> = files.iter().map(String::as_str).collect();
    serve_repo(&fx.http, "owner/big", &names);

    let (seen, on_progress) = recorder();
    let root = fx
        .client
        .snapshot_with_progress("owner/big", (), on_progress)
        .await
        .unwrap();

    assert_eq!(root, fx.client.repo_root("owner/big").unwrap());
    for file in &files {
        let path = root.join(file);
        assert!(path.exists(), "{} missing", path.display());
    }
    assert_eq!(fx.http.request_count(Method::Stream), 16);

    let updates = seen.lock().unwrap();
    let last = updates.last().unwrap();
    assert_eq!(last.total, 1600);
    assert_eq!(last.completed, last.total);
    assert_monotonic_and_complete_once(&updates);
}

#[tokio::test]
async fn snapshot_writes_file_contents_under_kind_and_id() {
    let fx = fixture(|o| o);
    serve_repo(&fx.http, "owner/name", &["config.json", "nested/dir/weights.bin"]);

    fx.client.snapshot("owner/name", ()).await.unwrap();

    let nested = fx.client.local_path("owner/name", "nested/dir/weights.bin").unwrap();
    assert!(nested.ends_with("weights.bin"));
    assert!(nested.starts_with(fx.client.options().download_base.join("models")));
    assert_eq!(
        std::fs::read_to_string(nested).unwrap(),
        "contents of nested/dir/weights.bin".repeat(8)
    );
}

#[tokio::test]
async fn rerunning_a_completed_snapshot_only_fetches_metadata() {
    let fx = fixture(|o| o);
    serve_repo(&fx.http, "owner/name", &["config.json", "model.bin", "vocab.json"]);

    fx.client.snapshot("owner/name", ()).await.unwrap();
    fx.http.clear_requests();

    let (seen, on_progress) = recorder();
    fx.client
        .snapshot_with_progress("owner/name", (), on_progress)
        .await
        .unwrap();

    assert_eq!(fx.http.request_count(Method::Stream), 0);
    assert_eq!(fx.http.request_count(Method::Get), 1);

    let updates = seen.lock().unwrap();
    assert_monotonic_and_complete_once(&updates);
    assert_eq!(
        updates.iter().map(|p| p.completed).collect::<Vec<_>>(),
        vec![100, 200, 300]
    );
}

#[tokio::test]
async fn empty_selection_reports_completion_once() {
    let fx = fixture(|o| o);
    serve_repo(&fx.http, "owner/name", &["model.bin"]);

    let (seen, on_progress) = recorder();
    fx.client
        .snapshot_with_progress("owner/name", "*.json", on_progress)
        .await
        .unwrap();

    assert_eq!(fx.http.request_count(Method::Stream), 0);
    assert_eq!(*seen.lock().unwrap(), vec![AggregateProgress::default()]);
}

#[tokio::test]
async fn first_failure_aborts_and_keeps_earlier_files() {
    let fx = fixture(|o| o);
    serve_repo(&fx.http, "owner/name", &["a.json", "b.json", "c.json"]);
    fx.http.fail_mid_stream(
        format!("{ENDPOINT}/owner/name/resolve/main/b.json"),
        "partial body that never finishes",
        4,
        2,
    );

    let err = fx
        .client
        .snapshot("owner/name", ["a.json", "b.json", "c.json"])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)), "unexpected error: {err:?}");
    assert!(fx.client.local_path("owner/name", "a.json").unwrap().exists());
    assert!(!fx.client.local_path("owner/name", "b.json").unwrap().exists());
    assert!(!fx.client.local_path("owner/name", "c.json").unwrap().exists());

    let requested: Vec<_> = fx
        .http
        .requests()
        .into_iter()
        .filter(|r| r.method == Method::Stream)
        .map(|r| r.url)
        .collect();
    assert!(requested.iter().all(|url| !url.ends_with("c.json")));

    // No staging files are left behind next to the destination.
    let dir = fx.client.repo_root("owner/name").unwrap();
    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn resumed_snapshot_skips_completed_files() {
    let fx = fixture(|o| o);
    serve_repo(&fx.http, "owner/name", &["a.json", "b.json"]);
    let b_url = format!("{ENDPOINT}/owner/name/resolve/main/b.json");
    fx.http.respond(b_url.clone(), 503, "unavailable");

    let err = fx.client.snapshot("owner/name", ()).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus(503)));

    fx.http.respond(b_url.clone(), 200, "recovered");
    fx.http.clear_requests();
    fx.client.snapshot("owner/name", ()).await.unwrap();

    let streamed: Vec<_> = fx
        .http
        .requests()
        .into_iter()
        .filter(|r| r.method == Method::Stream)
        .map(|r| r.url)
        .collect();
    assert_eq!(streamed, vec![b_url]);
}

#[tokio::test]
async fn missing_file_maps_to_authorization_required() {
    let fx = fixture(|o| o);
    fx.http.respond_json(
        format!("{ENDPOINT}/api/models/owner/name"),
        &json!({ "siblings": [{ "rfilename": "gone.bin" }] }),
    );

    let err = fx.client.snapshot("owner/name", ()).await.unwrap_err();
    assert!(matches!(err, Error::AuthorizationRequired));
}

#[tokio::test]
async fn fetch_skips_present_file_without_request_or_callback() {
    let fx = fixture(|o| o);
    let path = fx.client.local_path("owner/name", "config.json").unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{}").unwrap();

    let calls = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&calls);
    let on_progress: TransferCallback = Arc::new(move |_: &TransferProgress| *counter.lock().unwrap() += 1);

    let fetched = fx
        .client
        .fetch_file("owner/name", "config.json", on_progress)
        .await
        .unwrap();

    assert_eq!(fetched, path);
    assert!(fx.http.requests().is_empty());
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn fetch_reports_fractions_then_completion() {
    let fx = fixture(|o| o);
    fx.http.respond_chunked(
        format!("{ENDPOINT}/owner/name/resolve/main/model.bin"),
        vec![7u8; 100],
        25,
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let on_progress: TransferCallback =
        Arc::new(move |p: &TransferProgress| sink.lock().unwrap().push(p.clone()));

    fx.client
        .fetch_file("owner/name", "model.bin", on_progress)
        .await
        .unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            TransferProgress::InProgress(0.0),
            TransferProgress::InProgress(0.25),
            TransferProgress::InProgress(0.5),
            TransferProgress::InProgress(0.75),
            TransferProgress::InProgress(1.0),
            TransferProgress::Completed,
        ]
    );
}

#[tokio::test]
async fn fetch_failure_reports_failed_state() {
    let fx = fixture(|o| o);
    fx.http.fail(
        format!("{ENDPOINT}/owner/name/resolve/main/model.bin"),
        "dns failure",
    );

    let last = Arc::new(Mutex::new(TransferProgress::NotStarted));
    let sink = Arc::clone(&last);
    let on_progress: TransferCallback =
        Arc::new(move |p: &TransferProgress| *sink.lock().unwrap() = p.clone());

    let err = fx
        .client
        .fetch_file("owner/name", "model.bin", on_progress)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(ref msg) if msg == "dns failure"));
    assert!(matches!(*last.lock().unwrap(), TransferProgress::Failed(_)));
}

#[tokio::test]
async fn unsized_bodies_still_complete() {
    let fx = fixture(|o| o);
    fx.http.respond_json(
        format!("{ENDPOINT}/api/models/owner/name"),
        &json!({ "siblings": [{ "rfilename": "stream.bin" }] }),
    );
    fx.http.respond_unsized(
        format!("{ENDPOINT}/owner/name/resolve/main/stream.bin"),
        vec![1u8; 64],
        8,
    );

    let (seen, on_progress) = recorder();
    fx.client
        .snapshot_with_progress("owner/name", (), on_progress)
        .await
        .unwrap();

    let updates = seen.lock().unwrap();
    assert_monotonic_and_complete_once(&updates);
    assert!(updates[..updates.len() - 1].iter().all(|p| p.completed == 0));
}

#[tokio::test]
async fn background_transfers_complete() {
    let fx = fixture(|o| o.transfer_mode(TransferMode::Background));
    serve_repo(&fx.http, "owner/name", &["config.json", "model.bin"]);

    let (seen, on_progress) = recorder();
    fx.client
        .snapshot_with_progress("owner/name", (), on_progress)
        .await
        .unwrap();

    assert!(fx.client.local_path("owner/name", "model.bin").unwrap().exists());
    assert_monotonic_and_complete_once(&seen.lock().unwrap());
}

#[tokio::test]
async fn dataset_snapshot_uses_kind_segment() {
    let fx = fixture(|o| o);
    fx.http.respond_json(
        format!("{ENDPOINT}/api/datasets/owner/data"),
        &json!({ "siblings": [{ "rfilename": "train.csv" }] }),
    );
    fx.http.respond(
        format!("{ENDPOINT}/datasets/owner/data/resolve/main/train.csv"),
        200,
        "a,b\n1,2\n",
    );

    let repo = Repository::dataset("owner/data");
    let root = fx.client.snapshot(&repo, ()).await.unwrap();

    assert!(root.ends_with("datasets/owner/data"));
    assert_eq!(
        std::fs::read_to_string(root.join("train.csv")).unwrap(),
        "a,b\n1,2\n"
    );
}

#[tokio::test]
async fn token_is_sent_with_metadata_and_downloads() {
    let fx = fixture(|o| o.token("secret"));
    serve_repo(&fx.http, "owner/private", &["config.json"]);

    fx.client.snapshot("owner/private", ()).await.unwrap();

    let requests = fx.http.requests();
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert_eq!(request.header("authorization"), Some("Bearer secret"));
    }
}

#[tokio::test]
async fn downloaded_config_can_be_loaded() {
    let fx = fixture(|o| o);
    fx.http.respond_json(
        format!("{ENDPOINT}/api/models/owner/name"),
        &json!({ "siblings": [{ "rfilename": "config.json" }] }),
    );
    fx.http.respond_json(
        format!("{ENDPOINT}/owner/name/resolve/main/config.json"),
        &json!({ "model_type": "bert", "hidden_size": 768 }),
    );

    fx.client.snapshot("owner/name", "config.json").await.unwrap();
    let config = fx.client.load_config("owner/name", "config.json").unwrap();

    assert_eq!(config.get_str("modelType"), Some("bert"));
    assert_eq!(config.get_u64("hidden_size"), Some(768));
}

#[tokio::test]
async fn listed_names_cannot_escape_the_download_base() {
    let outer = tempfile::Builder::new()
        .prefix("hubkit-test-")
        .tempdir()
        .expect("Failed to create temp dir");
    let base = outer.path().join("base");
    let http = Arc::new(MockHttpClient::new());
    let client = HubClient::with_shared_client(
        Arc::clone(&http),
        HubOptions::default().endpoint(ENDPOINT).download_base(&base),
    );

    http.respond_json(
        format!("{ENDPOINT}/api/models/owner/name"),
        &json!({ "siblings": [{ "rfilename": "ok.json" }, { "rfilename": "../../../../escaped.txt" }] }),
    );
    http.respond(format!("{ENDPOINT}/owner/name/resolve/main/ok.json"), 200, "{}");
    http.respond(
        format!("{ENDPOINT}/owner/name/resolve/main/../../../../escaped.txt"),
        200,
        "pwned",
    );

    let err = client.snapshot("owner/name", ()).await.unwrap_err();

    assert!(matches!(err, Error::InvalidPath(ref p) if p == "../../../../escaped.txt"), "{err:?}");
    assert!(!outer.path().join("escaped.txt").exists());
    assert!(!base.join("models").join("owner").join("name").join("ok.json").exists());
    assert_eq!(http.request_count(Method::Stream), 0);
}

#[tokio::test]
async fn escaping_name_fails_single_fetch_with_failed_state() {
    let fx = fixture(|o| o);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let on_progress: TransferCallback =
        Arc::new(move |p: &TransferProgress| sink.lock().unwrap().push(p.clone()));

    let err = fx
        .client
        .fetch_file("owner/name", "../outside.bin", on_progress)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidPath(_)));
    assert!(fx.http.requests().is_empty());
    assert!(matches!(events.lock().unwrap().as_slice(), [TransferProgress::Failed(_)]));
}

#[tokio::test]
async fn reserved_url_characters_in_names_are_encoded() {
    let fx = fixture(|o| o);
    fx.http.respond_json(
        format!("{ENDPOINT}/api/models/owner/name"),
        &json!({ "siblings": [{ "rfilename": "c#/a b?.json" }] }),
    );
    fx.http.respond(
        format!("{ENDPOINT}/owner/name/resolve/main/c%23/a%20b%3F.json"),
        200,
        "{\"ok\": true}",
    );

    fx.client.snapshot("owner/name", "c#/*").await.unwrap();

    let path = fx.client.local_path("owner/name", "c#/a b?.json").unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), "{\"ok\": true}");
}

#[cfg(unix)]
#[tokio::test]
async fn unusable_destination_directory_reports_failed_state() {
    let fx = fixture(|o| o);
    // A dangling symlink where the repository directory should be: the file
    // does not exist, but its parent cannot be created.
    let root = fx.client.repo_root("owner/name").unwrap();
    std::fs::create_dir_all(root.parent().unwrap()).unwrap();
    std::os::unix::fs::symlink(root.with_file_name("missing-target"), &root).unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let on_progress: TransferCallback =
        Arc::new(move |p: &TransferProgress| sink.lock().unwrap().push(p.clone()));

    let err = fx
        .client
        .fetch_file("owner/name", "config.json", on_progress)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)), "{err:?}");
    assert!(fx.http.requests().is_empty());
    assert!(matches!(events.lock().unwrap().as_slice(), [TransferProgress::Failed(_)]));
}
