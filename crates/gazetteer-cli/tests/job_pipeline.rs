use async_trait::async_trait;
use gazetteer_browser::PageFetcher;
use gazetteer_cli::{FAILURE_PREFIX, Job, JobError};
use gazetteer_cloud::{ObjectStore, TopicPublisher};
use gazetteer_core::export::read_records;
use gazetteer_core::{CsvRecord, JobConfig, ScrapedData};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

struct StubFetcher {
    result: Mutex<Option<gazetteer_browser::Result<ScrapedData>>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    fn returning(names: &[&str]) -> Self {
        Self::with(Ok(ScrapedData {
            title: "Countries of the World".to_string(),
            country_names: names.iter().map(|n| n.to_string()).collect(),
        }))
    }

    fn failing(err: gazetteer_browser::Error) -> Self {
        Self::with(Err(err))
    }

    fn with(result: gazetteer_browser::Result<ScrapedData>) -> Self {
        Self {
            result: Mutex::new(Some(result)),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> gazetteer_browser::Result<ScrapedData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .lock()
            .unwrap()
            .take()
            .expect("fetch called more than once")
    }
}

#[derive(Default)]
struct StubStore {
    fail: bool,
    puts: Mutex<Vec<(String, String, Vec<u8>)>>,
}

#[async_trait]
impl ObjectStore for StubStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> gazetteer_cloud::Result<()> {
        self.puts
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string(), body));
        if self.fail {
            return Err(gazetteer_cloud::Error::Storage("service unavailable".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct StubPublisher {
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl TopicPublisher for StubPublisher {
    async fn publish(&self, topic: &str, text: &str) -> gazetteer_cloud::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((topic.to_string(), text.to_string()));
        if self.fail {
            return Err(gazetteer_cloud::Error::PubSub("permission denied".to_string()));
        }
        Ok(())
    }
}

fn config(data_dir: &Path) -> JobConfig {
    JobConfig {
        entry_url: "https://www.scrapethissite.com/pages/simple/".to_string(),
        topic: "job-alerts".to_string(),
        bucket: "country-data".to_string(),
        data_dir: data_dir.to_path_buf(),
    }
}

#[tokio::test]
async fn test_successful_run_uploads_csv_in_page_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let fetcher = StubFetcher::returning(&["Andorra", "United Arab Emirates", "Afghanistan"]);
    let store = StubStore::default();
    let publisher = StubPublisher::default();

    let report = Job::new(&config, &fetcher, &store, &publisher)
        .run()
        .await
        .expect("job should succeed");

    assert_eq!(report.rows, 3);
    assert_eq!(report.title, "Countries of the World");
    assert!(report.filename.ends_with(".csv"));
    assert!(report.target.key.starts_with("raw/"));
    assert!(report.target.key.ends_with(&format!("/{}", report.filename)));

    let records = read_records(&dir.path().join(&report.filename)).unwrap();
    assert_eq!(
        records,
        vec![
            CsvRecord::new("Andorra"),
            CsvRecord::new("United Arab Emirates"),
            CsvRecord::new("Afghanistan"),
        ]
    );

    let puts = store.puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].0, "country-data");
    assert_eq!(puts[0].1, report.target.key);
    assert_eq!(
        String::from_utf8(puts[0].2.clone()).unwrap(),
        "Country\nAndorra\nUnited Arab Emirates\nAfghanistan\n"
    );

    assert!(publisher.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_supplied_filename_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let fetcher = StubFetcher::returning(&["Chad"]);
    let store = StubStore::default();
    let publisher = StubPublisher::default();

    let report = Job::new(&config, &fetcher, &store, &publisher)
        .with_filename(Some("countries.csv".to_string()))
        .run()
        .await
        .unwrap();

    assert_eq!(report.filename, "countries.csv");
    assert!(dir.path().join("countries.csv").is_file());
    assert!(report.target.key.ends_with("/countries.csv"));
}

#[tokio::test]
async fn test_navigation_failure_notifies_once_and_skips_upload() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let fetcher = StubFetcher::failing(gazetteer_browser::Error::Navigation(
        "net::ERR_NAME_NOT_RESOLVED".to_string(),
    ));
    let store = StubStore::default();
    let publisher = StubPublisher::default();

    let err = Job::new(&config, &fetcher, &store, &publisher)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Fetch(_)));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert!(store.puts.lock().unwrap().is_empty());

    let sent = publisher.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "job-alerts");
    assert!(sent[0].1.starts_with(FAILURE_PREFIX));
    assert!(sent[0].1.contains("ERR_NAME_NOT_RESOLVED"));
}

#[tokio::test]
async fn test_notifier_failure_keeps_original_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let fetcher = StubFetcher::failing(gazetteer_browser::Error::Extraction(
        "page did not yield a title".to_string(),
    ));
    let store = StubStore::default();
    let publisher = StubPublisher {
        fail: true,
        ..Default::default()
    };

    let err = Job::new(&config, &fetcher, &store, &publisher)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Fetch(gazetteer_browser::Error::Extraction(_))));
    assert_eq!(publisher.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_failure_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let fetcher = StubFetcher::returning(&["Fiji"]);
    let store = StubStore {
        fail: true,
        ..Default::default()
    };
    let publisher = StubPublisher::default();

    let err = Job::new(&config, &fetcher, &store, &publisher)
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "upload");
    assert_eq!(store.puts.lock().unwrap().len(), 1);

    let sent = publisher.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("\"stage\":\"upload\""));
    assert!(sent[0].1.contains("service unavailable"));
}

#[tokio::test]
async fn test_export_failure_notifies_without_upload() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the data directory should be
    let blocker = dir.path().join("data");
    std::fs::write(&blocker, "not a directory").unwrap();

    let config = config(&blocker);
    let fetcher = StubFetcher::returning(&["Peru"]);
    let store = StubStore::default();
    let publisher = StubPublisher::default();

    let err = Job::new(&config, &fetcher, &store, &publisher)
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "export");
    assert!(store.puts.lock().unwrap().is_empty());
    assert_eq!(publisher.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_page_uploads_header_only_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let fetcher = StubFetcher::returning(&[]);
    let store = StubStore::default();
    let publisher = StubPublisher::default();

    let report = Job::new(&config, &fetcher, &store, &publisher)
        .run()
        .await
        .unwrap();

    assert_eq!(report.rows, 0);
    let puts = store.puts.lock().unwrap();
    assert_eq!(puts[0].2, b"Country\n".to_vec());
}

#[tokio::test]
async fn test_filename_outside_data_dir_fails_export() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let config = config(&data_dir);
    let fetcher = StubFetcher::returning(&["Chad"]);
    let store = StubStore::default();
    let publisher = StubPublisher::default();

    let err = Job::new(&config, &fetcher, &store, &publisher)
        .with_filename(Some("../escape.csv".to_string()))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "export");
    assert!(!dir.path().join("escape.csv").exists());
    assert!(store.puts.lock().unwrap().is_empty());
    assert_eq!(publisher.sent.lock().unwrap().len(), 1);
}
