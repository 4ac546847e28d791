//! Integration tests for the incremental crawl
//!
//! These tests use wiremock to serve a small archive and run the full
//! crawl cycle against an on-disk database and page cache.

use chrono::NaiveDate;
use lmd_audio_crawler::config::{
    ArchiveConfig, Config, CrawlerConfig, StorageConfig, UserAgentConfig,
};
use lmd_audio_crawler::crawler::Coordinator;
use lmd_audio_crawler::storage::{SqliteStorage, Storage};
use lmd_audio_crawler::CrawlError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An article as served by the mock archive
struct ArticleFixture {
    id: i64,
    title: &'static str,
    authors: &'static str,
    /// Size of the audio file, `None` for text-only articles
    audio_size: Option<usize>,
}

/// Creates a test configuration pointing at the mock archive
fn create_test_config(base_url: &str, dir: &TempDir, index_ttl_hours: u64) -> Config {
    Config {
        archive: ArchiveConfig {
            base_url: base_url.to_string(),
            index_path: "/archiv-text".to_string(),
            media_since: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        },
        crawler: CrawlerConfig {
            request_delay_ms: 0,
            index_ttl_hours,
            timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        storage: StorageConfig {
            database_path: dir.path().join("db.sqlite3").display().to_string(),
            cache_dir: dir.path().join("cache").display().to_string(),
        },
    }
}

fn index_html(dates: &[&str]) -> String {
    let links: String = dates
        .iter()
        .map(|date| format!(r#"<a href="/archiv-text?text={0}">{0}</a>"#, date))
        .collect();
    format!(
        r#"<html><body><section class="archiv jhrg">{}<a href="/impressum">Impressum</a></section></body></html>"#,
        links
    )
}

fn issue_html(articles: &[ArticleFixture]) -> String {
    let items: String = articles
        .iter()
        .map(|a| {
            format!(
                r#"<li mediasyncid="{id}">
                     <div><a href="/artikel/{id}"><strong>{title}</strong></a></div>
                     <div>Summary of {id}</div>
                     <div><em>von</em><em>{authors}</em></div>
                   </li>"#,
                id = a.id,
                title = a.title,
                authors = a.authors
            )
        })
        .collect();
    format!(
        r#"<html><body><ul class="inhaltsverz verlinkt">{}</ul></body></html>"#,
        items
    )
}

fn article_html(article: &ArticleFixture) -> String {
    let audio = if article.audio_size.is_some() {
        format!(
            r#"<section class="audio feature"><audio id="player2" src="/audio/{}.mp3"></audio></section>"#,
            article.id
        )
    } else {
        String::new()
    };
    format!(
        r#"<html><body><h1>Headline {id}</h1><figure role="group"><img src="/images/{id}.jpg"></figure>{audio}</body></html>"#,
        id = article.id,
        audio = audio
    )
}

/// Mounts an issue page and all of its article pages and audio files
async fn mount_issue(server: &MockServer, date: &str, articles: &[ArticleFixture]) {
    Mock::given(method("GET"))
        .and(path("/archiv-text"))
        .and(query_param("text", date))
        .respond_with(ResponseTemplate::new(200).set_body_string(issue_html(articles)))
        .expect(1)
        .mount(server)
        .await;

    for article in articles {
        Mock::given(method("GET"))
            .and(path(format!("/artikel/{}", article.id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(article_html(article)))
            .expect(1)
            .mount(server)
            .await;

        if let Some(size) = article.audio_size {
            Mock::given(method("HEAD"))
                .and(path(format!("/audio/{}.mp3", article.id)))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; size]))
                .expect(1)
                .mount(server)
                .await;
        }
    }
}

/// Mounts the index page; issue mocks must be mounted first as they share its path
async fn mount_index(server: &MockServer, dates: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/archiv-text"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_html(dates)))
        .mount(server)
        .await;
}

fn open(config: &Config) -> SqliteStorage {
    SqliteStorage::new(Path::new(&config.storage.database_path)).expect("Failed to open DB")
}

#[tokio::test]
async fn test_single_new_issue_end_to_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 24);

    mount_issue(
        &server,
        "2024-03-14",
        &[ArticleFixture {
            id: 100,
            title: "Audio article",
            authors: "Jane Doe",
            audio_size: Some(2048),
        }],
    )
    .await;
    // Predates the first audio issue; its page must never be requested
    Mock::given(method("GET"))
        .and(path("/archiv-text"))
        .and(query_param("text", "2020-12-10"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_index(&server, &["2024-03-14", "2020-12-10"]).await;

    let mut coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    assert_eq!(coordinator.run().await.expect("Crawl failed"), 1);
    drop(coordinator);

    let storage = open(&config);
    let articles = storage.all_articles().unwrap();
    assert_eq!(articles.len(), 1);

    let article = &articles[0];
    assert_eq!(article.summary.id.0, 100);
    assert_eq!(article.summary.title, "Audio article");
    assert_eq!(article.summary.authors, vec!["Jane Doe"]);
    assert_eq!(
        article.summary.date,
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    );
    assert_eq!(
        article.image_url,
        Some(format!("{}/images/100.jpg", server.uri()))
    );
    assert_eq!(article.medias.len(), 1);
    assert_eq!(article.medias[0].url, format!("{}/audio/100.mp3", server.uri()));
    assert_eq!(article.medias[0].size, 2048);
    assert_eq!(storage.count_authors().unwrap(), 1);
    drop(storage);

    // Nothing new on the second run; every mock above still expects one call
    let mut coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    assert_eq!(coordinator.run().await.expect("Second crawl failed"), 0);
    assert_eq!(coordinator.storage().all_articles().unwrap(), articles);
}

#[tokio::test]
async fn test_articles_without_audio_are_not_stored() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 24);

    mount_issue(
        &server,
        "2024-03-14",
        &[
            ArticleFixture {
                id: 1,
                title: "Text only",
                authors: "A",
                audio_size: None,
            },
            ArticleFixture {
                id: 2,
                title: "With audio",
                authors: "B",
                audio_size: Some(10),
            },
        ],
    )
    .await;
    mount_index(&server, &["2024-03-14"]).await;

    let mut coordinator = Coordinator::new(&config).unwrap();
    assert_eq!(coordinator.run().await.unwrap(), 1);

    let ids: Vec<i64> = coordinator
        .storage()
        .all_articles()
        .unwrap()
        .iter()
        .map(|a| a.summary.id.0)
        .collect();
    assert_eq!(ids, vec![2]);
    assert_eq!(coordinator.storage().count_authors().unwrap(), 1);
}

#[tokio::test]
async fn test_cursor_advances_across_runs() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    // Index is re-read on every run
    let config = create_test_config(&server.uri(), &dir, 0);

    mount_issue(
        &server,
        "2024-02-08",
        &[ArticleFixture {
            id: 10,
            title: "February",
            authors: "Jane Doe",
            audio_size: Some(100),
        }],
    )
    .await;
    mount_issue(
        &server,
        "2024-01-11",
        &[ArticleFixture {
            id: 5,
            title: "January",
            authors: "Jane Doe und Max Mustermann",
            audio_size: Some(50),
        }],
    )
    .await;
    // Unsorted on purpose
    mount_index(&server, &["2024-02-08", "2024-01-11"]).await;

    let mut coordinator = Coordinator::new(&config).unwrap();
    assert_eq!(coordinator.run().await.unwrap(), 2);
    let first_cursor = coordinator.storage().max_stored_date().unwrap();
    assert_eq!(first_cursor, NaiveDate::from_ymd_opt(2024, 2, 8));
    // Jane Doe is shared by both articles
    assert_eq!(coordinator.storage().count_authors().unwrap(), 2);
    drop(coordinator);

    // A new issue appears
    server.verify().await;
    server.reset().await;
    mount_issue(
        &server,
        "2024-03-14",
        &[ArticleFixture {
            id: 20,
            title: "March",
            authors: "Max Mustermann",
            audio_size: Some(300),
        }],
    )
    .await;
    mount_index(&server, &["2024-03-14", "2024-02-08", "2024-01-11"]).await;

    let mut coordinator = Coordinator::new(&config).unwrap();
    assert_eq!(coordinator.run().await.unwrap(), 1);

    let storage = coordinator.storage();
    let second_cursor = storage.max_stored_date().unwrap();
    assert!(second_cursor >= first_cursor);
    assert_eq!(second_cursor, NaiveDate::from_ymd_opt(2024, 3, 14));

    let ids: Vec<i64> = storage
        .all_articles()
        .unwrap()
        .iter()
        .map(|a| a.summary.id.0)
        .collect();
    assert_eq!(ids, vec![20, 10, 5]);
    assert_eq!(storage.count_authors().unwrap(), 2);
}

#[tokio::test]
async fn test_failed_run_leaves_storage_unchanged_but_keeps_sizes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 24);

    let articles = [
        ArticleFixture {
            id: 1,
            title: "First",
            authors: "A",
            audio_size: Some(111),
        },
        ArticleFixture {
            id: 2,
            title: "Second",
            authors: "B",
            audio_size: Some(222),
        },
    ];

    // The second article page is broken on the first run
    Mock::given(method("GET"))
        .and(path("/archiv-text"))
        .and(query_param("text", "2024-03-14"))
        .respond_with(ResponseTemplate::new(200).set_body_string(issue_html(&articles)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artikel/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_html(&articles[0])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/audio/1.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 111]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artikel/2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    mount_index(&server, &["2024-03-14"]).await;

    let mut coordinator = Coordinator::new(&config).unwrap();
    let result = coordinator.run().await;
    assert!(matches!(
        result,
        Err(CrawlError::HttpStatus { status: 502, .. })
    ));
    drop(coordinator);

    let storage = open(&config);
    assert_eq!(storage.max_stored_date().unwrap(), None);
    assert_eq!(storage.count_articles().unwrap(), 0);
    assert_eq!(storage.count_authors().unwrap(), 0);
    assert_eq!(
        storage
            .get_size(&format!("{}/audio/1.mp3", server.uri()))
            .unwrap(),
        Some(111)
    );
    drop(storage);

    // Verify the first run's expectations, then serve a healthy archive.
    // Article 1 and its size come from the caches this time.
    server.verify().await;
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/artikel/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_html(&articles[1])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/audio/2.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 222]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artikel/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/audio/1.mp3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::new(&config).unwrap();
    assert_eq!(coordinator.run().await.unwrap(), 2);

    let sizes: Vec<u64> = coordinator
        .storage()
        .all_articles()
        .unwrap()
        .iter()
        .map(|a| a.medias[0].size)
        .collect();
    assert_eq!(sizes, vec![222, 111]);
}

#[tokio::test]
async fn test_issues_are_fetched_oldest_first() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 24);

    let issues = [("2024-03-14", 30), ("2023-12-07", 10), ("2024-01-11", 20)];
    for (date, id) in issues {
        mount_issue(
            &server,
            date,
            &[ArticleFixture {
                id,
                title: "Issue article",
                authors: "Jane Doe",
                audio_size: Some(64),
            }],
        )
        .await;
    }
    mount_index(&server, &["2024-03-14", "2023-12-07", "2024-01-11"]).await;

    let mut coordinator = Coordinator::new(&config).unwrap();
    assert_eq!(coordinator.run().await.unwrap(), 3);

    let requested: Vec<String> = server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .iter()
        .filter(|request| request.url.path() == "/archiv-text")
        .filter_map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "text")
                .map(|(_, value)| value.into_owned())
        })
        .collect();
    assert_eq!(requested, vec!["2023-12-07", "2024-01-11", "2024-03-14"]);

    // Article pages follow their issue pages in the same order
    let articles: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.url.path().to_string())
        .filter(|path| path.starts_with("/artikel/"))
        .collect();
    assert_eq!(articles, vec!["/artikel/10", "/artikel/20", "/artikel/30"]);
}
