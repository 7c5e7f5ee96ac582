//! Integration tests for gridcrud
//!
//! Each test runs against its own throwaway SQLite database file in the
//! system temp directory, with the catalog tables created up front.

use std::path::PathBuf;

use gridcrud::sql::ListingQuery;
use gridcrud::{
    EngineConfig, EngineConfigBuilder, FieldValue, FormParams, GridEngine, GridError, SqlValue,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

struct TestDb {
    engine: GridEngine,
    path: PathBuf,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Create an engine over a fresh database file
async fn create_test_engine(
    configure: impl FnOnce(EngineConfigBuilder) -> EngineConfigBuilder,
) -> TestDb {
    let path = std::env::temp_dir().join(format!("gridcrud_{}.db", uuid::Uuid::new_v4().simple()));
    let url = format!("sqlite://{}", path.display());

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .expect("test database should open");

    let config = configure(EngineConfig::builder(url)).build();
    let engine = GridEngine::from_pool(pool, config).expect("catalog should validate");
    engine.ensure_tables().await.expect("catalog tables should be created");

    TestDb { engine, path }
}

async fn default_engine() -> TestDb {
    create_test_engine(|b| b).await
}

fn params(pairs: &[(&str, &str)]) -> FormParams {
    pairs.iter().copied().collect()
}

async fn insert(engine: &GridEngine, table: &str, pairs: &[(&str, &str)]) -> i64 {
    let response = engine.insert_endpoint(table, &params(pairs)).await;
    assert!(response.success, "insert into {} failed: {:?}", table, response.error);
    response.id.expect("insert returns the new id")
}

async fn seed_movies(engine: &GridEngine) -> (i64, i64) {
    let inception = insert(
        engine,
        "dbmovies",
        &[("field-title", "Inception"), ("field-year", "2010"), ("field-imdb_id", "tt1375666")],
    )
    .await;
    let heat = insert(
        engine,
        "dbmovies",
        &[("field-title", "Heat"), ("field-year", "1995")],
    )
    .await;

    for (dbmovie, list, missing) in [
        (inception, "Wanted", "1"),
        (heat, "Wanted", "0"),
        (heat, "Classics", "1"),
    ] {
        let id = dbmovie.to_string();
        insert(
            engine,
            "movies",
            &[
                ("field-dbmovie_id", id.as_str()),
                ("field-listname", list),
                ("field-missing", "0"),
                ("field-missing", missing),
                ("field-quality_profile", "hd"),
            ],
        )
        .await;
    }
    (inception, heat)
}

async fn seed_qualities(engine: &GridEngine) {
    for (kind, name) in [
        ("1", "1080p"),
        ("1", "720p"),
        ("1", "2160p"),
        ("2", "bluray"),
        ("3", "x1080"),
        ("4", "dts"),
    ] {
        insert(engine, "qualities", &[("field-type", kind), ("field-name", name)]).await;
    }
}

// ==================== Listing Tests ====================

#[tokio::test]
async fn test_listing_missing_filter_counts() {
    let db = default_engine().await;
    seed_movies(&db.engine).await;

    let response = db
        .engine
        .listing_endpoint("movies", &params(&[("filter-missing", "1"), ("sEcho", "4")]))
        .await;

    assert_eq!(response.echo, 4);
    assert_eq!(response.total_records, 3);
    assert_eq!(response.total_display_records, 2);
    assert_eq!(response.data.len(), 2);
    for row in &response.data {
        // id, title, year, listname, quality_profile, missing, ...
        assert_eq!(row[5], "1");
        assert_eq!(row.len(), 11);
        assert_eq!(row.last().map(String::as_str), Some(""));
    }
    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_listing_joined_columns() {
    let db = default_engine().await;
    seed_movies(&db.engine).await;

    let response = db
        .engine
        .listing_endpoint("movies", &params(&[("iSortCol_0", "1"), ("sSortDir_0", "asc")]))
        .await;

    let titles: Vec<&str> = response.data.iter().map(|r| r[1].as_str()).collect();
    assert_eq!(titles, vec!["Heat", "Heat", "Inception"]);
    assert_eq!(response.data[2][2], "2010");
}

#[tokio::test]
async fn test_insert_then_search() {
    let db = default_engine().await;
    let response = db
        .engine
        .insert_endpoint(
            "dbmovies",
            &params(&[("field-title", "Inception"), ("field-year", "2010")]),
        )
        .await;
    assert!(response.success);

    let listing = db
        .engine
        .listing_endpoint("dbmovies", &params(&[("sSearch", "Inception")]))
        .await;
    assert_eq!(listing.total_display_records, 1);
    assert_eq!(listing.data.len(), 1);
    assert_eq!(listing.data[0][1], "Inception");
}

#[tokio::test]
async fn test_listing_limit_capped() {
    let db = create_test_engine(|b| b.max_page_length(4)).await;
    seed_qualities(&db.engine).await;

    let response = db
        .engine
        .listing_endpoint("qualities", &params(&[("iDisplayLength", "1000")]))
        .await;
    assert_eq!(response.total_records, 6);
    assert_eq!(response.data.len(), 4);
}

#[tokio::test]
async fn test_list_enforces_page_ceiling() {
    let db = create_test_engine(|b| b.max_page_length(3)).await;
    seed_qualities(&db.engine).await;

    let query = ListingQuery {
        limit: 1000,
        ..Default::default()
    };
    let page = db.engine.list("qualities", &query).await.unwrap();
    assert_eq!(page.total, 6);
    assert_eq!(page.rows.len(), 3);
}

#[tokio::test]
async fn test_list_negative_offset_and_zero_limit() {
    let db = default_engine().await;
    seed_qualities(&db.engine).await;

    let query = ListingQuery {
        offset: -4,
        limit: 2,
        ..Default::default()
    };
    let page = db.engine.list("qualities", &query).await.unwrap();
    assert_eq!(page.rows[0][0], SqlValue::Int(1));
    assert_eq!(page.rows.len(), 2);

    let query = ListingQuery {
        limit: 0,
        ..Default::default()
    };
    let page = db.engine.list("qualities", &query).await.unwrap();
    assert!(page.rows.is_empty());
    assert_eq!(page.total, 6);
    assert_eq!(page.filtered, 6);
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let db = default_engine().await;
    for title in ["100% Wolf", "Heat", "Up_Side", "Upside"] {
        insert(&db.engine, "dbmovies", &[("field-title", title)]).await;
    }

    let percent = db
        .engine
        .listing_endpoint("dbmovies", &params(&[("sSearch", "%")]))
        .await;
    assert_eq!(percent.total_display_records, 1);
    assert_eq!(percent.data[0][1], "100% Wolf");

    let underscore = db
        .engine
        .listing_endpoint("dbmovies", &params(&[("filter-title", "p_S")]))
        .await;
    assert_eq!(underscore.total_display_records, 1);
    assert_eq!(underscore.data[0][1], "Up_Side");

    let options = db
        .engine
        .autocomplete_search("movies", "dbmovie_id", "%", 1)
        .await
        .unwrap();
    let labels: Vec<&str> = options.results.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["100% Wolf"]);
}

#[tokio::test]
async fn test_listing_paging_and_descending_sort() {
    let db = default_engine().await;
    seed_qualities(&db.engine).await;

    let response = db
        .engine
        .listing_endpoint(
            "qualities",
            &params(&[
                ("iDisplayStart", "2"),
                ("iDisplayLength", "2"),
                ("iSortCol_0", "0"),
                ("sSortDir_0", "desc"),
            ]),
        )
        .await;
    let ids: Vec<&str> = response.data.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(ids, vec!["4", "3"]);
}

#[tokio::test]
async fn test_filtered_never_exceeds_total() {
    let db = default_engine().await;
    seed_movies(&db.engine).await;

    let cases: Vec<Vec<(&str, &str)>> = vec![
        vec![],
        vec![("sSearch", "Heat")],
        vec![("sSearch", "Wanted"), ("filter-missing", "1")],
        vec![("filter-listname", "Classics")],
        vec![("filter-imdb", "tt13")],
        vec![("filter-released_since", "2000")],
        vec![("sSearch", "zzz")],
    ];
    for case in cases {
        let response = db.engine.listing_endpoint("movies", &params(&case)).await;
        assert!(
            response.total_display_records <= response.total_records,
            "{:?}",
            case
        );
        assert_eq!(response.data.len() as i64, response.total_display_records.min(10));
    }
}

#[tokio::test]
async fn test_listing_override_filters() {
    let db = default_engine().await;
    seed_movies(&db.engine).await;

    let by_imdb = db
        .engine
        .listing_endpoint("movies", &params(&[("filter-imdb", "tt1375666")]))
        .await;
    assert_eq!(by_imdb.total_display_records, 1);
    assert_eq!(by_imdb.data[0][1], "Inception");

    let recent = db
        .engine
        .listing_endpoint("movies", &params(&[("filter-released_since", "2000")]))
        .await;
    assert_eq!(recent.total_display_records, 1);
}

#[tokio::test]
async fn test_unknown_table_listing_is_empty() {
    let db = default_engine().await;
    let response = db
        .engine
        .listing_endpoint("no_such_table", &params(&[("sEcho", "9")]))
        .await;
    assert_eq!(response.echo, 9);
    assert_eq!(response.total_records, 0);
    assert!(response.data.is_empty());
    assert!(response.error.is_none());
}

// ==================== Autocomplete Tests ====================

#[tokio::test]
async fn test_autocomplete_type_scope() {
    let db = default_engine().await;
    seed_qualities(&db.engine).await;

    let page = db
        .engine
        .autocomplete_search("movie_files", "resolution_id", "108", 1)
        .await
        .unwrap();
    let labels: Vec<&str> = page.results.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["1080p"]);
    assert!(!page.has_more);

    let codecs = db
        .engine
        .autocomplete_search("movie_files", "codec_id", "108", 1)
        .await
        .unwrap();
    let labels: Vec<&str> = codecs.results.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["x1080"]);
}

#[tokio::test]
async fn test_autocomplete_paging() {
    let db = create_test_engine(|b| b.autocomplete_page_size(2)).await;
    for title in ["Alien", "Aliens", "Alien 3", "Alien Resurrection", "Heat"] {
        insert(&db.engine, "dbmovies", &[("field-title", title)]).await;
    }

    let first = db
        .engine
        .autocomplete_search("movies", "dbmovie_id", "Alien", 1)
        .await
        .unwrap();
    assert_eq!(first.results.len(), 2);
    assert!(first.has_more);

    let second = db
        .engine
        .autocomplete_search("movies", "dbmovie_id", "Alien", 2)
        .await
        .unwrap();
    assert_eq!(second.results.len(), 2);
    assert!(!second.has_more);

    let third = db
        .engine
        .autocomplete_search("movies", "dbmovie_id", "Alien", 3)
        .await
        .unwrap();
    assert!(third.results.is_empty());
    assert!(!third.has_more);
}

#[tokio::test]
async fn test_autocomplete_lookup_by_id() {
    let db = default_engine().await;
    let (inception, _) = seed_movies(&db.engine).await;

    let item = db
        .engine
        .autocomplete_lookup("movies", "dbmovie_id", &inception.to_string())
        .await
        .unwrap()
        .expect("existing id resolves");
    assert_eq!(item.id, inception);
    assert_eq!(item.label, "Inception (2010)");

    let missing = db
        .engine
        .autocomplete_lookup("movies", "dbmovie_id", "424242")
        .await
        .unwrap();
    assert!(missing.is_none());

    let garbage = db
        .engine
        .autocomplete_lookup("movies", "dbmovie_id", "abc")
        .await
        .unwrap();
    assert!(garbage.is_none());
}

#[tokio::test]
async fn test_autocomplete_endpoint_shapes() {
    let db = default_engine().await;
    let (inception, _) = seed_movies(&db.engine).await;

    let id = inception.to_string();
    let lookup = db
        .engine
        .autocomplete_endpoint(
            "movies",
            "dbmovie_id",
            &params(&[("id", id.as_str()), ("search", "Heat")]),
        )
        .await;
    assert_eq!(lookup.results.len(), 1);
    assert_eq!(lookup.results[0].text, "Inception (2010)");
    assert!(!lookup.pagination.more);

    let not_a_reference = db
        .engine
        .autocomplete_endpoint("movies", "listname", &params(&[("search", "a")]))
        .await;
    assert!(not_a_reference.results.is_empty());
}

#[tokio::test]
async fn test_movie_labels_include_list_name() {
    let db = default_engine().await;
    seed_movies(&db.engine).await;

    let page = db
        .engine
        .autocomplete_search("movie_files", "movie_id", "Heat", 1)
        .await
        .unwrap();
    let mut labels: Vec<String> = page.results.into_iter().map(|i| i.label).collect();
    labels.sort();
    assert_eq!(labels, vec!["Heat (Classics)", "Heat (Wanted)"]);
}

// ==================== Mutation Tests ====================

#[tokio::test]
async fn test_update_nonexistent_record() {
    let db = default_engine().await;
    let response = db
        .engine
        .update_endpoint("movies", "999999", &params(&[("field-listname", "x")]))
        .await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("record not found"));

    let delete = db.engine.delete_endpoint("movies", "999999").await;
    assert!(!delete.success);
    assert_eq!(delete.error.as_deref(), Some("record not found"));
}

#[tokio::test]
async fn test_update_and_read_back() {
    let db = default_engine().await;
    let id = insert(
        &db.engine,
        "movies",
        &[("field-listname", "Wanted"), ("field-missing", "1")],
    )
    .await;

    let response = db
        .engine
        .update_endpoint(
            "movies",
            &id.to_string(),
            &params(&[
                ("field-listname", "Archive"),
                ("field-missing", "0"),
                ("field-rootpath", ""),
                ("csrf_token", "t0k3n"),
            ]),
        )
        .await;
    assert!(response.success, "{:?}", response.error);

    let record = db.engine.get_record("movies", id).await.unwrap().unwrap();
    assert_eq!(record["listname"], SqlValue::Text("Archive".into()));
    assert_eq!(record["missing"], SqlValue::Int(0));
    assert_eq!(record["rootpath"], SqlValue::Null);
    assert!(!record["updated_at"].is_null());
}

#[tokio::test]
async fn test_update_rejects_unknown_column() {
    let db = default_engine().await;
    let id = insert(&db.engine, "movies", &[("field-listname", "Wanted")]).await;

    let err = db
        .engine
        .update("movies", id, &params(&[("field-title", "joined")]))
        .await
        .unwrap_err();
    assert!(matches!(err, GridError::UnknownColumn { .. }));

    let response = db
        .engine
        .insert_endpoint("movies", &params(&[("field-bogus", "1")]))
        .await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("bogus"));
}

#[tokio::test]
async fn test_insert_strips_id_and_timestamps() {
    let db = default_engine().await;
    let id = insert(
        &db.engine,
        "qualities",
        &[
            ("field-id", "77"),
            ("field-created_at", "1999-01-01 00:00:00"),
            ("field-name", "1080p"),
            ("field-type", "1"),
        ],
    )
    .await;
    assert_ne!(id, 77);

    let record = db.engine.get_record("qualities", id).await.unwrap().unwrap();
    assert_eq!(record["type"], SqlValue::Int(1));
    assert_ne!(record["created_at"], SqlValue::Text("1999-01-01 00:00:00".into()));
}

#[tokio::test]
async fn test_list_columns_stored_as_json() {
    let db = default_engine().await;
    let id = insert(
        &db.engine,
        "dbmovies",
        &[
            ("field-title", "Inception"),
            ("field-genres", "Science Fiction"),
            ("field-genres", "Action"),
            ("field-spoken_languages", "en"),
            ("field-spoken_languages", "ja"),
        ],
    )
    .await;

    let record = db.engine.get_record("dbmovies", id).await.unwrap().unwrap();
    assert_eq!(
        record["genres"],
        SqlValue::Text(r#"["Science Fiction","Action"]"#.into())
    );

    let form = db.engine.edit_form("dbmovies", Some(id)).await.unwrap();
    let genres = form.fields.iter().find(|f| f.name == "genres").unwrap();
    assert_eq!(
        genres.value,
        FieldValue::List(vec!["Science Fiction".into(), "Action".into()])
    );
}

#[tokio::test]
async fn test_delete_checks_existence() {
    let db = default_engine().await;
    let id = insert(&db.engine, "indexer_fails", &[("field-indexer", "nzbgeek")]).await;

    let response = db.engine.delete_endpoint("indexer_fails", &id.to_string()).await;
    assert!(response.success);
    assert!(db.engine.get_record("indexer_fails", id).await.unwrap().is_none());

    let again = db.engine.delete_endpoint("indexer_fails", &id.to_string()).await;
    assert_eq!(again.error.as_deref(), Some("record not found"));
}

#[tokio::test]
async fn test_invalid_path_id() {
    let db = default_engine().await;
    let response = db.engine.delete_endpoint("movies", "abc").await;
    assert!(!response.success);
}

// ==================== Edit Form Tests ====================

#[tokio::test]
async fn test_edit_form_labels_foreign_keys() {
    let db = default_engine().await;
    let (inception, _) = seed_movies(&db.engine).await;
    let listing = db
        .engine
        .listing_endpoint("movies", &params(&[("filter-imdb", "tt1375666")]))
        .await;
    let movie_id = listing.data[0][0].clone();

    let response = db
        .engine
        .edit_form_endpoint("movies", Some(movie_id.as_str()))
        .await;
    assert!(response.success);
    let form = response.form.unwrap();

    let fk = form.fields.iter().find(|f| f.name == "dbmovie_id").unwrap();
    assert_eq!(fk.value, FieldValue::Int(inception));
    assert_eq!(fk.reference_label.as_deref(), Some("Inception (2010)"));
    assert!(form.html.contains("Inception (2010)"));
    assert!(!form.fields.iter().any(|f| f.name == "id" || f.name == "lastscan"));
}

#[tokio::test]
async fn test_edit_form_dangling_reference_renders_blank() {
    let db = default_engine().await;
    let id = insert(
        &db.engine,
        "movies",
        &[("field-dbmovie_id", "31337"), ("field-listname", "Wanted")],
    )
    .await;

    let form = db.engine.edit_form("movies", Some(id)).await.unwrap();
    let fk = form.fields.iter().find(|f| f.name == "dbmovie_id").unwrap();
    assert_eq!(fk.value, FieldValue::Null);
    assert!(fk.reference_label.is_none());
}

#[tokio::test]
async fn test_edit_form_missing_record_and_blank_form() {
    let db = default_engine().await;
    let missing = db.engine.edit_form_endpoint("movies", Some("5")).await;
    assert!(!missing.success);
    assert_eq!(missing.error.as_deref(), Some("record not found"));

    let blank = db.engine.edit_form_endpoint("qualities", None).await;
    assert!(blank.success);
    let form = blank.form.unwrap();
    assert!(form.id.is_none());
    assert!(form.html.starts_with("<form"));
}
