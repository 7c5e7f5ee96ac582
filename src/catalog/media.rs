//! Movie tables

use super::*;
use crate::fields::{NumericType, SelectOption};
use crate::sql::filter::FilterOp::{Contains, Equals, GreaterOrEqual};
use crate::sql::sanitize::contains_pattern;
use crate::types::SqlType::{Integer, Real, Text, Timestamp};

pub(crate) const MOVIE_STATUS: &[SelectOption] = &[
    SelectOption::new("Released", "Released"),
    SelectOption::new("Post Production", "Post Production"),
    SelectOption::new("In Production", "In Production"),
    SelectOption::new("Planned", "Planned"),
    SelectOption::new("Rumored", "Rumored"),
    SelectOption::new("Canceled", "Canceled"),
];

pub(crate) const GENRES: &[SelectOption] = &[
    SelectOption::new("Action", "Action"),
    SelectOption::new("Adventure", "Adventure"),
    SelectOption::new("Animation", "Animation"),
    SelectOption::new("Comedy", "Comedy"),
    SelectOption::new("Crime", "Crime"),
    SelectOption::new("Documentary", "Documentary"),
    SelectOption::new("Drama", "Drama"),
    SelectOption::new("Family", "Family"),
    SelectOption::new("Fantasy", "Fantasy"),
    SelectOption::new("Horror", "Horror"),
    SelectOption::new("Mystery", "Mystery"),
    SelectOption::new("Romance", "Romance"),
    SelectOption::new("Science Fiction", "Science Fiction"),
    SelectOption::new("Thriller", "Thriller"),
    SelectOption::new("War", "War"),
    SelectOption::new("Western", "Western"),
];

pub(crate) const LANGUAGES: &[SelectOption] = &[
    SelectOption::new("en", "English"),
    SelectOption::new("de", "German"),
    SelectOption::new("fr", "French"),
    SelectOption::new("es", "Spanish"),
    SelectOption::new("it", "Italian"),
    SelectOption::new("ja", "Japanese"),
    SelectOption::new("ko", "Korean"),
    SelectOption::new("zh", "Chinese"),
];

const QUALITY_PROFILE_HELP: &str = "Name of the quality profile from the configuration";
const BLACKLIST_HELP: &str = "Blacklisted entries are skipped by every search job and never downloaded again, even when a better release shows up later";

pub static DBMOVIES: TableDef = TableDef {
    name: "dbmovies",
    entity: "Dbmovie",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("title"),
        date("release_date"),
        int("year").hint(FieldHint::Number(NumericType::U16)),
        boolean("adult"),
        int("budget"),
        json("genres").hint(FieldHint::MultiSelect(GENRES)),
        text("original_language").hint(FieldHint::Select(LANGUAGES)),
        text("original_title"),
        text("overview").hint(FieldHint::TextArea),
        real("popularity"),
        int("revenue"),
        int("runtime").hint(FieldHint::Number(NumericType::U32)).help("Minutes"),
        json("spoken_languages").hint(FieldHint::ListOfSelect(LANGUAGES)),
        text("status").hint(FieldHint::Select(MOVIE_STATUS)),
        text("tagline"),
        real("vote_average"),
        int("vote_count"),
        int("moviedb_id"),
        text("imdb_id"),
        text("freebase_m_id"),
        text("freebase_id"),
        text("facebook_id"),
        text("instagram_id"),
        text("twitter_id"),
        text("url").hint(FieldHint::Url),
        text("backdrop"),
        text("poster"),
        text("slug"),
        int("trakt_id"),
    ],
    listing: Some(ListingDef {
        from: "dbmovies",
        columns: &[
            proj("dbmovies.id", Integer),
            proj("dbmovies.title", Text),
            proj("dbmovies.year", Integer),
            proj("dbmovies.imdb_id", Text),
            proj("dbmovies.original_language", Text),
            proj("dbmovies.runtime", Integer),
            proj("dbmovies.vote_average", Real),
            proj("dbmovies.status", Text),
            proj("dbmovies.created_at", Timestamp),
        ],
    }),
    search: SearchDef {
        template: "dbmovies.title LIKE ? OR dbmovies.imdb_id LIKE ?",
        args: 2,
    },
    readonly: &[],
    annotations: &[
        ("VoteAverage", "Rating"),
        ("VoteCount", "Votes"),
        ("MoviedbID", "TMDB ID"),
        ("FreebaseMID", "Freebase MID"),
        ("Backdrop", "Backdrop Image"),
    ],
    filters: &[
        filter("title", "dbmovies.title", Contains, Text),
        filter("year", "dbmovies.year", GreaterOrEqual, Integer),
        filter("imdb_id", "dbmovies.imdb_id", Equals, Text),
        filter("original_language", "dbmovies.original_language", Equals, Text),
    ],
    overrides: &[],
    label: Some(LabelSource {
        from: "dbmovies",
        id_column: "dbmovies.id",
        search_column: "dbmovies.title",
        parts: &["dbmovies.title", "dbmovies.year"],
        compose: label_with_suffix,
        scopes: &[],
    }),
};

pub static DBMOVIE_TITLES: TableDef = TableDef {
    name: "dbmovie_titles",
    entity: "DbmovieTitle",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        int("dbmovie_id"),
        text("title"),
        text("slug"),
        text("region"),
    ],
    listing: Some(ListingDef {
        from: "dbmovie_titles LEFT JOIN dbmovies ON dbmovies.id = dbmovie_titles.dbmovie_id",
        columns: &[
            proj("dbmovie_titles.id", Integer),
            proj("dbmovies.title AS movie_title", Text),
            proj("dbmovie_titles.title", Text),
            proj("dbmovie_titles.region", Text),
            proj("dbmovie_titles.slug", Text),
        ],
    }),
    search: SearchDef {
        template: "dbmovie_titles.title LIKE ? OR dbmovies.title LIKE ?",
        args: 2,
    },
    readonly: &[],
    annotations: &[],
    filters: &[
        filter("dbmovie_id", "dbmovie_titles.dbmovie_id", Equals, Integer),
        filter("region", "dbmovie_titles.region", Equals, Text),
    ],
    overrides: &[],
    label: None,
};

fn movies_by_imdb(value: &str) -> Option<Predicate> {
    Some(Predicate::new(
        "movies.dbmovie_id IN (SELECT id FROM dbmovies WHERE imdb_id LIKE ? ESCAPE '\\')",
        vec![crate::types::SqlValue::Text(contains_pattern(value))],
    ))
}

fn movies_released_since(value: &str) -> Option<Predicate> {
    let year = value.trim().parse::<i64>().ok()?;
    Some(Predicate::new(
        "movies.dbmovie_id IN (SELECT id FROM dbmovies WHERE year >= ?)",
        vec![crate::types::SqlValue::Int(year)],
    ))
}

pub static MOVIES: TableDef = TableDef {
    name: "movies",
    entity: "Movie",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        timestamp("lastscan"),
        int("blacklisted").help(BLACKLIST_HELP),
        int("quality_reached"),
        text("quality_profile").help(QUALITY_PROFILE_HELP),
        int("missing"),
        int("dont_upgrade"),
        int("dont_search"),
        text("listname"),
        text("rootpath"),
        int("dbmovie_id"),
    ],
    listing: Some(ListingDef {
        from: "movies LEFT JOIN dbmovies ON dbmovies.id = movies.dbmovie_id",
        columns: &[
            proj("movies.id", Integer),
            proj("dbmovies.title AS title", Text),
            proj("dbmovies.year AS year", Integer),
            proj("movies.listname", Text),
            proj("movies.quality_profile", Text),
            proj("movies.missing", Integer),
            proj("movies.quality_reached", Integer),
            proj("movies.blacklisted", Integer),
            proj("movies.rootpath", Text),
            proj("movies.lastscan", Timestamp),
        ],
    }),
    search: SearchDef {
        template: "dbmovies.title LIKE ? OR movies.listname LIKE ?",
        args: 2,
    },
    readonly: &["lastscan"],
    annotations: &[("Rootpath", "Root Path")],
    filters: &[
        filter("missing", "movies.missing", Equals, Integer),
        filter("listname", "movies.listname", Equals, Text),
        filter("quality_reached", "movies.quality_reached", Equals, Integer),
        filter("quality_profile", "movies.quality_profile", Equals, Text),
        filter("blacklisted", "movies.blacklisted", Equals, Integer),
        filter("title", "dbmovies.title", Contains, Text),
    ],
    overrides: &[
        FilterOverride {
            key: "imdb",
            build: movies_by_imdb,
        },
        FilterOverride {
            key: "released_since",
            build: movies_released_since,
        },
    ],
    label: Some(LabelSource {
        from: "movies LEFT JOIN dbmovies ON dbmovies.id = movies.dbmovie_id",
        id_column: "movies.id",
        search_column: "dbmovies.title",
        parts: &["dbmovies.title", "movies.listname"],
        compose: label_with_suffix,
        scopes: &[],
    }),
};

pub static MOVIE_FILES: TableDef = TableDef {
    name: "movie_files",
    entity: "MovieFile",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("location"),
        text("filename"),
        text("extension"),
        text("quality_profile").help(QUALITY_PROFILE_HELP),
        int("proper"),
        int("extended"),
        int("repack"),
        int("height").hint(FieldHint::Number(NumericType::U32)),
        int("width").hint(FieldHint::Number(NumericType::U32)),
        int("resolution_id"),
        int("quality_id"),
        int("codec_id"),
        int("audio_id"),
        int("movie_id"),
        int("dbmovie_id"),
    ],
    listing: Some(ListingDef {
        from: "movie_files LEFT JOIN dbmovies ON dbmovies.id = movie_files.dbmovie_id",
        columns: &[
            proj("movie_files.id", Integer),
            proj("dbmovies.title AS title", Text),
            proj("movie_files.filename", Text),
            proj("movie_files.location", Text),
            proj("movie_files.quality_profile", Text),
            proj("movie_files.height", Integer),
            proj("movie_files.width", Integer),
            proj("movie_files.created_at", Timestamp),
        ],
    }),
    search: SearchDef {
        template: "movie_files.filename LIKE ? OR movie_files.location LIKE ?",
        args: 2,
    },
    readonly: &[],
    annotations: &[],
    filters: &[
        filter("movie_id", "movie_files.movie_id", Equals, Integer),
        filter("quality_profile", "movie_files.quality_profile", Equals, Text),
        filter("filename", "movie_files.filename", Contains, Text),
        filter("height", "movie_files.height", GreaterOrEqual, Integer),
    ],
    overrides: &[],
    label: None,
};

pub static MOVIE_HISTORIES: TableDef = TableDef {
    name: "movie_histories",
    entity: "MovieHistory",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("title"),
        text("url").hint(FieldHint::Url),
        text("indexer"),
        text("type"),
        text("target"),
        timestamp("downloaded_at"),
        int("blacklisted").help(BLACKLIST_HELP),
        text("quality_profile").help(QUALITY_PROFILE_HELP),
        int("resolution_id"),
        int("quality_id"),
        int("codec_id"),
        int("audio_id"),
        int("movie_id"),
        int("dbmovie_id"),
    ],
    listing: Some(ListingDef {
        from: "movie_histories LEFT JOIN dbmovies ON dbmovies.id = movie_histories.dbmovie_id",
        columns: &[
            proj("movie_histories.id", Integer),
            proj("dbmovies.title AS movie_title", Text),
            proj("movie_histories.title", Text),
            proj("movie_histories.indexer", Text),
            proj("movie_histories.quality_profile", Text),
            proj("movie_histories.downloaded_at", Timestamp),
            proj("movie_histories.blacklisted", Integer),
        ],
    }),
    search: SearchDef {
        template: "movie_histories.title LIKE ? OR dbmovies.title LIKE ? OR movie_histories.indexer LIKE ?",
        args: 3,
    },
    readonly: &[],
    annotations: &[("Target", "Download Target")],
    filters: &[
        filter("indexer", "movie_histories.indexer", Equals, Text),
        filter("downloaded_since", "movie_histories.downloaded_at", GreaterOrEqual, Timestamp),
        filter("blacklisted", "movie_histories.blacklisted", Equals, Integer),
        filter("movie_id", "movie_histories.movie_id", Equals, Integer),
    ],
    overrides: &[],
    label: None,
};

pub static MOVIE_FILE_UNMATCHEDS: TableDef = TableDef {
    name: "movie_file_unmatcheds",
    entity: "MovieFileUnmatched",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("listname"),
        text("filepath"),
        timestamp("last_checked"),
        text("parsed_data").hint(FieldHint::TextArea),
    ],
    listing: None,
    search: SearchDef {
        template: "filepath LIKE ?",
        args: 1,
    },
    readonly: &["last_checked"],
    annotations: &[("ParsedData", "Parsed Data")],
    filters: &[
        filter("listname", "listname", Equals, Text),
        filter("filepath", "filepath", Contains, Text),
    ],
    overrides: &[],
    label: None,
};
