//! Series and episode tables

use super::*;
use crate::fields::SelectOption;
use crate::sql::filter::FilterOp::{Contains, Equals, GreaterOrEqual};
use crate::sql::sanitize::contains_pattern;
use crate::types::SqlType::{Date, Integer, Text, Timestamp};

const SERIE_STATUS: &[SelectOption] = &[
    SelectOption::new("Continuing", "Continuing"),
    SelectOption::new("Ended", "Ended"),
    SelectOption::new("Upcoming", "Upcoming"),
];

const IDENTIFIED_BY: &[SelectOption] = &[
    SelectOption::new("ep", "Season / Episode"),
    SelectOption::new("date", "Air Date"),
];

const EPISODE_IDENTIFIER_HELP: &str = "S01E01 style or date";

pub static DBSERIES: TableDef = TableDef {
    name: "dbseries",
    entity: "Dbserie",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("seriename"),
        json("aliases").hint(FieldHint::List(ScalarKind::Text)),
        text("season"),
        text("status").hint(FieldHint::Select(SERIE_STATUS)),
        text("firstaired"),
        text("network"),
        text("runtime"),
        text("language"),
        json("genre").hint(FieldHint::MultiSelect(super::media::GENRES)),
        text("overview").hint(FieldHint::TextArea),
        text("rating"),
        text("siterating"),
        text("siterating_count"),
        text("slug"),
        text("imdb_id"),
        int("thetvdb_id"),
        text("freebase_m_id"),
        text("freebase_id"),
        int("tvrage_id"),
        text("facebook"),
        text("instagram"),
        text("twitter"),
        text("banner"),
        text("poster"),
        text("fanart"),
        text("identifiedby").hint(FieldHint::Select(IDENTIFIED_BY)),
        int("trakt_id"),
    ],
    listing: Some(ListingDef {
        from: "dbseries",
        columns: &[
            proj("dbseries.id", Integer),
            proj("dbseries.seriename", Text),
            proj("dbseries.status", Text),
            proj("dbseries.firstaired", Text),
            proj("dbseries.network", Text),
            proj("dbseries.thetvdb_id", Integer),
            proj("dbseries.imdb_id", Text),
            proj("dbseries.identifiedby", Text),
        ],
    }),
    search: SearchDef {
        template: "dbseries.seriename LIKE ? OR dbseries.imdb_id LIKE ? OR dbseries.aliases LIKE ?",
        args: 3,
    },
    readonly: &[],
    annotations: &[
        ("Seriename", "Series Name"),
        ("Firstaired", "First Aired"),
        ("Siterating", "Site Rating"),
        ("SiteratingCount", "Site Rating Count"),
        ("Identifiedby", "Identified By"),
        ("Fanart", "Fan Art"),
    ],
    filters: &[
        filter("seriename", "dbseries.seriename", Contains, Text),
        filter("status", "dbseries.status", Equals, Text),
        filter("thetvdb_id", "dbseries.thetvdb_id", Equals, Integer),
    ],
    overrides: &[],
    label: Some(LabelSource {
        from: "dbseries",
        id_column: "dbseries.id",
        search_column: "dbseries.seriename",
        parts: &["dbseries.seriename"],
        compose: label_first,
        scopes: &[],
    }),
};

pub static DBSERIE_ALTERNATES: TableDef = TableDef {
    name: "dbserie_alternates",
    entity: "DbserieAlternate",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("title"),
        text("slug"),
        text("region"),
        int("dbserie_id"),
    ],
    listing: Some(ListingDef {
        from: "dbserie_alternates LEFT JOIN dbseries ON dbseries.id = dbserie_alternates.dbserie_id",
        columns: &[
            proj("dbserie_alternates.id", Integer),
            proj("dbseries.seriename AS seriename", Text),
            proj("dbserie_alternates.title", Text),
            proj("dbserie_alternates.region", Text),
            proj("dbserie_alternates.slug", Text),
        ],
    }),
    search: SearchDef {
        template: "dbserie_alternates.title LIKE ? OR dbseries.seriename LIKE ?",
        args: 2,
    },
    readonly: &[],
    annotations: &[],
    filters: &[filter("dbserie_id", "dbserie_alternates.dbserie_id", Equals, Integer)],
    overrides: &[],
    label: None,
};

fn episode_label(parts: &[String]) -> String {
    match parts {
        [serie, identifier, title, ..] if !title.is_empty() => {
            format!("{} {} - {}", serie, identifier, title)
        }
        [serie, identifier, ..] => format!("{} {}", serie, identifier),
        _ => label_first(parts),
    }
}

pub static DBSERIE_EPISODES: TableDef = TableDef {
    name: "dbserie_episodes",
    entity: "DbserieEpisode",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("episode"),
        text("season"),
        text("identifier").help(EPISODE_IDENTIFIER_HELP),
        text("title"),
        date("first_aired"),
        text("overview").hint(FieldHint::TextArea),
        text("poster"),
        int("runtime"),
        int("dbserie_id"),
    ],
    listing: Some(ListingDef {
        from: "dbserie_episodes LEFT JOIN dbseries ON dbseries.id = dbserie_episodes.dbserie_id",
        columns: &[
            proj("dbserie_episodes.id", Integer),
            proj("dbseries.seriename AS seriename", Text),
            proj("dbserie_episodes.identifier", Text),
            proj("dbserie_episodes.title", Text),
            proj("dbserie_episodes.first_aired", Date),
            proj("dbserie_episodes.runtime", Integer),
        ],
    }),
    search: SearchDef {
        template: "dbserie_episodes.title LIKE ? OR dbserie_episodes.identifier LIKE ? OR dbseries.seriename LIKE ?",
        args: 3,
    },
    readonly: &[],
    annotations: &[("FirstAired", "First Aired")],
    filters: &[
        filter("dbserie_id", "dbserie_episodes.dbserie_id", Equals, Integer),
        filter("season", "dbserie_episodes.season", Equals, Text),
        filter("aired_since", "dbserie_episodes.first_aired", GreaterOrEqual, Date),
    ],
    overrides: &[],
    label: Some(LabelSource {
        from: "dbserie_episodes LEFT JOIN dbseries ON dbseries.id = dbserie_episodes.dbserie_id",
        id_column: "dbserie_episodes.id",
        search_column: "dbserie_episodes.title",
        parts: &[
            "dbseries.seriename",
            "dbserie_episodes.identifier",
            "dbserie_episodes.title",
        ],
        compose: episode_label,
        scopes: &[],
    }),
};

pub static SERIES: TableDef = TableDef {
    name: "series",
    entity: "Serie",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("listname"),
        text("rootpath"),
        int("dbserie_id"),
        int("dont_upgrade"),
        int("dont_search"),
        int("search_specials"),
        int("ignore_runtime"),
    ],
    listing: Some(ListingDef {
        from: "series LEFT JOIN dbseries ON dbseries.id = series.dbserie_id",
        columns: &[
            proj("series.id", Integer),
            proj("dbseries.seriename AS seriename", Text),
            proj("series.listname", Text),
            proj("series.rootpath", Text),
            proj("series.dont_upgrade", Integer),
            proj("series.dont_search", Integer),
            proj("series.search_specials", Integer),
        ],
    }),
    search: SearchDef {
        template: "dbseries.seriename LIKE ? OR series.listname LIKE ?",
        args: 2,
    },
    readonly: &[],
    annotations: &[("Rootpath", "Root Path")],
    filters: &[
        filter("listname", "series.listname", Equals, Text),
        filter("dont_search", "series.dont_search", Equals, Integer),
        filter("seriename", "dbseries.seriename", Contains, Text),
    ],
    overrides: &[],
    label: Some(LabelSource {
        from: "series LEFT JOIN dbseries ON dbseries.id = series.dbserie_id",
        id_column: "series.id",
        search_column: "dbseries.seriename",
        parts: &["dbseries.seriename", "series.listname"],
        compose: label_with_suffix,
        scopes: &[],
    }),
};

fn episodes_of_serie_named(value: &str) -> Option<Predicate> {
    Some(Predicate::new(
        "serie_episodes.serie_id IN (SELECT series.id FROM series INNER JOIN dbseries ON dbseries.id = series.dbserie_id WHERE dbseries.seriename LIKE ? ESCAPE '\\')",
        vec![crate::types::SqlValue::Text(contains_pattern(value))],
    ))
}

pub static SERIE_EPISODES: TableDef = TableDef {
    name: "serie_episodes",
    entity: "SerieEpisode",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        timestamp("lastscan"),
        int("blacklisted"),
        int("quality_reached"),
        text("quality_profile"),
        int("missing"),
        int("dont_upgrade"),
        int("dont_search"),
        int("ignore_runtime"),
        int("dbserie_episode_id"),
        int("serie_id"),
        int("dbserie_id"),
    ],
    listing: Some(ListingDef {
        from: "serie_episodes LEFT JOIN dbserie_episodes ON dbserie_episodes.id = serie_episodes.dbserie_episode_id LEFT JOIN dbseries ON dbseries.id = serie_episodes.dbserie_id",
        columns: &[
            proj("serie_episodes.id", Integer),
            proj("dbseries.seriename AS seriename", Text),
            proj("dbserie_episodes.identifier AS identifier", Text),
            proj("dbserie_episodes.title AS title", Text),
            proj("serie_episodes.quality_profile", Text),
            proj("serie_episodes.missing", Integer),
            proj("serie_episodes.quality_reached", Integer),
            proj("serie_episodes.lastscan", Timestamp),
        ],
    }),
    search: SearchDef {
        template: "dbseries.seriename LIKE ? OR dbserie_episodes.title LIKE ? OR dbserie_episodes.identifier LIKE ?",
        args: 3,
    },
    readonly: &["lastscan"],
    annotations: &[],
    filters: &[
        filter("missing", "serie_episodes.missing", Equals, Integer),
        filter("quality_reached", "serie_episodes.quality_reached", Equals, Integer),
        filter("serie_id", "serie_episodes.serie_id", Equals, Integer),
        filter("quality_profile", "serie_episodes.quality_profile", Equals, Text),
    ],
    overrides: &[FilterOverride {
        key: "seriename",
        build: episodes_of_serie_named,
    }],
    label: Some(LabelSource {
        from: "serie_episodes LEFT JOIN dbserie_episodes ON dbserie_episodes.id = serie_episodes.dbserie_episode_id LEFT JOIN dbseries ON dbseries.id = serie_episodes.dbserie_id",
        id_column: "serie_episodes.id",
        search_column: "dbseries.seriename",
        parts: &[
            "dbseries.seriename",
            "dbserie_episodes.identifier",
            "dbserie_episodes.title",
        ],
        compose: episode_label,
        scopes: &[],
    }),
};

pub static SERIE_EPISODE_FILES: TableDef = TableDef {
    name: "serie_episode_files",
    entity: "SerieEpisodeFile",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("location"),
        text("filename"),
        text("extension"),
        text("quality_profile"),
        int("proper"),
        int("extended"),
        int("repack"),
        int("height"),
        int("width"),
        int("resolution_id"),
        int("quality_id"),
        int("codec_id"),
        int("audio_id"),
        int("serie_id"),
        int("serie_episode_id"),
        int("dbserie_episode_id"),
        int("dbserie_id"),
    ],
    listing: Some(ListingDef {
        from: "serie_episode_files LEFT JOIN dbseries ON dbseries.id = serie_episode_files.dbserie_id",
        columns: &[
            proj("serie_episode_files.id", Integer),
            proj("dbseries.seriename AS seriename", Text),
            proj("serie_episode_files.filename", Text),
            proj("serie_episode_files.location", Text),
            proj("serie_episode_files.quality_profile", Text),
            proj("serie_episode_files.height", Integer),
            proj("serie_episode_files.width", Integer),
        ],
    }),
    search: SearchDef {
        template: "serie_episode_files.filename LIKE ? OR dbseries.seriename LIKE ?",
        args: 2,
    },
    readonly: &[],
    annotations: &[],
    filters: &[
        filter("serie_id", "serie_episode_files.serie_id", Equals, Integer),
        filter("filename", "serie_episode_files.filename", Contains, Text),
        filter("height", "serie_episode_files.height", GreaterOrEqual, Integer),
    ],
    overrides: &[],
    label: None,
};

pub static SERIE_EPISODE_HISTORIES: TableDef = TableDef {
    name: "serie_episode_histories",
    entity: "SerieEpisodeHistory",
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
        int("blacklisted"),
        text("quality_profile"),
        int("resolution_id"),
        int("quality_id"),
        int("codec_id"),
        int("audio_id"),
        int("serie_id"),
        int("serie_episode_id"),
        int("dbserie_episode_id"),
        int("dbserie_id"),
    ],
    listing: Some(ListingDef {
        from: "serie_episode_histories LEFT JOIN dbseries ON dbseries.id = serie_episode_histories.dbserie_id",
        columns: &[
            proj("serie_episode_histories.id", Integer),
            proj("dbseries.seriename AS seriename", Text),
            proj("serie_episode_histories.title", Text),
            proj("serie_episode_histories.indexer", Text),
            proj("serie_episode_histories.downloaded_at", Timestamp),
            proj("serie_episode_histories.blacklisted", Integer),
        ],
    }),
    search: SearchDef {
        template: "serie_episode_histories.title LIKE ? OR dbseries.seriename LIKE ?",
        args: 2,
    },
    readonly: &[],
    annotations: &[("Target", "Download Target")],
    filters: &[
        filter("indexer", "serie_episode_histories.indexer", Equals, Text),
        filter(
            "downloaded_since",
            "serie_episode_histories.downloaded_at",
            GreaterOrEqual,
            Timestamp,
        ),
        filter("serie_id", "serie_episode_histories.serie_id", Equals, Integer),
    ],
    overrides: &[],
    label: None,
};

pub static SERIE_FILE_UNMATCHEDS: TableDef = TableDef {
    name: "serie_file_unmatcheds",
    entity: "SerieFileUnmatched",
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
        template: "filepath LIKE ? OR listname LIKE ?",
        args: 2,
    },
    readonly: &["last_checked"],
    annotations: &[("ParsedData", "Parsed Data")],
    filters: &[
        filter("listname", "listname", Equals, Text),
        filter("checked_since", "last_checked", GreaterOrEqual, Timestamp),
    ],
    overrides: &[],
    label: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_label() {
        assert_eq!(
            episode_label(&["Lost".into(), "S01E01".into(), "Pilot".into()]),
            "Lost S01E01 - Pilot"
        );
        assert_eq!(
            episode_label(&["Lost".into(), "S01E01".into(), "".into()]),
            "Lost S01E01"
        );
        assert_eq!(episode_label(&["Lost".into()]), "Lost");
    }
}
