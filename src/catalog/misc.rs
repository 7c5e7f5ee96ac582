//! Lookup and bookkeeping tables

use super::*;
use crate::fields::SelectOption;
use crate::sql::filter::FilterOp::{Contains, Equals, GreaterOrEqual};
use crate::types::SqlType::{Integer, Text, Timestamp};

/// Discriminator of the shared `qualities` lookup table
pub(crate) const QUALITY_TYPES: &[SelectOption] = &[
    SelectOption::new("1", "resolution"),
    SelectOption::new("2", "quality"),
    SelectOption::new("3", "codec"),
    SelectOption::new("4", "audio"),
];

const JOB_CATEGORIES: &[SelectOption] = &[
    SelectOption::new("Movie", "Movie"),
    SelectOption::new("Serie", "Serie"),
];

pub static QUALITIES: TableDef = TableDef {
    name: "qualities",
    entity: "Qualities",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        int("type").hint(FieldHint::Select(QUALITY_TYPES)),
        text("name"),
        text("regex")
            .help("Go regular expression matched against release names when Use Regex is set"),
        json("strings").hint(FieldHint::List(ScalarKind::Text)),
        int("priority"),
        int("regexgroup"),
        int("use_regex"),
    ],
    listing: None,
    search: SearchDef {
        template: "name LIKE ? OR strings LIKE ?",
        args: 2,
    },
    readonly: &[],
    annotations: &[("Regexgroup", "Regex Group")],
    filters: &[
        filter("type", "type", Equals, Integer),
        filter("name", "name", Contains, Text),
        filter("min_priority", "priority", GreaterOrEqual, Integer),
    ],
    overrides: &[],
    label: Some(LabelSource {
        from: "qualities",
        id_column: "qualities.id",
        search_column: "qualities.name",
        parts: &["qualities.name"],
        compose: label_first,
        scopes: &[
            TypeScope {
                field: "resolution_id",
                column: "qualities.type",
                value: 1,
            },
            TypeScope {
                field: "quality_id",
                column: "qualities.type",
                value: 2,
            },
            TypeScope {
                field: "codec_id",
                column: "qualities.type",
                value: 3,
            },
            TypeScope {
                field: "audio_id",
                column: "qualities.type",
                value: 4,
            },
        ],
    }),
};

pub static JOB_HISTORIES: TableDef = TableDef {
    name: "job_histories",
    entity: "JobHistory",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("job_type"),
        text("job_category").hint(FieldHint::Select(JOB_CATEGORIES)),
        text("job_group"),
        timestamp("started"),
        timestamp("ended"),
    ],
    listing: None,
    search: SearchDef {
        template: "job_type LIKE ? OR job_group LIKE ?",
        args: 2,
    },
    readonly: &[],
    annotations: &[],
    filters: &[
        filter("job_type", "job_type", Equals, Text),
        filter("job_category", "job_category", Equals, Text),
        filter("started_since", "started", GreaterOrEqual, Timestamp),
    ],
    overrides: &[],
    label: None,
};

pub static R_SSHISTORIES: TableDef = TableDef {
    name: "r_sshistories",
    entity: "RSSHistory",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("config"),
        text("list"),
        text("indexer"),
        text("last_id"),
    ],
    listing: None,
    search: SearchDef {
        template: "config LIKE ? OR indexer LIKE ?",
        args: 2,
    },
    readonly: &[],
    annotations: &[("LastID", "Last Seen ID")],
    filters: &[filter("indexer", "indexer", Equals, Text)],
    overrides: &[],
    label: None,
};

pub static INDEXER_FAILS: TableDef = TableDef {
    name: "indexer_fails",
    entity: "IndexerFail",
    columns: &[
        ID,
        CREATED_AT,
        UPDATED_AT,
        text("indexer"),
        timestamp("last_fail"),
    ],
    listing: None,
    search: SearchDef {
        template: "indexer LIKE ?",
        args: 1,
    },
    readonly: &[],
    annotations: &[("LastFail", "Last Failure")],
    filters: &[filter("failed_since", "last_fail", GreaterOrEqual, Timestamp)],
    overrides: &[],
    label: None,
};
