//! Conversions for filter and update values.
//!
//! Documents go through the driver's raw serializer, which is not
//! human-readable: a `Uuid` lands as BSON binary and a `DateTime<Utc>` as an
//! RFC 3339 string. Filters and `$set` payloads have to produce the same
//! shapes or they silently match nothing.

use chrono::{DateTime, SecondsFormat, Utc};
use mongodb::bson::{Bson, SerializerOptions, to_bson_with_options};
use uuid::Uuid;

/// BSON form of a `Uuid` as stored by `insert_one`/`replace_one`.
pub fn uuid_bson(id: Uuid) -> Bson {
    let options = SerializerOptions::builder().human_readable(false).build();
    to_bson_with_options(&id, options).unwrap_or(Bson::Null)
}

/// `uuid_bson` over a slice, for `$in` filters.
pub fn uuids_bson(ids: &[Uuid]) -> Bson {
    Bson::Array(ids.iter().copied().map(uuid_bson).collect())
}

/// BSON form of a timestamp as stored by serde.
pub fn timestamp_bson(at: DateTime<Utc>) -> Bson {
    Bson::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, spec::BinarySubtype};

    #[derive(serde::Serialize)]
    struct Row {
        id: Uuid,
        at: DateTime<Utc>,
    }

    #[test]
    fn uuid_matches_raw_document_encoding() {
        let id = Uuid::now_v7();
        let at = Utc::now();
        let raw = mongodb::bson::to_raw_document_buf(&Row { id, at }).unwrap();
        let stored = raw.to_document().unwrap();

        assert_eq!(stored.get("id"), Some(&uuid_bson(id)));
        assert_eq!(stored.get("at"), Some(&timestamp_bson(at)));
    }

    #[test]
    fn uuid_is_binary() {
        match uuid_bson(Uuid::now_v7()) {
            Bson::Binary(binary) => {
                assert_eq!(binary.subtype, BinarySubtype::Generic);
                assert_eq!(binary.bytes.len(), 16);
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn uuids_build_an_array() {
        let ids = [Uuid::now_v7(), Uuid::now_v7()];
        let filter = doc! { "_id": { "$in": uuids_bson(&ids) } };
        let values = filter
            .get_document("_id")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(values.len(), 2);
    }
}
