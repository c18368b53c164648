//! Serialize maps with non-string keys as sorted `[key, value]` sequences.

use serde::Serializer;
use serde::ser::Serialize;
use std::collections::BTreeMap;

pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    K: Serialize,
    V: Serialize,
    S: Serializer,
{
    serializer.collect_seq(map.iter())
}
