//! Dot-path access into parameter maps
//!
//! Explicit recursive walk over a tree of JSON objects, splitting paths
//! like `"options.retry.count"` on `.`. `set_path` creates intermediate
//! objects (overwriting any non-object met along the way); `unset_path`
//! is a no-op when an intermediate segment is absent.

use serde_json::{Map, Value};

use crate::domain::workflow::ParameterMap;

/// Write `value` at the dot-separated `path`, creating intermediate
/// objects as needed.
pub fn set_path(root: &mut ParameterMap, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    set_segments(root, &segments, value);
}

/// Delete the value at the dot-separated `path` if the path resolves;
/// does nothing otherwise.
pub fn unset_path(root: &mut ParameterMap, path: &str) {
    let segments: Vec<&str> = path.split('.').collect();
    unset_segments(root, &segments);
}

/// Read the value at the dot-separated `path`, if the path resolves.
pub fn get_path<'a>(root: &'a ParameterMap, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn set_segments(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                set_segments(child, rest, value);
            }
        }
    }
}

fn unset_segments(map: &mut Map<String, Value>, segments: &[&str]) {
    match segments {
        [] => {}
        [last] => {
            map.remove(*last);
        }
        [head, rest @ ..] => {
            if let Some(Value::Object(child)) = map.get_mut(*head) {
                unset_segments(child, rest);
            }
        }
    }
}
