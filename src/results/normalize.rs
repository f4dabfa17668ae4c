// src/results/normalize.rs

use serde_json::{Map, Value};

use crate::models::result::{CategoryBucket, NOT_AVAILABLE, ScoreEntry, TestResultRecord};
use crate::results::probe::{Accessor, at_path, first_matching, first_non_empty_object, first_present};

/// Roles that never show up in the end-user results list.
const EXCLUDED_ROLES: &[&str] = &["admin", "administrator"];

fn top_level_clusters(item: &Value) -> Option<&Value> {
    item.get("cluster_scores")
}

fn wrapped_clusters(item: &Value) -> Option<&Value> {
    at_path(item, &["scores", "cluster_scores"])
}

fn alternate_clusters(item: &Value) -> Option<&Value> {
    item.get("clusters")
}

fn top_level_constructs(item: &Value) -> Option<&Value> {
    item.get("construct_scores")
}

fn wrapped_constructs(item: &Value) -> Option<&Value> {
    at_path(item, &["scores", "construct_scores"])
}

fn alternate_constructs(item: &Value) -> Option<&Value> {
    item.get("constructs")
}

/// Where cluster scores may live, most specific first.
pub const CLUSTER_LOCATIONS: &[Accessor] =
    &[top_level_clusters, wrapped_clusters, alternate_clusters];

/// Where construct scores may live, most specific first.
pub const CONSTRUCT_LOCATIONS: &[Accessor] =
    &[top_level_constructs, wrapped_constructs, alternate_constructs];

fn bare_list(payload: &Value) -> Option<&Value> {
    Some(payload)
}

fn data_list(payload: &Value) -> Option<&Value> {
    payload.get("data")
}

fn paginated_list(payload: &Value) -> Option<&Value> {
    at_path(payload, &["data", "data"])
}

/// Where the list of results may live in a response envelope.
pub const LIST_LOCATIONS: &[Accessor] = &[bare_list, data_list, paginated_list];

/// Normalizes a whole API response.
///
/// Items that cannot be identified, and admin accounts, are dropped. Every
/// other item is kept, however incomplete.
pub fn normalize_batch(payload: &Value) -> Vec<TestResultRecord> {
    let Some(items) = list_items(payload) else {
        tracing::warn!("Results payload contained no list; treating it as empty");
        return Vec::new();
    };

    let records: Vec<TestResultRecord> = items.iter().filter_map(normalize_item).collect();
    tracing::debug!(
        "Normalized {} of {} result items",
        records.len(),
        items.len()
    );
    records
}

/// Finds the array of items in a list response, whatever envelope wraps it.
pub fn list_items(payload: &Value) -> Option<&Vec<Value>> {
    first_matching(payload, LIST_LOCATIONS, Value::is_array).and_then(Value::as_array)
}

/// Normalizes a single result item.
///
/// Returns `None` for non-objects, for items carrying neither a result id nor a
/// user id, and for admin accounts.
pub fn normalize_item(item: &Value) -> Option<TestResultRecord> {
    if !item.is_object() {
        tracing::debug!("Skipping result item that is not an object");
        return None;
    }

    let result_id = int_at(item, &[&["id"], &["result_id"], &["test_result_id"]]);
    let user_id = int_at(item, &[&["user_id"], &["user", "id"]]);
    if result_id.is_none() && user_id.is_none() {
        tracing::debug!("Skipping result item without result or user id");
        return None;
    }

    let role = resolve_role(item);
    if is_excluded_role(role.as_deref()) {
        tracing::debug!(?result_id, "Skipping result item belonging to an admin account");
        return None;
    }

    let overall_category = text_at(item, &[&["overall_category"], &["scores", "overall_category"]]);

    Some(TestResultRecord {
        result_id,
        user_id,
        name: resolve_name(item),
        email: user_text(item, "email"),
        role: role.unwrap_or_else(not_available),
        contact: text_at(
            item,
            &[
                &["user", "contact_number"],
                &["user", "contact"],
                &["user", "phone"],
                &["contact_number"],
                &["contact"],
            ],
        )
        .unwrap_or_else(not_available),
        gender: user_text(item, "gender"),
        age: user_text(item, "age"),
        city: user_text(item, "city"),
        state: user_text(item, "state"),
        profession: user_text(item, "profession"),
        test_title: text_at(item, &[&["test", "title"], &["test_title"], &["test", "name"]])
            .unwrap_or_else(not_available),
        test_description: text_at(item, &[&["test", "description"], &["test_description"]])
            .unwrap_or_else(not_available),
        total_score: number_at(item, &[&["total_score"], &["scores", "total_score"]]),
        average_score: number_at(item, &[&["average_score"], &["scores", "average_score"]]),
        average_percentage: number_at(
            item,
            &[&["average_percentage"], &["scores", "average_percentage"]],
        ),
        overall_bucket: CategoryBucket::from_category(overall_category.as_deref()),
        overall_category: overall_category.unwrap_or_else(not_available),
        clusters: score_entries(first_non_empty_object(item, CLUSTER_LOCATIONS)),
        constructs: score_entries(first_non_empty_object(item, CONSTRUCT_LOCATIONS)),
        sdb_percentage: number_at(
            item,
            &[&["sdb_percentage"], &["scores", "sdb_percentage"], &["sdb", "percentage"]],
        ),
        raw: item.clone(),
    })
}

/// Explicit name, then first + last name, then "N/A".
fn resolve_name(item: &Value) -> String {
    if let Some(name) = text_at(item, &[&["user", "name"], &["name"], &["user_name"]]) {
        return name;
    }

    let first = text_at(item, &[&["user", "first_name"], &["first_name"]]);
    let last = text_at(item, &[&["user", "last_name"], &["last_name"]]);
    let joined = [first, last].into_iter().flatten().collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        not_available()
    } else {
        joined
    }
}

fn nested_role(item: &Value) -> Option<&Value> {
    at_path(item, &["user", "role"])
}

fn top_level_role(item: &Value) -> Option<&Value> {
    item.get("role")
}

fn flat_role(item: &Value) -> Option<&Value> {
    item.get("user_role")
}

const ROLE_LOCATIONS: &[Accessor] = &[nested_role, top_level_role, flat_role];

/// Role as a plain string, whether the API sent `"role": "x"` or `"role": {"name": "x"}`.
fn resolve_role(item: &Value) -> Option<String> {
    let role = first_present(item, ROLE_LOCATIONS)?;
    match role {
        Value::Object(map) => map.get("name").and_then(as_text),
        other => as_text(other),
    }
}

fn is_excluded_role(role: Option<&str>) -> bool {
    role.is_some_and(|role| {
        let role = role.trim();
        EXCLUDED_ROLES
            .iter()
            .any(|excluded| role.eq_ignore_ascii_case(excluded))
    })
}

fn score_entries(container: Option<&Map<String, Value>>) -> Vec<ScoreEntry> {
    let Some(container) = container else {
        return Vec::new();
    };

    container
        .iter()
        .map(|(key, entry)| {
            let category = text_at(entry, &[&["category"], &["category_name"]]);
            ScoreEntry {
                name: text_at(entry, &[&["name"], &["cluster_name"], &["construct_name"]])
                    .unwrap_or_else(|| key.clone()),
                total: number_at(entry, &[&["total"], &["total_score"]]),
                average: number_at(entry, &[&["average"], &["average_score"]]),
                percentage: number_at(entry, &[&["percentage"], &["average_percentage"]]),
                count: count_at(entry, &[&["count"], &["question_count"]]),
                bucket: CategoryBucket::from_category(category.as_deref()),
                category,
            }
        })
        .collect()
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

fn user_text(item: &Value, key: &str) -> String {
    item.get("user")
        .and_then(|user| user.get(key))
        .and_then(as_text)
        .or_else(|| item.get(key).and_then(as_text))
        .unwrap_or_else(not_available)
}

fn text_at(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| at_path(value, path))
        .find_map(as_text)
}

fn number_at(value: &Value, paths: &[&[&str]]) -> Option<f64> {
    paths
        .iter()
        .filter_map(|path| at_path(value, path))
        .find_map(as_number)
}

fn int_at(value: &Value, paths: &[&[&str]]) -> Option<i64> {
    paths
        .iter()
        .filter_map(|path| at_path(value, path))
        .find_map(as_int)
}

fn count_at(value: &Value, paths: &[&[&str]]) -> Option<u64> {
    paths
        .iter()
        .filter_map(|path| at_path(value, path))
        .find_map(as_count)
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-empty strings and numbers render as text; everything else is absent.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers and numeric strings; `NaN`/infinite strings are treated as absent.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_item() -> Value {
        json!({
            "id": 11,
            "user_id": 5,
            "user": {
                "id": 5,
                "name": "Asha Rao",
                "email": "asha@example.com",
                "role": "user",
                "contact_number": "9876543210",
                "gender": "female",
                "age": 17,
                "city": "Pune",
                "state": "MH",
                "profession": "Student"
            },
            "test": { "title": "Strengths Compass", "description": "Core battery" },
            "total_score": 142,
            "average_score": "3.55",
            "average_percentage": 71.0,
            "overall_category": "High",
            "sdb_percentage": 12.5
        })
    }

    #[test]
    fn unparsable_number_falls_through_to_the_next_location() {
        let item = json!({
            "id": "",
            "result_id": 8,
            "total_score": "",
            "scores": { "total_score": 64 },
            "cluster_scores": { "t": { "count": "n/a", "question_count": 4 } }
        });
        let record = normalize_item(&item).unwrap();
        assert_eq!(record.result_id, Some(8));
        assert_eq!(record.total_score, Some(64.0));
        assert_eq!(record.clusters[0].count, Some(4));
    }

    #[test]
    fn flattens_a_complete_item() {
        let record = normalize_item(&base_item()).unwrap();
        assert_eq!(record.result_id, Some(11));
        assert_eq!(record.user_id, Some(5));
        assert_eq!(record.name, "Asha Rao");
        assert_eq!(record.contact, "9876543210");
        assert_eq!(record.age, "17");
        assert_eq!(record.test_title, "Strengths Compass");
        assert_eq!(record.total_score, Some(142.0));
        assert_eq!(record.average_score, Some(3.55));
        assert_eq!(record.overall_bucket, CategoryBucket::High);
        assert_eq!(record.sdb_percentage, Some(12.5));
        assert_eq!(record.raw, base_item());
    }

    #[test]
    fn name_falls_back_to_first_and_last_then_placeholder() {
        let mut item = base_item();
        item["user"] = json!({ "first_name": "Ravi", "last_name": "Kumar" });
        assert_eq!(normalize_item(&item).unwrap().name, "Ravi Kumar");

        item["user"] = json!({ "first_name": "Ravi" });
        assert_eq!(normalize_item(&item).unwrap().name, "Ravi");

        item["user"] = json!({});
        assert_eq!(normalize_item(&item).unwrap().name, NOT_AVAILABLE);
    }

    #[test]
    fn clusters_are_read_from_any_of_three_locations() {
        let entry = json!({ "Thinking": { "total": 20, "average": 4.0, "percentage": 80, "count": 5, "category": "high" } });

        for shape in [
            json!({ "id": 1, "cluster_scores": entry.clone() }),
            json!({ "id": 1, "scores": { "cluster_scores": entry.clone() } }),
            json!({ "id": 1, "clusters": entry.clone() }),
        ] {
            let record = normalize_item(&shape).unwrap();
            assert_eq!(record.clusters.len(), 1, "shape: {}", shape);
            assert_eq!(record.clusters[0].name, "Thinking");
            assert_eq!(record.clusters[0].count, Some(5));
            assert_eq!(record.clusters[0].bucket, CategoryBucket::High);
        }
    }

    #[test]
    fn first_non_empty_location_wins() {
        let item = json!({
            "id": 1,
            "cluster_scores": {},
            "scores": { "cluster_scores": { "Relating": { "total": 3 } } },
            "clusters": { "Ignored": { "total": 9 } }
        });
        let record = normalize_item(&item).unwrap();
        assert_eq!(record.clusters.len(), 1);
        assert_eq!(record.clusters[0].name, "Relating");
    }

    #[test]
    fn malformed_containers_are_no_data() {
        let item = json!({ "id": 1, "cluster_scores": [1, 2], "constructs": "oops", "scores": 7 });
        let record = normalize_item(&item).unwrap();
        assert!(record.clusters.is_empty());
        assert!(record.constructs.is_empty());
    }

    #[test]
    fn entries_keep_payload_order_and_prefer_explicit_names() {
        let item = json!({
            "id": 1,
            "construct_scores": {
                "c9": { "construct_name": "Empathy", "total": 0 },
                "c2": { "total": null, "average": "n/a" },
                "c5": 4
            }
        });
        let record = normalize_item(&item).unwrap();
        let names: Vec<&str> = record.constructs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Empathy", "c2", "c5"]);
        assert_eq!(record.constructs[0].total, Some(0.0));
        assert_eq!(record.constructs[1].total, None);
        assert_eq!(record.constructs[1].average, None);
        assert_eq!(record.constructs[2].percentage, None);
    }

    #[test]
    fn admin_accounts_are_excluded_case_insensitively() {
        for role in [json!("admin"), json!("Administrator"), json!(" ADMIN "), json!({ "name": "Admin" })] {
            let mut item = base_item();
            item["user"]["role"] = role.clone();
            assert!(normalize_item(&item).is_none(), "role {} was kept", role);
        }

        let mut item = base_item();
        item["user"]["role"] = json!("administrative-staff");
        assert!(normalize_item(&item).is_some());
    }

    #[test]
    fn role_is_read_from_the_first_populated_location() {
        let item = json!({ "id": 3, "user": { "role": null }, "role": "Admin" });
        assert!(normalize_item(&item).is_none());

        let item = json!({ "id": 3, "user_role": "administrator" });
        assert!(normalize_item(&item).is_none());

        let item = json!({ "id": 3, "user": { "role": "student" }, "role": "admin" });
        assert!(normalize_item(&item).is_some());
    }

    #[test]
    fn unidentifiable_items_are_dropped_but_sparse_ones_are_kept() {
        assert!(normalize_item(&json!("text")).is_none());
        assert!(normalize_item(&json!({ "user": { "name": "Nobody" } })).is_none());

        let record = normalize_item(&json!({ "user_id": "42" })).unwrap();
        assert_eq!(record.user_id, Some(42));
        assert_eq!(record.name, NOT_AVAILABLE);
        assert_eq!(record.email, NOT_AVAILABLE);
        assert_eq!(record.overall_category, NOT_AVAILABLE);
        assert_eq!(record.overall_bucket, CategoryBucket::LowOrOther);
        assert_eq!(record.total_score, None);
    }

    #[test]
    fn batch_accepts_all_envelopes_and_skips_bad_items() {
        let items = json!([base_item(), 17, { "id": 2, "user": { "role": "admin" } }, { "id": 3 }]);

        for payload in [
            items.clone(),
            json!({ "data": items.clone() }),
            json!({ "data": { "data": items.clone(), "total": 4 } }),
        ] {
            let ids: Vec<Option<i64>> = normalize_batch(&payload).iter().map(|r| r.result_id).collect();
            assert_eq!(ids, [Some(11), Some(3)]);
        }

        assert!(normalize_batch(&json!({ "message": "ok" })).is_empty());
    }
}
