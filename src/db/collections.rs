//! Named get/save pairs over the bridge, one per collection. Each pair is
//! generated from a single line so the read and the write always target the
//! same collection name.

use super::{Bridge, Collection, Record, WriteOutcome};

macro_rules! collection_accessors {
    ($($get:ident, $save:ident => $collection:expr;)*) => {
        impl Bridge {
            $(
                pub async fn $get(&self) -> Vec<Record> {
                    self.get($collection).await.value
                }

                pub async fn $save(&self, records: &[Record]) -> WriteOutcome {
                    self.save($collection, records).await
                }
            )*
        }
    };
}

collection_accessors! {
    get_users, save_users => Collection::Users;
    get_meals, save_meals => Collection::Meals;
    get_menus, save_menus => Collection::Menus;
    get_waste, save_waste => Collection::Waste;
    get_feedbacks, save_feedbacks => Collection::Feedbacks;
    get_notifications, save_notifications => Collection::Notifications;
    get_complaints, save_complaints => Collection::Complaints;
    get_events, save_events => Collection::Events;
    get_attendance, save_attendance => Collection::Attendance;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::local::LocalSnapshot;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_pairs_target_their_own_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let bridge = Bridge::local_only(LocalSnapshot::new(&path));
        let rec = |name: &str| json!({ "_id": name }).as_object().cloned().unwrap();

        bridge.save_waste(&[rec("w")]).await;
        bridge.save_complaints(&[rec("c")]).await;
        bridge.save_events(&[rec("e")]).await;
        bridge.save_notifications(&[rec("n")]).await;

        assert_eq!(bridge.get_waste().await, vec![rec("w")]);
        assert_eq!(bridge.get_complaints().await, vec![rec("c")]);
        assert_eq!(bridge.get_events().await, vec![rec("e")]);
        assert_eq!(bridge.get_notifications().await, vec![rec("n")]);
        assert!(bridge.get_meals().await.is_empty());

        let doc: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(doc["complaints"][0]["_id"], "c");
        assert_eq!(doc["waste"][0]["_id"], "w");
    }
}
