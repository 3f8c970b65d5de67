//! Walk attribution: stamping walks with the member who owns the tracker.
//!
//! Runs after reconciliation and never changes which walks exist. Devices with
//! no known owner are reported back so the caller can decide what to do.

use std::collections::{BTreeSet, HashMap};

use crate::models::{User, Walk};

/// Owner of a tracker device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOwner {
    pub user_id: String,
    pub tax_id: String,
}

/// Read-only device → owner lookup supplied by the user-management side.
pub trait DeviceLookup {
    fn owner_of(&self, device_id: &str) -> Option<&DeviceOwner>;
}

impl DeviceLookup for HashMap<String, DeviceOwner> {
    fn owner_of(&self, device_id: &str) -> Option<&DeviceOwner> {
        self.get(device_id)
    }
}

/// Device directory built from the member list.
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    owners: HashMap<String, DeviceOwner>,
}

impl DeviceDirectory {
    /// Index every device registered to a member.
    ///
    /// A device claimed by more than one member resolves to the last one listed.
    pub fn from_users(users: &[User]) -> Self {
        let mut owners = HashMap::new();

        for user in users {
            for device_id in &user.device_ids {
                let owner = DeviceOwner {
                    user_id: user.id.clone(),
                    tax_id: user.tax_id.clone(),
                };
                if let Some(previous) = owners.insert(device_id.clone(), owner) {
                    tracing::warn!(
                        device_id = %device_id,
                        previous_user_id = %previous.user_id,
                        user_id = %user.id,
                        "Device registered to more than one user"
                    );
                }
            }
        }

        Self { owners }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl DeviceLookup for DeviceDirectory {
    fn owner_of(&self, device_id: &str) -> Option<&DeviceOwner> {
        self.owners.get(device_id)
    }
}

/// Walks after attribution, plus devices nobody owns.
#[derive(Debug, Clone, Default)]
pub struct AttributionOutcome {
    pub walks: Vec<Walk>,
    pub unmapped_devices: BTreeSet<String>,
}

impl AttributionOutcome {
    pub fn attributed_count(&self) -> usize {
        self.walks.iter().filter(|w| w.is_attributed()).count()
    }
}

/// Stamp each walk with its device owner. Unknown devices keep empty fields.
pub fn attribute_walks<L>(walks: Vec<Walk>, lookup: &L) -> AttributionOutcome
where
    L: DeviceLookup + ?Sized,
{
    let mut unmapped_devices = BTreeSet::new();

    let walks = walks
        .into_iter()
        .map(|mut walk| {
            match lookup.owner_of(&walk.device_id) {
                Some(owner) => {
                    walk.user_id = owner.user_id.clone();
                    walk.user_tax_id = owner.tax_id.clone();
                }
                None => {
                    unmapped_devices.insert(walk.device_id.clone());
                }
            }
            walk
        })
        .collect();

    AttributionOutcome {
        walks,
        unmapped_devices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlarmType, GeofenceEvent, PetPlan};

    fn walk(device: &str, exit_id: i64) -> Walk {
        let event = |id, alarm_type, at| GeofenceEvent {
            id,
            device_id: device.to_string(),
            device_name: "Tobias".to_string(),
            geozone_name: "Casa".to_string(),
            alarm_type,
            created_at_ms: at,
            lat: 0.0,
            lng: 0.0,
        };
        Walk::from_events(
            event(exit_id, AlarmType::Exit, 1_714_550_400_000),
            event(exit_id + 1, AlarmType::Entry, 1_714_551_100_000),
        )
    }

    #[test]
    fn test_attribute_known_device() {
        let users = vec![User::new("u1", "111", PetPlan::Pet1).with_devices(["d1"])];
        let directory = DeviceDirectory::from_users(&users);

        let outcome = attribute_walks(vec![walk("d1", 1)], &directory);

        assert_eq!(outcome.walks[0].user_id, "u1");
        assert_eq!(outcome.walks[0].user_tax_id, "111");
        assert!(outcome.unmapped_devices.is_empty());
        assert_eq!(outcome.attributed_count(), 1);
    }

    #[test]
    fn test_unknown_device_left_empty_and_reported() {
        let directory = DeviceDirectory::default();

        let outcome = attribute_walks(vec![walk("d9", 1), walk("d9", 3)], &directory);

        assert_eq!(outcome.walks.len(), 2);
        assert!(outcome.walks.iter().all(|w| w.user_id.is_empty()));
        assert_eq!(outcome.unmapped_devices.len(), 1);
        assert!(outcome.unmapped_devices.contains("d9"));
    }

    #[test]
    fn test_user_with_multiple_devices() {
        let users = vec![
            User::new("u1", "111", PetPlan::Pet1).with_devices(["d1", "d2"]),
            User::new("u2", "222", PetPlan::Pet3).with_devices(["d3"]),
        ];
        let directory = DeviceDirectory::from_users(&users);
        assert_eq!(directory.len(), 3);

        let outcome = attribute_walks(
            vec![walk("d2", 1), walk("d3", 3), walk("d1", 5)],
            &directory,
        );

        let owners: Vec<&str> = outcome.walks.iter().map(|w| w.user_id.as_str()).collect();
        assert_eq!(owners, vec!["u1", "u2", "u1"]);
    }

    #[test]
    fn test_plain_map_lookup() {
        let mut map = HashMap::new();
        map.insert(
            "d1".to_string(),
            DeviceOwner {
                user_id: "u7".to_string(),
                tax_id: "777".to_string(),
            },
        );

        let outcome = attribute_walks(vec![walk("d1", 1)], &map);
        assert_eq!(outcome.walks[0].user_id, "u7");
    }

    #[test]
    fn test_duplicate_device_last_owner_wins() {
        let users = vec![
            User::new("u1", "111", PetPlan::Pet1).with_devices(["d1"]),
            User::new("u2", "222", PetPlan::Pet1).with_devices(["d1"]),
        ];
        let directory = DeviceDirectory::from_users(&users);

        assert_eq!(directory.owner_of("d1").unwrap().user_id, "u2");
    }
}
