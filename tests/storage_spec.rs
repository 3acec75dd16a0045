use hbnb::models::*;
use hbnb::storage::{FileStorage, ReloadSummary, StorageError};
use serde_json::{json, Map, Value};
use speculate2::speculate;

fn read_document(storage: &FileStorage) -> Map<String, Value> {
    let contents = std::fs::read_to_string(storage.path()).expect("Failed to read store file");
    serde_json::from_str(&contents).expect("Store file is not a JSON object")
}

fn rendered(storage: &FileStorage) -> Vec<(String, Attributes)> {
    storage
        .all()
        .iter()
        .map(|(key, instance)| (key.clone(), instance.to_attributes()))
        .collect()
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("file.json");
        let mut storage = FileStorage::open(&path);
    }

    describe "register" {
        it "addresses instances by composite key" {
            let user = Instance::from_attributes(match json!({
                "__class__": "User",
                "id": "abc",
                "created_at": "2017-09-28T21:03:54.052298",
                "updated_at": "2017-09-28T21:03:54.052298"
            }) {
                Value::Object(map) => map,
                _ => unreachable!(),
            }).expect("Failed to build user");

            let key = storage.register(user.clone());

            assert_eq!(key, "User.abc");
            assert_eq!(storage.all()["User.abc"], user);
        }

        it "is idempotent for the same identity" {
            let city = Instance::new(Kind::City);

            storage.register(city.clone());
            storage.register(city.clone());

            assert_eq!(storage.all().len(), 1);
        }

        it "overwrites an existing entry in place" {
            let first = storage.new_instance(Kind::State).id().to_string();
            storage.new_instance(Kind::State);

            let mut renamed = storage.get(Kind::State, &first).unwrap().clone();
            renamed.set("name", "California").unwrap();
            storage.register(renamed);

            assert_eq!(storage.all().len(), 2);
            assert_eq!(storage.all()[0].get("name"), Some(&json!("California")));
        }
    }

    describe "new_instance" {
        it "registers the fresh instance" {
            let id = storage.new_instance(Kind::User).id().to_string();

            assert_eq!(storage.all().len(), 1);
            assert!(storage.all().contains_key(&format!("User.{}", id)));
        }
    }

    describe "lookup" {
        it "finds, counts and removes by kind and id" {
            let user_id = storage.new_instance(Kind::User).id().to_string();
            storage.new_instance(Kind::User);
            storage.new_instance(Kind::Place);

            assert!(storage.get(Kind::User, &user_id).is_some());
            assert!(storage.get(Kind::Place, &user_id).is_none());
            assert_eq!(storage.count(Some(Kind::User)), 2);
            assert_eq!(storage.count(None), 3);

            let removed = storage.remove(Kind::User, &user_id).expect("Instance should exist");
            assert_eq!(removed.id(), user_id);
            assert_eq!(storage.count(Some(Kind::User)), 1);
            assert!(storage.remove(Kind::User, &user_id).is_none());
        }
    }

    describe "save" {
        it "writes every instance keyed by composite key" {
            let id = storage.new_instance(Kind::User).id().to_string();
            storage.save().expect("Failed to save");

            let document = read_document(&storage);
            let key = format!("User.{}", id);
            assert_eq!(document.len(), 1);

            let entry = document[&key].as_object().expect("Entry should be an object");
            let keys: Vec<&str> = entry.keys().map(String::as_str).collect();
            assert_eq!(
                keys,
                vec!["__class__", "id", "created_at", "updated_at", "email", "password", "first_name", "last_name"]
            );
            assert_eq!(entry["__class__"], json!("User"));
            assert_eq!(entry["id"], json!(id));
            assert_eq!(entry["email"], json!(""));
        }

        it "writes mutations made through the live mapping" {
            let key = storage.register(Instance::new(Kind::Review));
            storage
                .all_mut()
                .get_mut(&key)
                .expect("Instance should exist")
                .set("text", "Lovely")
                .unwrap();
            storage.save().expect("Failed to save");

            assert_eq!(read_document(&storage)[&key]["text"], json!("Lovely"));
        }

        it "replaces the file in full" {
            let id = storage.new_instance(Kind::Amenity).id().to_string();
            storage.save().expect("Failed to save");

            storage.remove(Kind::Amenity, &id);
            storage.save().expect("Failed to save");

            assert!(read_document(&storage).is_empty());
        }

        it "propagates write failures" {
            let mut broken = FileStorage::open(dir.path().join("missing").join("file.json"));
            broken.new_instance(Kind::User);

            let result = broken.save();

            assert!(matches!(result, Err(StorageError::Write { .. })));
        }
    }

    describe "save_instance" {
        it "refreshes updated_at before writing" {
            let id = storage.new_instance(Kind::User).id().to_string();
            let before = storage.get(Kind::User, &id).unwrap().updated_at();

            let saved = storage.save_instance(Kind::User, &id).expect("Failed to save");

            let user = storage.get(Kind::User, &id).unwrap();
            assert!(saved);
            assert!(user.updated_at() > before);
            assert!(user.updated_at() > user.created_at());

            let document = read_document(&storage);
            assert_eq!(
                document[&format!("User.{}", id)]["updated_at"],
                json!(format_timestamp(&user.updated_at()))
            );
        }

        it "reports a missing instance without writing" {
            let saved = storage.save_instance(Kind::User, "nope").expect("Should not fail");

            assert!(!saved);
            assert!(!path.exists());
        }
    }

    describe "reload" {
        it "leaves the store untouched when the file is missing" {
            let id = storage.new_instance(Kind::Review).id().to_string();

            let summary = storage.reload();

            assert_eq!(summary, ReloadSummary::default());
            assert_eq!(storage.all().len(), 1);
            assert!(storage.get(Kind::Review, &id).is_some());
        }

        it "treats a corrupt file as no prior state" {
            std::fs::write(&path, "{ this is not json").expect("Failed to write");

            let summary = storage.reload();

            assert_eq!(summary, ReloadSummary::default());
            assert!(storage.all().is_empty());
        }

        it "treats a non-object document as no prior state" {
            std::fs::write(&path, "[1, 2, 3]").expect("Failed to write");

            storage.reload();

            assert!(storage.all().is_empty());
        }

        it "reproduces the saved mapping exactly" {
            storage.new_instance(Kind::BaseModel);
            storage.new_instance(Kind::User).set("email", "a@b.com").unwrap();
            let place = storage.new_instance(Kind::Place);
            place.set("latitude", 37.77).unwrap();
            place.set("amenity_ids", json!(["wifi", "pool"])).unwrap();
            storage.save().expect("Failed to save");

            let mut reloaded = FileStorage::open(&path);
            let summary = reloaded.reload();

            assert_eq!(summary, ReloadSummary { loaded: 3, skipped: 0 });
            assert_eq!(rendered(&reloaded), rendered(&storage));
        }

        it "persists direct field updates" {
            let id = {
                let user = storage.new_instance(Kind::User);
                user.set("email", "a@b.com").unwrap();
                user.id().to_string()
            };
            storage.save_instance(Kind::User, &id).expect("Failed to save");

            let mut reloaded = FileStorage::open(&path);
            reloaded.reload();

            let user = reloaded.get(Kind::User, &id).expect("User should be reloaded");
            assert_eq!(user.get("email"), Some(&json!("a@b.com")));
        }

        it "keeps the persisted key even when it differs from kind and id" {
            std::fs::write(&path, json!({
                "User.legacy": {
                    "__class__": "User",
                    "id": "abc",
                    "created_at": "2017-09-28T21:03:54.052298",
                    "updated_at": "2017-09-28T21:03:54.052298"
                }
            }).to_string()).expect("Failed to write");

            storage.reload();

            assert!(storage.all().contains_key("User.legacy"));
            assert_eq!(storage.all()["User.legacy"].id(), "abc");
        }

        it "skips entries with an unknown kind and loads the rest" {
            std::fs::write(&path, json!({
                "Spaceship.1": {
                    "__class__": "Spaceship",
                    "id": "1",
                    "created_at": "2017-09-28T21:03:54",
                    "updated_at": "2017-09-28T21:03:54"
                },
                "State.2": {
                    "__class__": "State",
                    "id": "2",
                    "created_at": "2017-09-28T21:03:54",
                    "updated_at": "2017-09-28T21:03:54",
                    "name": "Nevada"
                },
                "City.3": "not an object"
            }).to_string()).expect("Failed to write");

            let summary = storage.reload();

            assert_eq!(summary, ReloadSummary { loaded: 1, skipped: 2 });
            assert_eq!(storage.all().len(), 1);
            assert_eq!(storage.get(Kind::State, "2").unwrap().get("name"), Some(&json!("Nevada")));
        }

        it "skips entries updated before they were created" {
            std::fs::write(&path, json!({
                "User.backwards": {
                    "__class__": "User",
                    "id": "backwards",
                    "created_at": "2020-01-01T00:00:00",
                    "updated_at": "2019-01-01T00:00:00"
                },
                "User.forwards": {
                    "__class__": "User",
                    "id": "forwards",
                    "created_at": "2019-01-01T00:00:00",
                    "updated_at": "2020-01-01T00:00:00"
                }
            }).to_string()).expect("Failed to write");

            let summary = storage.reload();

            assert_eq!(summary, ReloadSummary { loaded: 1, skipped: 1 });
            assert!(storage.get(Kind::User, "backwards").is_none());
            let user = storage.get(Kind::User, "forwards").expect("User should be reloaded");
            assert!(user.updated_at() >= user.created_at());
        }

        it "merges into instances already in memory" {
            let saved = storage.new_instance(Kind::City).id().to_string();
            storage.save().expect("Failed to save");

            let mut other = FileStorage::open(&path);
            let local = other.new_instance(Kind::Amenity).id().to_string();
            other.reload();

            assert_eq!(other.all().len(), 2);
            assert!(other.get(Kind::City, &saved).is_some());
            assert!(other.get(Kind::Amenity, &local).is_some());
        }
    }

    describe "end to end" {
        it "creates, saves, and reloads a user" {
            let original = storage.new_instance(Kind::User).clone();
            assert_eq!(storage.all().len(), 1);
            assert!(storage.all().contains_key(&format!("User.{}", original.id())));

            storage.save().expect("Failed to save");

            let mut fresh = FileStorage::open(&path);
            fresh.reload();

            assert_eq!(fresh.all().len(), 1);
            let reloaded = fresh.get(Kind::User, original.id()).expect("User should be reloaded");
            assert_eq!(reloaded.to_attributes(), original.to_attributes());
        }
    }
}
