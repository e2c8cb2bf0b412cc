//! Users and complaint records shared by the suites

use cms_client::client::{CredentialStore, LocalCache};
use cms_client::shared::{RecordId, User, UserRole};
use serde_json::{json, Value};

pub const CITIZEN_TOKEN: &str = "citizen-token";
pub const OFFICER_TOKEN: &str = "officer-token";
pub const ADMIN_TOKEN: &str = "admin-token";

pub fn citizen() -> User {
    User {
        id: RecordId::from("3"),
        name: "John Doe".to_string(),
        email: "citizen@example.com".to_string(),
        role: UserRole::Citizen,
    }
}

pub fn officer() -> User {
    User {
        id: RecordId::from("o2"),
        name: "Officer Smith".to_string(),
        email: "officer@cms.gov".to_string(),
        role: UserRole::Officer,
    }
}

pub fn admin() -> User {
    User {
        id: RecordId::from("1"),
        name: "Admin".to_string(),
        email: "admin@cms.gov".to_string(),
        role: UserRole::Admin,
    }
}

pub fn token_for(user: &User) -> &'static str {
    match user.role {
        UserRole::Citizen => CITIZEN_TOKEN,
        UserRole::Officer => OFFICER_TOKEN,
        UserRole::Admin => ADMIN_TOKEN,
    }
}

/// Store `user` and its token in `cache` as a prior login would
pub fn sign_in(cache: &LocalCache, user: &User) {
    CredentialStore::new(cache.clone()).save(user, token_for(user));
}

/// A complaint record as the server sends it
pub fn complaint_json(id: Value, title: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "description": format!("{} reported by a resident", title),
        "type": "roads",
        "location": "5th Ave",
        "status": status,
        "citizenId": "3",
        "citizenName": "John Doe",
        "createdAt": "2025-01-10T09:00:00Z",
        "updatedAt": "2025-01-10T09:00:00Z"
    })
}

/// Two server records, one with a numeric id
pub fn server_complaints() -> Vec<Value> {
    vec![
        complaint_json(json!(7), "Street Light Not Working", "pending"),
        complaint_json(json!("c8"), "Garbage Not Collected", "in-progress"),
    ]
}

pub fn officers_json() -> Value {
    json!([
        {"id": "o1", "name": "Officer Jones", "email": "jones@cms.gov", "assignedComplaints": 3},
        {"id": "o2", "name": "Officer Smith", "email": "officer@cms.gov", "assignedComplaints": 0}
    ])
}
