use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use trekka_core::{EmailProvenance, Notifier, NotifyError, PendingTrip, Profile, TripCandidate, TripType};
use trekka_shared::Notification;
use trekka_store::MemoryStore;

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn kinds(&self) -> Vec<&'static str> {
        self.sent.lock().unwrap().iter().map(Notification::kind).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError("broker down".to_string()));
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub async fn store_with_user() -> (Arc<MemoryStore>, Uuid) {
    let store = Arc::new(MemoryStore::new());
    let user_id = Uuid::new_v4();
    store
        .seed_profile(Profile {
            id: user_id,
            username: "jane".to_string(),
            display_name: Some("Jane Doe".to_string()),
            email_import_id: "jane-7f3k".to_string(),
        })
        .await;
    (store, user_id)
}

pub fn tokyo_pending(owner: Uuid) -> PendingTrip {
    let candidate = TripCandidate {
        destination: "Tokyo, Japan".to_string(),
        start_date: date(2025, 4, 1),
        end_date: date(2025, 4, 10),
        description: Some("Flight to Tokyo".to_string()),
        trip_type: Some(TripType::Flight),
        confirmation_number: Some("ABC123".to_string()),
        confidence_score: 0.92,
    };
    let provenance = EmailProvenance {
        subject: "Your flight to Tokyo".to_string(),
        from: "noreply@airline.example".to_string(),
        body: "Departing April 1st".to_string(),
    };
    PendingTrip::new(owner, &candidate, provenance)
}
