use db::DBService;
use services::services::{notification::NotificationService, recipients::RecipientPolicy};

use crate::config::Config;

/// Shared application state handed to every route.
#[derive(Clone)]
pub struct Deployment {
    db: DBService,
    notification_service: NotificationService,
}

impl Deployment {
    pub async fn new(config: &Config) -> Result<Self, sqlx::Error> {
        let db = DBService::new(&config.database_url).await?;
        Ok(Self::from_db(db, config.recipient_policy))
    }

    pub fn from_db(db: DBService, policy: RecipientPolicy) -> Self {
        let notification_service = NotificationService::new(db.clone(), policy);
        Self {
            db,
            notification_service,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn notification_service(&self) -> &NotificationService {
        &self.notification_service
    }
}
