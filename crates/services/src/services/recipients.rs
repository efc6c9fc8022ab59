//! Resolves which user accounts hear about an event on a case.
//!
//! Recipients are the union of the case handlers, the individual clients and
//! the members of every organization client, checked against the user table.
//! Every lookup is best effort: a failed query contributes nothing and the
//! rest of the resolution carries on.

use std::{collections::BTreeSet, sync::Arc};

use db::models::case_client::ClientLink;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::store::CaseDirectory;

/// How to treat collected ids that have no matching user row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipientPolicy {
    /// When false, unknown ids are kept and only logged.
    pub drop_unknown_recipients: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub case_found: bool,
    pub recipients: BTreeSet<Uuid>,
    /// Operator-facing notes about lookups that failed along the way.
    pub warnings: Vec<String>,
}

impl Resolution {
    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn CaseDirectory>,
    policy: RecipientPolicy,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn CaseDirectory>, policy: RecipientPolicy) -> Self {
        Self { directory, policy }
    }

    pub async fn resolve(&self, case_id: Uuid) -> Resolution {
        let mut resolution = Resolution {
            case_found: true,
            ..Default::default()
        };

        match self.directory.case_exists(case_id).await {
            Ok(true) => {}
            Ok(false) => {
                info!(case_id = %case_id, "Recipient resolution: case not found, nothing to notify");
                resolution.case_found = false;
                return resolution;
            }
            Err(e) => {
                warn!(
                    case_id = %case_id,
                    error = %e,
                    "Recipient resolution: case lookup failed, continuing without confirmation"
                );
                resolution.warn("Could not confirm the case before notifying");
            }
        }

        self.collect_handlers(case_id, &mut resolution).await;
        let organizations = self.collect_clients(case_id, &mut resolution).await;
        for organization_id in organizations {
            self.collect_members(case_id, organization_id, &mut resolution)
                .await;
        }

        if !resolution.recipients.is_empty() {
            self.validate(case_id, &mut resolution).await;
        }

        debug!(
            case_id = %case_id,
            recipients = resolution.recipients.len(),
            "Recipient resolution complete"
        );
        resolution
    }

    async fn collect_handlers(&self, case_id: Uuid, resolution: &mut Resolution) {
        match self.directory.handlers_for_case(case_id).await {
            Ok(handlers) => {
                resolution
                    .recipients
                    .extend(handlers.into_iter().filter_map(|h| h.user_id));
            }
            Err(e) => {
                warn!(case_id = %case_id, error = %e, "Recipient resolution: failed to load handlers");
                resolution.warn("Could not load case handlers; they were not notified");
            }
        }
    }

    /// Adds individual clients directly and returns the organization clients
    /// whose members still need expanding.
    async fn collect_clients(&self, case_id: Uuid, resolution: &mut Resolution) -> BTreeSet<Uuid> {
        let mut organizations = BTreeSet::new();
        let clients = match self.directory.clients_for_case(case_id).await {
            Ok(clients) => clients,
            Err(e) => {
                warn!(case_id = %case_id, error = %e, "Recipient resolution: failed to load clients");
                resolution.warn("Could not load case clients; they were not notified");
                return organizations;
            }
        };

        for client in clients {
            match client.link() {
                Some(ClientLink::Individual(user_id)) => {
                    resolution.recipients.insert(user_id);
                }
                Some(ClientLink::Organization(organization_id)) => {
                    organizations.insert(organization_id);
                }
                None => {
                    warn!(
                        case_id = %case_id,
                        client_id = %client.id,
                        client_kind = %client.client_kind,
                        "Recipient resolution: client link has no target, skipping"
                    );
                }
            }
        }
        organizations
    }

    async fn collect_members(&self, case_id: Uuid, organization_id: Uuid, resolution: &mut Resolution) {
        match self.directory.organization_member_ids(organization_id).await {
            Ok(members) => resolution.recipients.extend(members),
            Err(e) => {
                warn!(
                    case_id = %case_id,
                    organization_id = %organization_id,
                    error = %e,
                    "Recipient resolution: failed to load organization members"
                );
                resolution.warn("Could not load members of a client organization");
            }
        }
    }

    async fn validate(&self, case_id: Uuid, resolution: &mut Resolution) {
        let candidates: Vec<Uuid> = resolution.recipients.iter().copied().collect();
        let existing: BTreeSet<Uuid> = match self.directory.existing_user_ids(&candidates).await {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                warn!(
                    case_id = %case_id,
                    error = %e,
                    "Recipient resolution: user validation failed, using unvalidated recipients"
                );
                return;
            }
        };

        let unknown: Vec<Uuid> = resolution
            .recipients
            .difference(&existing)
            .copied()
            .collect();
        if unknown.is_empty() {
            return;
        }

        warn!(
            case_id = %case_id,
            unknown = ?unknown,
            dropped = self.policy.drop_unknown_recipients,
            "Recipient resolution: recipients without a user account"
        );
        if self.policy.drop_unknown_recipients {
            resolution.recipients.retain(|id| existing.contains(id));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{HashMap, HashSet};

    use async_trait::async_trait;
    use chrono::Utc;
    use db::models::{
        case_client::{CaseClient, ClientKind},
        case_handler::CaseHandler,
    };

    use super::*;

    /// In-memory directory with switches for failing individual lookups.
    #[derive(Default)]
    pub(crate) struct FakeDirectory {
        pub cases: HashSet<Uuid>,
        pub handlers: HashMap<Uuid, Vec<Option<Uuid>>>,
        pub individual_clients: HashMap<Uuid, Vec<Uuid>>,
        pub organization_clients: HashMap<Uuid, Vec<Uuid>>,
        pub members: HashMap<Uuid, Vec<Uuid>>,
        pub users: HashSet<Uuid>,
        pub fail_case_lookup: bool,
        pub fail_handlers: bool,
        pub fail_clients: bool,
        pub fail_members: HashSet<Uuid>,
        pub fail_validation: bool,
    }

    impl FakeDirectory {
        pub(crate) fn with_case(case_id: Uuid) -> Self {
            Self {
                cases: HashSet::from([case_id]),
                ..Default::default()
            }
        }

        pub(crate) fn handler(mut self, case_id: Uuid, user_id: Uuid) -> Self {
            self.handlers.entry(case_id).or_default().push(Some(user_id));
            self.users.insert(user_id);
            self
        }

        pub(crate) fn individual(mut self, case_id: Uuid, user_id: Uuid) -> Self {
            self.individual_clients.entry(case_id).or_default().push(user_id);
            self.users.insert(user_id);
            self
        }

        pub(crate) fn organization(mut self, case_id: Uuid, org_id: Uuid, members: &[Uuid]) -> Self {
            self.organization_clients.entry(case_id).or_default().push(org_id);
            self.members.insert(org_id, members.to_vec());
            self.users.extend(members.iter().copied());
            self
        }
    }

    fn boom() -> sqlx::Error {
        sqlx::Error::Protocol("connection reset".to_string())
    }

    fn client_row(case_id: Uuid, kind: ClientKind, user: Option<Uuid>, org: Option<Uuid>) -> CaseClient {
        CaseClient {
            id: Uuid::new_v4(),
            case_id,
            client_kind: kind,
            user_id: user,
            organization_id: org,
            created_at: Utc::now(),
        }
    }

    #[async_trait]
    impl CaseDirectory for FakeDirectory {
        async fn case_exists(&self, case_id: Uuid) -> Result<bool, sqlx::Error> {
            if self.fail_case_lookup {
                return Err(boom());
            }
            Ok(self.cases.contains(&case_id))
        }

        async fn handlers_for_case(&self, case_id: Uuid) -> Result<Vec<CaseHandler>, sqlx::Error> {
            if self.fail_handlers {
                return Err(boom());
            }
            Ok(self
                .handlers
                .get(&case_id)
                .into_iter()
                .flatten()
                .map(|user_id| CaseHandler {
                    id: Uuid::new_v4(),
                    case_id,
                    user_id: *user_id,
                    created_at: Utc::now(),
                })
                .collect())
        }

        async fn clients_for_case(&self, case_id: Uuid) -> Result<Vec<CaseClient>, sqlx::Error> {
            if self.fail_clients {
                return Err(boom());
            }
            let individuals = self.individual_clients.get(&case_id).into_iter().flatten().map(|u| {
                client_row(case_id, ClientKind::Individual, Some(*u), None)
            });
            let organizations = self.organization_clients.get(&case_id).into_iter().flatten().map(|o| {
                client_row(case_id, ClientKind::Organization, None, Some(*o))
            });
            Ok(individuals.chain(organizations).collect())
        }

        async fn organization_member_ids(
            &self,
            organization_id: Uuid,
        ) -> Result<Vec<Uuid>, sqlx::Error> {
            if self.fail_members.contains(&organization_id) {
                return Err(boom());
            }
            Ok(self.members.get(&organization_id).cloned().unwrap_or_default())
        }

        async fn existing_user_ids(&self, user_ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
            if self.fail_validation {
                return Err(boom());
            }
            Ok(user_ids.iter().copied().filter(|id| self.users.contains(id)).collect())
        }
    }

    fn resolver(directory: FakeDirectory) -> RecipientResolver {
        RecipientResolver::new(Arc::new(directory), RecipientPolicy::default())
    }

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[tokio::test]
    async fn test_empty_case_resolves_to_nobody() {
        let case_id = Uuid::new_v4();
        let resolution = resolver(FakeDirectory::with_case(case_id)).resolve(case_id).await;

        assert!(resolution.case_found);
        assert!(resolution.recipients.is_empty());
        assert!(resolution.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_case_aborts_quietly() {
        let directory = FakeDirectory::default().handler(Uuid::new_v4(), Uuid::new_v4());
        let resolution = resolver(directory).resolve(Uuid::new_v4()).await;

        assert!(!resolution.case_found);
        assert!(resolution.recipients.is_empty());
    }

    #[tokio::test]
    async fn test_handlers_and_individuals_without_overlap_sum() {
        let case_id = Uuid::new_v4();
        let handlers = ids(3);
        let clients = ids(2);
        let mut directory = FakeDirectory::with_case(case_id);
        for h in &handlers {
            directory = directory.handler(case_id, *h);
        }
        for c in &clients {
            directory = directory.individual(case_id, *c);
        }

        let resolution = resolver(directory).resolve(case_id).await;
        assert_eq!(resolution.recipients.len(), handlers.len() + clients.len());
    }

    #[tokio::test]
    async fn test_same_user_as_handler_and_client_counted_once() {
        let case_id = Uuid::new_v4();
        let shared = Uuid::new_v4();
        let directory = FakeDirectory::with_case(case_id)
            .handler(case_id, shared)
            .individual(case_id, shared)
            .individual(case_id, Uuid::new_v4());

        let resolution = resolver(directory).resolve(case_id).await;
        assert_eq!(resolution.recipients.len(), 2);
        assert!(resolution.recipients.contains(&shared));
    }

    #[tokio::test]
    async fn test_all_organization_members_included() {
        let case_id = Uuid::new_v4();
        let org = Uuid::new_v4();
        let members = ids(4);
        let directory = FakeDirectory::with_case(case_id).organization(case_id, org, &members);

        let resolution = resolver(directory).resolve(case_id).await;
        assert_eq!(resolution.recipients, members.into_iter().collect::<BTreeSet<_>>());
    }

    #[tokio::test]
    async fn test_mixed_roles_scenario() {
        let case_id = Uuid::new_v4();
        let (u1, u2, u3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let directory = FakeDirectory::with_case(case_id)
            .handler(case_id, u1)
            .individual(case_id, u2)
            .organization(case_id, Uuid::new_v4(), &[u2, u3]);

        let resolution = resolver(directory).resolve(case_id).await;
        assert_eq!(resolution.recipients, BTreeSet::from([u1, u2, u3]));
    }

    #[tokio::test]
    async fn test_null_handler_user_is_skipped() {
        let case_id = Uuid::new_v4();
        let mut directory = FakeDirectory::with_case(case_id).handler(case_id, Uuid::new_v4());
        directory.handlers.get_mut(&case_id).unwrap().push(None);

        let resolution = resolver(directory).resolve(case_id).await;
        assert_eq!(resolution.recipients.len(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_unvalidated_set() {
        let case_id = Uuid::new_v4();
        let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
        let mut directory = FakeDirectory::with_case(case_id)
            .handler(case_id, u1)
            .individual(case_id, u2);
        directory.fail_validation = true;

        let resolution = resolver(directory).resolve(case_id).await;
        assert_eq!(resolution.recipients, BTreeSet::from([u1, u2]));
    }

    #[tokio::test]
    async fn test_unknown_users_kept_unless_policy_drops_them() {
        let case_id = Uuid::new_v4();
        let known = Uuid::new_v4();
        let ghost = Uuid::new_v4();
        let build = || {
            let mut directory = FakeDirectory::with_case(case_id).handler(case_id, known);
            directory.handlers.get_mut(&case_id).unwrap().push(Some(ghost));
            directory
        };

        let lenient = resolver(build()).resolve(case_id).await;
        assert_eq!(lenient.recipients, BTreeSet::from([known, ghost]));

        let strict = RecipientResolver::new(
            Arc::new(build()),
            RecipientPolicy {
                drop_unknown_recipients: true,
            },
        )
        .resolve(case_id)
        .await;
        assert_eq!(strict.recipients, BTreeSet::from([known]));
    }

    #[tokio::test]
    async fn test_failed_lookups_contribute_nothing() {
        let case_id = Uuid::new_v4();
        let handler = Uuid::new_v4();
        let broken_org = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut directory = FakeDirectory::with_case(case_id)
            .handler(case_id, handler)
            .individual(case_id, Uuid::new_v4())
            .organization(case_id, broken_org, &[member]);
        directory.fail_clients = true;

        let resolution = resolver(directory).resolve(case_id).await;
        assert_eq!(resolution.recipients, BTreeSet::from([handler]));
        assert_eq!(resolution.warnings.len(), 1);

        let mut directory = FakeDirectory::with_case(case_id)
            .handler(case_id, handler)
            .organization(case_id, broken_org, &[member]);
        directory.fail_handlers = true;
        directory.fail_members.insert(broken_org);

        let resolution = resolver(directory).resolve(case_id).await;
        assert!(resolution.recipients.is_empty());
        assert_eq!(resolution.warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_case_lookup_error_does_not_block_resolution() {
        let case_id = Uuid::new_v4();
        let handler = Uuid::new_v4();
        let mut directory = FakeDirectory::with_case(case_id).handler(case_id, handler);
        directory.fail_case_lookup = true;

        let resolution = resolver(directory).resolve(case_id).await;
        assert!(resolution.case_found);
        assert_eq!(resolution.recipients, BTreeSet::from([handler]));
    }
}
