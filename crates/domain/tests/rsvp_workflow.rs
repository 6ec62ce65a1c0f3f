//! Integration tests for the RSVP workflow.
//!
//! These tests drive `RsvpService` against the in-memory guest store and
//! check the stored rows after every operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    Decision, DomainError, GuestName, PartyMember, RsvpError, RsvpService, SubmitRsvp, UpdateRsvp,
    ValidationError,
};
use guest_store::{
    Guest, GuestId, GuestStore, InMemoryGuestStore, Rsvp, RsvpCommit, SecondaryGuest,
};
use tokio::sync::Mutex;

/// Creates a service seeded with the given guests.
async fn create_service(guests: &[Guest]) -> RsvpService<InMemoryGuestStore> {
    let store = InMemoryGuestStore::new();
    for guest in guests {
        store.insert_guest(guest).await.unwrap();
    }
    RsvpService::new(store)
}

fn person(first: &str, last: &str, rsvp: Rsvp, selection: i64) -> PartyMember {
    PartyMember::parse_at("", first, last, rsvp, selection).unwrap()
}

fn name(first: &str, last: &str) -> GuestName {
    GuestName::parse(first, last).unwrap()
}

async fn stored(service: &RsvpService<InMemoryGuestStore>, guest: &Guest) -> Guest {
    service
        .store()
        .get_guest(guest.guest_id)
        .await
        .unwrap()
        .unwrap()
}

mod lookup {
    use super::*;

    #[tokio::test]
    async fn present_names_return_exact_record() {
        let jane = Guest::new("jane", "doe", "family", 2);
        let john = Guest::new("john", "doe", "friend", 0);
        let service = create_service(&[jane.clone(), john.clone()]).await;

        assert_eq!(service.lookup_guest(&name("Jane", "Doe")).await.unwrap(), jane);
        assert_eq!(service.lookup_guest(&name("JOHN", "doe")).await.unwrap(), john);
    }

    #[tokio::test]
    async fn absent_names_are_not_found() {
        let service = create_service(&[Guest::new("jane", "doe", "family", 2)]).await;

        for (first, last) in [("Jane", "Roe"), ("Janet", "Doe"), ("Doe", "Jane")] {
            let err = service.lookup_guest(&name(first, last)).await.unwrap_err();
            assert!(matches!(
                err,
                DomainError::Rsvp(RsvpError::GuestNotFound { .. })
            ));
        }
    }
}

mod submission {
    use super::*;

    #[tokio::test]
    async fn jane_brings_jon() {
        let jane = Guest::new("jane", "doe", "family", 2);
        let service = create_service(&[jane.clone()]).await;

        let updated = service
            .submit_rsvp(SubmitRsvp::new(
                person("Jane", "Doe", Rsvp::Attending, 1),
                vec![person("Jon", "Doe", Rsvp::Attending, 2)],
            ))
            .await
            .unwrap();

        assert_eq!(updated.guest_id, jane.guest_id);
        assert_eq!(updated.avail_guests, 1);
        assert_eq!(updated.rsvp, Rsvp::Attending);
        assert_eq!(updated.selection, 1);
        assert!(updated.updated_at >= jane.updated_at);
        assert_eq!(stored(&service, &jane).await, updated);

        let party = service
            .store()
            .secondary_guests_for(jane.guest_id)
            .await
            .unwrap();
        assert_eq!(party.len(), 1);
        assert_eq!(party[0].primary_guest_id, jane.guest_id);
        assert_eq!(party[0].first_name, "jon");
        assert_eq!(party[0].last_name, "doe");
        assert_eq!(party[0].rsvp, Rsvp::Attending);
        assert_eq!(party[0].selection, 2);
    }

    #[tokio::test]
    async fn party_within_capacity_creates_one_row_per_member() {
        let primary = Guest::new("ann", "lee", "family", 4);
        let service = create_service(&[primary.clone()]).await;
        let party = vec![
            person("Bob", "Lee", Rsvp::Attending, 1),
            person("Cat", "Lee", Rsvp::Attending, 2),
            person("Dan", "Lee", Rsvp::NotAttending, 0),
        ];

        let updated = service
            .submit_rsvp(SubmitRsvp::new(person("Ann", "Lee", Rsvp::Attending, 2), party))
            .await
            .unwrap();

        assert_eq!(updated.avail_guests, 1);
        let rows = service
            .store()
            .secondary_guests_for(primary.guest_id)
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, ["bob", "cat", "dan"]);
        assert!(rows.iter().all(|r| r.primary_guest_id == primary.guest_id));
        assert_eq!(rows[2].selection, 0);
    }

    #[tokio::test]
    async fn party_of_three_exceeds_capacity_of_two() {
        let jane = Guest::new("jane", "doe", "family", 2);
        let service = create_service(&[jane.clone()]).await;
        let party = vec![
            person("Jon", "Doe", Rsvp::Attending, 2),
            person("Jim", "Doe", Rsvp::Attending, 1),
            person("Joe", "Doe", Rsvp::Attending, 1),
        ];

        let err = service
            .submit_rsvp(SubmitRsvp::new(person("Jane", "Doe", Rsvp::Attending, 1), party))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Rsvp(RsvpError::DisallowedGuests { .. })
        ));
        assert!(err.to_string().contains("jane doe"));
        assert_eq!(stored(&service, &jane).await, jane);
        assert_eq!(service.store().secondary_guest_count().await, 0);
    }

    #[tokio::test]
    async fn zero_capacity_attending_with_party_leaves_guest_unchanged() {
        let solo = Guest::new("sam", "hill", "colleague", 0);
        let service = create_service(&[solo.clone()]).await;

        let err = service
            .submit_rsvp(SubmitRsvp::new(
                person("Sam", "Hill", Rsvp::Attending, 1),
                vec![person("Pat", "Hill", Rsvp::Attending, 1)],
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Rsvp(RsvpError::DisallowedGuests { .. })
        ));
        assert_eq!(stored(&service, &solo).await, solo);
    }

    #[tokio::test]
    async fn unknown_primary_is_not_found() {
        let service = create_service(&[]).await;
        let err = service
            .submit_rsvp(SubmitRsvp::alone(person("Jane", "Doe", Rsvp::Attending, 1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Rsvp(RsvpError::GuestNotFound { .. })
        ));
    }
}

mod conflicts {
    use super::*;

    #[tokio::test]
    async fn decided_guest_always_conflicts() {
        let submissions = [
            SubmitRsvp::alone(person("Jane", "Doe", Rsvp::Attending, 1)),
            SubmitRsvp::alone(person("Jane", "Doe", Rsvp::NotAttending, 0)),
            SubmitRsvp::new(
                person("Jane", "Doe", Rsvp::Attending, 2),
                vec![person("Jon", "Doe", Rsvp::Attending, 1)],
            ),
        ];

        for decided in [Rsvp::Attending, Rsvp::NotAttending] {
            for submission in submissions.clone() {
                let mut jane = Guest::new("jane", "doe", "family", 2);
                jane.rsvp = decided;
                let service = create_service(&[jane.clone()]).await;

                let err = service.submit_rsvp(submission).await.unwrap_err();
                assert!(matches!(
                    err,
                    DomainError::Rsvp(RsvpError::AlreadyDecided { current, .. }) if current == decided
                ));
                assert_eq!(stored(&service, &jane).await, jane);
            }
        }
    }

    #[tokio::test]
    async fn concurrent_submissions_have_one_winner() {
        let jane = Guest::new("jane", "doe", "family", 1);
        let service = create_service(&[jane.clone()]).await;

        let attempts = (0..8).map(|_| {
            service.submit_rsvp(SubmitRsvp::new(
                person("Jane", "Doe", Rsvp::Attending, 1),
                vec![person("Jon", "Doe", Rsvp::Attending, 2)],
            ))
        });
        let results = futures_util::future::join_all(attempts).await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| matches!(
            e,
            DomainError::Rsvp(RsvpError::AlreadyDecided { .. })
        )));
        assert_eq!(stored(&service, &jane).await.avail_guests, 0);
        assert_eq!(service.store().secondary_guest_count().await, 1);
    }
}

mod validation {
    use super::*;

    fn parse(rsvp: Rsvp, selection: i64) -> Result<PartyMember, ValidationError> {
        PartyMember::parse_at("guest", "Jane", "Doe", rsvp, selection).map_err(ValidationError::new)
    }

    #[test]
    fn attending_with_zero_selection_is_a_validation_error() {
        let err = parse(Rsvp::Attending, 0).unwrap_err();
        assert_eq!(err.errors[0].field, "guest.selection");
    }

    #[test]
    fn not_attending_with_selection_is_a_validation_error() {
        assert!(parse(Rsvp::NotAttending, 1).is_err());
        assert!(parse(Rsvp::NotAttending, 2).is_err());
    }

    #[test]
    fn pending_decision_is_a_validation_error() {
        let err = parse(Rsvp::Pending, 0).unwrap_err();
        assert_eq!(err.errors[0].field, "guest.rsvp");
    }
}

mod admin_update {
    use super::*;

    /// Serves one stale name lookup, as if the row was read before a
    /// concurrent commit landed.
    struct StaleLookup {
        inner: InMemoryGuestStore,
        stale: Mutex<Option<Guest>>,
    }

    #[async_trait]
    impl GuestStore for StaleLookup {
        async fn insert_guest(&self, guest: &Guest) -> guest_store::Result<()> {
            self.inner.insert_guest(guest).await
        }

        async fn find_guest_by_name(
            &self,
            first_name: &str,
            last_name: &str,
        ) -> guest_store::Result<Option<Guest>> {
            if let Some(stale) = self.stale.lock().await.take() {
                return Ok(Some(stale));
            }
            self.inner.find_guest_by_name(first_name, last_name).await
        }

        async fn get_guest(&self, guest_id: GuestId) -> guest_store::Result<Option<Guest>> {
            self.inner.get_guest(guest_id).await
        }

        async fn set_rsvp(
            &self,
            guest_id: GuestId,
            rsvp: Rsvp,
            selection: i16,
            updated_at: DateTime<Utc>,
        ) -> guest_store::Result<Guest> {
            self.inner.set_rsvp(guest_id, rsvp, selection, updated_at).await
        }

        async fn commit_rsvp(&self, commit: RsvpCommit) -> guest_store::Result<Guest> {
            self.inner.commit_rsvp(commit).await
        }

        async fn secondary_guests_for(
            &self,
            primary_guest_id: GuestId,
        ) -> guest_store::Result<Vec<SecondaryGuest>> {
            self.inner.secondary_guests_for(primary_guest_id).await
        }
    }

    fn not_attending() -> Decision {
        Decision::parse_at("", Rsvp::NotAttending, 0).unwrap()
    }

    #[tokio::test]
    async fn update_overwrites_status_without_touching_capacity() {
        let jane = Guest::new("jane", "doe", "family", 2);
        let service = create_service(&[jane.clone()]).await;

        let updated = service
            .update_rsvp(UpdateRsvp::decided(name("Jane", "Doe"), not_attending()))
            .await
            .unwrap();

        assert_eq!(updated.rsvp, Rsvp::NotAttending);
        assert_eq!(updated.avail_guests, 2);
        assert_eq!(stored(&service, &jane).await, updated);
    }

    #[tokio::test]
    async fn update_to_attending_stores_the_given_selection() {
        let jane = Guest::new("jane", "doe", "family", 2);
        let service = create_service(&[jane.clone()]).await;
        let cmd = UpdateRsvp::parse_at("", "Jane", "Doe", Rsvp::Attending, 2).unwrap();

        let updated = service.update_rsvp(cmd).await.unwrap();

        assert_eq!((updated.rsvp, updated.selection), (Rsvp::Attending, 2));
        assert_eq!(stored(&service, &jane).await, updated);
    }

    #[test]
    fn update_to_attending_without_selection_is_a_validation_error() {
        let errors = UpdateRsvp::parse_at("", "Jane", "Doe", Rsvp::Attending, 0).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "selection");
    }

    #[tokio::test]
    async fn update_allows_reopening_a_decided_guest() {
        let jane = Guest::new("jane", "doe", "family", 2);
        let service = create_service(&[jane.clone()]).await;
        service
            .submit_rsvp(SubmitRsvp::alone(person("Jane", "Doe", Rsvp::NotAttending, 0)))
            .await
            .unwrap();

        service
            .update_rsvp(UpdateRsvp::reopen(name("Jane", "Doe")))
            .await
            .unwrap();
        let resubmitted = service
            .submit_rsvp(SubmitRsvp::alone(person("Jane", "Doe", Rsvp::Attending, 2)))
            .await
            .unwrap();

        assert_eq!(resubmitted.rsvp, Rsvp::Attending);
        assert_eq!(resubmitted.selection, 2);
    }

    #[tokio::test]
    async fn reopen_after_a_stale_read_keeps_the_committed_capacity() {
        let jane = Guest::new("jane", "doe", "family", 2);
        let inner = InMemoryGuestStore::new();
        inner.insert_guest(&jane).await.unwrap();
        let service = RsvpService::new(StaleLookup {
            inner,
            stale: Mutex::new(None),
        });

        // The override reads jane while she is still pending with two seats...
        *service.store().stale.lock().await = Some(jane.clone());
        // ...and a submission with a party of two commits before it writes.
        service
            .store()
            .inner
            .commit_rsvp(
                domain::plan_rsvp(
                    &jane,
                    &SubmitRsvp::new(
                        person("Jane", "Doe", Rsvp::Attending, 1),
                        vec![
                            person("Jon", "Doe", Rsvp::Attending, 1),
                            person("Jim", "Doe", Rsvp::Attending, 2),
                        ],
                    ),
                    Utc::now(),
                )
                .unwrap(),
            )
            .await
            .unwrap();

        let reopened = service
            .update_rsvp(UpdateRsvp::reopen(name("Jane", "Doe")))
            .await
            .unwrap();
        assert_eq!(reopened.rsvp, Rsvp::Pending);
        assert_eq!(reopened.avail_guests, 0);

        let err = service
            .submit_rsvp(SubmitRsvp::new(
                person("Jane", "Doe", Rsvp::Attending, 1),
                vec![person("Joe", "Doe", Rsvp::Attending, 1)],
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Rsvp(RsvpError::DisallowedGuests { avail_guests: 0, .. })
        ));
        assert_eq!(service.store().inner.secondary_guest_count().await, 2);
    }

    #[tokio::test]
    async fn update_unknown_guest_is_not_found() {
        let service = create_service(&[]).await;
        let err = service
            .update_rsvp(UpdateRsvp::reopen(name("Jane", "Doe")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Rsvp(RsvpError::GuestNotFound { .. })
        ));
    }
}
