//! The staged discovery engine.
//!
//! A request runs four stages, strictly in order:
//!
//! 1. **filter** — the compiled [`Predicate`] is handed to the store;
//! 2. **derive** — age, online flag and display photo are computed;
//! 3. **filter again** — the age range, which only exists after stage 2;
//! 4. **project** — records are cut down to [`Candidate`]s.
//!
//! Stage 1 may run inside the store. Stages 2 to 4 always run here, on
//! already-fetched data, and cannot fail.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  age::derived_age,
  clock::{Clock, SystemClock},
  criteria::{Bounds, FilterCriteria},
  predicate::{Predicate, compile},
  presence::{PresenceProvider, PresenceSnapshot},
  profile::Profile,
  result::{Candidate, Discovery},
  store::ProfileStore,
};

/// Display photo for members who have not uploaded any.
pub const DEFAULT_PHOTO: &str = "profile.jpg";

// ─── Stage 2 output ──────────────────────────────────────────────────────────

/// A stored profile together with its derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Derived {
  #[serde(flatten)]
  pub profile:       Profile,
  pub age:           i32,
  pub online:        bool,
  pub profile_photo: String,
}

// ─── Stages ──────────────────────────────────────────────────────────────────

/// Stage 2 for a single record.
pub fn derive(
  profile: Profile,
  presence: &PresenceSnapshot,
  today: NaiveDate,
  default_photo: &str,
) -> Derived {
  let online = presence.contains(&profile.username);
  let profile_photo = profile.photos.first().map_or(default_photo, String::as_str).to_owned();
  let age = derived_age(profile.birth_date, today);
  Derived { profile, age, online, profile_photo }
}

/// Stage 3. With no bounds every record passes.
pub fn filter_age(derived: Vec<Derived>, bounds: Option<Bounds>) -> Vec<Derived> {
  match bounds {
    None => derived,
    Some(bounds) => derived
      .into_iter()
      .filter(|d| bounds.contains(i64::from(d.age)))
      .collect(),
  }
}

/// Most recently active first; members never seen online go last. Ties are
/// broken by username so the order is fully deterministic.
pub fn sort_by_activity(derived: &mut [Derived]) {
  derived.sort_by(|a, b| {
    b.profile
      .last_online
      .cmp(&a.profile.last_online)
      .then_with(|| a.profile.username.cmp(&b.profile.username))
  });
}

/// Stage 4.
pub fn project(derived: Derived) -> Candidate {
  let Derived { profile, age, online, profile_photo } = derived;
  Candidate {
    profile_id: profile.profile_id,
    first_name: profile.first_name,
    last_name: profile.last_name,
    last_online: profile.last_online,
    age,
    online,
    profile_photo,
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Runs discovery requests against a profile store and a presence provider.
///
/// Holds no per-request state; one engine is shared by all concurrent
/// requests.
pub struct DiscoveryEngine<S, P> {
  store:         Arc<S>,
  presence:      Arc<P>,
  clock:         Arc<dyn Clock>,
  default_photo: String,
}

impl<S, P> DiscoveryEngine<S, P>
where
  S: ProfileStore,
  P: PresenceProvider,
{
  pub fn new(store: Arc<S>, presence: Arc<P>) -> Self {
    Self {
      store,
      presence,
      clock: Arc::new(SystemClock),
      default_photo: DEFAULT_PHOTO.to_owned(),
    }
  }

  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  pub fn with_default_photo(mut self, photo: impl Into<String>) -> Self {
    self.default_photo = photo.into();
    self
  }

  pub fn store(&self) -> &S { &self.store }

  /// Run one discovery request for `viewer`.
  ///
  /// Presence is read exactly once, before stage 1. Collaborator failures
  /// abort the request; nothing partial is returned.
  pub async fn discover(&self, viewer: Uuid, criteria: &FilterCriteria) -> Result<Discovery> {
    let presence = self.snapshot().await?;
    let predicate = compile(criteria, viewer, &presence);

    let stored = self.primary(&predicate).await?;
    tracing::debug!(matched = stored.len(), "stage 1: primary filter");

    let today = self.clock.today();
    let derived: Vec<Derived> = stored
      .into_iter()
      .map(|p| derive(p, &presence, today, &self.default_photo))
      .collect();

    let mut derived = filter_age(derived, criteria.age);
    tracing::debug!(matched = derived.len(), age = ?criteria.age, "stage 3: age filter");

    sort_by_activity(&mut derived);
    let candidates: Vec<Candidate> = derived.into_iter().map(project).collect();

    tracing::info!(
      %viewer,
      results = candidates.len(),
      online_only = criteria.online_only,
      "discovery complete"
    );

    Ok(Discovery::assemble(candidates))
  }

  /// Load a single profile with its derived fields.
  pub async fn view(&self, id: Uuid) -> Result<Option<Derived>> {
    let presence = self.snapshot().await?;
    let profile = self
      .store
      .get_profile(id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    let today = self.clock.today();
    Ok(profile.map(|p| derive(p, &presence, today, &self.default_photo)))
  }

  async fn snapshot(&self) -> Result<PresenceSnapshot> {
    self.presence.snapshot().await.map_err(|e| Error::Presence(Box::new(e)))
  }

  async fn primary(&self, predicate: &Predicate) -> Result<Vec<Profile>> {
    self.store.query(predicate).await.map_err(|e| Error::Store(Box::new(e)))
  }
}

#[cfg(test)]
mod tests {
  use std::{fmt, future::Future};

  use chrono::{DateTime, TimeZone, Utc};

  use super::*;
  use crate::{
    clock::FixedClock,
    criteria::DiscoveryParams,
    presence::MemoryPresence,
    store::MemoryStore,
  };

  fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

  fn at(y: i32, m: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, day, 12, 0, 0).unwrap()
  }

  fn member(username: &str, birth: NaiveDate) -> Profile {
    Profile::new(username, username.to_uppercase(), "Test", birth)
  }

  struct Fixture {
    engine:   DiscoveryEngine<MemoryStore, MemoryPresence>,
    viewer:   Uuid,
    presence: Arc<MemoryPresence>,
  }

  /// Viewer plus four members aged 17, 18, 25 and 40 on 2024-06-15.
  fn fixture() -> Fixture {
    let viewer = member("viewer", d(1990, 1, 1));
    let viewer_id = viewer.profile_id;

    let mut teen = member("teen", d(2006, 6, 16));
    teen.last_online = Some(at(2024, 6, 10));
    let mut adult = member("adult", d(2006, 6, 15));
    adult.photos = vec!["adult-1.jpg".into(), "adult-2.jpg".into()];
    adult.last_online = Some(at(2024, 6, 14));
    let mut mid = member("mid", d(1999, 1, 31));
    mid.last_online = Some(at(2024, 6, 12));
    let elder = member("elder", d(1984, 3, 1));

    let store: MemoryStore = [viewer, teen, adult, mid, elder].into_iter().collect();
    let presence = Arc::new(MemoryPresence::new());
    presence.set_online("adult");
    presence.set_online("viewer");

    let engine = DiscoveryEngine::new(Arc::new(store), presence.clone())
      .with_clock(FixedClock::on(d(2024, 6, 15)));

    Fixture { engine, viewer: viewer_id, presence }
  }

  fn params(f: impl FnOnce(&mut DiscoveryParams)) -> FilterCriteria {
    let mut p = DiscoveryParams::default();
    f(&mut p);
    FilterCriteria::from_params(&p)
  }

  fn ages(discovery: &Discovery) -> Vec<i32> {
    let mut ages: Vec<i32> = discovery.candidates().iter().map(|c| c.age).collect();
    ages.sort_unstable();
    ages
  }

  #[tokio::test]
  async fn no_filters_return_everyone_but_the_viewer() {
    let fx = fixture();
    let result = fx.engine.discover(fx.viewer, &FilterCriteria::default()).await.unwrap();
    assert_eq!(result.candidates().len(), 4);
    assert!(result.candidates().iter().all(|c| c.profile_id != fx.viewer));
    assert_eq!(ages(&result), vec![17, 18, 25, 40]);
  }

  #[tokio::test]
  async fn age_range_filters_after_derivation() {
    let fx = fixture();
    let criteria = params(|p| {
      p.partner_age_from = Some("18".into());
      p.partner_age_to = Some("30".into());
    });
    let result = fx.engine.discover(fx.viewer, &criteria).await.unwrap();
    assert_eq!(ages(&result), vec![18, 25]);
  }

  #[tokio::test]
  async fn one_sided_age_bounds() {
    let fx = fixture();
    let older = params(|p| p.partner_age_from = Some("25".into()));
    let younger = params(|p| p.partner_age_to = Some("18".into()));
    assert_eq!(ages(&fx.engine.discover(fx.viewer, &older).await.unwrap()), vec![25, 40]);
    assert_eq!(ages(&fx.engine.discover(fx.viewer, &younger).await.unwrap()), vec![17, 18]);
  }

  #[tokio::test]
  async fn display_photo_and_online_flag_are_derived() {
    let fx = fixture();
    let result = fx.engine.discover(fx.viewer, &FilterCriteria::default()).await.unwrap();
    for c in result.candidates() {
      if c.first_name == "ADULT" {
        assert_eq!(c.profile_photo, "adult-1.jpg");
        assert!(c.online);
      } else {
        assert_eq!(c.profile_photo, DEFAULT_PHOTO);
        assert!(!c.online);
      }
    }
  }

  #[tokio::test]
  async fn online_only_never_returns_offline_members() {
    let fx = fixture();
    let criteria = params(|p| p.online = Some("1".into()));
    let result = fx.engine.discover(fx.viewer, &criteria).await.unwrap();
    let names: Vec<&str> = result.candidates().iter().map(|c| c.first_name.as_str()).collect();
    // The viewer is online too, but is still excluded.
    assert_eq!(names, vec!["ADULT"]);
    assert!(result.candidates().iter().all(|c| c.online));
  }

  #[tokio::test]
  async fn online_only_with_nobody_online_is_no_match() {
    let fx = fixture();
    fx.presence.set_offline("adult");
    let criteria = params(|p| p.online = Some("yes".into()));
    let result = fx.engine.discover(fx.viewer, &criteria).await.unwrap();
    assert_eq!(result, Discovery::NoMatches);
  }

  #[tokio::test]
  async fn zero_matches_is_a_distinct_outcome() {
    let fx = fixture();
    let criteria = params(|p| p.name = Some("nobody-by-this-name".into()));
    let result = fx.engine.discover(fx.viewer, &criteria).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(result, Discovery::NoMatches);
  }

  #[tokio::test]
  async fn results_are_ordered_by_recent_activity() {
    let fx = fixture();
    let result = fx.engine.discover(fx.viewer, &FilterCriteria::default()).await.unwrap();
    let names: Vec<&str> = result.candidates().iter().map(|c| c.first_name.as_str()).collect();
    assert_eq!(names, vec!["ADULT", "MID", "TEEN", "ELDER"]);
  }

  #[tokio::test]
  async fn repeated_requests_are_identical() {
    let fx = fixture();
    let criteria = params(|p| p.partner_age_from = Some("18".into()));
    let first = fx.engine.discover(fx.viewer, &criteria).await.unwrap();
    let second = fx.engine.discover(fx.viewer, &criteria).await.unwrap();
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn view_derives_fields_for_one_profile() {
    let fx = fixture();
    let adult = fx
      .engine
      .discover(fx.viewer, &params(|p| p.name = Some("adult".into())))
      .await
      .unwrap()
      .candidates()[0]
      .profile_id;

    let view = fx.engine.view(adult).await.unwrap().unwrap();
    assert_eq!(view.age, 18);
    assert!(view.online);
    assert_eq!(view.profile_photo, "adult-1.jpg");
    assert!(fx.engine.view(Uuid::new_v4()).await.unwrap().is_none());
  }

  #[test]
  fn stage_three_on_plain_ages() {
    let derived: Vec<Derived> = [17, 18, 25, 40]
      .into_iter()
      .map(|age| Derived {
        profile: member("m", d(2000, 1, 1)),
        age,
        online: false,
        profile_photo: DEFAULT_PHOTO.into(),
      })
      .collect();
    let kept = filter_age(derived, Some(Bounds { min: Some(18), max: Some(30) }));
    assert_eq!(kept.iter().map(|d| d.age).collect::<Vec<_>>(), vec![18, 25]);
  }

  // ── Collaborator failures ─────────────────────────────────────────────────

  #[derive(Debug)]
  struct Unreachable;

  impl fmt::Display for Unreachable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("unreachable") }
  }

  impl std::error::Error for Unreachable {}

  struct DownPresence;

  impl PresenceProvider for DownPresence {
    type Error = Unreachable;

    fn snapshot(&self) -> impl Future<Output = Result<PresenceSnapshot, Unreachable>> + Send + '_ {
      async { Err(Unreachable) }
    }
  }

  #[tokio::test]
  async fn presence_failure_is_fatal() {
    let engine = DiscoveryEngine::new(Arc::new(MemoryStore::new()), Arc::new(DownPresence));
    let err = engine.discover(Uuid::new_v4(), &FilterCriteria::default()).await.unwrap_err();
    assert!(matches!(err, Error::Presence(_)));
    assert_eq!(err.to_string(), "presence provider error: unreachable");
  }

  struct DownStore;

  impl ProfileStore for DownStore {
    type Error = Unreachable;

    fn get_profile(
      &self,
      _id: Uuid,
    ) -> impl Future<Output = Result<Option<Profile>, Unreachable>> + Send + '_ {
      async { Err(Unreachable) }
    }

    fn query<'a>(
      &'a self,
      _predicate: &'a Predicate,
    ) -> impl Future<Output = Result<Vec<Profile>, Unreachable>> + Send + 'a {
      async { Err(Unreachable) }
    }
  }

  #[tokio::test]
  async fn store_failure_is_fatal() {
    let presence = MemoryPresence::new();
    presence.set_online("someone");
    let engine = DiscoveryEngine::new(Arc::new(DownStore), Arc::new(presence));

    let err = engine.discover(Uuid::new_v4(), &FilterCriteria::default()).await.unwrap_err();
    let Error::Store(source) = &err else { panic!("expected a store error, got {err:?}") };
    assert_eq!(source.to_string(), "unreachable");
    assert!(source.downcast_ref::<Unreachable>().is_some());
    assert_eq!(err.to_string(), "profile store error: unreachable");

    let err = engine.view(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
  }
}
