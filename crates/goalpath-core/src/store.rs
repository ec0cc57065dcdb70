//! GoalStore: the session's in-memory goal cache, kept consistent with the
//! remote goal service.
//!
//! Mutations are applied only after the service confirms them, so the cache
//! never disagrees with the last successful server response it observed.
//! Failures leave the list untouched and are recorded as the current error for
//! the UI banner.
//!
//! A store is created at session start and torn down on logout. Every
//! continuation re-checks that the store is still active before touching state,
//! so a response arriving after teardown is dropped.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::checkin::CheckIn;
use crate::error::{GoalError, Result};
use crate::goal::{Goal, GoalDraft, GoalId, GoalPatch};
use crate::progress::{DashboardSummary, GoalProgress};
use crate::service::GoalService;
use crate::types::ProgressStatus;

#[derive(Debug, Default)]
struct StoreState {
    goals: Vec<Goal>,
    in_flight: usize,
    error: Option<String>,
}

impl StoreState {
    fn position(&self, id: &GoalId) -> Option<usize> {
        self.goals.iter().position(|g| &g.id == id)
    }
}

/// Remote-synchronized goal cache
#[derive(Debug)]
pub struct GoalStore {
    service: Arc<dyn GoalService>,
    state: RwLock<StoreState>,
    revision: watch::Sender<u64>,
    active: AtomicBool,
}

impl GoalStore {
    pub fn new(service: Arc<dyn GoalService>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            service,
            state: RwLock::new(StoreState::default()),
            revision,
            active: AtomicBool::new(true),
        }
    }

    // Read side

    /// Snapshot of the cached goals
    pub fn goals(&self) -> Vec<Goal> {
        self.state.read().goals.clone()
    }

    pub fn get(&self, id: &GoalId) -> Option<Goal> {
        let state = self.state.read();
        state.position(id).map(|i| state.goals[i].clone())
    }

    pub fn len(&self) -> usize {
        self.state.read().goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().in_flight > 0
    }

    /// Message of the last failed operation, if not yet dismissed
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.commit(|state| state.error = None);
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::from_goals(&self.state.read().goals)
    }

    /// Receiver that changes whenever the cached state changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Discard the store (logout). Later continuations are ignored.
    pub fn teardown(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            tracing::info!("Goal store torn down");
            self.commit(|state| *state = StoreState::default());
        }
    }

    // Operations

    /// Fetch the full goal list and replace the cache.
    ///
    /// Concurrent loads are not cancelled; whichever response lands last wins.
    pub async fn load(&self) -> Result<()> {
        self.begin()?;
        let result = self.service.list_goals().await;
        self.finish(result, |state, goals| {
            state.goals = goals.into_iter().map(Goal::normalize).collect();
            tracing::info!("Loaded {} goals", state.goals.len());
            Ok(())
        })
    }

    /// Validate a draft locally, create it remotely, and append the server's copy
    pub async fn create(&self, draft: GoalDraft) -> Result<Goal> {
        if let Err(e) = draft.validate() {
            self.record_error(&e);
            return Err(e);
        }
        let draft = draft.with_timeline();

        self.begin()?;
        let result = self.service.create_goal(&draft).await;
        self.finish(result, |state, goal| {
            let goal = goal.normalize();
            tracing::info!("Created goal {} ({})", goal.id, goal.title);
            state.goals.push(goal.clone());
            Ok(goal)
        })
    }

    /// Send a partial update and replace the cached entry with the result.
    ///
    /// A result whose target has vanished from the cache (e.g. a reload
    /// landed first) is dropped and reported as [`GoalError::NotFound`].
    pub async fn update(&self, id: &GoalId, patch: GoalPatch) -> Result<Goal> {
        if let Err(e) = patch.validate() {
            self.record_error(&e);
            return Err(e);
        }
        self.ensure_present(id)?;

        self.begin()?;
        let result = self.service.update_goal(id, &patch).await;
        self.finish(result, |state, goal| {
            let goal = goal.normalize();
            match state.position(id) {
                Some(i) => {
                    state.goals[i] = goal.clone();
                    Ok(goal)
                }
                None => {
                    tracing::debug!("Dropping update for goal {} no longer cached", id);
                    Err(GoalError::NotFound(id.clone()))
                }
            }
        })
    }

    /// Delete remotely, then remove locally. Nothing is removed on failure.
    pub async fn remove(&self, id: &GoalId) -> Result<()> {
        self.ensure_present(id)?;

        self.begin()?;
        let result = self.service.delete_goal(id).await;
        self.finish(result, |state, ()| {
            state.goals.retain(|g| &g.id != id);
            tracing::info!("Removed goal {}", id);
            Ok(())
        })
    }

    /// Update one milestone and recompute the goal's progress once confirmed.
    ///
    /// The service's response body is ignored; the change is merged into the
    /// cached goal by id and week.
    pub async fn update_milestone_status(
        &self,
        goal_id: &GoalId,
        week: u32,
        status: ProgressStatus,
    ) -> Result<Goal> {
        {
            let state = self.state.read();
            let goal = state
                .position(goal_id)
                .map(|i| &state.goals[i])
                .ok_or_else(|| GoalError::NotFound(goal_id.clone()))?;
            if goal.milestone(week).is_none() {
                return Err(GoalError::MilestoneNotFound {
                    goal: goal_id.clone(),
                    week,
                });
            }
        }

        self.begin()?;
        let result = self.service.update_milestone(goal_id, week, status).await;
        self.finish(result, |state, ()| {
            let not_found = || GoalError::MilestoneNotFound {
                goal: goal_id.clone(),
                week,
            };
            let i = state
                .position(goal_id)
                .ok_or_else(|| GoalError::NotFound(goal_id.clone()))?;
            let goal = &mut state.goals[i];
            if !goal.apply_milestone_status(week, status) {
                return Err(not_found());
            }
            tracing::debug!(
                "Goal {} milestone {} -> {} ({}%)",
                goal_id,
                week,
                status,
                goal.progress_percent
            );
            Ok(goal.clone())
        })
    }

    /// Re-fetch one goal and replace (or add) its cached copy
    pub async fn refresh(&self, id: &GoalId) -> Result<Goal> {
        self.begin()?;
        let result = self.service.fetch_goal(id).await;
        self.finish(result, |state, goal| {
            let goal = goal.normalize();
            match state.position(&goal.id) {
                Some(i) => state.goals[i] = goal.clone(),
                None => state.goals.push(goal.clone()),
            }
            Ok(goal)
        })
    }

    /// Server-side progress report; does not modify the cache
    pub async fn progress(&self, id: &GoalId) -> Result<GoalProgress> {
        self.begin()?;
        let result = self.service.goal_progress(id).await;
        self.finish(result, |_, progress| Ok(progress))
    }

    /// Submit a weekly check-in for a cached goal
    pub async fn submit_checkin(&self, checkin: &CheckIn) -> Result<()> {
        if let Err(e) = checkin.validate() {
            self.record_error(&e);
            return Err(e);
        }
        self.ensure_present(&checkin.goal_id)?;

        self.begin()?;
        let result = self.service.submit_checkin(checkin).await;
        self.finish(result, |_, ()| {
            tracing::info!("Check-in recorded for goal {}", checkin.goal_id);
            Ok(())
        })
    }

    // Internals

    fn commit<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let out = f(&mut self.state.write());
        self.revision.send_modify(|rev| *rev += 1);
        out
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(GoalError::SessionEnded)
        }
    }

    fn ensure_present(&self, id: &GoalId) -> Result<()> {
        if self.state.read().position(id).is_some() {
            Ok(())
        } else {
            let err = GoalError::NotFound(id.clone());
            self.record_error(&err);
            Err(err)
        }
    }

    fn record_error(&self, error: &GoalError) {
        if self.is_active() {
            let message = error.to_string();
            self.commit(|state| state.error = Some(message));
        }
    }

    fn begin(&self) -> Result<()> {
        self.ensure_active()?;
        self.commit(|state| state.in_flight += 1);
        Ok(())
    }

    /// Merge a service result into the state if the store is still current.
    ///
    /// `merge` may still reject the result (its target left the cache); that
    /// error is recorded like a service failure.
    fn finish<T, R>(
        &self,
        result: Result<T>,
        merge: impl FnOnce(&mut StoreState, T) -> Result<R>,
    ) -> Result<R> {
        if !self.is_active() {
            tracing::debug!("Ignoring response for a torn-down goal store");
            return Err(GoalError::SessionEnded);
        }
        self.commit(|state| {
            state.in_flight = state.in_flight.saturating_sub(1);
            match result.and_then(|value| merge(state, value)) {
                Ok(out) => {
                    state.error = None;
                    Ok(out)
                }
                Err(e) => {
                    tracing::warn!("Goal operation failed: {}", e);
                    state.error = Some(e.to_string());
                    Err(e)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::Milestone;
    use crate::types::Complexity;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;

    /// In-memory goal service with failure injection
    #[derive(Debug, Default)]
    struct FakeService {
        goals: Mutex<Vec<Goal>>,
        failure: Mutex<Option<GoalError>>,
        calls: AtomicUsize,
        next_id: AtomicUsize,
        pending_lists: Mutex<VecDeque<oneshot::Receiver<Vec<Goal>>>>,
        pending_updates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    }

    impl FakeService {
        fn with_goals(goals: Vec<Goal>) -> Arc<Self> {
            let service = Self::default();
            *service.goals.lock() = goals;
            Arc::new(service)
        }

        fn fail_next(&self, error: GoalError) {
            *self.failure.lock() = Some(error);
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn enter(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failure.lock().take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl GoalService for FakeService {
        async fn list_goals(&self) -> Result<Vec<Goal>> {
            self.enter()?;
            let gate = self.pending_lists.lock().pop_front();
            match gate {
                Some(rx) => Ok(rx.await.unwrap_or_default()),
                None => Ok(self.goals.lock().clone()),
            }
        }

        async fn fetch_goal(&self, id: &GoalId) -> Result<Goal> {
            self.enter()?;
            self.goals
                .lock()
                .iter()
                .find(|g| &g.id == id)
                .cloned()
                .ok_or_else(|| GoalError::remote(Some(404), "Goal not found"))
        }

        async fn create_goal(&self, draft: &GoalDraft) -> Result<Goal> {
            self.enter()?;
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            let goal = Goal {
                id: GoalId(format!("goal-{}", n)),
                title: draft.title.clone(),
                description: draft.description.clone(),
                category: draft.category.clone(),
                complexity: draft.complexity,
                duration_weeks: draft.duration_weeks,
                status: ProgressStatus::NotStarted,
                progress_percent: 0,
                milestones: draft.milestones.clone(),
                current_week: 1,
                user_id: Some("u1".to_string()),
                created_at: None,
            };
            self.goals.lock().push(goal.clone());
            Ok(goal)
        }

        async fn update_goal(&self, id: &GoalId, patch: &GoalPatch) -> Result<Goal> {
            self.enter()?;
            let gate = self.pending_updates.lock().pop_front();
            let updated = {
                let mut goals = self.goals.lock();
                let goal = goals.iter_mut().find(|g| &g.id == id).ok_or_else(|| {
                    GoalError::remote(Some(404), "Goal not found or access denied")
                })?;
                if let Some(title) = &patch.title {
                    goal.title = title.clone();
                }
                if let Some(status) = patch.status {
                    goal.status = status;
                }
                goal.clone()
            };
            // Applied server-side already; only the response is held back
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            Ok(updated)
        }

        async fn delete_goal(&self, id: &GoalId) -> Result<()> {
            self.enter()?;
            self.goals.lock().retain(|g| &g.id != id);
            Ok(())
        }

        async fn update_milestone(
            &self,
            _id: &GoalId,
            _week: u32,
            _status: ProgressStatus,
        ) -> Result<()> {
            // Mirrors the real service: acknowledges without returning the goal
            self.enter()
        }

        async fn goal_progress(&self, id: &GoalId) -> Result<GoalProgress> {
            self.enter()?;
            self.goals
                .lock()
                .iter()
                .find(|g| &g.id == id)
                .map(GoalProgress::of)
                .ok_or_else(|| GoalError::remote(Some(404), "Goal not found"))
        }

        async fn submit_checkin(&self, _checkin: &CheckIn) -> Result<()> {
            self.enter()
        }
    }

    fn goal(id: &str, milestones: u32, completed: &[u32]) -> Goal {
        let mut g = Goal {
            id: GoalId::from(id),
            title: format!("Goal {}", id),
            description: String::new(),
            category: "Education & Learning".to_string(),
            complexity: Complexity::Intermediate,
            duration_weeks: milestones.max(1),
            status: ProgressStatus::NotStarted,
            progress_percent: 0,
            milestones: (1..=milestones)
                .map(|w| Milestone::new(w, format!("Week {}", w), ""))
                .collect(),
            current_week: 1,
            user_id: None,
            created_at: None,
        };
        for m in g.milestones.iter_mut() {
            if completed.contains(&m.week) {
                m.status = ProgressStatus::Completed;
            }
        }
        g.recompute_progress();
        g
    }

    async fn loaded_store(goals: Vec<Goal>) -> (GoalStore, Arc<FakeService>) {
        let service = FakeService::with_goals(goals);
        let store = GoalStore::new(service.clone());
        store.load().await.unwrap();
        (store, service)
    }

    #[tokio::test]
    async fn test_load_replaces_state_and_clears_error() {
        let service = FakeService::with_goals(vec![goal("a", 2, &[]), goal("b", 3, &[1])]);
        let store = GoalStore::new(service.clone());

        service.fail_next(GoalError::remote(Some(500), "Failed to fetch goals"));
        assert!(store.load().await.is_err());
        assert_eq!(store.error().as_deref(), Some("Failed to fetch goals"));
        assert!(store.is_empty());
        assert!(!store.is_loading());

        store.load().await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_load_sorts_milestones() {
        let mut unsorted = goal("a", 3, &[]);
        unsorted.milestones.reverse();
        let (store, _) = loaded_store(vec![unsorted]).await;
        let weeks: Vec<u32> = store.goals()[0].milestones.iter().map(|m| m.week).collect();
        assert_eq!(weeks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_concurrent_loads_last_response_wins() {
        let service = FakeService::with_goals(Vec::new());
        let (tx_first, rx_first) = oneshot::channel();
        let (tx_second, rx_second) = oneshot::channel();
        service.pending_lists.lock().extend([rx_first, rx_second]);
        let store = GoalStore::new(service.clone());

        let resolver = async {
            // The second request answers first...
            tx_second.send(vec![goal("second", 1, &[])]).unwrap();
            while store.get(&GoalId::from("second")).is_none() {
                tokio::task::yield_now().await;
            }
            // ...and the first one lands afterwards, overwriting it.
            tx_first.send(vec![goal("first", 1, &[])]).unwrap();
        };

        let (a, b, ()) = tokio::join!(store.load(), store.load(), resolver);
        a.unwrap();
        b.unwrap();

        let ids: Vec<GoalId> = store.goals().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![GoalId::from("first")]);
    }

    #[tokio::test]
    async fn test_create_validates_before_network() {
        let (store, service) = loaded_store(Vec::new()).await;
        let calls = service.call_count();

        let draft = GoalDraft {
            title: String::new(),
            category: "Other".to_string(),
            description: String::new(),
            complexity: Complexity::Beginner,
            duration_weeks: 4,
            timeline: Default::default(),
            milestones: Vec::new(),
        };
        let err = store.create(draft).await.unwrap_err();
        assert!(matches!(err, GoalError::Validation { field: "title", .. }));
        assert_eq!(service.call_count(), calls);
        assert!(store.is_empty());
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn test_create_with_ai_timeline() {
        let (store, _) = loaded_store(Vec::new()).await;
        let draft = GoalDraft::builder()
            .title("Learn Go")
            .category("Education & Learning")
            .complexity(Complexity::Beginner)
            .duration_weeks(6)
            .build()
            .unwrap();

        let created = store.create(draft).await.unwrap();
        assert_eq!(created.id, GoalId::from("goal-0"));
        let weeks: Vec<u32> = created.milestones.iter().map(|m| m.week).collect();
        assert_eq!(weeks, vec![1, 2, 4, 5, 6]);
        assert_eq!(store.goals(), vec![created]);
    }

    #[tokio::test]
    async fn test_create_failure_leaves_list_untouched() {
        let (store, service) = loaded_store(vec![goal("a", 1, &[])]).await;
        service.fail_next(GoalError::remote(Some(422), "Title already used"));

        let draft = GoalDraft::builder()
            .title("Learn Go")
            .category("Other")
            .duration_weeks(4)
            .build()
            .unwrap();
        let err = store.create(draft).await.unwrap_err();
        assert_eq!(err.to_string(), "Title already used");
        assert_eq!(store.len(), 1);
        assert_eq!(store.error().as_deref(), Some("Title already used"));
    }

    #[tokio::test]
    async fn test_update_replaces_entry() {
        let (store, _) = loaded_store(vec![goal("a", 2, &[]), goal("b", 2, &[])]).await;
        let patch = GoalPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = store.update(&GoalId::from("b"), patch).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(store.get(&GoalId::from("b")).unwrap().title, "Renamed");
        assert_eq!(store.goals()[0].title, "Goal a");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (store, service) = loaded_store(vec![goal("a", 2, &[])]).await;
        let before = store.goals();
        let calls = service.call_count();

        let result = store
            .update(&GoalId::from("missing"), GoalPatch::default())
            .await;

        assert!(matches!(result, Err(GoalError::NotFound(_))));
        assert_eq!(store.goals(), before);
        assert_eq!(service.call_count(), calls);
    }

    #[tokio::test]
    async fn test_update_for_goal_gone_mid_request_is_dropped() {
        let (store, service) = loaded_store(vec![goal("a", 2, &[]), goal("b", 2, &[])]).await;
        let (release, gate) = oneshot::channel();
        service.pending_updates.lock().push_back(gate);
        let id = GoalId::from("a");
        let patch = GoalPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };

        let reload = async {
            // Another client deleted the goal; a reload lands before the update
            service.goals.lock().retain(|g| g.id != id);
            store.load().await.unwrap();
            release.send(()).unwrap();
        };
        let (result, ()) = tokio::join!(store.update(&id, patch), reload);

        assert!(matches!(result, Err(GoalError::NotFound(ref missing)) if missing == &id));
        let ids: Vec<GoalId> = store.goals().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![GoalId::from("b")]);
        assert_eq!(store.error(), Some(GoalError::NotFound(id.clone()).to_string()));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_update_failure_keeps_state() {
        let (store, service) = loaded_store(vec![goal("a", 2, &[])]).await;
        let before = store.goals();
        service.fail_next(GoalError::remote(None, "Failed to update goal"));

        let patch = GoalPatch {
            title: Some("New".to_string()),
            ..Default::default()
        };
        assert!(store.update(&GoalId::from("a"), patch).await.is_err());
        assert_eq!(store.goals(), before);
    }

    #[tokio::test]
    async fn test_remove_after_confirmation() {
        let (store, _) = loaded_store(vec![goal("a", 1, &[]), goal("b", 1, &[])]).await;
        store.remove(&GoalId::from("a")).await.unwrap();
        let ids: Vec<GoalId> = store.goals().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![GoalId::from("b")]);
    }

    #[tokio::test]
    async fn test_remove_failure_keeps_goal() {
        let mut g = goal("a", 4, &[1, 2]);
        g.status = ProgressStatus::InProgress;
        let (store, service) = loaded_store(vec![g.clone()]).await;
        service.fail_next(GoalError::remote(Some(500), "Failed to delete goal"));

        let err = store.remove(&GoalId::from("a")).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete goal");
        let kept = store.get(&GoalId::from("a")).unwrap();
        assert_eq!(kept.status, ProgressStatus::InProgress);
        assert_eq!(kept, g);
        assert_eq!(store.error().as_deref(), Some("Failed to delete goal"));
    }

    #[tokio::test]
    async fn test_milestone_update_recomputes_progress() {
        let (store, _) = loaded_store(vec![goal("g", 10, &[1, 2, 4, 5])]).await;
        assert_eq!(store.get(&GoalId::from("g")).unwrap().progress_percent, 40);

        let updated = store
            .update_milestone_status(&GoalId::from("g"), 3, ProgressStatus::Completed)
            .await
            .unwrap();

        assert_eq!(updated.progress_percent, 50);
        assert_eq!(updated.status, ProgressStatus::InProgress);
        assert_eq!(updated.current_week, 3);
        assert_eq!(store.get(&GoalId::from("g")).unwrap(), updated);
    }

    #[tokio::test]
    async fn test_milestone_update_failure_keeps_progress() {
        let (store, service) = loaded_store(vec![goal("g", 4, &[1])]).await;
        service.fail_next(GoalError::remote(Some(400), "Milestone not found"));

        let result = store
            .update_milestone_status(&GoalId::from("g"), 2, ProgressStatus::Completed)
            .await;
        assert!(result.is_err());
        assert_eq!(store.get(&GoalId::from("g")).unwrap().progress_percent, 25);
    }

    #[tokio::test]
    async fn test_milestone_update_unknown_week() {
        let (store, service) = loaded_store(vec![goal("g", 4, &[])]).await;
        let calls = service.call_count();
        let result = store
            .update_milestone_status(&GoalId::from("g"), 9, ProgressStatus::Completed)
            .await;
        assert!(matches!(
            result,
            Err(GoalError::MilestoneNotFound { week: 9, .. })
        ));
        assert_eq!(service.call_count(), calls);
    }

    #[tokio::test]
    async fn test_refresh_and_progress() {
        let (store, service) = loaded_store(vec![goal("g", 2, &[])]).await;
        service.goals.lock()[0].title = "Server title".to_string();

        let refreshed = store.refresh(&GoalId::from("g")).await.unwrap();
        assert_eq!(refreshed.title, "Server title");
        assert_eq!(store.get(&GoalId::from("g")).unwrap().title, "Server title");

        let progress = store.progress(&GoalId::from("g")).await.unwrap();
        assert_eq!(progress.milestones.total, 2);
    }

    #[tokio::test]
    async fn test_checkin_requires_known_goal() {
        let (store, _) = loaded_store(vec![goal("g", 2, &[])]).await;
        let checkin = CheckIn::new(GoalId::from("g"), "Read two chapters");
        store.submit_checkin(&checkin).await.unwrap();

        let unknown = CheckIn::new(GoalId::from("nope"), "notes");
        assert!(matches!(
            store.submit_checkin(&unknown).await,
            Err(GoalError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_teardown_ignores_later_operations() {
        let (store, _) = loaded_store(vec![goal("g", 2, &[])]).await;
        store.teardown();
        assert!(store.is_empty());
        assert!(matches!(store.load().await, Err(GoalError::SessionEnded)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_revisions() {
        let service = FakeService::with_goals(vec![goal("g", 1, &[])]);
        let store = GoalStore::new(service);
        let mut rx = store.subscribe();
        let start = *rx.borrow_and_update();

        store.load().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update() > start);

        store.clear_error();
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_summary_tracks_cache() {
        let (store, _) = loaded_store(vec![goal("a", 2, &[1, 2]), goal("b", 2, &[])]).await;
        let summary = store.summary();
        assert_eq!(summary.total_goals, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.not_started, 1);
    }
}
