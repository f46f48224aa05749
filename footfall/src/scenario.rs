use std::marker::PhantomData;
use std::sync::Arc;

use typed_builder::TypedBuilder;

use crate::action::ActionSet;
use crate::aggregate::Aggregate;
use crate::error::PoolError;
use crate::executor::Executor;
use crate::metric::WorkerSeries;
use crate::plan::ActionPlan;
use crate::session::Target;

/// Glue that ties a run together: the plan being replayed, the target
/// being driven, the interaction set, and the executor doing the driving.
#[derive(Debug, TypedBuilder)]
pub struct Scenario<A, E>
where
    A: Aggregate<Metric = WorkerSeries>,
    E: Executor<A>,
{
    #[builder(setter(into))]
    pub name: String,
    pub plan: ActionPlan,
    /// Optional unmeasured plan executed first to warm the target's
    /// caches; its measurements are discarded.
    #[builder(default)]
    pub warmup: Option<ActionPlan>,
    pub target: Target,
    #[builder(default = Arc::new(ActionSet::standard()))]
    pub actions: Arc<ActionSet>,
    pub executor: E,
    #[builder(default, setter(skip))]
    aggregate: PhantomData<A>,
}

impl<A, E> Scenario<A, E>
where
    A: Aggregate<Metric = WorkerSeries>,
    E: Executor<A>,
{
    /// Run the warmup plan first (throwing its measurements away), then the
    /// main plan, and return the main plan's aggregate.
    pub async fn run(&self) -> Result<A, PoolError> {
        if let Some(warmup) = &self.warmup {
            tracing::info!(scenario = %self.name, actions = warmup.len(), "warmup pass");
            let _ = self.executor.exec(self, warmup).await?;
        }
        tracing::info!(scenario = %self.name, actions = self.plan.len(), "measured pass");
        self.executor.exec(self, &self.plan).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::action::{Action, ActionKind};
    use crate::aggregate::RunAggregate;
    use crate::executor::SliceExecutor;

    fn latest_plan(len: usize) -> ActionPlan {
        ActionPlan::from_actions(
            (0..len)
                .map(|i| Action {
                    kind: ActionKind::FetchLatest,
                    text: format!("body {i}"),
                    fraction: 0.0,
                })
                .collect(),
        )
    }

    async fn mount_target(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/session/csrf.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "csrf": "tok-1" })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/latest.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "topic_list": { "topics": [] } })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn warmup_actions_are_replayed_but_not_measured() {
        let server = MockServer::start().await;
        mount_target(&server).await;

        let scenario = Scenario::<RunAggregate, _>::builder()
            .name("warmup test")
            .plan(latest_plan(3))
            .warmup(Some(latest_plan(2)))
            .target(Target::new(server.uri()))
            .executor(SliceExecutor::builder().workers(1).build())
            .build();

        let results = scenario.run().await.unwrap();
        assert_eq!(results.total_samples(), 3);

        // 2 warmup + 3 measured latest fetches, plus one bootstrap query
        // per pass for the single worker.
        let latest_hits = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/latest.json")
            .count();
        assert_eq!(latest_hits, 7);
    }

    #[tokio::test]
    async fn no_warmup_runs_the_main_plan_alone() {
        let server = MockServer::start().await;
        mount_target(&server).await;

        let scenario = Scenario::<RunAggregate, _>::builder()
            .name("plain run")
            .plan(latest_plan(2))
            .target(Target::new(server.uri()))
            .executor(SliceExecutor::builder().workers(1).build())
            .build();

        let results = scenario.run().await.unwrap();
        assert_eq!(results.worker_count(), 1);
        assert_eq!(results.total_samples(), 2);
    }
}
