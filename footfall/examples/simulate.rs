//! Drive a locally running, pre-seeded target with the default options.
//!
//! Expects the provisioning layer to have a service listening on the
//! configured port with seeded `userN` accounts; see the repository docs.

use std::sync::Arc;

use footfall::report::StdoutReporter;
use footfall::{
    ActionPlan, ActionSet, Reporter, RunAggregate, RunReport, Scenario, SimOptions, SliceExecutor,
    Target, TextGenerator,
};
use rand::{SeedableRng, rngs::StdRng};

const CORPUS: &str = "\
    The morning queue formed long before the doors opened. Every visitor \
    had a question and nobody agreed on the answer. A clerk stamped each \
    ticket twice and never looked up. The noticeboard promised changes \
    that never arrived. Someone always replied to the oldest thread first. \
    New topics appeared faster than anyone could read them. The moderators \
    drank cold coffee and kept the peace. By evening the queue was gone \
    and the arguments had moved inside.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let options = SimOptions::default();
    let generator = TextGenerator::learn(CORPUS);
    let actions = Arc::new(ActionSet::standard());
    let mut rng = StdRng::seed_from_u64(options.random_seed);

    let warmup = (options.warmup_iterations > 0)
        .then(|| ActionPlan::generate(options.warmup_iterations, &actions, &generator, &mut rng))
        .transpose()?;
    let plan = ActionPlan::generate(options.iterations, &actions, &generator, &mut rng)?;

    let scenario = Scenario::<RunAggregate, _>::builder()
        .name("forum traffic")
        .plan(plan)
        .warmup(warmup)
        .target(Target::localhost(options.port_num).with_user_offset(options.user_offset))
        .actions(Arc::clone(&actions))
        .executor(
            SliceExecutor::builder()
                .workers(options.worker_threads)
                .delay(options.delay_duration())
                .build(),
        )
        .build();

    let results = scenario.run().await?;

    let report = RunReport::from(results);
    let out = options.out_dir.join("footfall-report.json");
    std::fs::write(&out, serde_json::to_vec_pretty(&report)?)?;
    StdoutReporter {}.report(report).await?;
    Ok(())
}
