//! Scenario runner for batch simulations
//!
//! Each simulation is independent, so a batch is spread over the rayon pool.

use log::info;
use rayon::prelude::*;

use crate::error::Result;
use crate::investment::{InvestmentParameters, Scenario};
use crate::projection::{ProjectionConfig, ProjectionEngine, SimulationResult};

/// Outcome of one named scenario in a batch
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: Result<SimulationResult>,
}

/// Runs many simulations against one engine configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(ProjectionConfig::from_env());
/// let scenarios = load_scenarios("scenarios.csv")?;
/// for outcome in runner.run_batch(&scenarios) {
///     println!("{}: {:?}", outcome.name, outcome.result.map(|r| r.summary()));
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }

    /// Run a single simulation
    pub fn run(&self, params: &InvestmentParameters) -> Result<SimulationResult> {
        self.engine.simulate(params)
    }

    /// Run every scenario in parallel, keeping input order
    ///
    /// A failing scenario does not stop the others.
    pub fn run_batch(&self, scenarios: &[Scenario]) -> Vec<ScenarioOutcome> {
        info!("Running batch of {} scenarios", scenarios.len());
        scenarios
            .par_iter()
            .map(|scenario| ScenarioOutcome {
                name: scenario.name.clone(),
                result: self.engine.simulate(&scenario.params),
            })
            .collect()
    }

    /// Run one investment under several configurations
    pub fn run_variants(
        &self,
        params: &InvestmentParameters,
        configs: &[ProjectionConfig],
    ) -> Vec<Result<SimulationResult>> {
        configs
            .par_iter()
            .map(|config| ProjectionEngine::new(config.clone()).simulate(params))
            .collect()
    }

    pub fn config(&self) -> &ProjectionConfig {
        self.engine.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investment::fixtures::reference_investment;

    fn runner() -> ScenarioRunner {
        ScenarioRunner::new(ProjectionConfig {
            start_year: Some(2025),
            ..Default::default()
        })
    }

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() {
        let mut broken = reference_investment();
        broken.price = 0.0;
        let mut higher_rent = reference_investment();
        higher_rent.monthly_rent = 1_000.0;

        let scenarios = vec![
            Scenario { name: "reference".into(), params: reference_investment() },
            Scenario { name: "broken".into(), params: broken },
            Scenario { name: "higher-rent".into(), params: higher_rent },
        ];
        let outcomes = runner().run_batch(&scenarios);

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[1].name, "broken");
        assert!(outcomes[1].result.is_err());

        let reference = outcomes[0].result.as_ref().unwrap().summary();
        let higher = outcomes[2].result.as_ref().unwrap().summary();
        assert!(higher.gross_yield > reference.gross_yield);
        assert!(higher.irr_first_horizon > reference.irr_first_horizon);
    }

    #[test]
    fn test_variants_disposal_cost() {
        let configs: Vec<_> = [4.0, 8.0, 12.0]
            .iter()
            .map(|&pct| ProjectionConfig {
                disposal_cost_pct: pct,
                start_year: Some(2025),
                ..Default::default()
            })
            .collect();

        let results = runner().run_variants(&reference_investment(), &configs);
        assert_eq!(results.len(), 3);

        let proceeds: Vec<f64> = results
            .iter()
            .map(|r| r.as_ref().unwrap().net_resale_proceeds)
            .collect();
        assert!(proceeds[0] > proceeds[1] && proceeds[1] > proceeds[2]);
    }
}
