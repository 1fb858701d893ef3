/////////////////////////////////////////////////////////////////////////////////////
//
// Outbreak model
//
// model module
//
// thin lifecycle wrapper around one population: scenario bookkeeping
// (outbreak start day, vaccine arrival, run length), the per-day step, and
// the observable output snapshot
//
////////////////////////////////////////////////////////////////////////////////////

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::disease::Disease;
use crate::errors::EpiError;
use crate::population::{Policy, Population};

// Scenario description.  Day fields use -1 for "never".
#[derive(Debug, Clone)]
pub struct Scenario {
    // Day of initial infection, -1 = never
    pub t_initial: i64,
    // Number of infected in the first round
    pub n_initial: u64,
    // Day of vaccine arrival, -1 = never
    pub t_vaccine: i64,
    // How long to run the scenario, -1 = to eradication
    pub t_max: i64,
    // Seed for the model's own random stream
    pub random_seed: u64,
    // Cost of one death, in the same units as daily production
    pub cost_per_death: f64,
}

// Observable model output for each step
#[derive(Debug, Copy, Clone, Serialize)]
pub struct Observable {
    pub day: u64,
    pub finished: bool,
    pub vaccine_available: bool,
    pub hosp_capacity: u64,
    pub n_susceptible: u64,
    pub n_infected: u64,
    pub n_critical: u64,
    pub n_recovered: u64,
    pub n_vaccinated: u64,
    pub n_dead: u64,
    // Productivity loss plus the cost of today's deaths
    pub cost_function: f64,
}

// A single-population model with its own random stream.  Two models built
// from the same scenario replay identically.
#[derive(Debug)]
pub struct Model {
    day: u64,
    started: bool,
    finished: bool,
    vaccine_available: bool,

    scenario: Scenario,
    disease: Disease,
    population: Population,
    rng: StdRng,
}

impl Model {
    pub fn new(
        scenario: Scenario,
        disease: Disease,
        population: Population,
    ) -> Result<Model, EpiError> {
        if disease.max_duration() != population.max_duration() {
            return Err(EpiError::InvalidArgs);
        }

        let mut scenario = scenario;
        // Outbreak never happens
        if scenario.t_initial < 0 || scenario.n_initial == 0 {
            scenario.t_initial = -1;
        }
        // Vaccine never arrives
        if scenario.t_vaccine < 0 {
            scenario.t_vaccine = -1;
        }
        // Run until no infections remain; then there must be an outbreak
        // to wait for, or the scenario would never terminate
        if scenario.t_max < 0 {
            if scenario.t_initial == -1 {
                return Err(EpiError::InvalidScenario);
            }
            scenario.t_max = -1;
        }

        let rng = StdRng::seed_from_u64(scenario.random_seed);
        Ok(Model {
            day: 0,
            started: false,
            finished: false,
            vaccine_available: false,
            scenario,
            disease,
            population,
            rng,
        })
    }

    // Step the model forward by one day under the given control measures
    pub fn step(&mut self, input: &Policy) -> Result<(), EpiError> {
        // A finished model just counts days
        if self.finished {
            self.day += 1;
            return Ok(());
        }

        self.population.set_policy(*input);

        // Outbreak day
        if self.scenario.t_initial == self.day as i64 {
            self.population.seed_infections(self.scenario.n_initial);
            self.started = true;
        }

        // Vaccine arrival day
        if !self.vaccine_available && self.scenario.t_vaccine == self.day as i64 {
            self.vaccine_available = true;
        }

        // Eradication or time limit ends the scenario
        if (self.started && self.population.n_infected() == 0)
            || (self.scenario.t_max >= 0 && self.day as i64 >= self.scenario.t_max)
        {
            self.day += 1;
            self.finished = true;
            return Ok(());
        }

        self.population
            .evolve_one_day(&mut self.rng, &self.disease, self.vaccine_available)?;
        self.day += 1;
        Ok(())
    }

    pub fn observables(&self) -> Observable {
        let pop = &self.population;
        Observable {
            day: self.day,
            finished: self.finished,
            vaccine_available: self.vaccine_available,
            hosp_capacity: pop.n_hospital_beds(),
            n_susceptible: pop.n_susceptible(),
            n_infected: pop.n_infected(),
            n_critical: pop.n_total_critical(),
            n_recovered: pop.n_recovered(),
            n_vaccinated: pop.n_vaccinated(),
            n_dead: pop.n_dead(),
            cost_function: pop.productivity_loss()
                + self.scenario.cost_per_death * (pop.n_dead() - pop.n_dead_last()) as f64,
        }
    }

    pub fn day(&self) -> u64 {
        self.day
    }
    pub fn finished(&self) -> bool {
        self.finished
    }
    pub fn vaccine_available(&self) -> bool {
        self.vaccine_available
    }
    pub fn population(&self) -> &Population {
        &self.population
    }
    pub fn disease(&self) -> &Disease {
        &self.disease
    }
}

// Hospital-load thresholds above which each control measure switches on.
// The driver recomputes the day's policy from these every cycle.
#[derive(Debug, Copy, Clone)]
pub struct PolicyThresholds {
    pub dist_home_symp_above: f64,
    pub dist_recommend_above: f64,
    pub dist_home_all_above: f64,
}

impl PolicyThresholds {
    pub fn policy_for(&self, hospital_load: f64) -> Policy {
        Policy {
            dist_home_symp: hospital_load > self.dist_home_symp_above,
            dist_recommend: hospital_load > self.dist_recommend_above,
            dist_home_all: hospital_load > self.dist_home_all_above,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::DiseaseParms;
    use crate::population::PopulationParms;

    const MAX_DURATION: usize = 8;

    fn inert_disease() -> Disease {
        Disease::new(DiseaseParms {
            max_duration: MAX_DURATION,
            asymp_trans_reduction: 0.5,
            false_neg_reduction: 0.0,
            hosp_death_reduction: 0.5,
            p_transmit: vec![0.0; MAX_DURATION],
            p_symptoms: vec![0.0; MAX_DURATION],
            p_negative: vec![0.0; MAX_DURATION],
            p_recovery: vec![0.0; MAX_DURATION],
            p_critical: vec![0.0; MAX_DURATION],
            p_death: vec![0.0; MAX_DURATION],
        })
        .unwrap()
    }

    fn small_population() -> Population {
        Population::new(
            &PopulationParms {
                n_total: 10_000,
                n_hospital_beds: 100,
                cr_normal: 1.0,
                cr_home: 0.3,
                cr_hospital: 1.5,
                daily_production: 100.0,
                f_critical_jobs: 0.2,
                prod_symp: 0.7,
                prod_dist: 0.9,
                prod_home: 0.6,
                daily_vaccination_capacity: 0.05,
            },
            MAX_DURATION,
        )
        .unwrap()
    }

    fn scenario() -> Scenario {
        Scenario {
            t_initial: 2,
            n_initial: 50,
            t_vaccine: 5,
            t_max: 30,
            random_seed: 99,
            cost_per_death: 8e6,
        }
    }

    #[test]
    fn scenario_without_start_or_stop_is_rejected() {
        let mut sc = scenario();
        sc.t_initial = -1;
        sc.t_max = -1;
        assert_eq!(
            Model::new(sc, inert_disease(), small_population()).unwrap_err(),
            EpiError::InvalidScenario
        );
    }

    #[test]
    fn zero_initial_cases_means_no_outbreak() {
        let mut sc = scenario();
        sc.n_initial = 0;
        // Still valid: t_max terminates the run
        let mut model = Model::new(sc, inert_disease(), small_population()).unwrap();
        for _ in 0..40 {
            model.step(&Policy::default()).unwrap();
        }
        assert_eq!(model.observables().n_infected, 0);
        assert!(model.finished());
    }

    #[test]
    fn outbreak_starts_on_the_scheduled_day() {
        let mut model = Model::new(scenario(), inert_disease(), small_population()).unwrap();

        model.step(&Policy::default()).unwrap();
        model.step(&Policy::default()).unwrap();
        assert_eq!(model.observables().n_infected, 0);

        // Day 2: seeds land and evolve into bin 1
        model.step(&Policy::default()).unwrap();
        assert_eq!(model.observables().n_infected, 50);
    }

    #[test]
    fn vaccine_flag_flips_and_population_gets_vaccinated() {
        let mut model = Model::new(scenario(), inert_disease(), small_population()).unwrap();
        for _ in 0..5 {
            model.step(&Policy::default()).unwrap();
            assert!(!model.vaccine_available());
        }
        model.step(&Policy::default()).unwrap();
        assert!(model.vaccine_available());
        assert!(model.observables().n_vaccinated > 0);
    }

    #[test]
    fn model_finishes_at_eradication() {
        let mut sc = scenario();
        sc.t_vaccine = -1;
        sc.t_max = -1;
        let mut model = Model::new(sc, inert_disease(), small_population()).unwrap();

        // Inert disease: the cohort force-recovers after MAX_DURATION days,
        // and the following step notices eradication
        let mut days = 0;
        while !model.finished() {
            model.step(&Policy::default()).unwrap();
            days += 1;
            assert!(days < 100, "model never finished");
        }
        let out = model.observables();
        assert_eq!(out.n_recovered, 50);
        assert_eq!(out.n_infected, 0);

        // Further steps only advance the clock
        let day = model.day();
        model.step(&Policy::default()).unwrap();
        assert_eq!(model.day(), day + 1);
        assert_eq!(model.observables().n_recovered, 50);
    }

    #[test]
    fn model_finishes_at_the_time_limit() {
        let mut model = Model::new(scenario(), inert_disease(), small_population()).unwrap();
        for _ in 0..31 {
            model.step(&Policy::default()).unwrap();
        }
        assert!(model.finished());
    }

    #[test]
    fn same_seed_replays_identically() {
        let run = |seed: u64| -> Vec<u64> {
            let mut sc = scenario();
            sc.random_seed = seed;
            let mut model = Model::new(sc, inert_disease(), small_population()).unwrap();
            let mut infected = Vec::new();
            for _ in 0..20 {
                model.step(&Policy::default()).unwrap();
                infected.push(model.observables().n_infected);
            }
            infected
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn thresholds_map_hospital_load_to_policy() {
        let thresholds = PolicyThresholds {
            dist_home_symp_above: 0.0,
            dist_recommend_above: 0.32,
            dist_home_all_above: 0.82,
        };
        assert_eq!(thresholds.policy_for(0.0), Policy::default());
        let policy = thresholds.policy_for(0.5);
        assert!(policy.dist_home_symp && policy.dist_recommend && !policy.dist_home_all);
        let policy = thresholds.policy_for(0.9);
        assert!(policy.dist_home_all);
    }
}
